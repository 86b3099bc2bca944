use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{FxError, Result};
use crate::math::Vec2;
use crate::particles::{ParticleCanvas, ParticleConfig, ParticleField, Rgb};
use crate::signals::{Signals, Viewport};
use crate::theme::Theme;
use crate::wasm::dom;
use crate::wasm::frame::Effect;

fn css(color: Rgb) -> String {
    format!("rgb({}, {}, {})", color[0], color[1], color[2])
}

/// `ParticleCanvas` over a 2D context in CSS pixels.
pub struct Canvas2d {
    ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(FxError::from_js)?
            .ok_or(FxError::Unsupported("canvas 2d"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| FxError::Unsupported("canvas 2d"))?;
        Ok(Self { ctx })
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    fn arc(&self, center: Vec2, radius: f64) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(center.x, center.y, radius.max(0.0), 0.0, TAU);
    }
}

impl ParticleCanvas for Canvas2d {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn circle(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_str(&css(color));
        self.arc(center, radius);
        self.ctx.fill();
    }

    fn ring(&mut self, center: Vec2, radius: f64, width: f64, color: Rgb, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(width);
        self.arc(center, radius);
        self.ctx.stroke();
    }

    fn dash(&mut self, center: Vec2, length: f64, angle: f64, width: f64, color: Rgb, alpha: f64) {
        let (dx, dy) = (angle.cos() * length * 0.5, angle.sin() * length * 0.5);
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(width);
        self.ctx.set_line_cap("round");
        self.ctx.begin_path();
        self.ctx.move_to(center.x - dx, center.y - dy);
        self.ctx.line_to(center.x + dx, center.y + dy);
        self.ctx.stroke();
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f64, color: Rgb, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }
}

pub struct ParticleEffect {
    field: ParticleField,
    canvas: HtmlCanvasElement,
    surface: Canvas2d,
    viewport: Viewport,
    dpr: f64,
}

impl ParticleEffect {
    pub fn mount(id: &str, config: ParticleConfig, theme: Theme) -> Result<Self> {
        let canvas: HtmlCanvasElement = dom::by_id(id).ok_or_else(|| FxError::MissingElement(id.to_owned()))?;
        let surface = Canvas2d::new(&canvas)?;
        let viewport = dom::viewport();
        let field = ParticleField::new(config, viewport.width, viewport.height, theme, dom::random_seed());
        let mut effect = Self {
            field,
            canvas,
            surface,
            viewport,
            dpr: 1.0,
        };
        effect.size_canvas(viewport);
        Ok(effect)
    }

    fn size_canvas(&mut self, viewport: Viewport) {
        self.dpr = dom::device_pixel_ratio();
        self.canvas.set_width((viewport.width * self.dpr) as u32);
        self.canvas.set_height((viewport.height * self.dpr) as u32);
        dom::set_style(&self.canvas, "width", &format!("{}px", viewport.width));
        dom::set_style(&self.canvas, "height", &format!("{}px", viewport.height));
        let _ = self
            .surface
            .context()
            .set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
    }

    /// The single entry point for viewport changes: resize and rebuild.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.size_canvas(viewport);
        self.field.reset(viewport.width, viewport.height);
    }
}

impl Effect for ParticleEffect {
    fn tick(&mut self, dt: f64, signals: &Signals) {
        if signals.viewport != self.viewport {
            self.resize(signals.viewport);
        }
        if signals.theme != self.field.theme() {
            self.field.set_theme(signals.theme);
        }
        self.field.step(dt, signals);
        self.field.render(&mut self.surface, signals);
    }

    fn teardown(&mut self) {
        self.surface.clear(self.viewport.width, self.viewport.height);
    }
}
