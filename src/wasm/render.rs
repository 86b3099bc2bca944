//! WebGL2 chroma-key compositor: uploads the current video frame into a
//! texture and draws it through the keying shader onto a canvas.

use js_sys::Float32Array;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, HtmlVideoElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
    WebGlShader, WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::chroma::{plan_frame, ChromaKeyConfig, FramePlan, VideoStatus, FRAGMENT_SHADER, VERTEX_SHADER};
use crate::error::{FxError, Result};
use crate::signals::Signals;
use crate::wasm::frame::Effect;

/// Full-screen quad as a triangle strip.
const QUAD: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

struct Uniforms {
    video: Option<WebGlUniformLocation>,
    key: Option<WebGlUniformLocation>,
    similarity: Option<WebGlUniformLocation>,
    smoothness: Option<WebGlUniformLocation>,
    spill: Option<WebGlUniformLocation>,
}

/// GPU objects owned by one compositor; deleted on drop.
struct Gpu {
    gl: GL,
    program: WebGlProgram,
    shaders: [WebGlShader; 2],
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    texture: WebGlTexture,
    uniforms: Uniforms,
}

impl Drop for Gpu {
    fn drop(&mut self) {
        let gl = &self.gl;
        gl.delete_texture(Some(&self.texture));
        gl.delete_buffer(Some(&self.buffer));
        gl.delete_vertex_array(Some(&self.vao));
        for shader in &self.shaders {
            gl.detach_shader(&self.program, shader);
            gl.delete_shader(Some(shader));
        }
        gl.delete_program(Some(&self.program));
    }
}

enum GpuState {
    /// Waiting for the first playable frame.
    Pending,
    Ready(Gpu),
    /// Context or shader failure; the canvas stays blank.
    Failed,
}

pub struct ChromaCompositor {
    canvas: HtmlCanvasElement,
    video: HtmlVideoElement,
    config: ChromaKeyConfig,
    gpu: GpuState,
}

impl ChromaCompositor {
    pub fn new(canvas: HtmlCanvasElement, video: HtmlVideoElement, config: ChromaKeyConfig) -> Self {
        if video.cross_origin().is_none() {
            video.set_cross_origin(Some("anonymous"));
        }
        video.set_muted(true);
        video.set_loop(true);
        video.set_autoplay(true);
        // autoplay can be refused; the loop just waits for playback
        let _ = video.play();
        Self {
            canvas,
            video,
            config,
            gpu: GpuState::Pending,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.gpu, GpuState::Failed)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.gpu, GpuState::Ready(_))
    }

    pub fn set_config(&mut self, config: ChromaKeyConfig) {
        self.config = config;
        if let GpuState::Ready(gpu) = &self.gpu {
            upload_uniforms(gpu, &self.config);
        }
    }

    fn video_status(&self) -> VideoStatus {
        VideoStatus {
            ready_state: self.video.ready_state(),
            paused: self.video.paused(),
            ended: self.video.ended(),
            width: self.video.video_width(),
            height: self.video.video_height(),
        }
    }

    /// Builds the GPU objects on first use. Returns whether drawing is
    /// possible; a failure is logged once and sticks.
    pub fn prepare(&mut self) -> bool {
        if matches!(self.gpu, GpuState::Pending) {
            self.gpu = match init_gpu(&self.canvas, &self.config) {
                Ok(gpu) => {
                    log::debug!("chroma compositor ready");
                    GpuState::Ready(gpu)
                }
                Err(e) => {
                    log::error!("chroma compositor disabled: {e}");
                    GpuState::Failed
                }
            };
        }
        self.is_ready()
    }

    /// Draws the current video frame if one is available. Never fails: GPU
    /// errors are logged once and the compositor goes quiet.
    pub fn draw(&mut self) {
        let surface = (self.canvas.width(), self.canvas.height());
        let resize = match plan_frame(self.video_status(), surface) {
            FramePlan::Skip => return,
            FramePlan::Draw { resize } => resize,
        };

        if !self.prepare() {
            return;
        }
        let GpuState::Ready(gpu) = &self.gpu else {
            return;
        };

        if let Some((w, h)) = resize {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
        let (w, h) = (self.canvas.width(), self.canvas.height());
        let gl = &gpu.gl;

        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(&gpu.texture));
        if let Err(e) = gl.tex_image_2d_with_u32_and_u32_and_html_video_element(
            GL::TEXTURE_2D,
            0,
            GL::RGBA as i32,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            &self.video,
        ) {
            // tainted or not yet decodable; keep the previous frame
            log::debug!("video upload skipped: {:?}", e);
            return;
        }

        gl.viewport(0, 0, w as i32, h as i32);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.use_program(Some(&gpu.program));
        gl.bind_vertex_array(Some(&gpu.vao));
        gl.draw_arrays(GL::TRIANGLE_STRIP, 0, 4);
        gl.bind_vertex_array(None);
    }

    /// Releases the GPU objects. The compositor will not draw again.
    pub fn release(&mut self) {
        self.gpu = GpuState::Failed;
    }
}

impl Effect for ChromaCompositor {
    fn tick(&mut self, _dt: f64, _signals: &Signals) {
        self.draw();
    }

    fn teardown(&mut self) {
        self.release();
    }
}

fn init_gpu(canvas: &HtmlCanvasElement, config: &ChromaKeyConfig) -> Result<Gpu> {
    let gl: GL = canvas
        .get_context("webgl2")
        .map_err(FxError::from_js)?
        .ok_or(FxError::Unsupported("WebGL2"))?
        .dyn_into()
        .map_err(|_| FxError::Unsupported("WebGL2"))?;

    let (program, [vs, fs]) = build_program(&gl, VERTEX_SHADER, FRAGMENT_SHADER)?;

    let vao = gl
        .create_vertex_array()
        .ok_or(FxError::Unsupported("vertex array"))?;
    gl.bind_vertex_array(Some(&vao));
    let buffer = gl.create_buffer().ok_or(FxError::Unsupported("buffer"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    let vertices = Float32Array::from(&QUAD[..]);
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);
    let position = gl.get_attrib_location(&program, "a_position");
    if position < 0 {
        return Err(FxError::Shader("a_position not found".into()));
    }
    gl.enable_vertex_attrib_array(position as u32);
    gl.vertex_attrib_pointer_with_i32(position as u32, 2, GL::FLOAT, false, 0, 0);
    gl.bind_vertex_array(None);

    let texture = gl.create_texture().ok_or(FxError::Unsupported("texture"))?;
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);

    let uniforms = Uniforms {
        video: gl.get_uniform_location(&program, "u_video"),
        key: gl.get_uniform_location(&program, "u_key"),
        similarity: gl.get_uniform_location(&program, "u_similarity"),
        smoothness: gl.get_uniform_location(&program, "u_smoothness"),
        spill: gl.get_uniform_location(&program, "u_spill"),
    };

    let gpu = Gpu {
        gl,
        program,
        shaders: [vs, fs],
        vao,
        buffer,
        texture,
        uniforms,
    };
    upload_uniforms(&gpu, config);
    Ok(gpu)
}

fn upload_uniforms(gpu: &Gpu, config: &ChromaKeyConfig) {
    let gl = &gpu.gl;
    let u = &gpu.uniforms;
    let [r, g, b] = config.key_color;
    gl.use_program(Some(&gpu.program));
    gl.uniform1i(u.video.as_ref(), 0);
    gl.uniform3f(u.key.as_ref(), r, g, b);
    gl.uniform1f(u.similarity.as_ref(), config.similarity);
    gl.uniform1f(u.smoothness.as_ref(), config.smoothness);
    gl.uniform1f(u.spill.as_ref(), config.spill);
}

/// Compiles and links a program. Shaders created along the way are deleted
/// again when a later step fails.
pub fn build_program(gl: &GL, vertex: &str, fragment: &str) -> Result<(WebGlProgram, [WebGlShader; 2])> {
    let vs = compile_shader(gl, GL::VERTEX_SHADER, vertex)?;
    let fs = match compile_shader(gl, GL::FRAGMENT_SHADER, fragment) {
        Ok(fs) => fs,
        Err(e) => {
            gl.delete_shader(Some(&vs));
            return Err(e);
        }
    };
    match link_program(gl, &vs, &fs) {
        Ok(program) => Ok((program, [vs, fs])),
        Err(e) => {
            gl.delete_shader(Some(&vs));
            gl.delete_shader(Some(&fs));
            Err(e)
        }
    }
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or(FxError::Unsupported("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let info = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(FxError::Shader(info))
    }
}

fn link_program(gl: &GL, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or(FxError::Unsupported("program"))?;
    gl.attach_shader(&program, vs);
    gl.attach_shader(&program, fs);
    gl.link_program(&program);
    let ok = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(program)
    } else {
        let info = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(FxError::Shader(info))
    }
}
