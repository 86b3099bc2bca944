//! Everything tunable, read as JSON from the host page.

use serde::Deserialize;

use crate::chroma::ChromaKeyConfig;
use crate::error::{FxError, Result};
use crate::intro::IntroConfig;
use crate::mascot::MascotConfig;
use crate::particles::ParticleConfig;
use crate::scroll::ScrollConfig;
use crate::tilt::TiltConfig;

/// Id of the `<script type="application/json">` element holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "folio-fx-config";

/// Element ids the effects attach to. Missing elements disable the effect
/// that needs them, except the anchors, which fall back to computed spots.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomConfig {
    pub mascot: String,
    pub mascot_video: String,
    pub mascot_canvas: String,
    pub mascot_bubble: String,
    pub mascot_anchor: String,
    pub tilt_target: String,
    pub particle_canvas: String,
    pub intro: String,
    pub intro_video: String,
    pub intro_canvas: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            mascot: "mascot".into(),
            mascot_video: "mascot-video".into(),
            mascot_canvas: "mascot-canvas".into(),
            mascot_bubble: "mascot-bubble".into(),
            mascot_anchor: "mascot-anchor".into(),
            tilt_target: "profile-card".into(),
            particle_canvas: "particle-field".into(),
            intro: "intro".into(),
            intro_video: "intro-video".into(),
            intro_canvas: "intro-canvas".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level(self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FxConfig {
    pub log_level: LogLevel,
    pub chroma: ChromaKeyConfig,
    pub mascot: MascotConfig,
    pub tilt: TiltConfig,
    pub particles: ParticleConfig,
    pub scroll: ScrollConfig,
    pub intro: IntroConfig,
    pub dom: DomConfig,
    /// Play the intro before the mascot appears.
    pub intro_enabled: bool,
}

impl FxConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FxConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.chroma.validate()?;
        self.mascot.validate()?;
        self.tilt.validate()?;
        self.particles.validate()?;
        self.scroll.validate()?;
        self.intro.validate()?;
        if self.dom.mascot_anchor.is_empty() {
            return Err(FxError::invalid("dom.mascotAnchor", "must not be empty"));
        }
        Ok(())
    }
}
