//! Tuning parameters. Every numeric constant of the engine lives here, grouped
//! per concern, and the compact and full deployments are two presets of the
//! same [`ProfileConfig`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::viewport::Viewport;

pub const DEFAULT_PALETTE: [&str; 5] = ["#09ff00", "#ff2222", "#2299ff", "#ffbb00", "#bb00ff"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// One chain following pointer, gyroscope or an idle orbit.
    Compact,
    /// A wandering formation with heart episodes.
    Full,
}

impl ProfileKind {
    pub fn for_viewport(viewport: Viewport, threshold: f32) -> Self {
        if viewport.width < threshold || viewport.height < threshold {
            ProfileKind::Compact
        } else {
            ProfileKind::Full
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub segments: usize,
    pub head_smoothing: f32,
    pub margin: f32,
    pub damping: f32,
    pub taper_base: f32,
    pub taper_divisor: f32,
    pub scale_base: f32,
    pub scale_step: f32,
    pub scale_divisor: f32,
    pub scale_factor: f32,
    pub fin_indices: Vec<usize>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            segments: 14,
            head_smoothing: 0.12,
            margin: 30.0,
            damping: 2.5,
            taper_base: 100.0,
            taper_divisor: 5.0,
            scale_base: 162.0,
            scale_step: 4.0,
            scale_divisor: 50.0,
            scale_factor: 0.13,
            fin_indices: vec![8, 12],
        }
    }
}

impl ChainConfig {
    /// Pull strength offset for body segment `index`. Undefined for the head.
    pub fn taper(&self, index: usize) -> f32 {
        debug_assert!(index > 0);
        (self.taper_base - index as f32) / self.taper_divisor
    }

    /// Render scale for body segment `index` with the given overall factor.
    pub fn scale(&self, index: usize, factor: f32) -> f32 {
        debug_assert!(index > 0);
        ((self.scale_base + self.scale_step * (1.0 - index as f32)) / self.scale_divisor) * factor
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub idle_timeout_ms: f64,
    pub phase_step: f32,
    pub radius_x_frac: f32,
    pub radius_y_frac: f32,
    pub y_frequency: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 1000.0,
            phase_step: 0.018,
            radius_x_frac: 0.28,
            radius_y_frac: 0.18,
            y_frequency: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Degrees of tilt that move the target by one full viewport dimension.
    pub sensitivity: f32,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self { sensitivity: 30.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    pub turn_rate: f32,
    pub speed_min: f32,
    pub speed_range: f32,
    pub speed_gain: f32,
    pub wave_phase_step: f32,
    pub wave_phase_step_per_chain: f32,
    pub wave_radius_base: f32,
    pub wave_radius_swing: f32,
    pub wave_period_ms: f64,
    pub wave_chain_offset: f32,
    pub wave_gain: f32,
    pub arrival_radius: f32,
    pub hop_min: f32,
    pub hop_range: f32,
    pub center_bias: f32,
    pub jitter: f32,
    pub min_separation: f32,
    pub max_attempts: u32,
    pub spawn_inset: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            turn_rate: 0.03,
            speed_min: 2.0,
            speed_range: 2.0,
            speed_gain: 1.6,
            wave_phase_step: 0.13,
            wave_phase_step_per_chain: 0.03,
            wave_radius_base: 28.0,
            wave_radius_swing: 8.0,
            wave_period_ms: 900.0,
            wave_chain_offset: 2.0,
            wave_gain: 0.07,
            arrival_radius: 120.0,
            hop_min: 200.0,
            hop_range: 200.0,
            center_bias: 0.25,
            jitter: 80.0,
            min_separation: 80.0,
            max_attempts: 10,
            spawn_inset: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartConfig {
    pub enabled: bool,
    pub first_delay_ms: f64,
    pub interval_ms: f64,
    pub color: String,
    pub speed: f32,
    pub side_offset: f32,
    pub approach_smoothing: f32,
    pub arrival_tolerance: f32,
    pub progress_step: f32,
    pub hold_ms: f64,
    pub curve_scale: f32,
    /// Added to the curve's x before the half is mirrored onto its side. At
    /// `-side_offset` both halves meet on the viewport centre line.
    pub lobe_offset: f32,
    pub scale_factor: f32,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            first_delay_ms: 10_000.0,
            interval_ms: 10_000.0,
            color: "#ff2222".into(),
            speed: 6.0,
            side_offset: 90.0,
            approach_smoothing: 0.18,
            arrival_tolerance: 2.0,
            progress_step: 0.035,
            hold_ms: 5_000.0,
            curve_scale: 7.5,
            lobe_offset: -90.0,
            scale_factor: 0.22,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub fps_cap: Option<f32>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { fps_cap: Some(30.0) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub chain_count: usize,
    pub palette: Vec<String>,
    pub chain: ChainConfig,
    pub orbit: OrbitConfig,
    pub orientation: OrientationConfig,
    pub wander: WanderConfig,
    pub heart: HeartConfig,
    pub frame: FrameConfig,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl ProfileConfig {
    pub fn compact() -> Self {
        Self {
            chain_count: 1,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            chain: ChainConfig::default(),
            orbit: OrbitConfig::default(),
            orientation: OrientationConfig::default(),
            wander: WanderConfig::default(),
            heart: HeartConfig {
                enabled: false,
                ..HeartConfig::default()
            },
            frame: FrameConfig::default(),
        }
    }

    pub fn full() -> Self {
        Self {
            chain_count: 5,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            chain: ChainConfig {
                scale_factor: 0.18,
                ..ChainConfig::default()
            },
            orbit: OrbitConfig::default(),
            orientation: OrientationConfig::default(),
            wander: WanderConfig::default(),
            heart: HeartConfig::default(),
            frame: FrameConfig::default(),
        }
    }

    pub fn color_for(&self, chain: usize) -> String {
        if self.palette.is_empty() {
            return DEFAULT_PALETTE[chain % DEFAULT_PALETTE.len()].to_string();
        }
        self.palette[chain % self.palette.len()].clone()
    }

    fn collect_errors(&self, section: &str, errors: &mut Vec<String>) {
        let chain = &self.chain;
        if chain.segments < 2 {
            errors.push(format!("{section}.chain.segments must be at least 2"));
        }
        if !(chain.damping >= 1.0) {
            errors.push(format!("{section}.chain.damping must be >= 1"));
        }
        if !(chain.head_smoothing > 0.0 && chain.head_smoothing <= 1.0) {
            errors.push(format!("{section}.chain.head_smoothing must be in (0, 1]"));
        }
        if !(chain.margin >= 0.0) {
            errors.push(format!("{section}.chain.margin must not be negative"));
        }
        if chain.taper_divisor == 0.0 || chain.scale_divisor == 0.0 {
            errors.push(format!("{section}.chain divisors must be non-zero"));
        }
        if self.chain_count == 0 {
            errors.push(format!("{section}.chain_count must be at least 1"));
        }
        if self.palette.is_empty() {
            errors.push(format!("{section}.palette must not be empty"));
        }
        if !(self.wander.turn_rate > 0.0 && self.wander.turn_rate <= 1.0) {
            errors.push(format!("{section}.wander.turn_rate must be in (0, 1]"));
        }
        if self.wander.max_attempts == 0 {
            errors.push(format!("{section}.wander.max_attempts must be at least 1"));
        }
        if !(self.heart.progress_step > 0.0) {
            errors.push(format!("{section}.heart.progress_step must be positive"));
        }
        if !(self.heart.approach_smoothing > 0.0 && self.heart.approach_smoothing <= 1.0) {
            errors.push(format!("{section}.heart.approach_smoothing must be in (0, 1]"));
        }
        if self.heart.enabled && !(self.heart.interval_ms > 0.0) {
            errors.push(format!("{section}.heart.interval_ms must be positive"));
        }
        if self.orientation.sensitivity == 0.0 {
            errors.push(format!("{section}.orientation.sensitivity must be non-zero"));
        }
        if let Some(fps) = self.frame.fps_cap {
            if !(fps > 0.0) {
                errors.push(format!("{section}.frame.fps_cap must be positive"));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed RNG seed; entropy is used when absent.
    pub seed: Option<u64>,
    /// Viewports narrower or shorter than this run the compact profile.
    pub profile_threshold: f32,
    pub compact: ProfileConfig,
    pub full: ProfileConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            profile_threshold: 900.0,
            compact: ProfileConfig::compact(),
            full: ProfileConfig::full(),
        }
    }
}

impl EngineConfig {
    pub fn profile(&self, kind: ProfileKind) -> &ProfileConfig {
        match kind {
            ProfileKind::Compact => &self.compact,
            ProfileKind::Full => &self.full,
        }
    }

    pub fn classify(&self, viewport: Viewport) -> ProfileKind {
        ProfileKind::for_viewport(viewport, self.profile_threshold)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load a file, choosing JSON for a `.json` extension and TOML otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        if !(self.profile_threshold >= 0.0) {
            errors.push("profile_threshold must not be negative".to_string());
        }
        self.compact.collect_errors("compact", &mut errors);
        self.full.collect_errors("full", &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn classify_uses_either_dimension() {
        let config = EngineConfig::default();
        assert_eq!(config.classify(Viewport::new(1920.0, 1080.0)), ProfileKind::Full);
        assert_eq!(config.classify(Viewport::new(1920.0, 800.0)), ProfileKind::Compact);
        assert_eq!(config.classify(Viewport::new(390.0, 844.0)), ProfileKind::Compact);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            seed = 7
            [full]
            chain_count = 3
            [full.chain]
            segments = 24
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.full.chain_count, 3);
        assert_eq!(config.full.chain.segments, 24);
        assert_eq!(config.full.chain.damping, 2.5);
        assert_eq!(config.compact.chain_count, 1);
    }

    #[test]
    fn json_loads_too() {
        let config = EngineConfig::from_json_str(r#"{"profile_threshold": 600.0}"#).unwrap();
        assert_eq!(config.profile_threshold, 600.0);
    }

    #[test]
    fn rejects_springy_damping_and_empty_palette() {
        let mut config = EngineConfig::default();
        config.full.chain.damping = 0.5;
        config.compact.palette.clear();
        match config.validate() {
            Err(ConfigError::Invalid(errors)) => {
                assert_eq!(errors.len(), 2, "{errors:?}");
            }
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn scale_shrinks_toward_tail() {
        let chain = ChainConfig::default();
        assert!((chain.scale(1, 1.0) - 162.0 / 50.0).abs() < 1e-6);
        assert!(chain.scale(13, 1.0) < chain.scale(2, 1.0));
        assert!((chain.taper(1) - 99.0 / 5.0).abs() < 1e-6);
    }
}
