//! Precision profiles controlling every threshold used by the matcher.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Result};
use crate::traits::Validate;

/// Distance, ratio and angle thresholds for one comparison.
///
/// Distances are in drawing units (millimetres by convention), angles in
/// radians. A profile is a plain value: it is built once and passed by
/// reference into matching, never stored globally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceProfile {
    /// Positional tolerance for geometric primitives.
    pub position: f64,
    /// Allowed relative length difference (0.01 = 1%).
    pub length_ratio: f64,
    /// Angular tolerance.
    pub angle: f64,
    /// Minimum similarity for a pair to be accepted, in `[0, 1]`.
    pub similarity_threshold: f64,
    /// Positional tolerance for text labels.
    pub text_position: f64,
}

impl ToleranceProfile {
    pub fn new(
        position: f64,
        length_ratio: f64,
        angle: f64,
        similarity_threshold: f64,
        text_position: f64,
    ) -> Self {
        Self {
            position,
            length_ratio,
            angle,
            similarity_threshold,
            text_position,
        }
    }

    /// Micrometre-grade drawings.
    pub fn ultra_high() -> Self {
        Self::new(0.01, 0.001, 0.0035, 0.98, 0.1)
    }

    /// Precision engineering drawings.
    pub fn high() -> Self {
        Self::new(0.05, 0.005, 0.009, 0.95, 0.5)
    }

    /// General engineering drawings.
    pub fn standard() -> Self {
        Self::new(0.1, 0.01, 0.017, 0.85, 1.0)
    }

    /// Hand-drawn or low-resolution scanned drawings.
    pub fn loose() -> Self {
        Self::new(0.5, 0.05, 0.087, 0.7, 2.0)
    }

    /// The standard profile with the given fields replaced.
    pub fn custom(overrides: ToleranceOverrides) -> Self {
        Self::standard().with_overrides(overrides)
    }

    /// Replace every field set in `overrides`, keeping the rest.
    pub fn with_overrides(mut self, overrides: ToleranceOverrides) -> Self {
        if let Some(v) = overrides.position {
            self.position = v;
        }
        if let Some(v) = overrides.length_ratio {
            self.length_ratio = v;
        }
        if let Some(v) = overrides.angle {
            self.angle = v;
        }
        if let Some(v) = overrides.similarity_threshold {
            self.similarity_threshold = v;
        }
        if let Some(v) = overrides.text_position {
            self.text_position = v;
        }
        self
    }

    /// Scale the linear tolerances, e.g. when a drawing is plotted at a
    /// different scale. Ratios, angles and the threshold are unit-free and
    /// stay unchanged.
    pub fn scale(&self, factor: f64) -> Result<Self> {
        if !(factor > 0.0) || !factor.is_finite() {
            return Err(DiffError::Tolerance(format!(
                "scale factor must be positive, got {factor}"
            )));
        }
        Ok(Self {
            position: self.position * factor,
            text_position: self.text_position * factor,
            ..*self
        })
    }

    /// Whether two profiles are close enough that their results can be
    /// compared: main tolerances within 50% and thresholds within 0.2.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        relative_diff(self.position, other.position) <= 0.5
            && relative_diff(self.length_ratio, other.length_ratio) <= 0.5
            && relative_diff(self.angle, other.angle) <= 0.5
            && (self.similarity_threshold - other.similarity_threshold).abs() <= 0.2
    }

    pub fn description(&self) -> String {
        format!(
            "position: {}mm, length: {:.1}%, angle: {:.1}°, threshold: {:.0}%",
            self.position,
            self.length_ratio * 100.0,
            self.angle.to_degrees(),
            self.similarity_threshold * 100.0
        )
    }

    /// Parse a profile from JSON. Missing fields fall back to the standard
    /// preset; `angle_degrees` is accepted in place of `angle`.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(obj) = value.as_object_mut() {
            if !obj.contains_key("angle") {
                if let Some(deg) = obj.remove("angle_degrees").and_then(|v| v.as_f64()) {
                    obj.insert("angle".into(), serde_json::json!(deg.to_radians()));
                }
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a JSON profile from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl Default for ToleranceProfile {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Display for ToleranceProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ToleranceProfile({})", self.description())
    }
}

impl Validate for ToleranceProfile {
    fn validate(&self) -> Result<()> {
        let non_negative = [
            ("position", self.position),
            ("angle", self.angle),
            ("text_position", self.text_position),
        ];
        for (name, v) in non_negative {
            if !(v >= 0.0) {
                return Err(DiffError::Tolerance(format!(
                    "{name} must be non-negative, got {v}"
                )));
            }
        }
        let unit_interval = [
            ("length_ratio", self.length_ratio),
            ("similarity_threshold", self.similarity_threshold),
        ];
        for (name, v) in unit_interval {
            if !(0.0..=1.0).contains(&v) {
                return Err(DiffError::Tolerance(format!(
                    "{name} must be within [0, 1], got {v}"
                )));
            }
        }
        Ok(())
    }
}

fn relative_diff(a: f64, b: f64) -> f64 {
    let max = a.abs().max(b.abs());
    if max == 0.0 {
        0.0
    } else {
        (a - b).abs() / max
    }
}

/// Field-by-field overrides applied on top of a base profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceOverrides {
    pub position: Option<f64>,
    pub length_ratio: Option<f64>,
    pub angle: Option<f64>,
    pub similarity_threshold: Option<f64>,
    pub text_position: Option<f64>,
}

/// The four named precision levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    UltraHigh,
    High,
    Standard,
    Loose,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::UltraHigh, Preset::High, Preset::Standard, Preset::Loose];

    pub fn profile(self) -> ToleranceProfile {
        match self {
            Preset::UltraHigh => ToleranceProfile::ultra_high(),
            Preset::High => ToleranceProfile::high(),
            Preset::Standard => ToleranceProfile::standard(),
            Preset::Loose => ToleranceProfile::loose(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::UltraHigh => "ultra_high",
            Preset::High => "high",
            Preset::Standard => "standard",
            Preset::Loose => "loose",
        }
    }
}

impl FromStr for Preset {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ultra_high" | "ultra_precise" => Ok(Preset::UltraHigh),
            "high" | "high_precision" => Ok(Preset::High),
            "standard" => Ok(Preset::Standard),
            "loose" | "relaxed" => Ok(Preset::Loose),
            _ => Err(DiffError::UnknownPreset(s.to_string())),
        }
    }
}

impl From<Preset> for ToleranceProfile {
    fn from(preset: Preset) -> Self {
        preset.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_presets_tighten_monotonically() {
        let profiles: Vec<_> = Preset::ALL.iter().map(|p| p.profile()).collect();
        for pair in profiles.windows(2) {
            assert!(pair[0].position < pair[1].position);
            assert!(pair[0].angle < pair[1].angle);
            assert!(pair[0].similarity_threshold > pair[1].similarity_threshold);
        }
        for p in &profiles {
            p.validate().unwrap();
        }
    }

    #[test]
    fn test_custom_overrides_only_named_fields() {
        let profile = ToleranceProfile::custom(ToleranceOverrides {
            similarity_threshold: Some(0.7),
            ..Default::default()
        });
        assert_eq!(profile.similarity_threshold, 0.7);
        assert_eq!(profile.position, ToleranceProfile::standard().position);
    }

    #[test]
    fn test_scale_keeps_unitless_fields() {
        let scaled = ToleranceProfile::standard().scale(2.0).unwrap();
        assert_relative_eq!(scaled.position, 0.2);
        assert_relative_eq!(scaled.text_position, 2.0);
        assert_eq!(scaled.angle, ToleranceProfile::standard().angle);
        assert!(ToleranceProfile::standard().scale(0.0).is_err());
        assert!(ToleranceProfile::standard().scale(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut p = ToleranceProfile::standard();
        p.position = -1.0;
        assert!(p.validate().is_err());

        let mut p = ToleranceProfile::standard();
        p.similarity_threshold = 1.5;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_from_json_partial_and_degrees() {
        let p = ToleranceProfile::from_json(r#"{"position": 0.2, "angle_degrees": 2.0}"#).unwrap();
        assert_eq!(p.position, 0.2);
        assert_relative_eq!(p.angle, 2.0_f64.to_radians());
        assert_eq!(p.text_position, ToleranceProfile::standard().text_position);
    }

    #[test]
    fn test_json_round_trip() {
        let p = ToleranceProfile::high();
        let back = ToleranceProfile::from_json(&p.to_json().unwrap()).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tolerance.json");
        std::fs::write(&path, r#"{"similarity_threshold": 0.9}"#).unwrap();
        let p = ToleranceProfile::load(&path).unwrap();
        assert_eq!(p.similarity_threshold, 0.9);

        assert!(matches!(
            ToleranceProfile::load(dir.path().join("missing.json")),
            Err(DiffError::Io(_))
        ));
    }

    #[test]
    fn test_preset_names() {
        assert_eq!("relaxed".parse::<Preset>().unwrap(), Preset::Loose);
        assert_eq!("Ultra-High".parse::<Preset>().unwrap(), Preset::UltraHigh);
        assert!(matches!("coarse".parse::<Preset>(), Err(DiffError::UnknownPreset(_))));
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
    }

    #[test]
    fn test_compatibility() {
        let standard = ToleranceProfile::standard();
        assert!(standard.is_compatible_with(&standard));
        assert!(!standard.is_compatible_with(&ToleranceProfile::ultra_high()));
    }

    #[test]
    fn test_description_mentions_degrees() {
        let d = ToleranceProfile::standard().description();
        assert!(d.contains("1.0°"), "{d}");
        assert!(d.contains("85%"), "{d}");
    }
}
