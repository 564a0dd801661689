//! Per-capturer mirror settings
//!
//! Explicit configuration value object; a copy is taken at
//! registration time, so later edits to the defaults do not retouch
//! existing registrations.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// UI-facing parameters of one mirror.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MirrorSettings {
    /// Enable the gaze-following crop window
    #[serde(default)]
    pub cropping_enabled: bool,

    /// Crop half-size in normalized view coordinates [0, 1]
    #[serde(default = "default_crop_size")]
    pub crop_size: f32,

    /// Main texture transparency [0, 1]
    #[serde(default = "default_transparency")]
    pub transparency: f32,

    /// Mirror border size [0, 0.5]
    #[serde(default = "default_border_size")]
    pub border_size: f32,
}

fn default_crop_size() -> f32 {
    0.5
}

fn default_transparency() -> f32 {
    1.0
}

fn default_border_size() -> f32 {
    0.01
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            cropping_enabled: false,
            crop_size: default_crop_size(),
            transparency: default_transparency(),
            border_size: default_border_size(),
        }
    }
}

impl MirrorSettings {
    /// Range-check all fields.
    ///
    /// # Errors
    /// Returns `ContractError::ConfigValidation` naming the offending
    /// field.
    pub fn validate(&self) -> Result<(), ContractError> {
        if !(0.0..=1.0).contains(&self.crop_size) {
            return Err(ContractError::config_validation(
                "mirror.crop_size",
                "must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.transparency) {
            return Err(ContractError::config_validation(
                "mirror.transparency",
                "must be within [0, 1]",
            ));
        }
        if !(0.0..=0.5).contains(&self.border_size) {
            return Err(ContractError::config_validation(
                "mirror.border_size",
                "must be within [0, 0.5]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(MirrorSettings::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut s = MirrorSettings::default();
        s.crop_size = 1.5;
        assert!(s.validate().is_err());

        let mut s = MirrorSettings::default();
        s.transparency = -0.1;
        assert!(s.validate().is_err());

        let mut s = MirrorSettings::default();
        s.border_size = 0.6;
        assert!(s.validate().is_err());
    }
}
