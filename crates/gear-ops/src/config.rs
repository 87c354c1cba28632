//! JSON configuration for a generator run.

use gear_geometry::GearParameters;
use gear_kernel::Kernel;
use serde::{Deserialize, Serialize};

use crate::abenics::{generate_abenics, AbenicsOutput};
use crate::engrave::EngraveConfig;
use crate::types::OpError;

/// Everything needed to generate an ABENICS gear pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub gear: GearParameters,
    pub engrave: EngraveConfig,
    /// Cut the SH gear's second, orthogonal tooth family.
    pub cross_teeth: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            gear: GearParameters::default(),
            engrave: EngraveConfig::default(),
            cross_teeth: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse a config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, OpError> {
        serde_json::from_str(json).map_err(|e| OpError::Config {
            reason: e.to_string(),
        })
    }

    pub fn to_json_string(&self) -> Result<String, OpError> {
        serde_json::to_string_pretty(self).map_err(|e| OpError::Config {
            reason: e.to_string(),
        })
    }

    /// Generate the configured gear pair.
    pub fn generate(&self, kernel: &mut dyn Kernel) -> Result<AbenicsOutput, OpError> {
        generate_abenics(kernel, &self.gear, &self.engrave, self.cross_teeth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gear_geometry::{LengthUnit, PressureAngle};

    #[test]
    fn empty_object_gives_defaults() {
        let config = GeneratorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.gear.teeth_sh, 40);
        assert_eq!(config.engrave.steps, 36);
        assert!(config.cross_teeth);
    }

    #[test]
    fn nested_fields_override_defaults() {
        let json = r#"{
            "gear": { "module": 2.0, "pressure_angle": { "custom": 0.3 }, "unit": "millimeter" },
            "engrave": { "steps": 24, "fold_groups": false },
            "cross_teeth": false
        }"#;
        let config = GeneratorConfig::from_json_str(json).unwrap();
        assert_eq!(config.gear.module, 2.0);
        assert_eq!(config.gear.pressure_angle, PressureAngle::Custom(0.3));
        assert_eq!(config.gear.unit, LengthUnit::Millimeter);
        assert_eq!(config.gear.teeth_sh, 40);
        assert_eq!(config.engrave.steps, 24);
        assert!(config.engrave.group_steps);
        assert!(!config.cross_teeth);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = GeneratorConfig::from_json_str(r#"{"gear": {"teeth_sh": "many"}}"#).unwrap_err();
        assert!(matches!(err, OpError::Config { .. }));
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let config = GeneratorConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(GeneratorConfig::from_json_str(&json).unwrap(), config);
    }
}
