use detect::{Extension, Features, Level};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Failed to read the policy file: {0}.")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse the policy: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid policy: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Masks applied on top of the detected features, for pinning a deployment
/// to a lower code path than the hardware allows.
///
/// ```toml
/// max_level = 8
/// disabled = ["fma4", "xop"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    #[serde(default)]
    #[validate(range(max = 11))]
    pub max_level: Option<u32>,
    #[serde(default)]
    pub disabled: Vec<Extension>,
}

impl Policy {
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn parse(s: &str) -> Result<Self, PolicyError> {
        let policy: Policy = toml::from_str(s)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn apply(&self, mut features: Features) -> Features {
        if let Some(max) = self.max_level {
            // Unvalidated values above the scale cap nothing.
            let max = Level::try_from(max.min(u32::from(Level::MAX))).unwrap_or(Level::MAX);
            features.restrict(max);
        }
        for &extension in &self.disabled {
            features.set(extension, false);
        }
        features
    }
}
