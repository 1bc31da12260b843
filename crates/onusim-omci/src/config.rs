//! Responder configuration.
//!
//! Values come from, in increasing precedence: [`OmciConfig::default`], a
//! TOML file, then `ONUSIM_*` environment variables.
//!
//! ```toml
//! mib_upload_steps = 67
//! reset_policy = "counters-only"
//! strict_catalogue = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalogue::catalogue;
use crate::error::{OmciError, OmciResult};

/// Environment variable names.
pub mod env_vars {
    pub const MIB_UPLOAD_STEPS: &str = "ONUSIM_MIB_UPLOAD_STEPS";
    pub const RESET_POLICY: &str = "ONUSIM_RESET_POLICY";
    pub const STRICT_CATALOGUE: &str = "ONUSIM_STRICT_CATALOGUE";
}

/// What a MIB reset restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// Upload and instance counters only; lifecycle and GEM port id survive.
    #[default]
    CountersOnly,
    /// Counters, and the ONU also returns to incomplete with no GEM port.
    Full,
}

impl std::str::FromStr for ResetPolicy {
    type Err = OmciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "counters-only" | "counters_only" | "counters" => Ok(Self::CountersOnly),
            "full" => Ok(Self::Full),
            other => Err(OmciError::Config(format!("unknown reset policy '{}'", other))),
        }
    }
}

/// OMCI responder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OmciConfig {
    /// Upload next count announced by MIB upload. Derived from the catalogue when unset.
    pub mib_upload_steps: Option<u16>,
    pub reset_policy: ResetPolicy,
    /// Reject a configured upload count that disagrees with the catalogue.
    pub strict_catalogue: bool,
}

impl OmciConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> OmciResult<Self> {
        toml::from_str(content)
            .map_err(|e| OmciError::Config(format!("failed to parse TOML: {}", e)))
    }

    /// Load a TOML file and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> OmciResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            OmciError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults with environment overrides.
    pub fn from_env() -> OmciResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `ONUSIM_*` variables that are set.
    pub fn apply_env(&mut self) -> OmciResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> OmciResult<()> {
        if let Some(value) = lookup(env_vars::MIB_UPLOAD_STEPS) {
            let steps = value.trim().parse::<u16>().map_err(|e| {
                OmciError::Config(format!("{}: {}", env_vars::MIB_UPLOAD_STEPS, e))
            })?;
            self.mib_upload_steps = Some(steps);
        }
        if let Some(value) = lookup(env_vars::RESET_POLICY) {
            self.reset_policy = value.parse()?;
        }
        if let Some(value) = lookup(env_vars::STRICT_CATALOGUE) {
            self.strict_catalogue = value.trim().parse().map_err(|e| {
                OmciError::Config(format!("{}: {}", env_vars::STRICT_CATALOGUE, e))
            })?;
        }
        Ok(())
    }

    /// Upload next count announced to the OLT.
    pub fn upload_steps(&self) -> u16 {
        self.mib_upload_steps.unwrap_or_else(catalogue_steps)
    }

    /// Check the announced upload count against the catalogue.
    pub fn validate(&self) -> OmciResult<()> {
        let expected = catalogue_steps();
        let announced = self.upload_steps();
        if announced == expected {
            return Ok(());
        }
        if self.strict_catalogue {
            return Err(OmciError::Config(format!(
                "mib_upload_steps is {} but the catalogue has {} entries",
                announced, expected
            )));
        }
        tracing::warn!(
            announced,
            expected,
            "Announced MIB upload count differs from the catalogue"
        );
        Ok(())
    }
}

fn catalogue_steps() -> u16 {
    u16::try_from(catalogue().len()).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_derives_steps_from_catalogue() {
        let config = OmciConfig::default();
        assert_eq!(config.mib_upload_steps, None);
        assert_eq!(config.upload_steps(), 67);
        assert_eq!(config.reset_policy, ResetPolicy::CountersOnly);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = OmciConfig::from_toml_str(
            r#"
            mib_upload_steps = 60
            reset_policy = "full"
            "#,
        )
        .unwrap();
        assert_eq!(config.upload_steps(), 60);
        assert_eq!(config.reset_policy, ResetPolicy::Full);
        assert!(!config.strict_catalogue);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = OmciConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(OmciError::Config(_))));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onusim.toml");
        std::fs::write(&path, "strict_catalogue = true\n").unwrap();

        let config = OmciConfig::load(&path).unwrap();
        if std::env::var(env_vars::STRICT_CATALOGUE).is_err() {
            assert!(config.strict_catalogue);
        }
    }

    #[test]
    fn test_from_toml_rejects_unknown_policy() {
        let result = OmciConfig::from_toml_str("reset_policy = \"sometimes\"");
        assert!(matches!(result, Err(OmciError::Config(_))));
    }

    #[test]
    fn test_validate_drift() {
        let lenient = OmciConfig {
            mib_upload_steps: Some(66),
            ..Default::default()
        };
        assert!(lenient.validate().is_ok());

        let strict = OmciConfig {
            mib_upload_steps: Some(66),
            strict_catalogue: true,
            ..Default::default()
        };
        assert!(matches!(strict.validate(), Err(OmciError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (env_vars::MIB_UPLOAD_STEPS, "70"),
            (env_vars::RESET_POLICY, "Full"),
            (env_vars::STRICT_CATALOGUE, "true"),
        ]);
        let mut config = OmciConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.mib_upload_steps, Some(70));
        assert_eq!(config.reset_policy, ResetPolicy::Full);
        assert!(config.strict_catalogue);
    }

    #[test]
    fn test_bad_override() {
        let mut config = OmciConfig::default();
        let result = config.apply_overrides(|name| {
            (name == env_vars::MIB_UPLOAD_STEPS).then(|| "many".to_string())
        });
        assert!(matches!(result, Err(OmciError::Config(_))));
    }
}
