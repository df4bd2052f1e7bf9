use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// Configuration for a [`Reconciler`](crate::Reconciler).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Properties whose current value is read back from the host node
    /// rather than trusted from the previous virtual tree, because user
    /// interaction can change them out of band.
    pub live_properties: Vec<String>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            live_properties: vec!["value".into(), "checked".into()],
        }
    }
}

impl ReconcileConfig {
    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> DiffResult<Self> {
        toml::from_str(s).map_err(|e| DiffError::Config(e.to_string()))
    }

    /// Whether `name` is compared against the host's live value.
    pub fn is_live(&self, name: &str) -> bool {
        self.live_properties.iter().any(|p| p == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ReconcileConfig::default();
        assert!(c.is_live("value"));
        assert!(c.is_live("checked"));
        assert!(!c.is_live("class"));
    }

    #[test]
    fn empty_toml_keeps_defaults() {
        let c = ReconcileConfig::from_toml_str("").unwrap();
        assert_eq!(c, ReconcileConfig::default());
    }

    #[test]
    fn toml_overrides_live_properties() {
        let c = ReconcileConfig::from_toml_str(r#"live_properties = ["value", "selected"]"#).unwrap();
        assert!(c.is_live("selected"));
        assert!(!c.is_live("checked"));
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = ReconcileConfig::from_toml_str("live_properties = \"value\"").unwrap_err();
        assert!(matches!(err, DiffError::Config(_)));
    }
}
