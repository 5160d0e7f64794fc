//! Extrusion parameters and their TOML representation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::connectivity::TagPolicy;
use crate::depth::DegeneratePolicy;
use crate::error::{ExtrudeError, ExtrudeResult};
use crate::layering::{ColumnAnchor, FlatBound};

/// Parameters controlling the extrusion.
///
/// # Example TOML
///
/// ```toml
/// layers = 30
/// anchor = "below"
/// degenerate_policy = "reject"
/// tag_policy = "propagate"
///
/// [flat_bound]
/// margin = 6000.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrudeParams {
    /// Number of hexahedral layers per column (default: 30).
    pub layers: u32,
    /// Which surface extreme the distance queries start from (default: below).
    pub anchor: ColumnAnchor,
    /// Position of the flat column bound (default: 6000 below the surface minimum).
    pub flat_bound: FlatBound,
    /// Tag assignment for volume elements (default: propagate).
    pub tag_policy: TagPolicy,
    /// Handling of columns without positive thickness (default: reject).
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for ExtrudeParams {
    fn default() -> Self {
        Self {
            layers: 30,
            anchor: ColumnAnchor::Below,
            flat_bound: FlatBound::default(),
            tag_policy: TagPolicy::Propagate,
            degenerate_policy: DegeneratePolicy::Reject,
        }
    }
}

impl ExtrudeParams {
    /// A water column over bathymetry: ceiling follows the surface, flat
    /// floor 6000 below its deepest point.
    pub fn for_bathymetry() -> Self {
        Self::default()
    }

    /// A rock column under a bedrock surface: floor follows the surface, flat
    /// ceiling at `top`.
    pub fn for_bedrock(top: f64) -> Self {
        Self {
            anchor: ColumnAnchor::Above,
            flat_bound: FlatBound::Absolute(top),
            ..Self::default()
        }
    }

    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_anchor(mut self, anchor: ColumnAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_flat_bound(mut self, flat_bound: FlatBound) -> Self {
        self.flat_bound = flat_bound;
        self
    }

    pub fn with_tag_policy(mut self, tag_policy: TagPolicy) -> Self {
        self.tag_policy = tag_policy;
        self
    }

    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ExtrudeResult<()> {
        if !self.flat_bound.is_finite() {
            return Err(ExtrudeError::invalid_param(
                "flat_bound",
                format!("{:?} is not finite", self.flat_bound),
            ));
        }
        if let FlatBound::Margin(m) = self.flat_bound {
            if m < 0.0 {
                return Err(ExtrudeError::invalid_param(
                    "flat_bound",
                    format!("margin {} is negative", m),
                ));
            }
        }
        Ok(())
    }

    /// Parse parameters from TOML; missing fields take their defaults.
    pub fn from_toml(toml_str: &str) -> ExtrudeResult<Self> {
        let params: Self = toml::from_str(toml_str).map_err(|e| ExtrudeError::ConfigParse {
            path: None,
            details: e.to_string(),
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ExtrudeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| mesh_core::MeshError::io_read(path, e))?;
        Self::from_toml(&contents).map_err(|e| match e {
            ExtrudeError::ConfigParse { details, .. } => ExtrudeError::ConfigParse {
                path: Some(path.to_path_buf()),
                details,
            },
            other => other,
        })
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> ExtrudeResult<String> {
        toml::to_string_pretty(self).map_err(|e| ExtrudeError::ConfigParse {
            path: None,
            details: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ExtrudeParams::default();
        assert_eq!(params.layers, 30);
        assert_eq!(params.anchor, ColumnAnchor::Below);
        assert_eq!(params.flat_bound, FlatBound::Margin(6000.0));
        assert_eq!(params.tag_policy, TagPolicy::Propagate);
        assert_eq!(params.degenerate_policy, DegeneratePolicy::Reject);
        assert_eq!(ExtrudeParams::for_bathymetry(), params);
    }

    #[test]
    fn test_bedrock_preset() {
        let params = ExtrudeParams::for_bedrock(30000.0);
        assert_eq!(params.anchor, ColumnAnchor::Above);
        assert_eq!(params.flat_bound, FlatBound::Absolute(30000.0));
        assert_eq!(params.layers, 30);
    }

    #[test]
    fn test_partial_toml() {
        let params = ExtrudeParams::from_toml(
            r#"
layers = 12
anchor = "above"

[flat_bound]
absolute = 2500.0
"#,
        )
        .unwrap();
        assert_eq!(params.layers, 12);
        assert_eq!(params.anchor, ColumnAnchor::Above);
        assert_eq!(params.flat_bound, FlatBound::Absolute(2500.0));
        assert_eq!(params.tag_policy, TagPolicy::Propagate);
    }

    #[test]
    fn test_placeholder_tags_toml() {
        let params = ExtrudeParams::from_toml(
            r#"
[tag_policy.placeholder]
physical = 99
elementary = 2
"#,
        )
        .unwrap();
        assert_eq!(params.tag_policy, TagPolicy::LEGACY_PLACEHOLDER);
    }

    #[test]
    fn test_toml_roundtrip() {
        let params = ExtrudeParams::for_bedrock(30000.0)
            .with_layers(8)
            .with_degenerate_policy(DegeneratePolicy::Clamp);
        let text = params.to_toml().unwrap();
        assert_eq!(ExtrudeParams::from_toml(&text).unwrap(), params);
    }

    #[test]
    fn test_bad_toml() {
        let err = ExtrudeParams::from_toml("layers = \"many\"").unwrap_err();
        assert!(matches!(err, ExtrudeError::ConfigParse { path: None, .. }));

        let err = ExtrudeParams::from_toml("anchor = \"sideways\"").unwrap_err();
        assert!(matches!(err, ExtrudeError::ConfigParse { .. }));
    }

    #[test]
    fn test_negative_margin_rejected() {
        let err = ExtrudeParams::default()
            .with_flat_bound(FlatBound::Margin(-1.0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ExtrudeError::InvalidParams { .. }));
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extrude.toml");
        std::fs::write(&path, "layers = 5\n").unwrap();
        assert_eq!(ExtrudeParams::from_toml_file(&path).unwrap().layers, 5);

        std::fs::write(&path, "layers = -5\n").unwrap();
        match ExtrudeParams::from_toml_file(&path).unwrap_err() {
            ExtrudeError::ConfigParse { path: Some(p), .. } => assert_eq!(p, path),
            other => panic!("Expected ConfigParse, got {:?}", other),
        }
    }
}
