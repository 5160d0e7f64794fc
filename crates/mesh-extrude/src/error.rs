//! Error types for extrusion with rich diagnostics.
//!
//! Every error carries:
//! - a machine-readable code (`EXTRUDE-XXXX`)
//! - the offending node, element or parameter where one exists
//! - a recovery suggestion
//! - miette help text for terminal display

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use mesh_core::{MeshError, MeshLocation};

/// Result type alias for extrusion operations.
pub type ExtrudeResult<T> = Result<T, ExtrudeError>;

/// Machine-readable error codes for extrusion.
///
/// Codes follow the pattern `EXTRUDE-XXXX` where:
/// - 1xxx = Input and configuration errors
/// - 2xxx = Computation errors
/// - 3xxx = Errors passed through from mesh I/O
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtrudeErrorCode {
    /// EXTRUDE-1001: Reference surface is empty
    EmptySurface = 1001,
    /// EXTRUDE-1002: Invalid parameters
    InvalidParams = 1002,
    /// EXTRUDE-1003: Configuration file could not be parsed
    ConfigParse = 1003,
    /// EXTRUDE-1004: Base element references a missing node
    InvalidBaseNode = 1004,

    /// EXTRUDE-2001: Node count overflows the id type
    TooManyNodes = 2001,
    /// EXTRUDE-2002: Surface has no usable triangles
    DegenerateSurface = 2002,
    /// EXTRUDE-2003: Distance query failed
    OracleFailed = 2003,
    /// EXTRUDE-2004: Column has no positive thickness
    DegenerateColumn = 2004,

    /// EXTRUDE-3001: Underlying mesh error
    MeshFailed = 3001,
}

impl ExtrudeErrorCode {
    /// Returns the error code as a string in the format `EXTRUDE-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtrudeErrorCode::EmptySurface => "EXTRUDE-1001",
            ExtrudeErrorCode::InvalidParams => "EXTRUDE-1002",
            ExtrudeErrorCode::ConfigParse => "EXTRUDE-1003",
            ExtrudeErrorCode::InvalidBaseNode => "EXTRUDE-1004",
            ExtrudeErrorCode::TooManyNodes => "EXTRUDE-2001",
            ExtrudeErrorCode::DegenerateSurface => "EXTRUDE-2002",
            ExtrudeErrorCode::OracleFailed => "EXTRUDE-2003",
            ExtrudeErrorCode::DegenerateColumn => "EXTRUDE-2004",
            ExtrudeErrorCode::MeshFailed => "EXTRUDE-3001",
        }
    }
}

impl std::fmt::Display for ExtrudeErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for extrusion errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtrudeRecoverySuggestion {
    /// Fewer layers keep node ids in range.
    ReduceLayers { current: u32, suggested: u32 },
    /// Accept zero-thickness columns instead of failing.
    ClampDegenerate,
    /// Re-export or repair the reference surface.
    RepairSurface,
    /// Fix the base mesh connectivity.
    CheckBaseMesh,
    /// Fix the configuration file.
    FixConfig,
    /// No specific suggestion.
    None,
}

impl std::fmt::Display for ExtrudeRecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtrudeRecoverySuggestion::ReduceLayers { current, suggested } => {
                write!(f, "Reduce layers from {} to at most {}", current, suggested)
            }
            ExtrudeRecoverySuggestion::ClampDegenerate => {
                write!(
                    f,
                    "Pass --clamp-degenerate to keep zero-thickness columns, or move the flat bound"
                )
            }
            ExtrudeRecoverySuggestion::RepairSurface => {
                write!(f, "Check that the surface file is a valid closed triangulation")
            }
            ExtrudeRecoverySuggestion::CheckBaseMesh => {
                write!(f, "Re-export the base mesh with consistent node numbering")
            }
            ExtrudeRecoverySuggestion::FixConfig => {
                write!(f, "Fix the configuration file syntax and field names")
            }
            ExtrudeRecoverySuggestion::None => {
                write!(f, "No specific suggestion available")
            }
        }
    }
}

/// Errors that can occur during extrusion.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtrudeError {
    /// Reference surface has no triangles.
    #[error("reference surface is empty")]
    #[diagnostic(
        code(extrude::input::empty_surface),
        help("The surface must have at least one triangle. Check that the file was loaded correctly.")
    )]
    EmptySurface,

    /// Invalid parameters.
    #[error("invalid extrusion parameters: {details}")]
    #[diagnostic(
        code(extrude::params::invalid),
        help("Check parameter values: finite margins and flat bounds.")
    )]
    InvalidParams {
        details: String,
        param_name: Option<String>,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse extrusion config{}: {details}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    #[diagnostic(code(extrude::params::config))]
    ConfigParse {
        path: Option<PathBuf>,
        details: String,
    },

    /// Base element references a node that does not exist.
    #[error("base element {element} references node {node} but only {node_count} nodes exist")]
    #[diagnostic(
        code(extrude::input::base_node),
        help("The base mesh connectivity is inconsistent with its node list.")
    )]
    InvalidBaseNode {
        element: usize,
        node: u32,
        node_count: usize,
    },

    /// Extruded node count does not fit the node id type.
    #[error("{base_nodes} base nodes x {} levels exceeds the node id range", u64::from(*layers) + 1)]
    #[diagnostic(
        code(extrude::layout::too_many_nodes),
        help("Reduce the number of layers or coarsen the base mesh.")
    )]
    TooManyNodes { base_nodes: usize, layers: u32 },

    /// Surface has no triangle with positive area.
    #[error("reference surface is degenerate: {details}")]
    #[diagnostic(
        code(extrude::surface::degenerate),
        help("All surface triangles have zero area. Re-export the surface.")
    )]
    DegenerateSurface { details: String },

    /// Distance query returned no usable answer.
    #[error("surface distance query failed at base node {node}: {details}")]
    #[diagnostic(code(extrude::surface::query_failed))]
    OracleFailed { node: usize, details: String },

    /// Column would have zero or negative thickness.
    #[error("column at base node {node} is degenerate: floor {floor:.3} is not below ceiling {ceiling:.3}")]
    #[diagnostic(
        code(extrude::depth::degenerate_column),
        help("The flat bound is on the wrong side of the surface-following bound. Move the flat bound or enable clamping.")
    )]
    DegenerateColumn {
        node: usize,
        floor: f64,
        ceiling: f64,
    },

    /// Underlying mesh error.
    #[error(transparent)]
    #[diagnostic(code(extrude::mesh))]
    Mesh(#[from] MeshError),
}

impl ExtrudeError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ExtrudeErrorCode {
        match self {
            ExtrudeError::EmptySurface => ExtrudeErrorCode::EmptySurface,
            ExtrudeError::InvalidParams { .. } => ExtrudeErrorCode::InvalidParams,
            ExtrudeError::ConfigParse { .. } => ExtrudeErrorCode::ConfigParse,
            ExtrudeError::InvalidBaseNode { .. } => ExtrudeErrorCode::InvalidBaseNode,
            ExtrudeError::TooManyNodes { .. } => ExtrudeErrorCode::TooManyNodes,
            ExtrudeError::DegenerateSurface { .. } => ExtrudeErrorCode::DegenerateSurface,
            ExtrudeError::OracleFailed { .. } => ExtrudeErrorCode::OracleFailed,
            ExtrudeError::DegenerateColumn { .. } => ExtrudeErrorCode::DegenerateColumn,
            ExtrudeError::Mesh(_) => ExtrudeErrorCode::MeshFailed,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> ExtrudeRecoverySuggestion {
        match self {
            ExtrudeError::EmptySurface | ExtrudeError::DegenerateSurface { .. } => {
                ExtrudeRecoverySuggestion::RepairSurface
            }
            ExtrudeError::OracleFailed { .. } => ExtrudeRecoverySuggestion::RepairSurface,
            ExtrudeError::InvalidParams { .. } => ExtrudeRecoverySuggestion::None,
            ExtrudeError::ConfigParse { .. } => ExtrudeRecoverySuggestion::FixConfig,
            ExtrudeError::InvalidBaseNode { .. } => ExtrudeRecoverySuggestion::CheckBaseMesh,
            ExtrudeError::TooManyNodes { base_nodes, layers } => {
                let levels = (u32::MAX as usize) / (*base_nodes).max(1);
                ExtrudeRecoverySuggestion::ReduceLayers {
                    current: *layers,
                    suggested: levels.saturating_sub(1).min(u32::MAX as usize) as u32,
                }
            }
            ExtrudeError::DegenerateColumn { .. } => ExtrudeRecoverySuggestion::ClampDegenerate,
            ExtrudeError::Mesh(_) => ExtrudeRecoverySuggestion::CheckBaseMesh,
        }
    }

    /// Returns the offending node, element or file if known.
    pub fn location(&self) -> Option<MeshLocation> {
        match self {
            ExtrudeError::DegenerateColumn { node, .. } => Some(MeshLocation::Node { index: *node }),
            ExtrudeError::OracleFailed { node, .. } if *node != usize::MAX => {
                Some(MeshLocation::Node { index: *node })
            }
            ExtrudeError::InvalidBaseNode { element, .. } => {
                Some(MeshLocation::Element { index: *element })
            }
            ExtrudeError::ConfigParse {
                path: Some(path), ..
            } => Some(MeshLocation::File {
                path: path.clone(),
                line: None,
                column: None,
            }),
            ExtrudeError::Mesh(inner) => inner.location(),
            _ => None,
        }
    }

    // Constructor helpers

    /// Create an invalid params error naming the parameter.
    pub fn invalid_param(param_name: impl Into<String>, details: impl Into<String>) -> Self {
        ExtrudeError::InvalidParams {
            details: details.into(),
            param_name: Some(param_name.into()),
        }
    }

    /// Create an oracle failure.
    pub fn oracle_failed(node: usize, details: impl Into<String>) -> Self {
        ExtrudeError::OracleFailed {
            node,
            details: details.into(),
        }
    }

    /// Create a degenerate surface error.
    pub fn degenerate_surface(details: impl Into<String>) -> Self {
        ExtrudeError::DegenerateSurface {
            details: details.into(),
        }
    }
}
