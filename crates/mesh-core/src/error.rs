//! Error types for mesh loading, validation and emission.
//!
//! Every error carries:
//! - A machine-readable code (`MESH-XXXX`)
//! - Location information where it is known (node, element, file position)
//! - A recovery suggestion
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! - `MESH-1xxx`: I/O errors (file reading, writing, parsing)
//! - `MESH-2xxx`: Validation errors (indices, coordinates, degenerate elements)
//! - `MESH-4xxx`: Format errors (unsupported or malformed data)

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes for mesh operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// MESH-1001: Failed to read file
    IoRead = 1001,
    /// MESH-1002: Failed to write file
    IoWrite = 1002,
    /// MESH-1003: Failed to parse file
    ParseError = 1003,

    /// MESH-2001: Element references a node that does not exist
    InvalidNodeIndex = 2001,
    /// MESH-2002: Node has a NaN or infinite coordinate
    InvalidCoordinate = 2002,
    /// MESH-2003: Mesh has no nodes or no elements
    EmptyMesh = 2003,
    /// MESH-2004: Element repeats one of its nodes
    DegenerateElement = 2004,

    /// MESH-4001: Unsupported file format
    UnsupportedFormat = 4001,
    /// MESH-4002: Reference surface failed structural validation
    MalformedSurface = 4002,
    /// MESH-4003: Element type cannot be extruded
    UnsupportedElement = 4003,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `MESH-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "MESH-1001",
            ErrorCode::IoWrite => "MESH-1002",
            ErrorCode::ParseError => "MESH-1003",
            ErrorCode::InvalidNodeIndex => "MESH-2001",
            ErrorCode::InvalidCoordinate => "MESH-2002",
            ErrorCode::EmptyMesh => "MESH-2003",
            ErrorCode::DegenerateElement => "MESH-2004",
            ErrorCode::UnsupportedFormat => "MESH-4001",
            ErrorCode::MalformedSurface => "MESH-4002",
            ErrorCode::UnsupportedElement => "MESH-4003",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for mesh errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Re-export the file from the meshing tool.
    ReexportFile { format: Option<String> },
    /// Use a different file format.
    UseDifferentFormat { suggested: Vec<String> },
    /// Check the input data.
    CheckSourceMesh { checks: Vec<String> },
    /// Manual intervention is required.
    ManualIntervention { description: String },
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ReexportFile { format } => {
                if let Some(fmt) = format {
                    write!(f, "Try re-exporting the mesh as {} from the meshing tool", fmt)
                } else {
                    write!(f, "Try re-exporting the mesh from the meshing tool")
                }
            }
            RecoverySuggestion::UseDifferentFormat { suggested } => {
                write!(f, "Try using a different format: {}", suggested.join(", "))
            }
            RecoverySuggestion::CheckSourceMesh { checks } => {
                write!(f, "Check the input for: {}", checks.join(", "))
            }
            RecoverySuggestion::ManualIntervention { description } => {
                write!(f, "{}", description)
            }
        }
    }
}

/// Location information for mesh errors.
#[derive(Debug, Clone)]
pub enum MeshLocation {
    /// Error at a specific node.
    Node { index: usize },
    /// Error at a specific element.
    Element { index: usize },
    /// Error in a file, optionally at a line and column.
    File {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
    },
}

impl std::fmt::Display for MeshLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshLocation::Node { index } => write!(f, "node {}", index),
            MeshLocation::Element { index } => write!(f, "element {}", index),
            MeshLocation::File { path, line, column } => {
                let mut result = path.display().to_string();
                if let Some(l) = line {
                    result.push_str(&format!(":{}", l));
                    if let Some(c) = column {
                        result.push_str(&format!(":{}", c));
                    }
                }
                write!(f, "{}", result)
            }
        }
    }
}

/// Errors that can occur while reading, validating or writing meshes.
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    /// Error reading from a file.
    #[error("failed to read {path}")]
    #[diagnostic(
        code(mesh::io::read),
        help("Check that the file exists and is readable. Try: ls -la {}", path.display())
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write {path}")]
    #[diagnostic(
        code(mesh::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a mesh file.
    #[error("failed to parse {path}: {details}")]
    #[diagnostic(
        code(mesh::parse::error),
        help("The file may be truncated or written by an unsupported Gmsh version. Re-export it as MSH 2.2.")
    )]
    ParseError { path: PathBuf, details: String },

    /// Unsupported file format.
    #[error("unsupported mesh format: {extension:?}")]
    #[diagnostic(
        code(mesh::format::unsupported),
        help("Base meshes: .msh (Gmsh 2.2). Surfaces: .gts, .stl. Output: .msh, .vtk")
    )]
    UnsupportedFormat { extension: Option<String> },

    /// Reference surface is not a valid triangulated surface.
    #[error("{}:{line}:{column}: {message}", path.display())]
    #[diagnostic(
        code(mesh::format::malformed_surface),
        help("The file is not a valid GTS surface. STL files can be converted with stl2gts.")
    )]
    MalformedSurface {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Element type that cannot be part of a quadrilateral base mesh.
    #[error("element {element_id} in {path} has unsupported type {element_type}")]
    #[diagnostic(
        code(mesh::format::unsupported_element),
        help("Only 4-node quadrilaterals (type 3) can be extruded. Recombine the 2D mesh into quads.")
    )]
    UnsupportedElement {
        path: PathBuf,
        element_id: usize,
        element_type: i32,
    },

    /// Empty mesh (no nodes or elements).
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(mesh::validation::empty),
        help("The mesh must have at least one node and one element.")
    )]
    EmptyMesh { details: String },

    /// Element references a node outside the node range.
    #[error(
        "invalid node index: element {element_index} references node {node_index}, but mesh only has {node_count} nodes"
    )]
    #[diagnostic(
        code(mesh::validation::node_index),
        help("The element and node sections disagree. Regenerate the mesh.")
    )]
    InvalidNodeIndex {
        element_index: usize,
        node_index: usize,
        node_count: usize,
    },

    /// Invalid coordinate value (NaN or infinity).
    #[error("invalid coordinate at node {node_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(mesh::validation::coordinate),
        help("Check the source data for numerical issues.")
    )]
    InvalidCoordinate {
        node_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// Element uses the same node twice.
    #[error("element {element_index} uses node {node_index} more than once")]
    #[diagnostic(
        code(mesh::validation::degenerate_element),
        help("Collapsed quadrilaterals produce zero-volume hexahedra. Remove them from the base mesh.")
    )]
    DegenerateElement {
        element_index: usize,
        node_index: usize,
    },
}

impl MeshError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::IoRead { .. } => ErrorCode::IoRead,
            MeshError::IoWrite { .. } => ErrorCode::IoWrite,
            MeshError::ParseError { .. } => ErrorCode::ParseError,
            MeshError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            MeshError::MalformedSurface { .. } => ErrorCode::MalformedSurface,
            MeshError::UnsupportedElement { .. } => ErrorCode::UnsupportedElement,
            MeshError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            MeshError::InvalidNodeIndex { .. } => ErrorCode::InvalidNodeIndex,
            MeshError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            MeshError::DegenerateElement { .. } => ErrorCode::DegenerateElement,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            MeshError::IoRead { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            MeshError::IoWrite { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["directory exists".into(), "write permissions".into()],
            },
            MeshError::ParseError { .. } => RecoverySuggestion::ReexportFile {
                format: Some("Gmsh MSH 2.2".into()),
            },
            MeshError::UnsupportedFormat { .. } => RecoverySuggestion::UseDifferentFormat {
                suggested: vec!["MSH".into(), "GTS".into(), "STL".into(), "VTK".into()],
            },
            MeshError::MalformedSurface { .. } => RecoverySuggestion::ReexportFile {
                format: Some("GTS".into()),
            },
            MeshError::UnsupportedElement { .. } => RecoverySuggestion::ReexportFile {
                format: Some("an all-quadrilateral Gmsh mesh".into()),
            },
            MeshError::EmptyMesh { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["mesh has geometry".into(), "correct export settings".into()],
            },
            MeshError::InvalidNodeIndex { .. } => RecoverySuggestion::ManualIntervention {
                description: "Regenerate the base mesh; its elements reference missing nodes"
                    .into(),
            },
            MeshError::InvalidCoordinate { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["coordinate values".into(), "export precision".into()],
            },
            MeshError::DegenerateElement { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["collapsed quadrilaterals".into()],
            },
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<MeshLocation> {
        match self {
            MeshError::InvalidNodeIndex { element_index, .. }
            | MeshError::DegenerateElement { element_index, .. } => Some(MeshLocation::Element {
                index: *element_index,
            }),
            MeshError::InvalidCoordinate { node_index, .. } => {
                Some(MeshLocation::Node { index: *node_index })
            }
            MeshError::MalformedSurface {
                path, line, column, ..
            } => Some(MeshLocation::File {
                path: path.clone(),
                line: Some(*line),
                column: Some(*column),
            }),
            MeshError::IoRead { path, .. }
            | MeshError::IoWrite { path, .. }
            | MeshError::ParseError { path, .. }
            | MeshError::UnsupportedElement { path, .. } => Some(MeshLocation::File {
                path: path.clone(),
                line: None,
                column: None,
            }),
            _ => None,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        MeshError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create a MalformedSurface error.
    pub fn malformed_surface(
        path: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        MeshError::MalformedSurface {
            path: path.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an EmptyMesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        MeshError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create an InvalidNodeIndex error.
    pub fn invalid_node_index(element_index: usize, node_index: usize, node_count: usize) -> Self {
        MeshError::InvalidNodeIndex {
            element_index,
            node_index,
            node_count,
        }
    }

    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(node_index: usize, coordinate: &'static str, value: f64) -> Self {
        MeshError::InvalidCoordinate {
            node_index,
            coordinate,
            value,
        }
    }

    /// Create an UnsupportedFormat error from a path's extension.
    pub fn unsupported_format(path: &std::path::Path) -> Self {
        MeshError::UnsupportedFormat {
            extension: path.extension().and_then(|e| e.to_str()).map(String::from),
        }
    }
}
