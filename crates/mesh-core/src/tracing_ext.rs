//! Tracing extensions for meshing operations.
//!
//! Enable output by installing a subscriber in the application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=mesh_core=debug,mesh_extrude=debug for detailed output
//! ```
//!
//! # Log Levels
//!
//! - **INFO**: stage summaries (bounds, layer spacing, counts), timing
//! - **WARN**: recoverable issues such as clamped columns
//! - **DEBUG**: parsing details, per-stage progress
//! - **TRACE**: per-node values

use std::time::Instant;
use tracing::{debug, info, warn, Span};

use crate::HexMesh;

/// A performance timer that logs duration on drop.
///
/// ```rust,ignore
/// use mesh_core::tracing_ext::OperationTimer;
///
/// fn build() {
///     let _timer = OperationTimer::new("depth_field");
///     // ... do work ...
/// } // logs elapsed time here
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("mesh_operation", operation = name);
        debug!(target: "mesh_core::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer with element and node counts attached.
    pub fn with_context(name: &'static str, element_count: usize, node_count: usize) -> Self {
        let span = tracing::info_span!(
            "mesh_operation",
            operation = name,
            elements = element_count,
            nodes = node_count
        );
        debug!(
            target: "mesh_core::timing",
            operation = name,
            elements = element_count,
            nodes = node_count,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "mesh_core::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log hexahedral mesh statistics at info level.
pub fn log_hex_mesh_stats(mesh: &HexMesh, context: &str) {
    let (min, max) = mesh.bounds().unwrap_or_default();

    info!(
        target: "mesh_core::mesh_state",
        context = context,
        nodes = mesh.node_count(),
        hexahedra = mesh.element_count(),
        min = format!("({:.3}, {:.3}, {:.3})", min.x, min.y, min.z),
        max = format!("({:.3}, {:.3}, {:.3})", max.x, max.y, max.z),
        "Hex mesh state"
    );
}

/// Log progress for a long-running operation.
pub fn log_progress(operation: &str, current: usize, total: usize, stage: Option<&str>) {
    let percent = if total > 0 {
        (current as f64 / total as f64 * 100.0) as u32
    } else {
        0
    };

    debug!(
        target: "mesh_core::progress",
        operation = operation,
        current = current,
        total = total,
        percent = percent,
        stage = stage.unwrap_or("processing"),
        "Progress update"
    );
}

/// Log a file I/O operation.
pub fn log_io_operation(
    operation: &str,
    path: &std::path::Path,
    format: Option<&str>,
    success: bool,
) {
    if success {
        info!(
            target: "mesh_core::io",
            operation = operation,
            path = path.display().to_string(),
            format = format.unwrap_or("auto"),
            "I/O operation completed"
        );
    } else {
        warn!(
            target: "mesh_core::io",
            operation = operation,
            path = path.display().to_string(),
            format = format.unwrap_or("auto"),
            "I/O operation failed"
        );
    }
}
