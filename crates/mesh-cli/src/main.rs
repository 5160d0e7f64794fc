//! mesh-hex: extrude a quadrilateral footprint into a hexahedral volume mesh.
//!
//! Every node of the base mesh becomes a column of nodes between the
//! reference surface and a flat bound, split into equal layers.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=mesh_extrude=info` - Stage summaries (bounds, dz range, counts)
//! - `RUST_LOG=mesh_extrude=debug` - Detailed progress logging
//! - `RUST_LOG=mesh_core::timing=debug` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Bathymetry layout, 30 layers down to 6000 below the deepest point
//! mesh-hex base.msh bathymetry.gts volume.msh
//!
//! # Bedrock layout up to a fixed top
//! mesh-hex base.msh bedrock.gts volume.vtk --anchor above --flat-z 30000
//!
//! # Structured footprint over the surface extent, no base mesh
//! mesh-hex grid bathymetry.gts volume.msh --nx 60 --ny 40
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use mesh_extrude::{ColumnAnchor, DegeneratePolicy, ExtrudeParams, FlatBound, TagPolicy};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{extrude, grid, info};

/// mesh-hex - Extrude a 2D quadrilateral mesh into a 3D hexahedral mesh.
///
/// With no subcommand, extrudes BASE_MESH (Gmsh) along SURFACE (GTS or STL)
/// and writes OUTPUT (.msh or .vtk).
#[derive(Parser)]
#[command(name = "mesh-hex")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Quadrilateral base mesh (Gmsh MSH 2.x, ASCII or binary)
    #[arg(required = true)]
    base_mesh: Option<PathBuf>,

    /// Reference surface (GTS or STL)
    #[arg(required = true)]
    surface: Option<PathBuf>,

    /// Output mesh file (format determined by extension)
    #[arg(required = true)]
    output: Option<PathBuf>,

    #[command(flatten)]
    options: ExtrusionOptions,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Extrude a structured footprint grid spanning the surface's x/y extent
    Grid {
        /// Reference surface (GTS or STL)
        surface: PathBuf,

        /// Output mesh file (format determined by extension)
        output: PathBuf,

        /// Cells along x
        #[arg(long, default_value = "30")]
        nx: usize,

        /// Cells along y
        #[arg(long, default_value = "30")]
        ny: usize,

        /// Physical tag of the footprint quadrilaterals
        #[arg(long, default_value = "1")]
        tag: i32,

        #[command(flatten)]
        options: ExtrusionOptions,
    },

    /// Display statistics for a base mesh, surface, or hexahedral mesh
    Info {
        /// Input file
        input: PathBuf,
    },
}

/// Extrusion settings. Flags override values read from `--config`.
#[derive(Args, Clone, Default)]
pub struct ExtrusionOptions {
    /// Number of layers per column
    #[arg(long)]
    layers: Option<u32>,

    /// Which end of the column follows the surface (below or above)
    #[arg(long)]
    anchor: Option<ColumnAnchor>,

    /// Flat bound at this distance beyond the surface extreme
    #[arg(long, conflicts_with = "flat_z", allow_hyphen_values = true)]
    margin: Option<f64>,

    /// Flat bound at this fixed height
    #[arg(long, conflicts_with = "margin", allow_hyphen_values = true)]
    flat_z: Option<f64>,

    /// Tag every hexahedron 99 / 2 instead of propagating base tags
    #[arg(long)]
    placeholder_tags: bool,

    /// Collapse columns whose bounds cross instead of failing
    #[arg(long)]
    clamp_degenerate: bool,

    /// TOML file with extrusion parameters
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ExtrusionOptions {
    /// Resolve the parameters: config file (or defaults) first, then flags.
    pub fn to_params(&self) -> Result<ExtrudeParams> {
        let mut params = match &self.config {
            Some(path) => ExtrudeParams::from_toml_file(path)?,
            None => ExtrudeParams::default(),
        };

        if let Some(layers) = self.layers {
            params.layers = layers;
        }
        if let Some(anchor) = self.anchor {
            params.anchor = anchor;
        }
        if let Some(margin) = self.margin {
            params.flat_bound = FlatBound::Margin(margin);
        }
        if let Some(z) = self.flat_z {
            params.flat_bound = FlatBound::Absolute(z);
        }
        if self.placeholder_tags {
            params.tag_policy = TagPolicy::LEGACY_PLACEHOLDER;
        }
        if self.clamp_degenerate {
            params.degenerate_policy = DegeneratePolicy::Clamp;
        }

        params.validate()?;
        debug!(?params, "Resolved extrusion parameters");
        Ok(params)
    }
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "mesh_core=info,mesh_extrude=info",
            2 => "mesh_core=debug,mesh_extrude=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Grid {
            surface,
            output,
            nx,
            ny,
            tag,
            options,
        }) => grid::run(surface, output, *nx, *ny, *tag, options, cli),
        Some(Commands::Info { input }) => info::run(input, cli),
        None => match (&cli.base_mesh, &cli.surface, &cli.output) {
            (Some(base), Some(surface), Some(output)) => {
                extrude::run(base, surface, output, &cli.options, cli)
            }
            _ => Cli::command()
                .error(
                    clap::error::ErrorKind::MissingRequiredArgument,
                    "BASE_MESH, SURFACE and OUTPUT are required",
                )
                .exit(),
        },
    }
}

/// Labelled lines describing a failure: `Error`, then `Code`, `Suggestion`
/// and `Location` for library errors, or the `Caused by` chain otherwise.
fn diagnostic_lines(e: &anyhow::Error) -> Vec<(&'static str, String)> {
    let extrude_err = e.downcast_ref::<mesh_extrude::ExtrudeError>();
    let mesh_err = match extrude_err {
        Some(mesh_extrude::ExtrudeError::Mesh(inner)) => Some(inner),
        Some(_) => None,
        None => e.downcast_ref::<mesh_core::MeshError>(),
    };

    let mut lines = Vec::new();
    if let Some(err) = mesh_err {
        lines.push(("Error", err.to_string()));
        lines.push(("Code", err.code().to_string()));
        lines.push(("Suggestion", err.recovery_suggestion().to_string()));
        if let Some(location) = err.location() {
            lines.push(("Location", location.to_string()));
        }
    } else if let Some(err) = extrude_err {
        lines.push(("Error", err.to_string()));
        lines.push(("Code", err.code().to_string()));
        lines.push(("Suggestion", err.recovery_suggestion().to_string()));
        if let Some(location) = err.location() {
            lines.push(("Location", location.to_string()));
        }
    } else {
        lines.push(("Error", e.to_string()));
        for cause in e.chain().skip(1) {
            lines.push(("Caused by", cause.to_string()));
        }
    }
    lines
}

fn report_error(e: &anyhow::Error) {
    for (label, text) in diagnostic_lines(e) {
        match label {
            "Error" => eprintln!("{}: {}", label.red().bold(), text),
            "Code" => eprintln!("  {}: {}", label.cyan(), text),
            "Suggestion" => eprintln!("  {}: {}", label.green(), text),
            _ => eprintln!("  {}: {}", label.yellow(), text),
        }
    }
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        if !cli.quiet {
            report_error(&e);
        }
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_extrusion() {
        let cli = Cli::try_parse_from([
            "mesh-hex", "base.msh", "bed.gts", "out.msh", "--layers", "12", "--flat-z", "-500",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.output, Some(PathBuf::from("out.msh")));

        let params = cli.options.to_params().unwrap();
        assert_eq!(params.layers, 12);
        assert_eq!(params.flat_bound, FlatBound::Absolute(-500.0));
        assert_eq!(params.anchor, ColumnAnchor::Below);
    }

    #[test]
    fn test_missing_arguments_is_usage_error() {
        let err = Cli::try_parse_from(["mesh-hex", "base.msh"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_margin_conflicts_with_flat_z() {
        let result = Cli::try_parse_from([
            "mesh-hex", "a.msh", "b.gts", "c.msh", "--margin", "10", "--flat-z", "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_grid_subcommand() {
        let cli = Cli::try_parse_from([
            "mesh-hex",
            "grid",
            "bed.gts",
            "out.vtk",
            "--nx",
            "4",
            "--anchor",
            "above",
            "--placeholder-tags",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        match cli.command {
            Some(Commands::Grid { nx, ny, options, .. }) => {
                assert_eq!((nx, ny), (4, 30));
                let params = options.to_params().unwrap();
                assert_eq!(params.anchor, ColumnAnchor::Above);
                assert_eq!(params.tag_policy, TagPolicy::LEGACY_PLACEHOLDER);
            }
            _ => panic!("Expected grid subcommand"),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("extrude.toml");
        std::fs::write(&config, "layers = 8\nanchor = \"above\"\n").unwrap();

        let options = ExtrusionOptions {
            config: Some(config),
            layers: Some(3),
            clamp_degenerate: true,
            ..Default::default()
        };
        let params = options.to_params().unwrap();
        assert_eq!(params.layers, 3);
        assert_eq!(params.anchor, ColumnAnchor::Above);
        assert_eq!(params.degenerate_policy, DegeneratePolicy::Clamp);
    }

    #[test]
    fn test_negative_margin_rejected() {
        let options = ExtrusionOptions {
            margin: Some(-5.0),
            ..Default::default()
        };
        let err = options.to_params().unwrap_err();
        assert!(err.downcast_ref::<mesh_extrude::ExtrudeError>().is_some());
    }

    #[test]
    fn test_degenerate_column_reports_location() {
        let err = anyhow::Error::new(mesh_extrude::ExtrudeError::DegenerateColumn {
            node: 3,
            floor: -10.0,
            ceiling: -10.0,
        })
        .context("Extrusion failed");

        let lines = diagnostic_lines(&err);
        let labels: Vec<&str> = lines.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, ["Error", "Code", "Suggestion", "Location"]);
        assert_eq!(lines[1].1, "EXTRUDE-2004");
        assert_eq!(lines[3].1, "node 3");
    }

    #[test]
    fn test_wrapped_mesh_error_reports_its_own_code() {
        let err = anyhow::Error::new(mesh_extrude::ExtrudeError::from(
            mesh_core::MeshError::invalid_node_index(5, 40, 8),
        ));
        let lines = diagnostic_lines(&err);
        assert!(lines[1].1.starts_with("MESH-"));
        assert_eq!(lines.last().unwrap(), &("Location", "element 5".to_string()));
    }

    #[test]
    fn test_plain_error_lists_causes() {
        let err = anyhow::anyhow!("disk full").context("Failed to save");
        let lines = diagnostic_lines(&err);
        assert_eq!(lines[0], ("Error", "Failed to save".to_string()));
        assert_eq!(lines[1], ("Caused by", "disk full".to_string()));
    }
}
