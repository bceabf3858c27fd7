use clap::{Parser, ValueEnum};
use flowgrid::prelude::*;
use serde::Serialize;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// CLI-specific alignment enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlignmentCli {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Plain-text grid
    Grid,
    /// JSON list of grid cells
    Cells,
}

/// Validates a flow description and lays it out on a grid
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow description JSON file
    flow_path: String,

    /// Which sibling absorbs spare rows under a gateway
    #[arg(short, long, value_enum, default_value = "top")]
    alignment: AlignmentCli,

    /// Output format of the layout
    #[arg(short, long, value_enum, default_value = "grid")]
    format: OutputFormat,

    /// Only validate the flow, do not lay it out
    #[arg(long)]
    check: bool,

    /// Log pipeline stages (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CellsOutput {
    column_count: usize,
    row_count: usize,
    alignment: Alignment,
    cells: Vec<GridCell>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let total_start = Instant::now();
    let json = fs::read_to_string(&cli.flow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read flow file '{}': {}",
            &cli.flow_path, e
        ))
    });
    let flow = FlowDescription::from_json(&json).unwrap_or_else(|e| exit_with_error(&e.to_string()));

    if cli.check {
        match validate(&flow) {
            Ok(()) => println!("Flow is valid ({} elements).", flow.elements.len()),
            Err(e) => exit_with_error(&format!("Flow is not valid: {}", e)),
        }
        return;
    }

    let alignment = match cli.alignment {
        AlignmentCli::Top => Alignment::Top,
        AlignmentCli::Bottom => Alignment::Bottom,
    };
    let layout = LayoutEngine::builder(flow)
        .with_alignment(alignment)
        .build()
        .layout()
        .unwrap_or_else(|e| exit_with_error(&format!("Layout failed: {}", e)));

    match cli.format {
        OutputFormat::Grid => print!("{}", GridFormatter::format(&layout)),
        OutputFormat::Cells => {
            let output = CellsOutput {
                column_count: layout.column_count(),
                row_count: layout.row_total(),
                alignment,
                cells: project(&layout),
            };
            let rendered = serde_json::to_string_pretty(&output)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode cells: {}", e)));
            println!("{}", rendered);
        }
    }

    tracing::info!(
        nodes = layout.tree().len(),
        elapsed = ?total_start.elapsed(),
        "Done"
    );
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "flowgrid=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
