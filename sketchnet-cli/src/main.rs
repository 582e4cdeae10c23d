//! SketchNet CLI - derive netlist graphs from sketched circuit scenes on
//! the command line.

use clap::{Parser, Subcommand, ValueEnum};
use sketchnet::geometry::tables::Footprint;
use sketchnet::{ComponentType, Scene, SketchNetCore};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "sketchnet")]
#[command(about = "Netlist graphs from sketched circuit scenes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the connectivity graph for a scene file
    Graph {
        /// Path to a scene .json file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Show component names instead of internal ids in connections
        #[arg(long)]
        names: bool,
    },

    /// Normalize a scene's wires into the canonical disjoint set
    Normalize {
        /// Path to a scene .json file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// List the supported component types
    Types {
        /// Show terminal geometry details
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for tooling
    Json,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Graph {
            file,
            format,
            names,
        } => handle_graph(&file, format, names),
        Commands::Normalize { file, format } => handle_normalize(&file, format),
        Commands::Types { verbose } => {
            handle_types(verbose);
            0
        }
    };

    process::exit(exit_code);
}

fn load_scene(file: &PathBuf) -> Result<Scene, i32> {
    SketchNetCore::load_scene(file).map_err(|e| {
        eprintln!("Error: {}", e);
        1
    })
}

fn handle_graph(file: &PathBuf, format: OutputFormat, names: bool) -> i32 {
    let scene = match load_scene(file) {
        Ok(scene) => scene,
        Err(code) => return code,
    };

    let graph = SketchNetCore::connectivity(&scene.wires, &scene.components);
    let adjacency = if names {
        graph.to_named_adjacency()
    } else {
        graph.to_adjacency()
    };

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&adjacency) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        OutputFormat::Human => {
            let stats = graph.stats();
            println!("Connectivity for: {}", file.display());
            println!(
                "Components: {}, junctions: {}, connections: {}",
                stats.components, stats.junctions, stats.connections
            );
            for (id, entry) in &adjacency {
                if entry.name.is_empty() || entry.name == *id {
                    println!("\n{}:", id);
                } else {
                    println!("\n{} ({}):", entry.name, id);
                }
                if entry.connections.is_empty() {
                    println!("  (unconnected)");
                }
                for peer in &entry.connections {
                    println!("  - {}", peer);
                }
            }
        }
    }
    0
}

fn handle_normalize(file: &PathBuf, format: OutputFormat) -> i32 {
    let scene = match load_scene(file) {
        Ok(scene) => scene,
        Err(code) => return code,
    };

    let wires = SketchNetCore::normalize(&scene.wires, &scene.components);

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&wires) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        OutputFormat::Human => {
            println!(
                "{} raw wires -> {} canonical segments",
                scene.wires.len(),
                wires.len()
            );
            for wire in &wires {
                println!("  {} -> {}", wire.start, wire.end);
            }
        }
    }
    0
}

fn handle_types(verbose: bool) {
    println!("Supported component types:\n");
    for &t in ComponentType::ALL {
        if t.is_wire() {
            continue;
        }
        if verbose {
            let family = match t.footprint() {
                Footprint::TwoTerminal(dims) => format!(
                    "two-terminal {}x{}{}",
                    dims.width,
                    dims.height,
                    if dims.invert { " (vertical artwork)" } else { "" }
                ),
                Footprint::Fixed(offsets) => format!("{} fixed terminals", offsets.len()),
                Footprint::WireDraft => "wire".to_string(),
            };
            println!("  {:20} prefix {:6} {}", t.as_str(), t.label_prefix(), family);
        } else {
            println!("  {}", t.as_str());
        }
    }
    println!("\nWires are drawn between snap points rather than placed.");
}
