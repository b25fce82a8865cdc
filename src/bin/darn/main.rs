//! Darn CLI - polygon soup import and repair.
//!
//! Usage: darn <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `darn --help` for available commands. Set `RUST_LOG=debug` for
//! per-pass statistics.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use darn::import::{ImportOptions, ImportReport, VertexRepair};
use darn::io;
use darn::map::CMap2;

#[derive(Parser)]
#[command(name = "darn")]
#[command(author, version, about = "Polygon soup import and repair", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the import report and map statistics
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Split vertices shared by faces touching at a single vertex
        #[arg(long)]
        always_repair: bool,

        /// Check the structural invariants of the assembled map
        #[arg(long)]
        verify: bool,

        /// Use single-threaded execution
        #[arg(long)]
        sequential: bool,
    },

    /// Import a mesh and write the repaired surface
    Repair {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Split vertices shared by faces touching at a single vertex
        #[arg(long)]
        always_repair: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info {
            input,
            always_repair,
            verify,
            sequential,
        } => {
            let options = import_options(always_repair)
                .with_verify(verify)
                .with_parallel(!sequential);
            cmd_info(&input, &options)?;
        }

        Commands::Repair {
            input,
            output,
            always_repair,
        } => {
            cmd_repair(&input, &output, &import_options(always_repair))?;
        }
    }

    Ok(())
}

fn import_options(always_repair: bool) -> ImportOptions {
    let repair = if always_repair {
        VertexRepair::Always
    } else {
        VertexRepair::WhenFlagged
    };
    ImportOptions::default()
        .with_validate(true)
        .with_vertex_repair(repair)
}

fn print_report(report: &ImportReport) {
    println!("Faces: {}", report.faces);
    println!("Degenerate faces dropped: {}", report.degenerate_faces);
    println!("Boundary edges: {}", report.boundary_edges);
    println!("Holes closed: {}", report.holes_closed);
    println!(
        "Non-manifold edge: {}",
        if report.non_manifold_detected { "yes" } else { "no" }
    );
    println!("Vertices split: {}", report.vertices_split);
}

fn cmd_info(input: &PathBuf, options: &ImportOptions) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let (map, report): (CMap2, _) = io::load_with_options(input, options)?;
    log::info!("loaded {} in {:.2?}", input.display(), start.elapsed());

    println!("File: {}", input.display());
    print_report(&report);

    println!("\nMap:");
    println!("Darts: {}", map.nb_darts());
    println!("Vertices: {}", map.nb_vertices());
    println!("Edges: {}", map.nb_edges());
    println!("Faces: {} (+{} boundary)", map.nb_faces(), map.nb_boundary_faces());

    // V - E + F over the closed map, caps included
    let euler = map.nb_vertices() as i64 - map.nb_edges() as i64
        + (map.nb_faces() + map.nb_boundary_faces()) as i64;
    println!("Euler characteristic (closed): {}", euler);

    let boundary_vertices = map
        .vertices()
        .into_iter()
        .filter(|&v| map.is_boundary_vertex(v))
        .count();
    if boundary_vertices == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary vertices)", boundary_vertices);
    }

    if options.verify {
        println!("Integrity: ok");
    }

    Ok(())
}

fn cmd_repair(
    input: &PathBuf,
    output: &PathBuf,
    options: &ImportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let (map, report): (CMap2, _) = io::load_with_options(input, options)?;
    println!(
        "Loaded: {} vertices, {} faces",
        map.nb_vertices(),
        map.nb_faces()
    );
    print_report(&report);

    io::save(&map, output)?;
    log::info!("saved {}", output.display());
    println!("Saved: {} ({:.2?})", output.display(), start.elapsed());

    Ok(())
}
