use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use keel_blocks::BlockRegistry;
use keel_grid::{Face, GridPos, Rotation};
use keel_structure::{CompleteStructure, EditableStructure, Pose, StructureGraph};

#[derive(Parser)]
#[command(name = "keel", about = "Build, validate and convert keel structure files")]
struct Cli {
    /// Block catalog path
    #[arg(long, default_value = "assets/blocks.toml")]
    blocks: PathBuf,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a structure file and print a summary
    Check {
        file: PathBuf,
        /// Treat the file as the compact on-disk format
        #[arg(long)]
        compact: bool,
    },
    /// Convert between the record and compact encodings
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Input is records, output compact; the default is the reverse
        #[arg(long)]
        to_compact: bool,
    },
    /// Write a small example structure
    Demo {
        output: PathBuf,
        /// Write the compact on-disk format
        #[arg(long)]
        compact: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let reg = BlockRegistry::load_from_path(&cli.blocks)?;
    log::info!("catalog loaded: {} block kind(s)", reg.len());
    match cli.cmd {
        Command::Check { file, compact } => check(&reg, &file, compact),
        Command::Convert {
            input,
            output,
            to_compact,
        } => convert(&reg, &input, &output, to_compact),
        Command::Demo { output, compact } => demo(&reg, &output, compact),
    }
}

fn load_graph(
    reg: &BlockRegistry,
    file: &PathBuf,
    compact: bool,
) -> Result<StructureGraph, Box<dyn Error>> {
    let bytes = fs::read(file)?;
    let graph = if compact {
        keel_io::decode_compact(reg, &bytes)?
    } else {
        keel_io::decode_records(reg, &bytes)?
    };
    Ok(graph)
}

fn check(reg: &BlockRegistry, file: &PathBuf, compact: bool) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(reg, file, compact)?;
    let build = EditableStructure::from_graph(reg, graph.clone());
    let errors = build.errors();
    println!("cells:     {}", graph.len());
    println!("blocks:    {}", graph.real_len());
    println!(
        "mainframe: {}",
        if errors.missing_mainframe { "MISSING" } else { "ok" }
    );
    println!(
        "weapons:   {}",
        if errors.no_weapon { "none" } else { "ok" }
    );
    match build.orphans() {
        None => println!("orphans:   n/a (no mainframe)"),
        Some(orphans) if orphans.is_empty() => println!("orphans:   none"),
        Some(orphans) => {
            println!("orphans:   {}", orphans.len());
            for pos in &orphans {
                log::warn!("orphaned cell at {pos}");
            }
        }
    }
    let mut combat = CompleteStructure::new(reg, graph, Pose::default());
    combat.recenter_mass(reg, false);
    println!("health:    {}/{}", combat.hp(), combat.hp_max());
    println!("mass:      {:.2}", combat.total_mass());
    let c = combat.mass_center();
    println!("center:    ({:.2}, {:.2}, {:.2})", c.x, c.y, c.z);
    Ok(())
}

fn convert(
    reg: &BlockRegistry,
    input: &PathBuf,
    output: &PathBuf,
    to_compact: bool,
) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(reg, input, !to_compact)?;
    let bytes = if to_compact {
        keel_io::encode_compact(&graph)?
    } else {
        keel_io::encode_records(&graph)
    };
    fs::write(output, &bytes)?;
    log::info!(
        "wrote {} block(s) to {} ({} bytes)",
        graph.real_len(),
        output.display(),
        bytes.len()
    );
    Ok(())
}

/// A minimal flyable example: mainframe, hull spine, two lasers, thruster.
fn demo(reg: &BlockRegistry, output: &PathBuf, compact: bool) -> Result<(), Box<dyn Error>> {
    let id = |name: &str| {
        reg.id_by_name(name)
            .ok_or_else(|| Box::<dyn Error>::from(format!("catalog has no `{name}` block")))
    };
    let mainframe = id("mainframe")?;
    let hull = id("hull")?;
    let laser = id("laser")?;
    let thruster = id("thruster")?;

    let at = |x, y, z| GridPos::new(x, y, z).expect("demo coordinates are in range");
    let r0 = Rotation::ZERO;
    let mut s = EditableStructure::new();
    s.place(reg, at(64, 64, 64), mainframe, r0)?;
    for z in [63, 65, 66] {
        s.place(reg, at(64, 64, z), hull, r0)?;
    }
    s.place(reg, at(63, 64, 65), hull, r0)?;
    s.place(reg, at(65, 64, 65), hull, r0)?;
    s.place(reg, at(63, 65, 65), laser, r0)?;
    s.place(reg, at(65, 65, 65), laser, r0)?;
    s.place(
        reg,
        at(64, 64, 62),
        thruster,
        Rotation::from_facing_and_variant(Face::Back, 0),
    )?;

    let errors = s.errors();
    debug_assert!(!errors.missing_mainframe && !errors.no_weapon);
    let bytes = if compact {
        keel_io::encode_compact(s.graph())?
    } else {
        keel_io::encode_records(s.graph())
    };
    fs::write(output, &bytes)?;
    log::info!(
        "wrote demo structure ({} blocks) to {}",
        s.graph().real_len(),
        output.display()
    );
    Ok(())
}
