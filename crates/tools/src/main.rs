use anyhow::{Context, Result};
use clap::Parser;
use dungeon_core::{DungeonConfig, PartitionTree, Rect, generate};
use serde::Serialize;
use std::fs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the generation run
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Path to a JSON config file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<String>,
    /// Write the flattened layout as JSON to this path
    #[arg(long)]
    out: Option<String>,
    /// Skip the ASCII preview
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Serialize)]
struct LayoutExport {
    seed: u64,
    config: DungeonConfig,
    fingerprint: u64,
    rooms: Vec<Rect>,
    tunnels: Vec<Rect>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let config_data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {path}"))?;
            serde_json::from_str(&config_data)
                .with_context(|| "Failed to deserialize config JSON")?
        }
        None => DungeonConfig::default(),
    };
    config.validate().with_context(|| "Rejecting config at the generation boundary")?;

    let tree = generate(config, args.seed);

    if !args.quiet {
        print!("{}", render_ascii(&tree, config.total_size));
    }
    println!("Rooms: {}", tree.all_rooms().len());
    println!("Tunnels: {}", tree.all_tunnels().len());
    println!("Fingerprint: {:#018x}", tree.fingerprint());

    if let Some(path) = &args.out {
        let export = LayoutExport {
            seed: args.seed,
            config,
            fingerprint: tree.fingerprint(),
            rooms: tree.all_rooms(),
            tunnels: tree.all_tunnels(),
        };
        fs::write(path, serde_json::to_string_pretty(&export)?)
            .with_context(|| format!("Failed to write layout JSON: {path}"))?;
        println!("Wrote {path}");
    }

    Ok(())
}

/// Rasterizes the layout onto a character grid: `#` for room tiles, `+` for
/// tunnel tiles, `.` for untouched ground.
fn render_ascii(tree: &PartitionTree, total_size: i32) -> String {
    let size = total_size.max(0) as usize;
    let mut grid = vec![b'.'; size * size];

    for room in tree.all_rooms() {
        stamp(&mut grid, size, room, b'#');
    }
    for tunnel in tree.all_tunnels() {
        stamp(&mut grid, size, tunnel, b'+');
    }

    let mut out = String::with_capacity(size * (size + 1));
    for row in grid.chunks(size) {
        out.push_str(std::str::from_utf8(row).expect("grid is ASCII"));
        out.push('\n');
    }
    out
}

fn stamp(grid: &mut [u8], size: usize, rect: Rect, glyph: u8) {
    for y in rect.y_min()..rect.y_max() {
        for x in rect.x_min()..rect.x_max() {
            if x < 0 || y < 0 || x as usize >= size || y as usize >= size {
                continue;
            }
            grid[y as usize * size + x as usize] = glyph;
        }
    }
}
