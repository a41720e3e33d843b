use anyhow::{Result, ensure};
use clap::Parser;
use dungeon_core::{DungeonConfig, generate};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for deriving the per-run generation seeds
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of layouts to generate and check
    #[arg(short, long, default_value_t = 500)]
    runs: u32,
    /// Side length of the generated square region
    #[arg(long, default_value_t = 96)]
    total_size: i32,
    /// Split depth per layout
    #[arg(long, default_value_t = 4)]
    iterations: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = DungeonConfig {
        total_size: args.total_size,
        iterations: args.iterations,
        ..DungeonConfig::default()
    };
    config.validate()?;

    println!("Soaking {} layouts (total_size={}, iterations={})...", args.runs, config.total_size, config.iterations);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let split_nodes_per_tree = (1_u32 << args.iterations) - 1;
    let mut disconnected_pairs = 0_u64;
    let mut fully_connected_runs = 0_u32;

    for _ in 0..args.runs {
        let layout_seed = rng.next_u64();
        let tree = generate(config, layout_seed);

        ensure!(
            tree.leaves().len() == 1 << args.iterations,
            "wrong leaf count on seed {layout_seed}"
        );

        let rooms = tree.all_rooms();
        let tunnels = tree.all_tunnels();
        for (index, room) in rooms.iter().enumerate() {
            ensure!(
                !rooms[index + 1..].iter().any(|other| other.overlaps(*room)),
                "overlapping rooms on seed {layout_seed}"
            );
        }
        for (index, tunnel) in tunnels.iter().enumerate() {
            ensure!(
                !rooms.iter().any(|room| room.overlaps(*tunnel)),
                "tunnel crosses a room on seed {layout_seed}"
            );
            ensure!(
                !tunnels[index + 1..].iter().any(|other| other.overlaps(*tunnel)),
                "tunnels cross on seed {layout_seed}"
            );
        }

        let gaps = split_nodes_per_tree as u64 - tunnels.len() as u64;
        disconnected_pairs += gaps;
        if gaps == 0 {
            fully_connected_runs += 1;
        }
    }

    println!("All {} layouts passed the structural checks.", args.runs);
    println!(
        "Fully connected: {}/{} runs; {} disconnected sibling pairs total.",
        fully_connected_runs, args.runs, disconnected_pairs
    );

    Ok(())
}
