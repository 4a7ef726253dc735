use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use pointclass_algorithms::{SpacingEstimation, SpacingOptions, DEFAULT_K_NEIGHBORS};
use pointclass_core::PointSet;
use pointclass_io::{read_point_set_with, write_point_set, ReadOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pointclass", version, about = "Inspect and convert classified point clouds")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print point count, channels and label histogram
    Info {
        input: PathBuf,

        /// Keep labels as stored instead of remapping them to training codes
        #[arg(long, default_value_t = false)]
        no_remap: bool,
    },
    /// Estimate the typical nearest-neighbor spacing
    Spacing {
        input: PathBuf,

        /// Neighbors per sampled point
        #[arg(short = 'k', long, default_value_t = DEFAULT_K_NEIGHBORS)]
        k_neighbors: usize,

        /// Seed for point sampling; random when omitted
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Read a point cloud and write it as binary PLY
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Keep labels as stored instead of remapping them to training codes
        #[arg(long, default_value_t = false)]
        no_remap: bool,
    },
}

fn read_options(no_remap: bool) -> ReadOptions {
    if no_remap {
        ReadOptions::raw()
    } else {
        ReadOptions::default()
    }
}

fn load(input: &Path, options: &ReadOptions) -> Result<PointSet> {
    read_point_set_with(input, options)
        .with_context(|| format!("Failed to read {}", input.display()))
}

fn print_info(input: &Path, set: &PointSet) {
    println!("File:    {}", input.display());
    println!("Points:  {}", set.len());
    println!("Normals: {}", set.has_normals());
    println!("Colors:  {}", set.has_colors());
    println!("Views:   {}", set.has_views());
    println!("Labels:  {}", set.has_labels());

    if set.has_labels() {
        let mut histogram: BTreeMap<u8, usize> = BTreeMap::new();
        for label in set.labels() {
            *histogram.entry(*label).or_insert(0) += 1;
        }
        for (label, count) in histogram {
            println!("  {:>3}: {}", label, count);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    match args.command {
        Command::Info { input, no_remap } => {
            let set = load(&input, &read_options(no_remap))?;
            print_info(&input, &set);
        }
        Command::Spacing {
            input,
            k_neighbors,
            seed,
        } => {
            let mut set = load(&input, &ReadOptions::raw())?;
            let options = SpacingOptions::default().with_k_neighbors(k_neighbors);
            let spacing = match seed {
                Some(seed) => set.spacing_with_rng(&options, &mut StdRng::seed_from_u64(seed)),
                None => set.spacing(&options),
            }
            .with_context(|| format!("Failed to estimate spacing of {}", input.display()))?;
            println!("{}", spacing);
        }
        Command::Convert {
            input,
            output,
            no_remap,
        } => {
            let set = load(&input, &read_options(no_remap))?;
            write_point_set(&set, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Converted {} -> {}", input.display(), output.display());
        }
    }

    Ok(())
}
