#![warn(clippy::pedantic)]

mod config;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::eyre;
use config::SolverConfig;
use env_logger::TimestampPrecision;
use log::{LevelFilter, info, warn};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};
use twophase::{
    CubieCube, MoveSequence, Search, SearchOptions, SolutionFormat, Tables,
    cache::{self, CacheError},
    facelet, moves, success,
};

/// Solves 3x3x3 Rubik's cubes with Kociemba's two-phase algorithm
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Search options to use, in TOML format.
    #[arg(long, short = 'c', value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Where to cache the generated tables. Defaults to the user cache
    /// directory.
    #[arg(long, value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Generate the tables without reading or writing the cache.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a cube given by its 54 facelets in U, R, F, D, L, B order.
    Solve {
        /// The facelets, e.g. "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB".
        facelets: String,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Solve the cube produced by a scramble.
    Scramble {
        /// The scramble, e.g. "R U' F2".
        moves: String,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Generate a random scramble and solve it.
    Random {
        /// The number of moves in the scramble.
        #[arg(long, short, default_value_t = 25)]
        length: usize,
        /// Seed for the scramble generator.
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Generate the tables and write them to the cache.
    Tables,
    /// Print the facelets of the cube produced by a scramble.
    Facelets {
        /// The scramble, e.g. "R U' F2".
        moves: String,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// The longest solution to accept.
    #[arg(long)]
    max_depth: Option<usize>,
    /// Phase 2 attempts to give up after when no solution was found.
    #[arg(long)]
    max_probes: Option<u64>,
    /// Phase 2 attempts to keep shortening a found solution for.
    #[arg(long)]
    min_probes: Option<u64>,
    /// Mark where phase 1 ends with a `.`.
    #[arg(long)]
    separator: bool,
    /// Print the scramble that produces the cube instead of its solution.
    #[arg(long)]
    inverse: bool,
    /// Print the solution length after the moves.
    #[arg(long)]
    append_length: bool,
}

impl SearchArgs {
    fn apply(&self, options: &mut SearchOptions) {
        if let Some(max_depth) = self.max_depth {
            options.max_depth = max_depth;
        }
        if let Some(max_probes) = self.max_probes {
            options.max_probes = max_probes;
        }
        if let Some(min_probes) = self.min_probes {
            options.min_probes = min_probes;
        }
        for (flag, set) in [
            (SolutionFormat::SEPARATOR, self.separator),
            (SolutionFormat::INVERSE, self.inverse),
            (SolutionFormat::APPEND_LENGTH, self.append_length),
        ] {
            if set {
                options.format.insert(flag);
            }
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let config = match &cli.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    let cache_path = if cli.no_cache {
        None
    } else {
        cli.cache
            .clone()
            .or_else(|| config.cache.clone())
            .or_else(default_cache_path)
    };

    let (cube, search) = match cli.command {
        Commands::Solve { facelets, search } => (CubieCube::from_facelets(&facelets)?, search),
        Commands::Scramble { moves, search } => {
            let scramble = moves.parse::<MoveSequence>()?;
            (CubieCube::SOLVED.apply_moves(&scramble), search)
        }
        Commands::Random {
            length,
            seed,
            search,
        } => {
            let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
            let scramble = moves::random_scramble(length, &mut rng);
            println!("Scramble: {scramble}");
            println!("Facelets: {}", facelet::from_scramble(&scramble));
            (CubieCube::SOLVED.apply_moves(&scramble), search)
        }
        Commands::Tables => {
            let path = cache_path.ok_or_else(|| eyre!("No cache path is available"))?;
            write_cache(Tables::get(), &path)?;
            println!("Wrote tables to {}", path.display());
            return Ok(());
        }
        Commands::Facelets { moves } => {
            let scramble = moves.parse::<MoveSequence>()?;
            println!("{}", facelet::from_scramble(&scramble));
            return Ok(());
        }
    };

    let mut options = SearchOptions::default();
    config.apply(&mut options);
    search.apply(&mut options);

    cube.verify()?;
    let tables = load_tables(cache_path.as_deref());
    let solution = Search::new(tables, &options).solve_cube(&cube)?;
    println!("{solution}");
    Ok(())
}

fn default_cache_path() -> Option<PathBuf> {
    let Some(mut path) = dirs::cache_dir() else {
        warn!("Could not find a cache directory; the tables will not be cached");
        return None;
    };
    path.push("twophase");
    path.push("tables.bin");
    Some(path)
}

/// The process-wide tables, read from the cache when possible and otherwise
/// generated and written back to it.
fn load_tables(cache_path: Option<&Path>) -> &'static Tables {
    let Some(path) = cache_path else {
        return Tables::get();
    };

    if path.exists() {
        let loaded = File::open(path)
            .map_err(CacheError::from)
            .and_then(|file| cache::load(BufReader::new(file)));
        match loaded {
            Ok(tables) => {
                info!(success!("Loaded tables from {}"), path.display());
                return Tables::install(tables).unwrap_or_else(|_| Tables::get());
            }
            Err(e) => warn!("Ignoring the table cache at {}: {e}", path.display()),
        }
    }

    let tables = Tables::get();
    match write_cache(tables, path) {
        Ok(()) => info!("Cached tables at {}", path.display()),
        Err(e) => warn!("Could not cache the tables at {}: {e}", path.display()),
    }
    tables
}

fn write_cache(tables: &Tables, path: &Path) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    cache::save(tables, BufWriter::new(File::create(path)?))
}
