// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BONDING CURVE LOCK CLI - Pool profiles, price quotes & transition checks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use bcl_core::HashType;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "bcl-cli")]
#[command(about = "Bonding Curve Lock CLI - Pool Estimator & Validator", long_about = None)]
#[command(version)]
struct Cli {
    /// Config directory (reads BCL_CONFIG_DIR, default: ~/.bcl)
    #[arg(short, long, env = "BCL_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pool profile management and payload decoding
    Pool {
        #[command(subcommand)]
        action: PoolCommands,
    },

    /// Price quotes against a pool profile
    Quote {
        #[command(subcommand)]
        action: QuoteCommands,
    },

    /// Validate a proposed pool transition (JSON)
    Verify {
        /// Path to the transition file
        #[arg(short, long)]
        transition: PathBuf,
    },
}

#[derive(Subcommand)]
enum PoolCommands {
    /// Create a new pool profile
    Init {
        /// Profile name
        #[arg(short, long)]
        name: String,

        /// Curve script code hash (32 bytes hex)
        #[arg(long)]
        code_hash: String,

        /// Hash type: data, type, data1, data2
        #[arg(long, default_value = "type")]
        hash_type: HashType,

        /// Curve steepness
        #[arg(short, long)]
        k: u32,

        /// Total token supply
        #[arg(long)]
        total_supply: u128,

        /// Overwrite an existing profile
        #[arg(long, default_value = "false")]
        force: bool,
    },

    /// Show a pool profile
    Show {
        /// Profile name
        name: String,
    },

    /// Print the encoded pool args and genesis state
    Args {
        /// Profile name
        name: String,
    },

    /// Decode 55-byte pool args (hex)
    Decode {
        /// Args hex, with or without 0x
        hex: String,
    },

    /// Decode 16-byte pool state (hex)
    DecodeState {
        /// State hex, with or without 0x
        hex: String,
    },
}

#[derive(Subcommand)]
enum QuoteCommands {
    /// Cost of buying tokens from the pool
    Buy {
        /// Pool profile name
        #[arg(short, long)]
        pool: String,

        /// Tokens to buy
        #[arg(short, long)]
        amount: u128,

        /// Remaining supply (default: total supply)
        #[arg(short, long)]
        remaining: Option<u128>,
    },

    /// Return for redeeming tokens to the pool
    Sell {
        /// Pool profile name
        #[arg(short, long)]
        pool: String,

        /// Tokens to redeem
        #[arg(short, long)]
        amount: u128,

        /// Remaining supply (default: total supply)
        #[arg(short, long)]
        remaining: Option<u128>,
    },

    /// Tokens purchasable for a CKB budget
    Budget {
        /// Pool profile name
        #[arg(short, long)]
        pool: String,

        /// Budget in CKB (up to 8 decimals)
        #[arg(short, long)]
        ckb: String,

        /// Remaining supply (default: total supply)
        #[arg(short, long)]
        remaining: Option<u128>,
    },

    /// Sample the marginal price curve
    Curve {
        /// Pool profile name
        #[arg(short, long)]
        pool: String,

        /// Number of samples
        #[arg(long, default_value = "11")]
        points: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    print_banner();

    // Get config directory
    let config_dir = cli.config_dir.unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join(".bcl")
    });

    match cli.command {
        Commands::Pool { action } => commands::pool::handle(action, &config_dir)?,
        Commands::Quote { action } => commands::quote::handle(action, &config_dir)?,
        Commands::Verify { transition } => {
            let code = commands::verify::handle(&transition)?;
            if code != 0 {
                std::process::exit(code as i32);
            }
        }
    }

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════╗".cyan()
    );
    println!(
        "{}",
        "║      BONDING CURVE LOCK (BCL) - CLI           ║"
            .cyan()
            .bold()
    );
    println!(
        "{}",
        "║   Issue on the curve | Redeem on the curve    ║".cyan()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════╝".cyan()
    );
    println!();
}

fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────
