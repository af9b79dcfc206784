use crate::commands::common::{load_pool, pool_path};
use crate::{print_error, print_info, print_success, PoolCommands};
use bcl_core::codec::decode_hex;
use bcl_core::{decode_state, HashType, PoolArgs, PoolConfig};
use colored::*;
use std::path::Path;

pub fn handle(action: PoolCommands, config_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PoolCommands::Init {
            name,
            code_hash,
            hash_type,
            k,
            total_supply,
            force,
        } => {
            let config = PoolConfig {
                name,
                code_hash,
                hash_type,
                k,
                total_supply,
            };
            init_pool(&config, force, config_dir)?
        }
        PoolCommands::Show { name } => show_pool(&name, config_dir)?,
        PoolCommands::Args { name } => print_args(&name, config_dir)?,
        PoolCommands::Decode { hex } => decode_args(&hex)?,
        PoolCommands::DecodeState { hex } => decode_pool_state(&hex)?,
    }
    Ok(())
}

fn init_pool(
    config: &PoolConfig,
    force: bool,
    config_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = config.validate() {
        print_error(&e);
        return Err(e.into());
    }

    let path = pool_path(config_dir, &config.name);
    if path.exists() && !force {
        let msg = format!(
            "Pool profile '{}' already exists! (use --force to overwrite)",
            config.name
        );
        print_error(&msg);
        return Err(msg.into());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    config.save_to_file(&path)?;

    print_success(&format!("Pool profile '{}' saved", config.name));
    println!("{} {}", "Location:".bold(), path.display());
    println!("{} {}", "Args:".bold(), config.to_args()?.to_hex().green());
    Ok(())
}

fn show_pool(name: &str, config_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_pool(name, config_dir)?;

    println!("{}", format!("Pool '{}'", config.name).bold());
    println!();
    println!("  {:<14} {}", "Code hash:", config.code_hash);
    println!("  {:<14} {}", "Hash type:", config.hash_type);
    println!("  {:<14} {}", "k:", config.k);
    println!("  {:<14} {}", "Total supply:", config.total_supply);
    Ok(())
}

fn print_args(name: &str, config_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_pool(name, config_dir)?;
    let args = config.to_args()?;

    println!("{} {}", "Lock args:".bold(), args.to_hex().green());
    println!(
        "{} 0x{}",
        "Genesis state:".bold(),
        hex::encode(args.genesis_state())
    );
    print_info("A new pool cell starts with remaining = total supply");
    Ok(())
}

fn decode_args(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let args = match PoolArgs::from_hex(input) {
        Ok(args) => args,
        Err(e) => {
            print_error(&e.to_string());
            return Err(e.into());
        }
    };

    print_success("Valid pool args");
    println!("  {:<14} 0x{}", "Code hash:", hex::encode(args.code_hash));
    println!(
        "  {:<14} {} ({})",
        "Hash type:",
        args.hash_type,
        args.hash_type as u8
    );
    println!("  {:<14} {}", "k:", args.params.k);
    println!("  {:<14} {}", "Total supply:", args.params.total_supply);
    if args.hash_type == HashType::Data {
        print_info("hash type 'data' pins the exact script binary");
    }
    Ok(())
}

fn decode_pool_state(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = decode_hex(input)?;
    match decode_state(&bytes) {
        Ok(remaining) => {
            print_success("Valid pool state");
            println!("  {:<14} {}", "Remaining:", remaining);
            Ok(())
        }
        Err(e) => {
            print_error(&e.to_string());
            Err(e.into())
        }
    }
}
