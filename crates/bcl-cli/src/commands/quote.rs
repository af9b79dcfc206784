use crate::commands::common::{format_ckb, load_pool, parse_ckb, pool_state};
use crate::{print_error, print_info, QuoteCommands};
use bcl_core::price_curve::curve_points;
use bcl_core::{quote_purchase, quote_redemption, solve_purchase_amount, BondingCurve};
use colored::*;
use std::path::Path;

pub fn handle(action: QuoteCommands, config_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        QuoteCommands::Buy {
            pool,
            amount,
            remaining,
        } => quote_buy(&pool, amount, remaining, config_dir)?,
        QuoteCommands::Sell {
            pool,
            amount,
            remaining,
        } => quote_sell(&pool, amount, remaining, config_dir)?,
        QuoteCommands::Budget {
            pool,
            ckb,
            remaining,
        } => quote_budget(&pool, &ckb, remaining, config_dir)?,
        QuoteCommands::Curve { pool, points } => print_curve(&pool, points, config_dir)?,
    }
    Ok(())
}

fn print_pool_position(curve: &BondingCurve) {
    println!(
        "{} {} / {} issued ({:.2}%), spot price {:.8} CKB",
        "Pool:".bold(),
        curve.circulating(),
        curve.params.total_supply,
        curve.issued_percent(),
        curve.spot_price()
    );
}

fn quote_buy(
    pool: &str,
    amount: u128,
    remaining: Option<u128>,
    config_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_pool(pool, config_dir)?;
    let params = config.params();
    let state = pool_state(&config, remaining)?;
    print_pool_position(&BondingCurve::from_state(params, state));

    match quote_purchase(amount, &state, &params) {
        Ok(cost) => {
            println!(
                "{} {} tokens for {} CKB ({} shannons)",
                "Buy:".bold(),
                amount,
                format_ckb(cost).green(),
                cost
            );
            println!(
                "{} {} -> {}",
                "Remaining:".bold(),
                state.remaining(),
                state.remaining() - amount
            );
            Ok(())
        }
        Err(e) => {
            print_error(&e.to_string());
            Err(e.into())
        }
    }
}

fn quote_sell(
    pool: &str,
    amount: u128,
    remaining: Option<u128>,
    config_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_pool(pool, config_dir)?;
    let params = config.params();
    let state = pool_state(&config, remaining)?;
    print_pool_position(&BondingCurve::from_state(params, state));

    match quote_redemption(amount, &state, &params) {
        Ok(ret) => {
            println!(
                "{} {} tokens for {} CKB ({} shannons)",
                "Sell:".bold(),
                amount,
                format_ckb(ret).green(),
                ret
            );
            println!(
                "{} {} -> {}",
                "Remaining:".bold(),
                state.remaining(),
                state.remaining() + amount
            );
            Ok(())
        }
        Err(e) => {
            print_error(&e.to_string());
            Err(e.into())
        }
    }
}

fn quote_budget(
    pool: &str,
    ckb: &str,
    remaining: Option<u128>,
    config_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let budget = parse_ckb(ckb)?;
    let config = load_pool(pool, config_dir)?;
    let params = config.params();
    let state = pool_state(&config, remaining)?;
    print_pool_position(&BondingCurve::from_state(params, state));

    let amount = solve_purchase_amount(budget, &state, &params)?;
    let cost = quote_purchase(amount, &state, &params)?;
    println!(
        "{} {} tokens for at most {} CKB",
        "Budget:".bold(),
        amount.to_string().green(),
        format_ckb(budget)
    );
    println!("{} {} CKB", "Exact cost:".bold(), format_ckb(cost));
    if amount == state.remaining() {
        print_info("Budget covers the whole remaining supply");
    }
    Ok(())
}

fn print_curve(
    pool: &str,
    points: usize,
    config_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_pool(pool, config_dir)?;
    let params = config.params();

    println!(
        "{}",
        format!("Marginal price, k = {}", params.k).bold()
    );
    println!();
    println!("  {:>24}  {:>20}", "circulating", "price (CKB)");
    for (circulating, price) in curve_points(&params, points) {
        println!("  {:>24.0}  {:>20.8}", circulating, price);
    }
    Ok(())
}
