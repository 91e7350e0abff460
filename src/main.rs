//! Lending risk math walkthrough.
//!
//! Runs a reserve through the kinked rate curve, builds a borrower's account,
//! checks what-if actions against the minimum health factor, and prints
//! liquidation and fee figures.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lend_risk::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Env {
    Development,
    Testnet,
    Mainnet,
}

impl From<Env> for Environment {
    fn from(env: Env) -> Self {
        match env {
            Env::Development => Environment::Development,
            Env::Testnet => Environment::Testnet,
            Env::Mainnet => Environment::Mainnet,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "risk-sim", about = "Lending risk math scenarios")]
struct Cli {
    /// Preset to run with
    #[arg(long, value_enum, default_value = "development")]
    env: Env,

    /// JSON risk config; overrides the preset
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lend_risk=info,risk_sim=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RiskConfig::from_json_file(path)?,
        None => {
            let config = Environment::from(cli.env).config();
            config.validate()?;
            config
        }
    };
    tracing::info!(env = ?cli.env, min_health_factor = %config.min_health_factor, "risk config ready");

    println!("Lending Risk Math Simulation\n");

    scenario_1_rate_curve(&config)?;
    scenario_2_account_health(&config)?;
    scenario_3_what_if(&config)?;
    scenario_4_liquidation(&config)?;
    scenario_5_fees_and_apy(&config)?;

    println!("\nAll scenarios completed.");
    Ok(())
}

fn usd(value: Decimal) -> anyhow::Result<Usd> {
    Ok(Usd::try_from(value)?)
}

/// Borrow and supply rates across the utilization range.
fn scenario_1_rate_curve(config: &RiskConfig) -> anyhow::Result<()> {
    println!("Scenario 1: Kinked Rate Curve\n");

    let model = &config.default_rate_model;
    println!(
        "  min {} / optimal {} / max {}, kink at {}",
        format_apr(Rate::from_bps(model.min_borrow_rate)),
        format_apr(Rate::from_bps(model.optimal_borrow_rate)),
        format_apr(Rate::from_bps(model.max_borrow_rate)),
        format_apr(Rate::from_bps(model.optimal_utilization)),
    );

    for borrowed in [dec!(0), dec!(200_000), dec!(400_000), dec!(800_000), dec!(900_000), dec!(1_000_000)] {
        let cash = dec!(1_000_000) - borrowed;
        let rates = calculate_reserve_aprs(
            usd(borrowed)?,
            usd(cash)?,
            model,
            config.default_reserve.reserve_ratio,
        );
        println!(
            "  U={:>5}  borrow {:>7}  supply {:>7}",
            format_apr(Rate::new(rates.utilization.value())),
            format_apr(rates.borrow_apr),
            format_apr(rates.supply_apr),
        );
    }

    let reserve = ReserveState {
        symbol: "USDC".to_string(),
        cash_available: parse_amount("2500000")?,
        total_borrowed: parse_amount("7500000")?,
        rate_config: *model,
        reserve: config.default_reserve,
    };
    let summary = reserve.summarize(config.compound_frequency)?;
    println!(
        "\n  {} reserve: supply {} ({} APY), borrow {} ({} APY)\n",
        summary.symbol,
        format_usd(summary.total_supply),
        format_apr(summary.supply_apy),
        format_usd(summary.total_supply.saturating_sub(summary.available_liquidity)),
        format_apr(summary.borrow_apy),
    );
    Ok(())
}

fn sample_account(config: &RiskConfig) -> anyhow::Result<LendingAccount> {
    let mut account = LendingAccount::new();
    account.deposit(Deposit {
        symbol: "APT".to_string(),
        amount: NumericInput::from("150").to_amount()?,
        price: NumericInput::from("8.50").to_price()?,
        reserve: config.default_reserve,
        supply_apr: Rate::new(dec!(0.031)),
        is_collateral: true,
    });
    account.borrow(Borrow {
        symbol: "USDC".to_string(),
        amount: NumericInput::from(600.0).to_amount()?,
        price: NumericInput::from(1.0).to_price()?,
        borrow_apr: Rate::new(dec!(0.072)),
    });
    Ok(account)
}

/// Health of a single-collateral borrower.
fn scenario_2_account_health(config: &RiskConfig) -> anyhow::Result<()> {
    println!("Scenario 2: Account Health\n");

    let account = sample_account(config)?;
    let hf = account.health_factor();
    println!("  Collateral: {}", format_usd(account.total_collateral_value()));
    println!("  Debt: {}", format_usd(account.total_borrow_value()));
    println!("  Health factor: {} ({})", format_health_factor(hf), account.health_level(&config.thresholds));
    println!("  Available to borrow: {}", format_usd(account.available_to_borrow()));
    println!("  Net APR: {}\n", format_apr(account.net_apr()));
    Ok(())
}

/// Pre-flight checks for borrow, withdraw and repay.
fn scenario_3_what_if(config: &RiskConfig) -> anyhow::Result<()> {
    println!("Scenario 3: What-If Checks\n");

    let collateral = usd(dec!(1275))?;
    let debt = usd(dec!(600))?;
    let threshold = config.default_reserve.liquidation_threshold;

    let max_withdraw = calculate_max_withdraw(collateral, debt, threshold, config.min_health_factor)?;
    println!("  Max withdraw at HF {}: {}", config.min_health_factor, format_usd(max_withdraw));

    let actions = [
        ("borrow $150", ProposedAction::borrow(collateral, debt, usd(dec!(150))?, threshold)),
        ("borrow $400", ProposedAction::borrow(collateral, debt, usd(dec!(400))?, threshold)),
        ("withdraw $2000", ProposedAction::withdraw(collateral, debt, usd(dec!(2000))?, threshold)),
        ("repay $600", ProposedAction::repay(collateral, debt, usd(dec!(600))?, threshold)),
    ];

    for (label, action) in actions {
        let check = validate_safe_action(&action, config.min_health_factor)?;
        match check.reason {
            None => println!("  {:<15} ok, HF -> {}", label, format_health_factor(check.projected)),
            Some(reason) => {
                tracing::debug!(%label, %reason, "action rejected");
                println!("  {:<15} rejected: {}", label, reason)
            }
        }
    }
    println!();
    Ok(())
}

/// Liquidation price and liquidator payout.
fn scenario_4_liquidation(config: &RiskConfig) -> anyhow::Result<()> {
    println!("Scenario 4: Liquidation\n");

    let current = NumericInput::from("1000").to_price()?;
    let collateral = NumericInput::from("10").to_amount()?;
    match calculate_liquidation_price(collateral, usd(dec!(7000))?, config.default_reserve.liquidation_threshold, current) {
        Some(liq) => println!(
            "  10 ETH backing $7,000 at ${}: liquidated at ${} ({} drop)",
            current,
            liq.price.round_dp(2),
            format_apr(Rate::new(liq.buffer)),
        ),
        None => println!("  no liquidation price"),
    }

    let seizure = calculate_collateral_seized(
        usd(dec!(3500))?,
        config.default_reserve.liquidation_bonus,
        usd(dec!(10_000))?,
    );
    println!(
        "  Liquidator repays {}, seizes {} (bonus {})\n",
        format_usd(seizure.repaid),
        format_usd(seizure.total_seized),
        format_usd(seizure.bonus),
    );
    Ok(())
}

/// APR/APY conversions and the two fee units.
fn scenario_5_fees_and_apy(config: &RiskConfig) -> anyhow::Result<()> {
    println!("Scenario 5: APY and Fees\n");

    for apr in [dec!(0.02), dec!(0.08), dec!(0.30)] {
        let apy = apr_to_apy(Rate::new(apr), config.compound_frequency)?;
        println!("  {} APR -> {} APY", format_apr(Rate::new(apr)), format_apr(apy));
    }

    let amount = usd(dec!(10_000))?;
    let reserve = &config.default_reserve;
    println!("  Borrow fee on {}: {}", format_usd(amount), format_usd(calculate_borrow_fee(amount, reserve.borrow_fee)));
    println!("  Withdraw fee: {}", format_usd(calculate_withdraw_fee(amount, reserve.withdraw_fee)));
    println!("  Flash loan fee: {}", format_usd(calculate_flash_loan_fee(amount, reserve.flash_loan_fee)));
    println!("  Liquidation bonus: {}", format_usd(calculate_liquidation_bonus(amount, reserve.liquidation_bonus)));

    let now = Timestamp::now();
    let in_30_days = Timestamp::from_millis(now.as_millis() + 30 * 24 * 3600 * 1000);
    let interest = accrued_interest(amount, Rate::new(dec!(0.0576)), now, in_30_days)?;
    println!("  30 days at 5.76% on {}: {}", format_usd(amount), format_usd(interest));
    Ok(())
}
