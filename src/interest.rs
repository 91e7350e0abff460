//! Interest rate model.
//!
//! Borrow rates follow a kinked piecewise-linear curve keyed on utilization:
//! a gentle slope from the minimum to the optimal rate below the kink, and a
//! steep slope from the optimal to the maximum rate above it. The steep leg
//! pulls utilization back toward the target by making over-borrowing expensive.
//!
//! Suppliers earn the borrow rate scaled by utilization, minus the reserve's cut.

use crate::config::{InterestRateConfig, ReserveConfig};
use crate::rates::apr_to_apy;
use crate::rates::RateError;
use crate::types::{Bps, Rate, Usd, Utilization};
use crate::utilization::{calculate_total_supply, calculate_utilization};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Borrow APR at `utilization`. Utilization is clamped to [0, 1] on construction.
pub fn calculate_borrow_apr(utilization: Utilization, config: &InterestRateConfig) -> Rate {
    let u = utilization.value();
    let min_rate = config.min_borrow_rate.as_fraction();
    let optimal_rate = config.optimal_borrow_rate.as_fraction();
    let max_rate = config.max_borrow_rate.as_fraction();
    let kink = config.optimal_utilization.as_fraction().min(Decimal::ONE);

    // kink at 0 has no below-kink leg; kink at 1 has no above-kink leg
    let below_kink = if kink.is_zero() {
        false
    } else if kink == Decimal::ONE {
        true
    } else {
        u <= kink
    };

    let rate = if below_kink {
        min_rate + (u / kink) * (optimal_rate - min_rate)
    } else {
        let excess = (u - kink) / (Decimal::ONE - kink);
        optimal_rate + excess * (max_rate - optimal_rate)
    };

    Rate::new(rate)
}

/// Supply APR: `borrow_apr × utilization × (1 − reserve_ratio)`.
pub fn calculate_supply_apr(borrow_apr: Rate, utilization: Utilization, reserve_ratio: Bps) -> Rate {
    let supplier_share = Decimal::ONE - reserve_ratio.as_fraction().min(Decimal::ONE);
    Rate::new(borrow_apr.value() * utilization.value() * supplier_share)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveRates {
    pub supply_apr: Rate,
    pub borrow_apr: Rate,
    pub utilization: Utilization,
}

/// Single entry point for a reserve's current rates.
pub fn calculate_reserve_aprs(
    total_borrowed: Usd,
    total_cash_available: Usd,
    rate_config: &InterestRateConfig,
    reserve_ratio: Bps,
) -> ReserveRates {
    let utilization = calculate_utilization(total_borrowed, total_cash_available);
    let borrow_apr = calculate_borrow_apr(utilization, rate_config);
    let supply_apr = calculate_supply_apr(borrow_apr, utilization, reserve_ratio);

    ReserveRates {
        supply_apr,
        borrow_apr,
        utilization,
    }
}

/// Live figures of one reserve as read from chain, already in human units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveState {
    pub symbol: String,
    pub cash_available: Usd,
    pub total_borrowed: Usd,
    pub rate_config: InterestRateConfig,
    pub reserve: ReserveConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveSummary {
    pub symbol: String,
    pub total_supply: Usd,
    pub available_liquidity: Usd,
    pub rates: ReserveRates,
    pub supply_apy: Rate,
    pub borrow_apy: Rate,
}

impl ReserveState {
    pub fn rates(&self) -> ReserveRates {
        calculate_reserve_aprs(
            self.total_borrowed,
            self.cash_available,
            &self.rate_config,
            self.reserve.reserve_ratio,
        )
    }

    pub fn summarize(&self, compound_frequency: u32) -> Result<ReserveSummary, RateError> {
        let rates = self.rates();
        Ok(ReserveSummary {
            symbol: self.symbol.clone(),
            total_supply: calculate_total_supply(self.cash_available, self.total_borrowed),
            available_liquidity: self.cash_available,
            supply_apy: apr_to_apy(rates.supply_apr, compound_frequency)?,
            borrow_apy: apr_to_apy(rates.borrow_apr, compound_frequency)?,
            rates,
        })
    }
}
