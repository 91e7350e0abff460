// 5.0: rate conversions and fees. APR <-> APY with discrete compounding,
// fee helpers in both units, blended net APR across supply + borrow.
// 5.1 fees: borrow/withdraw/flash-loan fees are hundredth-bps (MicroBps), not bps.

use crate::types::{Bps, MicroBps, Rate, Timestamp, Usd};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPOUND_FREQUENCY: u32 = 365;

// newton steps for the nth root. from the ln/exp seed it settles in a few;
// hitting the cap is reported as an error.
const MAX_ROOT_ITERATIONS: usize = 100;

// 5.2: (1 + apr/n)^n - 1
pub fn apr_to_apy(apr: Rate, compound_frequency: u32) -> Result<Rate, RateError> {
    if compound_frequency == 0 {
        return Err(RateError::ZeroCompoundFrequency);
    }
    let n = Decimal::from(compound_frequency);
    let growth = (Decimal::ONE + apr.value() / n)
        .checked_powu(u64::from(compound_frequency))
        .ok_or(RateError::Overflow)?;
    Ok(Rate::new(growth - Decimal::ONE))
}

// 5.3: ((1 + apy)^(1/n) - 1) * n
pub fn apy_to_apr(apy: Rate, compound_frequency: u32) -> Result<Rate, RateError> {
    if compound_frequency == 0 {
        return Err(RateError::ZeroCompoundFrequency);
    }
    let growth = Decimal::ONE + apy.value();
    if growth <= Decimal::ZERO {
        return Err(RateError::InvalidApy { apy: apy.value() });
    }
    let period_growth = nth_root(growth, compound_frequency)?;
    Ok(Rate::new(
        (period_growth - Decimal::ONE) * Decimal::from(compound_frequency),
    ))
}

// newton on x^n = value. exp(ln(v)/n) lands within ~1e-7 of the root, one step
// from there puts x on or above it (x^n is convex), and from above the iterates
// fall monotonically until rounding stalls them.
fn nth_root(value: Decimal, n: u32) -> Result<Decimal, RateError> {
    if n == 1 {
        return Ok(value);
    }
    let n_dec = Decimal::from(n);
    let seed = value
        .checked_ln()
        .and_then(|ln| (ln / n_dec).checked_exp())
        .ok_or(RateError::Overflow)?;

    let mut x = newton_step(seed, value, n)?;
    for _ in 0..MAX_ROOT_ITERATIONS {
        let next = newton_step(x, value, n)?;
        if next >= x {
            return Ok(x);
        }
        x = next;
    }

    Err(RateError::RootDidNotConverge { value, n })
}

fn newton_step(x: Decimal, value: Decimal, n: u32) -> Result<Decimal, RateError> {
    let x_pow = x.checked_powu(u64::from(n - 1)).ok_or(RateError::Overflow)?;
    let f = x_pow.checked_mul(x).ok_or(RateError::Overflow)? - value;
    let slope = Decimal::from(n).checked_mul(x_pow).ok_or(RateError::Overflow)?;
    Ok(x - f / slope)
}

// 5.4: amount * fee / 1_000_000
pub fn calculate_borrow_fee(amount: Usd, fee: MicroBps) -> Usd {
    amount.mul_micro_bps(fee)
}

pub fn calculate_withdraw_fee(amount: Usd, fee: MicroBps) -> Usd {
    amount.mul_micro_bps(fee)
}

pub fn calculate_flash_loan_fee(amount: Usd, fee: MicroBps) -> Usd {
    amount.mul_micro_bps(fee)
}

// amount * fee / 10_000
pub fn calculate_bps_fee(amount: Usd, fee: Bps) -> Usd {
    amount.mul_bps(fee)
}

// 5.5: blended rate over everything the user has in the market.
// (earned - paid) / (supplied + borrowed), 0 for an empty position
pub fn calculate_net_apr(
    supplied_amount: Usd,
    supply_apr: Rate,
    borrowed_amount: Usd,
    borrow_apr: Rate,
) -> Rate {
    let total = supplied_amount.add(borrowed_amount);
    if total.is_zero() {
        return Rate::zero();
    }
    let supply_earnings = supplied_amount.value() * supply_apr.value();
    let borrow_costs = borrowed_amount.value() * borrow_apr.value();
    Rate::new((supply_earnings - borrow_costs) / total.value())
}

// 5.6: simple interest over the elapsed span, 365-day year.
// a negative rate (a net APR) has no interest amount, it's a cost.
pub fn accrued_interest(principal: Usd, apr: Rate, from: Timestamp, to: Timestamp) -> Result<Usd, RateError> {
    if apr.value() < Decimal::ZERO {
        return Err(RateError::NegativeRate { rate: apr.value() });
    }
    let factor = apr
        .value()
        .checked_mul(from.elapsed_years(&to))
        .ok_or(RateError::Overflow)?;
    principal.checked_mul(factor).ok_or(RateError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RateError {
    #[error("Compound frequency must be at least 1")]
    ZeroCompoundFrequency,

    #[error("APY {apy} implies non-positive growth")]
    InvalidApy { apy: Decimal },

    #[error("Rate {rate} is negative")]
    NegativeRate { rate: Decimal },

    #[error("Rate compounding overflowed")]
    Overflow,

    #[error("{n}th root of {value} did not converge")]
    RootDidNotConverge { value: Decimal, n: u32 },
}
