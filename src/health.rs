//! Health factor, borrow/withdraw bounds, and pre-flight action checks.
//!
//! The health factor is risk-weighted collateral over debt:
//! `Σ(value_i × liquidation_threshold_i) / total_borrow_value`. A position with
//! no debt has an [`HealthFactor::Unbounded`] factor and cannot be liquidated.
//! Below the configured liquidation cutoff (1.0 by default) it can be.
//!
//! [`validate_safe_action`] is the gate to run before building any borrow or
//! withdraw transaction.

use crate::config::HealthThresholds;
use crate::types::{Bps, HealthFactor, Usd};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One deposited asset counted as collateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralPosition {
    pub value: Usd,
    pub liquidation_threshold: Bps,
}

impl CollateralPosition {
    pub fn new(value: Usd, liquidation_threshold: Bps) -> Self {
        Self {
            value,
            liquidation_threshold,
        }
    }

    pub fn weighted_value(&self) -> Usd {
        self.value.mul_bps(self.liquidation_threshold)
    }
}

/// Health factor of a set of collateral positions against total debt.
/// No debt is `Unbounded`.
pub fn calculate_health_factor(
    collateral: &[CollateralPosition],
    total_borrow_value: Usd,
) -> HealthFactor {
    let weighted: Usd = collateral.iter().map(|c| c.weighted_value()).sum();
    health_factor_from_weighted(weighted, total_borrow_value)
}

fn health_factor_from_weighted(weighted_collateral: Usd, total_borrow_value: Usd) -> HealthFactor {
    if total_borrow_value.is_zero() {
        return HealthFactor::Unbounded;
    }
    HealthFactor::Finite(weighted_collateral.value() / total_borrow_value.value())
}

fn health_factor_from_totals(collateral: Usd, borrow: Usd, threshold: Bps) -> HealthFactor {
    health_factor_from_weighted(collateral.mul_bps(threshold), borrow)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    Safe,
    Warning,
    Danger,
    Liquidation,
}

impl fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthLevel::Safe => "safe",
            HealthLevel::Warning => "warning",
            HealthLevel::Danger => "danger",
            HealthLevel::Liquidation => "liquidation",
        };
        write!(f, "{}", label)
    }
}

/// Highest band whose lower bound `hf` reaches; `Liquidation` below all of them.
pub fn get_health_factor_level(hf: HealthFactor, thresholds: &HealthThresholds) -> HealthLevel {
    if hf.meets(thresholds.safe) {
        HealthLevel::Safe
    } else if hf.meets(thresholds.warning) {
        HealthLevel::Warning
    } else if hf.meets(thresholds.danger) {
        HealthLevel::Danger
    } else {
        HealthLevel::Liquidation
    }
}

pub fn is_liquidatable(hf: HealthFactor, thresholds: &HealthThresholds) -> bool {
    !hf.meets(thresholds.liquidation)
}

/// Borrowing power of `collateral_value` at the given loan-to-value.
pub fn calculate_max_borrow(collateral_value: Usd, loan_to_value: Bps) -> Usd {
    collateral_value.mul_bps(loan_to_value)
}

/// Collateral that can leave while keeping the health factor at `min_health_factor`.
/// Never negative; everything is withdrawable without debt.
pub fn calculate_max_withdraw(
    total_collateral_value: Usd,
    total_borrow_value: Usd,
    liquidation_threshold: Bps,
    min_health_factor: Decimal,
) -> Result<Usd, HealthError> {
    ensure_positive_minimum(min_health_factor)?;
    if total_borrow_value.is_zero() {
        return Ok(total_collateral_value);
    }
    // with debt and a zero threshold no collateral counts, so none can leave
    if liquidation_threshold.is_zero() {
        return Ok(Usd::zero());
    }

    let required = total_borrow_value.value() * min_health_factor / liquidation_threshold.as_fraction();
    Ok(Usd::floored(total_collateral_value.value() - required))
}

fn ensure_positive_minimum(min_health_factor: Decimal) -> Result<(), HealthError> {
    if min_health_factor <= Decimal::ZERO {
        return Err(HealthError::NonPositiveMinimum {
            minimum: min_health_factor,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HealthError {
    #[error("Minimum health factor {minimum} must be positive")]
    NonPositiveMinimum { minimum: Decimal },
}

/// Change between two health factors. `Unbounded - Unbounded` is a zero change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthDelta {
    Change(Decimal),
    // debt fully repaid
    BecameUnbounded,
    // first borrow
    BecameBounded,
}

impl HealthDelta {
    pub fn between(current: HealthFactor, projected: HealthFactor) -> Self {
        match (current, projected) {
            (HealthFactor::Finite(c), HealthFactor::Finite(p)) => HealthDelta::Change(p - c),
            (HealthFactor::Finite(_), HealthFactor::Unbounded) => HealthDelta::BecameUnbounded,
            (HealthFactor::Unbounded, HealthFactor::Finite(_)) => HealthDelta::BecameBounded,
            (HealthFactor::Unbounded, HealthFactor::Unbounded) => HealthDelta::Change(Decimal::ZERO),
        }
    }

    pub fn is_improvement(&self) -> bool {
        match self {
            HealthDelta::Change(d) => *d > Decimal::ZERO,
            HealthDelta::BecameUnbounded => true,
            HealthDelta::BecameBounded => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSimulation {
    pub current: HealthFactor,
    pub projected: HealthFactor,
    pub delta: HealthDelta,
}

/// Health before and after a hypothetical deposit/withdraw/borrow/repay.
/// Negative `collateral_change` is a withdrawal, negative `borrow_change` a repayment.
/// Projected balances floor at zero.
pub fn simulate_health_factor_change(
    current_collateral: Usd,
    current_borrow: Usd,
    collateral_change: Decimal,
    borrow_change: Decimal,
    liquidation_threshold: Bps,
) -> HealthSimulation {
    let projected_collateral = Usd::floored(current_collateral.value() + collateral_change);
    let projected_borrow = Usd::floored(current_borrow.value() + borrow_change);

    let current = health_factor_from_totals(current_collateral, current_borrow, liquidation_threshold);
    let projected = health_factor_from_totals(projected_collateral, projected_borrow, liquidation_threshold);

    HealthSimulation {
        current,
        projected,
        delta: HealthDelta::between(current, projected),
    }
}

/// A borrow/withdraw/repay/deposit the user is about to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedAction {
    pub current_collateral: Usd,
    pub current_borrow: Usd,
    pub collateral_change: Decimal,
    pub borrow_change: Decimal,
    pub liquidation_threshold: Bps,
}

impl ProposedAction {
    pub fn borrow(collateral: Usd, debt: Usd, amount: Usd, liquidation_threshold: Bps) -> Self {
        Self {
            current_collateral: collateral,
            current_borrow: debt,
            collateral_change: Decimal::ZERO,
            borrow_change: amount.value(),
            liquidation_threshold,
        }
    }

    pub fn withdraw(collateral: Usd, debt: Usd, amount: Usd, liquidation_threshold: Bps) -> Self {
        Self {
            current_collateral: collateral,
            current_borrow: debt,
            collateral_change: -amount.value(),
            borrow_change: Decimal::ZERO,
            liquidation_threshold,
        }
    }

    pub fn repay(collateral: Usd, debt: Usd, amount: Usd, liquidation_threshold: Bps) -> Self {
        Self {
            current_collateral: collateral,
            current_borrow: debt,
            collateral_change: Decimal::ZERO,
            borrow_change: -amount.value(),
            liquidation_threshold,
        }
    }

    pub fn simulate(&self) -> HealthSimulation {
        simulate_health_factor_change(
            self.current_collateral,
            self.current_borrow,
            self.collateral_change,
            self.borrow_change,
            self.liquidation_threshold,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionRejection {
    BelowMinimumHealth { projected: Decimal, minimum: Decimal },
    ExceedsCollateral { requested: Usd, available: Usd },
}

impl fmt::Display for ActionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionRejection::BelowMinimumHealth { projected, minimum } => write!(
                f,
                "Health factor would drop to {} (minimum {})",
                projected.round_dp(2),
                minimum
            ),
            ActionRejection::ExceedsCollateral {
                requested,
                available,
            } => write!(
                f,
                "Cannot withdraw {} with only {} deposited",
                requested, available
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeActionCheck {
    pub valid: bool,
    pub reason: Option<ActionRejection>,
    pub projected: HealthFactor,
}

/// Rejects actions that lower health below `min_health_factor`. Actions that
/// don't lower health (repaying while underwater) always pass. A non-positive
/// minimum is a caller error, not a rejection.
pub fn validate_safe_action(
    action: &ProposedAction,
    min_health_factor: Decimal,
) -> Result<SafeActionCheck, HealthError> {
    ensure_positive_minimum(min_health_factor)?;
    let simulation = action.simulate();

    if let Some(requested) = Usd::new(-action.collateral_change) {
        if requested > action.current_collateral {
            return Ok(SafeActionCheck {
                valid: false,
                reason: Some(ActionRejection::ExceedsCollateral {
                    requested,
                    available: action.current_collateral,
                }),
                projected: simulation.projected,
            });
        }
    }

    let lowers_health = simulation.projected < simulation.current;
    if lowers_health {
        if let HealthFactor::Finite(projected) = simulation.projected {
            if projected < min_health_factor {
                return Ok(SafeActionCheck {
                    valid: false,
                    reason: Some(ActionRejection::BelowMinimumHealth {
                        projected,
                        minimum: min_health_factor,
                    }),
                    projected: simulation.projected,
                });
            }
        }
    }

    Ok(SafeActionCheck {
        valid: true,
        reason: None,
        projected: simulation.projected,
    })
}
