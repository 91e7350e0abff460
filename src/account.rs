//! Account-level aggregation over a user's deposits and borrows.
//!
//! The data-fetch layer reads balances, oracle prices and reserve configs from
//! chain and hands them over as a [`LendingAccount`]. Everything here is derived:
//! collateral and debt totals, borrowing power, health factor, and net APR.

use crate::config::{HealthThresholds, ReserveConfig};
use crate::health::{calculate_health_factor, get_health_factor_level, CollateralPosition, HealthLevel};
use crate::rates::calculate_net_apr;
use crate::types::{Amount, HealthFactor, Price, Rate, Usd};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    pub symbol: String,
    pub amount: Amount,
    pub price: Price,
    pub reserve: ReserveConfig,
    pub supply_apr: Rate,
    // deposits can be held without backing loans
    pub is_collateral: bool,
}

impl Deposit {
    pub fn value(&self) -> Usd {
        self.amount.value_at(self.price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Borrow {
    pub symbol: String,
    pub amount: Amount,
    pub price: Price,
    pub borrow_apr: Rate,
}

impl Borrow {
    pub fn value(&self) -> Usd {
        self.amount.value_at(self.price)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LendingAccount {
    pub deposits: Vec<Deposit>,
    pub borrows: Vec<Borrow>,
}

impl LendingAccount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(&mut self, deposit: Deposit) {
        self.deposits.push(deposit);
    }

    pub fn borrow(&mut self, borrow: Borrow) {
        self.borrows.push(borrow);
    }

    pub fn total_supplied_value(&self) -> Usd {
        self.deposits.iter().map(Deposit::value).sum()
    }

    pub fn total_collateral_value(&self) -> Usd {
        self.deposits
            .iter()
            .filter(|d| d.is_collateral)
            .map(Deposit::value)
            .sum()
    }

    pub fn total_borrow_value(&self) -> Usd {
        self.borrows.iter().map(Borrow::value).sum()
    }

    pub fn collateral_positions(&self) -> Vec<CollateralPosition> {
        self.deposits
            .iter()
            .filter(|d| d.is_collateral)
            .map(|d| CollateralPosition::new(d.value(), d.reserve.liquidation_threshold))
            .collect()
    }

    /// Σ collateral value × loan-to-value.
    pub fn borrowing_power(&self) -> Usd {
        self.deposits
            .iter()
            .filter(|d| d.is_collateral)
            .map(|d| d.value().mul_bps(d.reserve.loan_to_value))
            .sum()
    }

    pub fn available_to_borrow(&self) -> Usd {
        self.borrowing_power().saturating_sub(self.total_borrow_value())
    }

    pub fn health_factor(&self) -> HealthFactor {
        calculate_health_factor(&self.collateral_positions(), self.total_borrow_value())
    }

    pub fn health_level(&self, thresholds: &HealthThresholds) -> HealthLevel {
        get_health_factor_level(self.health_factor(), thresholds)
    }

    /// Value-weighted supply APR against value-weighted borrow APR.
    pub fn net_apr(&self) -> Rate {
        let supplied = self.total_supplied_value();
        let borrowed = self.total_borrow_value();

        let supply_apr = weighted_rate(self.deposits.iter().map(|d| (d.value(), d.supply_apr)), supplied);
        let borrow_apr = weighted_rate(self.borrows.iter().map(|b| (b.value(), b.borrow_apr)), borrowed);

        calculate_net_apr(supplied, supply_apr, borrowed, borrow_apr)
    }
}

fn weighted_rate(entries: impl Iterator<Item = (Usd, Rate)>, total: Usd) -> Rate {
    if total.is_zero() {
        return Rate::zero();
    }
    let weighted: Decimal = entries.map(|(value, rate)| value.value() * rate.value()).sum();
    Rate::new(weighted / total.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bps;
    use rust_decimal_macros::dec;

    fn apt_deposit(amount: Decimal, is_collateral: bool) -> Deposit {
        Deposit {
            symbol: "APT".to_string(),
            amount: Amount::new(amount).unwrap(),
            price: Price::new(dec!(10)).unwrap(),
            reserve: ReserveConfig {
                loan_to_value: Bps::new(7000),
                liquidation_threshold: Bps::new(7500),
                ..ReserveConfig::default()
            },
            supply_apr: Rate::new(dec!(0.05)),
            is_collateral,
        }
    }

    fn usdc_borrow(amount: Decimal) -> Borrow {
        Borrow {
            symbol: "USDC".to_string(),
            amount: Amount::new(amount).unwrap(),
            price: Price::new(dec!(1)).unwrap(),
            borrow_apr: Rate::new(dec!(0.08)),
        }
    }

    #[test]
    fn empty_account() {
        let account = LendingAccount::new();
        assert_eq!(account.total_collateral_value(), Usd::zero());
        assert_eq!(account.health_factor(), HealthFactor::Unbounded);
        assert_eq!(account.net_apr(), Rate::zero());
        assert_eq!(account.health_level(&HealthThresholds::default()), HealthLevel::Safe);
    }

    #[test]
    fn totals_and_health() {
        let mut account = LendingAccount::new();
        account.deposit(apt_deposit(dec!(100), true)); // $1000
        account.borrow(usdc_borrow(dec!(600)));

        assert_eq!(account.total_collateral_value().value(), dec!(1000));
        assert_eq!(account.total_borrow_value().value(), dec!(600));
        assert_eq!(account.health_factor(), HealthFactor::Finite(dec!(1.25)));
        assert_eq!(account.health_level(&HealthThresholds::default()), HealthLevel::Danger);
    }

    #[test]
    fn non_collateral_deposits_do_not_back_loans() {
        let mut account = LendingAccount::new();
        account.deposit(apt_deposit(dec!(100), true));
        account.deposit(apt_deposit(dec!(100), false));
        account.borrow(usdc_borrow(dec!(600)));

        assert_eq!(account.total_supplied_value().value(), dec!(2000));
        assert_eq!(account.total_collateral_value().value(), dec!(1000));
        assert_eq!(account.health_factor(), HealthFactor::Finite(dec!(1.25)));
    }

    #[test]
    fn borrowing_power_and_available() {
        let mut account = LendingAccount::new();
        account.deposit(apt_deposit(dec!(100), true));
        assert_eq!(account.borrowing_power().value(), dec!(700));

        account.borrow(usdc_borrow(dec!(600)));
        assert_eq!(account.available_to_borrow().value(), dec!(100));

        account.borrow(usdc_borrow(dec!(200)));
        assert_eq!(account.available_to_borrow(), Usd::zero());
    }

    #[test]
    fn net_apr_of_account() {
        let mut account = LendingAccount::new();
        account.deposit(apt_deposit(dec!(100), true)); // earns 50
        account.borrow(usdc_borrow(dec!(250))); // pays 20
        // 30 / 1250
        assert_eq!(account.net_apr().value(), dec!(0.024));
    }

    #[test]
    fn negative_balances_rejected_when_loading() {
        let json = r#"{"symbol":"USDC","amount":"-600","price":"1","borrow_apr":"0.08"}"#;
        assert!(serde_json::from_str::<Borrow>(json).is_err());

        let json = r#"{"symbol":"USDC","amount":"600","price":"0","borrow_apr":"0.08"}"#;
        assert!(serde_json::from_str::<Borrow>(json).is_err());

        let json = r#"{"symbol":"USDC","amount":"600","price":"1","borrow_apr":"0.08"}"#;
        let borrow: Borrow = serde_json::from_str(json).unwrap();
        assert_eq!(borrow.value().value(), dec!(600));
    }
}
