//! Liquidation price and liquidator incentives.
//!
//! A single-collateral position is liquidated once `collateral × price × threshold`
//! falls to the debt. Solving that for `price` gives the liquidation price shown
//! next to a position. Liquidators who repay debt receive the seized collateral
//! plus a basis-point bonus.

use crate::types::{Amount, Bps, Price, Usd};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationPrice {
    pub price: Decimal,
    /// Fractional drop from the current price until liquidation.
    /// Zero or negative means the position is already liquidatable.
    pub buffer: Decimal,
}

/// Price of one collateral unit at which the position gets liquidated.
///
/// Returns `None` when there is no collateral or the threshold is zero: no
/// price makes such a position healthy, so there is no liquidation price to show.
pub fn calculate_liquidation_price(
    collateral_amount: Amount,
    borrow_amount: Usd,
    liquidation_threshold: Bps,
    current_price: Price,
) -> Option<LiquidationPrice> {
    let weight = collateral_amount.value() * liquidation_threshold.as_fraction();
    if weight.is_zero() {
        return None;
    }

    let price = borrow_amount.value() / weight;
    Some(LiquidationPrice {
        price,
        buffer: liquidation_distance(current_price, price),
    })
}

/// `(current - liquidation) / current`, the share the price can fall before liquidation.
/// `Price` is always positive, so the division is safe.
pub fn liquidation_distance(current_price: Price, liquidation_price: Decimal) -> Decimal {
    (current_price.value() - liquidation_price) / current_price.value()
}

/// Liquidator incentive on `liquidated_amount`.
pub fn calculate_liquidation_bonus(liquidated_amount: Usd, bonus: Bps) -> Usd {
    liquidated_amount.mul_bps(bonus)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralSeizure {
    pub repaid: Usd,
    pub bonus: Usd,
    pub total_seized: Usd,
}

/// Collateral value a liquidator takes for repaying `repay_amount` of debt.
/// Capped at the collateral actually available.
pub fn calculate_collateral_seized(repay_amount: Usd, bonus: Bps, available_collateral: Usd) -> CollateralSeizure {
    let bonus_value = calculate_liquidation_bonus(repay_amount, bonus);
    let total_seized = repay_amount.add(bonus_value).min(available_collateral);

    CollateralSeizure {
        repaid: repay_amount,
        bonus: bonus_value,
        total_seized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(v: Decimal) -> Usd {
        Usd::new(v).unwrap()
    }

    fn amount(v: Decimal) -> Amount {
        Amount::new(v).unwrap()
    }

    fn price(v: Decimal) -> Price {
        Price::new(v).unwrap()
    }

    #[test]
    fn liquidation_price_basic() {
        // 10 units, 7000 debt, 80% threshold -> 7000 / 8
        let liq = calculate_liquidation_price(
            amount(dec!(10)),
            usd(dec!(7000)),
            Bps::new(8000),
            price(dec!(1000)),
        )
        .unwrap();
        assert_eq!(liq.price, dec!(875));
        assert_eq!(liq.buffer, dec!(0.125)); // 12.5% away
    }

    #[test]
    fn already_underwater_has_negative_buffer() {
        let liq = calculate_liquidation_price(
            amount(dec!(10)),
            usd(dec!(7000)),
            Bps::new(8000),
            price(dec!(800)),
        )
        .unwrap();
        assert!(liq.buffer < Decimal::ZERO);
    }

    #[test]
    fn no_collateral_has_no_liquidation_price() {
        let liq = calculate_liquidation_price(
            Amount::zero(),
            usd(dec!(7000)),
            Bps::new(8000),
            price(dec!(1000)),
        );
        assert!(liq.is_none());

        let liq = calculate_liquidation_price(
            amount(dec!(10)),
            usd(dec!(7000)),
            Bps::zero(),
            price(dec!(1000)),
        );
        assert!(liq.is_none());
    }

    #[test]
    fn no_debt_liquidates_at_zero() {
        let liq = calculate_liquidation_price(
            amount(dec!(10)),
            Usd::zero(),
            Bps::new(8000),
            price(dec!(1000)),
        )
        .unwrap();
        assert_eq!(liq.price, Decimal::ZERO);
        assert_eq!(liq.buffer, Decimal::ONE);
    }

    #[test]
    fn bonus_is_bps() {
        // 5% on 2000
        let bonus = calculate_liquidation_bonus(usd(dec!(2000)), Bps::new(500));
        assert_eq!(bonus.value(), dec!(100));
    }

    #[test]
    fn seizure_includes_bonus() {
        let seizure = calculate_collateral_seized(usd(dec!(2000)), Bps::new(500), usd(dec!(10_000)));
        assert_eq!(seizure.bonus.value(), dec!(100));
        assert_eq!(seizure.total_seized.value(), dec!(2100));
    }

    #[test]
    fn seizure_capped_by_collateral() {
        let seizure = calculate_collateral_seized(usd(dec!(2000)), Bps::new(500), usd(dec!(1500)));
        assert_eq!(seizure.total_seized.value(), dec!(1500));
    }

    #[test]
    fn seizure_of_nothing_is_nothing() {
        // repay amounts are Usd, so a negative repay can't reach this
        assert_eq!(Usd::new(dec!(-2000)), None);
        let seizure = calculate_collateral_seized(Usd::zero(), Bps::new(500), usd(dec!(1500)));
        assert_eq!(seizure.total_seized, Usd::zero());
        assert_eq!(seizure.bonus, Usd::zero());
    }

    #[test]
    fn distance_from_current_price() {
        assert_eq!(liquidation_distance(price(dec!(2000)), dec!(1500)), dec!(0.25));
        assert_eq!(liquidation_distance(price(dec!(0.0001)), Decimal::ZERO), Decimal::ONE);
    }
}
