// 2.0: pool utilization. how much of the supplied liquidity is lent out.
// inputs are human-unit amounts; base-unit scaling happens before these are called.

use crate::types::{Usd, Utilization};

// 2.1: borrowed / (cash + borrowed). empty pool = 0, never a division by zero.
pub fn calculate_utilization(total_borrowed: Usd, total_cash_available: Usd) -> Utilization {
    let total_supply = calculate_total_supply(total_cash_available, total_borrowed);
    if total_supply.is_zero() {
        return Utilization::zero();
    }
    Utilization::new(total_borrowed.value() / total_supply.value())
}

pub fn calculate_total_supply(total_cash_available: Usd, total_borrowed: Usd) -> Usd {
    total_cash_available.add(total_borrowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::NumericInput;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_pool_is_zero() {
        let u = calculate_utilization(Usd::zero(), Usd::zero());
        assert_eq!(u.value(), Decimal::ZERO);
    }

    #[test]
    fn no_borrows_is_zero() {
        let u = calculate_utilization(Usd::zero(), Usd::new(dec!(1_000_000)).unwrap());
        assert_eq!(u.value(), Decimal::ZERO);
    }

    #[test]
    fn fully_borrowed_is_one() {
        let u = calculate_utilization(Usd::new(dec!(500)).unwrap(), Usd::zero());
        assert_eq!(u.value(), Decimal::ONE);
    }

    #[test]
    fn partial_utilization() {
        // 800 out of 1000 supplied
        let u = calculate_utilization(Usd::new(dec!(800)).unwrap(), Usd::new(dec!(200)).unwrap());
        assert_eq!(u.value(), dec!(0.8));
    }

    #[test]
    fn total_supply_adds() {
        let total = calculate_total_supply(Usd::new(dec!(1250.5)).unwrap(), Usd::new(dec!(749.5)).unwrap());
        assert_eq!(total.value(), dec!(2000));
    }

    #[test]
    fn negative_balances_never_reach_utilization() {
        // -50 borrowed used to clamp silently to 0% utilization
        assert_eq!(Usd::new(dec!(-50)), None);
        assert!(NumericInput::from("-50").to_usd().is_err());
    }
}
