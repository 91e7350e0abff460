// 1.0: all the primitives live here. nothing in the risk math works without these types.
// basis points, hundredth-bps, usd values, rates, utilization, health factor. each is a
// newtype so the compiler catches unit mixups (bps vs micro-bps is the classic one).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

use crate::input::InputError;

// 1.1: basis points. 100 bps = 1%, 10_000 bps = 100%.
// rates, thresholds, LTV, bonus and reserve ratio are all in this unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bps(u32);

impl Bps {
    pub const MAX: Bps = Bps(10_000);

    pub fn new(bps: u32) -> Self {
        Self(bps)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(self.0 as i64, 4)
    }
}

impl fmt::Display for Bps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

// 1.2: hundredths of a basis point. 1_000_000 = 100%.
// only the borrow/withdraw/flash-loan fees use this. no conversion to Bps on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MicroBps(u32);

impl MicroBps {
    pub const MAX: MicroBps = MicroBps(1_000_000);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(self.0 as i64, 6)
    }
}

impl fmt::Display for MicroBps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}µbps", self.0)
    }
}

// 1.3: usd amount. collateral value, debt value, fees, max borrow all use this.
// already scaled to human units; the caller converts from on-chain base units.
// never negative: `new` and deserialization both reject a sign. signed changes
// (what-if deltas, net APR) stay plain Decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Usd(Decimal);

impl Usd {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    // a balance after a signed change. below zero means fully drawn down.
    pub(crate) fn floored(value: Decimal) -> Self {
        Self(value.max(Decimal::ZERO))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(&self, other: Usd) -> Self {
        Self(self.0 + other.0)
    }

    pub fn mul_bps(&self, factor: Bps) -> Self {
        Self(self.0 * factor.as_fraction())
    }

    pub fn mul_micro_bps(&self, factor: MicroBps) -> Self {
        Self(self.0 * factor.as_fraction())
    }

    // None for a negative factor or on overflow
    pub fn checked_mul(&self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).and_then(Self::new)
    }

    // floors at zero. balances after a withdrawal/repay never go negative.
    pub fn saturating_sub(&self, other: Usd) -> Self {
        Self::floored(self.0 - other.0)
    }
}

impl TryFrom<Decimal> for Usd {
    type Error = InputError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InputError::Negative { value })
    }
}

impl From<Usd> for Decimal {
    fn from(usd: Usd) -> Self {
        usd.0
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for Usd {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Usd {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl Sum for Usd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, v| acc.add(v))
    }
}

impl<'a> Sum<&'a Usd> for Usd {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, v| acc.add(*v))
    }
}

// 1.4: annualized rate as a decimal fraction. 0.08 = 8% APR.
// can be negative (net APR of a position that pays more than it earns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rate(Decimal);

impl Rate {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_bps(bps: Bps) -> Self {
        Self(bps.as_fraction())
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn as_percent(&self) -> Decimal {
        self.0 * dec!(100)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.5: oracle price of one unit of an asset in usd. must be positive, so
// dividing by it is always safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = InputError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InputError::NonPositivePrice { value })
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.5.1: token quantity in human units (1.5 APT, not octas). never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    // both sides non-negative, so the product is a valid Usd
    pub fn value_at(&self, price: Price) -> Usd {
        Usd(self.0 * price.value())
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = InputError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InputError::Negative { value })
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.6: borrowed share of a pool. always in [0, 1].
// stale data can produce values outside the range, so construction clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Utilization(Decimal);

impl Utilization {
    pub fn new(value: Decimal) -> Self {
        Self(value.max(Decimal::ZERO).min(Decimal::ONE))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn full() -> Self {
        Self(Decimal::ONE)
    }

    pub fn from_bps(bps: Bps) -> Self {
        Self::new(bps.as_fraction())
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Utilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.7: weighted collateral over debt. Unbounded means no debt, so the position
// cannot be liquidated. variant order matters: derived Ord puts Unbounded above
// every finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthFactor {
    Finite(Decimal),
    Unbounded,
}

impl HealthFactor {
    pub fn finite(&self) -> Option<Decimal> {
        match self {
            HealthFactor::Finite(v) => Some(*v),
            HealthFactor::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, HealthFactor::Unbounded)
    }

    // true when this factor reaches `minimum`. Unbounded always does.
    pub fn meets(&self, minimum: Decimal) -> bool {
        match self {
            HealthFactor::Finite(v) => *v >= minimum,
            HealthFactor::Unbounded => true,
        }
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthFactor::Finite(v) => write!(f, "{}", v),
            HealthFactor::Unbounded => write!(f, "∞"),
        }
    }
}

// 1.8: millisecond timestamp. used for interest accrual projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    // 365-day year. negative spans count as zero.
    pub fn elapsed_years(&self, later: &Timestamp) -> Decimal {
        let diff_ms = later.0.saturating_sub(self.0).max(0);
        Decimal::new(diff_ms, 0) / dec!(31_536_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn bps_conversion() {
        assert_eq!(Bps::new(100).as_fraction(), dec!(0.01)); // 1%
        assert_eq!(Bps::new(7500).as_fraction(), dec!(0.75));
        assert_eq!(Bps::MAX.as_fraction(), Decimal::ONE);
    }

    #[test]
    fn micro_bps_conversion() {
        assert_eq!(MicroBps::new(10).as_fraction(), dec!(0.00001));
        assert_eq!(MicroBps::new(10_000).as_fraction(), dec!(0.01)); // 1%
        // same raw number, 100x smaller than bps
        assert_eq!(
            Bps::new(10).as_fraction(),
            MicroBps::new(10).as_fraction() * dec!(100)
        );
    }

    #[test]
    fn utilization_clamps() {
        assert_eq!(Utilization::new(dec!(1.2)).value(), Decimal::ONE);
        assert_eq!(Utilization::new(dec!(-0.3)).value(), Decimal::ZERO);
        assert_eq!(Utilization::new(dec!(0.42)).value(), dec!(0.42));
    }

    #[test]
    fn health_factor_ordering() {
        let low = HealthFactor::Finite(dec!(0.9));
        let high = HealthFactor::Finite(dec!(1_000_000));
        assert!(low < high);
        assert!(high < HealthFactor::Unbounded);
        assert!(HealthFactor::Unbounded.meets(dec!(99999)));
        assert!(!low.meets(Decimal::ONE));
    }

    #[test]
    fn usd_saturating_sub() {
        let a = Usd::new(dec!(100)).unwrap();
        let b = Usd::new(dec!(250)).unwrap();
        assert_eq!(a.saturating_sub(b), Usd::zero());
        assert_eq!(b.saturating_sub(a).value(), dec!(150));
    }

    #[test]
    fn usd_rejects_negative() {
        assert_eq!(Usd::new(dec!(-0.01)), None);
        assert_eq!(Usd::new(Decimal::ZERO), Some(Usd::zero()));
        assert_eq!(
            Usd::try_from(dec!(-1000)),
            Err(InputError::Negative { value: dec!(-1000) })
        );
        // negative factor would flip the sign
        let a = Usd::new(dec!(100)).unwrap();
        assert_eq!(a.checked_mul(dec!(-0.5)), None);
        assert_eq!(a.checked_mul(dec!(0.5)).unwrap().value(), dec!(50));
    }

    #[test]
    fn validated_types_reject_bad_json() {
        assert!(serde_json::from_str::<Usd>("\"-50\"").is_err());
        assert!(serde_json::from_str::<Amount>("\"-1\"").is_err());
        assert!(serde_json::from_str::<Price>("\"0\"").is_err());

        let usd: Usd = serde_json::from_str("\"1250.5\"").unwrap();
        assert_eq!(usd.value(), dec!(1250.5));
        let price: Price = serde_json::from_str("\"8.5\"").unwrap();
        assert_eq!(price.value(), dec!(8.5));
    }

    #[test]
    fn amount_priced_in_usd() {
        let amount = Amount::new(dec!(150)).unwrap();
        let price = Price::new(dec!(8.5)).unwrap();
        assert_eq!(amount.value_at(price).value(), dec!(1275));
        assert_eq!(Amount::new(dec!(-3)), None);
        assert_eq!(Price::new(Decimal::ZERO), None);
    }

    #[test]
    fn elapsed_years_full_year() {
        let t0 = Timestamp::from_millis(0);
        let t1 = Timestamp::from_millis(365 * 24 * 3600 * 1000);
        assert_eq!(t0.elapsed_years(&t1), Decimal::ONE);
        assert_eq!(t1.elapsed_years(&t0), Decimal::ZERO);
    }

    #[test]
    fn elapsed_years_extreme_timestamps() {
        let earliest = Timestamp::from_millis(i64::MIN);
        let latest = Timestamp::from_millis(i64::MAX);
        // span saturates at i64::MAX ms instead of wrapping
        let years = earliest.elapsed_years(&latest);
        assert_eq!(years, Decimal::from(i64::MAX) / dec!(31_536_000_000));
        assert_eq!(latest.elapsed_years(&earliest), Decimal::ZERO);
    }
}
