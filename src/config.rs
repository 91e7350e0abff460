// 7.0 config.rs: all risk settings in one place. rate curves, reserve params, health bands.
// 7.1 everything is basis points except the three fees, which are hundredth-bps.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rates::DEFAULT_COMPOUND_FREQUENCY;
use crate::types::{Bps, MicroBps};

/** 7.2: kinked borrow rate curve. min -> optimal over [0, kink], optimal -> max above it. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRateConfig {
    // Borrow rate at zero utilization
    pub min_borrow_rate: Bps,
    // Borrow rate exactly at the kink
    pub optimal_borrow_rate: Bps,
    // Borrow rate at full utilization
    pub max_borrow_rate: Bps,
    // Utilization of the kink
    pub optimal_utilization: Bps,
}

impl Default for InterestRateConfig {
    fn default() -> Self {
        Self {
            min_borrow_rate: Bps::new(200), // 2%
            optimal_borrow_rate: Bps::new(800), // 8%
            max_borrow_rate: Bps::new(3000), // 30%
            optimal_utilization: Bps::new(8000), // 80%
        }
    }
}

impl InterestRateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_borrow_rate > self.optimal_borrow_rate
            || self.optimal_borrow_rate > self.max_borrow_rate
        {
            return Err(ConfigError::InvalidRateModel {
                reason: format!(
                    "rates must be ascending: min {} <= optimal {} <= max {}",
                    self.min_borrow_rate, self.optimal_borrow_rate, self.max_borrow_rate
                ),
            });
        }

        // the rate functions guard 0 and 10_000, but a reserve shipped with either is misconfigured
        if self.optimal_utilization.is_zero() || self.optimal_utilization >= Bps::MAX {
            return Err(ConfigError::InvalidRateModel {
                reason: format!(
                    "optimal utilization {} must be strictly between 0 and 10000",
                    self.optimal_utilization
                ),
            });
        }

        Ok(())
    }
}

/** 7.3: static risk parameters of one asset reserve. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveConfig {
    // Max borrow against this collateral at borrow time
    pub loan_to_value: Bps,
    // Collateral weight used by the health factor
    pub liquidation_threshold: Bps,
    // Incentive paid to liquidators on seized collateral
    pub liquidation_bonus: Bps,
    // Share of borrow interest withheld from suppliers
    pub reserve_ratio: Bps,
    // Fees in hundredths of a basis point
    pub borrow_fee: MicroBps,
    pub withdraw_fee: MicroBps,
    pub flash_loan_fee: MicroBps,
}

impl Default for ReserveConfig {
    fn default() -> Self {
        Self {
            loan_to_value: Bps::new(7000), // 70%
            liquidation_threshold: Bps::new(7500), // 75%
            liquidation_bonus: Bps::new(500), // 5%
            reserve_ratio: Bps::new(1000), // 10%
            borrow_fee: MicroBps::new(1000), // 0.1%
            withdraw_fee: MicroBps::zero(),
            flash_loan_fee: MicroBps::new(3000), // 0.3%
        }
    }
}

impl ReserveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bps_fields = [
            ("loan_to_value", self.loan_to_value),
            ("liquidation_threshold", self.liquidation_threshold),
            ("liquidation_bonus", self.liquidation_bonus),
            ("reserve_ratio", self.reserve_ratio),
        ];
        for (name, value) in bps_fields {
            if value > Bps::MAX {
                return Err(ConfigError::InvalidReserve {
                    reason: format!("{} {} exceeds 10000", name, value),
                });
            }
        }

        let fee_fields = [
            ("borrow_fee", self.borrow_fee),
            ("withdraw_fee", self.withdraw_fee),
            ("flash_loan_fee", self.flash_loan_fee),
        ];
        for (name, value) in fee_fields {
            if value > MicroBps::MAX {
                return Err(ConfigError::InvalidReserve {
                    reason: format!("{} {} exceeds 1000000", name, value),
                });
            }
        }

        if self.liquidation_threshold < self.loan_to_value {
            return Err(ConfigError::InvalidReserve {
                reason: format!(
                    "liquidation threshold {} below loan to value {}",
                    self.liquidation_threshold, self.loan_to_value
                ),
            });
        }

        Ok(())
    }
}

/** 7.4: health factor bands. lower bound of each level, descending from safe. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthThresholds {
    pub safe: Decimal,
    pub warning: Decimal,
    pub danger: Decimal,
    // below this a position can be liquidated
    pub liquidation: Decimal,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            safe: dec!(2.0),
            warning: dec!(1.5),
            danger: dec!(1.2),
            liquidation: dec!(1.0),
        }
    }
}

impl HealthThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.liquidation <= Decimal::ZERO {
            return Err(ConfigError::InvalidThresholds {
                reason: "liquidation cutoff must be positive".to_string(),
            });
        }
        if !(self.safe > self.warning && self.warning > self.danger && self.danger > self.liquidation)
        {
            return Err(ConfigError::InvalidThresholds {
                reason: format!(
                    "cutoffs must descend: safe {} > warning {} > danger {} > liquidation {}",
                    self.safe, self.warning, self.danger, self.liquidation
                ),
            });
        }
        Ok(())
    }
}

// The complete risk configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub thresholds: HealthThresholds,
    // Lowest projected health factor a borrow/withdraw may leave behind
    pub min_health_factor: Decimal,
    // Compounding periods per year for APR <-> APY
    pub compound_frequency: u32,
    // Curve and reserve params used when a reserve doesn't ship its own
    pub default_rate_model: InterestRateConfig,
    pub default_reserve: ReserveConfig,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            thresholds: HealthThresholds::default(),
            min_health_factor: dec!(1.1),
            compound_frequency: DEFAULT_COMPOUND_FREQUENCY,
            default_rate_model: InterestRateConfig::default(),
            default_reserve: ReserveConfig::default(),
        }
    }
}

impl RiskConfig {
    // Looser guard rails for test deployments
    pub fn testnet() -> Self {
        let mut config = Self::default();
        config.min_health_factor = dec!(1.02);
        config.default_reserve.borrow_fee = MicroBps::zero();
        config.default_reserve.flash_loan_fee = MicroBps::zero();
        config
    }

    // Mainnet preset with a wider buffer above liquidation
    pub fn mainnet_conservative() -> Self {
        let mut config = Self::default();
        config.min_health_factor = dec!(1.25);
        config.thresholds.danger = dec!(1.3);
        config.default_reserve.loan_to_value = Bps::new(6500);
        config.default_reserve.liquidation_threshold = Bps::new(7500);
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        self.default_rate_model.validate()?;
        self.default_reserve.validate()?;

        if self.min_health_factor < self.thresholds.liquidation {
            return Err(ConfigError::InvalidThresholds {
                reason: format!(
                    "minimum health factor {} below liquidation cutoff {}",
                    self.min_health_factor, self.thresholds.liquidation
                ),
            });
        }

        if self.compound_frequency == 0 {
            return Err(ConfigError::InvalidCompounding);
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RiskConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            tracing::warn!(error = %e, "rejected risk config");
            return Err(e);
        }
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded risk config");
        Ok(config)
    }
}

// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid rate model: {reason}")]
    InvalidRateModel { reason: String },

    #[error("Invalid reserve config: {reason}")]
    InvalidReserve { reason: String },

    #[error("Invalid health thresholds: {reason}")]
    InvalidThresholds { reason: String },

    #[error("Compound frequency must be at least 1")]
    InvalidCompounding,

    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn config(&self) -> RiskConfig {
        match self {
            Environment::Development => RiskConfig::default(),
            Environment::Testnet => RiskConfig::testnet(),
            Environment::Mainnet => RiskConfig::mainnet_conservative(),
        }
    }
}
