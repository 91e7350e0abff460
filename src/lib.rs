// lend-risk: risk and interest-rate math for a lending market.
// pure functions only: no I/O, no shared state, no logging in the math.
// all computation is deterministic decimal arithmetic.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Bps, MicroBps, Usd, Amount, Rate, Price, Utilization, HealthFactor
//   2.x  utilization.rs: pool utilization and total supply
//   3.x  interest.rs: kinked borrow curve, supply rate, reserve summaries
//   4.x  health.rs: health factor, levels, max borrow/withdraw, what-if checks
//   4.2  liquidation.rs: liquidation price, liquidator bonus, seizure
//   5.x  rates.rs: APR/APY, fees (bps and hundredth-bps), net APR, accrual
//   6.x  account.rs: per-user aggregation over deposits and borrows
//   7.x  config.rs: rate models, reserve params, health bands, env presets
//   8.x  input.rs: string/number conversion boundary
//   9.x  format.rs: display helpers

// core math modules
pub mod health;
pub mod interest;
pub mod liquidation;
pub mod rates;
pub mod types;
pub mod utilization;

// aggregation and integration modules
pub mod account;
pub mod config;
pub mod format;
pub mod input;

// re exports for convenience
pub use account::*;
pub use health::*;
pub use interest::*;
pub use liquidation::*;
pub use rates::*;
pub use types::*;
pub use utilization::*;
pub use config::{ConfigError, Environment, HealthThresholds, InterestRateConfig, ReserveConfig, RiskConfig};
pub use format::{format_apr, format_health_factor, format_usd};
pub use input::{parse_amount, InputError, NumericInput};
