// 9.0: display helpers for dashboards. strings only, no math decisions here.

use crate::types::{HealthFactor, Rate, Usd};
use rust_decimal::{Decimal, RoundingStrategy};

pub fn format_health_factor(hf: HealthFactor) -> String {
    match hf {
        HealthFactor::Finite(v) => format!("{:.2}", round_2dp(v)),
        HealthFactor::Unbounded => "∞".to_string(),
    }
}

// 0.0525 -> "5.25%"
pub fn format_apr(rate: Rate) -> String {
    format!("{:.2}%", round_2dp(rate.as_percent()))
}

// 1234.5 -> "$1,234.50"
pub fn format_usd(amount: Usd) -> String {
    let text = format!("{:.2}", round_2dp(amount.value()));
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("${}.{}", group_thousands(whole), cents)
}

fn round_2dp(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
