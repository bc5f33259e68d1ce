use serde::{Deserialize, Serialize};

/// Odds as they arrive from a card cell or a provider payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOdds {
    Number(f64),
    Text(String),
}

impl From<f64> for RawOdds {
    fn from(value: f64) -> Self {
        RawOdds::Number(value)
    }
}

impl From<&str> for RawOdds {
    fn from(value: &str) -> Self {
        RawOdds::Text(value.to_string())
    }
}

/// Convert any supported odds representation to decimal odds.
///
/// Accepts decimal numbers (`3.5`, `"3.50"`, `"$3.50"`) and fractional text
/// (`"5/2"` becomes `3.5`). Unparseable input, malformed fractions and zero
/// denominators give `None`, which callers must treat as unknown odds.
pub fn to_decimal(raw: Option<&RawOdds>) -> Option<f64> {
    match raw? {
        RawOdds::Number(v) => positive(*v),
        RawOdds::Text(s) => parse_odds_text(s),
    }
}

pub fn parse_odds_text(raw: &str) -> Option<f64> {
    let s = raw.trim().replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<f64>() {
        return positive(v);
    }
    let (num, den) = s.split_once('/')?;
    let num = num.trim().parse::<f64>().ok()?;
    let den = den.trim().parse::<f64>().ok()?;
    if den == 0.0 {
        return None;
    }
    positive(num / den + 1.0)
}

fn positive(v: f64) -> Option<f64> {
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Inclusive band check; unknown odds are never in band.
pub fn within_band(value: Option<f64>, low: f64, high: f64) -> bool {
    value.is_some_and(|v| low <= v && v <= high)
}

/// Fraction of full-unit coverage bought by `stake`, capped at 1.0.
pub fn flexi_percentage(stake: f64, total_cost: f64) -> f64 {
    if total_cost <= 0.0 {
        return 0.0;
    }
    (stake / total_cost).min(1.0)
}

const SHORTENING_THRESHOLD: f64 = 0.9;

/// Market firmer: current price strictly below 90% of the opening price.
pub fn odds_shortening(open: Option<f64>, current: Option<f64>) -> bool {
    match (open, current) {
        (Some(open), Some(current)) if open > 0.0 && current > 0.0 => {
            current < open * SHORTENING_THRESHOLD
        }
        _ => false,
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

pub fn format_odds(odds: Option<f64>) -> String {
    match odds {
        Some(v) => format!("${v:.2}"),
        None => "N/A".to_string(),
    }
}
