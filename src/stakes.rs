//! Boxed-bet stake plans, dividend estimates and projected returns.
//!
//! The plan constants (e.g. the $1.33 quinella unit on a fixed $4.00 stake)
//! are house conventions and are reproduced literally.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CUSTOM_QUIN_PCT, DEFAULT_CUSTOM_TRI_PCT, DEFAULT_TAKEOUT, EngineConfig};
use crate::error::{ComboError, DividendError, StrategyError};
use crate::model::Selections;
use crate::odds::{flexi_percentage, format_currency, round2};

const FULL_UNIT: f64 = 1.0;
const QUINELLA_DISCOUNT: f64 = 0.5;
const SPLIT_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Box generators
// ---------------------------------------------------------------------------

/// All 6 finishing orders of exactly three runners.
pub fn combos_trifecta_boxed<T: Clone>(runners: &[T]) -> Result<Vec<[T; 3]>, ComboError> {
    if runners.len() != 3 {
        return Err(ComboError {
            bet: "Trifecta",
            requirement: "exactly 3",
            got: runners.len(),
        });
    }
    Ok(ordered_triples(runners))
}

/// All 3 unordered pairs of exactly three runners.
pub fn combos_quinella_boxed<T: Clone>(runners: &[T]) -> Result<Vec<[T; 2]>, ComboError> {
    if runners.len() != 3 {
        return Err(ComboError {
            bet: "Quinella",
            requirement: "exactly 3",
            got: runners.len(),
        });
    }
    let mut out = Vec::with_capacity(3);
    for i in 0..runners.len() {
        for j in (i + 1)..runners.len() {
            out.push([runners[i].clone(), runners[j].clone()]);
        }
    }
    Ok(out)
}

/// Ordered pairs over two or more runners.
pub fn combos_exacta_boxed<T: Clone>(runners: &[T]) -> Result<Vec<[T; 2]>, ComboError> {
    if runners.len() < 2 {
        return Err(ComboError {
            bet: "Exacta",
            requirement: "at least 2",
            got: runners.len(),
        });
    }
    let n = runners.len();
    let mut out = Vec::with_capacity(n * (n - 1));
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            out.push([runners[i].clone(), runners[j].clone()]);
        }
    }
    Ok(out)
}

/// Ordered 4-tuples over four or more runners.
pub fn combos_first4_boxed<T: Clone>(runners: &[T]) -> Result<Vec<[T; 4]>, ComboError> {
    if runners.len() < 4 {
        return Err(ComboError {
            bet: "First 4",
            requirement: "at least 4",
            got: runners.len(),
        });
    }
    let n = runners.len();
    let mut out = Vec::new();
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            for k in (0..n).filter(|&k| k != i && k != j) {
                for l in (0..n).filter(|&l| l != i && l != j && l != k) {
                    out.push([
                        runners[i].clone(),
                        runners[j].clone(),
                        runners[k].clone(),
                        runners[l].clone(),
                    ]);
                }
            }
        }
    }
    Ok(out)
}

fn ordered_triples<T: Clone>(runners: &[T]) -> Vec<[T; 3]> {
    let n = runners.len();
    let mut out = Vec::new();
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            for k in (0..n).filter(|&k| k != i && k != j) {
                out.push([runners[i].clone(), runners[j].clone(), runners[k].clone()]);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    #[serde(rename = "budget_5")]
    Budget5,
    #[serde(rename = "budget_6")]
    Budget6,
    #[serde(rename = "budget_10")]
    Budget10,
    #[serde(rename = "budget_15")]
    Budget15,
    TrifectaOnly,
    QuinellaOnly,
    Custom,
}

impl StrategyType {
    pub const ALL: [StrategyType; 7] = [
        StrategyType::Budget5,
        StrategyType::Budget6,
        StrategyType::Budget10,
        StrategyType::Budget15,
        StrategyType::TrifectaOnly,
        StrategyType::QuinellaOnly,
        StrategyType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyType::Budget5 => "budget_5",
            StrategyType::Budget6 => "budget_6",
            StrategyType::Budget10 => "budget_10",
            StrategyType::Budget15 => "budget_15",
            StrategyType::TrifectaOnly => "trifecta_only",
            StrategyType::QuinellaOnly => "quinella_only",
            StrategyType::Custom => "custom",
        }
    }
}

impl FromStr for StrategyType {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        StrategyType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| StrategyError::UnknownStrategy(key.to_string()))
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget split for the custom strategy. When only one share is given the
/// other takes the remainder; when neither is given the house split applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyOptions {
    pub tri_percent: Option<f64>,
    pub quin_percent: Option<f64>,
}

impl StrategyOptions {
    /// Resolved `(trifecta, quinella)` shares. Not validated.
    pub fn split(&self) -> (f64, f64) {
        match (self.tri_percent, self.quin_percent) {
            (Some(tri), Some(quin)) => (tri, quin),
            (Some(tri), None) => (tri, 1.0 - tri),
            (None, Some(quin)) => (1.0 - quin, quin),
            (None, None) => (DEFAULT_CUSTOM_TRI_PCT, DEFAULT_CUSTOM_QUIN_PCT),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            tri_percent: Some(config.custom_tri_pct),
            quin_percent: Some(config.custom_quin_pct),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    Trifecta,
    Quinella,
}

impl BetKind {
    fn title(self) -> &'static str {
        match self {
            BetKind::Trifecta => "Trifecta",
            BetKind::Quinella => "Quinella",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetLine {
    #[serde(rename = "type")]
    pub bet_type: String,
    pub kind: BetKind,
    pub unit: f64,
    pub num_combos: usize,
    pub stake: f64,
    pub flexi_pct: f64,
    pub flexi: bool,
    pub combos: Vec<Vec<String>>,
}

impl BetLine {
    /// Full-unit box: stake is unit times combinations.
    fn fixed(kind: BetKind, unit: f64, combos: Vec<Vec<String>>) -> Self {
        let stake = round2(unit * combos.len() as f64);
        Self::with_stake(kind, unit, stake, combos)
    }

    /// Full-unit box with a literal stake that need not equal unit times combos.
    fn with_stake(kind: BetKind, unit: f64, stake: f64, combos: Vec<Vec<String>>) -> Self {
        Self {
            bet_type: format!("{} Boxed", kind.title()),
            kind,
            unit,
            num_combos: combos.len(),
            stake,
            flexi_pct: 1.0,
            flexi: false,
            combos,
        }
    }

    /// Flexi box: a target stake buys a fraction of full-unit coverage.
    fn flexi(kind: BetKind, stake: f64, combos: Vec<Vec<String>>) -> Self {
        let full_cost = combos.len() as f64 * FULL_UNIT;
        Self {
            bet_type: format!("{} Boxed (Flexi)", kind.title()),
            kind,
            unit: FULL_UNIT,
            num_combos: combos.len(),
            stake,
            flexi_pct: flexi_percentage(stake, full_cost),
            flexi: true,
            combos,
        }
    }

    fn instruction(&self, runners: &[String]) -> String {
        let detail = if self.flexi {
            format!(
                "{} Flexi {:.0}%",
                format_currency(self.stake),
                self.flexi_pct * 100.0
            )
        } else {
            format!("{} unit", format_currency(self.unit))
        };
        format!(
            "{} Box: {} - {detail} (Total: {})",
            self.kind.title(),
            runners.join(", "),
            format_currency(self.stake)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakePlan {
    pub strategy: StrategyType,
    pub selections: Vec<String>,
    pub bets: Vec<BetLine>,
    pub total_stake: f64,
}

impl StakePlan {
    /// One TAB-ready line per bet, joined with `" | "`.
    pub fn tab_instructions(&self) -> String {
        self.bets
            .iter()
            .map(|bet| bet.instruction(&self.selections))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl fmt::Display for StakePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy: {}", self.strategy)?;
        writeln!(f, "Selections: {}", self.selections.join(", "))?;
        writeln!(f)?;
        for bet in &self.bets {
            writeln!(f, "{}:", bet.bet_type)?;
            writeln!(f, "  Combinations: {}", bet.num_combos)?;
            writeln!(f, "  Unit: {}", format_currency(bet.unit))?;
            writeln!(f, "  Stake: {}", format_currency(bet.stake))?;
            if bet.flexi_pct < 1.0 {
                writeln!(f, "  Flexi: {:.1}%", bet.flexi_pct * 100.0)?;
            }
            writeln!(f)?;
        }
        write!(f, "Total Stake: {}", format_currency(self.total_stake))
    }
}

/// Validate A/B/C and build the stake plan for `strategy_type`.
///
/// Selection problems are reported before the strategy name is looked at,
/// so a duplicate pick is always `DuplicateSelections`.
pub fn apply_strategy(
    strategy_type: &str,
    selections: &Selections<Option<String>>,
    budget: Option<f64>,
    options: &StrategyOptions,
) -> Result<StakePlan, StrategyError> {
    let picks: Vec<String> = [&selections.a, &selections.b, &selections.c]
        .into_iter()
        .map(|s| s.as_deref().map(str::trim).filter(|s| !s.is_empty()))
        .collect::<Option<Vec<_>>>()
        .ok_or(StrategyError::MissingSelections)?
        .into_iter()
        .map(str::to_string)
        .collect();
    if picks[0] == picks[1] || picks[0] == picks[2] || picks[1] == picks[2] {
        return Err(StrategyError::DuplicateSelections);
    }

    let strategy: StrategyType = strategy_type.parse()?;
    let tri = || -> Result<Vec<Vec<String>>, ComboError> {
        Ok(combos_trifecta_boxed(&picks)?
            .into_iter()
            .map(|c| c.to_vec())
            .collect())
    };
    let quin = || -> Result<Vec<Vec<String>>, ComboError> {
        Ok(combos_quinella_boxed(&picks)?
            .into_iter()
            .map(|c| c.to_vec())
            .collect())
    };

    let bets = match strategy {
        StrategyType::Budget6 => vec![
            BetLine::fixed(BetKind::Trifecta, 0.50, tri()?),
            BetLine::fixed(BetKind::Quinella, 1.00, quin()?),
        ],
        StrategyType::Budget5 => vec![
            BetLine::flexi(BetKind::Trifecta, 2.00, tri()?),
            BetLine::fixed(BetKind::Quinella, 1.00, quin()?),
        ],
        StrategyType::Budget10 => vec![
            BetLine::fixed(BetKind::Trifecta, 1.00, tri()?),
            BetLine::with_stake(BetKind::Quinella, 1.33, 4.00, quin()?),
        ],
        StrategyType::Budget15 => vec![
            BetLine::fixed(BetKind::Trifecta, 1.50, tri()?),
            BetLine::fixed(BetKind::Quinella, 2.00, quin()?),
        ],
        StrategyType::TrifectaOnly => vec![BetLine::fixed(BetKind::Trifecta, 1.00, tri()?)],
        StrategyType::QuinellaOnly => vec![BetLine::fixed(BetKind::Quinella, 2.00, quin()?)],
        StrategyType::Custom => {
            let budget = budget
                .filter(|b| b.is_finite() && *b > 0.0)
                .ok_or(StrategyError::InvalidBudget)?;
            let (tri_percent, quin_percent) = options.split();
            let valid = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
            if !valid(tri_percent)
                || !valid(quin_percent)
                || tri_percent + quin_percent > 1.0 + SPLIT_EPSILON
            {
                return Err(StrategyError::InvalidSplit {
                    tri_percent,
                    quin_percent,
                });
            }
            vec![
                BetLine::flexi(BetKind::Trifecta, round2(budget * tri_percent), tri()?),
                BetLine::flexi(BetKind::Quinella, round2(budget * quin_percent), quin()?),
            ]
        }
    };

    let total_stake = round2(bets.iter().map(|b| b.stake).sum());
    Ok(StakePlan {
        strategy,
        selections: picks,
        bets,
        total_stake,
    })
}

/// Serialisable outcome of `apply_strategy`: either a plan or an error with
/// empty bets and zero stake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakeReport {
    pub bets: Vec<BetLine>,
    pub total_stake: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selections: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<StakePlan, StrategyError>> for StakeReport {
    fn from(result: Result<StakePlan, StrategyError>) -> Self {
        match result {
            Ok(plan) => Self {
                bets: plan.bets,
                total_stake: plan.total_stake,
                selections: plan.selections,
                strategy: Some(plan.strategy),
                error: None,
            },
            Err(err) => Self {
                error: Some(err.to_string()),
                ..Self::default()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Dividends and returns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendEstimate {
    pub trifecta: f64,
    pub quinella: f64,
}

/// Rough exotic dividends from fixed win odds.
pub fn estimate_dividends_from_odds(
    odds_a: Option<f64>,
    odds_b: Option<f64>,
    odds_c: Option<f64>,
    takeout: f64,
) -> Result<DividendEstimate, DividendError> {
    let positive = |o: Option<f64>| o.filter(|v| v.is_finite() && *v > 0.0);
    let (Some(a), Some(b), Some(c)) = (positive(odds_a), positive(odds_b), positive(odds_c)) else {
        return Err(DividendError::MissingOdds);
    };
    let retained = 1.0 - takeout;
    let trifecta = a * b * c * retained;
    let quinella = (a * b + a * c + b * c) / 3.0 * retained * QUINELLA_DISCOUNT;
    Ok(DividendEstimate {
        trifecta: round2(trifecta),
        quinella: round2(quinella),
    })
}

/// `estimate_dividends_from_odds` at the default takeout.
pub fn estimate_dividends(
    odds_a: Option<f64>,
    odds_b: Option<f64>,
    odds_c: Option<f64>,
) -> Result<DividendEstimate, DividendError> {
    estimate_dividends_from_odds(odds_a, odds_b, odds_c, DEFAULT_TAKEOUT)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendReport {
    pub trifecta: f64,
    pub quinella: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<DividendEstimate, DividendError>> for DividendReport {
    fn from(result: Result<DividendEstimate, DividendError>) -> Self {
        match result {
            Ok(d) => Self {
                trifecta: d.trifecta,
                quinella: d.quinella,
                error: None,
            },
            Err(err) => Self {
                error: Some(err.to_string()),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnEstimate {
    pub trifecta_return: f64,
    pub quinella_return: f64,
    pub total_return: f64,
}

/// Projected return per line: dividend scaled by the line's flexi share.
pub fn estimate_returns(bets: &[BetLine], dividends: &DividendEstimate) -> ReturnEstimate {
    let mut out = ReturnEstimate::default();
    for bet in bets {
        let label = bet.bet_type.to_lowercase();
        if label.contains("trifecta") && dividends.trifecta > 0.0 {
            out.trifecta_return += dividends.trifecta * bet.flexi_pct;
        }
        if label.contains("quinella") && dividends.quinella > 0.0 {
            out.quinella_return += dividends.quinella * bet.flexi_pct;
        }
    }
    out.trifecta_return = round2(out.trifecta_return);
    out.quinella_return = round2(out.quinella_return);
    out.total_return = round2(out.trifecta_return + out.quinella_return);
    out
}

#[cfg(test)]
mod tests {
    use super::{
        BetKind, StakeReport, StrategyOptions, StrategyType, apply_strategy,
        combos_exacta_boxed, combos_first4_boxed, combos_quinella_boxed, combos_trifecta_boxed,
        estimate_dividends, estimate_returns,
    };
    use crate::error::StrategyError;
    use crate::model::Selections;

    fn abc() -> Selections<Option<String>> {
        Selections::named("Alpha", "Bravo", "Charlie")
    }

    #[test]
    fn box_sizes() {
        let three = ["a", "b", "c"];
        assert_eq!(combos_trifecta_boxed(&three).unwrap().len(), 6);
        assert_eq!(
            combos_quinella_boxed(&three).unwrap(),
            vec![["a", "b"], ["a", "c"], ["b", "c"]]
        );
        assert_eq!(combos_exacta_boxed(&three).unwrap().len(), 6);
        assert_eq!(combos_first4_boxed(&["a", "b", "c", "d"]).unwrap().len(), 24);

        let err = combos_trifecta_boxed(&["a", "b"]).unwrap_err();
        assert_eq!(err.to_string(), "Trifecta box requires exactly 3 runners, got 2");
        assert!(combos_quinella_boxed(&["a", "b", "c", "d"]).is_err());
        assert!(combos_first4_boxed(&three).is_err());
    }

    #[test]
    fn trifecta_orders_are_distinct() {
        let combos = combos_trifecta_boxed(&[1, 2, 3]).unwrap();
        assert_eq!(combos[0], [1, 2, 3]);
        assert_eq!(combos[5], [3, 2, 1]);
        for (i, x) in combos.iter().enumerate() {
            assert!(combos[i + 1..].iter().all(|y| y != x));
        }
    }

    #[test]
    fn strategy_totals() {
        let opts = StrategyOptions::default();
        let totals: Vec<(StrategyType, f64)> = StrategyType::ALL
            .into_iter()
            .filter(|t| *t != StrategyType::Custom)
            .map(|t| (t, apply_strategy(t.as_str(), &abc(), None, &opts).unwrap().total_stake))
            .collect();
        assert_eq!(
            totals,
            vec![
                (StrategyType::Budget5, 5.0),
                (StrategyType::Budget6, 6.0),
                (StrategyType::Budget10, 10.0),
                (StrategyType::Budget15, 15.0),
                (StrategyType::TrifectaOnly, 6.0),
                (StrategyType::QuinellaOnly, 6.0),
            ]
        );
    }

    #[test]
    fn budget_5_is_a_third_flexi() {
        let plan = apply_strategy("budget_5", &abc(), None, &StrategyOptions::default()).unwrap();
        let tri = &plan.bets[0];
        assert_eq!(tri.bet_type, "Trifecta Boxed (Flexi)");
        assert!((tri.flexi_pct - 2.0 / 6.0).abs() < 1e-9);
        assert_eq!(
            plan.tab_instructions(),
            "Trifecta Box: Alpha, Bravo, Charlie - $2.00 Flexi 33% (Total: $2.00) | \
             Quinella Box: Alpha, Bravo, Charlie - $1.00 unit (Total: $3.00)"
        );
        let text = plan.to_string();
        assert!(text.starts_with("Strategy: budget_5\nSelections: Alpha, Bravo, Charlie\n"));
        assert!(text.contains("  Flexi: 33.3%"));
        assert!(text.ends_with("Total Stake: $5.00"));
    }

    #[test]
    fn budget_10_keeps_literal_quinella_stake() {
        let plan = apply_strategy("budget_10", &abc(), None, &StrategyOptions::default()).unwrap();
        let quin = &plan.bets[1];
        assert_eq!(quin.kind, BetKind::Quinella);
        assert_eq!(quin.unit, 1.33);
        assert_eq!(quin.stake, 4.0);
        assert_eq!(quin.num_combos, 3);
    }

    #[test]
    fn custom_splits_budget() {
        let plan = apply_strategy("custom", &abc(), Some(20.0), &StrategyOptions::default()).unwrap();
        assert_eq!(plan.bets[0].stake, 8.0);
        assert_eq!(plan.bets[0].flexi_pct, 1.0);
        assert_eq!(plan.bets[1].stake, 12.0);
        assert_eq!(plan.total_stake, 20.0);

        let opts = StrategyOptions {
            tri_percent: Some(0.5),
            quin_percent: Some(0.5),
        };
        let plan = apply_strategy("custom", &abc(), Some(4.0), &opts).unwrap();
        assert!((plan.bets[0].flexi_pct - 2.0 / 6.0).abs() < 1e-9);
        assert!((plan.bets[1].flexi_pct - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn custom_rejects_bad_budget_and_split() {
        let opts = StrategyOptions::default();
        for budget in [None, Some(0.0), Some(-5.0), Some(f64::NAN)] {
            assert_eq!(
                apply_strategy("custom", &abc(), budget, &opts),
                Err(StrategyError::InvalidBudget)
            );
        }
        let bad = StrategyOptions {
            tri_percent: Some(1.5),
            quin_percent: None,
        };
        assert!(matches!(
            apply_strategy("custom", &abc(), Some(10.0), &bad),
            Err(StrategyError::InvalidSplit { .. })
        ));
        let overspend = StrategyOptions {
            tri_percent: Some(0.9),
            quin_percent: Some(0.6),
        };
        assert!(matches!(
            apply_strategy("custom", &abc(), Some(10.0), &overspend),
            Err(StrategyError::InvalidSplit { .. })
        ));
    }

    #[test]
    fn custom_never_stakes_more_than_budget() {
        for (tri, quin) in [
            (Some(0.9), None),
            (None, Some(0.25)),
            (Some(0.3), Some(0.7)),
            (Some(0.1), Some(0.2)),
            (None, None),
        ] {
            let opts = StrategyOptions {
                tri_percent: tri,
                quin_percent: quin,
            };
            let plan = apply_strategy("custom", &abc(), Some(10.0), &opts).unwrap();
            assert!(plan.total_stake <= 10.0, "{tri:?}/{quin:?} staked {}", plan.total_stake);
        }
        let plan = apply_strategy(
            "custom",
            &abc(),
            Some(10.0),
            &StrategyOptions {
                tri_percent: Some(0.9),
                quin_percent: None,
            },
        )
        .unwrap();
        assert_eq!(plan.bets[0].stake, 9.0);
        assert_eq!(plan.bets[1].stake, 1.0);
    }

    #[test]
    fn validation_order() {
        let opts = StrategyOptions::default();
        let missing = Selections::new(Some("A".to_string()), Some("  ".to_string()), None);
        assert_eq!(
            apply_strategy("nonsense", &missing, None, &opts),
            Err(StrategyError::MissingSelections)
        );
        let dup = Selections::named("A", "B", "A");
        assert_eq!(
            apply_strategy("nonsense", &dup, None, &opts),
            Err(StrategyError::DuplicateSelections)
        );
        assert_eq!(
            apply_strategy("nonsense", &abc(), None, &opts),
            Err(StrategyError::UnknownStrategy("nonsense".to_string()))
        );
    }

    #[test]
    fn error_report_is_zeroed() {
        let dup = Selections::named("A", "B", "A");
        let report = StakeReport::from(apply_strategy(
            "budget_6",
            &dup,
            None,
            &StrategyOptions::default(),
        ));
        assert!(report.bets.is_empty());
        assert_eq!(report.total_stake, 0.0);
        assert_eq!(report.error.as_deref(), Some("A, B, and C must be different horses"));
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("strategy").is_none());
    }

    #[test]
    fn returns_scale_with_flexi() {
        let dividends = estimate_dividends(Some(3.2), Some(7.2), Some(11.0)).unwrap();
        assert_eq!(dividends.trifecta, 202.75);
        assert_eq!(dividends.quinella, 18.33);

        let plan = apply_strategy("budget_6", &abc(), None, &StrategyOptions::default()).unwrap();
        let full = estimate_returns(&plan.bets, &dividends);
        assert_eq!(full.trifecta_return, 202.75);
        assert_eq!(full.quinella_return, 18.33);
        assert_eq!(full.total_return, 221.08);

        let plan = apply_strategy("budget_5", &abc(), None, &StrategyOptions::default()).unwrap();
        let flexi = estimate_returns(&plan.bets, &dividends);
        assert_eq!(flexi.trifecta_return, 67.58);
    }

    #[test]
    fn missing_odds_gives_no_dividends() {
        assert!(estimate_dividends(Some(3.2), None, Some(11.0)).is_err());
        assert!(estimate_dividends(Some(3.2), Some(0.0), Some(11.0)).is_err());
    }
}
