use serde::{Deserialize, Serialize};

use crate::checks::barrier_ok;
use crate::form::{count_top4_in_last3, extract_form_flags};
use crate::model::{RaceContext, Runner, Slot, SpeedMapHint};
use crate::odds::within_band;

const BASE_SCORE: i32 = 10;

/// The three betting categories. Each owns a hard odds gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rubric {
    Anchor,
    Pace,
    Value,
}

impl Rubric {
    pub const ALL: [Rubric; 3] = [Rubric::Anchor, Rubric::Pace, Rubric::Value];

    /// Inclusive decimal-odds band.
    pub fn band(self) -> (f64, f64) {
        match self {
            Rubric::Anchor => (2.50, 4.50),
            Rubric::Pace => (5.00, 10.00),
            Rubric::Value => (8.00, 18.00),
        }
    }

    pub fn slot(self) -> Slot {
        match self {
            Rubric::Anchor => Slot::A,
            Rubric::Pace => Slot::B,
            Rubric::Value => Slot::C,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rubric::Anchor => "anchor",
            Rubric::Pace => "pace",
            Rubric::Value => "value",
        }
    }

    pub fn score(self, runner: &Runner, race: Option<&RaceContext>) -> CandidateScore {
        match self {
            Rubric::Anchor => score_anchor_candidate(runner, race),
            Rubric::Pace => score_pace_candidate(runner, race),
            Rubric::Value => score_value_candidate(runner, race),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub score: i32,
    pub rationale: Vec<String>,
    pub qualified: bool,
}

impl CandidateScore {
    fn rejected(reason: String) -> Self {
        Self {
            score: 0,
            rationale: vec![reason],
            qualified: false,
        }
    }

    fn add(&mut self, points: i32, reason: impl Into<String>) {
        self.score += points;
        self.rationale.push(reason.into());
    }

    pub fn rationale_text(&self) -> String {
        self.rationale.join("; ")
    }
}

/// Odds gate shared by all rubrics. `Err` carries the disqualified score.
fn gate(rubric: Rubric, runner: &Runner, in_band: &str) -> Result<CandidateScore, CandidateScore> {
    let Some(odds) = runner.odds_decimal else {
        return Err(CandidateScore::rejected("No odds available".to_string()));
    };
    let (low, high) = rubric.band();
    if !within_band(Some(odds), low, high) {
        return Err(CandidateScore::rejected(format!(
            "Odds ${odds:.2} outside {} range",
            rubric.as_str()
        )));
    }
    Ok(CandidateScore {
        score: BASE_SCORE,
        rationale: vec![format!("{in_band} (${odds:.2})")],
        qualified: true,
    })
}

/// Anchor (A): short-priced, consistent, drawn to get a run.
pub fn score_anchor_candidate(runner: &Runner, race: Option<&RaceContext>) -> CandidateScore {
    let mut s = match gate(Rubric::Anchor, runner, "Good anchor odds") {
        Ok(s) => s,
        Err(rejected) => return rejected,
    };

    if let Some(barrier) = runner.barrier {
        if barrier <= 10 {
            s.add(3, barrier_ok(Some(barrier), 10).message);
        } else {
            s.add(-2, format!("Wide barrier ({barrier})"));
        }
    }

    let top4 = count_top4_in_last3(&runner.last3_form);
    if top4 >= 2 {
        s.add(5, format!("Consistent form ({top4}/3 top-4)"));
    } else {
        s.add(-2, "Inconsistent recent form");
    }

    if runner.market_firmer() {
        s.add(3, "Market firmer");
    }

    if let Some(race) = race {
        let track = race.track.trim().to_lowercase();
        if !track.is_empty() && runner.track_pref.to_lowercase().contains(&track) {
            s.add(2, "Track specialist");
        }
    }
    s
}

/// Pace (B): on-speed runner at mid-range odds.
pub fn score_pace_candidate(runner: &Runner, race: Option<&RaceContext>) -> CandidateScore {
    let mut s = match gate(Rubric::Pace, runner, "Good pace odds") {
        Ok(s) => s,
        Err(rejected) => return rejected,
    };

    match runner.speed_map_hint {
        SpeedMapHint::Leaders | SpeedMapHint::OnPace => s.add(
            5,
            format!("Good speed position ({})", runner.speed_map_hint.as_str()),
        ),
        SpeedMapHint::Midfield => s.add(1, "Midfield runner"),
        SpeedMapHint::Back | SpeedMapHint::Unknown => s.add(-2, "Back marker"),
    }

    match runner.barrier {
        Some(b) if b <= 8 => s.add(4, format!("Excellent barrier ({b})")),
        Some(b) if b <= 10 => s.add(2, format!("Good barrier ({b})")),
        Some(b) => s.add(-1, format!("Wide barrier ({b})")),
        None => {}
    }

    let race_distance = race.and_then(|r| r.distance_m).is_some();
    if race_distance && !runner.distance_pref.trim().is_empty() {
        s.add(2, "Proven at trip");
    }

    if runner.market_firmer() {
        s.add(2, "Market firmer");
    }
    s
}

/// Value (C): longer odds with a reason to improve.
pub fn score_value_candidate(runner: &Runner, _race: Option<&RaceContext>) -> CandidateScore {
    let mut s = match gate(Rubric::Value, runner, "Value odds") {
        Ok(s) => s,
        Err(rejected) => return rejected,
    };

    let flags = extract_form_flags(&runner.last3_form);
    if flags.up_in_trip {
        s.add(4, "Up in trip");
    }
    if flags.down_in_class {
        s.add(4, "Down in class");
    }
    if flags.forgive {
        s.add(3, "Forgive last run");
    }

    if let Some(b) = runner.barrier.filter(|b| *b <= 10) {
        s.add(2, format!("Decent barrier ({b})"));
    }

    let top4 = count_top4_in_last3(&runner.last3_form);
    if top4 >= 1 {
        s.add(3, format!("Has recent form ({top4}/3 top-4)"));
    }
    s
}

/// All three rubrics for one runner.
pub fn score_candidate(runner: &Runner, race: Option<&RaceContext>) -> [(Rubric, CandidateScore); 3] {
    Rubric::ALL.map(|rubric| (rubric, rubric.score(runner, race)))
}
