use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::odds;

/// One runner as extracted from a race card (or imported from a provider).
///
/// Optional text fields default to the empty string and numeric fields to
/// `None`; absence means "unknown", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Runner {
    pub name: String,
    pub barrier: Option<u32>,
    pub odds_decimal: Option<f64>,
    pub last3_form: String,
    pub jockey: String,
    pub trainer: String,
    pub speed_map_hint: SpeedMapHint,
    pub track_pref: String,
    pub distance_pref: String,
    pub market_open_odds: Option<f64>,
    pub market_current_odds: Option<f64>,
    pub is_scratched: bool,
}

impl Runner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Current market price is more than 10% shorter than the opening price.
    pub fn market_firmer(&self) -> bool {
        odds::odds_shortening(self.market_open_odds, self.market_current_odds)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedMapHint {
    #[serde(rename = "leaders")]
    Leaders,
    #[serde(rename = "on-pace")]
    OnPace,
    #[serde(rename = "midfield")]
    Midfield,
    #[serde(rename = "back")]
    Back,
    #[default]
    #[serde(rename = "")]
    Unknown,
}

impl SpeedMapHint {
    /// Lenient parse for user-entered cells. Unrecognised text is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "leaders" | "leader" | "lead" => SpeedMapHint::Leaders,
            "on-pace" | "on pace" | "onpace" | "on_pace" => SpeedMapHint::OnPace,
            "midfield" | "mid" => SpeedMapHint::Midfield,
            "back" | "backmarker" | "closer" => SpeedMapHint::Back,
            _ => SpeedMapHint::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpeedMapHint::Leaders => "leaders",
            SpeedMapHint::OnPace => "on-pace",
            SpeedMapHint::Midfield => "midfield",
            SpeedMapHint::Back => "back",
            SpeedMapHint::Unknown => "",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackCondition {
    Good,
    Soft,
    Heavy,
    Synth,
    #[default]
    Unknown,
}

impl TrackCondition {
    /// Normalise free text such as "Good 4", "Soft (7)" or "Synthetic".
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim().to_ascii_uppercase();
        if s.is_empty() {
            return TrackCondition::Unknown;
        }
        if s.contains("GOOD") || s.contains("FIRM") {
            TrackCondition::Good
        } else if s.contains("SOFT") || s.contains("YIELDING") {
            TrackCondition::Soft
        } else if s.contains("HEAVY") || s.contains("SLOW") {
            TrackCondition::Heavy
        } else if s.contains("SYNTH") || s.contains("POLY") {
            TrackCondition::Synth
        } else {
            TrackCondition::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrackCondition::Good => "GOOD",
            TrackCondition::Soft => "SOFT",
            TrackCondition::Heavy => "HEAVY",
            TrackCondition::Synth => "SYNTH",
            TrackCondition::Unknown => "UNKNOWN",
        }
    }
}

/// Race-level parameters passed into scoring. Purely an input bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceContext {
    pub meeting: String,
    pub track: String,
    pub date: Option<NaiveDate>,
    pub race_number: Option<u32>,
    pub distance_m: Option<u32>,
    pub track_condition: String,
    pub num_runners: Option<usize>,
}

impl RaceContext {
    pub fn condition(&self) -> TrackCondition {
        TrackCondition::parse(&self.track_condition)
    }

    pub fn label(&self) -> String {
        let venue = if self.meeting.trim().is_empty() {
            self.track.trim()
        } else {
            self.meeting.trim()
        };
        let venue = if venue.is_empty() { "Race" } else { venue };
        match (self.race_number, self.date) {
            (Some(n), Some(d)) => format!("{venue} R{n} ({d})"),
            (Some(n), None) => format!("{venue} R{n}"),
            (None, Some(d)) => format!("{venue} ({d})"),
            (None, None) => venue.to_string(),
        }
    }
}

/// A race card: context plus its runners, the unit of meeting-wide analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceCard {
    pub race: RaceContext,
    pub runners: Vec<Runner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
    C,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::A, Slot::B, Slot::C];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::A => "A",
            Slot::B => "B",
            Slot::C => "C",
        }
    }
}

/// One value per A/B/C slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selections<T> {
    #[serde(rename = "A")]
    pub a: T,
    #[serde(rename = "B")]
    pub b: T,
    #[serde(rename = "C")]
    pub c: T,
}

impl<T> Selections<T> {
    pub fn new(a: T, b: T, c: T) -> Self {
        Self { a, b, c }
    }

    pub fn get(&self, slot: Slot) -> &T {
        match slot {
            Slot::A => &self.a,
            Slot::B => &self.b,
            Slot::C => &self.c,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Selections<U> {
        Selections {
            a: f(&self.a),
            b: f(&self.b),
            c: f(&self.c),
        }
    }
}

impl Selections<Option<String>> {
    pub fn named(a: &str, b: &str, c: &str) -> Self {
        Self::new(Some(a.to_string()), Some(b.to_string()), Some(c.to_string()))
    }
}
