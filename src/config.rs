use std::env;

pub const DEFAULT_TAKEOUT: f64 = 0.20;
pub const DEFAULT_CUSTOM_TRI_PCT: f64 = 0.40;
pub const DEFAULT_CUSTOM_QUIN_PCT: f64 = 0.60;
pub const DEFAULT_FIELD_MIN: usize = 8;
pub const DEFAULT_FIELD_MAX: usize = 12;
pub const DEFAULT_BARRIER_MAX: u32 = 8;
pub const DEFAULT_ALTERNATES: usize = 3;

/// Tunables for analysis and staking. Defaults are the house constants.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub takeout: f64,
    pub custom_tri_pct: f64,
    pub custom_quin_pct: f64,
    pub field_min: usize,
    pub field_max: usize,
    pub barrier_max: u32,
    pub alternates: usize,
    pub log_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            takeout: DEFAULT_TAKEOUT,
            custom_tri_pct: DEFAULT_CUSTOM_TRI_PCT,
            custom_quin_pct: DEFAULT_CUSTOM_QUIN_PCT,
            field_min: DEFAULT_FIELD_MIN,
            field_max: DEFAULT_FIELD_MAX,
            barrier_max: DEFAULT_BARRIER_MAX,
            alternates: DEFAULT_ALTERNATES,
            log_enabled: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let takeout = lookup("RACECARD_TAKEOUT")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_TAKEOUT)
            .clamp(0.0, 0.5);
        let share = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(0.0, 1.0))
        };
        // one share given: the other takes the remainder; both given: the
        // quinella share is capped so the pair never exceeds the budget
        let (custom_tri_pct, custom_quin_pct) = match (
            share("RACECARD_CUSTOM_TRI_PCT"),
            share("RACECARD_CUSTOM_QUIN_PCT"),
        ) {
            (Some(tri), Some(quin)) => (tri, quin.min(1.0 - tri)),
            (Some(tri), None) => (tri, 1.0 - tri),
            (None, Some(quin)) => (1.0 - quin, quin),
            (None, None) => (DEFAULT_CUSTOM_TRI_PCT, DEFAULT_CUSTOM_QUIN_PCT),
        };
        let field_min = lookup("RACECARD_FIELD_MIN")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_FIELD_MIN)
            .clamp(2, 24);
        let field_max = lookup("RACECARD_FIELD_MAX")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_FIELD_MAX)
            .clamp(field_min, 30);
        let barrier_max = lookup("RACECARD_BARRIER_MAX")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_BARRIER_MAX)
            .clamp(1, 24);
        let alternates = lookup("RACECARD_ALTERNATES")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_ALTERNATES)
            .clamp(0, 10);
        let log_enabled = lookup_bool(&lookup, "RACECARD_LOG", true);

        Self {
            takeout,
            custom_tri_pct,
            custom_quin_pct,
            field_min,
            field_max,
            barrier_max,
            alternates,
            log_enabled,
        }
    }
}

fn lookup_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    lookup(key)
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
