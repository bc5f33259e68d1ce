use rayon::prelude::*;
use serde::Serialize;

use crate::checks::validate_field_size;
use crate::config::EngineConfig;
use crate::logbook::Logbook;
use crate::model::{RaceCard, RaceContext, Runner, Selections, Slot, TrackCondition};
use crate::scoring::{CandidateScore, Rubric};

/// A runner that qualified for one rubric, with its score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate<'a> {
    pub runner: &'a Runner,
    pub score: i32,
    pub rationale: Vec<String>,
    pub qualified: bool,
}

impl<'a> ScoredCandidate<'a> {
    fn new(runner: &'a Runner, scored: CandidateScore) -> Self {
        Self {
            runner,
            score: scored.score,
            rationale: scored.rationale,
            qualified: scored.qualified,
        }
    }

    pub fn name(&self) -> &str {
        &self.runner.name
    }
}

/// Ranked qualifiers per rubric, best first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RubricScores<'a> {
    pub anchor: Vec<ScoredCandidate<'a>>,
    pub pace: Vec<ScoredCandidate<'a>>,
    pub value: Vec<ScoredCandidate<'a>>,
}

impl<'a> RubricScores<'a> {
    pub fn get(&self, rubric: Rubric) -> &[ScoredCandidate<'a>] {
        match rubric {
            Rubric::Anchor => &self.anchor,
            Rubric::Pace => &self.pace,
            Rubric::Value => &self.value,
        }
    }

    fn get_mut(&mut self, rubric: Rubric) -> &mut Vec<ScoredCandidate<'a>> {
        match rubric {
            Rubric::Anchor => &mut self.anchor,
            Rubric::Pace => &mut self.pace,
            Rubric::Value => &mut self.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checklist {
    pub field_size_ok: bool,
    pub field_size_message: String,
    pub barriers_ok: bool,
    pub barrier_notes: Vec<String>,
    pub market_firmers: Vec<Slot>,
    pub track_condition: TrackCondition,
}

#[derive(Debug, Clone, Serialize)]
pub struct RaceAnalysis<'a> {
    pub candidates: Selections<Option<ScoredCandidate<'a>>>,
    pub alternates: Selections<Vec<ScoredCandidate<'a>>>,
    pub checklist: Checklist,
    pub all_scores: RubricScores<'a>,
    #[serde(skip)]
    pub log: Logbook,
}

impl RaceAnalysis<'_> {
    /// Selected runner names, ready for the stake calculator.
    pub fn selection_names(&self) -> Selections<Option<String>> {
        self.candidates
            .map(|c| c.as_ref().map(|c| c.runner.name.clone()))
    }

    pub fn is_complete(&self) -> bool {
        Slot::ALL
            .iter()
            .all(|slot| self.candidates.get(*slot).is_some())
    }
}

/// Stateless A/B/C selector; holds only thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceAnalyzer {
    pub field_min: usize,
    pub field_max: usize,
    pub barrier_max: u32,
    pub alternates: usize,
}

impl Default for RaceAnalyzer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl RaceAnalyzer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            field_min: config.field_min,
            field_max: config.field_max,
            barrier_max: config.barrier_max,
            alternates: config.alternates,
        }
    }

    pub fn analyze<'a>(&self, race: &RaceContext, runners: &'a [Runner]) -> RaceAnalysis<'a> {
        let mut log = Logbook::new();
        let mut all_scores = RubricScores::default();

        for runner in runners {
            if runner.is_scratched {
                log.info(format!("{}: scratched, skipped", runner.name));
                continue;
            }
            for rubric in Rubric::ALL {
                let scored = rubric.score(runner, Some(race));
                if scored.qualified {
                    all_scores
                        .get_mut(rubric)
                        .push(ScoredCandidate::new(runner, scored));
                }
            }
        }

        for rubric in Rubric::ALL {
            let ranked = all_scores.get_mut(rubric);
            // stable: ties keep card order
            ranked.sort_by(|a, b| b.score.cmp(&a.score));
            log.info(format!(
                "{} (slot {}): {} qualifier(s)",
                rubric.as_str(),
                rubric.slot().as_str(),
                ranked.len()
            ));
        }

        let a = all_scores.anchor.first().cloned();
        let a_name = a.as_ref().map(|c| c.runner.name.as_str());
        let b = all_scores
            .pace
            .iter()
            .find(|c| Some(c.name()) != a_name)
            .cloned();
        let b_name = b.as_ref().map(|c| c.runner.name.as_str());
        let c = all_scores
            .value
            .iter()
            .find(|c| Some(c.name()) != a_name && Some(c.name()) != b_name)
            .cloned();

        let candidates = Selections::new(a, b, c);
        for slot in Slot::ALL {
            if candidates.get(slot).is_none() {
                log.warn(format!("no qualifier for slot {}", slot.as_str()));
            }
        }

        let alternates = Selections::new(
            self.alternates_for(&all_scores.anchor),
            self.alternates_for(&all_scores.pace),
            self.alternates_for(&all_scores.value),
        );
        let checklist = self.checklist(race, &candidates);

        RaceAnalysis {
            candidates,
            alternates,
            checklist,
            all_scores,
            log,
        }
    }

    fn alternates_for<'a>(&self, ranked: &[ScoredCandidate<'a>]) -> Vec<ScoredCandidate<'a>> {
        ranked.iter().skip(1).take(self.alternates).cloned().collect()
    }

    fn checklist(
        &self,
        race: &RaceContext,
        candidates: &Selections<Option<ScoredCandidate<'_>>>,
    ) -> Checklist {
        let field = validate_field_size(race.num_runners, self.field_min, self.field_max);

        let mut barrier_notes = Vec::new();
        for slot in [Slot::A, Slot::B] {
            let Some(candidate) = candidates.get(slot) else {
                continue;
            };
            match candidate.runner.barrier {
                Some(b) if b > self.barrier_max => barrier_notes.push(format!(
                    "{} barrier {b} > {}",
                    slot.as_str(),
                    self.barrier_max
                )),
                Some(_) => {}
                None => barrier_notes.push(format!("{} barrier unknown", slot.as_str())),
            }
        }
        let barriers_ok = barrier_notes.is_empty();
        if barriers_ok {
            barrier_notes.push("A and B have good barriers".to_string());
        }

        let market_firmers = [Slot::A, Slot::B]
            .into_iter()
            .filter(|slot| {
                candidates
                    .get(*slot)
                    .as_ref()
                    .is_some_and(|c| c.runner.market_firmer())
            })
            .collect();

        Checklist {
            field_size_ok: field.ok,
            field_size_message: field.message,
            barriers_ok,
            barrier_notes,
            market_firmers,
            track_condition: race.condition(),
        }
    }
}

/// Score every active runner under all rubrics and pick A/B/C.
pub fn analyze_race<'a>(race: &RaceContext, runners: &'a [Runner]) -> RaceAnalysis<'a> {
    RaceAnalyzer::default().analyze(race, runners)
}

/// Independent races analysed in parallel, results in card order.
pub fn analyze_meeting<'a>(analyzer: &RaceAnalyzer, cards: &'a [RaceCard]) -> Vec<RaceAnalysis<'a>> {
    cards
        .par_iter()
        .map(|card| analyzer.analyze(&card.race, &card.runners))
        .collect()
}
