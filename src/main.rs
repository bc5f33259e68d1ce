use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use racecard_abc::analyzer::{RaceAnalysis, RaceAnalyzer, ScoredCandidate, analyze_meeting};
use racecard_abc::config::EngineConfig;
use racecard_abc::fake_card::generate_card;
use racecard_abc::logbook::Logbook;
use racecard_abc::model::{RaceCard, RaceContext, Runner, Slot};
use racecard_abc::odds::format_odds;
use racecard_abc::parsers::{parse_card, parse_upload};
use racecard_abc::stakes::{
    DividendReport, ReturnEstimate, StakeReport, StrategyOptions, apply_strategy,
    estimate_dividends_from_odds, estimate_returns,
};

const DEMO_RUNNERS: usize = 10;

#[derive(Debug, Default)]
struct Args {
    demo: bool,
    files: Vec<PathBuf>,
    strategy: String,
    budget: Option<f64>,
    track: String,
    distance_m: Option<u32>,
    condition: String,
    date: Option<NaiveDate>,
    json: bool,
    quiet: bool,
}

fn parse_args() -> Result<Args> {
    let raw = std::env::args().skip(1).collect::<Vec<_>>();
    let mut args = Args {
        strategy: "budget_6".to_string(),
        ..Args::default()
    };
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };
        let mut value = |name: &str| -> Result<String> {
            inline
                .clone()
                .or_else(|| iter.next().cloned())
                .with_context(|| format!("{name} needs a value"))
        };
        match flag {
            "--demo" => args.demo = true,
            "--json" => args.json = true,
            "--quiet" => args.quiet = true,
            "--strategy" => args.strategy = value("--strategy")?,
            "--budget" => {
                let raw = value("--budget")?;
                let budget = raw
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("bad budget {raw:?}"))?;
                args.budget = Some(budget);
            }
            "--track" => args.track = value("--track")?,
            "--distance" => {
                let raw = value("--distance")?;
                let distance = raw
                    .trim()
                    .trim_end_matches('m')
                    .parse::<u32>()
                    .with_context(|| format!("bad distance {raw:?}"))?;
                args.distance_m = Some(distance);
            }
            "--condition" => args.condition = value("--condition")?,
            "--date" => {
                let raw = value("--date")?;
                args.date = Some(
                    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                        .with_context(|| format!("bad date {raw:?}, expected YYYY-MM-DD"))?,
                );
            }
            other if other.starts_with("--") => bail!("unknown option {other}"),
            path => args.files.push(PathBuf::from(path)),
        }
    }
    if !args.demo && args.files.is_empty() {
        bail!(
            "usage: racecard_abc [--demo | FILE...] [--strategy S] [--budget X] [--track T] \
             [--distance M] [--condition C] [--date YYYY-MM-DD] [--json] [--quiet]"
        );
    }
    Ok(args)
}

struct LoadedCard {
    card: RaceCard,
    log: Logbook,
}

fn race_context(args: &Args, meeting: &str, race_number: usize) -> RaceContext {
    RaceContext {
        meeting: meeting.to_string(),
        track: args.track.clone(),
        date: args.date,
        race_number: u32::try_from(race_number).ok(),
        distance_m: args.distance_m,
        track_condition: args.condition.clone(),
        num_runners: None,
    }
}

fn load_card(path: &Path, race: RaceContext) -> Result<LoadedCard> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parsed =
        parse_upload(&bytes, &filename).with_context(|| format!("parse {}", path.display()))?;
    Ok(finish_card(race, parsed.runners, parsed.log))
}

fn finish_card(mut race: RaceContext, runners: Vec<Runner>, log: Logbook) -> LoadedCard {
    race.num_runners = Some(runners.iter().filter(|r| !r.is_scratched).count());
    LoadedCard {
        card: RaceCard { race, runners },
        log,
    }
}

#[derive(Serialize)]
struct RaceReport<'a> {
    race: &'a RaceContext,
    analysis: &'a RaceAnalysis<'a>,
    stakes: StakeReport,
    tab_instructions: Option<String>,
    dividends: DividendReport,
    returns: Option<ReturnEstimate>,
}

fn build_report<'a>(
    card: &'a RaceCard,
    analysis: &'a RaceAnalysis<'a>,
    args: &Args,
    config: &EngineConfig,
) -> RaceReport<'a> {
    let plan = apply_strategy(
        &args.strategy,
        &analysis.selection_names(),
        args.budget,
        &StrategyOptions::from_config(config),
    );
    let tab_instructions = plan.as_ref().ok().map(|p| p.tab_instructions());

    let odds = analysis
        .candidates
        .map(|c| c.as_ref().and_then(|c| c.runner.odds_decimal));
    let dividends = estimate_dividends_from_odds(odds.a, odds.b, odds.c, config.takeout);
    let returns = match (&plan, &dividends) {
        (Ok(plan), Ok(d)) => Some(estimate_returns(&plan.bets, d)),
        _ => None,
    };

    RaceReport {
        race: &card.race,
        analysis,
        stakes: StakeReport::from(plan),
        tab_instructions,
        dividends: DividendReport::from(dividends),
        returns,
    }
}

fn describe(candidate: &ScoredCandidate<'_>) -> String {
    format!(
        "{} ({}, barrier {}) score {}: {}",
        candidate.name(),
        format_odds(candidate.runner.odds_decimal),
        candidate
            .runner
            .barrier
            .map(|b| b.to_string())
            .unwrap_or_else(|| "?".to_string()),
        candidate.score,
        candidate.rationale.join("; ")
    )
}

fn print_report(report: &RaceReport<'_>) {
    let analysis = report.analysis;
    println!("== {} ==", report.race.label());
    for slot in Slot::ALL {
        match analysis.candidates.get(slot) {
            Some(c) => println!("{}: {}", slot.as_str(), describe(c)),
            None => println!("{}: no qualifier", slot.as_str()),
        }
        let alternates = analysis.alternates.get(slot);
        if !alternates.is_empty() {
            let names = alternates.iter().map(|c| c.name()).collect::<Vec<_>>();
            println!("   alternates: {}", names.join(", "));
        }
    }

    let checklist = &analysis.checklist;
    println!("Field: {}", checklist.field_size_message);
    println!("Barriers: {}", checklist.barrier_notes.join("; "));
    if !checklist.market_firmers.is_empty() {
        let slots = checklist.market_firmers.iter().map(|s| s.as_str()).collect::<Vec<_>>();
        println!("Market firmers: {}", slots.join(", "));
    }
    println!("Track: {}", checklist.track_condition.as_str());
    println!();

    match &report.stakes.error {
        Some(err) => println!("Stake plan unavailable: {err}"),
        None => {
            for bet in &report.stakes.bets {
                print!("{}: {} combos, stake ${:.2}", bet.bet_type, bet.num_combos, bet.stake);
                if bet.flexi_pct < 1.0 {
                    print!(" (flexi {:.1}%)", bet.flexi_pct * 100.0);
                }
                println!();
            }
            println!("Total stake: ${:.2}", report.stakes.total_stake);
        }
    }
    if let Some(tab) = &report.tab_instructions {
        println!("TAB: {tab}");
    }
    match &report.dividends.error {
        Some(err) => println!("Dividends: {err}"),
        None => println!(
            "Est. dividends: trifecta ${:.2}, quinella ${:.2}",
            report.dividends.trifecta, report.dividends.quinella
        ),
    }
    if let Some(r) = &report.returns {
        println!(
            "Est. returns: trifecta ${:.2}, quinella ${:.2}, total ${:.2}",
            r.trifecta_return, r.quinella_return, r.total_return
        );
    }
    println!();
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = EngineConfig::from_env();
    let args = parse_args()?;
    let print_log = config.log_enabled && !args.quiet;

    let mut loaded = Vec::new();
    if args.demo {
        let text = generate_card(&mut rand::thread_rng(), DEMO_RUNNERS);
        let parsed = parse_card(&text).context("parse demo card")?;
        loaded.push(finish_card(race_context(&args, "Demo", 1), parsed.runners, parsed.log));
    }
    let from_files = args
        .files
        .par_iter()
        .enumerate()
        .map(|(idx, path)| {
            let meeting = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            load_card(path, race_context(&args, &meeting, idx + 1))
        })
        .collect::<Vec<_>>();
    for result in from_files {
        loaded.push(result?);
    }

    if print_log {
        for card in &loaded {
            for line in card.log.lines() {
                eprintln!("{line}");
            }
        }
    }

    let cards = loaded.into_iter().map(|l| l.card).collect::<Vec<_>>();
    let analyzer = RaceAnalyzer::from_config(&config);
    let analyses = analyze_meeting(&analyzer, &cards);

    let reports = cards
        .iter()
        .zip(&analyses)
        .map(|(card, analysis)| build_report(card, analysis, &args, &config))
        .collect::<Vec<_>>();

    if print_log {
        for analysis in &analyses {
            for line in analysis.log.lines() {
                eprintln!("{line}");
            }
        }
    }

    if args.json {
        let out = serde_json::to_string_pretty(&reports).context("serialize reports")?;
        println!("{out}");
    } else {
        for report in &reports {
            print_report(report);
        }
    }
    Ok(())
}
