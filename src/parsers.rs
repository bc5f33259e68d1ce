use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::extract::{self, clean_name};
use crate::logbook::Logbook;
use crate::model::{Runner, SpeedMapHint};
use crate::odds::{RawOdds, parse_odds_text, to_decimal};
use crate::segment::runner_blocks;

/// Input shape chosen by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFormat {
    Delimited,
    MultiLine,
    SingleLine,
    Json,
}

impl CardFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            CardFormat::Delimited => "delimited",
            CardFormat::MultiLine => "multi-line",
            CardFormat::SingleLine => "single-line",
            CardFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedCard {
    pub format: Option<CardFormat>,
    pub runners: Vec<Runner>,
    pub log: Logbook,
}

/// Content sniffing. Multi-line copy-paste is recognised by its trainer
/// label lines; otherwise comma plus newline means a delimited table.
pub fn detect_format(text: &str) -> CardFormat {
    if looks_multi_line(text) {
        CardFormat::MultiLine
    } else if text.contains(',') && text.contains('\n') {
        CardFormat::Delimited
    } else {
        CardFormat::SingleLine
    }
}

fn looks_multi_line(text: &str) -> bool {
    text.contains("\nT:")
        || text.contains("T:\n")
        || text.lines().any(|line| line.trim_start().starts_with("T:"))
}

/// Format Router entry point for pasted text.
pub fn parse_card(text: &str) -> Result<ParsedCard, ParseError> {
    let text = normalize_newlines(text);
    let format = detect_format(&text);
    let mut card = match format {
        CardFormat::Delimited => {
            let mut log = Logbook::new();
            let runners = parse_csv_logged(&text, &mut log)?;
            ParsedCard {
                format: Some(CardFormat::Delimited),
                runners,
                log,
            }
        }
        _ => parse_text(&text),
    };
    card.log.info(format!(
        "parsed {} runner(s) as {}",
        card.runners.len(),
        card.format.map(CardFormat::as_str).unwrap_or("unknown")
    ));
    Ok(card)
}

/// Uploaded bytes: `.csv` and `.json` by extension, everything else sniffed.
pub fn parse_upload(bytes: &[u8], filename: &str) -> Result<ParsedCard, ParseError> {
    let content = String::from_utf8(bytes.to_vec())?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let lower = filename.trim().to_ascii_lowercase();

    if lower.ends_with(".csv") {
        let mut log = Logbook::new();
        let runners = parse_csv_logged(&normalize_newlines(content), &mut log)?;
        log.info(format!("parsed {} runner(s) from {filename}", runners.len()));
        return Ok(ParsedCard {
            format: Some(CardFormat::Delimited),
            runners,
            log,
        });
    }
    if lower.ends_with(".json") {
        let runners = parse_runners_json(content)?;
        let mut log = Logbook::new();
        log.info(format!("imported {} runner(s) from {filename}", runners.len()));
        return Ok(ParsedCard {
            format: Some(CardFormat::Json),
            runners,
            log,
        });
    }
    parse_card(content)
}

/// Free-text parsing: multi-line pipeline when the layout is recognised,
/// otherwise one runner per line. Never fails; unreadable input yields an
/// empty runner list.
pub fn parse_text(text: &str) -> ParsedCard {
    let text = normalize_newlines(text);
    let mut log = Logbook::new();

    if looks_multi_line(&text) {
        let runners = parse_multi_line(&text, &mut log);
        if !runners.is_empty() {
            return ParsedCard {
                format: Some(CardFormat::MultiLine),
                runners,
                log,
            };
        }
        log.warn("multi-line layout detected but no runners found; trying single-line");
    }

    let runners = parse_lines(&text, &mut log);
    let format = (!runners.is_empty()).then_some(CardFormat::SingleLine);
    ParsedCard {
        format,
        runners,
        log,
    }
}

/// Block Segmenter + Record Extractor. When that pass finds no priced
/// runner the strict block parser gets a turn, and its records are used if
/// any of them carries odds. Every strict header is also a block start and
/// every strict price also matches the win-marker strategy, so the strict
/// pass never prices a runner the extractor left unpriced; unpriced
/// extractor records are returned as they are.
pub fn parse_multi_line(text: &str, log: &mut Logbook) -> Vec<Runner> {
    let runners: Vec<Runner> = runner_blocks(text)
        .filter_map(|block| extract::extract_block_logged(block, log))
        .collect();
    if runners.iter().any(|r| r.odds_decimal.is_some()) {
        log.info(format!("block extractor found {} runner(s)", runners.len()));
        return runners;
    }

    let strict = parse_strict_blocks(text);
    if strict.iter().any(|r| r.odds_decimal.is_some()) {
        log.info(format!("strict block parser found {} runner(s)", strict.len()));
        return strict;
    }
    if !runners.is_empty() {
        log.warn(format!("block extractor found {} runner(s), none priced", runners.len()));
    }
    runners
}

/// One runner per non-blank line.
pub fn parse_lines(text: &str, log: &mut Logbook) -> Vec<Runner> {
    let mut runners = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match extract::extract_line_logged(line, log) {
            Some(runner) => runners.push(runner),
            None => log.warn(format!("line {}: no runner name", idx + 1)),
        }
    }
    runners
}

// ---------------------------------------------------------------------------
// Strict multi-line layout
// ---------------------------------------------------------------------------

static STRICT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.+?)\s*\((\d+)\)\s*$").expect("strict header"));
static STRICT_TRAINER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"T:\s*([\w\s,&.]+?)(?:\s+J:|\n)").expect("strict trainer"));
static STRICT_JOCKEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"J:\s*([\w.]+)").expect("strict jockey"));
static STRICT_WIN_DOLLAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"W\s*\$\s*([\d.]+)").expect("strict win dollar"));
static STRICT_WIN_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"W\s+([\d.]+)").expect("strict win bare"));
static STRICT_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\d+)(?:\s+\d+:|\s+[\d:]+)").expect("strict form"));

/// Exact `"N. Name (barrier)"` layout. Blocks whose header lacks a barrier
/// are skipped.
pub fn parse_strict_blocks(text: &str) -> Vec<Runner> {
    runner_blocks(text).filter_map(parse_strict_block).collect()
}

fn parse_strict_block(block: &str) -> Option<Runner> {
    let header = block.lines().next()?.trim();
    let caps = STRICT_HEADER.captures(header)?;
    let name = clean_name(caps.get(2)?.as_str())?;
    let barrier = caps.get(3)?.as_str().parse::<u32>().ok().filter(|b| *b > 0);

    let mut runner = Runner::new(name);
    runner.barrier = barrier;
    runner.trainer = STRICT_TRAINER
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    runner.jockey = STRICT_JOCKEY
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    runner.odds_decimal = STRICT_WIN_DOLLAR
        .captures(block)
        .or_else(|| STRICT_WIN_BARE.captures(block))
        .and_then(|c| parse_odds_text(c.get(1)?.as_str()));
    runner.last3_form = if block.contains("First Start") {
        "First Start".to_string()
    } else {
        STRICT_FORM
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };
    runner.speed_map_hint = if block.contains("FAVOURITE") {
        SpeedMapHint::Leaders
    } else if block.contains("MOVER") {
        SpeedMapHint::OnPace
    } else {
        SpeedMapHint::Unknown
    };
    Some(runner)
}

// ---------------------------------------------------------------------------
// Delimited table
// ---------------------------------------------------------------------------

const CSV_COLUMNS: &[&str] = &[
    "name",
    "barrier",
    "odds",
    "last3_form",
    "jockey",
    "trainer",
    "speed_map_hint",
    "track_pref",
    "distance_pref",
    "market_open_odds",
    "market_current_odds",
    "is_scratched",
];

pub fn parse_csv(text: &str) -> Result<Vec<Runner>, ParseError> {
    parse_csv_logged(text, &mut Logbook::new())
}

/// Column-mapped parse by header name. Unreadable numeric cells become
/// `None`; a row that breaks the table shape is a hard error.
pub fn parse_csv_logged(text: &str, log: &mut Logbook) -> Result<Vec<Runner>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|err| ParseError::MalformedRow {
            row: 1,
            reason: err.to_string(),
        })?
        .clone();
    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect();
    if !index.contains_key("name") {
        return Err(ParseError::MissingColumn("name"));
    }
    for h in index.keys() {
        if !CSV_COLUMNS.contains(&h.as_str()) && h != "odds_decimal" {
            log.warn(format!("ignoring unknown csv column `{h}`"));
        }
    }

    let mut runners = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // header is row 1
        let row = i + 2;
        let record = record.map_err(|err| ParseError::MalformedRow {
            row,
            reason: err.to_string(),
        })?;
        let field = |key: &str| cell(&record, &index, key);

        let name = field("name");
        if name.is_empty() {
            log.warn(format!("csv row {row}: empty name, skipped"));
            continue;
        }

        let odds_cell = if field("odds").is_empty() {
            field("odds_decimal")
        } else {
            field("odds")
        };
        let runner = Runner {
            name: name.to_string(),
            barrier: field("barrier").parse::<u32>().ok().filter(|b| *b > 0),
            odds_decimal: parse_odds_text(odds_cell),
            last3_form: field("last3_form").to_string(),
            jockey: field("jockey").to_string(),
            trainer: field("trainer").to_string(),
            speed_map_hint: SpeedMapHint::parse(field("speed_map_hint")),
            track_pref: field("track_pref").to_string(),
            distance_pref: field("distance_pref").to_string(),
            market_open_odds: parse_odds_text(field("market_open_odds")),
            market_current_odds: parse_odds_text(field("market_current_odds")),
            is_scratched: parse_flag(field("is_scratched")),
        };
        if runner.odds_decimal.is_none() && !odds_cell.is_empty() {
            log.warn(format!("csv row {row}: unreadable odds {odds_cell:?}"));
        }
        runners.push(runner);
    }
    Ok(runners)
}

fn cell<'r>(record: &'r StringRecord, index: &HashMap<String, usize>, key: &str) -> &'r str {
    index
        .get(key)
        .and_then(|i| record.get(*i))
        .map(str::trim)
        .unwrap_or("")
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "scratched"
    )
}

// ---------------------------------------------------------------------------
// Structured runner import
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunnerRecord {
    name: String,
    barrier: Option<u32>,
    odds: Option<RawOdds>,
    odds_decimal: Option<RawOdds>,
    last3_form: Option<String>,
    jockey: Option<String>,
    trainer: Option<String>,
    speed_map_hint: Option<String>,
    track_pref: Option<String>,
    distance_pref: Option<String>,
    market_open_odds: Option<RawOdds>,
    market_current_odds: Option<RawOdds>,
    is_scratched: bool,
}

/// Import already-structured runner dicts (e.g. an odds provider payload).
/// `null` is an empty card; entries without a name are dropped.
pub fn parse_runners_json(raw: &str) -> Result<Vec<Runner>, ParseError> {
    let records: Option<Vec<RunnerRecord>> = serde_json::from_str(raw)?;
    Ok(records
        .unwrap_or_default()
        .into_iter()
        .filter(|r| !r.name.trim().is_empty())
        .map(|r| Runner {
            name: r.name.trim().to_string(),
            barrier: r.barrier.filter(|b| *b > 0),
            odds_decimal: to_decimal(r.odds_decimal.as_ref())
                .or_else(|| to_decimal(r.odds.as_ref())),
            last3_form: r.last3_form.unwrap_or_default(),
            jockey: r.jockey.unwrap_or_default(),
            trainer: r.trainer.unwrap_or_default(),
            speed_map_hint: SpeedMapHint::parse(r.speed_map_hint.as_deref().unwrap_or("")),
            track_pref: r.track_pref.unwrap_or_default(),
            distance_pref: r.distance_pref.unwrap_or_default(),
            market_open_odds: to_decimal(r.market_open_odds.as_ref()),
            market_current_odds: to_decimal(r.market_current_odds.as_ref()),
            is_scratched: r.is_scratched,
        })
        .collect())
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::{
        CardFormat, detect_format, parse_card, parse_csv, parse_multi_line, parse_strict_blocks,
        parse_text,
    };
    use crate::error::ParseError;
    use crate::logbook::Logbook;

    #[test]
    fn sniffing_order() {
        assert_eq!(
            detect_format("1. A (1)\nT: X, Y\n  J: Z\n"),
            CardFormat::MultiLine
        );
        assert_eq!(detect_format("name,odds\nA,3.5\n"), CardFormat::Delimited);
        assert_eq!(detect_format("1. A (1) $3.50"), CardFormat::SingleLine);
        assert_eq!(
            detect_format("1. A (1)\nT:\nC.Waller, J.Bott\n114\n"),
            CardFormat::MultiLine
        );
    }

    #[test]
    fn trainer_partnership_without_jockeys_is_multi_line() {
        let text = "1. Alpha (2)\nT:\nC.Waller, J.Bott\n114\nW\n$3.20\n\n\
                    2. Beta (5)\nT:\nC.Maher\n21x\nW\n$6.50\n";
        let card = parse_card(text).expect("multi-line text never fails");
        assert_eq!(card.format, Some(CardFormat::MultiLine));
        let names: Vec<&str> = card.runners.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(card.runners[0].trainer, "C.Waller, J.Bott");
        assert_eq!(card.runners[0].odds_decimal, Some(3.2));
        assert_eq!(card.runners[1].odds_decimal, Some(6.5));
    }

    #[test]
    fn unpriced_blocks_survive_the_strict_pass() {
        let mut log = Logbook::new();
        let runners = parse_multi_line("1. Alpha (4)\nT: J Smith\n21\n", &mut log);
        assert_eq!(runners.len(), 1);
        assert_eq!(runners[0].name, "Alpha");
        assert_eq!(runners[0].odds_decimal, None);
        assert!(log.has_warnings());
    }

    #[test]
    fn strict_records_are_a_subset_of_block_records() {
        for text in [
            "1. Alpha (NZ) (4)\nT: J Smith\nJ: B.Rawiller\n21 3:10\nW $4.40\n",
            "2. Beta (11)\nW 7.00\n",
            "3. Gamma\nW $3.00\n",
            "4. Delta (2)\nno price\n",
        ] {
            let strict = parse_strict_blocks(text);
            let blocks = parse_multi_line(text, &mut Logbook::new());
            for r in &strict {
                let found = blocks.iter().find(|b| b.name == r.name).expect("same runner");
                if r.odds_decimal.is_some() {
                    assert_eq!(found.odds_decimal, r.odds_decimal, "{text:?}");
                }
            }
        }
    }

    #[test]
    fn strict_parser_requires_barrier() {
        let text = "1. Alpha (NZ) (4)\nT: J Smith\nJ: B.Rawiller\n21 3:10\nW $4.40\n\n2. Beta\nW $6.00\n";
        let runners = parse_strict_blocks(text);
        assert_eq!(runners.len(), 1);
        assert_eq!(runners[0].name, "Alpha");
        assert_eq!(runners[0].barrier, Some(4));
        assert_eq!(runners[0].trainer, "J Smith");
        assert_eq!(runners[0].jockey, "B.Rawiller");
        assert_eq!(runners[0].odds_decimal, Some(4.4));
        assert_eq!(runners[0].last3_form, "21");
    }

    #[test]
    fn line_mode_skips_lines_without_names() {
        let card = parse_text("Race 3 Flemington\n1. Alpha (2) $3.20 114\n\n2. Beta (7) $6.50 x21\n");
        assert_eq!(card.format, Some(CardFormat::SingleLine));
        assert_eq!(card.runners.len(), 2);
        assert!(card.log.has_warnings());
    }

    #[test]
    fn nothing_recognisable_is_empty_not_error() {
        let card = parse_text("the quick brown fox");
        assert!(card.runners.is_empty());
        assert_eq!(card.format, None);
    }
}
