//! Field extraction for a single runner.
//!
//! Every field is read by an ordered table of strategies; the first strategy
//! that yields a value wins. The tables are public so the priority order is
//! visible and testable on its own.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::logbook::Logbook;
use crate::model::{Runner, SpeedMapHint};
use crate::odds::parse_odds_text;

/// One way of reading one field out of raw text.
pub struct FieldStrategy<T> {
    pub name: &'static str,
    pub extract: fn(&str) -> Option<T>,
}

/// Run strategies in order and report which one matched.
pub fn first_success<T>(strategies: &[FieldStrategy<T>], text: &str) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|s| (s.extract)(text).map(|v| (s.name, v)))
}

static NAME_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").expect("name line"));
static SINGLE_LINE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\.\s*([^\s\d($][^($\n]*)").expect("single line name"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("word"));
static LABEL_CUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s[JTW]:").expect("label cut"));
static BARRIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{1,2})\)").expect("barrier"));
static LINE_BARRIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(B?(\d{1,2})\)").expect("line barrier"));
static COUNTRY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([A-Z]{2,3}\)\s*").expect("country code"));
static BARRIER_PARENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\d{1,2}\)\s*").expect("barrier parens"));

static WIN_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bW(?:IN)?\s*\$?\s*(\d+(?:\.\d+)?)").expect("win marker"));
static PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+(?:\.\d+)?)").expect("price"));
static FRACTION_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}/\d{1,3}$").expect("fraction word"));
static DECIMAL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(\d{1,3}\.\d{2})(?:\s|$)").expect("decimal token"));

static JOCKEY_COLON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bJ:\s*([A-Z][A-Za-z.']+(?:[ \t]+[A-Z][A-Za-z.']+)?)").expect("jockey colon")
});
static JOCKEY_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bJ[ \t]+([A-Z][A-Za-z.']+(?:[ \t]+[A-Z][A-Za-z.']+)?)").expect("jockey bare")
});

static TRAINER_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bT:").expect("trainer colon"));
static TRAINER_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bT\s").expect("trainer bare"));
static TRAINER_LABEL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*T:[ \t\r]*$").expect("trainer label line"));
static TRAINER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bT:\s*(\S+)").expect("trainer token"));

static FORM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*([0-9xX-]{3,10})(?:[ \t]+\d+:|[ \t\r]*$)").expect("form line")
});
static FORM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9xX-]{3,10}").expect("form run"));
static DATE_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{1,2}[./]\d|\d{4}-\d{1,2}-\d{1,2})").expect("date like"));

const FIRST_START: &str = "First Start";
const KEYWORD_WINDOW_CHARS: usize = 100;
const MIN_PLAUSIBLE_ODDS: f64 = 1.0;
const MAX_PLAUSIBLE_ODDS: f64 = 999.0;

// ---------------------------------------------------------------------------
// Strategy tables
// ---------------------------------------------------------------------------

/// Win odds inside a multi-line block.
pub static BLOCK_ODDS: &[FieldStrategy<f64>] = &[
    FieldStrategy {
        name: "win_marker",
        extract: win_marker_odds,
    },
    FieldStrategy {
        name: "keyword_context",
        extract: keyword_context_odds,
    },
    FieldStrategy {
        name: "first_plausible_price",
        extract: first_plausible_price,
    },
];

/// Win odds on a one-runner-per-line card.
pub static LINE_ODDS: &[FieldStrategy<f64>] = &[
    FieldStrategy {
        name: "win_marker",
        extract: win_marker_odds,
    },
    FieldStrategy {
        name: "first_plausible_price",
        extract: first_plausible_price,
    },
    FieldStrategy {
        name: "fraction_token",
        extract: fraction_token_odds,
    },
    FieldStrategy {
        name: "decimal_token",
        extract: decimal_token_odds,
    },
];

pub static JOCKEY: &[FieldStrategy<String>] = &[
    FieldStrategy {
        name: "colon_label",
        extract: jockey_after_colon,
    },
    FieldStrategy {
        name: "bare_label",
        extract: jockey_after_bare_label,
    },
];

pub static BLOCK_TRAINER: &[FieldStrategy<String>] = &[
    FieldStrategy {
        name: "colon_label_run",
        extract: trainer_after_colon,
    },
    FieldStrategy {
        name: "label_line",
        extract: trainer_on_next_line,
    },
    FieldStrategy {
        name: "bare_label_run",
        extract: trainer_after_bare_label,
    },
];

pub static LINE_TRAINER: &[FieldStrategy<String>] = &[
    FieldStrategy {
        name: "colon_label_run",
        extract: trainer_after_colon,
    },
    FieldStrategy {
        name: "single_token",
        extract: trainer_token,
    },
];

pub static BLOCK_FORM: &[FieldStrategy<String>] = &[
    FieldStrategy {
        name: "first_start",
        extract: first_start_form,
    },
    FieldStrategy {
        name: "form_line",
        extract: form_line,
    },
    FieldStrategy {
        name: "form_token",
        extract: form_token,
    },
];

pub static LINE_FORM: &[FieldStrategy<String>] = &[
    FieldStrategy {
        name: "first_start",
        extract: first_start_form,
    },
    FieldStrategy {
        name: "form_token",
        extract: form_token,
    },
];

/// Speed-map keywords, checked in order against the upper-cased text.
pub static SPEED_HINT_RULES: &[(&str, SpeedMapHint)] = &[
    ("FAVOURITE", SpeedMapHint::Leaders),
    ("MOVER", SpeedMapHint::OnPace),
    ("LEADER", SpeedMapHint::Leaders),
    ("CLOSER", SpeedMapHint::Back),
    ("BACKMARKER", SpeedMapHint::Back),
];

// ---------------------------------------------------------------------------
// Record extraction
// ---------------------------------------------------------------------------

/// Extract one runner from a multi-line block. `None` when no usable name.
pub fn extract_block(block: &str) -> Option<Runner> {
    extract_block_logged(block, &mut Logbook::new())
}

pub fn extract_block_logged(block: &str, log: &mut Logbook) -> Option<Runner> {
    let first_line = block.lines().next().unwrap_or("").trim();
    let caps = NAME_LINE.captures(first_line)?;
    let raw_name = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

    let Some(name) = clean_name(raw_name) else {
        log.warn(format!("skipped block with unusable name: {first_line:?}"));
        return None;
    };

    let mut runner = Runner::new(name);
    runner.barrier = last_barrier(&BARRIER, raw_name);
    fill_fields(&mut runner, block, BLOCK_ODDS, BLOCK_TRAINER, BLOCK_FORM, log);
    Some(runner)
}

/// Extract one runner from a single card line such as
/// `"5. Fast Hoof (4) $6.50 J:Smith T:Brown 12x3"`.
pub fn extract_line(line: &str) -> Option<Runner> {
    extract_line_logged(line, &mut Logbook::new())
}

pub fn extract_line_logged(line: &str, log: &mut Logbook) -> Option<Runner> {
    let caps = SINGLE_LINE_NAME.captures(line)?;
    let raw = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let raw = match LABEL_CUT.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };
    let raw = match WORD.find_iter(raw).find(|w| ends_name(w.as_str())) {
        Some(w) => &raw[..w.start()],
        None => raw,
    };
    let name = clean_name(raw)?;

    let mut runner = Runner::new(name);
    runner.barrier = last_barrier(&LINE_BARRIER, line);
    fill_fields(&mut runner, line, LINE_ODDS, LINE_TRAINER, LINE_FORM, log);
    Some(runner)
}

/// A bare price, fraction or form run cannot be part of a runner name.
fn ends_name(word: &str) -> bool {
    let digits = word.chars().any(|c| c.is_ascii_digit());
    let price = word.contains(['.', '/'])
        && word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '/');
    let form = word.len() >= 3 && word.chars().all(|c| matches!(c, '0'..='9' | 'x' | 'X' | '-'));
    digits && (price || form)
}

fn fill_fields(
    runner: &mut Runner,
    text: &str,
    odds: &[FieldStrategy<f64>],
    trainer: &[FieldStrategy<String>],
    form: &[FieldStrategy<String>],
    log: &mut Logbook,
) {
    match first_success(odds, text) {
        Some((_, v)) => runner.odds_decimal = Some(v),
        None => log.warn(format!("{}: no odds found", runner.name)),
    }
    if let Some((_, v)) = first_success(JOCKEY, text) {
        runner.jockey = v;
    }
    if let Some((_, v)) = first_success(trainer, text) {
        runner.trainer = v;
    }
    match first_success(form, text) {
        Some((_, v)) => runner.last3_form = v,
        None => log.warn(format!("{}: no form found", runner.name)),
    }
    runner.speed_map_hint = speed_hint(text);
}

/// Strip barrier and country-code parens and collapse whitespace. Rejects
/// segmentation artefacts (one character, purely numeric).
pub fn clean_name(raw: &str) -> Option<String> {
    let cleaned = COUNTRY_CODE.replace_all(raw, " ");
    let cleaned = BARRIER_PARENS.replace_all(&cleaned, " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() < 2 || cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(cleaned)
}

fn last_barrier(pattern: &Regex, text: &str) -> Option<u32> {
    pattern
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .filter(|b| *b > 0)
        .last()
}

pub fn speed_hint(text: &str) -> SpeedMapHint {
    let upper = text.to_ascii_uppercase();
    SPEED_HINT_RULES
        .iter()
        .find(|(kw, _)| upper.contains(kw))
        .map(|(_, hint)| *hint)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Odds strategies
// ---------------------------------------------------------------------------

fn win_marker_odds(text: &str) -> Option<f64> {
    let caps = WIN_MARKER.captures(text)?;
    parse_odds_text(caps.get(1)?.as_str())
}

fn keyword_context_odds(text: &str) -> Option<f64> {
    let upper = text.to_ascii_uppercase();
    let pos = upper.find("FAVOURITE").or_else(|| upper.find("MOVER"))?;
    let context = &text[pos..];
    let end = context
        .char_indices()
        .nth(KEYWORD_WINDOW_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(context.len());
    let caps = PRICE.captures(&context[..end])?;
    parse_odds_text(caps.get(1)?.as_str())
}

fn first_plausible_price(text: &str) -> Option<f64> {
    PRICE
        .captures_iter(text)
        .filter_map(|c| parse_odds_text(c.get(1)?.as_str()))
        .find(|v| (MIN_PLAUSIBLE_ODDS..=MAX_PLAUSIBLE_ODDS).contains(v))
}

fn fraction_token_odds(text: &str) -> Option<f64> {
    text.split_whitespace()
        .filter(|w| FRACTION_WORD.is_match(w) && !date_like_fraction(w))
        .find_map(parse_odds_text)
}

/// `12/03` or `03/12`: prices are never written with a zero-padded side.
fn date_like_fraction(token: &str) -> bool {
    token
        .split('/')
        .any(|side| side.len() > 1 && side.starts_with('0'))
}

fn decimal_token_odds(text: &str) -> Option<f64> {
    DECIMAL_TOKEN
        .captures_iter(text)
        .filter_map(|c| parse_odds_text(c.get(1)?.as_str()))
        .find(|v| (MIN_PLAUSIBLE_ODDS..=MAX_PLAUSIBLE_ODDS).contains(v))
}

// ---------------------------------------------------------------------------
// Jockey / trainer strategies
// ---------------------------------------------------------------------------

fn jockey_after_colon(text: &str) -> Option<String> {
    capture_trimmed(&JOCKEY_COLON, text)
}

fn jockey_after_bare_label(text: &str) -> Option<String> {
    capture_trimmed(&JOCKEY_BARE, text)
}

fn capture_trimmed(pattern: &Regex, text: &str) -> Option<String> {
    let caps = pattern.captures(text)?;
    let value = caps.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn trainer_after_colon(text: &str) -> Option<String> {
    TRAINER_COLON
        .find_iter(text)
        .find_map(|m| trainer_run(text, m.end()))
}

fn trainer_after_bare_label(text: &str) -> Option<String> {
    TRAINER_BARE
        .find_iter(text)
        .find_map(|m| trainer_run(text, m.start() + 1))
}

/// `T:` alone on its line, the trainer on the next non-blank line.
fn trainer_on_next_line(text: &str) -> Option<String> {
    let m = TRAINER_LABEL_LINE.find(text)?;
    let line = text[m.end()..]
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())?;
    let line = line.trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    if line.starts_with("J:") || !line.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    Some(line.to_string())
}

fn trainer_token(text: &str) -> Option<String> {
    capture_trimmed(&TRAINER_TOKEN, text)
}

fn is_trainer_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '.' | ',' | '&' | '\'')
}

/// Shortest run of name characters after a trainer label that is followed by
/// a terminator: the next `J:` label, end of text, a newline then a digit, or
/// a newline then another single-letter label.
fn trainer_run(text: &str, label_end: usize) -> Option<String> {
    let rest = &text[label_end..];
    let body = rest.trim_start();
    if !body.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let run_len = body
        .char_indices()
        .find(|&(_, c)| !is_trainer_char(c))
        .map(|(i, _)| i)
        .unwrap_or(body.len());

    // all trainer chars are ASCII or whitespace; stay on char boundaries anyway
    (1..=run_len)
        .filter(|&end| body.is_char_boundary(end))
        .find(|&end| trainer_terminates(&body[end..]))
        .map(|end| {
            body[..end]
                .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
                .to_string()
        })
        .filter(|name| !name.is_empty())
}

fn trainer_terminates(tail: &str) -> bool {
    if tail.trim().is_empty() {
        return true;
    }
    let trimmed = tail.trim_start();
    if trimmed.len() < tail.len() && trimmed.starts_with("J:") {
        return true;
    }
    let Some(after) = tail.strip_prefix('\n') else {
        return false;
    };
    let mut chars = after.chars();
    match (chars.next(), chars.next()) {
        (Some(d), _) if d.is_ascii_digit() => true,
        (Some(l), Some(':')) => l.is_ascii_uppercase(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Form strategies
// ---------------------------------------------------------------------------

fn first_start_form(text: &str) -> Option<String> {
    text.contains(FIRST_START).then(|| FIRST_START.to_string())
}

fn form_line(text: &str) -> Option<String> {
    FORM_LINE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find(|m| !DATE_LIKE.is_match(&text[m.start()..]))
        .map(|m| m.as_str().to_string())
}

/// First free-standing run of form characters that is not part of a price,
/// date, barrier or measurement.
fn form_token(text: &str) -> Option<String> {
    FORM_RUN
        .find_iter(text)
        .find(|m| {
            let before = text[..m.start()].chars().next_back();
            let mut after = text[m.end()..].chars();
            let next = after.next();
            let next_next = after.next();

            let bad_before = before.is_some_and(|c| {
                c.is_alphanumeric() || matches!(c, '$' | '.' | '/' | ':' | '(')
            });
            let bad_after = match next {
                Some(c) if c.is_alphanumeric() || c == ':' || c == ')' => true,
                Some('.') | Some('/') => next_next.is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            !bad_before && !bad_after && !DATE_LIKE.is_match(&text[m.start()..])
        })
        .map(|m| m.as_str().to_string())
}
