use std::fs;
use std::path::PathBuf;

use racecard_abc::error::ParseError;
use racecard_abc::model::SpeedMapHint;
use racecard_abc::parsers::{CardFormat, parse_card, parse_runners_json, parse_upload};
use racecard_abc::segment::runner_blocks;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

#[test]
fn multi_line_card_fixture() {
    let raw = read_fixture("racing_card.txt");
    assert_eq!(runner_blocks(&raw).count(), 4);

    let card = parse_card(&raw).expect("free text never fails");
    assert_eq!(card.format, Some(CardFormat::MultiLine));
    let names: Vec<&str> = card.runners.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Liberami", "Sabaj", "Lindermann", "Tiger Moth"]);

    let liberami = &card.runners[0];
    assert_eq!(liberami.barrier, Some(6));
    assert_eq!(liberami.odds_decimal, Some(9.5));
    assert_eq!(liberami.jockey, "L.Nolen");
    assert_eq!(liberami.trainer, "R.D.Griffiths");
    assert!(liberami.last3_form.contains("2-843"));

    let sabaj = &card.runners[1];
    assert_eq!(sabaj.barrier, Some(13));
    assert_eq!(sabaj.odds_decimal, Some(2.7));
    assert_eq!(sabaj.speed_map_hint, SpeedMapHint::Leaders);

    assert_eq!(card.runners[2].speed_map_hint, SpeedMapHint::OnPace);
    assert_eq!(card.runners[2].trainer, "C.J.Waller");
    assert_eq!(card.runners[3].barrier, Some(2));
    assert_eq!(card.runners[3].last3_form, "First Start");
}

#[test]
fn crlf_card_parses_the_same() {
    let raw = read_fixture("racing_card.txt");
    let crlf = raw.replace('\n', "\r\n");
    let unix = parse_card(&raw).unwrap();
    let windows = parse_card(&crlf).unwrap();
    assert_eq!(unix.runners, windows.runners);
}

#[test]
fn csv_fixture_by_upload() {
    let bytes = fs::read(fixture_path("runners.csv")).unwrap();
    let card = parse_upload(&bytes, "runners.csv").expect("csv fixture should parse");
    assert_eq!(card.format, Some(CardFormat::Delimited));
    assert_eq!(card.runners.len(), 5);

    let anchor = &card.runners[0];
    assert_eq!(anchor.odds_decimal, Some(3.2));
    assert_eq!(anchor.speed_map_hint, SpeedMapHint::OnPace);
    assert!(anchor.market_firmer());

    assert_eq!(card.runners[2].odds_decimal, Some(12.0));
    assert!(card.runners[3].is_scratched);
    assert!(!card.runners[1].is_scratched);

    let mystery = &card.runners[4];
    assert_eq!(mystery.barrier, None);
    assert_eq!(mystery.odds_decimal, None);
    assert!(card.log.has_warnings());
}

#[test]
fn csv_sniffed_without_filename() {
    let raw = read_fixture("runners.csv");
    let card = parse_card(&raw).unwrap();
    assert_eq!(card.format, Some(CardFormat::Delimited));
    assert_eq!(card.runners.len(), 5);
}

#[test]
fn json_runner_import() {
    let raw = read_fixture("runners.json");
    let runners = parse_runners_json(&raw).expect("json fixture should parse");
    assert_eq!(runners.len(), 4);
    assert_eq!(runners[1].odds_decimal, Some(6.5));
    assert_eq!(runners[2].odds_decimal, Some(12.0));
    assert_eq!(runners[3].name, "No Price");
    assert_eq!(runners[3].odds_decimal, None);

    assert!(parse_runners_json("null").unwrap().is_empty());
    assert!(matches!(parse_runners_json("{oops"), Err(ParseError::Json(_))));
}

#[test]
fn upload_strips_bom_and_rejects_bad_utf8() {
    let mut bytes = "\u{feff}".as_bytes().to_vec();
    bytes.extend_from_slice(b"name,odds\nAlpha,3.50\n");
    let card = parse_upload(&bytes, "paste.txt").unwrap();
    assert_eq!(card.runners[0].name, "Alpha");
    assert_eq!(card.runners[0].odds_decimal, Some(3.5));

    let err = parse_upload(&[0xff, 0xfe, 0x00], "card.txt").unwrap_err();
    assert!(matches!(err, ParseError::Encoding(_)));
}

#[test]
fn single_line_card() {
    let raw = "1. Fast Hoof (4) $6.50 J:Smith T:Brown 12x3\n\
               2. Quick Step (B7) 5/2 x41\n\
               random banner\n\
               3. Late Show 14.00 closer\n";
    let card = parse_card(raw).unwrap();
    assert_eq!(card.format, Some(CardFormat::SingleLine));
    let odds: Vec<Option<f64>> = card.runners.iter().map(|r| r.odds_decimal).collect();
    assert_eq!(odds, vec![Some(6.5), Some(3.5), Some(14.0)]);
}
