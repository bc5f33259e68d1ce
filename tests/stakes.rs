use racecard_abc::error::StrategyError;
use racecard_abc::model::Selections;
use racecard_abc::stakes::{
    DividendReport, StakeReport, StrategyOptions, StrategyType, apply_strategy,
    estimate_dividends_from_odds, estimate_returns,
};

fn opts() -> StrategyOptions {
    StrategyOptions::default()
}

#[test]
fn budget_6_totals_six_dollars_for_any_names() {
    for (a, b, c) in [
        ("Sabaj", "Lindermann", "Liberami"),
        ("1", "2", "3"),
        ("sabaj", "Sabaj", "SABAJ"),
    ] {
        let plan = apply_strategy("budget_6", &Selections::named(a, b, c), None, &opts()).unwrap();
        assert_eq!(plan.total_stake, 6.0);
        assert_eq!(plan.bets[0].num_combos, 6);
        assert_eq!(plan.bets[0].combos.len(), 6);
        assert_eq!(plan.bets[1].num_combos, 3);
        assert_eq!(plan.selections, vec![a, b, c]);
    }
}

#[test]
fn duplicate_guard_applies_to_every_strategy() {
    let dup = Selections::named("Sabaj", "Lindermann", "Sabaj");
    for strategy in StrategyType::ALL {
        let result = apply_strategy(strategy.as_str(), &dup, Some(50.0), &opts());
        assert_eq!(result, Err(StrategyError::DuplicateSelections), "{strategy}");
        let report = StakeReport::from(result);
        assert!(report.bets.is_empty());
        assert_eq!(report.total_stake, 0.0);
        assert!(report.error.is_some());
    }
}

#[test]
fn missing_selection_report() {
    let partial = Selections::new(Some("Sabaj".to_string()), None, Some("Liberami".to_string()));
    let report = StakeReport::from(apply_strategy("budget_6", &partial, None, &opts()));
    assert_eq!(report.error.as_deref(), Some("Must select A, B, and C horses"));
}

#[test]
fn unknown_strategy_report() {
    let report = StakeReport::from(apply_strategy(
        "all_in",
        &Selections::named("A", "B", "C"),
        None,
        &opts(),
    ));
    assert_eq!(report.error.as_deref(), Some("Unknown strategy type: all_in"));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["bets"], serde_json::json!([]));
    assert_eq!(json["total_stake"], serde_json::json!(0.0));
}

#[test]
fn plan_serialises_with_wire_names() {
    let plan = apply_strategy("trifecta_only", &Selections::named("A", "B", "C"), None, &opts())
        .unwrap();
    let json = serde_json::to_value(StakeReport::from(Ok(plan))).unwrap();
    assert_eq!(json["strategy"], "trifecta_only");
    assert_eq!(json["bets"][0]["type"], "Trifecta Boxed");
    assert_eq!(json["bets"][0]["combos"][0], serde_json::json!(["A", "B", "C"]));
}

#[test]
fn dividend_estimate_from_fixed_odds() {
    let d = estimate_dividends_from_odds(Some(3.2), Some(7.2), Some(11.0), 0.20).unwrap();
    assert_eq!(d.trifecta, 202.75);
    let expected_quinella =
        (((3.2 * 7.2 + 3.2 * 11.0 + 7.2 * 11.0) / 3.0 * 0.8 * 0.5) * 100.0_f64).round() / 100.0;
    assert_eq!(d.quinella, expected_quinella);

    let zero_takeout = estimate_dividends_from_odds(Some(2.0), Some(3.0), Some(4.0), 0.0).unwrap();
    assert_eq!(zero_takeout.trifecta, 24.0);

    let report = DividendReport::from(estimate_dividends_from_odds(Some(3.2), None, Some(11.0), 0.2));
    assert_eq!(report.trifecta, 0.0);
    assert_eq!(report.quinella, 0.0);
    assert_eq!(report.error.as_deref(), Some("Missing odds"));
}

#[test]
fn custom_returns_follow_flexi() {
    let plan = apply_strategy(
        "custom",
        &Selections::named("A", "B", "C"),
        Some(3.0),
        &StrategyOptions {
            tri_percent: Some(1.0),
            quin_percent: Some(0.0),
        },
    )
    .unwrap();
    assert_eq!(plan.total_stake, 3.0);
    assert_eq!(plan.bets[0].flexi_pct, 0.5);
    assert_eq!(plan.bets[1].flexi_pct, 0.0);

    let d = estimate_dividends_from_odds(Some(4.0), Some(5.0), Some(10.0), 0.2).unwrap();
    let r = estimate_returns(&plan.bets, &d);
    assert_eq!(d.trifecta, 160.0);
    assert_eq!(r.trifecta_return, 80.0);
    assert_eq!(r.quinella_return, 0.0);
    assert_eq!(r.total_return, 80.0);
}

#[test]
fn tab_instructions_for_budget_10() {
    let plan = apply_strategy("budget_10", &Selections::named("A", "B", "C"), None, &opts())
        .unwrap();
    assert_eq!(
        plan.tab_instructions(),
        "Trifecta Box: A, B, C - $1.00 unit (Total: $6.00) | \
         Quinella Box: A, B, C - $1.33 unit (Total: $4.00)"
    );
}
