use anyhow::{Context, Result, bail};

use racecard_abc::config::EngineConfig;
use racecard_abc::model::Selections;
use racecard_abc::odds::parse_odds_text;
use racecard_abc::stakes::{
    DividendReport, StrategyOptions, apply_strategy, estimate_dividends_from_odds,
    estimate_returns,
};

fn parse_odds_arg(args: &[String]) -> Result<Option<[Option<f64>; 3]>> {
    for (idx, arg) in args.iter().enumerate() {
        let raw = if let Some(v) = arg.strip_prefix("--odds=") {
            v
        } else if arg == "--odds" {
            args
                .get(idx + 1)
                .map(String::as_str)
                .context("--odds needs a value")?
        } else {
            continue;
        };
        let parts = raw.split(',').map(parse_odds_text).collect::<Vec<_>>();
        let [a, b, c] = parts[..] else {
            bail!("--odds expects three comma-separated prices, got {raw:?}");
        };
        return Ok(Some([a, b, c]));
    }
    Ok(None)
}

fn parse_budget_arg(args: &[String]) -> Result<Option<f64>> {
    for (idx, arg) in args.iter().enumerate() {
        let raw = if let Some(v) = arg.strip_prefix("--budget=") {
            v
        } else if arg == "--budget" {
            args
                .get(idx + 1)
                .map(String::as_str)
                .context("--budget needs a value")?
        } else {
            continue;
        };
        let budget = raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("bad budget {raw:?}"))?;
        return Ok(Some(budget));
    }
    Ok(None)
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let positional = args
        .iter()
        .enumerate()
        .filter(|(idx, arg)| {
            !arg.starts_with("--")
                && !(*idx > 0 && matches!(args[idx - 1].as_str(), "--odds" | "--budget"))
        })
        .map(|(_, arg)| arg.as_str())
        .collect::<Vec<_>>();
    let [strategy, a, b, c] = positional[..] else {
        bail!("usage: stake_calc STRATEGY A B C [--odds a,b,c] [--budget X]");
    };

    let config = EngineConfig::from_env();
    let plan = apply_strategy(
        strategy,
        &Selections::named(a, b, c),
        parse_budget_arg(&args)?,
        &StrategyOptions::from_config(&config),
    );
    let plan = match plan {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("[WARN] {err}");
            std::process::exit(1);
        }
    };

    println!("{plan}");
    println!();
    println!("TAB: {}", plan.tab_instructions());

    if let Some([oa, ob, oc]) = parse_odds_arg(&args)? {
        match estimate_dividends_from_odds(oa, ob, oc, config.takeout) {
            Ok(d) => {
                let returns = estimate_returns(&plan.bets, &d);
                println!(
                    "Est. dividends: trifecta ${:.2}, quinella ${:.2}",
                    d.trifecta, d.quinella
                );
                println!(
                    "Est. returns: trifecta ${:.2}, quinella ${:.2}, total ${:.2}",
                    returns.trifecta_return, returns.quinella_return, returns.total_return
                );
            }
            Err(err) => {
                let report = DividendReport::from(Err(err));
                println!("{}", serde_json::to_string(&report).context("serialize dividends")?);
            }
        }
    }
    Ok(())
}
