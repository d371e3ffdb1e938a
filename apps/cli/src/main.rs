#![deny(warnings)]

//! Headless CLI: runs the city governor on a scenario and prints the result.

use anyhow::{bail, Context, Result};
use gov_agent::{CityAgent, HandleOutcome, LocalCity, PresetList};
use gov_core::{validate_city, City, CmResult, Parameter};
use gov_econ::{random_city, RulesetEconomy};
use gov_solver::{Governor, GovernorConfig};
use persistence::AttributeStore;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A city with everything needed to govern it.
#[derive(Debug, Deserialize)]
struct Scenario {
    city: City,
    #[serde(default)]
    ruleset: RulesetEconomy,
    #[serde(default)]
    parameter: Parameter,
    #[serde(default)]
    governor: GovernorConfig,
}

#[derive(Debug, Default)]
struct Args {
    scenario: Option<PathBuf>,
    seed: Option<u64>,
    size: Option<u32>,
    tiles: Option<usize>,
    apply: bool,
    attributes: Option<PathBuf>,
    presets: Option<PathBuf>,
    json: bool,
}

const USAGE: &str = "usage: governor (--scenario FILE | --seed N [--size N] [--tiles N]) \
[--apply] [--attributes FILE] [--presets FILE] [--json]";

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut parsed = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |name: &str| it.next().with_context(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--scenario" => parsed.scenario = Some(value("--scenario")?.into()),
            "--seed" => parsed.seed = Some(value("--seed")?.parse::<u64>().context("--seed")?),
            "--size" => parsed.size = Some(value("--size")?.parse::<u32>().context("--size")?),
            "--tiles" => parsed.tiles = Some(value("--tiles")?.parse::<usize>().context("--tiles")?),
            "--attributes" => parsed.attributes = Some(value("--attributes")?.into()),
            "--presets" => parsed.presets = Some(value("--presets")?.into()),
            "--apply" => parsed.apply = true,
            "--json" => parsed.json = true,
            other => bail!("unknown argument {other}\n{USAGE}"),
        }
    }
    if parsed.scenario.is_some() == parsed.seed.is_some() {
        bail!(USAGE);
    }
    Ok(parsed)
}

fn parse_scenario(text: &str) -> Result<Scenario> {
    let scenario: Scenario = serde_yaml::from_str(text).context("parsing scenario")?;
    scenario.ruleset.validate()?;
    validate_city(&scenario.city)?;
    Ok(scenario)
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_scenario(&text).with_context(|| format!("in {}", path.display()))
}

fn print_result(result: &CmResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{result}");
    }
    Ok(())
}

fn run_query(scenario: &mut Scenario, json: bool) -> Result<()> {
    let mut governor = Governor::new(scenario.governor.clone());
    let best = governor.query(&scenario.ruleset, &mut scenario.city, &scenario.parameter)?;
    match best {
        Some(result) => print_result(&result, json)?,
        None => println!("No valid assignment for {}", scenario.city.name),
    }
    let stats = governor.stats();
    println!(
        "Oracle calls: {} | result cache: {:.1}% | secondary cache: {:.1}%",
        stats.oracle_calls,
        stats.results.hit_rate(),
        stats.secondary.hit_rate()
    );
    Ok(())
}

fn run_agent(scenario: &mut Scenario, attributes: Option<&Path>, json: bool) -> Result<()> {
    let store = match attributes {
        Some(path) if path.exists() => AttributeStore::load(path)?,
        _ => AttributeStore::new(),
    };
    let mut agent = CityAgent::with_attributes(scenario.governor.clone(), store);
    let id = scenario.city.id;
    agent.attach(id, &scenario.parameter)?;

    let economy = &scenario.ruleset;
    let outcome = agent.handle_city(economy, &mut LocalCity::new(&mut scenario.city, economy))?;
    for event in agent.drain_events() {
        println!("{event}");
    }
    agent.new_turn();
    match outcome {
        HandleOutcome::Applied(result) => print_result(&result, json)?,
        HandleOutcome::Released(reason) => println!("Released {}: {reason:?}", scenario.city.name),
        HandleOutcome::NotManaged => println!("{} is not managed", scenario.city.name),
    }

    if let Some(path) = attributes {
        agent.into_attributes().save(path)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GOVERNOR_GIT_SHA"),
        ?args,
        "starting governor"
    );

    let mut scenario = match (&args.scenario, args.seed) {
        (Some(path), _) => load_scenario(path)?,
        (None, Some(seed)) => Scenario {
            city: random_city(seed, args.size.unwrap_or(6), args.tiles.unwrap_or(20)),
            ruleset: RulesetEconomy::default(),
            parameter: Parameter::default(),
            governor: GovernorConfig::default(),
        },
        (None, None) => bail!(USAGE),
    };

    let description = match &args.presets {
        Some(path) => PresetList::load(path)?
            .short_description(&scenario.parameter)
            .to_string(),
        None => "custom".to_string(),
    };
    println!(
        "City {} {} | size {} | {} tiles | parameter: {}",
        scenario.city.id,
        scenario.city.name,
        scenario.city.size,
        scenario.city.tiles.len(),
        description
    );

    if args.apply {
        run_agent(&mut scenario, args.attributes.as_deref(), args.json)
    } else {
        run_query(&mut scenario, args.json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn needs_exactly_one_source() {
        assert!(args(&[]).is_err());
        assert!(args(&["--seed", "1", "--scenario", "x.yaml"]).is_err());
        let a = args(&["--seed", "7", "--size", "4", "--apply"]).unwrap();
        assert_eq!(a.seed, Some(7));
        assert_eq!(a.size, Some(4));
        assert!(a.apply && !a.json);
        assert!(args(&["--seed"]).is_err());
        assert!(args(&["--seed", "x"]).is_err());
        assert!(args(&["--seed", "1", "--frobnicate"]).is_err());
    }

    #[test]
    fn scenario_defaults() {
        let yaml = r#"
city:
  id: 3
  name: Thebes
  size: 2
  center: { food: 2, shield: 1, trade: 1 }
  tiles:
    - output: { food: 2, shield: 0, trade: 1 }
    - output: { food: 1, shield: 1, trade: 0 }
      state: Unavailable
  specialists: { entertainers: 2, scientists: 0, taxmen: 0 }
parameter:
  minimal_surplus: [0, 0, 0, 0, 0, 0]
  factor: [1, 1, 1, 1, 1, 1]
  happy_factor: 1
"#;
        let mut scenario = parse_scenario(yaml).unwrap();
        assert_eq!(scenario.governor, GovernorConfig::default());
        assert_eq!(scenario.ruleset, RulesetEconomy::default());
        run_query(&mut scenario, false).unwrap();
    }

    #[test]
    fn inconsistent_city_is_rejected() {
        let yaml = r#"
city:
  id: 1
  name: Broken
  size: 3
  center: { food: 2, shield: 1, trade: 1 }
  tiles: []
"#;
        assert!(parse_scenario(yaml).is_err());
    }

    #[test]
    fn demo_scenario_matches_a_preset() {
        let scenario = parse_scenario(include_str!("../../../demos/scenario.yaml")).unwrap();
        let presets =
            PresetList::from_yaml_str(include_str!("../../../demos/presets.yaml")).unwrap();
        assert_eq!(presets.short_description(&scenario.parameter), "growth");
        assert!(scenario.governor.strict_invariants);
    }
}
