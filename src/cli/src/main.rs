//! traitexpr - evaluate trait expressions from the command line
//!
//! Evaluates access-control templates against a set of external traits and
//! prints the resulting value or decision.
//!
//! ## Configuration
//!
//! - `--config` / `TRAITEXPR_CONFIG` - TOML file with `[engine]` and `[logging]`
//! - `RUST_LOG` - overrides the configured log level

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use traitexpr_engine::{Engine, TraitStore, Value};

mod config;

use config::CliConfig;

/// Trait expression evaluator CLI
#[derive(Parser)]
#[command(name = "traitexpr")]
#[command(about = "Evaluate identity trait expressions for access-control templates")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "TRAITEXPR_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one expression
    Eval {
        /// Expression source
        expr: String,

        /// JSON file mapping trait names to a string or array of strings
        #[arg(short, long)]
        traits: Option<PathBuf>,

        /// Extra trait value as name=value (repeatable, appends)
        #[arg(long = "trait", value_name = "NAME=VALUE")]
        extra: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate the bundled sample templates against sample traits
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load_or_default(cli.config.as_deref())?;
    config.validate()?;

    init_logging(&config, cli.verbose);
    info!("traitexpr v{}", traitexpr_engine::VERSION);

    let engine = Engine::with_config(config.engine.clone())
        .context("Failed to create expression engine")?;

    match cli.command {
        Command::Eval {
            expr,
            traits,
            extra,
            json,
        } => {
            let traits = load_traits(traits.as_deref(), &extra)?;
            debug!("Loaded {} trait(s)", traits.len());

            let value = engine
                .evaluate_expression(&expr, &traits)
                .with_context(|| format!("Failed to evaluate {}", expr.trim()))?;
            println!("{}", render(&value, json)?);
        }
        Command::Demo => run_demo(&engine)?,
    }

    Ok(())
}

fn init_logging(config: &CliConfig, verbose: bool) {
    let log_level = if verbose { "debug" } else { config.logging.level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_ansi(config.logging.colored)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Read the trait file, then append `name=value` overrides
fn load_traits(path: Option<&Path>, extra: &[String]) -> Result<TraitStore> {
    let mut map = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read trait file {}", path.display()))?;
            let store: TraitStore = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse trait file {}", path.display()))?;
            traitexpr_engine::TraitMap::from(store)
        }
        None => traitexpr_engine::TraitMap::new(),
    };

    for pair in extra {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("Trait '{}' must be NAME=VALUE", pair))?;
        map.entry(name.to_string()).or_default().push(value.to_string());
    }

    Ok(map.into())
}

fn render(value: &Value, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(value).context("Failed to serialize result");
    }
    Ok(value.to_string())
}

const DEMO_EXPRESSIONS: &[&str] = &[
    r#"external.groups"#,
    r#"filter(external.groups, matches("env"))"#,
    r#"ifelse(contains(external.groups, "contractors"), "first", "second")"#,
    r#"transform(external.username, replace("-", "_"))"#,
    r#"
concat(
	"ubuntu",
	transform(external.username, replace("-", "_")),
	ifelse(contains(external.email, "nic@goteleport.com"), "root", concat()),
	transform(filter(external.email, matches("@goteleport.com")), replace("^(.*)@goteleport.com", "$1")),
)"#,
    r#"
concat(
	transform(
		filter(external.groups, matches("^env-\\w+$")),
		replace("^env-(\\w+)$", "$1")),
	ifelse(
		contains(external.groups, "contractors"),
		concat(),
		transform(external.groups, replace("^devs$", "dev"))),
)"#,
    r#"
concat(
	ifelse(
		contains(external.groups, "devs"),
		concat("dev", "staging"),
		concat()),
	ifelse(
		contains(external.groups, "qa"),
		"qa",
		concat()),
)"#,
    r#"contains(external.groups, "devs") && !contains(external.groups, "contractors")"#,
    r#"match(external.username, option("root", "admin"), default_option(list("user")))"#,
];

fn demo_traits() -> TraitStore {
    TraitStore::new()
        .with_trait("username", ["my-username"])
        .with_trait("email", ["nic@goteleport.com"])
        .with_trait("groups", ["env-staging", "env-qa", "devs"])
}

fn run_demo(engine: &Engine) -> Result<()> {
    let traits = demo_traits();
    for expr in DEMO_EXPRESSIONS {
        println!("evaluating: {}", expr.trim());
        let value = engine
            .evaluate_expression(expr, &traits)
            .with_context(|| format!("Failed to evaluate {}", expr.trim()))?;
        println!("result: {}\n", render(&value, false)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_demo_expressions_evaluate() {
        let engine = Engine::new();
        let traits = demo_traits();
        for expr in DEMO_EXPRESSIONS {
            assert!(engine.evaluate_expression(expr, &traits).is_ok(), "{}", expr);
        }
    }

    #[test]
    fn test_load_traits_from_file_and_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"username": "alice", "groups": ["devs"]}}"#).unwrap();

        let extra = vec!["groups=qa".to_string(), "team=platform".to_string()];
        let traits = load_traits(Some(file.path()), &extra).unwrap();

        assert_eq!(traits.get("username"), Some(&["alice".to_string()][..]));
        assert_eq!(
            traits.get("groups"),
            Some(&["devs".to_string(), "qa".to_string()][..])
        );
        assert_eq!(traits.get("team"), Some(&["platform".to_string()][..]));
    }

    #[test]
    fn test_load_traits_rejects_bad_flag() {
        assert!(load_traits(None, &["novalue".to_string()]).is_err());
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&Value::list(["a", "b"]), false).unwrap(), "[a, b]");
        assert_eq!(render(&Value::List(vec![]), false).unwrap(), "[]");
        assert_eq!(render(&Value::Bool(true), true).unwrap(), "true");
        assert_eq!(render(&Value::scalar("x"), true).unwrap(), "\"x\"");
    }

    #[test]
    fn test_cli_parses_eval() {
        let cli = Cli::try_parse_from([
            "traitexpr",
            "eval",
            "external.groups",
            "--trait",
            "groups=devs",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Eval { expr, extra, json, .. } => {
                assert_eq!(expr, "external.groups");
                assert_eq!(extra, vec!["groups=devs"]);
                assert!(json);
            }
            Command::Demo => panic!("expected eval"),
        }
    }
}
