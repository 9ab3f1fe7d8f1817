//! Config command implementation.

use std::path::PathBuf;

use anyhow::Result;
use journal_core::config::{parse_duration, Config};

use super::{ConfigAction, ConfigArgs};

/// Every key understood by `get` and `set`.
const KEYS: &[&str] = &[
    "general.backend_url",
    "general.enable_logging",
    "sync.frequency_minutes",
    "sync.sink",
    "sync.request_timeout",
    "sync.output_dir",
    "github.owner",
    "github.repo",
    "github.branch",
    "github.directory",
    "github.token_env",
    "github.api_url",
    "filter.exclude",
    "history.enabled",
    "history.max_entries",
    "history.auto_clear_days",
];

/// Run the config command.
pub async fn run(args: ConfigArgs) -> Result<()> {
    let mut config = Config::load()?;

    match args.action {
        ConfigAction::Get { key } => match get_config_value(&config, &key) {
            Some(v) => println!("{}: {}", key, v),
            None => println!("Unknown configuration key: {}", key),
        },

        ConfigAction::Set { key, value } => {
            if set_config_value(&mut config, &key, &value)? {
                if let Err(e) = config.validate() {
                    eprintln!("Warning: {e}");
                }
                config.save()?;
                println!("Set {} = {}", key, value);
            } else {
                println!("Unknown configuration key: {}", key);
            }
        }

        ConfigAction::Show => show(&config),

        ConfigAction::List => {
            for key in KEYS {
                println!("{key}");
            }
        }

        ConfigAction::Path => println!("{}", Config::config_path().display()),

        ConfigAction::Reset => {
            Config::default().save()?;
            println!("Configuration reset to defaults.");
        }
    }

    Ok(())
}

fn show(config: &Config) {
    let unset = || "(not set)".to_string();

    println!();
    println!("Activity Journal Configuration");
    println!("{}", "─".repeat(50));
    println!();
    println!("[general]");
    println!("  backend_url = \"{}\"", config.general.backend_url);
    println!("  enable_logging = {}", config.general.enable_logging);
    println!();
    println!("[sync]");
    println!("  frequency_minutes = {}", config.sync.frequency_minutes);
    println!("  sink = \"{}\"", config.sync.sink);
    println!(
        "  request_timeout = \"{}s\"",
        config.sync.request_timeout.as_secs()
    );
    println!("  output_dir = \"{}\"", config.output_dir().display());
    println!();
    println!("[github]");
    println!(
        "  owner = {}",
        config.github.owner.clone().unwrap_or_else(unset)
    );
    println!(
        "  repo = {}",
        config.github.repo.clone().unwrap_or_else(unset)
    );
    println!(
        "  branch = {}",
        config.github.branch.clone().unwrap_or_else(unset)
    );
    println!("  directory = \"{}\"", config.github.directory);
    println!("  token_env = \"{}\"", config.github.token_env);
    println!("  api_url = \"{}\"", config.github.api_url);
    println!();
    println!("[filter]");
    println!("  exclude = {:?}", config.filter.exclude);
    println!();
    println!("[history]");
    println!("  enabled = {}", config.history.enabled);
    println!("  max_entries = {}", config.history.max_entries);
    println!(
        "  auto_clear_days = {}",
        config
            .history
            .auto_clear_days
            .map_or_else(|| "never".to_string(), |d| d.to_string())
    );
    println!();
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    let optional = |value: &Option<String>| value.clone().unwrap_or_default();

    match key {
        "general.backend_url" => Some(config.general.backend_url.clone()),
        "general.enable_logging" => Some(config.general.enable_logging.to_string()),
        "sync.frequency_minutes" => Some(config.sync.frequency_minutes.to_string()),
        "sync.sink" => Some(config.sync.sink.to_string()),
        "sync.request_timeout" => Some(format!("{}s", config.sync.request_timeout.as_secs())),
        "sync.output_dir" => Some(config.output_dir().display().to_string()),
        "github.owner" => Some(optional(&config.github.owner)),
        "github.repo" => Some(optional(&config.github.repo)),
        "github.branch" => Some(optional(&config.github.branch)),
        "github.directory" => Some(config.github.directory.clone()),
        "github.token_env" => Some(config.github.token_env.clone()),
        "github.api_url" => Some(config.github.api_url.clone()),
        "filter.exclude" => Some(config.filter.exclude.join(",")),
        "history.enabled" => Some(config.history.enabled.to_string()),
        "history.max_entries" => Some(config.history.max_entries.to_string()),
        "history.auto_clear_days" => Some(
            config
                .history
                .auto_clear_days
                .map_or_else(String::new, |d| d.to_string()),
        ),
        _ => None,
    }
}

fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<bool> {
    let optional = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    match key {
        "general.backend_url" => config.general.backend_url = value.to_string(),
        "general.enable_logging" => config.general.enable_logging = value.parse()?,
        "sync.frequency_minutes" => config.sync.frequency_minutes = value.parse()?,
        "sync.sink" => config.sync.sink = value.parse()?,
        "sync.request_timeout" => config.sync.request_timeout = parse_duration(value)?,
        "sync.output_dir" => config.sync.output_dir = optional(value).map(PathBuf::from),
        "github.owner" => config.github.owner = optional(value),
        "github.repo" => config.github.repo = optional(value),
        "github.branch" => config.github.branch = optional(value),
        "github.directory" => config.github.directory = value.to_string(),
        "github.token_env" => config.github.token_env = value.to_string(),
        "github.api_url" => config.github.api_url = value.to_string(),
        "filter.exclude" => {
            config.filter.exclude = value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        "history.enabled" => config.history.enabled = value.parse()?,
        "history.max_entries" => config.history.max_entries = value.parse()?,
        "history.auto_clear_days" => {
            config.history.auto_clear_days = match value.trim() {
                "" | "never" => None,
                days => Some(days.parse()?),
            };
        }
        _ => return Ok(false),
    }

    Ok(true)
}
