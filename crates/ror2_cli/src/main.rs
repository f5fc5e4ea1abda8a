use std::env;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use ror2_core::catalog::Catalog;
use ror2_core::config::Config;
use ror2_core::core_api::{CoreError, Engine, Outcome};
use ror2_core::roots;
use ror2_core::store::{Profile, ProfileStore};
use ror2_render::{
    render_json_coins, render_json_listing, render_json_outcome, render_json_summary,
    render_text_listing, render_text_outcome, render_text_summary,
};
use serde_json::Value as JsonValue;

const DEFAULT_CATALOG_FILE: &str = "data.json";
const EXIT_FAILURE: i32 = 1;
const EXIT_REJECTED: i32 = 2;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Steam root to scan for `userdata/<id>/632360/remote/UserProfiles`.
    /// Repeatable; well-known install locations are used when omitted.
    #[arg(long = "root", value_name = "DIR", global = true)]
    roots: Vec<PathBuf>,
    #[arg(long, value_name = "PATH", global = true)]
    catalog: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List discovered profiles
    List,
    /// Show what a profile has unlocked
    Show { profile: String },
    /// Print the loaded catalog
    Catalog,
    /// Set lunar coins (clamped to 0..=2147483647)
    Coins {
        profile: String,
        #[arg(allow_hyphen_values = true)]
        value: i64,
    },
    /// Unlock a character, skill, skin, item or artifact
    Unlock { profile: String, key: String },
    /// Lock a character, skill, skin, item or artifact
    Lock { profile: String, key: String },
    UnlockAchievement { profile: String, key: String },
    LockAchievement { profile: String, key: String },
    /// Discover one logbook entry, or every catalog entry when ITEM is omitted
    UnlockLogbook {
        profile: String,
        item: Option<String>,
    },
    LockLogbook { profile: String, item: String },
    ClearLogbook { profile: String },
    /// Unlock every catalog entry
    UnlockAll { profile: String },
    /// Lock everything except the Commando
    LockAll { profile: String },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::default();
    let catalog_path = cli.catalog.clone().unwrap_or_else(default_catalog_path);

    if let Command::Catalog = cli.command {
        let catalog = Catalog::load(&catalog_path).unwrap_or_else(|e| {
            eprintln!("Error loading catalog {}: {e}", catalog_path.display());
            process::exit(EXIT_FAILURE);
        });
        let rendered = serde_json::to_string_pretty(&catalog).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(EXIT_FAILURE);
        });
        println!("{rendered}");
        return;
    }

    log::debug!("using catalog {}", catalog_path.display());
    let engine = Engine::new(&config, Catalog::load_or_empty(&catalog_path));
    let roots = if cli.roots.is_empty() {
        roots::default_roots()
    } else {
        cli.roots.clone()
    };
    let mut store = ProfileStore::new(&config);
    store.discover(&roots);

    match &cli.command {
        Command::List => {
            let listing = store.listing();
            if cli.json {
                print_json(&render_json_listing(&listing));
            } else {
                print!("{}", render_text_listing(&listing));
            }
        }
        Command::Show { profile } => {
            let profile = open_profile(&mut store, profile);
            let summary = engine.summary(profile).unwrap_or_else(|e| fail("reading profile", &e));
            if cli.json {
                print_json(&render_json_summary(&summary));
            } else {
                print!("{}", render_text_summary(&summary));
            }
        }
        Command::Catalog => unreachable!("handled before discovery"),
        Command::Coins { profile, value } => {
            let profile = open_profile(&mut store, profile);
            let coins = engine
                .set_coins(profile, *value)
                .unwrap_or_else(|e| fail("setting coins", &e));
            if cli.json {
                print_json(&render_json_coins(coins));
            } else {
                println!("coins={coins}");
            }
        }
        Command::Unlock { profile, key } => {
            let profile = open_profile(&mut store, profile);
            report(cli.json, engine.unlock(profile, key), "unlocking");
        }
        Command::Lock { profile, key } => {
            let profile = open_profile(&mut store, profile);
            report(cli.json, engine.lock(profile, key), "locking");
        }
        Command::UnlockAchievement { profile, key } => {
            let profile = open_profile(&mut store, profile);
            report(
                cli.json,
                engine.unlock_achievement(profile, key),
                "unlocking achievement",
            );
        }
        Command::LockAchievement { profile, key } => {
            let profile = open_profile(&mut store, profile);
            report(
                cli.json,
                engine.lock_achievement(profile, key),
                "locking achievement",
            );
        }
        Command::UnlockLogbook { profile, item } => {
            let profile = open_profile(&mut store, profile);
            report(
                cli.json,
                engine.unlock_logbook(profile, item.as_deref()),
                "unlocking logbook",
            );
        }
        Command::LockLogbook { profile, item } => {
            let profile = open_profile(&mut store, profile);
            report(cli.json, engine.lock_logbook(profile, item), "locking logbook");
        }
        Command::ClearLogbook { profile } => {
            let profile = open_profile(&mut store, profile);
            report(cli.json, engine.clear_logbook(profile), "clearing logbook");
        }
        Command::UnlockAll { profile } => {
            let profile = open_profile(&mut store, profile);
            report(cli.json, engine.unlock_all(profile), "unlocking everything");
        }
        Command::LockAll { profile } => {
            let profile = open_profile(&mut store, profile);
            report(cli.json, engine.lock_all(profile), "locking everything");
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn default_catalog_path() -> PathBuf {
    if let Ok(exe) = env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let beside_exe = dir.join(DEFAULT_CATALOG_FILE);
        if beside_exe.is_file() {
            return beside_exe;
        }
    }
    PathBuf::from(DEFAULT_CATALOG_FILE)
}

fn open_profile<'a>(store: &'a mut ProfileStore, id: &str) -> &'a mut Profile {
    store.get(id).unwrap_or_else(|e| fail("opening profile", &e))
}

fn report(json: bool, result: Result<Outcome, CoreError>, action: &str) {
    let outcome = result.unwrap_or_else(|e| fail(action, &e));
    if json {
        print_json(&render_json_outcome(&outcome));
    } else {
        println!("{}", render_text_outcome(&outcome));
    }
    if !outcome.is_applied() {
        process::exit(EXIT_REJECTED);
    }
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(EXIT_FAILURE);
    });
    println!("{rendered}");
}

fn fail(action: &str, error: &CoreError) -> ! {
    eprintln!("Error {action}: {error}");
    process::exit(EXIT_FAILURE);
}
