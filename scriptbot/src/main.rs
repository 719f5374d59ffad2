use std::path::{Path, PathBuf};

use tracing::{error, warn};

use scriptbot::bot::Bot;
use scriptbot::cli::{self, RcFile};
use scriptbot::config::{self, Config};
use scriptbot::platform::console::ConsolePlatform;
use scriptbot::platform::{ChannelId, GuildId};
use scriptbot::registry::Registry;

/// Extension of script files picked up from a directory.
const SCRIPT_EXT: &str = "bot";

#[tokio::main]
async fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("scriptbot: {e}");
            eprintln!("{}", cli::usage());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .init();

    // ── Load the rc file ──────────────────────────────────────────────────────
    let config = match &args.rc_file {
        RcFile::Skip => Config::new(),
        RcFile::Explicit(path) => load_rc(path, true),
        RcFile::Search => match config::find_rc() {
            Some(path) => load_rc(&path, false),
            None => Config::new(),
        },
    };

    // ── Build the simulated platform ──────────────────────────────────────────
    let platform = ConsolePlatform::new();
    config.seed(&platform);
    if platform.operator_guild().is_none() {
        // Nothing seeded: provide a minimal workshop to script against.
        platform.seed_guild(GuildId(100), "workshop");
        platform.seed_channel(ChannelId(200), GuildId(100), "general");
    }
    let Some(channel) = platform.operator_channel() else {
        eprintln!("scriptbot: rc file seeds a guild but no channel");
        std::process::exit(1);
    };
    let guild = platform.operator_guild();

    // ── Register scripts ──────────────────────────────────────────────────────
    let mut registry = Registry::new();
    let mut paths: Vec<PathBuf> = config.script_paths.clone();
    paths.extend(args.scripts.iter().cloned());

    for path in &paths {
        for file in script_files(path) {
            if let Err(e) = registry.register_file(&file) {
                error!("{}: {e}", file.display());
                std::process::exit(1);
            }
        }
    }
    if let Some(source) = &args.inline_script {
        if let Err(e) = registry.register_source(source) {
            error!("-c script: {e}");
            std::process::exit(1);
        }
    }
    if registry.is_empty() {
        warn!("no scripts registered");
    }

    let prefix = args
        .prefix
        .or(config.prefix)
        .unwrap_or_else(|| "!".to_owned());

    // ── Run ───────────────────────────────────────────────────────────────────
    let bot = Bot::new(platform, registry, prefix);
    bot.run_startup().await;

    if args.batch {
        return;
    }

    println!("scriptbot {} - type messages, Ctrl-C to quit", env!("CARGO_PKG_VERSION"));
    println!(
        "commands: {}",
        bot.registry()
            .commands()
            .iter()
            .map(|c| format!("{}{}", bot.prefix(), c.name))
            .collect::<Vec<_>>()
            .join(" ")
    );

    if let Err(e) = bot.run(channel, guild).await {
        eprintln!("scriptbot: {e}");
        std::process::exit(1);
    }
}

/// Load an rc file, reporting per-line problems as warnings.  A missing
/// explicitly-named file is fatal; search results always exist.
fn load_rc(path: &Path, explicit: bool) -> Config {
    match Config::load_file(path) {
        Ok((config, errors)) => {
            for e in errors {
                warn!("{}: {e}", path.display());
            }
            config
        }
        Err(e) => {
            if explicit {
                eprintln!("scriptbot: cannot read {}: {e}", path.display());
                std::process::exit(1);
            }
            warn!("cannot read {}: {e}", path.display());
            Config::new()
        }
    }
}

/// A script path is either a file (registered as-is) or a directory (every
/// `.bot` file inside, in name order).
fn script_files(path: &Path) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = match std::fs::read_dir(path) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == SCRIPT_EXT))
            .collect(),
        Err(e) => {
            eprintln!("scriptbot: cannot read {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    files.sort();
    files
}
