//! Bot rc-file parser.
//!
//! Recognised directives, one per line:
//!
//! | Directive                         | Action                              |
//! |-----------------------------------|-------------------------------------|
//! | `prefix <text>`                   | command trigger prefix              |
//! | `scripts <path>`                  | script file or directory to register|
//! | `guild <id> <name>`               | seed a simulated guild              |
//! | `channel <id> <guild-id> <name>`  | seed a channel                      |
//! | `member <id> <guild-id> <name>`   | seed a guild member                 |
//! | `role <id> <guild-id> <name>`     | seed a role                         |
//! | lines starting with `#`           | comment, ignored                    |
//!
//! Unknown directives are reported but do not abort loading, so an rc file
//! written for a newer version still loads.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use thiserror::Error;

use crate::platform::console::ConsolePlatform;
use crate::platform::{ChannelId, GuildId, MemberId, RoleId};

// ── Errors ────────────────────────────────────────────────────────────────────

/// A non-fatal problem on one rc-file line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

// ── Seeds ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSeed {
    pub id: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSeed {
    pub id: ChannelId,
    pub guild: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSeed {
    pub id: MemberId,
    pub guild: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSeed {
    pub id: RoleId,
    pub guild: GuildId,
    pub name: String,
}

// ── Config ────────────────────────────────────────────────────────────────────

/// Parsed rc file.
#[derive(Debug, Default)]
pub struct Config {
    pub prefix: Option<String>,
    /// Script files or directories, in rc-file order.
    pub script_paths: Vec<PathBuf>,
    pub guilds: Vec<GuildSeed>,
    pub channels: Vec<ChannelSeed>,
    pub members: Vec<MemberSeed>,
    pub roles: Vec<RoleSeed>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an rc string.  Returns the config and any per-line errors.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (directive, rest) = match line.split_once(char::is_whitespace) {
                Some((d, r)) => (d, r.trim()),
                None => (line, ""),
            };

            let result = match directive {
                "prefix" => parse_prefix(rest, &mut config),
                "scripts" => parse_scripts(rest, &mut config),
                "guild" => parse_guild(rest, &mut config),
                "channel" => parse_channel(rest, &mut config),
                "member" => parse_member(rest, &mut config),
                "role" => parse_role(rest, &mut config),
                other => Err(format!("unknown directive '{other}'")),
            };
            if let Err(message) = result {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        (config, errors)
    }

    /// Read and parse an rc file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    /// Apply the guild/channel/member/role seeds to a console platform.
    pub fn seed(&self, platform: &ConsolePlatform) {
        for g in &self.guilds {
            platform.seed_guild(g.id, g.name.clone());
        }
        for c in &self.channels {
            platform.seed_channel(c.id, c.guild, c.name.clone());
        }
        for m in &self.members {
            platform.seed_member(m.id, m.guild, m.name.clone());
        }
        for r in &self.roles {
            platform.seed_role(r.id, r.guild, r.name.clone());
        }
    }
}

/// Search the usual locations for an rc file:
/// the platform config directory, `~/.scriptbotrc`, then `./scriptbotrc`.
pub fn find_rc() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dirs) = ProjectDirs::from("", "", "scriptbot") {
        candidates.push(dirs.config_dir().join("scriptbotrc"));
    }
    if let Some(base) = BaseDirs::new() {
        candidates.push(base.home_dir().join(".scriptbotrc"));
    }
    candidates.push(PathBuf::from("scriptbotrc"));
    candidates.into_iter().find(|p| p.is_file())
}

// ── Directive parsers ─────────────────────────────────────────────────────────

fn parse_prefix(rest: &str, config: &mut Config) -> Result<(), String> {
    if rest.is_empty() {
        return Err("prefix: requires a value".into());
    }
    config.prefix = Some(rest.to_owned());
    Ok(())
}

fn parse_scripts(rest: &str, config: &mut Config) -> Result<(), String> {
    if rest.is_empty() {
        return Err("scripts: requires a path".into());
    }
    config.script_paths.push(PathBuf::from(rest));
    Ok(())
}

/// Split `<id> <name…>`; the name is the rest of the line and may contain
/// spaces.
fn id_and_name(rest: &str, directive: &str) -> Result<(u64, String), String> {
    let (id, name) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("{directive}: expected <id> <name>"))?;
    let id = id
        .parse()
        .map_err(|_| format!("{directive}: malformed id '{id}'"))?;
    Ok((id, name.trim().to_owned()))
}

/// Split `<id> <guild-id> <name…>`.
fn ids_and_name(rest: &str, directive: &str) -> Result<(u64, u64, String), String> {
    let (id, rest) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("{directive}: expected <id> <guild-id> <name>"))?;
    let id = id
        .parse()
        .map_err(|_| format!("{directive}: malformed id '{id}'"))?;
    let (guild, name) = id_and_name(rest.trim(), directive)?;
    Ok((id, guild, name))
}

fn parse_guild(rest: &str, config: &mut Config) -> Result<(), String> {
    let (id, name) = id_and_name(rest, "guild")?;
    config.guilds.push(GuildSeed { id: GuildId(id), name });
    Ok(())
}

fn parse_channel(rest: &str, config: &mut Config) -> Result<(), String> {
    let (id, guild, name) = ids_and_name(rest, "channel")?;
    config.channels.push(ChannelSeed { id: ChannelId(id), guild: GuildId(guild), name });
    Ok(())
}

fn parse_member(rest: &str, config: &mut Config) -> Result<(), String> {
    let (id, guild, name) = ids_and_name(rest, "member")?;
    config.members.push(MemberSeed { id: MemberId(id), guild: GuildId(guild), name });
    Ok(())
}

fn parse_role(rest: &str, config: &mut Config) -> Result<(), String> {
    let (id, guild, name) = ids_and_name(rest, "role")?;
    config.roles.push(RoleSeed { id: RoleId(id), guild: GuildId(guild), name });
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
