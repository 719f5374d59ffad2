//! Script registration and trigger matching.
//!
//! Startup scripts (`config DEFAULT`) run once when the bot comes up.
//! Command scripts (`config COMMAND`) declare their trigger surface through
//! global variables inspected at registration time:
//!
//! | Global         | Required | Meaning                                  |
//! |----------------|----------|------------------------------------------|
//! | `COMMAND_NAME` | yes      | primary trigger word                     |
//! | `DESCRIPTION`  | yes      | shown in command listings                |
//! | `ALIASES`      | no       | comma-separated alternative triggers     |
//! | `GUILD`        | no       | restrict the command to one guild        |
//!
//! Registration failures (parse or load) surface to the operator and are
//! never silently skipped.

use std::path::Path;

use crate::error::{LoadError, ScriptError};
use crate::platform::GuildId;
use crate::script::{parse, tokenize, Script, ScriptKind};

// ── CommandSpec ───────────────────────────────────────────────────────────────

/// One registered command: trigger surface plus the script it runs.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    /// When set, the command only triggers inside this guild.
    pub guild: Option<GuildId>,
    pub script: Script,
}

impl CommandSpec {
    fn from_script(script: Script) -> Result<Self, LoadError> {
        let name = script
            .global_literal("COMMAND_NAME")
            .ok_or(LoadError::MissingVariable { name: "COMMAND_NAME" })?
            .to_owned();
        let description = script
            .global_literal("DESCRIPTION")
            .ok_or(LoadError::MissingVariable { name: "DESCRIPTION" })?
            .to_owned();
        let aliases = script
            .global_literal("ALIASES")
            .map(|text| {
                text.split(',')
                    .map(str::trim)
                    .filter(|alias| !alias.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        let guild = match script.global_literal("GUILD") {
            Some(text) => Some(GuildId(text.trim().parse().map_err(|_| {
                LoadError::MalformedGuild { text: text.to_owned() }
            })?)),
            None => None,
        };
        Ok(Self { name, description, aliases, guild, script })
    }

    /// Every trigger word: the primary name followed by the aliases.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// All registered scripts: the startup list and the command table.
#[derive(Debug, Default)]
pub struct Registry {
    startup: Vec<Script>,
    commands: Vec<CommandSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lex, parse, load and register one script source.
    pub fn register_source(&mut self, source: &str) -> Result<(), ScriptError> {
        let nodes = parse(&tokenize(source))?;
        let script = Script::load(nodes)?;
        match script.kind() {
            ScriptKind::Default => self.startup.push(script),
            ScriptKind::Command => {
                let spec = CommandSpec::from_script(script)?;
                self.upsert(spec);
            }
        }
        Ok(())
    }

    /// Read and register a script file.
    pub fn register_file(&mut self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path)?;
        self.register_source(&source)
    }

    /// Insert or replace a command by primary name.
    fn upsert(&mut self, spec: CommandSpec) {
        match self.commands.iter_mut().find(|c| c.name == spec.name) {
            Some(slot) => *slot = spec,
            None => self.commands.push(spec),
        }
    }

    /// Match an incoming message against every registered trigger.
    ///
    /// A match is the exact text `prefix + trigger`.  Guild-scoped commands
    /// only match messages from their guild; a message with no guild (a
    /// direct message) matches any command.
    pub fn match_trigger(
        &self,
        prefix: &str,
        content: &str,
        guild: Option<GuildId>,
    ) -> Option<&CommandSpec> {
        let content = content.trim();
        self.commands.iter().find(|cmd| {
            if let (Some(scope), Some(from)) = (cmd.guild, guild) {
                if scope != from {
                    return false;
                }
            }
            cmd.triggers().any(|trigger| {
                content.strip_prefix(prefix).is_some_and(|rest| rest == trigger)
            })
        })
    }

    /// Startup scripts in registration order.
    pub fn startup(&self) -> &[Script] {
        &self.startup
    }

    /// Registered commands in registration order.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.startup.is_empty() && self.commands.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    const GREET: &str = "\
config COMMAND
set COMMAND_NAME \"greet\"
set DESCRIPTION \"says hello\"
set ALIASES \"hello, hi\"
send \"hello!\"
";

    #[test]
    fn register_default_script() {
        let mut reg = Registry::new();
        reg.register_source("config DEFAULT\nsend \"up\" 200").unwrap();
        assert_eq!(reg.startup().len(), 1);
        assert!(reg.commands().is_empty());
    }

    #[test]
    fn register_command_script() {
        let mut reg = Registry::new();
        reg.register_source(GREET).unwrap();
        let cmd = &reg.commands()[0];
        assert_eq!(cmd.name, "greet");
        assert_eq!(cmd.description, "says hello");
        assert_eq!(cmd.aliases, ["hello", "hi"]);
        assert_eq!(cmd.guild, None);
    }

    #[test]
    fn command_requires_name_and_description() {
        let mut reg = Registry::new();
        let err = reg
            .register_source("config COMMAND\nset DESCRIPTION \"d\"")
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Load(LoadError::MissingVariable { name: "COMMAND_NAME" })
        ));

        let err = reg
            .register_source("config COMMAND\nset COMMAND_NAME \"x\"")
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Load(LoadError::MissingVariable { name: "DESCRIPTION" })
        ));
    }

    #[test]
    fn malformed_guild_is_a_load_error() {
        let mut reg = Registry::new();
        let err = reg
            .register_source(
                "config COMMAND\nset COMMAND_NAME \"x\"\nset DESCRIPTION \"d\"\nset GUILD \"not-a-number\"",
            )
            .unwrap_err();
        assert!(matches!(err, ScriptError::Load(LoadError::MalformedGuild { .. })));
    }

    #[test]
    fn parse_errors_surface() {
        let mut reg = Registry::new();
        let err = reg.register_source("config COMMAND\nfrobnicate").unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Parse(ParseError::UnknownInstruction { .. })
        ));
    }

    #[test]
    fn reregistering_replaces_by_name() {
        let mut reg = Registry::new();
        reg.register_source(GREET).unwrap();
        reg.register_source(
            "config COMMAND\nset COMMAND_NAME \"greet\"\nset DESCRIPTION \"v2\"\nsend \"hey\"",
        )
        .unwrap();
        assert_eq!(reg.commands().len(), 1);
        assert_eq!(reg.commands()[0].description, "v2");
    }

    #[test]
    fn trigger_matches_name_and_aliases() {
        let mut reg = Registry::new();
        reg.register_source(GREET).unwrap();
        assert!(reg.match_trigger("!", "!greet", None).is_some());
        assert!(reg.match_trigger("!", "!hello", None).is_some());
        assert!(reg.match_trigger("!", "  !hi  ", None).is_some());
        assert!(reg.match_trigger("!", "!nope", None).is_none());
        assert!(reg.match_trigger("!", "greet", None).is_none()); // prefix required
        assert!(reg.match_trigger("!", "!greet extra", None).is_none()); // exact match
    }

    #[test]
    fn guild_scoped_trigger() {
        let mut reg = Registry::new();
        reg.register_source(
            "config COMMAND\nset COMMAND_NAME \"here\"\nset DESCRIPTION \"d\"\nset GUILD 100\nsend \"hi\"",
        )
        .unwrap();
        assert!(reg.match_trigger("!", "!here", Some(GuildId(100))).is_some());
        assert!(reg.match_trigger("!", "!here", Some(GuildId(999))).is_none());
        // No guild on the message (direct message): scoped commands still match.
        assert!(reg.match_trigger("!", "!here", None).is_some());
    }

    #[test]
    fn register_file_reports_io_errors() {
        let mut reg = Registry::new();
        let err = reg
            .register_file(Path::new("/no/such/script.bot"))
            .unwrap_err();
        assert!(matches!(err, ScriptError::Io(_)));
    }

    #[test]
    fn register_file_roundtrip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GREET.as_bytes()).unwrap();

        let mut reg = Registry::new();
        reg.register_file(file.path()).unwrap();
        assert_eq!(reg.commands()[0].name, "greet");
    }
}
