//! The bot event loop.
//!
//! Owns the platform, the script registry and the trigger prefix.  Startup
//! scripts run once when the bot comes up; after that each incoming message
//! is trigger-matched and, on a hit, executed as one isolated interpreter
//! run.  A runtime failure aborts that run only: it is logged and the loop
//! keeps serving.
//!
//! The interactive harness feeds stdin lines in as messages arriving in the
//! operator channel.

use std::io;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::platform::{ChannelId, ChatPlatform, GuildId};
use crate::registry::Registry;
use crate::script::{execute, InvocationContext};

/// A running bot: platform + registered scripts + prefix.
pub struct Bot<P> {
    platform: P,
    registry: Registry,
    prefix: String,
}

impl<P: ChatPlatform> Bot<P> {
    pub fn new(platform: P, registry: Registry, prefix: impl Into<String>) -> Self {
        Self { platform, registry, prefix: prefix.into() }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Run every DEFAULT script once, in registration order.  A failing
    /// script aborts its own execution only.
    pub async fn run_startup(&self) {
        for script in self.registry.startup() {
            if let Err(e) = execute(script, &self.platform, None).await {
                warn!("startup script aborted: {e}");
            }
        }
    }

    /// Trigger-match one incoming message and execute the matched command.
    ///
    /// Returns `true` if a command fired.  Each call is an independent
    /// execution with its own environment; concurrent calls share nothing
    /// but the platform.
    pub async fn handle_message(
        &self,
        content: &str,
        channel: ChannelId,
        guild: Option<GuildId>,
    ) -> bool {
        let Some(cmd) = self.registry.match_trigger(&self.prefix, content, guild) else {
            return false;
        };
        let ctx = InvocationContext { channel };
        match execute(&cmd.script, &self.platform, Some(&ctx)).await {
            Ok(()) => info!(command = %cmd.name, "command completed"),
            // Side effects already applied stay applied.
            Err(e) => warn!(command = %cmd.name, "execution aborted: {e}"),
        }
        true
    }

    /// Interactive loop: read stdin lines as messages in the operator
    /// channel until EOF or Ctrl-C.
    pub async fn run(&self, channel: ChannelId, guild: Option<GuildId>) -> io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted, shutting down");
                    return Ok(());
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        return Ok(()); // stdin closed
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    if !self.handle_message(&line, channel, guild).await {
                        info!("no command matched");
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::console::ConsolePlatform;
    use crate::platform::{ChannelId, GuildId, MessageBody};

    fn seeded_platform() -> ConsolePlatform {
        let platform = ConsolePlatform::new();
        platform.seed_guild(GuildId(100), "workshop");
        platform.seed_channel(ChannelId(200), GuildId(100), "general");
        platform
    }

    fn bot_with(scripts: &[&str]) -> Bot<ConsolePlatform> {
        let mut registry = Registry::new();
        for src in scripts {
            registry.register_source(src).expect("registration failed");
        }
        Bot::new(seeded_platform(), registry, "!")
    }

    #[tokio::test]
    async fn startup_scripts_run_once() {
        let bot = bot_with(&["config DEFAULT\nsend \"bot is up\" 200"]);
        bot.run_startup().await;
        let sent = bot.platform().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, MessageBody::Text("bot is up".into()));
    }

    #[tokio::test]
    async fn failing_startup_script_is_not_fatal() {
        // First script references an unknown variable; the second still runs.
        let bot = bot_with(&[
            "config DEFAULT\nsend MISSING 200",
            "config DEFAULT\nsend \"second\" 200",
        ]);
        bot.run_startup().await;
        let sent = bot.platform().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, MessageBody::Text("second".into()));
    }

    #[tokio::test]
    async fn message_triggers_command() {
        let bot = bot_with(&[
            "config COMMAND\nset COMMAND_NAME \"greet\"\nset DESCRIPTION \"d\"\nsend \"hello!\"",
        ]);
        let fired = bot
            .handle_message("!greet", ChannelId(200), Some(GuildId(100)))
            .await;
        assert!(fired);
        let sent = bot.platform().sent();
        assert_eq!(sent.len(), 1);
        // No explicit channel: the invocation channel is used.
        assert_eq!(sent[0].channel, ChannelId(200));
    }

    #[tokio::test]
    async fn unmatched_message_does_nothing() {
        let bot = bot_with(&[
            "config COMMAND\nset COMMAND_NAME \"greet\"\nset DESCRIPTION \"d\"\nsend \"hello!\"",
        ]);
        let fired = bot
            .handle_message("just chatting", ChannelId(200), Some(GuildId(100)))
            .await;
        assert!(!fired);
        assert!(bot.platform().sent().is_empty());
    }

    #[tokio::test]
    async fn runtime_error_aborts_only_that_invocation() {
        let bot = bot_with(&[
            "config COMMAND\nset COMMAND_NAME \"bad\"\nset DESCRIPTION \"d\"\nsend \"one\" 200\nsend OOPS 200\nsend \"never\" 200",
        ]);
        let fired = bot
            .handle_message("!bad", ChannelId(200), Some(GuildId(100)))
            .await;
        assert!(fired);
        // The first send landed; the failing one aborted the rest.
        let sent = bot.platform().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, MessageBody::Text("one".into()));

        // A fresh invocation starts clean and fails the same way.
        bot.handle_message("!bad", ChannelId(200), Some(GuildId(100))).await;
        assert_eq!(bot.platform().sent().len(), 2);
    }
}
