//! Script loading and execution.
//!
//! A parsed node sequence becomes a [`Script`] via [`Script::load`], which
//! enforces the config-first rule and hoists global `set` nodes into a
//! registration-time variable map.  A loaded script may then be executed any
//! number of times with [`execute`]; each execution owns a fresh
//! [`Environment`] (locals, embed drafts, message memory), so concurrent
//! executions share nothing but the platform itself.
//!
//! A [`RuntimeError`] aborts the remaining instructions of its own execution
//! only; side effects already applied stay applied.

use std::collections::HashMap;

use tracing::debug;

use crate::embed::{parse_color, EmbedDraft};
use crate::error::{LoadError, RuntimeError};
use crate::platform::{ChannelId, ChatPlatform, Guild, GuildId, MemberId, MessageId, RoleId};

use super::ast::{EmbedOp, Node, RoleAction, Scope, Value};

// ── Script kind ───────────────────────────────────────────────────────────────

/// What a script is for, selected by its `config` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// `config DEFAULT` — runs once at startup, outside any invocation.
    Default,
    /// `config COMMAND` — triggered by a chat message; requires
    /// `COMMAND_NAME` and `DESCRIPTION` globals at registration.
    Command,
}

impl ScriptKind {
    fn from_config(name: &str) -> Option<Self> {
        match name {
            "DEFAULT" => Some(ScriptKind::Default),
            "COMMAND" => Some(ScriptKind::Command),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScriptKind::Default => "DEFAULT",
            ScriptKind::Command => "COMMAND",
        }
    }
}

// ── Script ────────────────────────────────────────────────────────────────────

/// A loaded, immutable node sequence plus its hoisted global variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    kind: ScriptKind,
    nodes: Vec<Node>,
    /// Registration-time global map.  Globals are visible to every
    /// instruction of every execution regardless of where their `set` node
    /// sits in the sequence; locals are not hoisted.
    globals: HashMap<String, Value>,
}

impl Script {
    /// Validate and load a parsed node sequence.
    pub fn load(nodes: Vec<Node>) -> Result<Self, LoadError> {
        let kind = match nodes.first() {
            Some(Node::Config { name }) => {
                ScriptKind::from_config(name).ok_or_else(|| LoadError::UnknownKind {
                    name: name.clone(),
                })?
            }
            _ => return Err(LoadError::MissingConfig),
        };
        if nodes.iter().skip(1).any(Node::is_config) {
            return Err(LoadError::MisplacedConfig);
        }

        let mut globals = HashMap::new();
        for node in &nodes {
            if let Some((name, value)) = node.as_global_set() {
                globals.insert(name.to_owned(), value.clone());
            }
        }
        Ok(Self { kind, nodes, globals })
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// A hoisted global's literal text, for registration-time inspection
    /// (COMMAND_NAME, DESCRIPTION, ALIASES, GUILD).  `None` if the global
    /// is unset or holds a variable reference.
    pub fn global_literal(&self, name: &str) -> Option<&str> {
        self.globals.get(name).and_then(Value::as_literal)
    }
}

// ── Invocation context ────────────────────────────────────────────────────────

/// The external event that triggered a command script; supplies the default
/// channel for `send` / `embed:send`.
#[derive(Debug, Clone, Copy)]
pub struct InvocationContext {
    pub channel: ChannelId,
}

// ── Environment ───────────────────────────────────────────────────────────────

/// The mutable state of one execution.  Never shared across executions.
#[derive(Debug, Default)]
pub struct Environment {
    globals: HashMap<String, Value>,
    locals: HashMap<String, Value>,
    embeds: HashMap<String, EmbedDraft>,
    /// Which channel each message this execution sent went to; consulted by
    /// `react`.  Per-execution by design: a later invocation cannot react
    /// to an earlier invocation's messages.
    messages: HashMap<MessageId, ChannelId>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    fn seeded(globals: HashMap<String, Value>) -> Self {
        Self { globals, ..Self::default() }
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Later local sets overwrite earlier ones; a local shadows a global of
    /// the same name for the rest of this execution only.
    pub fn set_local(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    fn lookup(&self, name: &str) -> Result<&Value, RuntimeError> {
        self.locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .ok_or_else(|| RuntimeError::UnknownVariable { name: name.to_owned() })
    }

    /// Resolve a value to its concrete text.  Local scope is checked before
    /// global; an unresolved name is an error, never a silent default.  At
    /// most one var-of-var hop is followed.
    pub fn resolve(&self, value: &Value) -> Result<String, RuntimeError> {
        let Value::Var(name) = value else {
            return Ok(literal_text(value));
        };
        match self.lookup(name)? {
            Value::Var(inner) => match self.lookup(inner)? {
                Value::Var(_) => Err(RuntimeError::UnresolvableChain { name: name.clone() }),
                literal => Ok(literal_text(literal)),
            },
            literal => Ok(literal_text(literal)),
        }
    }
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::Str(s) | Value::Number(s) => s.clone(),
        Value::Bool(true) => "true".to_owned(),
        Value::Bool(false) => "false".to_owned(),
        // Callers only pass non-variable values here.
        Value::Var(name) => name.clone(),
    }
}

/// Parse an opaque id string at the adapter boundary.
fn numeric_id(text: &str) -> Result<u64, RuntimeError> {
    text.trim()
        .parse()
        .map_err(|_| RuntimeError::MalformedId { text: text.to_owned() })
}

// ── Execution ─────────────────────────────────────────────────────────────────

/// Run one execution of `script` against `platform`.
///
/// `context` is the triggering event for command scripts, `None` for
/// startup scripts.
pub async fn execute<P: ChatPlatform>(
    script: &Script,
    platform: &P,
    context: Option<&InvocationContext>,
) -> Result<(), RuntimeError> {
    let mut env = Environment::seeded(script.globals.clone());
    let guild = resolve_active_guild(&mut env, platform).await?;
    debug!(guild = %guild.id, kind = script.kind().name(), "executing script");

    let mut interp = Interpreter { platform, context, env, guild };
    for node in script.nodes().iter().skip(1) {
        interp.step(node).await?;
    }
    Ok(())
}

/// Pick the guild this execution operates in.  A set `GUILD` global is
/// resolved (one var-of-var hop supported) and fetched; otherwise the
/// platform's first guild is used and its id written back into the `GUILD`
/// slot so later references see a concrete value.
async fn resolve_active_guild<P: ChatPlatform>(
    env: &mut Environment,
    platform: &P,
) -> Result<Guild, RuntimeError> {
    match env.globals.get("GUILD").cloned() {
        Some(value) => {
            let text = env.resolve(&value)?;
            let guild = platform.resolve_guild(GuildId(numeric_id(&text)?)).await?;
            Ok(guild)
        }
        None => {
            let guild = platform.first_guild().await?;
            env.set_global("GUILD", Value::Number(guild.id.to_string()));
            Ok(guild)
        }
    }
}

struct Interpreter<'a, P: ChatPlatform> {
    platform: &'a P,
    context: Option<&'a InvocationContext>,
    env: Environment,
    guild: Guild,
}

impl<P: ChatPlatform> Interpreter<'_, P> {
    async fn step(&mut self, node: &Node) -> Result<(), RuntimeError> {
        match node {
            // Only legal at index 0; Script::load enforces that.
            Node::Config { .. } => Ok(()),

            // Globals were hoisted at load time.
            Node::SetVar { scope: Scope::Global, .. } => Ok(()),

            Node::SetVar { scope: Scope::Local, name, value } => {
                self.env.set_local(name.clone(), value.clone());
                Ok(())
            }

            Node::Send { message, channel } => self.send(message, channel.as_ref()).await,
            Node::React { emoji, message } => self.react(emoji, message).await,
            Node::RoleOp { action, member, role } => self.role_op(*action, member, role).await,
            Node::Embed { name, op } => self.embed(name, op).await,
        }
    }

    /// Explicit channel if given, else the invocation context's channel.
    async fn target_channel(&self, channel: Option<&Value>) -> Result<ChannelId, RuntimeError> {
        match channel {
            Some(value) => {
                let text = self.env.resolve(value)?;
                let channel = self
                    .platform
                    .resolve_channel(ChannelId(numeric_id(&text)?))
                    .await?;
                Ok(channel.id)
            }
            None => self
                .context
                .map(|ctx| ctx.channel)
                .ok_or(RuntimeError::NoInvocationChannel),
        }
    }

    async fn send(&mut self, message: &Value, channel: Option<&Value>) -> Result<(), RuntimeError> {
        let text = self.env.resolve(message)?;
        let channel = self.target_channel(channel).await?;
        let id = self.platform.send_text(channel, &text).await?;
        debug!(%channel, message = %id, "sent text");
        self.env.messages.insert(id, channel);
        Ok(())
    }

    async fn react(&mut self, emoji: &str, message: &Value) -> Result<(), RuntimeError> {
        let text = self.env.resolve(message)?;
        let id = MessageId(numeric_id(&text)?);
        let channel = self
            .env
            .messages
            .get(&id)
            .copied()
            .ok_or(RuntimeError::UnknownMessage { id })?;
        let fetched = self.platform.fetch_message(channel, id).await?;
        self.platform.add_reaction(&fetched, emoji).await?;
        Ok(())
    }

    async fn role_op(
        &mut self,
        action: RoleAction,
        member: &Value,
        role: &Value,
    ) -> Result<(), RuntimeError> {
        let member_id = MemberId(numeric_id(&self.env.resolve(member)?)?);
        let role_id = RoleId(numeric_id(&self.env.resolve(role)?)?);
        let member = self.platform.resolve_member(self.guild.id, member_id).await?;
        let role = self.platform.resolve_role(self.guild.id, role_id).await?;
        match action {
            RoleAction::Add => self.platform.add_role(&member, &role).await?,
            RoleAction::Remove => self.platform.remove_role(&member, &role).await?,
        }
        Ok(())
    }

    fn draft_mut(&mut self, name: &str) -> Result<&mut EmbedDraft, RuntimeError> {
        self.env
            .embeds
            .get_mut(name)
            .ok_or_else(|| RuntimeError::EmbedNotCreated { name: name.to_owned() })
    }

    async fn embed(&mut self, name: &str, op: &EmbedOp) -> Result<(), RuntimeError> {
        match op {
            EmbedOp::Create => {
                // Discards any prior draft of the same name.
                self.env.embeds.insert(name.to_owned(), EmbedDraft::new());
                Ok(())
            }

            EmbedOp::Conf { title, url, description, color } => {
                let title = self.env.resolve(title)?;
                let url = self.env.resolve(url)?;
                let description = self.env.resolve(description)?;
                let color_text = self.env.resolve(color)?;
                let rgb = parse_color(&color_text)
                    .ok_or(RuntimeError::MalformedColor { text: color_text })?;

                let draft = self.draft_mut(name)?;
                draft.title = Some(title);
                draft.url = Some(url);
                draft.description = Some(description);
                draft.color = Some(rgb);
                Ok(())
            }

            EmbedOp::SetAuthor { name: author, url, icon_url } => {
                let author = crate::embed::EmbedAuthor {
                    name: self.env.resolve(author)?,
                    url: self.env.resolve(url)?,
                    icon_url: self.env.resolve(icon_url)?,
                };
                self.draft_mut(name)?.author = Some(author);
                Ok(())
            }

            EmbedOp::SetThumbnail { url } => {
                let url = self.env.resolve(url)?;
                self.draft_mut(name)?.thumbnail_url = Some(url);
                Ok(())
            }

            EmbedOp::AddField { title, value, inline } => {
                let title = self.env.resolve(title)?;
                let value = self.env.resolve(value)?;
                self.draft_mut(name)?.add_field(title, value, *inline);
                Ok(())
            }

            EmbedOp::SetFooter { text } => {
                let text = self.env.resolve(text)?;
                self.draft_mut(name)?.footer_text = Some(text);
                Ok(())
            }

            EmbedOp::Send { channel } => {
                // The draft is consumed: sending the same name again
                // requires a fresh create.
                let draft = self
                    .env
                    .embeds
                    .remove(name)
                    .ok_or_else(|| RuntimeError::EmbedNotCreated { name: name.to_owned() })?;
                let channel = self.target_channel(channel.as_ref()).await?;
                let id = self.platform.send_embed(channel, &draft).await?;
                debug!(%channel, message = %id, embed = name, "sent embed");
                self.env.messages.insert(id, channel);
                Ok(())
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
