//! Error types for the scripting pipeline.
//!
//! Lexing is total and produces no errors of its own.  The remaining stages
//! each have a dedicated kind:
//!
//! | Kind           | Raised by            | Effect                          |
//! |----------------|----------------------|---------------------------------|
//! | [`ParseError`] | grammar violation    | script fails to register        |
//! | [`LoadError`]  | node-level checks    | script fails to register        |
//! | [`RuntimeError`] | one execution      | aborts that execution only      |
//! | [`PlatformError`] | the chat adapter  | surfaces as a [`RuntimeError`]  |
//!
//! Side effects already applied when a [`RuntimeError`] is raised stay
//! applied; there is no compensating rollback.

use thiserror::Error;

use crate::platform::{ChannelId, GuildId, MemberId, MessageId, RoleId};

// ── ParseError ────────────────────────────────────────────────────────────────

/// A grammar violation found while turning tokens into instruction nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A token of the wrong kind (or end of input) where the grammar
    /// expected something specific.  `expected` is a human-readable label
    /// such as "message text or variable"; `found` renders the offending
    /// token or "end of input".
    #[error("{expected} expected, got {found}")]
    Unexpected { expected: String, found: String },

    /// The leading identifier of an instruction is not a known keyword.
    #[error("instruction not recognized: {found}")]
    UnknownInstruction { found: String },

    /// `embed:<fn>` with a function name outside the fixed set.
    #[error("unknown embed function '{name}'")]
    UnknownEmbedFunction { name: String },

    /// `role:<fn>` with a function name other than `add` or `remove`.
    #[error("unknown role function '{name}', expected `add` or `remove`")]
    UnknownRoleFunction { name: String },
}

// ── LoadError ─────────────────────────────────────────────────────────────────

/// A structural problem found when a parsed node sequence is loaded for
/// registration.  Load errors never reach execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The first node of every script must be `config`.
    #[error("script must start with a `config` instruction")]
    MissingConfig,

    /// `config` appeared again after the first node.
    #[error("`config` may only appear as the first instruction")]
    MisplacedConfig,

    /// The `config` name is not a known script kind.
    #[error("unknown script kind '{name}', expected DEFAULT or COMMAND")]
    UnknownKind { name: String },

    /// A COMMAND script is missing a mandatory global variable.
    #[error("command script is missing required global '{name}'")]
    MissingVariable { name: &'static str },

    /// A COMMAND script's `GUILD` global is not a numeric id.
    #[error("command script has a malformed GUILD id '{text}'")]
    MalformedGuild { text: String },
}

// ── RuntimeError ──────────────────────────────────────────────────────────────

/// A failure during one script execution.  Aborts the remaining instructions
/// of that execution; concurrent executions are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A variable reference that resolves to nothing, in either scope.
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    /// Variable resolution follows at most one var-of-var hop.
    #[error("variable '{name}' resolves through more than one variable")]
    UnresolvableChain { name: String },

    /// `react` on a message id never produced by a `send` in this execution.
    #[error("unknown message {id}")]
    UnknownMessage { id: MessageId },

    /// An embed function other than `create` on a name with no draft.
    #[error("embed '{name}' not created")]
    EmbedNotCreated { name: String },

    /// An id string that does not parse as a numeric platform id.
    #[error("malformed id '{text}'")]
    MalformedId { text: String },

    /// An embed colour that is not `#RRGGBB` hex.
    #[error("malformed color '{text}', expected #RRGGBB")]
    MalformedColor { text: String },

    /// A `send` with no explicit channel outside any invocation context
    /// (e.g. in a startup script).
    #[error("no explicit channel and no invocation channel to fall back to")]
    NoInvocationChannel,

    /// A failed adapter call.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

// ── PlatformError ─────────────────────────────────────────────────────────────

/// A failure reported by the chat-platform adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("guild {0} not found")]
    GuildNotFound(GuildId),

    #[error("no guilds available")]
    NoGuilds,

    #[error("channel {0} not found")]
    ChannelNotFound(ChannelId),

    #[error("message {0} not found")]
    MessageNotFound(MessageId),

    #[error("member {0} not found in guild {1}")]
    MemberNotFound(MemberId, GuildId),

    #[error("role {0} not found in guild {1}")]
    RoleNotFound(RoleId, GuildId),
}

// ── ScriptError ───────────────────────────────────────────────────────────────

/// Umbrella error for registering and running scripts.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
