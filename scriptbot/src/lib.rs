//! scriptbot: a small instruction language for chat-bot behaviours.
//!
//! Scripts are flat sequences of instructions (send a message, react to it,
//! grant or revoke a role, build and send a rich embed) executed against a
//! chat platform through the [`platform::ChatPlatform`] adapter trait.
//!
//! The pipeline:
//!
//! ```text
//! source text ──tokenize──► tokens ──parse──► nodes ──load──► Script
//!                                                              │
//!                                  ChatPlatform ◄──execute────┘
//! ```
//!
//! - [`script`] — lexer, parser, AST and interpreter
//! - [`platform`] — the adapter boundary and the in-memory console platform
//! - [`registry`] — script registration and trigger matching
//! - [`bot`] — the event loop tying the pieces together
//! - [`embed`] — rich-embed drafts
//! - [`config`] / [`cli`] — rc file and argument parsing
//! - [`error`] — the error taxonomy

pub mod bot;
pub mod cli;
pub mod config;
pub mod embed;
pub mod error;
pub mod platform;
pub mod registry;
pub mod script;

// Re-exports for convenience.
pub use bot::Bot;
pub use error::{LoadError, ParseError, PlatformError, RuntimeError, ScriptError};
pub use registry::{CommandSpec, Registry};
pub use script::{execute, InvocationContext, Script, ScriptKind};
