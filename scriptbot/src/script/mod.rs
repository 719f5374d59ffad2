//! The scripting language: lexer, parser and interpreter.
//!
//! A script goes through three stages.  [`lexer::tokenize`] turns source
//! text into typed tokens (total, never fails).  [`parser::parse`] turns
//! tokens into a flat sequence of instruction nodes.  [`Script::load`]
//! validates the sequence and [`interp::execute`] runs it against a
//! platform adapter.
//!
//! ```rust
//! use scriptbot::script::{lexer::tokenize, parser::parse, Script, ScriptKind};
//!
//! let tokens = tokenize("config DEFAULT\nset GREETING \"hi\"  # a global");
//! let script = Script::load(parse(&tokens).unwrap()).unwrap();
//! assert_eq!(script.kind(), ScriptKind::Default);
//! assert_eq!(script.global_literal("GREETING"), Some("hi"));
//! ```

pub mod ast;
pub mod interp;
pub mod lexer;
pub mod parser;

// Re-exports for convenience.
pub use ast::{EmbedOp, Node, RoleAction, Scope, Value};
pub use interp::{execute, Environment, InvocationContext, Script, ScriptKind};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::parse;
