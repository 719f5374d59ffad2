//! Instruction AST.
//!
//! The parser produces a flat, ordered sequence of [`Node`]s; there is no
//! nesting, no control flow, and the sequence is immutable once built.  A
//! loaded script may be executed any number of times against fresh
//! environments.

// ── Value ─────────────────────────────────────────────────────────────────────

/// A literal or deferred value used wherever an instruction needs data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Quoted string literal.
    Str(String),
    /// Numeric literal, kept as source text until the point of use so no
    /// precision or formatting is lost before an id conversion.
    Number(String),
    /// Boolean literal.  The lexer produces Boolean tokens but no current
    /// grammar position accepts one, so this is never parsed today.
    Bool(bool),
    /// Deferred variable reference, resolved at execution time by scope
    /// lookup (local before global), never at parse time.
    Var(String),
}

impl Value {
    /// The literal payload, if this value is not a variable reference.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Number(s) => Some(s),
            Value::Bool(true) => Some("true"),
            Value::Bool(false) => Some("false"),
            Value::Var(_) => None,
        }
    }
}

// ── Node ──────────────────────────────────────────────────────────────────────

/// Variable scope selected by the `set` / `setl` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Local,
}

/// Role mutation selected by `role:add` / `role:remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAction {
    Add,
    Remove,
}

/// An `embed:<fn>` operation on a named draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedOp {
    /// `embed:create` — start an empty draft, discarding any prior draft
    /// of the same name.
    Create,
    /// `embed:conf` — title, url, description and `#RRGGBB` colour.
    Conf { title: Value, url: Value, description: Value, color: Value },
    /// `embed:set_author`
    SetAuthor { name: Value, url: Value, icon_url: Value },
    /// `embed:set_thumbnail`
    SetThumbnail { url: Value },
    /// `embed:add_l` (inline) / `embed:add_nl` (block) — append one field.
    AddField { title: Value, value: Value, inline: bool },
    /// `embed:set_footer`
    SetFooter { text: Value },
    /// `embed:send` — send the draft and discard it.  Channel omitted means
    /// the invoking context's channel.
    Send { channel: Option<Value> },
}

/// One parsed instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `config <name>` — must be the first node of any script; the name
    /// selects the script kind.
    Config { name: String },
    /// `set <name> <value>` / `setl <name> <value>`
    SetVar { scope: Scope, name: String, value: Value },
    /// `send <message> [<channel>]`
    Send { message: Value, channel: Option<Value> },
    /// `react <emoji> <message-id>`
    React { emoji: String, message: Value },
    /// `role:<add|remove> <member-id> <role-id>`
    RoleOp { action: RoleAction, member: Value, role: Value },
    /// `embed:<fn> <name> …`
    Embed { name: String, op: EmbedOp },
}

impl Node {
    /// Name and value of a global `set`, used for load-time hoisting and
    /// registration-time inspection.
    pub fn as_global_set(&self) -> Option<(&str, &Value)> {
        match self {
            Node::SetVar { scope: Scope::Global, name, value } => Some((name, value)),
            _ => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Node::Config { .. })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_literal() {
        assert_eq!(Value::Str("hi".into()).as_literal(), Some("hi"));
        assert_eq!(Value::Number("42".into()).as_literal(), Some("42"));
        assert_eq!(Value::Bool(true).as_literal(), Some("true"));
        assert_eq!(Value::Var("X".into()).as_literal(), None);
    }

    #[test]
    fn as_global_set() {
        let node = Node::SetVar {
            scope: Scope::Global,
            name: "PREFIX".into(),
            value: Value::Str("!".into()),
        };
        let (name, value) = node.as_global_set().unwrap();
        assert_eq!(name, "PREFIX");
        assert_eq!(value, &Value::Str("!".into()));

        let local = Node::SetVar {
            scope: Scope::Local,
            name: "x".into(),
            value: Value::Number("1".into()),
        };
        assert!(local.as_global_set().is_none());
    }

    #[test]
    fn is_config() {
        assert!(Node::Config { name: "DEFAULT".into() }.is_config());
        assert!(!Node::Send { message: Value::Str("hi".into()), channel: None }.is_config());
    }
}
