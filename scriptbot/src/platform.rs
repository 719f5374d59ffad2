//! Chat-platform adapter boundary.
//!
//! The interpreter never touches a chat network directly; every observable
//! effect goes through the [`ChatPlatform`] trait.  Adapter calls are the
//! only suspension points of a script execution, so the trait is async.
//!
//! Ids are numeric on the wire but travel through the scripting pipeline as
//! opaque strings; they are parsed into these newtypes only at this
//! boundary.

use std::fmt;

use crate::embed::EmbedDraft;
use crate::error::PlatformError;

pub mod console;

// ── Ids ───────────────────────────────────────────────────────────────────────

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// A guild (server) id.
    GuildId
);
id_type!(
    /// A text-channel id.
    ChannelId
);
id_type!(
    /// A message id, assigned by the platform on send.
    MessageId
);
id_type!(
    /// A guild-member id.
    MemberId
);
id_type!(
    /// A role id.
    RoleId
);

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub guild: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub guild: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub guild: GuildId,
    pub name: String,
}

/// What a sent message carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Embed(EmbedDraft),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub channel: ChannelId,
    pub body: MessageBody,
}

// ── ChatPlatform ──────────────────────────────────────────────────────────────

/// The capability set the interpreter consumes.
///
/// Implementations make their own consistency guarantees for the platform
/// state they expose; the scripting core makes none.
// async fn is fine here: executions in this crate are awaited in place, so
// callers never need extra send bounds on the returned futures.
#[allow(async_fn_in_trait)]
pub trait ChatPlatform: Send + Sync {
    /// Look up a guild by id.
    async fn resolve_guild(&self, id: GuildId) -> Result<Guild, PlatformError>;

    /// The first guild the platform knows, used when a script sets no
    /// `GUILD` of its own.
    async fn first_guild(&self) -> Result<Guild, PlatformError>;

    /// Look up a channel by id across every guild the platform knows.
    async fn resolve_channel(&self, id: ChannelId) -> Result<Channel, PlatformError>;

    /// Send plain text; returns the platform-assigned message id.
    async fn send_text(&self, channel: ChannelId, text: &str) -> Result<MessageId, PlatformError>;

    /// Send a built embed; returns the platform-assigned message id.
    async fn send_embed(
        &self,
        channel: ChannelId,
        embed: &EmbedDraft,
    ) -> Result<MessageId, PlatformError>;

    /// Fetch a previously sent message from a channel.
    async fn fetch_message(
        &self,
        channel: ChannelId,
        id: MessageId,
    ) -> Result<Message, PlatformError>;

    /// Add an emoji reaction to a fetched message.
    async fn add_reaction(&self, message: &Message, emoji: &str) -> Result<(), PlatformError>;

    /// Look up a member within a guild.
    async fn resolve_member(
        &self,
        guild: GuildId,
        id: MemberId,
    ) -> Result<Member, PlatformError>;

    /// Look up a role within a guild.
    async fn resolve_role(&self, guild: GuildId, id: RoleId) -> Result<Role, PlatformError>;

    /// Grant a role to a member.
    async fn add_role(&self, member: &Member, role: &Role) -> Result<(), PlatformError>;

    /// Revoke a role from a member.
    async fn remove_role(&self, member: &Member, role: &Role) -> Result<(), PlatformError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_is_bare_number() {
        assert_eq!(GuildId(100).to_string(), "100");
        assert_eq!(MessageId(u64::MAX).to_string(), u64::MAX.to_string());
    }

    #[test]
    fn ids_are_distinct_types() {
        // Compile-time property really; this just pins the wrapper shape.
        let g = GuildId(1);
        let c = ChannelId(1);
        assert_eq!(g.0, c.0);
    }
}
