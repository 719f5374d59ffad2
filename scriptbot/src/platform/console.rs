//! In-memory console platform.
//!
//! The simulated platform the binary and the test suite run against: guilds,
//! channels, members and roles are seeded up front, message ids are assigned
//! from a per-instance counter, and every side effect is recorded so it can
//! be inspected afterwards.  Effects are also logged through `tracing` so an
//! interactive session shows what the bot "did".
//!
//! All state sits behind one mutex that is never held across an await.

use std::sync::{Mutex, MutexGuard};

use tracing::info;

use crate::embed::EmbedDraft;
use crate::error::PlatformError;

use super::{
    Channel, ChannelId, ChatPlatform, Guild, GuildId, Member, MemberId, Message, MessageBody,
    MessageId, Role, RoleId,
};

// ── ConsolePlatform ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Inner {
    guilds: Vec<Guild>,
    channels: Vec<Channel>,
    members: Vec<Member>,
    roles: Vec<Role>,
    /// Every message sent through this platform, in send order.
    messages: Vec<Message>,
    /// Reactions added, in order: (message, emoji).
    reactions: Vec<(MessageId, String)>,
    /// Currently granted (member, role) pairs.
    grants: Vec<(MemberId, RoleId)>,
    next_message_id: u64,
}

/// A simulated chat platform backed by in-process state.
#[derive(Debug, Default)]
pub struct ConsolePlatform {
    inner: Mutex<Inner>,
}

impl ConsolePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Recover rather than panic if a test thread poisoned the lock.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Seeding ───────────────────────────────────────────────────────────────

    pub fn seed_guild(&self, id: GuildId, name: impl Into<String>) {
        self.lock().guilds.push(Guild { id, name: name.into() });
    }

    pub fn seed_channel(&self, id: ChannelId, guild: GuildId, name: impl Into<String>) {
        self.lock().channels.push(Channel { id, guild, name: name.into() });
    }

    pub fn seed_member(&self, id: MemberId, guild: GuildId, name: impl Into<String>) {
        self.lock().members.push(Member { id, guild, name: name.into() });
    }

    pub fn seed_role(&self, id: RoleId, guild: GuildId, name: impl Into<String>) {
        self.lock().roles.push(Role { id, guild, name: name.into() });
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    /// All messages sent so far, in send order.
    pub fn sent(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Emojis added to one message, in order.
    pub fn reactions(&self, id: MessageId) -> Vec<String> {
        self.lock()
            .reactions
            .iter()
            .filter(|(mid, _)| *mid == id)
            .map(|(_, emoji)| emoji.clone())
            .collect()
    }

    /// Whether the member currently holds the role.
    pub fn has_role(&self, member: MemberId, role: RoleId) -> bool {
        self.lock().grants.contains(&(member, role))
    }

    /// The first seeded channel, used as the operator channel by the
    /// interactive harness.
    pub fn operator_channel(&self) -> Option<ChannelId> {
        self.lock().channels.first().map(|c| c.id)
    }

    /// The first seeded guild's id, if any.
    pub fn operator_guild(&self) -> Option<GuildId> {
        self.lock().guilds.first().map(|g| g.id)
    }

    fn channel_name(inner: &Inner, id: ChannelId) -> String {
        inner
            .channels
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

// ── ChatPlatform impl ─────────────────────────────────────────────────────────

impl ChatPlatform for ConsolePlatform {
    async fn resolve_guild(&self, id: GuildId) -> Result<Guild, PlatformError> {
        self.lock()
            .guilds
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or(PlatformError::GuildNotFound(id))
    }

    async fn first_guild(&self) -> Result<Guild, PlatformError> {
        self.lock().guilds.first().cloned().ok_or(PlatformError::NoGuilds)
    }

    async fn resolve_channel(&self, id: ChannelId) -> Result<Channel, PlatformError> {
        // Search scope: all channels across all guilds.
        self.lock()
            .channels
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(PlatformError::ChannelNotFound(id))
    }

    async fn send_text(&self, channel: ChannelId, text: &str) -> Result<MessageId, PlatformError> {
        let mut inner = self.lock();
        if !inner.channels.iter().any(|c| c.id == channel) {
            return Err(PlatformError::ChannelNotFound(channel));
        }
        inner.next_message_id += 1;
        let id = MessageId(inner.next_message_id);
        info!("[#{}] {}", Self::channel_name(&inner, channel), text);
        inner.messages.push(Message { id, channel, body: MessageBody::Text(text.to_owned()) });
        Ok(id)
    }

    async fn send_embed(
        &self,
        channel: ChannelId,
        embed: &EmbedDraft,
    ) -> Result<MessageId, PlatformError> {
        let mut inner = self.lock();
        if !inner.channels.iter().any(|c| c.id == channel) {
            return Err(PlatformError::ChannelNotFound(channel));
        }
        inner.next_message_id += 1;
        let id = MessageId(inner.next_message_id);
        info!(
            "[#{}] embed: {} ({} fields)",
            Self::channel_name(&inner, channel),
            embed.title.as_deref().unwrap_or("<untitled>"),
            embed.fields.len(),
        );
        inner.messages.push(Message { id, channel, body: MessageBody::Embed(embed.clone()) });
        Ok(id)
    }

    async fn fetch_message(
        &self,
        channel: ChannelId,
        id: MessageId,
    ) -> Result<Message, PlatformError> {
        self.lock()
            .messages
            .iter()
            .find(|m| m.id == id && m.channel == channel)
            .cloned()
            .ok_or(PlatformError::MessageNotFound(id))
    }

    async fn add_reaction(&self, message: &Message, emoji: &str) -> Result<(), PlatformError> {
        let mut inner = self.lock();
        if !inner.messages.iter().any(|m| m.id == message.id) {
            return Err(PlatformError::MessageNotFound(message.id));
        }
        info!("reacted {} to message {}", emoji, message.id);
        inner.reactions.push((message.id, emoji.to_owned()));
        Ok(())
    }

    async fn resolve_member(
        &self,
        guild: GuildId,
        id: MemberId,
    ) -> Result<Member, PlatformError> {
        self.lock()
            .members
            .iter()
            .find(|m| m.id == id && m.guild == guild)
            .cloned()
            .ok_or(PlatformError::MemberNotFound(id, guild))
    }

    async fn resolve_role(&self, guild: GuildId, id: RoleId) -> Result<Role, PlatformError> {
        self.lock()
            .roles
            .iter()
            .find(|r| r.id == id && r.guild == guild)
            .cloned()
            .ok_or(PlatformError::RoleNotFound(id, guild))
    }

    async fn add_role(&self, member: &Member, role: &Role) -> Result<(), PlatformError> {
        let mut inner = self.lock();
        let pair = (member.id, role.id);
        if !inner.grants.contains(&pair) {
            inner.grants.push(pair);
        }
        info!("granted role '{}' to {}", role.name, member.name);
        Ok(())
    }

    async fn remove_role(&self, member: &Member, role: &Role) -> Result<(), PlatformError> {
        let mut inner = self.lock();
        let pair = (member.id, role.id);
        inner.grants.retain(|p| *p != pair);
        info!("revoked role '{}' from {}", role.name, member.name);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
