//! `Dragonfly` (Redis-compatible) reaction storage.
//!
//! Every mutation runs as a server-side Lua script, so the membership
//! change and the counter change for a slot are applied as one unit by the
//! server. No client-side lock is needed and a dropped request either ran
//! the whole script or none of it.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `post:{item}:reactions` | Hash | raw symbol -> counter |
//! | `post:{item}:reaction:{symbol key}` | Set | user ids reacting with the symbol |
//!
//! `{item}` is percent-encoded here; `{symbol key}` arrives already
//! encoded inside the [`ReactionSlot`].

use std::collections::{BTreeMap, HashMap};

use fred::interfaces::LuaInterface;
use fred::prelude::*;
use reactions_types::{ItemId, ReactionSlot, ReactorState, Symbol, ToggleOutcome, UserId};

use crate::error::DbError;

/// KEYS: members, counts. ARGV: symbol, user, "1" to activate or "0".
/// Returns the counter after the call.
const APPLY_SCRIPT: &str = r"
local changed
if ARGV[3] == '1' then
  changed = redis.call('SADD', KEYS[1], ARGV[2])
else
  changed = redis.call('SREM', KEYS[1], ARGV[2])
end
if changed == 1 then
  local delta = 1
  if ARGV[3] ~= '1' then delta = -1 end
  return redis.call('HINCRBY', KEYS[2], ARGV[1], delta)
end
return tonumber(redis.call('HGET', KEYS[2], ARGV[1]) or '0')
";

/// KEYS: members, counts. ARGV: symbol, user.
/// Returns `{state, count}` where state is 1 when now active.
const FLIP_SCRIPT: &str = r"
if redis.call('SISMEMBER', KEYS[1], ARGV[2]) == 1 then
  redis.call('SREM', KEYS[1], ARGV[2])
  return {0, redis.call('HINCRBY', KEYS[2], ARGV[1], -1)}
end
redis.call('SADD', KEYS[1], ARGV[2])
return {1, redis.call('HINCRBY', KEYS[2], ARGV[1], 1)}
";

/// KEYS: members, counts. ARGV: symbol.
/// Returns how many reactors were removed.
const CLEAR_SCRIPT: &str = r"
local removed = redis.call('SCARD', KEYS[1])
redis.call('DEL', KEYS[1])
redis.call('HDEL', KEYS[2], ARGV[1])
return removed
";

/// KEYS: members, counts. ARGV: symbol.
/// Returns `{members, count}`.
const AUDIT_SCRIPT: &str = r"
return {redis.call('SCARD', KEYS[1]), tonumber(redis.call('HGET', KEYS[2], ARGV[1]) or '0')}
";

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`] and provides the reaction operations
/// over the key patterns above.
#[derive(Clone)]
pub struct DragonflyStore {
    client: Client,
}

impl std::fmt::Debug for DragonflyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragonflyStore").finish_non_exhaustive()
    }
}

impl DragonflyStore {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    // =========================================================================
    // Keys
    // =========================================================================

    /// `post:{item}:reactions`
    fn counts_key(item: &ItemId) -> String {
        format!("post:{}:reactions", urlencoding::encode(item.as_str()))
    }

    /// `post:{item}:reaction:{symbol key}`
    fn members_key(slot: &ReactionSlot) -> String {
        format!(
            "post:{}:reaction:{}",
            urlencoding::encode(slot.item().as_str()),
            slot.key()
        )
    }

    /// Both keys a slot script touches, members first.
    fn slot_keys(slot: &ReactionSlot) -> Vec<String> {
        vec![Self::members_key(slot), Self::counts_key(slot.item())]
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Whether `user` is in the slot's membership set (`SISMEMBER`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn is_member(&self, slot: &ReactionSlot, user: &UserId) -> Result<bool, DbError> {
        let member: bool = self
            .client
            .sismember(Self::members_key(slot), user.as_str())
            .await?;
        Ok(member)
    }

    /// Raw counters for `item` (`HGETALL`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails or a counter is not
    /// an integer.
    pub async fn get_counts(&self, item: &ItemId) -> Result<BTreeMap<Symbol, i64>, DbError> {
        let raw: HashMap<String, i64> = self.client.hgetall(Self::counts_key(item)).await?;
        Ok(raw
            .into_iter()
            .map(|(symbol, count)| (Symbol::new(symbol), count))
            .collect())
    }

    /// Users in the slot's membership set (`SMEMBERS`), sorted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn members(&self, slot: &ReactionSlot) -> Result<Vec<UserId>, DbError> {
        let raw: Vec<String> = self.client.smembers(Self::members_key(slot)).await?;
        let mut users: Vec<UserId> = raw.into_iter().map(UserId::new).collect();
        users.sort();
        Ok(users)
    }

    /// Membership size and counter for `slot`, read inside one script.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the script fails.
    /// Returns [`DbError::Malformed`] if the reply cannot be interpreted.
    pub async fn audit(&self, slot: &ReactionSlot) -> Result<(usize, i64), DbError> {
        let reply: Vec<i64> = self
            .client
            .eval(
                AUDIT_SCRIPT,
                Self::slot_keys(slot),
                vec![slot.symbol().as_str().to_owned()],
            )
            .await?;
        let malformed = |message: String| DbError::Malformed {
            key: Self::members_key(slot),
            message,
        };
        match reply.as_slice() {
            [members, count] => {
                let members = usize::try_from(*members)
                    .map_err(|e| malformed(format!("set size out of range: {e}")))?;
                Ok((members, *count))
            }
            other => Err(malformed(format!("expected {{members, count}}, got {other:?}"))),
        }
    }

    // =========================================================================
    // Atomic mutations
    // =========================================================================

    /// Put `user` into the requested state for `slot` and return the count.
    ///
    /// Re-applying the current state leaves both structures untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the script fails.
    pub async fn apply_toggle(
        &self,
        slot: &ReactionSlot,
        user: &UserId,
        activate: bool,
    ) -> Result<i64, DbError> {
        let flag = if activate { "1" } else { "0" };
        let count: i64 = self
            .client
            .eval(
                APPLY_SCRIPT,
                Self::slot_keys(slot),
                vec![
                    slot.symbol().as_str().to_owned(),
                    user.as_str().to_owned(),
                    flag.to_owned(),
                ],
            )
            .await?;
        Ok(count)
    }

    /// Atomically read the user's state for `slot` and move to the other one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the script fails.
    /// Returns [`DbError::Malformed`] if the script reply is not `{state, count}`.
    pub async fn flip(&self, slot: &ReactionSlot, user: &UserId) -> Result<ToggleOutcome, DbError> {
        let reply: Vec<i64> = self
            .client
            .eval(
                FLIP_SCRIPT,
                Self::slot_keys(slot),
                vec![slot.symbol().as_str().to_owned(), user.as_str().to_owned()],
            )
            .await?;
        match reply.as_slice() {
            [state, count] => Ok(ToggleOutcome {
                state: ReactorState::from_membership(*state == 1),
                count: *count,
            }),
            other => Err(DbError::Malformed {
                key: Self::members_key(slot),
                message: format!("expected {{state, count}}, got {other:?}"),
            }),
        }
    }

    /// Delete the slot's membership set and its counter field.
    /// Returns how many reactors were removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the script fails.
    pub async fn clear_slot(&self, slot: &ReactionSlot) -> Result<u64, DbError> {
        let removed: u64 = self
            .client
            .eval(
                CLEAR_SCRIPT,
                Self::slot_keys(slot),
                vec![slot.symbol().as_str().to_owned()],
            )
            .await?;
        Ok(removed)
    }

    /// Flush all keys from the `Dragonfly` instance.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), DbError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }

    /// Close the connection (`QUIT`). Later calls on this store fail with
    /// [`DbError::Dragonfly`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the client cannot shut down cleanly.
    pub async fn close(&self) -> Result<(), DbError> {
        self.client.quit().await?;
        tracing::info!("Disconnected from Dragonfly");
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}
