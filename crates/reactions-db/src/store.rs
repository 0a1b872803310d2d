//! Backend-agnostic reaction store.
//!
//! Uses enum dispatch instead of trait objects because async methods are
//! not dyn-compatible. Every backend honours the same contract: the
//! membership change and the counter change of a slot are one atomic unit
//! with respect to any other mutation of the same slot.

use std::collections::BTreeMap;

use reactions_types::{ItemId, ReactionSlot, Symbol, ToggleOutcome, UserId};

use crate::dragonfly::DragonflyStore;
use crate::error::DbError;
use crate::memory::MemoryStore;

/// A keyed store for reaction membership sets and counters.
#[derive(Debug, Clone)]
pub enum ReactionStore {
    /// Process-local store with per-slot locks.
    Memory(MemoryStore),
    /// `Dragonfly` store with server-side scripts.
    Dragonfly(DragonflyStore),
}

impl ReactionStore {
    /// A fresh, empty in-memory store.
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Connect to `Dragonfly` at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the URL is invalid or the connection fails.
    pub async fn dragonfly(url: &str) -> Result<Self, DbError> {
        Ok(Self::Dragonfly(DragonflyStore::connect(url).await?))
    }

    /// Human-readable backend name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Dragonfly(_) => "dragonfly",
        }
    }

    /// Whether `user` is in the slot's membership set.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read fails.
    pub async fn is_member(&self, slot: &ReactionSlot, user: &UserId) -> Result<bool, DbError> {
        match self {
            Self::Memory(store) => Ok(store.is_member(slot, user).await),
            Self::Dragonfly(store) => store.is_member(slot, user).await,
        }
    }

    /// Raw counters for `item`. May contain zero or negative entries.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read fails.
    pub async fn get_counts(&self, item: &ItemId) -> Result<BTreeMap<Symbol, i64>, DbError> {
        match self {
            Self::Memory(store) => Ok(store.get_counts(item).await),
            Self::Dragonfly(store) => store.get_counts(item).await,
        }
    }

    /// Put `user` into the requested state for `slot` atomically and return
    /// the new count. Re-applying the current state changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend write fails; state is unchanged.
    pub async fn apply_toggle(
        &self,
        slot: &ReactionSlot,
        user: &UserId,
        activate: bool,
    ) -> Result<i64, DbError> {
        match self {
            Self::Memory(store) => Ok(store.apply_toggle(slot, user, activate).await),
            Self::Dragonfly(store) => store.apply_toggle(slot, user, activate).await,
        }
    }

    /// Read the user's membership and apply the opposite state, as one
    /// atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend write fails; state is unchanged.
    pub async fn flip(&self, slot: &ReactionSlot, user: &UserId) -> Result<ToggleOutcome, DbError> {
        match self {
            Self::Memory(store) => Ok(store.flip(slot, user).await),
            Self::Dragonfly(store) => store.flip(slot, user).await,
        }
    }

    /// Users currently reacting in `slot`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read fails.
    pub async fn members(&self, slot: &ReactionSlot) -> Result<Vec<UserId>, DbError> {
        match self {
            Self::Memory(store) => Ok(store.members(slot).await),
            Self::Dragonfly(store) => store.members(slot).await,
        }
    }

    /// Remove every reactor from `slot` and reset its counter.
    /// Returns how many reactors were removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend write fails.
    pub async fn clear_slot(&self, slot: &ReactionSlot) -> Result<u64, DbError> {
        match self {
            Self::Memory(store) => Ok(store.clear_slot(slot).await),
            Self::Dragonfly(store) => store.clear_slot(slot).await,
        }
    }

    /// Membership size and counter for `slot`, observed together.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read fails.
    pub async fn audit(&self, slot: &ReactionSlot) -> Result<(usize, i64), DbError> {
        match self {
            Self::Memory(store) => Ok(store.audit(slot).await),
            Self::Dragonfly(store) => store.audit(slot).await,
        }
    }

    /// Release backend connections. A no-op for the memory backend.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot shut down cleanly.
    pub async fn close(&self) -> Result<(), DbError> {
        match self {
            Self::Memory(_) => Ok(()),
            Self::Dragonfly(store) => store.close().await,
        }
    }
}

impl From<MemoryStore> for ReactionStore {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

impl From<DragonflyStore> for ReactionStore {
    fn from(store: DragonflyStore) -> Self {
        Self::Dragonfly(store)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use proptest::prelude::*;
    use reactions_types::SymbolKey;

    use super::*;

    fn slot(symbol: &str) -> ReactionSlot {
        ReactionSlot::new(
            ItemId::new("42"),
            Symbol::new(symbol),
            SymbolKey::from_encoded(urlencoding::encode(symbol).into_owned()),
        )
    }

    #[test]
    fn memory_backend_is_named() {
        assert_eq!(ReactionStore::memory().name(), "memory");
    }

    #[tokio::test]
    async fn closing_memory_store_keeps_data() {
        let store = ReactionStore::memory();
        let s = slot("👍");
        store.flip(&s, &UserId::new("u1")).await.unwrap();

        store.close().await.unwrap();
        assert_eq!(store.audit(&s).await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn invalid_dragonfly_url_is_a_config_error() {
        let result = ReactionStore::dragonfly("not a url").await;
        assert!(matches!(result, Err(DbError::Config(_))));
    }

    proptest! {
        #[test]
        fn count_matches_membership_after_any_sequence(
            ops in proptest::collection::vec((0_u8..3, 0_u8..5, any::<Option<bool>>()), 0..64)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let symbols = ["👍", "🎉", "👀"];

            runtime.block_on(async {
                let store = ReactionStore::memory();
                for (symbol, user, activate) in &ops {
                    let s = slot(symbols.get(usize::from(*symbol)).copied().unwrap_or("👍"));
                    let u = UserId::new(format!("u{user}"));
                    let result = match activate {
                        Some(activate) => store.apply_toggle(&s, &u, *activate).await.map(|_| ()),
                        None => store.flip(&s, &u).await.map(|_| ()),
                    };
                    assert!(result.is_ok());
                }
                for symbol in symbols {
                    let (members, count) = store.audit(&slot(symbol)).await.unwrap();
                    assert_eq!(i64::try_from(members).ok(), Some(count));
                    assert!(count >= 0);
                }
            });
        }
    }
}
