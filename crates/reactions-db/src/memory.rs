//! In-process reaction store.
//!
//! Each (item, symbol) slot owns its membership set and its counter behind
//! one [`tokio::sync::Mutex`]. Every mutation of a slot happens while that
//! mutex is held and contains no `.await` between the set change and the
//! counter change, so a toggle is all-or-nothing even if the calling
//! future is dropped.
//!
//! Slots are never removed once created, even when their count returns to
//! zero: a task may already hold a clone of the slot's `Arc` and be
//! waiting on its lock, and removing the slot would orphan that update.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use reactions_types::{ItemId, ReactionSlot, ReactorState, Symbol, SymbolKey, ToggleOutcome, UserId};
use tokio::sync::{Mutex, RwLock};

/// Membership set and counter for one slot.
#[derive(Debug, Default)]
struct SlotState {
    members: BTreeSet<UserId>,
    count: i64,
}

impl SlotState {
    /// Move `user` into the requested state and adjust the counter when
    /// membership actually changed. Returns the new count.
    fn apply(&mut self, user: &UserId, activate: bool) -> i64 {
        if activate {
            if self.members.insert(user.clone()) {
                self.count = self.count.saturating_add(1);
            }
        } else if self.members.remove(user) {
            self.count = self.count.saturating_sub(1);
        }
        self.count
    }
}

/// A slot cell together with the raw symbol it counts.
#[derive(Debug, Clone)]
struct SlotEntry {
    symbol: Symbol,
    cell: Arc<Mutex<SlotState>>,
}

/// Reaction store backed by process memory.
///
/// Cheap to clone; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<RwLock<HashMap<ItemId, BTreeMap<SymbolKey, SlotEntry>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cell for `slot` without creating it.
    async fn find(&self, slot: &ReactionSlot) -> Option<Arc<Mutex<SlotState>>> {
        let items = self.items.read().await;
        items
            .get(slot.item())
            .and_then(|slots| slots.get(slot.key()))
            .map(|entry| Arc::clone(&entry.cell))
    }

    /// Look up the cell for `slot`, creating an empty one on first use.
    async fn cell(&self, slot: &ReactionSlot) -> Arc<Mutex<SlotState>> {
        if let Some(cell) = self.find(slot).await {
            return cell;
        }
        let mut items = self.items.write().await;
        let entry = items
            .entry(slot.item().clone())
            .or_default()
            .entry(slot.key().clone())
            .or_insert_with(|| SlotEntry {
                symbol: slot.symbol().clone(),
                cell: Arc::new(Mutex::new(SlotState::default())),
            });
        Arc::clone(&entry.cell)
    }

    /// Whether `user` is in the slot's membership set.
    pub async fn is_member(&self, slot: &ReactionSlot, user: &UserId) -> bool {
        match self.find(slot).await {
            Some(cell) => cell.lock().await.members.contains(user),
            None => false,
        }
    }

    /// Raw counters for every slot ever touched on `item`.
    pub async fn get_counts(&self, item: &ItemId) -> BTreeMap<Symbol, i64> {
        let entries: Vec<SlotEntry> = {
            let items = self.items.read().await;
            items
                .get(item)
                .map(|slots| slots.values().cloned().collect())
                .unwrap_or_default()
        };
        let mut counts = BTreeMap::new();
        for entry in entries {
            let count = entry.cell.lock().await.count;
            counts.insert(entry.symbol, count);
        }
        counts
    }

    /// Put `user` into the requested state for `slot`. Returns the count.
    pub async fn apply_toggle(&self, slot: &ReactionSlot, user: &UserId, activate: bool) -> i64 {
        let cell = self.cell(slot).await;
        let mut state = cell.lock().await;
        state.apply(user, activate)
    }

    /// Atomically read the user's state for `slot` and move to the other one.
    pub async fn flip(&self, slot: &ReactionSlot, user: &UserId) -> ToggleOutcome {
        let cell = self.cell(slot).await;
        let mut state = cell.lock().await;
        let next = ReactorState::from_membership(state.members.contains(user)).flipped();
        let count = state.apply(user, next.is_active());
        ToggleOutcome { state: next, count }
    }

    /// Users currently reacting in `slot`, in sorted order.
    pub async fn members(&self, slot: &ReactionSlot) -> Vec<UserId> {
        match self.find(slot).await {
            Some(cell) => cell.lock().await.members.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Empty the slot's membership and reset its counter.
    /// Returns how many reactors were removed.
    pub async fn clear_slot(&self, slot: &ReactionSlot) -> u64 {
        let Some(cell) = self.find(slot).await else {
            return 0;
        };
        let mut state = cell.lock().await;
        let removed = u64::try_from(state.members.len()).unwrap_or(u64::MAX);
        state.members.clear();
        state.count = 0;
        removed
    }

    /// Membership size and counter for `slot`, read under one lock.
    pub async fn audit(&self, slot: &ReactionSlot) -> (usize, i64) {
        match self.find(slot).await {
            Some(cell) => {
                let state = cell.lock().await;
                (state.members.len(), state.count)
            }
            None => (0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(item: &str, symbol: &str) -> ReactionSlot {
        ReactionSlot::new(
            ItemId::new(item),
            Symbol::new(symbol),
            SymbolKey::from_encoded(urlencoding::encode(symbol).into_owned()),
        )
    }

    #[tokio::test]
    async fn flip_adds_then_removes() {
        let store = MemoryStore::new();
        let s = slot("42", "👍");
        let u = UserId::new("u1");

        let on = store.flip(&s, &u).await;
        assert_eq!(on, ToggleOutcome { state: ReactorState::Active, count: 1 });
        assert!(store.is_member(&s, &u).await);

        let off = store.flip(&s, &u).await;
        assert_eq!(off, ToggleOutcome { state: ReactorState::Inactive, count: 0 });
        assert!(!store.is_member(&s, &u).await);
    }

    #[tokio::test]
    async fn redundant_apply_does_not_drift() {
        let store = MemoryStore::new();
        let s = slot("1", "🎉");
        let u = UserId::new("u1");

        assert_eq!(store.apply_toggle(&s, &u, true).await, 1);
        assert_eq!(store.apply_toggle(&s, &u, true).await, 1);
        assert_eq!(store.apply_toggle(&s, &u, false).await, 0);
        assert_eq!(store.apply_toggle(&s, &u, false).await, 0);
        assert_eq!(store.audit(&s).await, (0, 0));
    }

    #[tokio::test]
    async fn counts_keep_zero_entries_internally() {
        let store = MemoryStore::new();
        let s = slot("7", "😂");
        let u = UserId::new("u1");
        store.flip(&s, &u).await;
        store.flip(&s, &u).await;

        let counts = store.get_counts(&ItemId::new("7")).await;
        assert_eq!(counts.get(&Symbol::new("😂")), Some(&0));
    }

    #[tokio::test]
    async fn unknown_item_reads_empty() {
        let store = MemoryStore::new();
        assert!(store.get_counts(&ItemId::new("none")).await.is_empty());
        assert!(store.members(&slot("none", "👍")).await.is_empty());
        assert_eq!(store.clear_slot(&slot("none", "👍")).await, 0);
    }

    #[tokio::test]
    async fn clear_slot_resets_membership_and_count() {
        let store = MemoryStore::new();
        let s = slot("9", "👀");
        store.flip(&s, &UserId::new("a")).await;
        store.flip(&s, &UserId::new("b")).await;

        assert_eq!(store.clear_slot(&s).await, 2);
        assert_eq!(store.audit(&s).await, (0, 0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_flips_from_distinct_users_are_not_lost() {
        let store = MemoryStore::new();
        let s = slot("42", "👍");

        let mut handles = Vec::new();
        for n in 0..50_u32 {
            let store = store.clone();
            let s = s.clone();
            handles.push(tokio::spawn(async move {
                store.flip(&s, &UserId::new(format!("user{n}"))).await
            }));
        }
        for handle in handles {
            assert!(handle.await.is_ok());
        }

        assert_eq!(store.audit(&s).await, (50, 50));
    }
}
