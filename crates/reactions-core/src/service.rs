//! Reaction toggle orchestration.
//!
//! [`ReactionService`] is the only entry point external collaborators use.
//! It validates input, consults the [`EmojiPolicy`], performs the atomic
//! flip through the [`ReactionStore`] and hands back sanitized views.
//!
//! # Toggle pipeline
//!
//! ```text
//! toggle(item, symbol, user)
//!     |-- validate non-empty inputs ----------> Validation
//!     |-- policy.slot(item, symbol) ----------> Policy
//!     |-- store.flip(slot, user)  (atomic) ---> Store
//!     +-- store.get_counts(item) -> sanitize -> ToggleResult
//! ```
//!
//! Toggles are not idempotent: two calls flip twice. The service does not
//! retry and does not deduplicate; callers must not deliver the same click
//! twice.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::try_join_all;
use reactions_db::ReactionStore;
use reactions_types::{
    CountsView, ItemId, Reactable, ReactionSummary, Symbol, ToggleResult, UserId,
};
use tracing::{debug, error, info};

use crate::error::ReactionError;
use crate::policy::EmojiPolicy;

/// Toggle and aggregation engine for post reactions.
///
/// Cheap to clone; clones share the store and the policy.
#[derive(Debug, Clone)]
pub struct ReactionService {
    store: ReactionStore,
    policy: Arc<EmojiPolicy>,
}

impl ReactionService {
    /// Create a service over `store` enforcing `policy`.
    pub const fn new(store: ReactionStore, policy: Arc<EmojiPolicy>) -> Self {
        Self { store, policy }
    }

    /// The allow-list in force.
    pub fn policy(&self) -> &EmojiPolicy {
        &self.policy
    }

    /// The backing store.
    pub const fn store(&self) -> &ReactionStore {
        &self.store
    }

    /// Allowed symbols in display order.
    pub fn allowed_symbols(&self) -> &[Symbol] {
        self.policy.symbols()
    }

    /// Flip `user`'s reaction `symbol` on `item` and return the item's
    /// sanitized counts.
    ///
    /// # Errors
    ///
    /// - [`ReactionError::Validation`] if any input is blank.
    /// - [`ReactionError::Policy`] if `symbol` is not allowed.
    /// - [`ReactionError::Store`] if the backend fails.
    pub async fn toggle(
        &self,
        item: &ItemId,
        symbol: &Symbol,
        user: &UserId,
    ) -> Result<ToggleResult, ReactionError> {
        require(!item.is_empty(), "itemId")?;
        require(!symbol.is_empty(), "symbol")?;
        require(!user.is_empty(), "userId")?;

        let slot = self.policy.slot(item, symbol).inspect_err(|err| {
            debug!(%item, %symbol, %user, %err, "Reaction rejected by policy");
        })?;

        let outcome = self.store.flip(&slot, user).await.inspect_err(|err| {
            error!(%item, %symbol, %user, %err, "Reaction toggle failed");
        })?;

        let counts = self.sanitized_counts(item).await?;
        debug!(
            %item,
            %symbol,
            %user,
            state = ?outcome.state,
            count = outcome.count,
            "Reaction toggled"
        );

        Ok(ToggleResult {
            item_id: item.clone(),
            symbol: symbol.clone(),
            state: outcome.state,
            counts,
        })
    }

    /// Decorate `item` with its sanitized counts and the symbols `user`
    /// currently reacts with. A missing or blank `user` gets an empty list.
    ///
    /// Only symbols present in the sanitized counts are checked for
    /// membership.
    ///
    /// # Errors
    ///
    /// - [`ReactionError::Validation`] if the item id is blank.
    /// - [`ReactionError::Store`] if the backend fails; `item` is left
    ///   untouched in that case.
    pub async fn attach<R>(&self, item: &mut R, user: Option<&UserId>) -> Result<(), ReactionError>
    where
        R: Reactable + ?Sized,
    {
        let item_id = item.item_id().clone();
        let counts = self.counts(&item_id).await?;

        let my_reactions = match user.filter(|u| !u.is_empty()) {
            Some(user) => self.active_symbols(&item_id, &counts, user).await?,
            None => Vec::new(),
        };

        item.set_reactions(counts, my_reactions);
        Ok(())
    }

    /// Build a [`ReactionSummary`] for `item` as seen by `user`.
    ///
    /// # Errors
    ///
    /// Same as [`ReactionService::attach`].
    pub async fn summary(
        &self,
        item: &ItemId,
        user: Option<&UserId>,
    ) -> Result<ReactionSummary, ReactionError> {
        let mut summary = ReactionSummary::new(item.clone());
        self.attach(&mut summary, user).await?;
        Ok(summary)
    }

    /// Sanitized counts for `item`.
    ///
    /// # Errors
    ///
    /// - [`ReactionError::Validation`] if the item id is blank.
    /// - [`ReactionError::Store`] if the backend fails.
    pub async fn counts(&self, item: &ItemId) -> Result<CountsView, ReactionError> {
        require(!item.is_empty(), "itemId")?;
        self.sanitized_counts(item).await
    }

    /// Users currently reacting with `symbol` on `item`, sorted.
    ///
    /// # Errors
    ///
    /// - [`ReactionError::Validation`] if an input is blank.
    /// - [`ReactionError::Policy`] if `symbol` is not allowed.
    /// - [`ReactionError::Store`] if the backend fails.
    pub async fn reactors(
        &self,
        item: &ItemId,
        symbol: &Symbol,
    ) -> Result<Vec<UserId>, ReactionError> {
        require(!item.is_empty(), "itemId")?;
        require(!symbol.is_empty(), "symbol")?;
        let slot = self.policy.slot(item, symbol)?;
        Ok(self.store.members(&slot).await?)
    }

    /// Remove every reaction from `item`, e.g. after the post is purged.
    /// Returns the number of memberships removed.
    ///
    /// Symbols that hold data but are no longer allowed are cleared too.
    ///
    /// # Errors
    ///
    /// - [`ReactionError::Validation`] if the item id is blank.
    /// - [`ReactionError::Store`] if the backend fails. Slots cleared
    ///   before the failure stay cleared.
    pub async fn purge(&self, item: &ItemId) -> Result<u64, ReactionError> {
        require(!item.is_empty(), "itemId")?;

        let mut symbols: BTreeSet<Symbol> = self.policy.symbols().iter().cloned().collect();
        symbols.extend(self.store.get_counts(item).await?.into_keys());

        let mut removed: u64 = 0;
        for symbol in &symbols {
            let slot = EmojiPolicy::slot_unchecked(item, symbol);
            removed = removed.saturating_add(self.store.clear_slot(&slot).await?);
        }

        info!(%item, removed, "Reactions purged");
        Ok(removed)
    }

    async fn sanitized_counts(&self, item: &ItemId) -> Result<CountsView, ReactionError> {
        let raw = self.store.get_counts(item).await?;
        Ok(CountsView::sanitize(raw))
    }

    /// Membership checks for every symbol in `counts`, run concurrently.
    async fn active_symbols(
        &self,
        item: &ItemId,
        counts: &CountsView,
        user: &UserId,
    ) -> Result<Vec<Symbol>, ReactionError> {
        let checks = counts.symbols().map(|symbol| async move {
            let slot = EmojiPolicy::slot_unchecked(item, symbol);
            let member = self.store.is_member(&slot, user).await?;
            Ok::<_, ReactionError>(member.then(|| symbol.clone()))
        });
        let results = try_join_all(checks).await?;
        Ok(results.into_iter().flatten().collect())
    }
}

/// Fail with [`ReactionError::Validation`] naming `field` unless `present`.
const fn require(present: bool, field: &'static str) -> Result<(), ReactionError> {
    if present {
        Ok(())
    } else {
        Err(ReactionError::Validation(field))
    }
}
