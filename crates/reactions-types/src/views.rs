//! Read models handed to collaborators: counts views, toggle results,
//! decorated items and live update payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ItemId, UserId};
use crate::state::ReactorState;
use crate::symbol::Symbol;

/// Symbol to count mapping for one item, holding only positive counts.
///
/// The only way in is [`CountsView::sanitize`] (or deserialization, which
/// applies the same filter), so a zero or negative entry can never be
/// exposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountsView(BTreeMap<Symbol, u64>);

impl<'de> Deserialize<'de> for CountsView {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<Symbol, u64>::deserialize(deserializer)?;
        Ok(Self(raw.into_iter().filter(|(_, count)| *count > 0).collect()))
    }
}

impl CountsView {
    /// Build a view from raw store counters, dropping every entry `<= 0`.
    pub fn sanitize<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, i64)>,
    {
        Self(
            raw.into_iter()
                .filter_map(|(symbol, count)| {
                    u64::try_from(count)
                        .ok()
                        .filter(|c| *c > 0)
                        .map(|c| (symbol, c))
                })
                .collect(),
        )
    }

    /// Count for a symbol, if it has any reactors.
    pub fn get(&self, symbol: &Symbol) -> Option<u64> {
        self.0.get(symbol).copied()
    }

    /// Symbols with at least one reactor, in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.0.keys()
    }

    /// Iterate `(symbol, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, u64)> {
        self.0.iter().map(|(s, c)| (s, *c))
    }

    /// Number of symbols with at least one reactor.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no symbol has a reactor.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a toggle returns to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ToggleResult {
    /// The toggled item.
    pub item_id: ItemId,
    /// The toggled symbol.
    pub symbol: Symbol,
    /// The caller's state for this symbol after the toggle.
    pub state: ReactorState,
    /// Sanitized counts for the whole item after the toggle.
    #[ts(type = "Record<string, number>")]
    pub counts: CountsView,
}

/// Something the rendering layer can decorate with reaction data.
pub trait Reactable {
    /// The item's identifier.
    fn item_id(&self) -> &ItemId;

    /// Store the item's counts and the viewer's active symbols.
    fn set_reactions(&mut self, reactions: CountsView, my_reactions: Vec<Symbol>);
}

/// Reaction data for one item as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ReactionSummary {
    /// The item (post) identifier.
    pub pid: ItemId,
    /// Sanitized counts.
    #[ts(type = "Record<string, number>")]
    pub reactions: CountsView,
    /// Symbols the viewer currently reacts with.
    pub my_reactions: Vec<Symbol>,
}

impl ReactionSummary {
    /// An undecorated summary for `pid`.
    pub fn new(pid: ItemId) -> Self {
        Self {
            pid,
            reactions: CountsView::default(),
            my_reactions: Vec::new(),
        }
    }
}

impl Reactable for ReactionSummary {
    fn item_id(&self) -> &ItemId {
        &self.pid
    }

    fn set_reactions(&mut self, reactions: CountsView, my_reactions: Vec<Symbol>) {
        self.reactions = reactions;
        self.my_reactions = my_reactions;
    }
}

/// Live update pushed to subscribers after each completed toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ReactionUpdate {
    /// The item whose counts changed.
    pub item_id: ItemId,
    /// The symbol that was toggled.
    pub symbol: Symbol,
    /// Who toggled it.
    pub user_id: UserId,
    /// That user's state after the toggle.
    pub state: ReactorState,
    /// Sanitized counts after the toggle.
    #[ts(type = "Record<string, number>")]
    pub counts: CountsView,
    /// When the toggle completed.
    pub at: DateTime<Utc>,
}
