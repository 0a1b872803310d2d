//! Reaction symbols and the storage slot they address.
//!
//! A [`Symbol`] is the raw reaction (an emoji). A [`SymbolKey`] is its
//! encoded form, safe to embed as a segment of a composite storage key.
//! A [`ReactionSlot`] pairs an item with a symbol and its key and is the
//! unit the store operates on.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ItemId;

/// A reaction symbol, e.g. `👍`. Surrounding whitespace is trimmed on
/// construction and on deserialization.
///
/// Whether a symbol is permitted is decided by the allow-list in the core
/// crate; this type only carries the value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(from = "String")]
#[ts(export, export_to = "bindings/")]
pub struct Symbol(String);

impl Symbol {
    /// Wrap a raw symbol. Surrounding whitespace is trimmed.
    pub fn new(symbol: impl Into<String>) -> Self {
        let raw: String = symbol.into();
        let trimmed = raw.trim();
        if trimmed.len() == raw.len() {
            Self(raw)
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// Borrow the raw symbol.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the symbol is empty (i.e. missing).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for Symbol {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl From<String> for Symbol {
    fn from(symbol: String) -> Self {
        Self::new(symbol)
    }
}

/// Encoded form of a [`Symbol`] used inside storage keys.
///
/// Only produced by an injective encoder (see `EmojiPolicy::encode_key`),
/// so two distinct symbols never share a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolKey(String);

impl SymbolKey {
    /// Wrap an already-encoded key segment.
    pub const fn from_encoded(encoded: String) -> Self {
        Self(encoded)
    }

    /// Borrow the encoded segment.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (item, symbol) pair together with the symbol's encoded key.
///
/// Membership and counter mutations are serialized per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionSlot {
    item: ItemId,
    symbol: Symbol,
    key: SymbolKey,
}

impl ReactionSlot {
    /// Build a slot from its parts.
    pub const fn new(item: ItemId, symbol: Symbol, key: SymbolKey) -> Self {
        Self { item, symbol, key }
    }

    /// The content item.
    pub const fn item(&self) -> &ItemId {
        &self.item
    }

    /// The raw symbol.
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// The encoded symbol key segment.
    pub const fn key(&self) -> &SymbolKey {
        &self.key
    }
}
