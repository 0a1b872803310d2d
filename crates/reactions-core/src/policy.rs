//! Emoji allow-list and storage key encoding.
//!
//! [`EmojiPolicy`] is built once from configuration and shared by
//! reference for the lifetime of the process. It answers two questions:
//! may this symbol be used, and what key segment addresses it in storage.
//!
//! Key segments are percent-encoded: every byte outside the unreserved set
//! (`A-Z a-z 0-9 - _ . ~`) becomes `%XX`. The encoding is injective and
//! reversible, and its output can never contain the `:` key separator.

use std::collections::HashSet;

use reactions_types::{ItemId, ReactionSlot, Symbol, SymbolKey};

use crate::config::AllowListConfig;

/// A symbol was rejected by the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The symbol is not one of the configured reactions.
    #[error("unsupported reaction: {0}")]
    NotAllowed(Symbol),
}

/// Immutable reaction allow-list plus key encoder.
#[derive(Debug, Clone)]
pub struct EmojiPolicy {
    /// Allowed symbols in configured display order.
    ordered: Vec<Symbol>,
    /// The same symbols for constant-time lookup.
    lookup: HashSet<Symbol>,
}

impl EmojiPolicy {
    /// Build a policy from symbols. Blank entries and repeats are skipped;
    /// first occurrence wins the display position.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let mut ordered = Vec::new();
        let mut lookup = HashSet::new();
        for symbol in symbols {
            let symbol: Symbol = symbol.into();
            if !symbol.is_empty() && lookup.insert(symbol.clone()) {
                ordered.push(symbol);
            }
        }
        Self { ordered, lookup }
    }

    /// Build the policy from the `reactions` config section.
    pub fn from_config(config: &AllowListConfig) -> Self {
        Self::new(config.allowed.iter().map(String::as_str))
    }

    /// Whether `symbol` is in the allow-list.
    pub fn is_allowed(&self, symbol: &Symbol) -> bool {
        self.lookup.contains(symbol)
    }

    /// Allowed symbols in display order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.ordered
    }

    /// Encode `symbol` as a storage key segment.
    pub fn encode_key(symbol: &Symbol) -> SymbolKey {
        SymbolKey::from_encoded(urlencoding::encode(symbol.as_str()).into_owned())
    }

    /// Recover the symbol behind a key segment produced by
    /// [`EmojiPolicy::encode_key`]. Returns `None` for segments that are
    /// not valid percent-encoded UTF-8.
    pub fn decode_key(key: &SymbolKey) -> Option<Symbol> {
        urlencoding::decode(key.as_str())
            .ok()
            .map(|decoded| Symbol::new(decoded.into_owned()))
    }

    /// The storage slot for `symbol` on `item`, if the symbol is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NotAllowed`] when `symbol` is not in the
    /// allow-list.
    pub fn slot(&self, item: &ItemId, symbol: &Symbol) -> Result<ReactionSlot, PolicyError> {
        if !self.is_allowed(symbol) {
            return Err(PolicyError::NotAllowed(symbol.clone()));
        }
        Ok(Self::slot_unchecked(item, symbol))
    }

    /// The storage slot for `symbol` on `item` without consulting the
    /// allow-list. Used for reads of symbols that already hold data.
    pub fn slot_unchecked(item: &ItemId, symbol: &Symbol) -> ReactionSlot {
        ReactionSlot::new(item.clone(), symbol.clone(), Self::encode_key(symbol))
    }
}

impl Default for EmojiPolicy {
    fn default() -> Self {
        Self::from_config(&AllowListConfig::default())
    }
}
