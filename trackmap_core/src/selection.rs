//! Selector entries and selection resolution.

use crate::aggregate::{AggregatedState, EntityRoute};
use trackmap_env::Selection;

/// Characters of the entity key shown in a selector entry.
pub const KEY_PREFIX_CHARS: usize = 8;

/// One entry of the entity selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    /// Value reported back when the entry is picked
    pub value: String,
    /// Text shown to the user
    pub text: String,
}

/// Selector text for an entity: `"<first 8 chars of key> - <label>"`.
pub fn option_text(key: &str, label: &str) -> String {
    let prefix: String = key.chars().take(KEY_PREFIX_CHARS).collect();
    format!("{} - {}", prefix, label)
}

/// Builds the selector entries: `None` first, then one per entity in
/// first-seen order.
pub fn selector_options(state: &AggregatedState) -> Vec<SelectorOption> {
    let mut options = Vec::with_capacity(state.len() + 1);
    options.push(SelectorOption {
        value: Selection::NONE_VALUE.to_string(),
        text: Selection::NONE_VALUE.to_string(),
    });
    options.extend(state.iter().map(|(key, route)| SelectorOption {
        value: key.to_string(),
        text: option_text(key, &route.label),
    }));
    options
}

/// Route for the selection, if it names an entity present in `state`.
///
/// The returned key borrows from `state`, not from the selection.
pub fn resolve<'a>(selection: &Selection, state: &'a AggregatedState) -> Option<(&'a str, &'a EntityRoute)> {
    state.route_entry(selection.key()?)
}
