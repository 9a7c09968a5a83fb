//! Extraction resolution.
//!
//! Pure derivation of a context's navigable columns from its raw structure and
//! the list store. Identical inputs always give identical output, which is what
//! makes memoizing on the list store version sound.
//!
//! Two stages:
//! 1. *Expansion*: every extract whose list page is ready is replaced by the
//!    page's entries (one column per entry for horizontal, items in place for
//!    vertical). Entries already present in the context are skipped.
//! 2. *Visibility*: walking left to right and top to bottom, the first extract
//!    still pending hides itself, the rest of its column and every later column.

use super::context::{Context, ExtractNode, RawColumn, Slot};
use super::view::{Column, Columns, Item, ItemNode, Position};
use crate::list::ListStore;
use crate::types::{EntityRef, Extract, ItemKey};
use std::collections::HashSet;

/// Entry of the expanded structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Item(Item),
    Pending(ExtractNode),
}

impl Entry {
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Entry::Item(item) => Some(item),
            Entry::Pending(_) => None,
        }
    }
}

/// A context resolved against one list store state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    expanded: Vec<Vec<Entry>>,
    columns: Columns,
    selected: Option<Position>,
}

impl Resolution {
    /// Navigable columns.
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Raw structure with ready extracts applied; pending extracts remain as
    /// placeholders and nothing is hidden.
    pub fn expanded(&self) -> &[Vec<Entry>] {
        &self.expanded
    }

    /// Selection inside the expanded structure, even when hidden behind a
    /// pending extract.
    pub fn selected_position(&self) -> Option<Position> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.expanded_item(self.selected?)
    }

    pub fn expanded_item(&self, position: Position) -> Option<&Item> {
        self.expanded
            .get(position.column)?
            .get(position.item)?
            .as_item()
    }

    pub(crate) fn expanded_item_index(&self, column: usize, key: &ItemKey) -> Option<usize> {
        self.expanded
            .get(column)?
            .iter()
            .position(|entry| entry.as_item().is_some_and(|item| item.key() == *key))
    }

    pub fn expanded_position_of(&self, key: &ItemKey) -> Option<Position> {
        (0..self.expanded.len()).find_map(|column| {
            self.expanded_item_index(column, key)
                .map(|item| Position::new(column, item))
        })
    }

    /// First item of the navigable columns, else of the expanded structure.
    pub fn first_item_position(&self) -> Option<Position> {
        if self.columns.get(0).is_some_and(|column| !column.is_empty()) {
            return Some(Position::new(0, 0));
        }
        self.expanded.iter().enumerate().find_map(|(c, column)| {
            column
                .iter()
                .position(|entry| entry.as_item().is_some())
                .map(|i| Position::new(c, i))
        })
    }

    /// Freeze the expanded structure into raw columns: resolved entries become
    /// ordinary items, pending extracts stay placeholders.
    pub(crate) fn materialize(&self) -> Vec<RawColumn> {
        self.expanded
            .iter()
            .map(|column| {
                column
                    .iter()
                    .map(|entry| match entry {
                        Entry::Item(item) => Slot::Item(item.node.clone()),
                        Entry::Pending(extract) => Slot::Extract(extract.clone()),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Resolve a context against the list store.
pub(crate) fn resolve(context: &Context, lists: &ListStore) -> Resolution {
    let nodes = expand(context, lists);
    let selected = context.selection().and_then(|selection| {
        let in_column = |column: usize| {
            nodes
                .get(column)?
                .iter()
                .position(|node| matches!(node, Expanded::Node(n) if n.key() == selection.key))
                .map(|item| Position::new(column, item))
        };
        in_column(selection.column).or_else(|| (0..nodes.len()).find_map(in_column))
    });

    let expanded: Vec<Vec<Entry>> = nodes
        .into_iter()
        .enumerate()
        .map(|(c, column)| {
            column
                .into_iter()
                .enumerate()
                .map(|(i, node)| match node {
                    Expanded::Node(node) => Entry::Item(Item {
                        visited: context.is_visited(&node.key()),
                        selected: selected == Some(Position::new(c, i)),
                        node,
                    }),
                    Expanded::Pending(extract) => Entry::Pending(extract),
                })
                .collect()
        })
        .collect();

    let mut visible = Vec::new();
    for entries in &expanded {
        let cut = entries
            .iter()
            .position(|entry| matches!(entry, Entry::Pending(_)));
        let shown = &entries[..cut.unwrap_or(entries.len())];
        if !shown.is_empty() {
            let items: Vec<Item> = shown.iter().filter_map(Entry::as_item).cloned().collect();
            let is_selected = items.iter().any(|item| item.selected);
            visible.push(Column {
                items,
                selected: is_selected,
            });
        }
        if cut.is_some() {
            break;
        }
    }

    let visible_selected = selected.filter(|p| {
        visible
            .get(p.column)
            .is_some_and(|column| p.item < column.items.len())
    });

    Resolution {
        expanded,
        columns: Columns::new(visible, visible_selected),
        selected,
    }
}

enum Expanded {
    Node(ItemNode),
    Pending(ExtractNode),
}

fn expand(context: &Context, lists: &ListStore) -> Vec<Vec<Expanded>> {
    let raw = context.raw_columns();
    let mut seen: HashSet<ItemKey> = raw
        .iter()
        .flatten()
        .filter_map(Slot::as_item)
        .map(ItemNode::key)
        .collect();

    let mut produce = |extract: &ExtractNode, refs: &[EntityRef]| -> Vec<ItemNode> {
        refs.iter()
            .filter(|entity| seen.insert(ItemKey::Single((*entity).clone())))
            .map(|entity| {
                let key = ItemKey::Single(entity.clone());
                let from_list = match context.carried() {
                    Some(carried) if carried.key == key => carried.from_list.clone(),
                    _ => extract.list.clone(),
                };
                ItemNode::single(entity.clone(), from_list)
            })
            .collect()
    };

    let mut out = Vec::with_capacity(raw.len());
    for column in raw {
        let mut expanded = Vec::with_capacity(column.len());
        for slot in column {
            match slot {
                Slot::Item(node) => expanded.push(Expanded::Node(node.clone())),
                Slot::Extract(extract) => match lists.ready_items(&extract.list) {
                    None => expanded.push(Expanded::Pending(extract.clone())),
                    Some(refs) => {
                        let nodes = produce(extract, refs);
                        match extract.direction {
                            Extract::Vertical => {
                                expanded.extend(nodes.into_iter().map(Expanded::Node))
                            }
                            // Horizontal extracts are alone in their column.
                            Extract::Horizontal => {
                                out.extend(nodes.into_iter().map(|node| vec![Expanded::Node(node)]))
                            }
                        }
                    }
                },
            }
        }
        if !expanded.is_empty() {
            out.push(expanded);
        }
    }
    out
}
