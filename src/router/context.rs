//! Contexts: one browsing-history entry each.
//!
//! A context keeps the raw structure declared by its generator (extract
//! placeholders intact), the set of visited items and its own selection. The
//! navigable columns are derived from that structure and the list store on
//! read, see [`super::resolve`].

use super::resolve::{self, Resolution};
use super::view::{ItemNode, Position};
use crate::error::RouterError;
use crate::list::ListStore;
use crate::types::{ColumnSpec, Extract, Generator, ItemKey, ListRef};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Placeholder expanding into the entries of a list page once it is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractNode {
    pub list: ListRef,
    pub direction: Extract,
}

/// One entry of a raw column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Item(ItemNode),
    Extract(ExtractNode),
}

impl Slot {
    pub fn as_item(&self) -> Option<&ItemNode> {
        match self {
            Slot::Item(node) => Some(node),
            Slot::Extract(_) => None,
        }
    }
}

pub type RawColumn = Vec<Slot>;

/// Selected item of a context and the expanded column it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selection {
    pub key: ItemKey,
    pub column: usize,
}

/// Provenance of the item selected when the context was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Carried {
    pub key: ItemKey,
    pub from_list: ListRef,
}

#[derive(Debug)]
struct Cached {
    list_version: u64,
    revision: u64,
    resolution: Arc<Resolution>,
}

/// One entry of the browsing history.
#[derive(Debug)]
pub struct Context {
    index: usize,
    generator: Generator,
    raw_columns: Vec<RawColumn>,
    visited: BTreeSet<ItemKey>,
    selected: Option<Selection>,
    carried: Option<Carried>,
    revision: u64,
    cache: Mutex<Option<Cached>>,
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            generator: self.generator.clone(),
            raw_columns: self.raw_columns.clone(),
            visited: self.visited.clone(),
            selected: self.selected.clone(),
            carried: self.carried.clone(),
            revision: self.revision,
            cache: Mutex::new(None),
        }
    }
}

/// Validate one declared column and turn it into raw slots.
pub(crate) fn build_column(
    column: &ColumnSpec,
    default_from_list: &ListRef,
) -> Result<RawColumn, RouterError> {
    let ColumnSpec::Items(specs) = column else {
        return Err(RouterError::configuration(
            "Columns should be arrays and not single objects.",
        ));
    };
    if specs.is_empty() {
        return Err(RouterError::configuration(
            "Columns should contain at least one item.",
        ));
    }

    let extracts: Vec<Extract> = specs.iter().filter_map(|spec| spec.extract).collect();
    if extracts.len() > 1 {
        return Err(RouterError::configuration(
            "Only one extracted list is allowed per column.",
        ));
    }
    if extracts.first() == Some(&Extract::Horizontal) && specs.len() > 1 {
        return Err(RouterError::configuration(
            "Don't add extracted lists with other items in the same column.",
        ));
    }

    Ok(specs
        .iter()
        .map(|spec| match spec.extract {
            Some(direction) => Slot::Extract(ExtractNode {
                list: ListRef::new(spec.kind.clone(), spec.id.clone(), spec.page.unwrap_or(1)),
                direction,
            }),
            None => Slot::Item(ItemNode::from_spec(spec, default_from_list)),
        })
        .collect())
}

impl Context {
    /// Materialize a context from its generator, validating every column
    /// before anything is built.
    pub(crate) fn build(
        index: usize,
        generator: Generator,
        default_from_list: &ListRef,
    ) -> Result<Self, RouterError> {
        let raw_columns = generator
            .columns
            .iter()
            .map(|column| build_column(column, default_from_list))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(index, generator, raw_columns))
    }

    pub(crate) fn from_parts(index: usize, generator: Generator, raw_columns: Vec<RawColumn>) -> Self {
        Self {
            index,
            generator,
            raw_columns,
            visited: BTreeSet::new(),
            selected: None,
            carried: None,
            revision: 0,
            cache: Mutex::new(None),
        }
    }

    /// Position of this context in the history.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn options(&self) -> Option<&serde_json::Value> {
        self.generator.options.as_ref()
    }

    /// Declared structure, extract placeholders intact.
    pub fn raw_columns(&self) -> &[RawColumn] {
        &self.raw_columns
    }

    pub fn is_visited(&self, key: &ItemKey) -> bool {
        self.visited.contains(key)
    }

    pub fn selected_key(&self) -> Option<&ItemKey> {
        self.selected.as_ref().map(|s| &s.key)
    }

    pub(crate) fn selection(&self) -> Option<&Selection> {
        self.selected.as_ref()
    }

    pub(crate) fn visited(&self) -> &BTreeSet<ItemKey> {
        &self.visited
    }

    pub(crate) fn carried(&self) -> Option<&Carried> {
        self.carried.as_ref()
    }

    /// Resolved view against the current list store state.
    ///
    /// Memoized per `(list store version, context revision)`.
    pub fn view(&self, lists: &ListStore) -> Arc<Resolution> {
        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref() {
            if cached.list_version == lists.version() && cached.revision == self.revision {
                return Arc::clone(&cached.resolution);
            }
        }
        let resolution = Arc::new(resolve::resolve(self, lists));
        *cache = Some(Cached {
            list_version: lists.version(),
            revision: self.revision,
            resolution: Arc::clone(&resolution),
        });
        resolution
    }

    /// Find an item in the expanded structure: the selected column first,
    /// then every column left to right.
    pub(crate) fn locate(&self, key: &ItemKey, lists: &ListStore) -> Option<Position> {
        let view = self.view(lists);
        if let Some(column) = view.selected_position().map(|p| p.column) {
            if let Some(item) = view.expanded_item_index(column, key) {
                return Some(Position::new(column, item));
            }
        }
        view.expanded_position_of(key)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub(crate) fn set_carried(&mut self, carried: Option<Carried>) {
        self.carried = carried;
        self.touch();
    }

    pub(crate) fn set_visited(&mut self, visited: BTreeSet<ItemKey>) {
        self.visited = visited;
        self.touch();
    }

    /// Point the selection at `key`, found in expanded column `column`.
    pub(crate) fn select(&mut self, key: ItemKey, column: usize) {
        self.selected = Some(Selection { key, column });
        self.touch();
    }

    /// Visited flags only ever go from false to true.
    pub(crate) fn visit(&mut self, key: ItemKey) {
        if self.visited.insert(key) {
            self.touch();
        }
    }

    /// Put a single-item column at the front for an item the generator does
    /// not declare.
    pub(crate) fn insert_front_column(&mut self, node: ItemNode) {
        self.raw_columns.insert(0, vec![Slot::Item(node)]);
        self.touch();
    }

    pub(crate) fn push_column(&mut self, column: RawColumn) {
        self.raw_columns.push(column);
        self.touch();
    }
}
