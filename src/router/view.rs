//! Derived views over a resolved context: items, columns and navigation.

use crate::entity::EntityStore;
use crate::list::ListStore;
use crate::types::{EntityId, EntityRef, ItemKey, ItemSpec, ListRef};
use serde::Serialize;

/// Single or list variant of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "camelCase")]
pub enum ItemVariant {
    Single {
        #[serde(rename = "fromList")]
        from_list: ListRef,
    },
    List {
        page: u32,
    },
}

/// Structural part of an item: what it points at, without navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemNode {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: EntityId,
    #[serde(flatten)]
    pub variant: ItemVariant,
}

impl ItemNode {
    pub fn single(entity: EntityRef, from_list: ListRef) -> Self {
        Self {
            kind: entity.kind,
            id: entity.id,
            variant: ItemVariant::Single { from_list },
        }
    }

    /// Build from a non-extract spec; singles without provenance get
    /// `default_from_list`.
    pub fn from_spec(spec: &ItemSpec, default_from_list: &ListRef) -> Self {
        let variant = match spec.page {
            Some(page) => ItemVariant::List { page },
            None => ItemVariant::Single {
                from_list: spec
                    .from_list
                    .clone()
                    .unwrap_or_else(|| default_from_list.clone()),
            },
        };
        Self {
            kind: spec.kind.clone(),
            id: spec.id.clone(),
            variant,
        }
    }

    pub fn key(&self) -> ItemKey {
        match &self.variant {
            ItemVariant::Single { .. } => ItemKey::Single(self.entity_ref()),
            ItemVariant::List { page } => ItemKey::List(self.entity_ref().page(*page)),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind.clone(), self.id.clone())
    }
}

/// An item as seen through a resolved context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    #[serde(flatten)]
    pub node: ItemNode,
    pub visited: bool,
    pub selected: bool,
}

impl Item {
    pub fn kind(&self) -> &str {
        &self.node.kind
    }

    pub fn id(&self) -> &EntityId {
        &self.node.id
    }

    pub fn key(&self) -> ItemKey {
        self.node.key()
    }

    pub fn is_single(&self) -> bool {
        matches!(self.node.variant, ItemVariant::Single { .. })
    }

    pub fn is_list(&self) -> bool {
        matches!(self.node.variant, ItemVariant::List { .. })
    }

    pub fn page(&self) -> Option<u32> {
        match self.node.variant {
            ItemVariant::List { page } => Some(page),
            ItemVariant::Single { .. } => None,
        }
    }

    pub fn from_list(&self) -> Option<&ListRef> {
        match &self.node.variant {
            ItemVariant::Single { from_list } => Some(from_list),
            ItemVariant::List { .. } => None,
        }
    }

    /// Page of the backing list, for list items.
    pub fn list_ref(&self) -> Option<ListRef> {
        self.page().map(|page| self.node.entity_ref().page(page))
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// Selected within its own context.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Backing entity or list page has been fetched.
    pub fn is_ready(&self, entities: &EntityStore, lists: &ListStore) -> bool {
        match self.list_ref() {
            Some(list) => lists.is_ready(&list),
            None => entities.is_ready(&self.node.entity_ref()),
        }
    }

    /// Same item a spec refers to.
    pub fn matches(&self, spec: &ItemSpec) -> bool {
        self.key() == spec.key()
    }
}

/// Ordered items shown side by side with other columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub items: Vec<Item>,
    pub selected: bool,
}

impl Column {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn has_non_visited(&self) -> bool {
        self.items.iter().any(|item| !item.visited)
    }
}

/// Location of an item: column index, then index inside the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub column: usize,
    pub item: usize,
}

impl Position {
    pub fn new(column: usize, item: usize) -> Self {
        Self { column, item }
    }
}

/// The navigable columns of a context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Columns {
    columns: Vec<Column>,
    selected: Option<Position>,
}

impl Columns {
    pub(crate) fn new(columns: Vec<Column>, selected: Option<Position>) -> Self {
        Self { columns, selected }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&Column> {
        self.columns.get(column)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn item(&self, position: Position) -> Option<&Item> {
        self.columns.get(position.column)?.items.get(position.item)
    }

    pub fn position_of(&self, key: &ItemKey) -> Option<Position> {
        self.columns.iter().enumerate().find_map(|(c, column)| {
            column
                .items
                .iter()
                .position(|item| item.key() == *key)
                .map(|i| Position::new(c, i))
        })
    }

    /// Item lookup by reference.
    pub fn get_item(&self, spec: &ItemSpec) -> Option<&Item> {
        self.item(self.position_of(&spec.key())?)
    }

    pub fn selected_position(&self) -> Option<Position> {
        self.selected
    }

    pub fn selected_column(&self) -> Option<&Column> {
        self.columns.get(self.selected?.column)
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.item(self.selected?)
    }

    /// Next item in the same column, else the first item of the next column.
    pub fn next_item(&self, position: Position) -> Option<Position> {
        let column = self.columns.get(position.column)?;
        if position.item + 1 < column.items.len() {
            return Some(Position::new(position.column, position.item + 1));
        }
        self.next_column(position.column)
            .filter(|next| !next.items.is_empty())
            .map(|_| Position::new(position.column + 1, 0))
    }

    pub fn next_column(&self, column: usize) -> Option<&Column> {
        self.columns.get(column.checked_add(1)?)
    }

    pub fn has_next_column(&self, column: usize) -> bool {
        self.next_column(column).is_some()
    }

    pub fn previous_column(&self, column: usize) -> Option<&Column> {
        self.columns.get(column.checked_sub(1)?)
    }

    pub fn has_previous_column(&self, column: usize) -> bool {
        self.previous_column(column).is_some()
    }

    /// First item never selected, scanning columns left to right and each
    /// column top to bottom.
    pub fn next_non_visited(&self) -> Option<&Item> {
        self.columns
            .iter()
            .flat_map(|column| column.items.iter())
            .find(|item| !item.visited)
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl std::ops::Index<usize> for Columns {
    type Output = Column;

    fn index(&self, column: usize) -> &Column {
        &self.columns[column]
    }
}
