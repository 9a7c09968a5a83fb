//! Reference Types
//!
//! Identifiers and declarative shapes shared by the entity store, the list
//! store and the router. Everything here is plain data with structural equality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a content node or list.
///
/// WordPress ids are numeric, but list generators also use symbolic ids such as
/// the `post` in `latest/post`. Numeric strings are normalised on construction,
/// so `"7"` and `7` denote the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawEntityId", into = "RawEntityId")]
pub enum EntityId {
    Num(u64),
    Str(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawEntityId {
    Num(u64),
    Str(String),
}

impl From<RawEntityId> for EntityId {
    fn from(raw: RawEntityId) -> Self {
        match raw {
            RawEntityId::Num(n) => EntityId::Num(n),
            RawEntityId::Str(s) => EntityId::from(s),
        }
    }
}

impl From<EntityId> for RawEntityId {
    fn from(id: EntityId) -> Self {
        match id {
            EntityId::Num(n) => RawEntityId::Num(n),
            EntityId::Str(s) => RawEntityId::Str(s),
        }
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        EntityId::Num(n)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match s.parse::<u64>() {
            Ok(n) => EntityId::Num(n),
            Err(_) => EntityId::Str(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::from(s.to_string())
    }
}

impl EntityId {
    /// WordPress uses `0` for "no related entity" (e.g. `featured_media`).
    pub fn is_unset(&self) -> bool {
        matches!(self, EntityId::Num(0))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Num(n) => write!(f, "{}", n),
            EntityId::Str(s) => f.write_str(s),
        }
    }
}

/// Identifies a content node: `{type, id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(kind: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Reference to one page of the list keyed by this `(type, id)`.
    pub fn page(&self, page: u32) -> ListRef {
        ListRef {
            kind: self.kind.clone(),
            id: self.id.clone(),
            page,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Identifies one page of a list: `{type, id, page}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: EntityId,
    pub page: u32,
}

impl ListRef {
    pub fn new(kind: impl Into<String>, id: impl Into<EntityId>, page: u32) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            page,
        }
    }

    /// Key of the list this page belongs to.
    pub fn list_key(&self) -> EntityRef {
        EntityRef {
            kind: self.kind.clone(),
            id: self.id.clone(),
        }
    }
}

/// Latest posts, first page.
impl Default for ListRef {
    fn default() -> Self {
        ListRef::new("latest", "post", 1)
    }
}

impl fmt::Display for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.kind, self.id, self.page)
    }
}

/// Direction in which an extracted list expands once ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extract {
    /// One new column per list entry.
    Horizontal,
    /// New items inside the column holding the placeholder.
    Vertical,
}

/// Declarative item: `{type, id, page?, extract?, fromList?}`.
///
/// A spec with a `page` is a list item, otherwise a single. `extract` turns a
/// list spec into a placeholder that expands into the list's entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<Extract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_list: Option<ListRef>,
}

impl ItemSpec {
    pub fn single(kind: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            page: None,
            extract: None,
            from_list: None,
        }
    }

    pub fn list(kind: impl Into<String>, id: impl Into<EntityId>, page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::single(kind, id)
        }
    }

    pub fn extract(kind: impl Into<String>, id: impl Into<EntityId>, page: u32, extract: Extract) -> Self {
        Self {
            extract: Some(extract),
            ..Self::list(kind, id, page)
        }
    }

    pub fn with_from_list(mut self, from_list: ListRef) -> Self {
        self.from_list = Some(from_list);
        self
    }

    pub fn is_extract(&self) -> bool {
        self.extract.is_some()
    }

    pub fn is_list(&self) -> bool {
        self.page.is_some()
    }

    /// Identity of the item this spec describes.
    ///
    /// Extract placeholders are keyed as the list they expand.
    pub fn key(&self) -> ItemKey {
        match (self.page, self.extract) {
            (Some(page), _) => ItemKey::List(ListRef::new(self.kind.clone(), self.id.clone(), page)),
            (None, Some(_)) => ItemKey::List(ListRef::new(self.kind.clone(), self.id.clone(), 1)),
            (None, None) => ItemKey::Single(EntityRef::new(self.kind.clone(), self.id.clone())),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind.clone(), self.id.clone())
    }
}

/// Identity of an item inside a context.
///
/// The single/list discriminant is part of the key: `category:7` as a single
/// and page 1 of `category:7` as a list never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum ItemKey {
    Single(EntityRef),
    List(ListRef),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Single(r) => write!(f, "{}", r),
            ItemKey::List(r) => write!(f, "{}", r),
        }
    }
}

/// One declared column.
///
/// Payloads come from loosely typed callers, so a bare object where an array
/// was expected is kept representable and rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    Items(Vec<ItemSpec>),
    Bare(ItemSpec),
}

impl From<Vec<ItemSpec>> for ColumnSpec {
    fn from(items: Vec<ItemSpec>) -> Self {
        ColumnSpec::Items(items)
    }
}

/// Declarative description of a context: `{columns, options?}`.
///
/// Two generators are the same context when they compare equal field by field,
/// options included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    pub columns: Vec<ColumnSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

impl Generator {
    pub fn new(columns: Vec<Vec<ItemSpec>>) -> Self {
        Self {
            columns: columns.into_iter().map(ColumnSpec::Items).collect(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = Some(options);
        self
    }

    /// Generator used when a route change names no context: the selected item
    /// alone in a single column.
    pub fn for_selected(selected: &ItemSpec) -> Self {
        let mut item = selected.clone();
        item.extract = None;
        Self::new(vec![vec![item]])
    }
}
