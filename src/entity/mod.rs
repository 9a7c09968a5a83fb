//! Entity Store
//!
//! Normalized content records keyed by `(type, id)`. The store is an
//! upsert-only cache: records are created on their first successful merge,
//! updated field by field afterwards and never removed.

pub mod convert;

use crate::error::StoreError;
use crate::types::{EntityId, EntityRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Normalized entities grouped by discriminant, then by id:
/// `{"single": {"60": {...}}, "taxonomy": {...}}`.
pub type EntitiesPayload = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

/// Discriminant of a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    Single,
    Taxonomy,
    Author,
    Media,
}

impl EntityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityClass::Single => "single",
            EntityClass::Taxonomy => "taxonomy",
            EntityClass::Author => "author",
            EntityClass::Media => "media",
        }
    }
}

impl std::str::FromStr for EntityClass {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(EntityClass::Single),
            "taxonomy" => Ok(EntityClass::Taxonomy),
            "author" => Ok(EntityClass::Author),
            "media" => Ok(EntityClass::Media),
            other => Err(StoreError::UnknownDiscriminant(other.to_string())),
        }
    }
}

/// SEO metadata carried by singles and taxonomies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub filename: Option<String>,
    pub url: Option<String>,
}

/// Post, page or any other single content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Single {
    pub id: EntityId,
    pub kind: String,
    pub title: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub modification_date: Option<DateTime<Utc>>,
    pub slug: Option<String>,
    pub link: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<EntityId>,
    pub featured: Option<EntityId>,
    pub taxonomies: BTreeMap<String, Vec<EntityId>>,
    pub target: Option<String>,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub id: EntityId,
    pub kind: String,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub link: Option<String>,
    pub target: Option<String>,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: EntityId,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: EntityId,
    pub creation_date: Option<DateTime<Utc>>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub mime_type: Option<String>,
    pub media_type: Option<String>,
    pub author: Option<EntityId>,
    pub original: Option<Image>,
    pub sizes: Vec<Image>,
}

/// Canonical content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mst", rename_all = "lowercase")]
pub enum Entity {
    Single(Single),
    Taxonomy(Taxonomy),
    Author(Author),
    Media(Media),
}

/// Overwrite `slot` only when the newer record carries a value.
fn merge_field<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

fn merge_meta(slot: &mut Meta, incoming: Meta) {
    merge_field(&mut slot.title, incoming.title);
    merge_field(&mut slot.description, incoming.description);
    merge_field(&mut slot.canonical, incoming.canonical);
}

impl Entity {
    /// Default-valued shape returned for records the store has not seen yet.
    pub fn placeholder(class: EntityClass, entity: &EntityRef) -> Self {
        let id = entity.id.clone();
        match class {
            EntityClass::Single => Entity::Single(Single {
                id,
                kind: entity.kind.clone(),
                title: None,
                creation_date: None,
                modification_date: None,
                slug: None,
                link: None,
                content: None,
                excerpt: None,
                author: None,
                featured: None,
                taxonomies: BTreeMap::new(),
                target: None,
                meta: Meta::default(),
            }),
            EntityClass::Taxonomy => Entity::Taxonomy(Taxonomy {
                id,
                kind: entity.kind.clone(),
                name: None,
                slug: None,
                link: None,
                target: None,
                meta: Meta::default(),
            }),
            EntityClass::Author => Entity::Author(Author {
                id,
                name: None,
                slug: None,
                description: None,
                link: None,
                avatar: None,
            }),
            EntityClass::Media => Entity::Media(Media {
                id,
                creation_date: None,
                slug: None,
                title: None,
                alt: None,
                mime_type: None,
                media_type: None,
                author: None,
                original: None,
                sizes: Vec::new(),
            }),
        }
    }

    pub fn class(&self) -> EntityClass {
        match self {
            Entity::Single(_) => EntityClass::Single,
            Entity::Taxonomy(_) => EntityClass::Taxonomy,
            Entity::Author(_) => EntityClass::Author,
            Entity::Media(_) => EntityClass::Media,
        }
    }

    /// Store key of this record.
    pub fn entity_ref(&self) -> EntityRef {
        match self {
            Entity::Single(s) => EntityRef::new(s.kind.clone(), s.id.clone()),
            Entity::Taxonomy(t) => EntityRef::new(t.kind.clone(), t.id.clone()),
            Entity::Author(a) => EntityRef::new("author", a.id.clone()),
            Entity::Media(m) => EntityRef::new("media", m.id.clone()),
        }
    }

    /// Display title regardless of discriminant.
    pub fn title(&self) -> Option<&str> {
        match self {
            Entity::Single(s) => s.title.as_deref(),
            Entity::Taxonomy(t) => t.name.as_deref(),
            Entity::Author(a) => a.name.as_deref(),
            Entity::Media(m) => m.title.as_deref(),
        }
    }

    /// Merge a newer record into this one, last write wins per field.
    ///
    /// A record of a different discriminant replaces this one entirely.
    pub fn merge(&mut self, newer: Entity) {
        match (self, newer) {
            (Entity::Single(old), Entity::Single(new)) => {
                merge_field(&mut old.title, new.title);
                merge_field(&mut old.creation_date, new.creation_date);
                merge_field(&mut old.modification_date, new.modification_date);
                merge_field(&mut old.slug, new.slug);
                merge_field(&mut old.link, new.link);
                merge_field(&mut old.content, new.content);
                merge_field(&mut old.excerpt, new.excerpt);
                merge_field(&mut old.author, new.author);
                merge_field(&mut old.featured, new.featured);
                merge_field(&mut old.target, new.target);
                if !new.taxonomies.is_empty() {
                    old.taxonomies = new.taxonomies;
                }
                merge_meta(&mut old.meta, new.meta);
            }
            (Entity::Taxonomy(old), Entity::Taxonomy(new)) => {
                merge_field(&mut old.name, new.name);
                merge_field(&mut old.slug, new.slug);
                merge_field(&mut old.link, new.link);
                merge_field(&mut old.target, new.target);
                merge_meta(&mut old.meta, new.meta);
            }
            (Entity::Author(old), Entity::Author(new)) => {
                merge_field(&mut old.name, new.name);
                merge_field(&mut old.slug, new.slug);
                merge_field(&mut old.description, new.description);
                merge_field(&mut old.link, new.link);
                merge_field(&mut old.avatar, new.avatar);
            }
            (Entity::Media(old), Entity::Media(new)) => {
                merge_field(&mut old.creation_date, new.creation_date);
                merge_field(&mut old.slug, new.slug);
                merge_field(&mut old.title, new.title);
                merge_field(&mut old.alt, new.alt);
                merge_field(&mut old.mime_type, new.mime_type);
                merge_field(&mut old.media_type, new.media_type);
                merge_field(&mut old.author, new.author);
                merge_field(&mut old.original, new.original);
                if !new.sizes.is_empty() {
                    old.sizes = new.sizes;
                }
            }
            (slot, newer) => *slot = newer,
        }
    }
}

/// Upsert-only cache of normalized entities.
#[derive(Debug, Clone)]
pub struct EntityStore {
    entities: HashMap<EntityRef, Entity>,
    fetching: HashSet<EntityRef>,
    type_relations: BTreeMap<String, EntityClass>,
    version: u64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(default_type_relations())
    }
}

/// Content type → discriminant used for placeholder shapes.
pub fn default_type_relations() -> BTreeMap<String, EntityClass> {
    BTreeMap::from([
        ("post".to_string(), EntityClass::Single),
        ("page".to_string(), EntityClass::Single),
        ("category".to_string(), EntityClass::Taxonomy),
        ("tag".to_string(), EntityClass::Taxonomy),
        ("author".to_string(), EntityClass::Author),
        ("media".to_string(), EntityClass::Media),
    ])
}

impl EntityStore {
    pub fn new(type_relations: BTreeMap<String, EntityClass>) -> Self {
        Self {
            entities: HashMap::new(),
            fetching: HashSet::new(),
            type_relations,
            version: 0,
        }
    }

    /// Discriminant for a content type; unknown types are singles
    /// (custom post types).
    pub fn class_of(&self, kind: &str) -> EntityClass {
        self.type_relations
            .get(kind)
            .copied()
            .unwrap_or(EntityClass::Single)
    }

    /// Mark an entity as being fetched. Idempotent.
    pub fn request(&mut self, entity: &EntityRef) {
        if self.fetching.insert(entity.clone()) {
            debug!(entity = %entity, "Entity requested");
            self.version += 1;
        }
    }

    /// Record a successful fetch: merge the payload and clear `fetching`.
    pub fn succeed(
        &mut self,
        entity: &EntityRef,
        payload: &EntitiesPayload,
    ) -> Result<usize, StoreError> {
        let merged = self.upsert_payload(payload)?;
        if self.fetching.remove(entity) {
            self.version += 1;
        }
        debug!(entity = %entity, merged, "Entity fetch succeeded");
        Ok(merged)
    }

    /// Record a failed fetch. The entity stays not ready; nothing is retried.
    pub fn fail(&mut self, entity: &EntityRef) {
        if self.fetching.remove(entity) {
            self.version += 1;
        }
        warn!(entity = %entity, "Entity fetch failed");
    }

    /// Normalize and merge one raw entity.
    pub fn upsert(&mut self, raw: &serde_json::Value) -> Result<EntityRef, StoreError> {
        let entity = convert::normalize(raw, None)?;
        let key = entity.entity_ref();
        self.merge(entity);
        Ok(key)
    }

    /// Merge an already canonical entity.
    pub fn merge(&mut self, entity: Entity) {
        let key = entity.entity_ref();
        match self.entities.get_mut(&key) {
            Some(existing) => {
                let before = existing.clone();
                existing.merge(entity);
                if *existing != before {
                    self.version += 1;
                }
            }
            None => {
                self.entities.insert(key, entity);
                self.version += 1;
            }
        }
    }

    /// Normalize every entity of a payload, then merge them all.
    ///
    /// Nothing is merged when any entity fails to normalize.
    pub fn upsert_payload(&mut self, payload: &EntitiesPayload) -> Result<usize, StoreError> {
        let mut normalized = Vec::new();
        for (group, entities) in payload {
            for raw in entities.values() {
                normalized.push(convert::normalize(raw, Some(group))?);
            }
        }
        let count = normalized.len();
        for entity in normalized {
            self.merge(entity);
        }
        Ok(count)
    }

    /// The stored record, or a default-valued placeholder.
    ///
    /// Check [`EntityStore::is_ready`] before trusting content fields.
    pub fn get(&self, entity: &EntityRef) -> Cow<'_, Entity> {
        match self.entities.get(entity) {
            Some(found) => Cow::Borrowed(found),
            None => Cow::Owned(Entity::placeholder(self.class_of(&entity.kind), entity)),
        }
    }

    pub fn is_ready(&self, entity: &EntityRef) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn is_fetching(&self, entity: &EntityRef) -> bool {
        self.fetching.contains(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Bumped on every observable change.
    pub fn version(&self) -> u64 {
        self.version
    }
}
