//! List Store
//!
//! Paginated list results keyed by `(type, id, page)`. Each page is an ordered
//! sequence of entity references plus its fetch status. Pages are created
//! lazily on first request.

use crate::entity::{EntitiesPayload, EntityStore};
use crate::error::StoreError;
use crate::types::{EntityRef, ListRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Totals reported by the server (`X-WP-Total`, `X-WP-TotalPages`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Total {
    pub entities: Option<u64>,
    pub pages: Option<u32>,
}

/// One fetched (or pending) page of a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListPage {
    pub items: Vec<EntityRef>,
    pub fetching: bool,
    pub ready: bool,
    pub total: Option<u64>,
}

impl ListPage {
    /// Server total if given, else the number of entries on this page.
    pub fn total(&self) -> u64 {
        self.total.unwrap_or(self.items.len() as u64)
    }
}

/// All pages of one `(type, id)` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct List {
    pages: BTreeMap<u32, ListPage>,
    total: Total,
}

impl List {
    pub fn page(&self, page: u32) -> Option<&ListPage> {
        self.pages.get(&page)
    }

    pub fn pages(&self) -> impl Iterator<Item = (u32, &ListPage)> {
        self.pages.iter().map(|(number, page)| (*number, page))
    }

    pub fn fetching(&self) -> bool {
        self.pages.values().any(|page| page.fetching)
    }

    pub fn ready(&self) -> bool {
        self.pages.values().any(|page| page.ready)
    }

    /// Entries of every fetched page, in page order.
    pub fn entities(&self) -> Vec<EntityRef> {
        self.pages
            .values()
            .filter(|page| page.ready)
            .flat_map(|page| page.items.iter().cloned())
            .collect()
    }

    /// Server total, falling back to the number of fetched entries.
    pub fn total_entities(&self) -> u64 {
        self.total
            .entities
            .unwrap_or_else(|| self.pages.values().map(|p| p.items.len() as u64).sum())
    }

    /// Server page count, falling back to the number of fetched pages.
    pub fn total_pages(&self) -> u32 {
        self.total
            .pages
            .unwrap_or_else(|| self.pages.values().filter(|p| p.ready).count() as u32)
    }
}

/// Paginated list results.
#[derive(Debug, Clone, Default)]
pub struct ListStore {
    lists: HashMap<EntityRef, List>,
    version: u64,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn page_mut(&mut self, list: &ListRef) -> &mut ListPage {
        self.lists
            .entry(list.list_key())
            .or_default()
            .pages
            .entry(list.page)
            .or_default()
    }

    /// Mark a page as being fetched. Idempotent.
    pub fn request(&mut self, list: &ListRef) {
        let page = self.page_mut(list);
        if !page.fetching {
            page.fetching = true;
            self.version += 1;
            debug!(list = %list, "List page requested");
        }
    }

    /// Record a fetched page.
    ///
    /// The entities payload is merged into `entities` first; when it cannot be
    /// normalized the page is left untouched.
    pub fn succeed(
        &mut self,
        list: &ListRef,
        total: Option<Total>,
        result: Vec<EntityRef>,
        payload: &EntitiesPayload,
        entities: &mut EntityStore,
    ) -> Result<(), StoreError> {
        entities.upsert_payload(payload)?;

        let fetched = ListPage {
            items: result,
            fetching: false,
            ready: true,
            total: total.and_then(|t| t.entities),
        };
        let count = fetched.items.len();
        let mut changed = false;

        let entry = self.lists.entry(list.list_key()).or_default();
        if let Some(total) = total {
            if entry.total != total {
                entry.total = total;
                changed = true;
            }
        }
        let page = entry.pages.entry(list.page).or_default();
        if *page != fetched {
            *page = fetched;
            changed = true;
        }

        if changed {
            self.version += 1;
        }
        debug!(list = %list, count, changed, "List page fetch succeeded");
        Ok(())
    }

    /// Record a failed fetch. The page stays not ready; nothing is retried.
    pub fn fail(&mut self, list: &ListRef) {
        let page = self.page_mut(list);
        if page.fetching {
            page.fetching = false;
            self.version += 1;
        }
        warn!(list = %list, "List page fetch failed");
    }

    pub fn list(&self, list: &EntityRef) -> Option<&List> {
        self.lists.get(list)
    }

    pub fn page(&self, list: &ListRef) -> Option<&ListPage> {
        self.lists.get(&list.list_key())?.page(list.page)
    }

    /// Entries of a page once it is ready.
    pub fn ready_items(&self, list: &ListRef) -> Option<&[EntityRef]> {
        self.page(list)
            .filter(|page| page.ready)
            .map(|page| page.items.as_slice())
    }

    pub fn is_ready(&self, list: &ListRef) -> bool {
        self.page(list).is_some_and(|page| page.ready)
    }

    pub fn is_fetching(&self, list: &ListRef) -> bool {
        self.page(list).is_some_and(|page| page.fetching)
    }

    /// Bumped only when a page or total actually changes, so derived views
    /// memoized against it stay valid across duplicate notifications.
    pub fn version(&self) -> u64 {
        self.version
    }
}
