//! Connection: one entity store, one list store and one router.
//!
//! Every inbound [`Command`] goes through [`Connection::dispatch`]. Store
//! commands update shared state; router commands read it. Derived views are
//! recomputed lazily, so a list page that becomes ready after the user has
//! navigated elsewhere is simply observed the next time a context is read.

use crate::command::{Command, RouteChange};
use crate::config::PaperConfig;
use crate::entity::{EntitiesPayload, Entity, EntityStore};
use crate::error::PaperError;
use crate::list::{ListStore, Total};
use crate::router::{Column, Item, Method, Router, RouterState};
use crate::types::{ColumnSpec, EntityRef, Generator, ItemKey, ItemSpec, ListRef};
use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, warn};

/// Owned engine state.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    entities: EntityStore,
    lists: ListStore,
    router: Router,
}

impl Connection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PaperConfig) -> Self {
        Self {
            entities: EntityStore::new(config.entities.type_relations.clone()),
            lists: ListStore::new(),
            router: Router::new(config.router.default_from_list.clone()),
        }
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn lists(&self) -> &ListStore {
        &self.lists
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn state(&self) -> RouterState {
        self.router.state()
    }

    /// Apply one command. A rejected command leaves every store untouched.
    pub fn dispatch(&mut self, command: Command) -> Result<(), PaperError> {
        let name = command.name();
        debug!(command = name, "Dispatching command");
        let result = match command {
            Command::RouteChangeSucceeded(RouteChange {
                selected_item,
                context,
                method,
            }) => self.route_change_succeeded(&selected_item, context.as_ref(), method),
            Command::MoveItemToColumn { item } => self.move_item_to_column(&item),
            Command::AddItemToColumn { item } => self.add_item_to_column(&item),
            Command::ReplaceContext { context } => self.replace_context(&context),
            Command::PreviewItemInColumn { item } => self.preview_item_in_column(&item),
            Command::AddColumnToContext { column } => self.add_column_to_context(&column),
            Command::EntityRequested { entity } => {
                self.entity_requested(&entity);
                Ok(())
            }
            Command::EntitySucceeded { entity, entities } => {
                self.entity_succeeded(&entity, &entities)
            }
            Command::EntityFailed { entity } => {
                self.entity_failed(&entity);
                Ok(())
            }
            Command::ListRequested { list } => {
                self.list_requested(&list);
                Ok(())
            }
            Command::ListSucceeded {
                list,
                result,
                entities,
                total,
            } => self.list_succeeded(&list, result, &entities, total),
            Command::ListFailed { list } => {
                self.list_failed(&list);
                Ok(())
            }
        };
        if let Err(err) = &result {
            warn!(command = name, error = %err, "Command rejected");
        }
        result
    }

    pub fn route_change_succeeded(
        &mut self,
        selected: &ItemSpec,
        context: Option<&Generator>,
        method: Option<Method>,
    ) -> Result<(), PaperError> {
        self.router
            .route_change_succeeded(selected, context, method, &self.lists)?;
        Ok(())
    }

    pub fn move_item_to_column(&mut self, item: &ItemSpec) -> Result<(), PaperError> {
        self.router.move_item_to_column(item, &self.lists)?;
        Ok(())
    }

    pub fn add_item_to_column(&mut self, item: &ItemSpec) -> Result<(), PaperError> {
        self.router.add_item_to_column(item, &self.lists)?;
        Ok(())
    }

    pub fn replace_context(&mut self, generator: &Generator) -> Result<(), PaperError> {
        self.router.replace_context(generator, &self.lists)?;
        Ok(())
    }

    pub fn preview_item_in_column(&mut self, item: &ItemSpec) -> Result<(), PaperError> {
        self.router.preview_item_in_column(item)?;
        Ok(())
    }

    pub fn add_column_to_context(&mut self, column: &ColumnSpec) -> Result<(), PaperError> {
        self.router.add_column_to_context(column)?;
        Ok(())
    }

    pub fn entity_requested(&mut self, entity: &EntityRef) {
        self.entities.request(entity);
    }

    pub fn entity_succeeded(
        &mut self,
        entity: &EntityRef,
        payload: &EntitiesPayload,
    ) -> Result<(), PaperError> {
        self.entities.succeed(entity, payload)?;
        Ok(())
    }

    pub fn entity_failed(&mut self, entity: &EntityRef) {
        self.entities.fail(entity);
    }

    pub fn list_requested(&mut self, list: &ListRef) {
        self.lists.request(list);
    }

    pub fn list_succeeded(
        &mut self,
        list: &ListRef,
        result: Vec<EntityRef>,
        payload: &EntitiesPayload,
        total: Option<Total>,
    ) -> Result<(), PaperError> {
        self.lists
            .succeed(list, total, result, payload, &mut self.entities)?;
        Ok(())
    }

    pub fn list_failed(&mut self, list: &ListRef) {
        self.lists.fail(list);
    }

    pub fn selected_item(&self) -> Option<Item> {
        self.router.selected_item(&self.lists)
    }

    pub fn selected_column(&self) -> Option<Column> {
        self.router.selected_column(&self.lists)
    }

    pub fn previewed_item(&self) -> Option<Item> {
        self.router.previewed_item(&self.lists)
    }

    /// Entity behind a single item, placeholder until fetched.
    pub fn entity(&self, entity: &EntityRef) -> Cow<'_, Entity> {
        self.entities.get(entity)
    }

    /// Whether the backing entity or list page of an item has been fetched.
    pub fn is_ready(&self, item: &Item) -> bool {
        item.is_ready(&self.entities, &self.lists)
    }

    /// Serializable picture of the whole history.
    pub fn snapshot(&self) -> HistorySnapshot {
        let contexts = self
            .router
            .contexts()
            .iter()
            .enumerate()
            .map(|(index, context)| {
                let view = context.view(&self.lists);
                let columns = view
                    .columns()
                    .iter()
                    .map(|column| ColumnSnapshot {
                        selected: column.is_selected(),
                        items: column
                            .items
                            .iter()
                            .map(|item| ItemSnapshot {
                                title: self
                                    .entities
                                    .get(&item.node.entity_ref())
                                    .title()
                                    .map(str::to_string),
                                ready: self.is_ready(item),
                                item: item.clone(),
                            })
                            .collect(),
                    })
                    .collect();
                ContextSnapshot {
                    index,
                    selected: self.router.is_selected_context(index),
                    raw_columns: context.raw_columns().len(),
                    selected_item: context.selected_key().cloned(),
                    options: context.options().cloned(),
                    columns,
                }
            })
            .collect();
        HistorySnapshot {
            selected_context: self.router.selected_context_index(),
            preview: self.router.preview().map(|preview| preview.item.clone()),
            contexts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub selected_context: Option<usize>,
    pub preview: Option<ItemKey>,
    pub contexts: Vec<ContextSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub index: usize,
    pub selected: bool,
    pub raw_columns: usize,
    pub selected_item: Option<ItemKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    pub columns: Vec<ColumnSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSnapshot {
    pub selected: bool,
    pub items: Vec<ItemSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSnapshot {
    #[serde(flatten)]
    pub item: Item,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
