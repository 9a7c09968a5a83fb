//! Router/Context Engine
//!
//! Owns the browsing history: an append-only sequence of contexts with one of
//! them selected. Commands either grow the history, move the selection inside
//! it, or collapse it to a single freshly built context. Every command
//! validates before committing, so a failed command leaves history untouched.

pub mod context;
pub mod resolve;
pub mod view;

pub use context::{Context, ExtractNode, RawColumn, Slot};
pub use resolve::{Entry, Resolution};
pub use view::{Column, Columns, Item, ItemNode, ItemVariant, Position};

use crate::error::RouterError;
use crate::list::ListStore;
use crate::types::{ColumnSpec, Generator, ItemKey, ItemSpec, ListRef};
use context::{build_column, Carried};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Direction of a history scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Forward,
    Backward,
}

/// Lifecycle of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// No context yet; only before the first route change.
    Empty,
    /// One context selected.
    Active,
}

/// Candidate selection staged without touching history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub context: usize,
    pub item: ItemKey,
}

const NOT_IN_CONTEXT: &str = "You are trying to select an item in a context where doesn't exist";
const NOT_IN_PREVIOUS: &str = "Can't move if selected doesn't exist in the previous context.";
const NO_SELECTED_CONTEXT: &str = "There is no selected context.";

fn no_selected_context() -> RouterError {
    RouterError::navigation(NO_SELECTED_CONTEXT)
}

/// Browsing history with its selection pointers.
#[derive(Debug, Clone)]
pub struct Router {
    contexts: Vec<Context>,
    selected: Option<usize>,
    preview: Option<Preview>,
    default_from_list: ListRef,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(ListRef::default())
    }
}

impl Router {
    /// Empty history. Single items declared without provenance get
    /// `default_from_list`.
    pub fn new(default_from_list: ListRef) -> Self {
        Self {
            contexts: Vec::new(),
            selected: None,
            preview: None,
            default_from_list,
        }
    }

    pub fn default_from_list(&self) -> &ListRef {
        &self.default_from_list
    }

    pub fn state(&self) -> RouterState {
        if self.selected.is_some() {
            RouterState::Active
        } else {
            RouterState::Empty
        }
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn context(&self, index: usize) -> Option<&Context> {
        self.contexts.get(index)
    }

    pub fn selected_context_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_context(&self) -> Option<&Context> {
        self.contexts.get(self.selected?)
    }

    pub fn is_selected_context(&self, index: usize) -> bool {
        self.selected == Some(index)
    }

    /// Selected item of the selected context, even while hidden behind a
    /// pending extract.
    pub fn selected_item(&self, lists: &ListStore) -> Option<Item> {
        self.selected_context()?
            .view(lists)
            .selected_item()
            .cloned()
    }

    /// Navigable column holding the selected item.
    pub fn selected_column(&self, lists: &ListStore) -> Option<Column> {
        self.selected_context()?
            .view(lists)
            .columns()
            .selected_column()
            .cloned()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn previewed_item(&self, lists: &ListStore) -> Option<Item> {
        let preview = self.preview.as_ref()?;
        let view = self.contexts.get(preview.context)?.view(lists);
        let position = view.expanded_position_of(&preview.item)?;
        view.expanded_item(position).cloned()
    }

    /// Apply a completed route change.
    ///
    /// Target context: a given generator that differs from the selected
    /// context's is appended; otherwise `method` scans the history; otherwise
    /// the selected context is reused. Without a generator, an item the
    /// selected context does not hold gets one of its own.
    pub fn route_change_succeeded(
        &mut self,
        selected: &ItemSpec,
        context: Option<&Generator>,
        method: Option<Method>,
        lists: &ListStore,
    ) -> Result<(), RouterError> {
        if selected.is_extract() {
            return Err(RouterError::configuration("Can't select an extracted item"));
        }
        let key = selected.key();

        let generator = match context {
            Some(generator) => Some(generator.clone()),
            None if self.selected.is_none() => Some(Generator::for_selected(selected)),
            None if method.is_none() && !self.selected_contains(&key, lists) => {
                Some(Generator::for_selected(selected))
            }
            None => None,
        };
        let generator = generator.filter(|generator| {
            self.selected_context()
                .map_or(true, |current| current.generator() != generator)
        });

        let target = match (generator, method) {
            (Some(generator), _) => {
                let mut context =
                    Context::build(self.contexts.len(), generator, &self.default_from_list)?;
                if let Some(from_list) = &selected.from_list {
                    context.set_carried(Some(Carried {
                        key: key.clone(),
                        from_list: from_list.clone(),
                    }));
                }
                self.contexts.push(context);
                info!(
                    index = self.contexts.len() - 1,
                    history = self.contexts.len(),
                    "Context appended"
                );
                self.contexts.len() - 1
            }
            (None, Some(method)) => self.scan(method, &key, lists)?,
            (None, None) => self.selected.ok_or_else(no_selected_context)?,
        };

        self.select_in(target, selected, lists);
        Ok(())
    }

    /// Move an item of the previous context next to its selection and make
    /// that structure the whole history. When the selected context is the
    /// first one, the item moves within the selected context itself.
    pub fn move_item_to_column(
        &mut self,
        item: &ItemSpec,
        lists: &ListStore,
    ) -> Result<(), RouterError> {
        let current = self.selected.ok_or_else(no_selected_context)?;
        if item.is_extract() {
            return Err(RouterError::configuration("Can't move an extracted item"));
        }
        let source = &self.contexts[current.saturating_sub(1)];
        let view = source.view(lists);
        let target = item.key();

        let (Some(mut anchor), Some(home)) =
            (view.selected_position(), view.expanded_position_of(&target))
        else {
            return Err(RouterError::navigation(NOT_IN_PREVIOUS));
        };
        let anchor_key = source
            .selected_key()
            .cloned()
            .ok_or_else(|| RouterError::navigation(NOT_IN_PREVIOUS))?;

        let mut columns = view.materialize();
        if home.column != anchor.column {
            let slot = columns[home.column].remove(home.item);
            if columns[home.column].is_empty() {
                columns.remove(home.column);
                if home.column < anchor.column {
                    anchor.column -= 1;
                }
            }
            columns[anchor.column].insert(anchor.item + 1, slot);
        }

        let mut moved = Context::from_parts(0, source.generator().clone(), columns);
        moved.set_visited(source.visited().clone());
        moved.set_carried(source.carried().cloned());
        moved.select(anchor_key, anchor.column);
        moved.visit(target);
        debug!(item = %item.key(), column = anchor.column, "Item moved");
        self.collapse(moved);
        Ok(())
    }

    /// Insert a new item right after the selection and make that structure
    /// the whole history.
    pub fn add_item_to_column(
        &mut self,
        item: &ItemSpec,
        lists: &ListStore,
    ) -> Result<(), RouterError> {
        let current = self.selected.ok_or_else(no_selected_context)?;
        if item.is_extract() {
            return Err(RouterError::configuration(
                "Can't add an extracted item to a column",
            ));
        }
        let source = &self.contexts[current];
        let view = source.view(lists);
        let key = item.key();
        if view.expanded_position_of(&key).is_some() {
            return Err(RouterError::configuration("Item already exists in the context."));
        }
        let (Some(anchor), Some(anchor_key)) =
            (view.selected_position(), source.selected_key().cloned())
        else {
            return Err(no_selected_context());
        };

        let mut columns = view.materialize();
        columns[anchor.column].insert(
            anchor.item + 1,
            Slot::Item(ItemNode::from_spec(item, &self.default_from_list)),
        );

        let mut added = Context::from_parts(0, source.generator().clone(), columns);
        added.set_visited(source.visited().clone());
        added.set_carried(source.carried().cloned());
        added.select(anchor_key, anchor.column);
        debug!(item = %key, column = anchor.column, "Item added");
        self.collapse(added);
        Ok(())
    }

    /// Discard the history and start over from `generator`, keeping the
    /// selected item when the new structure still holds it.
    pub fn replace_context(
        &mut self,
        generator: &Generator,
        lists: &ListStore,
    ) -> Result<(), RouterError> {
        let mut context = Context::build(0, generator.clone(), &self.default_from_list)?;
        let previous = self.selected_context();
        let previous_key = previous.and_then(Context::selected_key);

        let (key, column) = {
            let view = context.view(lists);
            let position = previous_key
                .and_then(|key| view.expanded_position_of(key))
                .or_else(|| view.first_item_position())
                .ok_or_else(|| {
                    RouterError::configuration("Context should contain at least one item.")
                })?;
            let item = view.expanded_item(position).ok_or_else(|| {
                RouterError::configuration("Context should contain at least one item.")
            })?;
            (item.key(), position.column)
        };

        let carried = previous
            .and_then(Context::carried)
            .filter(|carried| carried.key == key)
            .cloned();
        context.set_carried(carried);
        context.select(key.clone(), column);
        context.visit(key);
        self.collapse(context);
        Ok(())
    }

    /// Stage a selection candidate; committing commands clear it.
    pub fn preview_item_in_column(&mut self, item: &ItemSpec) -> Result<(), RouterError> {
        if item.is_extract() {
            return Err(RouterError::configuration("Can't preview an extracted item"));
        }
        let context = self.selected.ok_or_else(no_selected_context)?;
        debug!(context, item = %item.key(), "Item previewed");
        self.preview = Some(Preview {
            context,
            item: item.key(),
        });
        Ok(())
    }

    /// Append a column to the selected context in place.
    pub fn add_column_to_context(&mut self, column: &ColumnSpec) -> Result<(), RouterError> {
        let index = self.selected.ok_or_else(no_selected_context)?;
        let raw = build_column(column, &self.default_from_list)?;
        self.contexts[index].push_column(raw);
        debug!(context = index, "Column appended");
        Ok(())
    }

    fn selected_contains(&self, key: &ItemKey, lists: &ListStore) -> bool {
        self.selected_context()
            .is_some_and(|context| context.locate(key, lists).is_some())
    }

    /// Nearest context strictly before or after the selected one whose
    /// navigable columns hold `key`.
    fn scan(&self, method: Method, key: &ItemKey, lists: &ListStore) -> Result<usize, RouterError> {
        let current = self.selected.ok_or_else(no_selected_context)?;
        let holds = |index: &usize| {
            self.contexts[*index]
                .view(lists)
                .columns()
                .position_of(key)
                .is_some()
        };
        let found = match method {
            Method::Backward => (0..current).rev().find(holds),
            Method::Forward => (current + 1..self.contexts.len()).find(holds),
        };
        found.ok_or_else(|| RouterError::navigation(NOT_IN_CONTEXT))
    }

    fn select_in(&mut self, index: usize, selected: &ItemSpec, lists: &ListStore) {
        let key = selected.key();
        let context = &mut self.contexts[index];
        let column = match context.locate(&key, lists) {
            Some(position) => position.column,
            None => {
                debug!(item = %key, context = index, "Item not declared, adding its own column");
                context.insert_front_column(ItemNode::from_spec(selected, &self.default_from_list));
                0
            }
        };
        context.select(key.clone(), column);
        context.visit(key.clone());
        self.selected = Some(index);
        self.preview = None;
        debug!(item = %key, context = index, column, "Item selected");
    }

    fn collapse(&mut self, context: Context) {
        let dropped = self.contexts.len();
        self.contexts = vec![context];
        self.selected = Some(0);
        self.preview = None;
        info!(dropped, "History collapsed");
    }
}
