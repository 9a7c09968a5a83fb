//! Inbound commands.
//!
//! Payloads are tagged by `"type"` with camelCase names, the same shapes the
//! fetching layer and the UI emit:
//!
//! ```json
//! { "type": "routeChangeSucceeded", "selectedItem": { "type": "post", "id": 60 } }
//! { "type": "listSucceeded", "list": { "type": "category", "id": 7, "page": 1 }, "result": [] }
//! ```

use crate::entity::EntitiesPayload;
use crate::list::Total;
use crate::router::Method;
use crate::types::{ColumnSpec, EntityRef, Generator, ItemSpec, ListRef};
use serde::{Deserialize, Serialize};

/// A completed navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteChange {
    pub selected_item: ItemSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Generator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    RouteChangeSucceeded(RouteChange),
    MoveItemToColumn {
        item: ItemSpec,
    },
    AddItemToColumn {
        item: ItemSpec,
    },
    ReplaceContext {
        context: Generator,
    },
    PreviewItemInColumn {
        item: ItemSpec,
    },
    AddColumnToContext {
        column: ColumnSpec,
    },
    EntityRequested {
        entity: EntityRef,
    },
    EntitySucceeded {
        entity: EntityRef,
        #[serde(default)]
        entities: EntitiesPayload,
    },
    EntityFailed {
        entity: EntityRef,
    },
    ListRequested {
        list: ListRef,
    },
    ListSucceeded {
        list: ListRef,
        result: Vec<EntityRef>,
        #[serde(default)]
        entities: EntitiesPayload,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total: Option<Total>,
    },
    ListFailed {
        list: ListRef,
    },
}

impl Command {
    /// Wire name of the command, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::RouteChangeSucceeded(_) => "routeChangeSucceeded",
            Command::MoveItemToColumn { .. } => "moveItemToColumn",
            Command::AddItemToColumn { .. } => "addItemToColumn",
            Command::ReplaceContext { .. } => "replaceContext",
            Command::PreviewItemInColumn { .. } => "previewItemInColumn",
            Command::AddColumnToContext { .. } => "addColumnToContext",
            Command::EntityRequested { .. } => "entityRequested",
            Command::EntitySucceeded { .. } => "entitySucceeded",
            Command::EntityFailed { .. } => "entityFailed",
            Command::ListRequested { .. } => "listRequested",
            Command::ListSucceeded { .. } => "listSucceeded",
            Command::ListFailed { .. } => "listFailed",
        }
    }

    /// Router commands; the others only touch the stores.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Command::RouteChangeSucceeded(_)
                | Command::MoveItemToColumn { .. }
                | Command::AddItemToColumn { .. }
                | Command::ReplaceContext { .. }
                | Command::PreviewItemInColumn { .. }
                | Command::AddColumnToContext { .. }
        )
    }
}
