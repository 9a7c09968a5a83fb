//! Browsing history driven through the command surface

use crate::integration::{command, dispatch, ids, post, visible_ids};
use paper_router::error::{PaperError, RouterError};
use paper_router::router::{Method, Position, RouterState};
use paper_router::types::{ItemSpec, ListRef};
use paper_router::Connection;
use serde_json::json;

fn route(connection: &mut Connection, selected: serde_json::Value, columns: serde_json::Value) {
    dispatch(
        connection,
        json!({
            "type": "routeChangeSucceeded",
            "selectedItem": selected,
            "context": { "columns": columns }
        }),
    );
}

fn navigate(connection: &mut Connection, selected: serde_json::Value, method: &str) -> Result<(), PaperError> {
    connection.dispatch(command(json!({
        "type": "routeChangeSucceeded",
        "selectedItem": selected,
        "method": method
    })))
}

fn three_contexts() -> Connection {
    let mut connection = Connection::new();
    route(&mut connection, post(60), json!([[post(60)]]));
    route(&mut connection, post(61), json!([[post(61)]]));
    route(&mut connection, post(62), json!([[post(62)]]));
    connection
}

#[test]
fn test_first_route_change_creates_history() {
    let mut connection = Connection::new();
    assert_eq!(connection.state(), RouterState::Empty);
    dispatch(
        &mut connection,
        json!({ "type": "routeChangeSucceeded", "selectedItem": post(60) }),
    );

    assert_eq!(connection.router().len(), 1);
    let item = connection.selected_item().unwrap();
    assert_eq!(item.id().to_string(), "60");
    assert!(item.is_single());
    assert!(!item.is_list());
    assert_eq!(connection.state(), RouterState::Active);
}

#[test]
fn test_selection_found_in_second_column() {
    let mut connection = Connection::new();
    route(&mut connection, post(60), json!([[post(63)], [post(62), post(60)]]));

    let context = connection.router().selected_context().unwrap();
    let view = context.view(connection.lists());
    assert_eq!(view.columns().selected_position(), Some(Position::new(1, 1)));
    assert_eq!(connection.selected_column().unwrap(), view.columns()[1]);
    assert_eq!(
        connection.selected_item().unwrap(),
        view.columns()[1].items[1]
    );
}

#[test]
fn test_unchanged_generator_never_grows_history() {
    let mut connection = Connection::new();
    let columns = json!([[post(63)], [post(62), post(60)]]);
    for id in [60, 62, 63, 60] {
        route(&mut connection, post(id), columns.clone());
    }
    assert_eq!(connection.router().len(), 1);
    assert_eq!(connection.selected_item().unwrap().id().to_string(), "60");
}

#[test]
fn test_different_generator_grows_history_by_one() {
    let mut connection = Connection::new();
    route(&mut connection, post(60), json!([[post(60)]]));
    route(
        &mut connection,
        post(60),
        json!([[post(60)], [{ "type": "category", "id": 7, "page": 1 }]]),
    );
    assert_eq!(connection.router().len(), 2);
    assert_eq!(connection.router().selected_context_index(), Some(1));
}

#[test]
fn test_options_make_generators_differ() {
    let mut connection = Connection::new();
    route(&mut connection, post(60), json!([[post(60)]]));
    dispatch(
        &mut connection,
        json!({
            "type": "routeChangeSucceeded",
            "selectedItem": post(60),
            "context": { "columns": [[post(60)]], "options": { "sticky": true } }
        }),
    );
    assert_eq!(connection.router().len(), 2);
    assert_eq!(
        connection.router().selected_context().unwrap().options(),
        Some(&json!({ "sticky": true }))
    );
}

#[test]
fn test_backward_then_forward_restores_each_context() {
    let mut connection = three_contexts();

    navigate(&mut connection, post(61), "backward").unwrap();
    assert_eq!(connection.router().selected_context_index(), Some(1));
    navigate(&mut connection, post(60), "backward").unwrap();
    assert_eq!(connection.router().selected_context_index(), Some(0));
    navigate(&mut connection, post(61), "forward").unwrap();
    assert_eq!(connection.router().selected_context_index(), Some(1));
    assert_eq!(connection.router().len(), 3);
}

#[test]
fn test_forward_scan_skips_contexts_without_the_item() {
    let mut connection = three_contexts();
    navigate(&mut connection, post(60), "backward").unwrap();
    navigate(&mut connection, post(62), "forward").unwrap();
    assert_eq!(connection.router().selected_context_index(), Some(2));
}

#[test]
fn test_backward_to_unknown_item_is_rejected() {
    let mut connection = three_contexts();
    let before = connection.snapshot();
    let err = navigate(&mut connection, post(99), "backward").unwrap_err();
    assert!(matches!(
        err,
        PaperError::Router(RouterError::Navigation(ref msg))
            if msg == "You are trying to select an item in a context where doesn't exist"
    ));
    assert_eq!(connection.snapshot(), before);
}

#[test]
fn test_method_parses_lowercase() {
    let method: Method = serde_json::from_value(json!("forward")).unwrap();
    assert_eq!(method, Method::Forward);
}

#[test]
fn test_move_item_collapses_history() {
    let mut connection = Connection::new();
    route(&mut connection, post(63), json!([[post(63)], [post(62)], [post(60)]]));
    dispatch(&mut connection, json!({ "type": "moveItemToColumn", "item": post(62) }));

    assert_eq!(connection.router().len(), 1);
    assert_eq!(visible_ids(&connection), ids(&[&[63, 62], &[60]]));
    assert_eq!(connection.selected_item().unwrap().id().to_string(), "63");
}

#[test]
fn test_move_item_reads_previous_context() {
    let mut connection = Connection::new();
    route(&mut connection, post(63), json!([[post(63)], [post(62)], [post(60)]]));
    route(&mut connection, post(70), json!([[post(70)]]));
    dispatch(&mut connection, json!({ "type": "moveItemToColumn", "item": post(62) }));

    assert_eq!(connection.router().len(), 1);
    assert_eq!(visible_ids(&connection), ids(&[&[63, 62], &[60]]));
    assert_eq!(connection.selected_item().unwrap().id().to_string(), "63");
}

#[test]
fn test_move_missing_item_is_rejected() {
    let mut connection = Connection::new();
    route(&mut connection, post(63), json!([[post(63)], [post(62)]]));
    let err = connection
        .dispatch(command(json!({ "type": "moveItemToColumn", "item": post(1) })))
        .unwrap_err();
    assert!(matches!(
        err,
        PaperError::Router(RouterError::Navigation(ref msg))
            if msg == "Can't move if selected doesn't exist in the previous context."
    ));
}

#[test]
fn test_add_item_inserts_after_selection() {
    let mut connection = Connection::new();
    route(&mut connection, post(63), json!([[post(63), post(64)], [post(60)]]));
    route(&mut connection, post(70), json!([[post(70)]]));
    assert_eq!(connection.router().len(), 2);

    dispatch(&mut connection, json!({ "type": "addItemToColumn", "item": post(71) }));
    assert_eq!(connection.router().len(), 1);
    assert_eq!(visible_ids(&connection), ids(&[&[70, 71]]));

    let err = connection
        .dispatch(command(json!({ "type": "addItemToColumn", "item": post(71) })))
        .unwrap_err();
    assert!(matches!(
        err,
        PaperError::Router(RouterError::Configuration(ref msg))
            if msg == "Item already exists in the context."
    ));
}

#[test]
fn test_replace_context_keeps_selection_when_present() {
    let mut connection = Connection::new();
    route(&mut connection, post(60), json!([[post(60)]]));
    route(&mut connection, post(61), json!([[post(61)]]));
    dispatch(
        &mut connection,
        json!({ "type": "replaceContext", "context": { "columns": [[post(5)], [post(61)]] } }),
    );
    assert_eq!(connection.router().len(), 1);
    assert_eq!(connection.selected_item().unwrap().id().to_string(), "61");

    dispatch(
        &mut connection,
        json!({ "type": "replaceContext", "context": { "columns": [[post(8), post(9)]] } }),
    );
    let item = connection.selected_item().unwrap();
    assert_eq!(item.id().to_string(), "8");
    assert!(item.is_visited());
}

#[test]
fn test_preview_is_cleared_by_next_selection() {
    let mut connection = Connection::new();
    route(&mut connection, post(60), json!([[post(60), post(61)]]));
    dispatch(&mut connection, json!({ "type": "previewItemInColumn", "item": post(61) }));
    assert_eq!(connection.previewed_item().unwrap().id().to_string(), "61");

    route(&mut connection, post(61), json!([[post(60), post(61)]]));
    assert!(connection.router().preview().is_none());
    assert!(connection.previewed_item().is_none());
}

#[test]
fn test_bare_object_column_is_rejected() {
    let mut connection = Connection::new();
    let err = connection
        .dispatch(command(json!({
            "type": "routeChangeSucceeded",
            "selectedItem": post(60),
            "context": { "columns": [post(60)] }
        })))
        .unwrap_err();
    assert!(matches!(
        err,
        PaperError::Router(RouterError::Configuration(ref msg))
            if msg == "Columns should be arrays and not single objects."
    ));
    assert!(connection.router().is_empty());
}

#[test]
fn test_add_column_to_context_keeps_history() {
    let mut connection = Connection::new();
    route(&mut connection, post(60), json!([[post(60)]]));
    dispatch(
        &mut connection,
        json!({ "type": "addColumnToContext", "column": [post(61), post(62)] }),
    );
    assert_eq!(connection.router().len(), 1);
    assert_eq!(visible_ids(&connection), ids(&[&[60], &[61, 62]]));
}

#[test]
fn test_last_item_has_no_next() {
    let mut connection = Connection::new();
    route(&mut connection, post(60), json!([[post(60)], [post(61), post(62)]]));
    let context = connection.router().selected_context().unwrap();
    let view = context.view(connection.lists());
    let columns = view.columns();
    assert_eq!(columns.next_item(Position::new(0, 0)), Some(Position::new(1, 0)));
    assert_eq!(columns.next_item(Position::new(1, 1)), None);
}

#[test]
fn test_from_list_is_kept_on_selected_item() {
    let mut connection = Connection::new();
    let selected = ItemSpec::single("post", 60).with_from_list(ListRef::new("tag", 20, 1));
    connection
        .route_change_succeeded(&selected, None, None)
        .unwrap();
    assert_eq!(
        connection.selected_item().unwrap().from_list(),
        Some(&ListRef::new("tag", 20, 1))
    );
}

#[test]
fn test_get_item_finds_visited_item() {
    let mut connection = Connection::new();
    route(&mut connection, post(60), json!([[post(63)], [post(62), post(60)]]));
    let context = connection.router().selected_context().unwrap();
    let view = context.view(connection.lists());
    let columns = view.columns();

    let item = columns.get_item(&ItemSpec::single("post", 60)).unwrap();
    assert!(item.is_visited());
    assert!(item.is_selected());
    assert!(!columns.get_item(&ItemSpec::single("post", 63)).unwrap().is_visited());
    assert!(columns.get_item(&ItemSpec::single("post", 99)).is_none());
}

#[test]
fn test_previous_and_next_columns() {
    let mut connection = Connection::new();
    let generator = json!([[post(60)], [post(32)]]);

    route(&mut connection, post(32), generator.clone());
    {
        let context = connection.router().selected_context().unwrap();
        let view = context.view(connection.lists());
        let columns = view.columns();
        let selected = columns.selected_position().unwrap().column;
        assert_eq!(selected, 1);
        assert!(columns.has_previous_column(selected));
        assert_eq!(
            columns.previous_column(selected).unwrap().items[0].id().to_string(),
            "60"
        );
        assert!(!columns.has_next_column(selected));
        assert!(columns.next_column(selected).is_none());
    }

    route(&mut connection, post(60), generator);
    assert_eq!(connection.router().len(), 1);
    let context = connection.router().selected_context().unwrap();
    let view = context.view(connection.lists());
    let columns = view.columns();
    let selected = columns.selected_position().unwrap().column;
    assert_eq!(selected, 0);
    assert!(!columns.has_previous_column(selected));
    assert!(columns.previous_column(selected).is_none());
    assert!(columns.has_next_column(selected));
    assert_eq!(
        columns.next_column(selected).unwrap().items[0].id().to_string(),
        "32"
    );
}

#[test]
fn test_front_column_before_pending_extract_stands_alone() {
    let mut connection = Connection::new();
    route(
        &mut connection,
        post(60),
        json!([[{ "type": "category", "id": 7, "page": 1, "extract": "horizontal" }]]),
    );
    let context = connection.router().selected_context().unwrap();
    let view = context.view(connection.lists());
    let columns = view.columns();

    assert_eq!(columns.len(), 1);
    assert_eq!(columns.selected_position(), Some(Position::new(0, 0)));
    assert!(!columns.has_previous_column(0));
    assert!(!columns.has_next_column(0));
}

#[test]
fn test_next_item_walks_list_items() {
    let mut connection = Connection::new();
    route(
        &mut connection,
        post(60),
        json!([
            [
                { "type": "category", "id": 7, "page": 1 },
                { "type": "category", "id": 8, "page": 1 },
                { "type": "tag", "id": 3, "page": 1 }
            ],
            [post(60)]
        ]),
    );
    let context = connection.router().selected_context().unwrap();
    let view = context.view(connection.lists());
    let columns = view.columns();

    let first = Position::new(0, 0);
    assert!(columns.item(first).unwrap().is_list());
    let second = columns.next_item(first).unwrap();
    assert_eq!(second, Position::new(0, 1));
    assert_eq!(columns.item(second).unwrap().id().to_string(), "8");
    let third = columns.next_item(second).unwrap();
    assert_eq!(third, Position::new(0, 2));
    assert_eq!(columns.item(third).unwrap().kind(), "tag");
    let fourth = columns.next_item(third).unwrap();
    assert_eq!(fourth, Position::new(1, 0));
    assert!(columns.item(fourth).unwrap().is_single());
    assert_eq!(columns.next_item(fourth), None);
}
