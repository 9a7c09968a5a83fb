//! Entity and list stores fed through commands

use crate::integration::{dispatch, post, raw_post};
use paper_router::config::PaperConfig;
use paper_router::entity::{Entity, EntityClass};
use paper_router::error::{PaperError, StoreError};
use paper_router::types::{EntityRef, ListRef};
use paper_router::Connection;
use serde_json::json;

fn list_succeeded(list: &ListRef) -> serde_json::Value {
    json!({
        "type": "listSucceeded",
        "list": list,
        "result": [post(57), post(54)],
        "entities": {
            "single": {
                "57": raw_post(57, "Fifty seven"),
                "54": raw_post(54, "Fifty four")
            }
        },
        "total": { "entities": 12, "pages": 6 }
    })
}

#[test]
fn test_entity_lifecycle() {
    let mut connection = Connection::new();
    let entity = EntityRef::new("post", 60);

    dispatch(&mut connection, json!({ "type": "entityRequested", "entity": post(60) }));
    assert!(connection.entities().is_fetching(&entity));
    assert!(!connection.entities().is_ready(&entity));

    dispatch(
        &mut connection,
        json!({
            "type": "entitySucceeded",
            "entity": post(60),
            "entities": { "single": { "60": raw_post(60, "Sixty &amp; more") } }
        }),
    );
    assert!(!connection.entities().is_fetching(&entity));
    assert!(connection.entities().is_ready(&entity));
    let stored = connection.entity(&entity);
    assert_eq!(stored.title(), Some("Sixty &amp; more"));
    let Entity::Single(single) = &*stored else {
        panic!("expected a single");
    };
    assert_eq!(single.meta.title.as_deref(), Some("Sixty & more"));
}

#[test]
fn test_failed_entity_stays_not_ready() {
    let mut connection = Connection::new();
    let entity = EntityRef::new("post", 60);
    dispatch(&mut connection, json!({ "type": "entityRequested", "entity": post(60) }));
    dispatch(&mut connection, json!({ "type": "entityFailed", "entity": post(60) }));
    assert!(!connection.entities().is_fetching(&entity));
    assert!(!connection.entities().is_ready(&entity));
    assert_eq!(connection.entity(&entity).class(), EntityClass::Single);
}

#[test]
fn test_list_page_and_aggregate() {
    let mut connection = Connection::new();
    let list = ListRef::new("category", 7, 2);
    dispatch(&mut connection, json!({ "type": "listRequested", "list": list }));
    assert!(connection.lists().is_fetching(&list));

    dispatch(&mut connection, list_succeeded(&list));
    assert!(connection.lists().is_ready(&list));
    assert_eq!(
        connection.lists().ready_items(&list).unwrap(),
        &[EntityRef::new("post", 57), EntityRef::new("post", 54)]
    );
    assert_eq!(connection.entities().len(), 2);

    let aggregate = connection
        .lists()
        .list(&EntityRef::new("category", 7))
        .unwrap();
    assert!(aggregate.ready());
    assert!(!aggregate.fetching());
    assert_eq!(aggregate.total_entities(), 12);
    assert_eq!(aggregate.total_pages(), 6);
    assert_eq!(aggregate.entities().len(), 2);
}

#[test]
fn test_duplicate_list_success_is_a_no_op() {
    let mut connection = Connection::new();
    let list = ListRef::new("category", 7, 1);
    dispatch(&mut connection, list_succeeded(&list));
    let lists_version = connection.lists().version();
    let entities_version = connection.entities().version();
    let snapshot = connection.snapshot();

    dispatch(&mut connection, list_succeeded(&list));
    assert_eq!(connection.lists().version(), lists_version);
    assert_eq!(connection.entities().version(), entities_version);
    assert_eq!(connection.snapshot(), snapshot);
}

#[test]
fn test_numeric_string_ids_address_the_same_list() {
    let mut connection = Connection::new();
    dispatch(
        &mut connection,
        json!({
            "type": "listSucceeded",
            "list": { "type": "category", "id": "7", "page": 1 },
            "result": [post(57)]
        }),
    );
    assert!(connection.lists().is_ready(&ListRef::new("category", 7, 1)));
}

#[test]
fn test_unknown_discriminant_rejects_whole_payload() {
    let mut connection = Connection::new();
    let err = connection
        .dispatch(serde_json::from_value(json!({
            "type": "entitySucceeded",
            "entity": post(60),
            "entities": {
                "single": { "60": raw_post(60, "Sixty") },
                "widget": { "1": { "id": 1 } }
            }
        }))
        .unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        PaperError::Store(StoreError::UnknownDiscriminant(ref name)) if name == "widget"
    ));
    assert!(connection.entities().is_empty());
}

#[test]
fn test_taxonomy_title_shows_in_snapshot() {
    let mut connection = Connection::new();
    dispatch(
        &mut connection,
        json!({ "type": "routeChangeSucceeded", "selectedItem": { "type": "category", "id": 7 } }),
    );
    dispatch(
        &mut connection,
        json!({
            "type": "entitySucceeded",
            "entity": { "type": "category", "id": 7 },
            "entities": { "taxonomy": { "7": { "id": 7, "taxonomy": "category", "name": "News" } } }
        }),
    );
    let snapshot = connection.snapshot();
    let item = &snapshot.contexts[0].columns[0].items[0];
    assert!(item.ready);
    assert_eq!(item.title.as_deref(), Some("News"));
}

#[test]
fn test_configured_type_relations_shape_placeholders() {
    let mut config = PaperConfig::default();
    config
        .entities
        .type_relations
        .insert("genre".to_string(), EntityClass::Taxonomy);
    let connection = Connection::from_config(&config);
    let placeholder = connection.entity(&EntityRef::new("genre", 4));
    assert!(matches!(placeholder.as_ref(), Entity::Taxonomy(_)));
    assert_eq!(
        connection.entity(&EntityRef::new("book", 4)).class(),
        EntityClass::Single
    );
}
