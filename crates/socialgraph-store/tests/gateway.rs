//! Gateway tests against an in-process stand-in for the graph store's
//! GraphQL endpoint.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use socialgraph_core::config::StoreConfig;
use socialgraph_core::{Context, NewPerson, Person, PersonId, Source};
use socialgraph_store::{GraphClient, GraphError, PersonStore};

const AUTH_HEADER: &str = "X-Travel-Auth";
const AUTH_TOKEN: &str = "store-secret";

#[derive(Default)]
struct FakeStore {
    documents: Vec<String>,
    adds: usize,
}

fn stored_record(id: &str, screen_name: &str) -> Value {
    json!({
        "id": id,
        "source_id": "123456",
        "source": "twitter",
        "screen_name": screen_name,
        "name": "William Kennedy",
        "location": "Miami",
        "friends_count": 200
    })
}

async fn graphql(
    State(state): State<Arc<Mutex<FakeStore>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.get(AUTH_HEADER).and_then(|v| v.to_str().ok()) != Some(AUTH_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "errors": [{ "message": "unauthorized" }] })),
        );
    }

    let doc = body["query"].as_str().unwrap_or_default().to_string();
    let mut store = state.lock().unwrap();
    store.documents.push(doc.clone());

    let reply = if doc.starts_with("mutation { addPerson") {
        if doc.contains("screen_name: \"no-id\"") {
            json!({ "data": { "addPerson": { "person": [] } } })
        } else {
            store.adds += 1;
            json!({ "data": { "addPerson": { "person": [{ "id": format!("0x{}", store.adds + 2) }] } } })
        }
    } else if doc.starts_with("query { getPerson(id: \"0x3\")") {
        json!({ "data": { "getPerson": stored_record("0x3", "goinggodotnet") } })
    } else if doc.starts_with("query { getPerson") {
        json!({ "data": { "getPerson": null } })
    } else if doc.contains("eq: \"goinggodotnet\"") {
        json!({ "data": { "queryPerson": [stored_record("0x3", "goinggodotnet")] } })
    } else if doc.contains("eq: \"dup\"") {
        json!({ "data": { "queryPerson": [stored_record("0x4", "dup"), stored_record("0x5", "dup")] } })
    } else if doc.starts_with("query { queryPerson") {
        json!({ "data": { "queryPerson": [] } })
    } else {
        json!({ "errors": [{ "message": "unknown document" }] })
    };
    (StatusCode::OK, Json(reply))
}

async fn spawn_store() -> (GraphClient, Arc<Mutex<FakeStore>>) {
    let state = Arc::new(Mutex::new(FakeStore::default()));
    let app = Router::new()
        .route("/graphql", post(graphql))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = StoreConfig {
        url: format!("http://{addr}"),
        auth_token: AUTH_TOKEN.to_string(),
        ..Default::default()
    };
    (GraphClient::new(&config).unwrap(), state)
}

fn seed_person(screen_name: &str) -> NewPerson {
    NewPerson {
        source_id: "123456".to_string(),
        source: Source::Twitter,
        screen_name: screen_name.to_string(),
        name: "William Kennedy".to_string(),
        location: "Miami".to_string(),
        friends_count: 200,
        friends: Vec::new(),
    }
}

#[tokio::test]
async fn test_add_then_get_round_trip() {
    let (client, _) = spawn_store().await;
    let ctx = Context::background();
    let new = seed_person("goinggodotnet");

    let added = client.add_person(&ctx, new.clone()).await.unwrap();
    assert_eq!(added.id.as_str(), "0x3");
    assert!(added.matches(&new));

    let by_id = client.get_person(&ctx, &added.id).await.unwrap();
    assert_eq!(by_id, added);

    let by_name = client
        .get_person_by_screen_name(&ctx, &added.screen_name)
        .await
        .unwrap();
    assert_eq!(by_name, added);
}

#[tokio::test]
async fn test_add_with_friends_round_trips_scalars_only() {
    let (client, state) = spawn_store().await;
    let ctx = Context::background();
    let mut new = seed_person("goinggodotnet");
    new.friends = vec![Person::from_new(PersonId::from("0x9"), seed_person("friend"))];

    let added = client.add_person(&ctx, new).await.unwrap();
    assert!(added.friends.is_empty());

    let by_id = client.get_person(&ctx, &added.id).await.unwrap();
    assert_eq!(by_id, added);

    let store = state.lock().unwrap();
    assert!(!store.documents[0].contains("friends:"));
}

#[tokio::test]
async fn test_missing_id_is_not_found() {
    let (client, _) = spawn_store().await;
    let err = client
        .get_person(&Context::background(), &PersonId::from("0x99"))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound { ref key, .. } if key == "id=0x99"));
}

#[tokio::test]
async fn test_missing_screen_name_is_not_found() {
    let (client, _) = spawn_store().await;
    let err = client
        .get_person_by_screen_name(&Context::background(), "nobody")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_duplicate_screen_name_is_ambiguous() {
    let (client, _) = spawn_store().await;
    let err = client
        .get_person_by_screen_name(&Context::background(), "dup")
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Ambiguous { count: 2, .. }));
}

#[tokio::test]
async fn test_add_without_identity_is_hard_error() {
    let (client, state) = spawn_store().await;
    let err = client
        .add_person(&Context::background(), seed_person("no-id"))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::IdentityNotReturned { returned: 0, .. }));
    // Sent exactly once: never retried.
    assert_eq!(state.lock().unwrap().documents.len(), 1);
}

#[tokio::test]
async fn test_upsert_reuses_existing_node() {
    let (client, state) = spawn_store().await;
    let ctx = Context::background();

    let existing = client
        .upsert_person(&ctx, seed_person("goinggodotnet"))
        .await
        .unwrap();
    assert_eq!(existing.id.as_str(), "0x3");
    assert_eq!(state.lock().unwrap().adds, 0);

    let created = client.upsert(&ctx, seed_person("newcomer")).await.unwrap();
    assert_eq!(created.screen_name, "newcomer");
    assert_eq!(state.lock().unwrap().adds, 1);
}

#[tokio::test]
async fn test_upsert_refuses_to_pick_between_duplicates() {
    let (client, state) = spawn_store().await;
    let err = client
        .upsert_person(&Context::background(), seed_person("dup"))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Ambiguous { .. }));
    assert_eq!(state.lock().unwrap().adds, 0);
}

#[tokio::test]
async fn test_hostile_screen_name_is_escaped_on_the_wire() {
    let (client, state) = spawn_store().await;
    let hostile = r#"x" } }) { id } } mutation { deletePerson"#;
    let _ = client
        .get_person_by_screen_name(&Context::background(), hostile)
        .await;

    let store = state.lock().unwrap();
    let sent = store.documents.last().unwrap();
    assert!(sent.contains(r#"eq: "x\" } }) { id } } mutation { deletePerson" }"#));
}

#[tokio::test]
async fn test_missing_credential_surfaces_status() {
    let (client, _) = spawn_store().await;
    let config = StoreConfig {
        auth_token: String::new(),
        ..client.config().clone()
    };
    let anonymous = GraphClient::new(&config).unwrap();
    let err = anonymous
        .get_person(&Context::background(), &PersonId::from("0x3"))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Status { status: 401, .. }));
}

#[tokio::test]
async fn test_cancelled_context_sends_nothing() {
    let (client, state) = spawn_store().await;
    let ctx = Context::background();
    ctx.cancel();
    let err = client
        .add_person(&ctx, seed_person("goinggodotnet"))
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(state.lock().unwrap().documents.is_empty());
}
