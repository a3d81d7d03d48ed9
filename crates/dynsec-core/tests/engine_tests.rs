//! Integration tests for command correlation.
//!
//! Responses are injected straight into the demultiplexer, so these run
//! without a broker.

use dynsec_core::{
    CommandEngine, DynSecError, EngineConfig, InFlightPolicy, MemoryTransport, Parameters,
    ProtocolConfig, TransportEvent,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn setup(config: EngineConfig) -> (Arc<MemoryTransport>, Arc<CommandEngine>) {
    let transport = Arc::new(MemoryTransport::new());
    let engine = Arc::new(CommandEngine::new(transport.clone(), config));
    (transport, engine)
}

fn params(value: Value) -> Parameters {
    match value {
        Value::Object(map) => map,
        _ => panic!("test parameters must be an object"),
    }
}

fn respond(engine: &CommandEngine, responses: Value) -> dynsec_core::DemuxReport {
    let payload = serde_json::to_vec(&json!({ "responses": responses })).unwrap();
    engine
        .handle_message(ProtocolConfig::RESPONSE_TOPIC, &payload)
        .unwrap()
}

fn correlation_of(message: &Value) -> String {
    message["correlationData"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_default_acl_round_trip() {
    let (transport, engine) = setup(EngineConfig::default());

    let handle = engine
        .dispatch("getDefaultACLAccess", Parameters::new())
        .await
        .unwrap();

    let published = transport.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, ProtocolConfig::MGMT_TOPIC);

    let sent = transport.last_command().unwrap();
    assert_eq!(sent["command"], "getDefaultACLAccess");

    let report = respond(
        &engine,
        json!([{
            "command": "getDefaultACLAccess",
            "correlationData": correlation_of(&sent),
            "data": { "acls": [] }
        }]),
    );
    assert_eq!(report.resolved, 1);

    assert_eq!(handle.await.unwrap(), json!({ "acls": [] }));
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test]
async fn test_remote_error_rejects_with_message() {
    let (transport, engine) = setup(EngineConfig::default());

    let handle = engine
        .dispatch("createClient", params(json!({ "username": "u1" })))
        .await
        .unwrap();
    let sent = transport.last_command().unwrap();
    assert_eq!(sent["username"], "u1");

    respond(
        &engine,
        json!([{
            "command": "createClient",
            "correlationData": correlation_of(&sent),
            "error": "Client already exists"
        }]),
    );

    let err = handle.await.unwrap_err();
    assert_eq!(err.remote_message(), Some("Client already exists"));
    assert!(matches!(err, DynSecError::Remote { ref command, .. } if command == "createClient"));
}

#[tokio::test]
async fn test_second_dispatch_of_pending_name_is_refused() {
    let (transport, engine) = setup(EngineConfig::default());

    let first = engine
        .dispatch("listClients", Parameters::new())
        .await
        .unwrap();

    let err = engine
        .dispatch("listClients", Parameters::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DynSecError::CommandAlreadyInFlight { ref command } if command == "listClients"));
    assert_eq!(transport.publish_count(), 1);

    // The first call is unaffected.
    respond(
        &engine,
        json!([{ "command": "listClients", "data": { "totalCount": 0, "clients": [] } }]),
    );
    assert_eq!(first.await.unwrap()["totalCount"], 0);

    // Once settled, the name is free again.
    assert!(engine.dispatch("listClients", Parameters::new()).await.is_ok());
    assert_eq!(transport.publish_count(), 2);
}

#[tokio::test]
async fn test_disconnected_dispatch_publishes_nothing() {
    let transport = Arc::new(MemoryTransport::disconnected());
    let engine = CommandEngine::new(transport.clone(), EngineConfig::default());

    let err = engine
        .dispatch("getDefaultACLAccess", Parameters::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DynSecError::NotConnected));
    assert_eq!(transport.publish_count(), 0);
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test]
async fn test_batch_resolves_good_entries_around_malformed_one() {
    let (transport, engine) = setup(EngineConfig::default());

    let get_client = engine
        .dispatch("getClient", params(json!({ "username": "u1" })))
        .await
        .unwrap();
    let get_client_id = correlation_of(&transport.last_command().unwrap());

    let get_role = engine
        .dispatch("getRole", params(json!({ "rolename": "r1" })))
        .await
        .unwrap();
    let get_role_id = correlation_of(&transport.last_command().unwrap());

    let report = respond(
        &engine,
        json!([
            { "command": "getClient", "correlationData": get_client_id, "data": { "client": { "username": "u1" } } },
            { "command": 42 },
            { "command": "getRole", "correlationData": get_role_id, "error": "Role not found" }
        ]),
    );

    assert_eq!(report.resolved, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.malformed, 1);

    assert_eq!(get_client.await.unwrap()["client"]["username"], "u1");
    assert_eq!(
        get_role.await.unwrap_err().remote_message(),
        Some("Role not found")
    );
}

#[tokio::test]
async fn test_each_call_settles_exactly_once() {
    let (transport, engine) = setup(EngineConfig::default());

    let handle = engine
        .dispatch("deleteRole", params(json!({ "rolename": "r1" })))
        .await
        .unwrap();
    let id = correlation_of(&transport.last_command().unwrap());
    let response = json!([{ "command": "deleteRole", "correlationData": id }]);

    let first = respond(&engine, response.clone());
    let second = respond(&engine, response);

    assert_eq!(first.resolved, 1);
    assert_eq!(second.resolved, 0);
    assert_eq!(second.unmatched, 1);
    assert_eq!(handle.await.unwrap(), Value::Null);

    let stats = engine.stats();
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.unmatched, 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_clears_registry_and_late_response_is_unmatched() {
    let (transport, engine) = setup(EngineConfig {
        command_timeout: Duration::from_millis(500),
        ..EngineConfig::default()
    });

    let handle = engine
        .dispatch("getAnonymousGroup", Parameters::new())
        .await
        .unwrap();
    let id = correlation_of(&transport.last_command().unwrap());

    let err = handle.await.unwrap_err();
    assert!(matches!(
        err,
        DynSecError::CommandTimeout { ref command, timeout }
            if command == "getAnonymousGroup" && timeout == Duration::from_millis(500)
    ));
    assert_eq!(engine.pending_count(), 0);
    assert!(!engine.is_pending("getAnonymousGroup"));

    let report = respond(
        &engine,
        json!([{
            "command": "getAnonymousGroup",
            "correlationData": id,
            "data": { "group": { "groupname": "anon" } }
        }]),
    );
    assert_eq!(report.unmatched, 1);
    assert_eq!(engine.stats().timeouts, 1);
}

#[tokio::test(start_paused = true)]
async fn test_response_before_deadline_wins() {
    let (transport, engine) = setup(EngineConfig::default());

    let handle = engine
        .dispatch("getClient", params(json!({ "username": "u1" })))
        .await
        .unwrap();
    let id = correlation_of(&transport.last_command().unwrap());

    tokio::time::advance(Duration::from_millis(2_900)).await;
    respond(
        &engine,
        json!([{ "command": "getClient", "correlationData": id, "data": { "client": { "username": "u1" } } }]),
    );

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(handle.await.is_ok());
    assert_eq!(engine.stats().timeouts, 0);
}

#[tokio::test]
async fn test_concurrent_policy_routes_by_correlation() {
    let (transport, engine) = setup(EngineConfig {
        in_flight_policy: InFlightPolicy::Concurrent,
        ..EngineConfig::default()
    });

    let alice = engine
        .dispatch("getClient", params(json!({ "username": "alice" })))
        .await
        .unwrap();
    let alice_id = correlation_of(&transport.last_command().unwrap());

    let bob = engine
        .dispatch("getClient", params(json!({ "username": "bob" })))
        .await
        .unwrap();
    let bob_id = correlation_of(&transport.last_command().unwrap());

    assert_ne!(alice_id, bob_id);

    // Answered out of order in one batch.
    respond(
        &engine,
        json!([
            { "command": "getClient", "correlationData": bob_id, "data": { "client": { "username": "bob" } } },
            { "command": "getClient", "correlationData": alice_id, "data": { "client": { "username": "alice" } } }
        ]),
    );

    assert_eq!(alice.await.unwrap()["client"]["username"], "alice");
    assert_eq!(bob.await.unwrap()["client"]["username"], "bob");
}

#[tokio::test]
async fn test_foreign_correlation_is_not_claimed() {
    let (_transport, engine) = setup(EngineConfig::default());

    let _handle = engine
        .dispatch("listRoles", Parameters::new())
        .await
        .unwrap();

    // Another administrator's response on the shared topic.
    let report = respond(
        &engine,
        json!([{ "command": "listRoles", "correlationData": "someone-else-1", "data": {} }]),
    );

    assert_eq!(report.unmatched, 1);
    assert!(engine.is_pending("listRoles"));
}

#[tokio::test]
async fn test_connection_loss_fails_pending_calls() {
    let (_transport, engine) = setup(EngineConfig {
        in_flight_policy: InFlightPolicy::Concurrent,
        ..EngineConfig::default()
    });
    let (tx, rx) = mpsc::channel(8);
    let pump = engine.spawn_event_pump(rx);

    let a = engine.dispatch("listGroups", Parameters::new()).await.unwrap();
    let b = engine.dispatch("listGroups", Parameters::new()).await.unwrap();

    tx.send(TransportEvent::ConnectionLost {
        reason: "broker went away".to_string(),
    })
    .await
    .unwrap();

    assert!(matches!(a.await, Err(DynSecError::Disconnected)));
    assert!(matches!(b.await, Err(DynSecError::Disconnected)));
    assert_eq!(engine.stats().abandoned, 2);

    drop(tx);
    pump.await.unwrap();
}

#[tokio::test]
async fn test_pending_limit() {
    let (transport, engine) = setup(EngineConfig {
        in_flight_policy: InFlightPolicy::Concurrent,
        max_pending: 2,
        ..EngineConfig::default()
    });

    let _a = engine.dispatch("getRole", Parameters::new()).await.unwrap();
    let _b = engine.dispatch("getRole", Parameters::new()).await.unwrap();
    let err = engine.dispatch("getRole", Parameters::new()).await.unwrap_err();

    assert!(matches!(err, DynSecError::TooManyPending { limit: 2 }));
    assert!(err.is_retryable());
    assert_eq!(transport.publish_count(), 2);
}
