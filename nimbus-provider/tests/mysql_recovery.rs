//! MySQL recovery server tests: the resource only exists inside the parent
//! instance's server list.

mod common;

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use nimbus_provider::{ResourceData, resource};
use nimbus_sdk::Platform;

#[derive(Default)]
struct MockState {
    recovery_requested: bool,
    polls_after_request: u32,
    recovery_deleted: bool,
    parent_deleted: bool,
}

type Shared = Arc<Mutex<MockState>>;

fn envelope(mut payload: Value) -> Json<Value> {
    let obj = payload.as_object_mut().unwrap();
    obj.insert("requestId".into(), json!("req-1"));
    obj.insert("returnCode".into(), json!("0"));
    obj.insert("returnMessage".into(), json!("success"));
    Json(payload)
}

fn server_entry(no: &str, name: &str, role: &str, status: &str) -> Value {
    json!({
        "cloudMysqlServerInstanceNo": no,
        "cloudMysqlServerName": name,
        "cloudMysqlServerRole": {"code": role, "codeName": role},
        "cloudMysqlServerInstanceStatusName": status,
        "subnetNo": "31",
        "vpcNo": "12",
        "privateDomain": format!("db-{no}.vpc.internal")
    })
}

async fn get_handler(State(state): State<Shared>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut s = state.lock().unwrap();
    if s.parent_deleted {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "responseError": {
                    "returnCode": "5001017",
                    "returnMessage": "the cloud mysql instance does not exist"
                }
            })),
        ));
    }

    let mut servers = vec![server_entry("453", "orders-db-001", "M", "running")];
    if s.recovery_requested && !s.recovery_deleted {
        // The recovery server shows up one poll late, then boots.
        let status = match s.polls_after_request {
            0 => None,
            1 => Some("creating"),
            2 => Some("settingUp"),
            _ => Some("running"),
        };
        s.polls_after_request += 1;
        if let Some(status) = status {
            servers.push(server_entry("460", "orders-db-rec", "R", status));
        }
    }

    Ok(envelope(json!({
        "totalRows": 1,
        "cloudMysqlInstanceList": [{
            "cloudMysqlInstanceNo": "452",
            "cloudMysqlServiceName": "orders-db",
            "cloudMysqlInstanceStatusName": "running",
            "cloudMysqlServerInstanceList": servers
        }]
    })))
}

async fn create_recovery_handler(State(state): State<Shared>) -> Json<Value> {
    state.lock().unwrap().recovery_requested = true;
    envelope(json!({"totalRows": 0, "cloudMysqlInstanceList": []}))
}

async fn delete_server_handler(
    State(state): State<Shared>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut s = state.lock().unwrap();
    if s.parent_deleted {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "responseError": {
                    "returnCode": "5001017",
                    "returnMessage": "the cloud mysql instance does not exist"
                }
            })),
        ));
    }
    s.recovery_deleted = true;
    Ok(envelope(json!({"totalRows": 0, "cloudMysqlInstanceList": []})))
}

fn router() -> (Router, Shared) {
    let state: Shared = Arc::new(Mutex::new(MockState::default()));
    let router = Router::new()
        .route("/vmysql/v2/getCloudMysqlInstanceDetail", post(get_handler))
        .route(
            "/vmysql/v2/createCloudMysqlRecoveryInstance",
            post(create_recovery_handler),
        )
        .route(
            "/vmysql/v2/deleteCloudMysqlServerInstance",
            post(delete_server_handler),
        )
        .with_state(state.clone());
    (router, state)
}

#[tokio::test]
async fn create_resolves_the_server_by_name_and_waits_for_running() {
    let (router, state) = router();
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({
        "mysql_instance_no": "452",
        "recovery_server_name": "orders-db-rec",
        "recovery_time": "20260830120000"
    }))
    .unwrap();

    resource::create(&provider, "nimbus_mysql_recovery", &mut data)
        .await
        .unwrap();

    assert_eq!(data.id(), Some("452:460"));
    assert_eq!(data.get_string("status_name").as_deref(), Some("running"));
    assert_eq!(
        data.get_string("private_domain").as_deref(),
        Some("db-460.vpc.internal")
    );
    // Needed at least one poll where the server was not listed yet.
    assert!(state.lock().unwrap().polls_after_request >= 3);

    server.shutdown().await;
}

#[tokio::test]
async fn delete_waits_until_the_server_leaves_the_list() {
    let (router, state) = router();
    {
        let mut s = state.lock().unwrap();
        s.recovery_requested = true;
        s.polls_after_request = 3; // already running
    }
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({
        "mysql_instance_no": "452",
        "recovery_server_name": "orders-db-rec"
    }))
    .unwrap();
    data.set_id("460");

    resource::delete(&provider, "nimbus_mysql_recovery", &mut data)
        .await
        .unwrap();

    assert!(data.id().is_none());
    assert!(state.lock().unwrap().recovery_deleted);

    server.shutdown().await;
}

#[tokio::test]
async fn destroy_by_composite_id_needs_no_attributes() {
    let (router, state) = router();
    {
        let mut s = state.lock().unwrap();
        s.recovery_requested = true;
        s.polls_after_request = 3; // already running
    }
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    // `destroy nimbus_mysql_recovery 452:460` from the CLI: id only.
    let mut data = ResourceData::with_id("452:460");
    resource::delete(&provider, "nimbus_mysql_recovery", &mut data)
        .await
        .unwrap();

    assert!(data.id().is_none());
    assert!(state.lock().unwrap().recovery_deleted);

    server.shutdown().await;
}

#[tokio::test]
async fn get_by_composite_id_resolves_the_parent() {
    let (router, state) = router();
    {
        let mut s = state.lock().unwrap();
        s.recovery_requested = true;
        s.polls_after_request = 3; // already running
    }
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::with_id("452:460");
    resource::read(&provider, "nimbus_mysql_recovery", &mut data)
        .await
        .unwrap();

    assert_eq!(data.get_string("mysql_instance_no").as_deref(), Some("452"));
    assert_eq!(data.get_string("status_name").as_deref(), Some("running"));

    server.shutdown().await;
}

#[tokio::test]
async fn destroy_succeeds_when_the_parent_is_already_gone() {
    let (router, state) = router();
    state.lock().unwrap().parent_deleted = true;
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::with_id("452:460");
    resource::delete(&provider, "nimbus_mysql_recovery", &mut data)
        .await
        .unwrap();
    assert!(data.id().is_none());

    server.shutdown().await;
}

#[tokio::test]
async fn file_name_and_recovery_time_conflict() {
    let (router, _state) = router();
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({
        "mysql_instance_no": "452",
        "recovery_server_name": "orders-db-rec",
        "file_name": "backup-20260829.bak",
        "recovery_time": "20260830120000"
    }))
    .unwrap();

    let err = resource::create(&provider, "nimbus_mysql_recovery", &mut data)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        nimbus_provider::error::ProviderError::Schema(_)
    ));

    server.shutdown().await;
}
