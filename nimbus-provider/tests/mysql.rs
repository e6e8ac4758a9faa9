//! Managed MySQL lifecycle tests against a mock VPC API.

mod common;

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use nimbus_provider::error::ProviderError;
use nimbus_provider::{ResourceData, resource};
use nimbus_sdk::Platform;

#[derive(Default)]
struct MockState {
    get_polls: u32,
    deleted: bool,
    create_body: Option<Value>,
}

type Shared = Arc<Mutex<MockState>>;

fn envelope(mut payload: Value) -> Json<Value> {
    let obj = payload.as_object_mut().unwrap();
    obj.insert("requestId".into(), json!("req-1"));
    obj.insert("returnCode".into(), json!("0"));
    obj.insert("returnMessage".into(), json!("success"));
    Json(payload)
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "responseError": {
                "returnCode": "5001017",
                "returnMessage": "the cloud mysql instance does not exist"
            }
        })),
    )
}

fn instance(status: &str) -> Value {
    json!({
        "cloudMysqlInstanceNo": "452",
        "cloudMysqlServiceName": "orders-db",
        "cloudMysqlInstanceStatusName": status,
        "engineVersion": "MYSQL8.0.36",
        "isHa": true,
        "isMultiZone": false,
        "isBackup": true,
        "backupFileRetentionPeriod": 7,
        "backupTime": "02:00",
        "cloudMysqlPort": 13306,
        "cloudMysqlServerInstanceList": [
            {
                "cloudMysqlServerInstanceNo": "453",
                "cloudMysqlServerName": "orders-db-001",
                "cloudMysqlServerRole": {"code": "M", "codeName": "Master"},
                "cloudMysqlServerInstanceStatusName": status,
                "subnetNo": "31",
                "vpcNo": "12",
                "privateDomain": "db-453.vpc.internal"
            },
            {
                "cloudMysqlServerInstanceNo": "454",
                "cloudMysqlServerName": "orders-db-002",
                "cloudMysqlServerRole": {"code": "H", "codeName": "Standby Master"},
                "cloudMysqlServerInstanceStatusName": status,
                "subnetNo": "31",
                "vpcNo": "12",
                "privateDomain": "db-454.vpc.internal"
            }
        ]
    })
}

async fn create_handler(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state.lock().unwrap().create_body = Some(body);
    envelope(json!({
        "totalRows": 1,
        "cloudMysqlInstanceList": [instance("creating")]
    }))
}

async fn get_handler(State(state): State<Shared>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut s = state.lock().unwrap();
    if s.deleted {
        return Err(not_found());
    }
    let status = match s.get_polls {
        0 => "creating",
        1 => "settingUp",
        _ => "running",
    };
    s.get_polls += 1;
    Ok(envelope(json!({
        "totalRows": 1,
        "cloudMysqlInstanceList": [instance(status)]
    })))
}

async fn delete_handler(State(state): State<Shared>) -> Json<Value> {
    state.lock().unwrap().deleted = true;
    envelope(json!({
        "totalRows": 1,
        "cloudMysqlInstanceList": [instance("deleting")]
    }))
}

fn router() -> (Router, Shared) {
    let state: Shared = Arc::new(Mutex::new(MockState::default()));
    let router = Router::new()
        .route("/vmysql/v2/createCloudMysqlInstance", post(create_handler))
        .route("/vmysql/v2/getCloudMysqlInstanceDetail", post(get_handler))
        .route("/vmysql/v2/deleteCloudMysqlInstance", post(delete_handler))
        .with_state(state.clone());
    (router, state)
}

fn definition() -> Value {
    json!({
        "service_name": "orders-db",
        "server_name_prefix": "orders-db",
        "user_name": "app",
        "user_password": "s3cret!pw",
        "host_ip": "10.0.0.0/16",
        "database_name": "orders",
        "subnet_no": "31",
        "is_ha": true,
        "backup_file_retention_period": 7,
        "port": 13306
    })
}

#[tokio::test]
async fn create_waits_through_setting_up_and_flattens_response() {
    let (router, state) = router();
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(definition()).unwrap();
    resource::create(&provider, "nimbus_mysql", &mut data)
        .await
        .unwrap();

    assert_eq!(data.id(), Some("452"));
    assert_eq!(data.get_string("status_name").as_deref(), Some("running"));
    assert_eq!(data.get_bool("is_ha"), Some(true));
    assert_eq!(data.get_i64("port"), Some(13306));
    assert_eq!(
        data.get_string("engine_version").as_deref(),
        Some("MYSQL8.0.36")
    );
    let servers = data.get("server_instances").unwrap().as_array().unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0]["role"], "M");
    assert_eq!(servers[1]["role"], "H");

    // Booleans and the port reached the wire as typed fields.
    let body = state.lock().unwrap().create_body.clone().unwrap();
    assert_eq!(body["isHa"], json!(true));
    assert_eq!(body["cloudMysqlPort"], json!(13306));
    assert_eq!(body["regionCode"], json!("KR"));

    server.shutdown().await;
}

#[tokio::test]
async fn delete_treats_not_found_as_removed() {
    let (router, state) = router();
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::with_id("452");
    resource::delete(&provider, "nimbus_mysql", &mut data)
        .await
        .unwrap();

    assert!(data.id().is_none());
    assert!(state.lock().unwrap().deleted);

    server.shutdown().await;
}

#[tokio::test]
async fn read_after_removal_clears_the_id() {
    let (router, state) = router();
    state.lock().unwrap().deleted = true;
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::with_id("452");
    resource::read(&provider, "nimbus_mysql", &mut data)
        .await
        .unwrap();
    assert!(data.id().is_none());

    server.shutdown().await;
}

#[tokio::test]
async fn multi_zone_without_ha_is_rejected() {
    let (router, state) = router();
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut def = definition();
    def["is_ha"] = json!(false);
    def["is_multi_zone"] = json!(true);
    let mut data = ResourceData::from_value(def).unwrap();

    let err = resource::create(&provider, "nimbus_mysql", &mut data)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidAttributes(_)));
    assert!(state.lock().unwrap().create_body.is_none());

    server.shutdown().await;
}

#[tokio::test]
async fn manual_backup_requires_a_backup_time() {
    let (router, _state) = router();
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Vpc);

    let mut def = definition();
    def["is_backup"] = json!(true);
    def["is_automatic_backup"] = json!(false);
    let mut data = ResourceData::from_value(def).unwrap();

    let err = resource::create(&provider, "nimbus_mysql", &mut data)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidAttributes(_)));

    server.shutdown().await;
}

#[tokio::test]
async fn rejected_on_classic_platform_without_any_call() {
    let (router, state) = router();
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Classic);

    let mut data = ResourceData::from_value(definition()).unwrap();
    let err = resource::create(&provider, "nimbus_mysql", &mut data)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnsupportedPlatform { .. }));
    assert_eq!(state.lock().unwrap().get_polls, 0);

    server.shutdown().await;
}
