//! Data source tests: access control group lookup and SourceBuild catalogs.

mod common;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use nimbus_provider::error::ProviderError;
use nimbus_provider::{ResourceData, resource};
use nimbus_sdk::Platform;

fn envelope(mut payload: Value) -> Json<Value> {
    let obj = payload.as_object_mut().unwrap();
    obj.insert("requestId".into(), json!("req-1"));
    obj.insert("returnCode".into(), json!("0"));
    obj.insert("returnMessage".into(), json!("success"));
    Json(payload)
}

async fn vpc_acg_list(Json(req): Json<Value>) -> Json<Value> {
    let mut groups = vec![
        json!({
            "accessControlGroupNo": "55000",
            "accessControlGroupName": "default-acg",
            "accessControlGroupDescription": "default",
            "isDefault": true,
            "vpcNo": "12"
        }),
        json!({
            "accessControlGroupNo": "55001",
            "accessControlGroupName": "web-acg",
            "accessControlGroupDescription": "frontends",
            "isDefault": false,
            "vpcNo": "12"
        }),
        json!({
            "accessControlGroupNo": "55002",
            "accessControlGroupName": "db-acg",
            "accessControlGroupDescription": "databases",
            "isDefault": false,
            "vpcNo": "12"
        }),
    ];
    if let Some(name) = req.get("accessControlGroupName").and_then(Value::as_str) {
        groups.retain(|g| g["accessControlGroupName"] == name);
    }
    if let Some(nos) = req.get("accessControlGroupNoList").and_then(Value::as_array) {
        groups.retain(|g| nos.contains(&g["accessControlGroupNo"]));
    }
    envelope(json!({
        "totalRows": groups.len(),
        "accessControlGroupList": groups
    }))
}

async fn classic_acg_list() -> Json<Value> {
    envelope(json!({
        "totalRows": 1,
        "accessControlGroupList": [
            {
                "accessControlGroupConfigurationNo": "1651",
                "accessControlGroupName": "nimbus-default-acg",
                "accessControlGroupDescription": "default",
                "isDefaultGroup": true
            }
        ]
    }))
}

fn vpc_router() -> Router {
    Router::new().route("/vserver/v2/getAccessControlGroupList", post(vpc_acg_list))
}

#[tokio::test]
async fn acg_filter_narrows_to_exactly_one() {
    let server = common::MockCloud::spawn(vpc_router()).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({
        "filter": [{"name": "name", "values": ["^web-"], "regex": true}]
    }))
    .unwrap();

    resource::read(&provider, "nimbus_access_control_group", &mut data)
        .await
        .unwrap();

    assert_eq!(data.id(), Some("55001"));
    assert_eq!(data.get_string("name").as_deref(), Some("web-acg"));
    assert_eq!(data.get_string("description").as_deref(), Some("frontends"));
    assert_eq!(data.get_bool("is_default"), Some(false));

    server.shutdown().await;
}

#[tokio::test]
async fn acg_is_default_query_filters_client_side_on_vpc() {
    let server = common::MockCloud::spawn(vpc_router()).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({"is_default": true})).unwrap();
    resource::read(&provider, "nimbus_access_control_group", &mut data)
        .await
        .unwrap();
    assert_eq!(data.id(), Some("55000"));

    server.shutdown().await;
}

#[tokio::test]
async fn acg_resolves_again_after_a_refresh() {
    let server = common::MockCloud::spawn(vpc_router()).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({"name": "db-acg"})).unwrap();
    resource::read(&provider, "nimbus_access_control_group", &mut data)
        .await
        .unwrap();
    assert_eq!(data.id(), Some("55002"));

    // Second resolution on the same data: the map now carries the computed
    // description this handler wrote the first time.
    resource::read(&provider, "nimbus_access_control_group", &mut data)
        .await
        .unwrap();
    assert_eq!(data.id(), Some("55002"));
    assert_eq!(data.get_string("description").as_deref(), Some("databases"));

    server.shutdown().await;
}

#[tokio::test]
async fn acg_multiple_matches_are_ambiguous() {
    let server = common::MockCloud::spawn(vpc_router()).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({})).unwrap();
    let err = resource::read(&provider, "nimbus_access_control_group", &mut data)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::AmbiguousResult { count: 3 }));

    server.shutdown().await;
}

#[tokio::test]
async fn acg_no_match_is_not_found() {
    let server = common::MockCloud::spawn(vpc_router()).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({
        "filter": [{"name": "name", "values": ["missing-acg"]}]
    }))
    .unwrap();
    let err = resource::read(&provider, "nimbus_access_control_group", &mut data)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotFound { .. }));

    server.shutdown().await;
}

#[tokio::test]
async fn classic_acg_rows_carry_deprecated_aliases() {
    let router =
        Router::new().route("/server/v2/getAccessControlGroupList", post(classic_acg_list));
    let server = common::MockCloud::spawn(router).await;
    let provider = server.provider(Platform::Classic);

    let mut data = ResourceData::from_value(json!({"is_default": true})).unwrap();
    resource::read(&provider, "nimbus_access_control_group", &mut data)
        .await
        .unwrap();

    assert_eq!(data.id(), Some("1651"));
    assert_eq!(data.get_string("configuration_no").as_deref(), Some("1651"));
    assert_eq!(data.get_bool("is_default_group"), Some(true));
    assert_eq!(data.get_bool("is_default"), Some(true));

    server.shutdown().await;
}

async fn docker_env() -> Json<Value> {
    Json(json!({
        "docker": [
            {"id": 1, "name": "docker:18.09.1"},
            {"id": 2, "name": "docker:20.10.8"}
        ]
    }))
}

async fn runtime_versions() -> Json<Value> {
    Json(json!({
        "version": [
            {"id": 10, "name": "3.11"},
            {"id": 11, "name": "3.12"}
        ]
    }))
}

fn sourcebuild_router() -> Router {
    Router::new()
        .route("/sourcebuild/v1/env/docker", get(docker_env))
        .route(
            "/sourcebuild/v1/env/os/1/runtime/2/version",
            get(runtime_versions),
        )
}

#[tokio::test]
async fn docker_engines_are_listed_and_filterable() {
    let server = common::MockCloud::spawn(sourcebuild_router()).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({
        "filter": [{"name": "name", "values": ["docker:20.10.8"]}]
    }))
    .unwrap();
    resource::read(&provider, "nimbus_sourcebuild_docker_engines", &mut data)
        .await
        .unwrap();

    assert_eq!(data.id(), Some("KR"));
    let engines = data.get("docker_engines").unwrap().as_array().unwrap();
    assert_eq!(engines.len(), 1);
    assert_eq!(engines[0]["id"], 2);

    server.shutdown().await;
}

#[tokio::test]
async fn docker_engines_can_be_read_twice() {
    let server = common::MockCloud::spawn(sourcebuild_router()).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({})).unwrap();
    resource::read(&provider, "nimbus_sourcebuild_docker_engines", &mut data)
        .await
        .unwrap();
    resource::read(&provider, "nimbus_sourcebuild_docker_engines", &mut data)
        .await
        .unwrap();

    assert_eq!(data.id(), Some("KR"));
    let engines = data.get("docker_engines").unwrap().as_array().unwrap();
    assert_eq!(engines.len(), 2);

    server.shutdown().await;
}

#[tokio::test]
async fn runtime_versions_resolve_for_an_os_runtime_pair() {
    let server = common::MockCloud::spawn(sourcebuild_router()).await;
    let provider = server.provider(Platform::Vpc);

    let mut data = ResourceData::from_value(json!({
        "os_id": 1,
        "runtime_id": 2
    }))
    .unwrap();
    resource::read(&provider, "nimbus_sourcebuild_runtime_versions", &mut data)
        .await
        .unwrap();

    assert_eq!(data.id(), Some("1-2"));
    let versions = data.get("runtime_versions").unwrap().as_array().unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0]["name"], "3.11");

    server.shutdown().await;
}
