//! Integration tests for the REST adapters
//!
//! Tests cover:
//! - Request paths and API versions per service
//! - Signature headers on GET and PUT
//! - Member and record deserialization
//! - Error body mapping and request ids

mod common;

use common::*;
use fss_cmk_core::{
    DisasterRecoveryService, Error, FileStorageService, IdentityService, MemberType,
};
use fss_cmk_oci::{DisasterRecoveryClient, FileStorageClient, IdentityClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_regions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/20160918/regions"))
        .and(header_exists("authorization"))
        .and(header_exists("date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"key": "IAD", "name": "us-ashburn-1"},
            {"key": "PHX", "name": "us-phoenix-1"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = IdentityClient::new(signed_client(), server.uri());
    let regions = client.list_regions().await.unwrap();

    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].name, "us-ashburn-1");
    assert_eq!(regions[0].code, "IAD");
}

#[tokio::test]
async fn test_list_protection_group_members() {
    let server = MockServer::start().await;
    let group_id = "ocid1.drprotectiongroup.oc1.iad.abc";
    Mock::given(method("GET"))
        .and(path(format!("/20220125/drProtectionGroups/{}", group_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": group_id,
            "displayName": "standby-pg",
            "members": [
                {"memberId": "ocid1.filesystem.oc1.iad.fs1", "memberType": "FILE_SYSTEM"},
                {"memberId": "ocid1.instance.oc1.iad.vm1", "memberType": "COMPUTE_INSTANCE_MOVABLE"},
                {"memberId": "ocid1.thing.oc1.iad.x", "memberType": "SOMETHING_NEW"}
            ]
        })))
        .mount(&server)
        .await;

    let client = DisasterRecoveryClient::new(signed_client(), server.uri());
    let members = client.list_protection_group_members(group_id).await.unwrap();

    assert_eq!(members.len(), 3);
    assert_eq!(members[0].member_type, MemberType::FileSystem);
    assert_eq!(members[1].member_type, MemberType::ComputeInstanceMovable);
    assert_eq!(members[2].member_type, MemberType::Unknown);
}

#[tokio::test]
async fn test_protection_group_without_members_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/20220125/drProtectionGroups/pg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "pg"})))
        .mount(&server)
        .await;

    let client = DisasterRecoveryClient::new(signed_client(), server.uri());
    assert!(client.list_protection_group_members("pg").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_service_error_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/20220125/drProtectionGroups/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("opc-request-id", "req-404")
                .set_body_json(json!({
                    "code": "NotAuthorizedOrNotFound",
                    "message": "Authorization failed or requested resource not found."
                })),
        )
        .mount(&server)
        .await;

    let client = DisasterRecoveryClient::new(signed_client(), server.uri());
    let err = client
        .list_protection_group_members("missing")
        .await
        .unwrap_err();

    match err {
        Error::Service {
            status,
            code,
            request_id,
            ..
        } => {
            assert_eq!(status, 404);
            assert_eq!(code, "NotAuthorizedOrNotFound");
            assert_eq!(request_id.as_deref(), Some("req-404"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_service_error_without_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/20160918/regions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = IdentityClient::new(signed_client(), server.uri());
    let err = client.list_regions().await.unwrap_err();

    assert_eq!(err.reason(), "503 ServiceUnavailable - upstream down");
}

#[tokio::test]
async fn test_transport_error() {
    // Nothing listens on the discard port
    let client = IdentityClient::new(signed_client(), "http://127.0.0.1:9");
    let err = client.list_regions().await.unwrap_err();
    assert!(matches!(err, Error::Transport { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_get_file_system() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/20171215/fileSystems/ocid1.filesystem.oc1.iad.fs1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ocid1.filesystem.oc1.iad.fs1",
            "displayName": "shared-data",
            "kmsKeyId": null,
            "lifecycleState": "ACTIVE",
            "freeformTags": {"key_iad": "ocid1.key.oc1.iad.k1", "key_phx": "ocid1.key.oc1.phx.k2"}
        })))
        .mount(&server)
        .await;

    let client = FileStorageClient::new(signed_client(), server.uri());
    let record = client
        .get_file_system("ocid1.filesystem.oc1.iad.fs1")
        .await
        .unwrap();

    assert_eq!(record.display_name, "shared-data");
    assert!(record.current_key_id.is_none());
    assert_eq!(record.tags.len(), 2);
}

#[tokio::test]
async fn test_update_kms_key_sends_signed_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/20171215/fileSystems/ocid1.filesystem.oc1.iad.fs1"))
        .and(header("content-type", "application/json"))
        .and(header_exists("x-content-sha256"))
        .and(header_exists("authorization"))
        .and(body_json(json!({"kmsKeyId": "ocid1.key.oc1.iad.k1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("opc-request-id", "req-put")
                .set_body_json(json!({
                    "id": "ocid1.filesystem.oc1.iad.fs1",
                    "kmsKeyId": "ocid1.key.oc1.iad.k1",
                    "lifecycleState": "UPDATING"
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = FileStorageClient::new(signed_client(), server.uri());
    let result = client
        .update_kms_key("ocid1.filesystem.oc1.iad.fs1", "ocid1.key.oc1.iad.k1")
        .await
        .unwrap();

    assert_eq!(result.file_system_id, "ocid1.filesystem.oc1.iad.fs1");
    assert_eq!(result.kms_key_id.as_deref(), Some("ocid1.key.oc1.iad.k1"));
    assert_eq!(result.lifecycle_state.as_deref(), Some("UPDATING"));
    assert_eq!(result.request_id.as_deref(), Some("req-put"));
}

#[tokio::test]
async fn test_authorization_header_carries_key_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/20160918/regions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = IdentityClient::new(signed_client(), server.uri());
    client.list_regions().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(auth.contains(&format!("keyId=\"{}\"", TEST_KEY_ID)));
    assert!(auth.contains("algorithm=\"rsa-sha256\""));
}
