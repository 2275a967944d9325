//! Black-box tests for the command pipeline over in-memory collaborators.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{Value as JsonValue, json};

use kbdhub_auth::Principal;
use kbdhub_commands::{
    CommandRegistry, CreateFirmwareBuildingTaskCommand, ErrorCode, ExecutionContext,
    FetchKeyboardDefinitionListByStatusCommand, FetchOrganizationMembersCommand, PipelineError,
    RawInput, Reply, UpdateKeyboardDefinitionStatusCommand, execute,
};
use kbdhub_core::{
    BuildTask, DefinitionId, DefinitionStatus, KeyboardDefinition, Organization, OrganizationId,
    TaskId, Uid,
};
use kbdhub_platform::{
    DocumentStore, HttpMethod, InMemoryDocumentStore, InMemoryIdentityProvider, Platform,
    PlatformConfig,
    RecordingNotifier, RecordingTaskQueue, RecordingTokenSigner, UserProfile,
};

struct Fixture {
    store: Arc<InMemoryDocumentStore>,
    identity: Arc<InMemoryIdentityProvider>,
    queue: Arc<RecordingTaskQueue>,
    signer: Arc<RecordingTokenSigner>,
    notifier: Arc<RecordingNotifier>,
    platform: Platform,
}

impl Fixture {
    fn new() -> Self {
        kbdhub_observability::init();
        let store = Arc::new(InMemoryDocumentStore::new());
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let queue = Arc::new(RecordingTaskQueue::new());
        let signer = Arc::new(RecordingTokenSigner::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let config = PlatformConfig {
            project_id: "kbdhub-test".to_string(),
            queue_location: "asia-northeast1".to_string(),
            queue_name: "build-task-queue".to_string(),
            build_server_url: "https://build.example.com".to_string(),
            notification_url: "https://notify.example.com".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_ttl: Duration::minutes(3),
        };
        let platform = Platform::new(
            store.clone(),
            identity.clone(),
            queue.clone(),
            signer.clone(),
            notifier.clone(),
            config,
        );
        Self {
            store,
            identity,
            queue,
            signer,
            notifier,
            platform,
        }
    }
}

fn input(value: JsonValue) -> RawInput {
    serde_json::from_value(value).expect("test input must be an object")
}

fn admin_ctx(uid: &str) -> ExecutionContext {
    ExecutionContext::authenticated(Principal::new(uid).admin())
}

fn user_ctx(uid: &str) -> ExecutionContext {
    ExecutionContext::authenticated(Principal::new(uid))
}

fn definition(id: &str, author: &str, status: DefinitionStatus, updated_secs: i64) -> KeyboardDefinition {
    let at = Utc.timestamp_opt(updated_secs, 0).unwrap();
    KeyboardDefinition {
        id: DefinitionId::new(id),
        author_uid: Uid::new(author),
        name: format!("kbd-{id}"),
        vendor_id: 0xfeed,
        product_id: 0x6060,
        product_name: "split 40%".to_string(),
        status,
        json: r#"{"keymap":{}}"#.to_string(),
        reject_reason: None,
        created_at: at,
        updated_at: at,
    }
}

fn organization(id: &str, members: &[&str]) -> Organization {
    let now = Utc.timestamp_opt(1_000, 0).unwrap();
    Organization {
        id: OrganizationId::new(id),
        name: "Keeb Works".to_string(),
        description: "keyboard vendor".to_string(),
        icon_image_url: "https://example.com/icon.png".to_string(),
        website_url: "https://example.com".to_string(),
        contact_email_address: "hello@example.com".to_string(),
        contact_person_name: "Contact".to_string(),
        contact_tel: "000".to_string(),
        contact_address: "nowhere".to_string(),
        members: members.iter().map(|m| Uid::new(*m)).collect(),
        created_at: now,
        updated_at: now,
    }
}

fn profile(uid: &str, email: &str, name: &str) -> UserProfile {
    UserProfile {
        uid: Uid::new(uid),
        email: email.to_string(),
        display_name: name.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Guard ordering / short-circuit properties
// ─────────────────────────────────────────────────────────────────────────────

/// A request failing authentication *and* later guards reports
/// UNAUTHENTICATED, and the body is never reached (no mutation observed).
#[tokio::test]
async fn unauthenticated_wins_over_every_later_guard() {
    let fx = Fixture::new();
    fx.store
        .insert_definition(definition("d1", "author", DefinitionStatus::InReview, 100));

    let command = UpdateKeyboardDefinitionStatusCommand::new(fx.platform.clone());
    // Missing fields *and* invalid status *and* no principal.
    let reply = execute(
        &command,
        &input(json!({"status": "bogus"})),
        &ExecutionContext::anonymous(),
    )
    .await
    .unwrap();

    assert_eq!(reply.error_code(), Some(ErrorCode::Unauthenticated));
    let stored = fx
        .store
        .definition(&DefinitionId::new("d1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, DefinitionStatus::InReview);
    assert!(fx.signer.signed().is_empty());
    assert!(fx.notifier.deliveries().is_empty());
}

/// A required-fields failure is reported before allowed-values gets a say,
/// and the body never runs.
#[tokio::test]
async fn required_fields_short_circuits_allowed_values() {
    let fx = Fixture::new();
    let command = UpdateKeyboardDefinitionStatusCommand::new(fx.platform.clone());

    // "id" is missing and "status" carries a value allowed-values would
    // reject; the reply must name the missing field.
    let reply = execute(
        &command,
        &input(json!({"status": "bogus", "rejectReason": ""})),
        &admin_ctx("admin-1"),
    )
    .await
    .unwrap();

    let Reply::Failure { code, message } = reply else {
        panic!("expected failure");
    };
    assert_eq!(code, ErrorCode::InvalidParameter);
    assert_eq!(message, "id is required");
    assert!(fx.notifier.deliveries().is_empty());
}

/// Non-admin authenticated callers are rejected before any input validation.
#[tokio::test]
async fn admin_commands_reject_non_admins_before_validation() {
    let fx = Fixture::new();
    let command = FetchKeyboardDefinitionListByStatusCommand::new(fx.platform.clone());

    let reply = execute(&command, &RawInput::empty(), &user_ctx("u1"))
        .await
        .unwrap();
    assert_eq!(reply.error_code(), Some(ErrorCode::PermissionDenied));
}

// ─────────────────────────────────────────────────────────────────────────────
// Reply exclusivity
// ─────────────────────────────────────────────────────────────────────────────

proptest! {
    /// `success == true` iff `errorCode` is absent, for any payload and any
    /// failure.
    #[test]
    fn reply_serialization_is_exclusive(
        keys in proptest::collection::vec("[a-z]{1,8}", 0..5),
        values in proptest::collection::vec(any::<i64>(), 0..5),
        message in ".{0,40}",
    ) {
        let mut payload = serde_json::Map::new();
        for (k, v) in keys.iter().zip(values.iter()) {
            if k != "success" {
                payload.insert(k.clone(), json!(v));
            }
        }
        let success = Reply::Success(payload);
        let json = serde_json::to_value(&success).unwrap();
        prop_assert_eq!(&json["success"], &json!(true));
        prop_assert!(json.get("errorCode").is_none());

        let failure = Reply::failure(ErrorCode::PermissionDenied, message);
        let json = serde_json::to_value(&failure).unwrap();
        prop_assert_eq!(&json["success"], &json!(false));
        prop_assert!(json.get("errorCode").is_some());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario A — unauthenticated fetch
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_by_status_requires_authentication() {
    let fx = Fixture::new();
    let command = FetchKeyboardDefinitionListByStatusCommand::new(fx.platform.clone());

    let reply = execute(
        &command,
        &input(json!({"status": "approved"})),
        &ExecutionContext::anonymous(),
    )
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_value(&reply).unwrap(),
        json!({
            "success": false,
            "errorCode": "UNAUTHENTICATED",
            "errorMessage": "authentication required",
        })
    );
}

#[tokio::test]
async fn fetch_by_status_lists_matching_definitions_newest_first() {
    let fx = Fixture::new();
    fx.store
        .insert_definition(definition("a", "u1", DefinitionStatus::Approved, 100));
    fx.store
        .insert_definition(definition("b", "u1", DefinitionStatus::Draft, 200));
    fx.store
        .insert_definition(definition("c", "u2", DefinitionStatus::Approved, 300));

    let command = FetchKeyboardDefinitionListByStatusCommand::new(fx.platform.clone());
    let reply = execute(
        &command,
        &input(json!({"status": "approved"})),
        &admin_ctx("admin-1"),
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["success"], json!(true));
    let list = json["keyboardDefinitionList"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], json!("c"));
    assert_eq!(list[1]["id"], json!("a"));
    assert_eq!(list[0]["authorUid"], json!("u2"));
    assert_eq!(list[0]["status"], json!("approved"));
    assert_eq!(list[0]["updatedAt"], json!(300_000));
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario B — update on a missing definition
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_status_on_missing_definition_skips_signing_and_webhook() {
    let fx = Fixture::new();
    let command = UpdateKeyboardDefinitionStatusCommand::new(fx.platform.clone());

    let reply = execute(
        &command,
        &input(json!({"id": "ghost", "status": "approved", "rejectReason": ""})),
        &admin_ctx("admin-1"),
    )
    .await
    .unwrap();

    let Reply::Failure { code, message } = reply else {
        panic!("expected failure");
    };
    assert_eq!(code, ErrorCode::KeyboardDefinitionNotFound);
    assert_eq!(message, "Keyboard Definition not found: ghost");
    assert!(fx.signer.signed().is_empty());
    assert!(fx.notifier.deliveries().is_empty());
}

#[tokio::test]
async fn update_status_mutates_signs_and_notifies() {
    let fx = Fixture::new();
    fx.store
        .insert_definition(definition("d1", "author-1", DefinitionStatus::InReview, 100));
    fx.identity
        .insert(profile("author-1", "author@example.com", "Author One"));

    let command = UpdateKeyboardDefinitionStatusCommand::new(fx.platform.clone());
    let reply = execute(
        &command,
        &input(json!({"id": "d1", "status": "rejected", "rejectReason": "broken matrix"})),
        &admin_ctx("admin-1"),
    )
    .await
    .unwrap();

    assert_eq!(serde_json::to_value(&reply).unwrap(), json!({"success": true}));

    let stored = fx
        .store
        .definition(&DefinitionId::new("d1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, DefinitionStatus::Rejected);
    assert_eq!(stored.reject_reason.as_deref(), Some("broken matrix"));

    let deliveries = fx.notifier.deliveries();
    assert_eq!(deliveries.len(), 1);
    let (token, payload) = &deliveries[0];
    assert_eq!(token, "signed-token");
    assert_eq!(payload["email"], json!("author@example.com"));
    assert_eq!(payload["displayName"], json!("Author One"));
    assert_eq!(payload["keyboard"], json!("kbd-d1"));
    assert_eq!(payload["status"], json!("rejected"));
    assert_eq!(payload["definitionId"], json!("d1"));
    // The signed payload and the delivered payload are the same object.
    assert_eq!(fx.signer.signed(), vec![payload.clone()]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario C — organization members
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn members_listing_marks_exactly_the_caller_as_me() {
    let fx = Fixture::new();
    fx.store
        .insert_organization(organization("org-1", &["u1", "u2", "u3"]));
    fx.identity.insert(profile("u1", "u1@example.com", "One"));
    fx.identity.insert(profile("u2", "u2@example.com", "Two"));
    fx.identity.insert(profile("u3", "u3@example.com", "Three"));

    let command = FetchOrganizationMembersCommand::new(fx.platform.clone());
    let reply = execute(
        &command,
        &input(json!({"organizationId": "org-1"})),
        &user_ctx("u2"),
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["success"], json!(true));
    let members = json["members"].as_array().unwrap();
    assert_eq!(members.len(), 3);
    let me: Vec<&JsonValue> = members
        .iter()
        .filter(|m| m["me"] == json!(true))
        .collect();
    assert_eq!(me.len(), 1);
    assert_eq!(me[0]["uid"], json!("u2"));
    assert_eq!(me[0]["email"], json!("u2@example.com"));
}

#[tokio::test]
async fn members_listing_denies_non_members() {
    let fx = Fixture::new();
    fx.store
        .insert_organization(organization("org-1", &["u1", "u2"]));

    let command = FetchOrganizationMembersCommand::new(fx.platform.clone());
    let reply = execute(
        &command,
        &input(json!({"organizationId": "org-1"})),
        &user_ctx("outsider"),
    )
    .await
    .unwrap();
    assert_eq!(reply.error_code(), Some(ErrorCode::PermissionDenied));

    let reply = execute(
        &command,
        &input(json!({"organizationId": "org-404"})),
        &user_ctx("u1"),
    )
    .await
    .unwrap();
    assert_eq!(reply.error_code(), Some(ErrorCode::OrganizationNotFound));
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario D — build task ownership
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn foreign_task_answers_like_a_missing_task_and_enqueues_nothing() {
    let fx = Fixture::new();
    fx.store.insert_build_task(BuildTask {
        id: TaskId::new("t1"),
        uid: Uid::new("owner"),
        created_at: Utc.timestamp_opt(100, 0).unwrap(),
    });

    let command = CreateFirmwareBuildingTaskCommand::new(fx.platform.clone());
    let reply = execute(
        &command,
        &input(json!({"taskId": "t1"})),
        &user_ctx("someone-else"),
    )
    .await
    .unwrap();

    let Reply::Failure { code, message } = reply else {
        panic!("expected failure");
    };
    assert_eq!(code, ErrorCode::TaskNotFound);
    assert_eq!(message, "The task [t1] is not found (2)");
    assert!(fx.queue.enqueued().is_empty());

    let reply = execute(
        &command,
        &input(json!({"taskId": "missing"})),
        &user_ctx("owner"),
    )
    .await
    .unwrap();
    let Reply::Failure { code, message } = reply else {
        panic!("expected failure");
    };
    assert_eq!(code, ErrorCode::TaskNotFound);
    assert_eq!(message, "The task [missing] is not found (1)");
    assert!(fx.queue.enqueued().is_empty());
}

#[tokio::test]
async fn owned_task_enqueues_the_build_callback() {
    let fx = Fixture::new();
    fx.store.insert_build_task(BuildTask {
        id: TaskId::new("t1"),
        uid: Uid::new("owner"),
        created_at: Utc.timestamp_opt(100, 0).unwrap(),
    });

    let command = CreateFirmwareBuildingTaskCommand::new(fx.platform.clone());
    let reply = execute(&command, &input(json!({"taskId": "t1"})), &user_ctx("owner"))
        .await
        .unwrap();
    assert!(reply.is_success());

    let enqueued = fx.queue.enqueued();
    assert_eq!(enqueued.len(), 1);
    let task = &enqueued[0];
    assert_eq!(
        task.queue_path,
        "projects/kbdhub-test/locations/asia-northeast1/queues/build-task-queue"
    );
    assert_eq!(task.method, HttpMethod::Get);
    assert_eq!(
        task.url,
        "https://build.example.com/build?uid=owner&taskId=t1"
    );
    assert_eq!(
        task.headers,
        vec![("Content-Type".to_string(), "text/plain".to_string())]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario E — allowed values
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_status_is_an_invalid_parameter_naming_the_field() {
    let fx = Fixture::new();
    let command = FetchKeyboardDefinitionListByStatusCommand::new(fx.platform.clone());

    let reply = execute(
        &command,
        &input(json!({"status": "unknown"})),
        &admin_ctx("admin-1"),
    )
    .await
    .unwrap();

    let Reply::Failure { code, message } = reply else {
        panic!("expected failure");
    };
    assert_eq!(code, ErrorCode::InvalidParameter);
    assert!(message.contains("status"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher integration
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registry_dispatches_by_operation_name() {
    let fx = Fixture::new();
    fx.store
        .insert_definition(definition("a", "u1", DefinitionStatus::Draft, 100));
    let registry = CommandRegistry::with_default_commands(fx.platform.clone());

    let reply = registry
        .dispatch(
            FetchKeyboardDefinitionListByStatusCommand::NAME,
            &input(json!({"status": "draft"})),
            &admin_ctx("admin-1"),
        )
        .await
        .unwrap();
    assert!(reply.is_success());

    let err = registry
        .dispatch("noSuchCommand", &RawInput::empty(), &admin_ctx("admin-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnknownCommand(name) if name == "noSuchCommand"));
}
