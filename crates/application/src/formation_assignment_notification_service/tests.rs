use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tessera_core::AppError;
use tessera_domain::{
    AssignmentState, FormationOperation, NotificationDetails, ParticipantType, WebhookOwnerType,
};

use crate::formation_ports::LabelableObject;
use crate::participant_data_builder::LabelledParticipantDataBuilder;
use crate::test_support::{
    CallLog, FakeAssignmentRepository, FakeFormationRepository, FakeNotificationBuilder,
    FakeParticipants, FakeTenantContextResolver, FakeWebhookRepository, assignment, webhook,
};

use super::FormationAssignmentNotificationService;

struct Harness {
    service: FormationAssignmentNotificationService,
    repository: Arc<FakeAssignmentRepository>,
    log: CallLog,
}

fn harness(participants: FakeParticipants, webhooks: Vec<(&str, WebhookOwnerType)>) -> Harness {
    let log = CallLog::default();
    let participants = Arc::new(FakeParticipants {
        log: log.clone(),
        ..participants
    });
    let repository = Arc::new(FakeAssignmentRepository::with_log(log.clone()));
    let webhook_repository = FakeWebhookRepository {
        webhooks: webhooks
            .into_iter()
            .map(|(object_id, object_type)| (object_id.to_owned(), webhook(object_id, object_type)))
            .collect::<HashMap<_, _>>(),
        log: log.clone(),
    };
    let builder = LabelledParticipantDataBuilder::new(
        participants.clone(),
        participants.clone(),
        participants.clone(),
        participants.clone(),
        participants,
    );

    let service = FormationAssignmentNotificationService::new(
        repository.clone(),
        Arc::new(webhook_repository),
        Arc::new(builder),
        Arc::new(FakeFormationRepository::default()),
        Arc::new(FakeNotificationBuilder {
            log: log.clone(),
        }),
        Arc::new(FakeTenantContextResolver),
    );

    Harness {
        service,
        repository,
        log,
    }
}

#[tokio::test]
async fn application_pair_builds_tenant_mapping_notification() {
    let harness = harness(
        FakeParticipants::default()
            .with_application("app1", None)
            .with_application("app2", None),
        vec![("app2", WebhookOwnerType::Application)],
    );
    let forward = assignment(
        "fa-1",
        "app1",
        ParticipantType::Application,
        "app2",
        ParticipantType::Application,
        AssignmentState::Ready,
    );
    let reverse = assignment(
        "fa-2",
        "app2",
        ParticipantType::Application,
        "app1",
        ParticipantType::Application,
        AssignmentState::Ready,
    );
    harness.repository.insert(forward.clone()).await;
    harness.repository.insert(reverse).await;

    let request = harness
        .service
        .generate_notification(&forward)
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());

    let details: NotificationDetails =
        serde_json::from_value(request.body).unwrap_or_else(|_| unreachable!());
    let NotificationDetails::ApplicationTenantMapping(details) = details else {
        unreachable!()
    };
    assert_eq!(details.assignment.id, "fa-1");
    assert_eq!(details.reverse_assignment.source, "app2");
    assert_eq!(details.target_application.application.id, "app2");
    assert_eq!(details.source_application.application.id, "app1");
    assert_eq!(details.operation, FormationOperation::Assign);
    assert_eq!(request.url, "https://hooks.example.com/app2");
}

#[tokio::test]
async fn application_target_without_webhook_yields_no_notification() {
    let harness = harness(
        FakeParticipants::default().with_application("app2", None),
        Vec::new(),
    );
    let forward = assignment(
        "fa-1",
        "app1",
        ParticipantType::Application,
        "app2",
        ParticipantType::Application,
        AssignmentState::Initial,
    );

    let result = harness.service.generate_notification(&forward).await;

    assert!(matches!(result, Ok(None)));
    assert_eq!(harness.log.calls().await, vec!["webhook:app2".to_owned()]);
}

#[tokio::test]
async fn runtime_source_embeds_runtime_and_first_context() {
    let harness = harness(
        FakeParticipants::default()
            .with_application("app1", None)
            .with_runtime("runtime-1")
            .with_runtime_context("ctx-1", "runtime-1"),
        vec![("app1", WebhookOwnerType::Application)],
    );
    let forward = assignment(
        "fa-1",
        "runtime-1",
        ParticipantType::Runtime,
        "app1",
        ParticipantType::Application,
        AssignmentState::Initial,
    );
    harness.repository.insert(forward.clone()).await;
    harness
        .repository
        .insert(assignment(
            "fa-2",
            "app1",
            ParticipantType::Application,
            "runtime-1",
            ParticipantType::Runtime,
            AssignmentState::Initial,
        ))
        .await;

    let request = harness
        .service
        .generate_notification(&forward)
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());

    let details: NotificationDetails =
        serde_json::from_value(request.body).unwrap_or_else(|_| unreachable!());
    let NotificationDetails::ConfigurationChange(details) = details else {
        unreachable!()
    };
    assert_eq!(details.resource_type, ParticipantType::Application);
    assert_eq!(details.runtime.runtime.id, "runtime-1");
    assert_eq!(
        details
            .runtime_context
            .map(|context| context.runtime_context.id),
        Some("ctx-1".to_owned())
    );
    assert_eq!(details.reverse_assignment.id, "fa-2");
    assert_eq!(details.assignment.value, "\"\"");
}

#[tokio::test]
async fn runtime_context_source_resolves_owning_runtime() {
    let harness = harness(
        FakeParticipants::default()
            .with_application("app1", None)
            .with_runtime("runtime-7")
            .with_runtime_context("ctx-1", "runtime-7")
            .with_label(
                LabelableObject::RuntimeContext,
                "ctx-1",
                "region",
                json!("eu-10"),
            ),
        vec![("app1", WebhookOwnerType::Application)],
    );
    let forward = assignment(
        "fa-1",
        "ctx-1",
        ParticipantType::RuntimeContext,
        "app1",
        ParticipantType::Application,
        AssignmentState::Initial,
    );
    harness.repository.insert(forward.clone()).await;
    harness
        .repository
        .insert(assignment(
            "fa-2",
            "app1",
            ParticipantType::Application,
            "ctx-1",
            ParticipantType::RuntimeContext,
            AssignmentState::Initial,
        ))
        .await;

    let request = harness
        .service
        .generate_notification(&forward)
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());

    assert_eq!(request.webhook.object_id, "app1");
    let details: NotificationDetails =
        serde_json::from_value(request.body).unwrap_or_else(|_| unreachable!());
    let NotificationDetails::ConfigurationChange(details) = details else {
        unreachable!()
    };
    assert_eq!(details.resource_type, ParticipantType::Application);
    assert_eq!(details.application.application.id, "app1");
    assert_eq!(details.runtime.runtime.id, "runtime-7");
    let runtime_context = details
        .runtime_context
        .unwrap_or_else(|| unreachable!());
    assert_eq!(runtime_context.runtime_context.id, "ctx-1");
    assert_eq!(runtime_context.runtime_context.runtime_id, "runtime-7");
    assert_eq!(runtime_context.labels.get("region"), Some(&json!("eu-10")));
    assert_eq!(details.reverse_assignment.id, "fa-2");

    let context_lookup = harness.log.position("runtime_context:ctx-1").await;
    let runtime_lookup = harness.log.position("runtime:runtime-7").await;
    assert!(context_lookup.is_some() && context_lookup < runtime_lookup);
    assert!(harness.log.position("runtime_contexts:runtime-7").await.is_none());
}

#[tokio::test]
async fn runtime_context_target_uses_owning_runtime_webhook() {
    let harness = harness(
        FakeParticipants::default()
            .with_application("app1", None)
            .with_runtime("runtime-1")
            .with_runtime_context("ctx-1", "runtime-1"),
        vec![("runtime-1", WebhookOwnerType::Runtime)],
    );
    let forward = assignment(
        "fa-1",
        "app1",
        ParticipantType::Application,
        "ctx-1",
        ParticipantType::RuntimeContext,
        AssignmentState::Initial,
    );
    harness.repository.insert(forward.clone()).await;
    harness
        .repository
        .insert(assignment(
            "fa-2",
            "ctx-1",
            ParticipantType::RuntimeContext,
            "app1",
            ParticipantType::Application,
            AssignmentState::Initial,
        ))
        .await;

    let request = harness
        .service
        .generate_notification(&forward)
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());

    assert_eq!(request.webhook.object_id, "runtime-1");
    let details: NotificationDetails =
        serde_json::from_value(request.body).unwrap_or_else(|_| unreachable!());
    assert_eq!(details.resource_type(), ParticipantType::RuntimeContext);
}

#[tokio::test]
async fn unsupported_reverse_type_fails_before_any_lookup() {
    let harness = harness(
        FakeParticipants::default().with_runtime("runtime-1"),
        vec![("runtime-1", WebhookOwnerType::Runtime)],
    );
    let forward = assignment(
        "fa-1",
        "ctx-1",
        ParticipantType::RuntimeContext,
        "runtime-1",
        ParticipantType::Runtime,
        AssignmentState::Initial,
    );

    let result = harness.service.generate_notification(&forward).await;

    assert!(matches!(
        result,
        Err(AppError::UnsupportedParticipantType(_))
    ));
    assert!(harness.log.calls().await.is_empty());
}

#[tokio::test]
async fn missing_reverse_assignment_aborts_generation() {
    let harness = harness(
        FakeParticipants::default()
            .with_application("app1", None)
            .with_runtime("runtime-1"),
        vec![("runtime-1", WebhookOwnerType::Runtime)],
    );
    let forward = assignment(
        "fa-1",
        "app1",
        ParticipantType::Application,
        "runtime-1",
        ParticipantType::Runtime,
        AssignmentState::Initial,
    );

    let result = harness.service.generate_notification(&forward).await;

    assert!(matches!(result, Err(ref error) if error.is_not_found()));
    assert!(!harness.log.calls().await.iter().any(|call| call.starts_with("build:")));
}

#[tokio::test]
async fn assignment_pair_generates_both_sides() {
    let harness = harness(
        FakeParticipants::default()
            .with_application("app1", None)
            .with_application("app2", None),
        vec![("app1", WebhookOwnerType::Application)],
    );
    let forward = assignment(
        "fa-1",
        "app1",
        ParticipantType::Application,
        "app2",
        ParticipantType::Application,
        AssignmentState::Ready,
    );
    let reverse = assignment(
        "fa-2",
        "app2",
        ParticipantType::Application,
        "app1",
        ParticipantType::Application,
        AssignmentState::Ready,
    );
    harness.repository.insert(forward.clone()).await;
    harness.repository.insert(reverse.clone()).await;

    let pair = harness
        .service
        .generate_assignment_pair(&forward, &reverse, FormationOperation::Assign)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(pair.assignment.request.is_none());
    assert!(pair.reverse_assignment.request.is_some());
    assert!(!pair.has_no_requests());
}
