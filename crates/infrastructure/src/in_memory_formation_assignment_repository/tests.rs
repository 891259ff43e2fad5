use tessera_application::FormationAssignmentRepository;
use tessera_core::{AppError, TenantId};
use tessera_domain::{AssignmentState, FormationAssignment, ParticipantType};

use super::InMemoryFormationAssignmentRepository;

fn assignment(tenant_id: TenantId, formation_id: &str, id: &str, source: &str) -> FormationAssignment {
    FormationAssignment {
        id: id.to_owned(),
        formation_id: formation_id.to_owned(),
        tenant_id,
        source: source.to_owned(),
        source_type: ParticipantType::Application,
        target: "runtime-1".to_owned(),
        target_type: ParticipantType::Runtime,
        state: AssignmentState::Initial,
        value: None,
        error: None,
        last_state_change_timestamp: None,
        last_notification_sent_timestamp: None,
    }
}

#[tokio::test]
async fn list_by_formation_ids_reports_next_page_per_formation() {
    let repository = InMemoryFormationAssignmentRepository::new();
    let tenant_id = TenantId::new();

    for (formation_id, count) in [("formation-full", 2), ("formation-overflow", 3)] {
        for index in 0..count {
            let created = repository
                .create(&assignment(
                    tenant_id,
                    formation_id,
                    format!("{formation_id}-{index}").as_str(),
                    format!("app-{index}").as_str(),
                ))
                .await;
            assert!(created.is_ok());
        }
    }

    let pages = repository
        .list_by_formation_ids(
            tenant_id,
            &[
                "formation-empty".to_owned(),
                "formation-full".to_owned(),
                "formation-overflow".to_owned(),
            ],
            2,
            "",
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let has_next: Vec<bool> = pages.iter().map(|page| page.page_info.has_next_page).collect();
    assert_eq!(has_next, vec![false, false, true]);
    let end_cursors: Vec<bool> = pages
        .iter()
        .map(|page| !page.page_info.end_cursor.is_empty())
        .collect();
    assert_eq!(end_cursors, vec![false, false, true]);
    assert!(pages.iter().all(|page| page.page_info.start_cursor.is_empty()));
    assert_eq!(pages[2].total_count, 3);

    let cursor = pages[2].page_info.end_cursor.clone();
    let next = repository
        .list_by_formation_ids(
            tenant_id,
            &["formation-overflow".to_owned()],
            2,
            cursor.as_str(),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(next[0].page_info.start_cursor, cursor);
    assert_eq!(next[0].data.len(), 1);
    assert_eq!(next[0].data[0].id, "formation-overflow-2");
    assert!(!next[0].page_info.has_next_page);
}

#[tokio::test]
async fn list_does_not_leak_across_tenants() {
    let repository = InMemoryFormationAssignmentRepository::new();
    let left = TenantId::new();
    let right = TenantId::new();

    assert!(repository.create(&assignment(left, "formation-1", "fa-1", "app-1")).await.is_ok());
    assert!(repository.create(&assignment(right, "formation-2", "fa-2", "app-2")).await.is_ok());

    let page = repository
        .list(left, 10, "")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(page.total_count, 1);
    assert_eq!(page.data[0].id, "fa-1");
    assert!(repository.get(right, "fa-1").await.is_err());
}

#[tokio::test]
async fn duplicate_pair_is_a_conflict() {
    let repository = InMemoryFormationAssignmentRepository::new();
    let tenant_id = TenantId::new();

    assert!(repository.create(&assignment(tenant_id, "formation-1", "fa-1", "app-1")).await.is_ok());
    let duplicate = repository
        .create(&assignment(tenant_id, "formation-1", "fa-2", "app-1"))
        .await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn update_is_global_and_tracks_state_changes() {
    let repository = InMemoryFormationAssignmentRepository::new();
    let tenant_id = TenantId::new();
    assert!(repository.create(&assignment(tenant_id, "formation-1", "fa-1", "app-1")).await.is_ok());
    let stored = repository
        .get_global_by_id("fa-1")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(stored.last_state_change_timestamp.is_some());

    let mut updated = stored.clone();
    updated.state = AssignmentState::ConfigPending;
    updated.value = Some(r#"{"key":"value"}"#.to_owned());
    assert!(repository.update(&updated).await.is_ok());

    let reloaded = repository
        .get(tenant_id, "fa-1")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(reloaded.state, AssignmentState::ConfigPending);
    assert_eq!(reloaded.value, updated.value);
    assert!(reloaded.last_state_change_timestamp >= stored.last_state_change_timestamp);

    let missing = assignment(tenant_id, "formation-1", "fa-404", "app-9");
    assert!(matches!(
        repository.update(&missing).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn delete_requires_owning_tenant() {
    let repository = InMemoryFormationAssignmentRepository::new();
    let tenant_id = TenantId::new();
    assert!(repository.create(&assignment(tenant_id, "formation-1", "fa-1", "app-1")).await.is_ok());

    let foreign = repository.delete(TenantId::new(), "fa-1").await;
    assert!(matches!(foreign, Err(AppError::Unauthorized(_))));
    assert_eq!(repository.exists(tenant_id, "fa-1").await, Ok(true));

    assert!(repository.delete(tenant_id, "fa-1").await.is_ok());
    assert_eq!(repository.exists(tenant_id, "fa-1").await, Ok(false));
}

#[tokio::test]
async fn object_queries_match_source_or_target() {
    let repository = InMemoryFormationAssignmentRepository::new();
    let tenant_id = TenantId::new();
    assert!(repository.create(&assignment(tenant_id, "formation-1", "fa-1", "app-1")).await.is_ok());
    assert!(repository.create(&assignment(tenant_id, "formation-1", "fa-2", "app-2")).await.is_ok());

    let for_runtime = repository
        .list_all_for_object(tenant_id, "formation-1", "runtime-1")
        .await
        .unwrap_or_default();
    assert_eq!(for_runtime.len(), 2);

    let for_app = repository
        .list_all_for_object_ids(tenant_id, "formation-1", &["app-2".to_owned()])
        .await
        .unwrap_or_default();
    assert_eq!(for_app.len(), 1);

    let stamped = repository.update_last_notification_sent_timestamp("fa-1").await;
    assert!(stamped.is_ok());
    let global = repository
        .list_all_for_object_global("app-1")
        .await
        .unwrap_or_default();
    assert!(global[0].last_notification_sent_timestamp.is_some());

    assert!(repository
        .delete_assignments_for_object_id(tenant_id, "formation-1", "app-1")
        .await
        .is_ok());
    let remaining = repository
        .get_assignments_for_formation_with_states(
            tenant_id,
            "formation-1",
            &[AssignmentState::Initial],
        )
        .await
        .unwrap_or_default();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "fa-2");
}
