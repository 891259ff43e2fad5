use chrono::{DateTime, Utc};
use tessera_domain::{AssignmentState, FormationAssignment};

/// Returns the state-change timestamp to persist when `updated` replaces a stored row.
///
/// The clock moves on a state change, and on a new value while the state stays
/// `CONFIG_PENDING`. Otherwise the stored timestamp is kept.
pub(crate) fn next_state_change_timestamp(
    stored_state: AssignmentState,
    stored_value: Option<&str>,
    stored_timestamp: Option<DateTime<Utc>>,
    updated: &FormationAssignment,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let state_changed = stored_state != updated.state;
    let config_changed = updated.state == AssignmentState::ConfigPending
        && stored_value != updated.value.as_deref();

    if state_changed || config_changed {
        Some(now)
    } else {
        stored_timestamp
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tessera_core::TenantId;
    use tessera_domain::{AssignmentState, FormationAssignment, ParticipantType};

    use super::next_state_change_timestamp;

    fn assignment(state: AssignmentState, value: Option<&str>) -> FormationAssignment {
        FormationAssignment {
            id: "fa-1".to_owned(),
            formation_id: "formation-1".to_owned(),
            tenant_id: TenantId::new(),
            source: "app-1".to_owned(),
            source_type: ParticipantType::Application,
            target: "app-2".to_owned(),
            target_type: ParticipantType::Application,
            state,
            value: value.map(str::to_owned),
            error: None,
            last_state_change_timestamp: None,
            last_notification_sent_timestamp: None,
        }
    }

    #[test]
    fn state_change_moves_the_clock() {
        let stored = Utc.timestamp_opt(10, 0).single();
        let now = Utc.timestamp_opt(20, 0).single().unwrap_or_default();

        let next = next_state_change_timestamp(
            AssignmentState::Initial,
            None,
            stored,
            &assignment(AssignmentState::Ready, None),
            now,
        );

        assert_eq!(next, Some(now));
    }

    #[test]
    fn config_pending_value_change_moves_the_clock() {
        let stored = Utc.timestamp_opt(10, 0).single();
        let now = Utc.timestamp_opt(20, 0).single().unwrap_or_default();

        let changed = next_state_change_timestamp(
            AssignmentState::ConfigPending,
            Some(r#"{"a":1}"#),
            stored,
            &assignment(AssignmentState::ConfigPending, Some(r#"{"a":2}"#)),
            now,
        );
        let unchanged = next_state_change_timestamp(
            AssignmentState::ConfigPending,
            Some(r#"{"a":1}"#),
            stored,
            &assignment(AssignmentState::ConfigPending, Some(r#"{"a":1}"#)),
            now,
        );

        assert_eq!(changed, Some(now));
        assert_eq!(unchanged, stored);
    }

    #[test]
    fn ready_value_change_keeps_the_clock() {
        let stored = Utc.timestamp_opt(10, 0).single();
        let now = Utc.timestamp_opt(20, 0).single().unwrap_or_default();

        let next = next_state_change_timestamp(
            AssignmentState::Ready,
            Some(r#"{"a":1}"#),
            stored,
            &assignment(AssignmentState::Ready, Some(r#"{"a":2}"#)),
            now,
        );

        assert_eq!(next, stored);
    }
}
