use tessera_domain::{
    AssignmentErrorCode, AssignmentState, FormationAssignment, FormationOperation,
};
use tracing::{error, info};

use crate::state::AppState;

/// Runs the reverse-notification follow-up detached from the request.
pub(super) fn spawn_reverse_notification(state: AppState, assignment: FormationAssignment) {
    tokio::spawn(async move {
        process_reverse_notification(&state, &assignment).await;
    });
}

/// Generates the notifications owed to the reverse side once a configuration arrived.
///
/// Requests are only prepared and logged; sending them is left to the delivery layer.
pub(super) async fn process_reverse_notification(
    state: &AppState,
    assignment: &FormationAssignment,
) {
    info!(
        assignment_id = %assignment.id,
        formation_id = %assignment.formation_id,
        "configuration is provided, starting formation assignment notifications processing"
    );

    let reverse = match state
        .formation_assignment_service
        .get_reverse_by_source_and_target(
            assignment.tenant_id,
            assignment.formation_id.as_str(),
            assignment.source.as_str(),
            assignment.target.as_str(),
        )
        .await
    {
        Ok(reverse) => reverse,
        Err(error) => {
            error!(
                assignment_id = %assignment.id,
                source = %assignment.source,
                target = %assignment.target,
                %error,
                "failed to get reverse formation assignment"
            );
            return;
        }
    };

    let pair = match state
        .notification_service
        .generate_assignment_pair(&reverse, assignment, FormationOperation::Assign)
        .await
    {
        Ok(pair) => pair,
        Err(error) => {
            error!(
                assignment_id = %reverse.id,
                %error,
                "failed to generate formation assignment notifications"
            );
            let reverse_id = reverse.id.clone();
            if let Err(update_error) = state
                .formation_assignment_service
                .set_assignment_to_error_state(
                    reverse.tenant_id,
                    reverse,
                    error.to_string().as_str(),
                    AssignmentErrorCode::TechnicalError,
                    AssignmentState::CreateError,
                )
                .await
            {
                error!(
                    assignment_id = %reverse_id,
                    error = %update_error,
                    "failed to move formation assignment to error state"
                );
            }
            return;
        }
    };

    if pair.has_no_requests() {
        info!(
            assignment_id = %assignment.id,
            "no formation assignment notification is generated"
        );
        return;
    }

    for mapping in [&pair.assignment, &pair.reverse_assignment] {
        let Some(request) = mapping.request.as_ref() else {
            continue;
        };

        info!(
            assignment_id = %mapping.assignment.id,
            webhook_id = %request.webhook.id,
            url = %request.url,
            correlation_id = %request.correlation_id,
            "formation assignment notification prepared"
        );

        if let Err(error) = state
            .formation_assignment_service
            .update_last_notification_sent_timestamp(mapping.assignment.id.as_str())
            .await
        {
            error!(
                assignment_id = %mapping.assignment.id,
                %error,
                "failed to stamp last notification sent timestamp"
            );
        }
    }

    info!(
        assignment_id = %assignment.id,
        "finished formation assignment notifications processing"
    );
}
