use super::common::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::intake::{
    ConfigurationError, FieldChange, IntakeError, LeadField, LeadForm, PresentationEvent,
    SubmissionController, SubmissionState, SubmitOutcome, ValidationError,
    CONVERSION_EVENT_NAME, GENERIC_FAILURE_MESSAGE,
};

#[tokio::test]
async fn successful_submission_tracks_one_conversion() {
    let backend = ScriptedBackend::answering(&[200]);
    let (controller, analytics) = build_controller(backend.clone());
    fill(&controller, &jane_doe());

    let outcome = controller.submit().await.expect("form is complete");

    assert_eq!(outcome, SubmitOutcome::Submitted);
    assert_eq!(controller.status(), SubmissionState::Submitted);
    assert_eq!(backend.requests(), vec![jane_doe()]);
    let events = analytics.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), CONVERSION_EVENT_NAME);
    assert_eq!(events[0].delivery_timeout(), Duration::from_millis(2000));
}

#[tokio::test]
async fn server_error_fails_with_generic_message_and_keeps_fields() {
    let backend = ScriptedBackend::answering(&[500]);
    let (controller, analytics) = build_controller(backend.clone());
    fill(&controller, &jane_doe());

    let outcome = controller.submit().await.expect("form is complete");

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(
        controller.status(),
        SubmissionState::Failed("Something went wrong. Please try again.".to_string())
    );
    assert_eq!(controller.values(), jane_doe());
    assert!(analytics.events().is_empty());
}

#[tokio::test]
async fn transport_failure_is_absorbed_like_a_rejection() {
    let backend = ScriptedBackend::answering(&[0]);
    let (controller, analytics) = build_controller(backend);
    fill(&controller, &jane_doe());

    assert_eq!(controller.submit().await, Ok(SubmitOutcome::Failed));
    assert_eq!(
        controller.view().error_message(),
        Some(GENERIC_FAILURE_MESSAGE)
    );
    assert!(analytics.events().is_empty());
}

#[tokio::test]
async fn blank_suburb_blocks_submission_without_a_request() {
    let backend = ScriptedBackend::answering(&[200]);
    let (controller, analytics) = build_controller(backend.clone());
    let mut lead = jane_doe();
    lead.suburb.clear();
    fill(&controller, &lead);

    let err = controller.submit().await.expect_err("suburb is required");

    assert_eq!(
        err,
        ValidationError {
            missing: vec![LeadField::Suburb]
        }
    );
    assert_eq!(controller.status(), SubmissionState::Idle);
    assert!(backend.requests().is_empty());
    assert!(analytics.events().is_empty());
}

#[tokio::test]
async fn any_blank_required_field_is_gated_from_idle_and_failed() {
    for field in LeadField::REQUIRED {
        for starting_failed in [false, true] {
            let backend = ScriptedBackend::answering(&[503]);
            let (controller, _analytics) = build_controller(backend.clone());
            fill(&controller, &jane_doe());
            if starting_failed {
                assert_eq!(controller.submit().await, Ok(SubmitOutcome::Failed));
            }
            let before = controller.status();
            let requests_before = backend.requests().len();

            controller
                .set_field(field.key(), "   ")
                .expect("known field");
            let err = controller.submit().await.expect_err("blank field gated");

            assert_eq!(err.missing, vec![field]);
            assert_eq!(controller.status(), before);
            assert_eq!(backend.requests().len(), requests_before);
        }
    }
}

#[tokio::test]
async fn message_is_optional() {
    let backend = ScriptedBackend::answering(&[201]);
    let (controller, analytics) = build_controller(backend.clone());
    let mut lead = jane_doe();
    lead.message.clear();
    fill(&controller, &lead);

    assert_eq!(controller.submit().await, Ok(SubmitOutcome::Submitted));
    assert_eq!(backend.requests()[0].message, "");
    assert_eq!(analytics.events().len(), 1);
}

#[tokio::test]
async fn overlapping_submit_issues_a_single_request() {
    let backend = ScriptedBackend::gated();
    let (controller, analytics) = build_controller(backend.clone());
    fill(&controller, &jane_doe());

    let first = controller.submit();
    let second = async {
        backend.wait_until_called().await;
        assert_eq!(controller.status(), SubmissionState::Submitting);
        assert!(controller.view().is_submit_disabled);
        let outcome = controller.submit().await;
        backend.release();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, Ok(SubmitOutcome::Submitted));
    assert_eq!(second, Ok(SubmitOutcome::InFlight));
    assert_eq!(backend.requests().len(), 1);
    assert_eq!(analytics.events().len(), 1);
}

#[tokio::test]
async fn edits_while_in_flight_are_ignored() {
    let backend = ScriptedBackend::gated();
    let (controller, _analytics) = build_controller(backend.clone());
    fill(&controller, &jane_doe());

    let submit = controller.submit();
    let edit = async {
        backend.wait_until_called().await;
        let change = controller.set_field("name", "Someone Else");
        backend.release();
        change
    };
    let (outcome, change) = tokio::join!(submit, edit);

    assert_eq!(outcome, Ok(SubmitOutcome::Submitted));
    assert_eq!(change, Ok(FieldChange::Ignored(LeadField::Name)));
    assert_eq!(controller.values().name, "Jane Doe");
    assert_eq!(backend.requests()[0].name, "Jane Doe");
}

#[tokio::test]
async fn conversion_follows_backend_acknowledgement() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let backend = ScriptedBackend::answering(&[500, 200]).with_journal(journal.clone());
    let analytics = RecordingAnalytics::with_journal(journal.clone());
    let controller =
        SubmissionController::new(backend).with_analytics(Arc::new(analytics.clone()));
    fill(&controller, &jane_doe());

    assert_eq!(controller.submit().await, Ok(SubmitOutcome::Failed));
    assert_eq!(controller.submit().await, Ok(SubmitOutcome::Submitted));
    assert_eq!(controller.submit().await, Ok(SubmitOutcome::AlreadySubmitted));

    let journal = journal.lock().expect("journal mutex poisoned").clone();
    assert_eq!(
        journal,
        vec![
            "request".to_string(),
            "response 500".to_string(),
            "request".to_string(),
            "response 200".to_string(),
            "conversion Submit".to_string(),
        ]
    );
    assert_eq!(analytics.events().len(), 1);
}

#[tokio::test]
async fn retry_after_failure_resends_the_same_values() {
    let backend = ScriptedBackend::answering(&[502, 200]);
    let (controller, _analytics) = build_controller(backend.clone());
    fill(&controller, &jane_doe());

    assert_eq!(controller.submit().await, Ok(SubmitOutcome::Failed));
    assert_eq!(controller.values(), jane_doe());
    assert_eq!(controller.submit().await, Ok(SubmitOutcome::Submitted));

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
    assert_eq!(requests[1], jane_doe());
}

#[tokio::test]
async fn start_over_clears_the_form_after_success() {
    let backend = ScriptedBackend::answering(&[200]);
    let (controller, _analytics) = build_controller(backend);
    fill(&controller, &jane_doe());
    controller.submit().await.expect("form is complete");

    assert!(controller.reset_and_start_over());

    assert_eq!(controller.status(), SubmissionState::Idle);
    assert_eq!(controller.values(), LeadForm::default());
    assert!(controller.values().is_empty());
}

#[tokio::test]
async fn start_over_is_a_no_op_outside_submitted() {
    let backend = ScriptedBackend::answering(&[500]);
    let (controller, _analytics) = build_controller(backend);
    fill(&controller, &jane_doe());

    assert!(!controller.reset_and_start_over());
    assert_eq!(controller.values(), jane_doe());

    controller.submit().await.expect("form is complete");
    assert!(!controller.reset_and_start_over());
    assert!(matches!(controller.status(), SubmissionState::Failed(_)));
    assert_eq!(controller.values(), jane_doe());
}

#[tokio::test]
async fn edits_after_success_wait_for_start_over() {
    let backend = ScriptedBackend::answering(&[200]);
    let (controller, _analytics) = build_controller(backend);
    fill(&controller, &jane_doe());
    controller.submit().await.expect("form is complete");

    assert_eq!(
        controller.set_field("suburb", "Perth"),
        Ok(FieldChange::Ignored(LeadField::Suburb))
    );
    controller.reset_and_start_over();
    assert_eq!(
        controller.set_field("suburb", "Perth"),
        Ok(FieldChange::Applied(LeadField::Suburb))
    );
    assert_eq!(controller.values().suburb, "Perth");
}

#[test]
fn unknown_field_is_a_configuration_error() {
    let (controller, _analytics) = build_controller(ScriptedBackend::default());

    assert_eq!(
        controller.set_field("postcode", "2000"),
        Err(ConfigurationError::UnknownField("postcode".to_string()))
    );
    assert_eq!(controller.status(), SubmissionState::Idle);
}

#[tokio::test]
async fn dropped_submission_does_not_stay_in_flight() {
    let backend = ScriptedBackend::gated();
    let (controller, analytics) = build_controller(backend.clone());
    fill(&controller, &jane_doe());

    let abandoned = tokio::time::timeout(Duration::from_millis(20), controller.submit()).await;

    assert!(abandoned.is_err(), "gated backend never answers");
    assert_eq!(
        controller.status(),
        SubmissionState::Failed(GENERIC_FAILURE_MESSAGE.to_string())
    );
    assert_eq!(controller.values(), jane_doe());
    assert!(analytics.events().is_empty());
}

#[tokio::test]
async fn presentation_events_drive_the_full_lifecycle() {
    let backend = ScriptedBackend::answering(&[200]);
    let (controller, analytics) = build_controller(backend);
    let lead = jane_doe();

    for (field, value) in [
        ("name", &lead.name),
        ("email", &lead.email),
        ("phone", &lead.phone),
        ("suburb", &lead.suburb),
        ("message", &lead.message),
    ] {
        let view = controller
            .handle(PresentationEvent::FieldChanged {
                field: field.to_string(),
                value: value.clone(),
            })
            .await
            .expect("edit applies");
        assert!(!view.is_submit_disabled);
    }

    let view = controller
        .handle(PresentationEvent::SubmitRequested)
        .await
        .expect("submission settles");
    assert_eq!(view.status, SubmissionState::Submitted);
    assert_eq!(view.fields, lead);
    assert_eq!(analytics.events().len(), 1);

    let view = controller
        .handle(PresentationEvent::StartOverRequested)
        .await
        .expect("start over");
    assert_eq!(view.status, SubmissionState::Idle);
    assert_eq!(view.fields, LeadForm::default());

    let err = controller
        .handle(PresentationEvent::SubmitRequested)
        .await
        .expect_err("empty form is gated");
    assert!(matches!(err, IntakeError::Validation(_)));

    let err = controller
        .handle(PresentationEvent::FieldChanged {
            field: "budget".to_string(),
            value: "1m".to_string(),
        })
        .await
        .expect_err("unknown field");
    assert!(matches!(err, IntakeError::Configuration(_)));
}
