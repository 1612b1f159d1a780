use super::common::*;

use crate::recruitment::domain::{ApplicationStatus, MemberId, MembershipStatus, PositionId};
use crate::recruitment::repository::MemberRepository;
use crate::recruitment::validation::ValidationError;
use crate::recruitment::ApplicationServiceError;

#[tokio::test]
async fn submit_confirmed_member_is_accepted() {
    let fx = fixture();
    let today = date(2025, 9, 15);

    let application = fx
        .service
        .submit(submission(500, 10), today)
        .await
        .expect("application accepted");

    assert_eq!(application.status, ApplicationStatus::Submitted);
    assert_eq!(application.submitted_on, Some(today));
    assert_eq!(application.rejection_date, None);
    assert_eq!(application.references.len(), 1);
    assert_eq!(fx.gateway.membership_calls(), vec!["199001011234".to_string()]);

    let stored = fx.service.get(application.id).expect("stored");
    assert_eq!(stored, application);
}

#[tokio::test]
async fn submit_rejects_lapsed_member_and_syncs_status() {
    let fx = fixture();
    fx.gateway.membership("199001011234", Scripted::Found(false));

    match fx.service.submit(submission(500, 10), date(2025, 9, 15)).await {
        Err(ApplicationServiceError::NotAMember(id)) => assert_eq!(id, MemberId(500)),
        other => panic!("expected not a member, got {other:?}"),
    }

    let member = fx
        .members
        .fetch(MemberId(500))
        .expect("fetch succeeds")
        .expect("member present");
    assert_eq!(member.status, MembershipStatus::Nonmember);
    assert!(fx
        .service
        .list_for_position(PositionId(10))
        .expect("list")
        .is_empty());
}

#[tokio::test]
async fn submit_by_member_unknown_to_registry_is_refused_without_downgrade() {
    let fx = fixture();
    fx.gateway.membership("199001011234", Scripted::NotFound);

    match fx.service.submit(submission(500, 10), date(2025, 9, 15)).await {
        Err(ApplicationServiceError::NotAMember(id)) => assert_eq!(id, MemberId(500)),
        other => panic!("expected not a member, got {other:?}"),
    }

    let member = fx
        .members
        .fetch(MemberId(500))
        .expect("fetch succeeds")
        .expect("member present");
    assert_eq!(member.status, MembershipStatus::Unknown);
}

#[tokio::test]
async fn submit_surfaces_registry_outage_without_storing() {
    let fx = fixture();
    fx.gateway.membership("199001011234", Scripted::Unavailable);

    match fx.service.submit(submission(500, 10), date(2025, 9, 15)).await {
        Err(ApplicationServiceError::Registry(err)) => assert!(err.is_retryable()),
        other => panic!("expected registry error, got {other:?}"),
    }

    let member = fx
        .members
        .fetch(MemberId(500))
        .expect("fetch succeeds")
        .expect("member present");
    assert_eq!(
        member.status,
        MembershipStatus::Member,
        "an outage must not downgrade the stored status"
    );
}

#[tokio::test]
async fn submit_refuses_archived_roles() {
    let fx = fixture();

    match fx.service.submit(submission(500, 11), date(2025, 9, 15)).await {
        Err(ApplicationServiceError::RoleArchived) => {}
        other => panic!("expected archived role, got {other:?}"),
    }
    assert!(fx.gateway.membership_calls().is_empty());
}

#[tokio::test]
async fn submit_outside_recruitment_window_is_closed() {
    let fx = fixture();

    match fx.service.submit(submission(500, 10), date(2025, 11, 1)).await {
        Err(ApplicationServiceError::RecruitmentClosed { start, end }) => {
            assert_eq!(start, date(2025, 9, 1));
            assert_eq!(end, date(2025, 10, 31));
        }
        other => panic!("expected closed recruitment, got {other:?}"),
    }

    fx.service
        .submit(submission(500, 10), date(2025, 10, 31))
        .await
        .expect("last day of the window is still open");
}

#[tokio::test]
async fn submit_requires_gdpr_consent_before_asking_registry() {
    let fx = fixture();
    let mut payload = submission(500, 10);
    payload.gdpr = false;

    match fx.service.submit(payload, date(2025, 9, 15)).await {
        Err(ApplicationServiceError::Validation(ValidationError::GdprNotAccepted)) => {}
        other => panic!("expected gdpr error, got {other:?}"),
    }
    assert!(fx.gateway.membership_calls().is_empty());
}

#[tokio::test]
async fn submit_unknown_member_or_position_is_not_found() {
    let fx = fixture();

    match fx.service.submit(submission(999, 10), date(2025, 9, 15)).await {
        Err(ApplicationServiceError::MemberNotFound(id)) => assert_eq!(id, MemberId(999)),
        other => panic!("expected missing member, got {other:?}"),
    }
    match fx.service.submit(submission(500, 77), date(2025, 9, 15)).await {
        Err(ApplicationServiceError::PositionNotFound(id)) => assert_eq!(id, PositionId(77)),
        other => panic!("expected missing position, got {other:?}"),
    }
}

#[tokio::test]
async fn draft_skips_registry_until_submitted() {
    let fx = fixture();
    let mut payload = submission(500, 10);
    payload.draft = true;
    payload.gdpr = false;

    let draft = fx
        .service
        .submit(payload, date(2025, 9, 10))
        .await
        .expect("draft saved");
    assert_eq!(draft.status, ApplicationStatus::Draft);
    assert_eq!(draft.submitted_on, None);
    assert!(fx.gateway.membership_calls().is_empty());

    match fx
        .service
        .transition(draft.id, ApplicationStatus::Submitted, date(2025, 9, 12))
        .await
    {
        Err(ApplicationServiceError::Validation(ValidationError::GdprNotAccepted)) => {}
        other => panic!("expected gdpr error, got {other:?}"),
    }

    let mut consenting = submission(500, 10);
    consenting.draft = true;
    let draft = fx
        .service
        .submit(consenting, date(2025, 9, 10))
        .await
        .expect("draft saved");
    let submitted = fx
        .service
        .transition(draft.id, ApplicationStatus::Submitted, date(2025, 9, 12))
        .await
        .expect("draft submitted");

    assert_eq!(submitted.status, ApplicationStatus::Submitted);
    assert_eq!(submitted.submitted_on, Some(date(2025, 9, 12)));
    assert_eq!(fx.gateway.membership_calls().len(), 1);
}

#[tokio::test]
async fn rejection_stamps_the_date() {
    let fx = fixture();
    let application = fx
        .service
        .submit(submission(500, 10), date(2025, 9, 15))
        .await
        .expect("application accepted");

    let rejected = fx
        .service
        .transition(application.id, ApplicationStatus::Disapproved, date(2025, 11, 20))
        .await
        .expect("rejection recorded");

    assert_eq!(rejected.status, ApplicationStatus::Disapproved);
    assert_eq!(rejected.rejection_date, Some(date(2025, 11, 20)));
    assert_eq!(
        fx.service.get(application.id).expect("stored").status,
        ApplicationStatus::Disapproved
    );
}

#[tokio::test]
async fn appointment_follows_approval() {
    let fx = fixture();
    let application = fx
        .service
        .submit(submission(500, 10), date(2025, 9, 15))
        .await
        .expect("application accepted");

    match fx
        .service
        .transition(application.id, ApplicationStatus::Appointed, date(2025, 11, 1))
        .await
    {
        Err(ApplicationServiceError::InvalidTransition { from, to }) => {
            assert_eq!(from, ApplicationStatus::Submitted);
            assert_eq!(to, ApplicationStatus::Appointed);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }

    fx.service
        .transition(application.id, ApplicationStatus::Approved, date(2025, 11, 1))
        .await
        .expect("approved");
    let appointed = fx
        .service
        .transition(application.id, ApplicationStatus::Appointed, date(2025, 11, 2))
        .await
        .expect("appointed");
    assert_eq!(appointed.status, ApplicationStatus::Appointed);
    assert_eq!(appointed.rejection_date, None);
}

#[tokio::test]
async fn list_for_position_returns_only_that_position() {
    let fx = fixture();
    fx.members
        .insert(member(501, "198501015555", MembershipStatus::Member))
        .expect("seed member");
    fx.gateway.membership("198501015555", Scripted::Found(true));

    fx.service
        .submit(submission(500, 10), date(2025, 9, 15))
        .await
        .expect("first application");
    fx.service
        .submit(submission(501, 10), date(2025, 9, 16))
        .await
        .expect("second application");

    let listed = fx
        .service
        .list_for_position(PositionId(10))
        .expect("list");
    let members: Vec<MemberId> = listed.iter().map(|a| a.member).collect();
    assert_eq!(members, vec![MemberId(500), MemberId(501)]);
    assert!(fx
        .service
        .list_for_position(PositionId(11))
        .expect("list")
        .is_empty());
}
