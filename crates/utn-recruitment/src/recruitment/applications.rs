use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationSubmission, Member, MemberId,
    Position, PositionId,
};
use super::repository::{
    ApplicationRepository, MemberRepository, PositionCatalog, RepositoryError,
};
use super::validation::{Validate, ValidationError};
use crate::unicore::{MembershipGateway, UnicoreError};

/// Intake and status handling for position applications.
///
/// Only confirmed members may apply: the registry is asked at submission
/// time rather than trusting the locally stored status.
pub struct ApplicationService<A, M, C, G> {
    applications: Arc<A>,
    members: Arc<M>,
    catalog: Arc<C>,
    gateway: Arc<G>,
    sequence: AtomicU64,
}

impl<A, M, C, G> ApplicationService<A, M, C, G>
where
    A: ApplicationRepository + 'static,
    M: MemberRepository + 'static,
    C: PositionCatalog + 'static,
    G: MembershipGateway + 'static,
{
    pub fn new(applications: Arc<A>, members: Arc<M>, catalog: Arc<C>, gateway: Arc<G>) -> Self {
        Self {
            applications,
            members,
            catalog,
            gateway,
            sequence: AtomicU64::new(1),
        }
    }

    /// Store a new application; drafts skip the eligibility checks until submitted.
    pub async fn submit(
        &self,
        submission: ApplicationSubmission,
        today: NaiveDate,
    ) -> Result<Application, ApplicationServiceError> {
        submission.validate()?;

        let member = self.member(submission.member)?;
        let position = self.open_position(submission.position, today)?;

        let status = if submission.draft {
            ApplicationStatus::Draft
        } else {
            self.confirm_membership(member).await?;
            ApplicationStatus::Submitted
        };

        let application = Application {
            id: ApplicationId(self.sequence.fetch_add(1, Ordering::Relaxed)),
            position: position.id,
            member: submission.member,
            status,
            cover_letter: submission.cover_letter,
            qualifications: submission.qualifications,
            gdpr: submission.gdpr,
            references: submission.references,
            submitted_on: (status == ApplicationStatus::Submitted).then_some(today),
            rejection_date: None,
        };

        let stored = self.applications.insert(application)?;
        info!(
            application_id = %stored.id,
            position_id = %stored.position,
            status = stored.status.label(),
            "application stored"
        );
        Ok(stored)
    }

    /// Move an application along its lifecycle.
    pub async fn transition(
        &self,
        id: ApplicationId,
        next: ApplicationStatus,
        today: NaiveDate,
    ) -> Result<Application, ApplicationServiceError> {
        let mut application = self.get(id)?;
        if !application.status.can_transition_to(next) {
            return Err(ApplicationServiceError::InvalidTransition {
                from: application.status,
                to: next,
            });
        }

        if next == ApplicationStatus::Submitted {
            if !application.gdpr {
                return Err(ValidationError::GdprNotAccepted.into());
            }
            let member = self.member(application.member)?;
            self.open_position(application.position, today)?;
            self.confirm_membership(member).await?;
            application.submitted_on = Some(today);
        }

        if next.is_rejection() {
            application.rejection_date = Some(today);
        }
        application.status = next;

        self.applications.update(application.clone())?;
        Ok(application)
    }

    pub fn get(&self, id: ApplicationId) -> Result<Application, ApplicationServiceError> {
        self.applications
            .fetch(id)?
            .ok_or(ApplicationServiceError::ApplicationNotFound(id))
    }

    pub fn list_for_position(
        &self,
        position: PositionId,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        Ok(self.applications.list_for_position(position)?)
    }

    fn member(&self, id: MemberId) -> Result<Member, ApplicationServiceError> {
        self.members
            .fetch(id)?
            .ok_or(ApplicationServiceError::MemberNotFound(id))
    }

    fn open_position(
        &self,
        id: PositionId,
        today: NaiveDate,
    ) -> Result<Position, ApplicationServiceError> {
        let position = self
            .catalog
            .position(id)?
            .ok_or(ApplicationServiceError::PositionNotFound(id))?;
        let role = self
            .catalog
            .role(position.role)?
            .ok_or(RepositoryError::NotFound)?;

        if role.archived {
            return Err(ApplicationServiceError::RoleArchived);
        }
        if !position.is_recruiting(today) {
            return Err(ApplicationServiceError::RecruitmentClosed {
                start: position.recruitment_start,
                end: position.recruitment_end,
            });
        }
        Ok(position)
    }

    /// Asks the registry and syncs the stored status when it has drifted.
    async fn confirm_membership(&self, mut member: Member) -> Result<(), ApplicationServiceError> {
        let answer = self.gateway.check_membership(&member.ssn).await?.found();
        let confirmed = answer == Some(true);

        let status = member.status.after_registry_answer(answer);
        if status != member.status {
            member.status = status;
            if let Err(err) = self.members.update(member.clone()) {
                warn!(member_id = %member.id, error = %err, "could not sync membership status");
            }
        }

        if confirmed {
            Ok(())
        } else {
            Err(ApplicationServiceError::NotAMember(member.id))
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("member {0} not found")]
    MemberNotFound(MemberId),
    #[error("position {0} not found")]
    PositionNotFound(PositionId),
    #[error("member {0} is not a confirmed union member")]
    NotAMember(MemberId),
    #[error("the role is archived and no longer accepts applications")]
    RoleArchived,
    #[error("recruitment is open from {start} to {end}")]
    RecruitmentClosed { start: NaiveDate, end: NaiveDate },
    #[error("cannot move an application from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Registry(#[from] UnicoreError),
}
