use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::domain::{Member, MemberId, MembershipStatus, StudyProgramId};
use super::repository::{MemberRepository, RepositoryError};
use super::validation::{Validate, ValidationError};
use crate::telemetry::redact_identity;
use crate::unicore::{
    verify_many, IdentityRecord, MembershipGateway, MembershipVerdict, UnicoreError,
};

/// Details the person supplies themselves when registering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemberRegistration {
    #[serde(default)]
    pub study_program: Option<StudyProgramId>,
    #[serde(default)]
    pub registration_year: Option<String>,
    /// Contact address to use instead of the one on file in the registry.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Registers members from the registry and keeps their status current.
pub struct MembershipService<M, G> {
    members: Arc<M>,
    gateway: Arc<G>,
    bulk_parallelism: usize,
    sequence: AtomicU64,
}

impl<M, G> MembershipService<M, G>
where
    M: MemberRepository + 'static,
    G: MembershipGateway + 'static,
{
    pub fn new(members: Arc<M>, gateway: Arc<G>, bulk_parallelism: usize) -> Self {
        Self {
            members,
            gateway,
            bulk_parallelism: bulk_parallelism.max(1),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Resolve a person in the registry and store them as a member.
    pub async fn register(
        &self,
        identity_number: &str,
        registration: MemberRegistration,
    ) -> Result<Member, MembershipServiceError> {
        let record = self
            .gateway
            .lookup_identity(identity_number)
            .await?
            .found()
            .ok_or(MembershipServiceError::UnknownIdentity)?;

        if self.members.find_by_ssn(&record.ssn)?.is_some() {
            return Err(RepositoryError::Conflict.into());
        }

        let status = MembershipStatus::Unknown.after_registry_answer(
            self.gateway.check_membership(identity_number).await?.found(),
        );

        let member = self.member_from_record(record, registration, status);
        member.validate()?;

        let stored = self.members.insert(member)?;
        info!(
            member_id = %stored.id,
            identity = %redact_identity(&stored.ssn),
            status = stored.status.label(),
            "member registered from unicore"
        );
        Ok(stored)
    }

    /// Re-check a member against the registry.
    pub async fn refresh_status(&self, id: MemberId) -> Result<Member, MembershipServiceError> {
        let mut member = self
            .members
            .fetch(id)?
            .ok_or(MembershipServiceError::MemberNotFound(id))?;

        let answer = self.gateway.check_membership(&member.ssn).await?.found();
        member.status = member.status.after_registry_answer(answer);

        self.members.update(member.clone())?;
        Ok(member)
    }

    pub fn get(&self, id: MemberId) -> Result<Member, MembershipServiceError> {
        self.members
            .fetch(id)?
            .ok_or(MembershipServiceError::MemberNotFound(id))
    }

    /// Bulk membership check bounded by the configured parallelism.
    pub async fn verify_many(&self, identity_numbers: Vec<String>) -> Vec<MembershipVerdict> {
        let total = identity_numbers.len();
        let verdicts = verify_many(
            Arc::clone(&self.gateway),
            identity_numbers,
            self.bulk_parallelism,
        )
        .await;
        let failed = verdicts.iter().filter(|v| v.outcome.is_err()).count();
        info!(total, failed, "bulk membership verification finished");
        verdicts
    }

    fn member_from_record(
        &self,
        record: IdentityRecord,
        registration: MemberRegistration,
        status: MembershipStatus,
    ) -> Member {
        let name = record.full_name();
        let unicore_id = match record.external_id.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(
                    identity = %redact_identity(&record.ssn),
                    external_id = %record.external_id,
                    "unicore id is not numeric, member stored without it"
                );
                None
            }
        };
        let MemberRegistration {
            study_program,
            registration_year,
            email,
            phone_number,
        } = registration;

        Member {
            id: MemberId(self.sequence.fetch_add(1, Ordering::Relaxed)),
            unicore_id,
            email: email.unwrap_or(record.email),
            phone_number: phone_number.unwrap_or(record.phone_number),
            is_superuser: false,
            is_staff: false,
            name,
            ssn: record.ssn,
            study_program,
            registration_year,
            status,
        }
    }
}

/// Error raised by the membership service.
#[derive(Debug, thiserror::Error)]
pub enum MembershipServiceError {
    #[error("no person with that identity number in the membership registry")]
    UnknownIdentity,
    #[error("member {0} not found")]
    MemberNotFound(MemberId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Registry(#[from] UnicoreError),
}
