//! Members, roles, positions and applications, with membership confirmed
//! against the unicore registry.

pub mod applications;
pub mod domain;
pub mod membership;
pub mod repository;
pub mod router;
pub mod validation;

#[cfg(test)]
mod tests;

pub use applications::{ApplicationService, ApplicationServiceError};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationSubmission, ApplicationView,
    MandateHistory, MandateHistoryId, Member, MemberId, MemberView, MembershipStatus, Position,
    PositionId, Reference, Role, RoleId, RoleType, Section, SectionId, StudyProgram,
    StudyProgramId, Team, TeamId,
};
pub use membership::{MemberRegistration, MembershipService, MembershipServiceError};
pub use repository::{ApplicationRepository, MemberRepository, PositionCatalog, RepositoryError};
pub use router::{application_router, member_router, unicore_router};
pub use validation::{Validate, ValidationError};
