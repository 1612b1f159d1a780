use super::domain::{
    Application, ApplicationId, Member, MemberId, Position, PositionId, Role, RoleId,
};

/// Storage abstraction for members so the services can be exercised in isolation.
pub trait MemberRepository: Send + Sync {
    /// `Conflict` when the id, the ssn or a present `unicore_id` is already taken.
    fn insert(&self, member: Member) -> Result<Member, RepositoryError>;
    fn update(&self, member: Member) -> Result<(), RepositoryError>;
    fn fetch(&self, id: MemberId) -> Result<Option<Member>, RepositoryError>;
    fn find_by_ssn(&self, ssn: &str) -> Result<Option<Member>, RepositoryError>;
}

pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn list_for_position(&self, position: PositionId) -> Result<Vec<Application>, RepositoryError>;
}

/// Read access to the organisation's positions and roles.
pub trait PositionCatalog: Send + Sync {
    fn position(&self, id: PositionId) -> Result<Option<Position>, RepositoryError>;
    fn role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
