use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use utn_recruitment::recruitment::{
    Application, ApplicationId, ApplicationRepository, Member, MemberId, MemberRepository,
    Position, PositionCatalog, PositionId, RepositoryError, Role, RoleId, Validate,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMemberRepository {
    records: Arc<Mutex<HashMap<MemberId, Member>>>,
}

impl MemberRepository for InMemoryMemberRepository {
    fn insert(&self, member: Member) -> Result<Member, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&member.id)
            || guard
                .values()
                .any(|m| m.ssn == member.ssn || shares_unicore_id(m, &member))
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(member.id, member.clone());
        Ok(member)
    }

    fn update(&self, member: Member) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard
            .values()
            .any(|m| m.id != member.id && shares_unicore_id(m, &member))
        {
            return Err(RepositoryError::Conflict);
        }
        match guard.get_mut(&member.id) {
            Some(slot) => {
                *slot = member;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: MemberId) -> Result<Option<Member>, RepositoryError> {
        Ok(lock(&self.records)?.get(&id).cloned())
    }

    fn find_by_ssn(&self, ssn: &str) -> Result<Option<Member>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .find(|member| member.ssn == ssn)
            .cloned())
    }
}

fn shares_unicore_id(existing: &Member, candidate: &Member) -> bool {
    candidate.unicore_id.is_some() && existing.unicore_id == candidate.unicore_id
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id, application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&application.id) {
            guard.insert(application.id, application);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(lock(&self.records)?.get(&id).cloned())
    }

    fn list_for_position(&self, position: PositionId) -> Result<Vec<Application>, RepositoryError> {
        let mut found: Vec<Application> = lock(&self.records)?
            .values()
            .filter(|application| application.position == position)
            .cloned()
            .collect();
        found.sort_by_key(|application| application.id);
        Ok(found)
    }
}

/// Roles and positions loaded once at startup.
#[derive(Default, Debug)]
pub(crate) struct InMemoryPositionCatalog {
    positions: HashMap<PositionId, Position>,
    roles: HashMap<RoleId, Role>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    roles: Vec<Role>,
    #[serde(default)]
    positions: Vec<Position>,
}

impl InMemoryPositionCatalog {
    /// Parses `{"roles": [...], "positions": [...]}` and validates every entry.
    pub(crate) fn from_json(raw: &str) -> io::Result<Self> {
        let file: CatalogFile = serde_json::from_str(raw)?;

        let mut roles = HashMap::new();
        for role in file.roles {
            role.validate().map_err(|err| invalid(format!("role {}: {err}", role.id)))?;
            roles.insert(role.id, role);
        }

        let mut positions = HashMap::new();
        for position in file.positions {
            position
                .validate()
                .map_err(|err| invalid(format!("position {}: {err}", position.id)))?;
            if !roles.contains_key(&position.role) {
                return Err(invalid(format!(
                    "position {} refers to unknown role {}",
                    position.id, position.role
                )));
            }
            positions.insert(position.id, position);
        }

        Ok(Self { positions, roles })
    }

    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

impl PositionCatalog for InMemoryPositionCatalog {
    fn position(&self, id: PositionId) -> Result<Option<Position>, RepositoryError> {
        Ok(self.positions.get(&id).cloned())
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError> {
        Ok(self.roles.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "roles": [{
            "id": 3,
            "team": 1,
            "role_type": "group_leader",
            "archived": false,
            "title_en": "Pub manager",
            "title_sv": "Pubansvarig",
            "description_en": "Runs the Friday pub",
            "description_sv": "Driver fredagspuben",
            "contact_email": "pub@example.com"
        }],
        "positions": [{
            "id": 7,
            "role": 3,
            "mandate_history": [1],
            "recruitment_start": "2025-09-01",
            "recruitment_end": "2025-09-30",
            "appointed": 2,
            "term_from": "2026-01-01T00:00:00Z",
            "term_end": "2026-12-31",
            "comment_eng": "",
            "comment_sv": ""
        }]
    }"#;

    #[test]
    fn catalog_loads_roles_and_positions() {
        let catalog = InMemoryPositionCatalog::from_json(CATALOG).expect("catalog parses");
        assert_eq!(catalog.len(), 1);
        let position = catalog
            .position(PositionId(7))
            .expect("lookup")
            .expect("position present");
        assert_eq!(position.role, RoleId(3));
        assert!(catalog.role(RoleId(3)).expect("lookup").is_some());
    }

    #[test]
    fn catalog_rejects_positions_for_unknown_roles() {
        let raw = CATALOG.replace("\"role\": 3", "\"role\": 4");
        let err = InMemoryPositionCatalog::from_json(&raw).expect_err("unknown role");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn member_repository_enforces_unique_identity_numbers() {
        let repository = InMemoryMemberRepository::default();
        let member = Member {
            id: MemberId(1),
            unicore_id: Some(123),
            email: "john.doe@example.com".to_string(),
            phone_number: "555-1234".to_string(),
            is_superuser: false,
            is_staff: false,
            name: "John Doe".to_string(),
            ssn: "1234567890".to_string(),
            study_program: None,
            registration_year: None,
            status: Default::default(),
        };
        repository.insert(member.clone()).expect("first insert");

        let duplicate = Member {
            id: MemberId(2),
            ..member.clone()
        };
        assert!(matches!(
            repository.insert(duplicate),
            Err(RepositoryError::Conflict)
        ));

        let same_registry_id = Member {
            id: MemberId(3),
            ssn: "M-2023-17".to_string(),
            ..member.clone()
        };
        assert!(matches!(
            repository.insert(same_registry_id),
            Err(RepositoryError::Conflict)
        ));

        let without_registry_id = |id: u64, ssn: &str| Member {
            id: MemberId(id),
            ssn: ssn.to_string(),
            unicore_id: None,
            ..member.clone()
        };
        repository
            .insert(without_registry_id(4, "200001019876"))
            .expect("members without a registry id never collide");
        repository
            .insert(without_registry_id(5, "201001011111"))
            .expect("members without a registry id never collide");

        let stolen_id = Member {
            unicore_id: Some(123),
            ..without_registry_id(4, "200001019876")
        };
        assert!(matches!(
            repository.update(stolen_id),
            Err(RepositoryError::Conflict)
        ));
    }
}
