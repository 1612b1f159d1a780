use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::recruitment::domain::{
    Application, ApplicationId, ApplicationSubmission, MandateHistoryId, Member, MemberId,
    MembershipStatus, Position, PositionId, Reference, Role, RoleId, RoleType, TeamId,
};
use crate::recruitment::repository::{
    ApplicationRepository, MemberRepository, PositionCatalog, RepositoryError,
};
use crate::recruitment::{ApplicationService, MembershipService};
use crate::unicore::{IdentityRecord, Lookup, MembershipGateway, SsnSource, UnicoreError};

/// Canned registry answer for one identity number.
#[derive(Debug, Clone)]
pub(super) enum Scripted<T> {
    Found(T),
    NotFound,
    Unavailable,
    Rejected,
}

impl<T> Scripted<T> {
    fn into_result(self) -> Result<Lookup<T>, UnicoreError> {
        match self {
            Scripted::Found(value) => Ok(Lookup::Found(value)),
            Scripted::NotFound => Ok(Lookup::NotFound),
            Scripted::Unavailable => Err(UnicoreError::Unavailable { status: 503 }),
            Scripted::Rejected => Err(UnicoreError::Rejected { status: 401 }),
        }
    }
}

/// Registry double; unscripted identity numbers answer 404.
#[derive(Debug, Default)]
pub(super) struct ScriptedGateway {
    identities: Mutex<HashMap<String, Scripted<IdentityRecord>>>,
    memberships: Mutex<HashMap<String, Scripted<bool>>>,
    membership_calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGateway {
    pub(super) fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub(super) fn identity(&self, identity_number: &str, answer: Scripted<IdentityRecord>) {
        self.identities
            .lock()
            .expect("lock")
            .insert(identity_number.to_string(), answer);
    }

    pub(super) fn membership(&self, identity_number: &str, answer: Scripted<bool>) {
        self.memberships
            .lock()
            .expect("lock")
            .insert(identity_number.to_string(), answer);
    }

    pub(super) fn membership_calls(&self) -> Vec<String> {
        self.membership_calls.lock().expect("lock").clone()
    }

    pub(super) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl MembershipGateway for ScriptedGateway {
    async fn lookup_identity(
        &self,
        identity_number: &str,
    ) -> Result<Lookup<IdentityRecord>, UnicoreError> {
        let answer = self
            .identities
            .lock()
            .expect("lock")
            .get(identity_number)
            .cloned()
            .unwrap_or(Scripted::NotFound);
        answer.into_result()
    }

    async fn check_membership(&self, identity_number: &str) -> Result<Lookup<bool>, UnicoreError> {
        self.membership_calls
            .lock()
            .expect("lock")
            .push(identity_number.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let answer = self
            .memberships
            .lock()
            .expect("lock")
            .get(identity_number)
            .cloned()
            .unwrap_or(Scripted::NotFound);
        answer.into_result()
    }
}

#[derive(Debug, Default)]
pub(super) struct MemoryMembers {
    records: Mutex<HashMap<MemberId, Member>>,
}

impl MemoryMembers {
    pub(super) fn with(members: Vec<Member>) -> Self {
        let repository = Self::default();
        for member in members {
            repository.insert(member).expect("seed member");
        }
        repository
    }
}

impl MemberRepository for MemoryMembers {
    fn insert(&self, member: Member) -> Result<Member, RepositoryError> {
        let mut guard = self.records.lock().expect("lock");
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
        let mut guard = self.records.lock().expect("lock");
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
        Ok(self.records.lock().expect("lock").get(&id).cloned())
    }

    fn find_by_ssn(&self, ssn: &str) -> Result<Option<Member>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("lock")
            .values()
            .find(|member| member.ssn == ssn)
            .cloned())
    }
}

fn shares_unicore_id(existing: &Member, candidate: &Member) -> bool {
    candidate.unicore_id.is_some() && existing.unicore_id == candidate.unicore_id
}

#[derive(Debug, Default)]
pub(super) struct MemoryApplications {
    records: Mutex<HashMap<ApplicationId, Application>>,
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("lock");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id, application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("lock")
            .insert(application.id, application);
        Ok(())
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.records.lock().expect("lock").get(&id).cloned())
    }

    fn list_for_position(&self, position: PositionId) -> Result<Vec<Application>, RepositoryError> {
        let mut found: Vec<Application> = self
            .records
            .lock()
            .expect("lock")
            .values()
            .filter(|application| application.position == position)
            .cloned()
            .collect();
        found.sort_by_key(|application| application.id);
        Ok(found)
    }
}

#[derive(Debug, Default)]
pub(super) struct MemoryCatalog {
    positions: HashMap<PositionId, Position>,
    roles: HashMap<RoleId, Role>,
}

impl MemoryCatalog {
    pub(super) fn with(positions: Vec<Position>, roles: Vec<Role>) -> Self {
        Self {
            positions: positions.into_iter().map(|p| (p.id, p)).collect(),
            roles: roles.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}

impl PositionCatalog for MemoryCatalog {
    fn position(&self, id: PositionId) -> Result<Option<Position>, RepositoryError> {
        Ok(self.positions.get(&id).cloned())
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError> {
        Ok(self.roles.get(&id).cloned())
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn identity(ssn: &str, source: SsnSource) -> IdentityRecord {
    IdentityRecord {
        ssn: ssn.to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        phone_number: "555-1234".to_string(),
        external_id: "123".to_string(),
        ssn_source: source,
    }
}

pub(super) fn member(id: u64, ssn: &str, status: MembershipStatus) -> Member {
    Member {
        id: MemberId(id),
        unicore_id: Some(id as i64 + 1000),
        email: format!("member{id}@example.com"),
        phone_number: "0701234567".to_string(),
        is_superuser: false,
        is_staff: false,
        name: format!("Member {id}"),
        ssn: ssn.to_string(),
        study_program: None,
        registration_year: Some("2022".to_string()),
        status,
    }
}

pub(super) fn role(id: u64, archived: bool) -> Role {
    Role {
        id: RoleId(id),
        team: TeamId(1),
        role_type: RoleType::Involved,
        archived,
        title_en: "Event coordinator".to_string(),
        title_sv: "Eventsamordnare".to_string(),
        description_en: "Plans the union's events".to_string(),
        description_sv: "Planerar kårens evenemang".to_string(),
        contact_email: "events@example.com".to_string(),
    }
}

/// Position recruiting from `start` through `end`.
pub(super) fn position(id: u64, role: u64, start: NaiveDate, end: NaiveDate) -> Position {
    Position {
        id: PositionId(id),
        role: RoleId(role),
        mandate_history: vec![MandateHistoryId(1)],
        recruitment_start: start,
        recruitment_end: end,
        appointed: 1,
        term_from: Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp"),
        term_end: date(2026, 12, 31),
        comment_eng: String::new(),
        comment_sv: String::new(),
    }
}

pub(super) fn submission(member: u64, position: u64) -> ApplicationSubmission {
    ApplicationSubmission {
        position: PositionId(position),
        member: MemberId(member),
        cover_letter: "I have organised three gasques and would love to do more.".to_string(),
        qualifications: "Treasurer of my nation, first aid course.".to_string(),
        gdpr: true,
        references: vec![Reference {
            name: "Karin Ek".to_string(),
            phone_num: "0709876543".to_string(),
            title: "Former chair".to_string(),
            email: "karin@example.com".to_string(),
            comment: String::new(),
        }],
        draft: false,
    }
}

pub(super) type TestMembershipService = MembershipService<MemoryMembers, ScriptedGateway>;
pub(super) type TestApplicationService =
    ApplicationService<MemoryApplications, MemoryMembers, MemoryCatalog, ScriptedGateway>;

pub(super) struct Fixture {
    pub(super) members: Arc<MemoryMembers>,
    pub(super) applications: Arc<MemoryApplications>,
    pub(super) gateway: Arc<ScriptedGateway>,
    pub(super) membership: Arc<TestMembershipService>,
    pub(super) service: Arc<TestApplicationService>,
}

/// Member 500 (`199001011234`) is a confirmed member; position 10 recruits
/// through the autumn of 2025 for an active role, position 11 belongs to an
/// archived role.
pub(super) fn fixture() -> Fixture {
    fixture_recruiting(date(2025, 9, 1), date(2025, 10, 31))
}

pub(super) fn fixture_recruiting(start: NaiveDate, end: NaiveDate) -> Fixture {
    let members = Arc::new(MemoryMembers::with(vec![member(
        500,
        "199001011234",
        MembershipStatus::Member,
    )]));
    let applications = Arc::new(MemoryApplications::default());
    let catalog = Arc::new(MemoryCatalog::with(
        vec![
            position(10, 100, start, end),
            position(11, 101, start, end),
        ],
        vec![role(100, false), role(101, true)],
    ));
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.membership("199001011234", Scripted::Found(true));

    let membership = Arc::new(MembershipService::new(
        members.clone(),
        gateway.clone(),
        2,
    ));
    let service = Arc::new(ApplicationService::new(
        applications.clone(),
        members.clone(),
        catalog,
        gateway.clone(),
    ));

    Fixture {
        members,
        applications,
        gateway,
        membership,
        service,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
