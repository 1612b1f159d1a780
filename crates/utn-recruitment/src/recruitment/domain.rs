use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

identifier!(
    /// Identifier wrapper for registered members.
    MemberId
);
identifier!(SectionId);
identifier!(StudyProgramId);
identifier!(TeamId);
identifier!(RoleId);
identifier!(PositionId);
identifier!(MandateHistoryId);
identifier!(
    /// Identifier wrapper for submitted applications.
    ApplicationId
);

/// Membership standing as last confirmed against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Unknown,
    Nonmember,
    Member,
    Alumnus,
}

impl MembershipStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MembershipStatus::Unknown => "unknown",
            MembershipStatus::Nonmember => "nonmember",
            MembershipStatus::Member => "member",
            MembershipStatus::Alumnus => "alumnus",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            MembershipStatus::Unknown => "Unknown",
            MembershipStatus::Nonmember => "Nonmember",
            MembershipStatus::Member => "Member",
            MembershipStatus::Alumnus => "Alumnus",
        }
    }

    /// Status after the registry answered whether the person is a member.
    /// Alumni stay alumni when the registry no longer lists them.
    pub fn reconcile(self, confirmed_member: bool) -> Self {
        match (confirmed_member, self) {
            (true, _) => MembershipStatus::Member,
            (false, MembershipStatus::Alumnus) => MembershipStatus::Alumnus,
            (false, _) => MembershipStatus::Nonmember,
        }
    }

    /// Like [`reconcile`](Self::reconcile), but `None` means the registry does
    /// not know the person at all: the status becomes unknown, alumni excepted.
    pub fn after_registry_answer(self, answer: Option<bool>) -> Self {
        match (answer, self) {
            (Some(confirmed), _) => self.reconcile(confirmed),
            (None, MembershipStatus::Alumnus) => MembershipStatus::Alumnus,
            (None, _) => MembershipStatus::Unknown,
        }
    }
}

/// A person known to the union, enriched from the membership registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// Registry identifier; unique among members when present.
    pub unicore_id: Option<i64>,
    pub email: String,
    pub phone_number: String,
    pub is_superuser: bool,
    /// Whether the member can log into the admin site.
    pub is_staff: bool,
    pub name: String,
    pub ssn: String,
    pub study_program: Option<StudyProgramId>,
    /// Year the member started at the faculty, `20xx`.
    pub registration_year: Option<String>,
    pub status: MembershipStatus,
}

impl Member {
    pub fn view(&self) -> MemberView {
        MemberView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            status: self.status.label(),
            unicore_id: self.unicore_id,
            study_program: self.study_program,
            registration_year: self.registration_year.clone(),
        }
    }
}

/// Member representation safe to return over HTTP; the identity number stays internal.
#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicore_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_program: Option<StudyProgramId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub abbreviation: String,
    pub section_en: String,
    pub section_sv: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyProgram {
    pub id: StudyProgramId,
    pub section: SectionId,
    pub name_en: String,
    pub name_sv: String,
}

/// A committee or working group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name_en: String,
    pub name_sv: String,
    /// Media path of the uploaded logo.
    pub logo: Option<String>,
    pub desc_en: String,
    pub desc_sv: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    Admin,
    Fum,
    Board,
    Presidium,
    GroupLeader,
    Involved,
}

impl RoleType {
    pub const fn label(self) -> &'static str {
        match self {
            RoleType::Admin => "admin",
            RoleType::Fum => "fum",
            RoleType::Board => "board",
            RoleType::Presidium => "presidium",
            RoleType::GroupLeader => "group_leader",
            RoleType::Involved => "involved",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            RoleType::Admin => "Admin",
            RoleType::Fum => "FUM",
            RoleType::Board => "Board",
            RoleType::Presidium => "Presidium",
            RoleType::GroupLeader => "Group Leader",
            RoleType::Involved => "Involved",
        }
    }
}

/// A role within a team. Archived roles are hidden and accept no applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub team: TeamId,
    pub role_type: RoleType,
    pub archived: bool,
    pub title_en: String,
    pub title_sv: String,
    pub description_en: String,
    pub description_sv: String,
    /// Address of the current position holder.
    pub contact_email: String,
}

/// Members who have held a mandate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandateHistory {
    pub id: MandateHistoryId,
    pub members: Vec<MemberId>,
}

/// A recruitment round for a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub role: RoleId,
    pub mandate_history: Vec<MandateHistoryId>,
    #[serde(default = "today")]
    pub recruitment_start: NaiveDate,
    pub recruitment_end: NaiveDate,
    /// Number of people to appoint.
    #[serde(default = "one")]
    pub appointed: u32,
    pub term_from: DateTime<Utc>,
    pub term_end: NaiveDate,
    #[serde(default)]
    pub comment_eng: String,
    #[serde(default)]
    pub comment_sv: String,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

const fn one() -> u32 {
    1
}

impl Position {
    /// Both ends of the recruitment window are inclusive.
    pub fn is_recruiting(&self, today: NaiveDate) -> bool {
        self.recruitment_start <= today && today <= self.recruitment_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    Approved,
    Disapproved,
    Appointed,
    TurnedDown,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Disapproved => "disapproved",
            ApplicationStatus::Appointed => "appointed",
            ApplicationStatus::TurnedDown => "turned_down",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "Draft",
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Disapproved => "Disapproved",
            ApplicationStatus::Appointed => "Appointed",
            ApplicationStatus::TurnedDown => "Turned down",
        }
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, Approved)
                | (Submitted, Disapproved)
                | (Approved, Appointed)
                | (Approved, TurnedDown)
        )
    }

    /// Statuses that stamp a rejection date.
    pub fn is_rejection(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Disapproved | ApplicationStatus::TurnedDown
        )
    }
}

/// A reference attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    #[serde(default)]
    pub phone_num: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

/// Payload a member sends when applying for a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub position: PositionId,
    pub member: MemberId,
    pub cover_letter: String,
    pub qualifications: String,
    #[serde(default)]
    pub gdpr: bool,
    #[serde(default)]
    pub references: Vec<Reference>,
    /// Save without submitting.
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub position: PositionId,
    pub member: MemberId,
    pub status: ApplicationStatus,
    pub cover_letter: String,
    pub qualifications: String,
    /// Applicant accepted that their data is stored under the union's privacy policy.
    pub gdpr: bool,
    pub references: Vec<Reference>,
    pub submitted_on: Option<NaiveDate>,
    pub rejection_date: Option<NaiveDate>,
}

impl Application {
    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            id: self.id,
            position: self.position,
            member: self.member,
            status: self.status.label(),
            submitted_on: self.submitted_on,
            rejection_date: self.rejection_date,
            references: self.references.len(),
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub position: PositionId,
    pub member: MemberId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_date: Option<NaiveDate>,
    pub references: usize,
}
