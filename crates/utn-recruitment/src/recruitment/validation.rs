use super::domain::{
    ApplicationSubmission, Member, Position, Reference, Role, Section, StudyProgram, Team,
};

const EMAIL_MAX: usize = 254;

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be at most {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    #[error("{field} must be a valid email address")]
    InvalidEmail { field: &'static str },
    #[error("please enter a valid year, got '{value}'")]
    InvalidRegistrationYear { value: String },
    #[error("{field} must be at least 1")]
    NotPositive { field: &'static str },
    #[error("{field} {detail}")]
    InvalidRange {
        field: &'static str,
        detail: &'static str,
    },
    #[error("the privacy policy must be accepted before submitting")]
    GdprNotAccepted,
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}

fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        Err(ValidationError::TooLong { field, max, actual })
    } else {
        Ok(())
    }
}

/// Shape check only: one `@`, a non-empty local part, a dotted domain, no whitespace.
pub(crate) fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn email(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    max_len(field, value, max)?;
    if is_email(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail { field })
    }
}

fn optional_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Ok(())
    } else {
        email(field, value, EMAIL_MAX)
    }
}

/// Registration years follow `20\d{2}`.
pub(crate) fn is_registration_year(value: &str) -> bool {
    value.len() == 4 && value.starts_with("20") && value.bytes().all(|b| b.is_ascii_digit())
}

impl Validate for Member {
    fn validate(&self) -> Result<(), ValidationError> {
        email("email", &self.email, 255)?;
        required("phone_number", &self.phone_number)?;
        max_len("phone_number", &self.phone_number, 20)?;
        required("name", &self.name)?;
        max_len("name", &self.name, 254)?;
        required("ssn", &self.ssn)?;
        max_len("ssn", &self.ssn, 13)?;
        if let Some(year) = &self.registration_year {
            if !is_registration_year(year) {
                return Err(ValidationError::InvalidRegistrationYear {
                    value: year.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Validate for Section {
    fn validate(&self) -> Result<(), ValidationError> {
        required("abbreviation", &self.abbreviation)?;
        max_len("abbreviation", &self.abbreviation, 20)?;
        required("section_en", &self.section_en)?;
        max_len("section_en", &self.section_en, 255)?;
        required("section_sv", &self.section_sv)?;
        max_len("section_sv", &self.section_sv, 255)
    }
}

impl Validate for StudyProgram {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name_en", &self.name_en)?;
        max_len("name_en", &self.name_en, 255)?;
        required("name_sv", &self.name_sv)?;
        max_len("name_sv", &self.name_sv, 255)
    }
}

impl Validate for Team {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name_en", &self.name_en)?;
        max_len("name_en", &self.name_en, 255)?;
        required("name_sv", &self.name_sv)?;
        max_len("name_sv", &self.name_sv, 255)
    }
}

impl Validate for Role {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title_en", &self.title_en)?;
        max_len("title_en", &self.title_en, 255)?;
        required("title_sv", &self.title_sv)?;
        max_len("title_sv", &self.title_sv, 255)?;
        required("description_en", &self.description_en)?;
        required("description_sv", &self.description_sv)?;
        email("contact_email", &self.contact_email, EMAIL_MAX)
    }
}

impl Validate for Position {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.mandate_history.is_empty() {
            return Err(ValidationError::Required {
                field: "mandate_history",
            });
        }
        if self.appointed == 0 {
            return Err(ValidationError::NotPositive { field: "appointed" });
        }
        if self.recruitment_end < self.recruitment_start {
            return Err(ValidationError::InvalidRange {
                field: "recruitment_end",
                detail: "must not be before the start of recruitment",
            });
        }
        if self.term_end < self.term_from.date_naive() {
            return Err(ValidationError::InvalidRange {
                field: "term_end",
                detail: "must not be before the date of appointment",
            });
        }
        Ok(())
    }
}

impl Validate for Reference {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)?;
        max_len("name", &self.name, 255)?;
        max_len("phone_num", &self.phone_num, 20)?;
        max_len("title", &self.title, 255)?;
        optional_email("email", &self.email)?;
        max_len("comment", &self.comment, 511)
    }
}

impl Validate for ApplicationSubmission {
    fn validate(&self) -> Result<(), ValidationError> {
        required("cover_letter", &self.cover_letter)?;
        required("qualifications", &self.qualifications)?;
        if !self.draft && !self.gdpr {
            return Err(ValidationError::GdprNotAccepted);
        }
        self.references.iter().try_for_each(Validate::validate)
    }
}
