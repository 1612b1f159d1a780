use serde::{Deserialize, Deserializer, Serialize};

use super::error::UnicoreError;

/// Normalized identity of a person as known by the membership registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// National identity number, or the member number for exchange students. Never empty.
    pub ssn: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// The registry's own identifier for the person.
    pub external_id: String,
    pub ssn_source: SsnSource,
}

impl IdentityRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Which registry field ended up in [`IdentityRecord::ssn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SsnSource {
    NationalId,
    /// Exchange students have no national identity number; the registry keeps
    /// their member number in its place.
    MemberNumber,
}

/// Body of `GET user/{identity_number}`.
#[derive(Debug, Deserialize)]
pub(crate) struct UserPayload {
    #[serde(rename = "Personnr", default, deserialize_with = "optional_text")]
    personnr: Option<String>,
    #[serde(rename = "Medlemsnr", default, deserialize_with = "optional_text")]
    medlemsnr: Option<String>,
    #[serde(rename = "Fornamn")]
    first_name: String,
    #[serde(rename = "Efternamn")]
    last_name: String,
    #[serde(rename = "Epost", default)]
    email: Option<String>,
    #[serde(rename = "Telefon", default)]
    phone_number: Option<String>,
    #[serde(rename = "Id", deserialize_with = "text")]
    id: String,
}

impl UserPayload {
    /// Applies the exchange-student fallback: a missing or blank `Personnr`
    /// is replaced by `Medlemsnr`.
    pub(crate) fn normalize(self) -> Result<IdentityRecord, UnicoreError> {
        let national_id = non_blank(self.personnr);
        let member_number = non_blank(self.medlemsnr);

        let (ssn, ssn_source) = match (national_id, member_number) {
            (Some(ssn), _) => (ssn, SsnSource::NationalId),
            (None, Some(number)) => (number, SsnSource::MemberNumber),
            (None, None) => {
                return Err(UnicoreError::MalformedResponse(
                    "user has neither Personnr nor Medlemsnr".to_string(),
                ))
            }
        };

        Ok(IdentityRecord {
            ssn,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email.unwrap_or_default(),
            phone_number: self.phone_number.unwrap_or_default(),
            external_id: self.id,
            ssn_source,
        })
    }
}

/// Body of `GET is-member/{identity_number}`.
#[derive(Debug, Deserialize)]
pub(crate) struct MembershipPayload {
    #[serde(rename = "Member")]
    pub(crate) member: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// The registry is not consistent about quoting numeric identifiers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(value) => value,
            Scalar::Unsigned(value) => value.to_string(),
            Scalar::Signed(value) => value.to_string(),
        }
    }
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(Scalar::into_text)
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}
