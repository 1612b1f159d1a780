//! HTTP client for the unicore membership registry.

use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::{Lookup, UnicoreError};
use super::gateway::MembershipGateway;
use super::record::{IdentityRecord, MembershipPayload, UserPayload};
use crate::config::{BasicCredentials, UnicoreConfig};
use crate::telemetry::redact_identity;

const USER_RESOURCE: &str = "user";
const MEMBERSHIP_RESOURCE: &str = "is-member";

/// Authenticated reader for `user/{id}` and `is-member/{id}`.
///
/// Holds only read-only configuration and a pooled `reqwest::Client`, so it
/// can be shared behind an `Arc` across request handlers.
#[derive(Clone)]
pub struct UnicoreClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: BasicCredentials,
}

impl UnicoreClient {
    pub fn new(config: &UnicoreConfig) -> Result<Self, UnicoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|err| UnicoreError::Client(err.to_string()))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|err| UnicoreError::Client(format!("invalid base url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(UnicoreError::Client(format!(
                "base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self {
            http,
            base_url,
            credentials: config.credentials.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base_url}/{resource}/{identity_number}`, with the identity number
    /// encoded as a single path segment.
    pub(crate) fn endpoint(&self, resource: &str, identity_number: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(resource).push(identity_number);
        }
        url
    }

    /// Returns `Ok(None)` on 404; any other non-200 status is an error.
    async fn fetch<T>(&self, resource: &str, identity_number: &str) -> Result<Option<T>, UnicoreError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(resource, identity_number);
        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(UnicoreError::from_transport)?;

        let status = response.status();
        debug!(
            resource,
            identity = %redact_identity(identity_number),
            status = status.as_u16(),
            "unicore responded"
        );

        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Ok(None),
            other => return Err(UnicoreError::from_status(other)),
        }

        let body = response
            .bytes()
            .await
            .map_err(UnicoreError::from_transport)?;
        let payload = serde_json::from_slice(&body)
            .map_err(|err| UnicoreError::MalformedResponse(format!("{resource}: {err}")))?;
        Ok(Some(payload))
    }
}

impl std::fmt::Debug for UnicoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnicoreClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl MembershipGateway for UnicoreClient {
    async fn lookup_identity(
        &self,
        identity_number: &str,
    ) -> Result<Lookup<IdentityRecord>, UnicoreError> {
        match self
            .fetch::<UserPayload>(USER_RESOURCE, identity_number)
            .await?
        {
            Some(payload) => payload.normalize().map(Lookup::Found),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn check_membership(&self, identity_number: &str) -> Result<Lookup<bool>, UnicoreError> {
        Ok(
            match self
                .fetch::<MembershipPayload>(MEMBERSHIP_RESOURCE, identity_number)
                .await?
            {
                Some(payload) => Lookup::Found(payload.member),
                None => Lookup::NotFound,
            },
        )
    }
}
