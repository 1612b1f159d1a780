use std::future::Future;

use tracing::warn;

use super::error::{Lookup, UnicoreError};
use super::record::IdentityRecord;
use crate::telemetry::redact_identity;

/// Read access to the membership registry.
///
/// The strict operations report why a person could not be resolved. The
/// lenient ones collapse every failure into "absent" / "not a member" for
/// callers that cannot act on the difference; they log what they swallow.
pub trait MembershipGateway: Send + Sync {
    /// `GET user/{identity_number}`, normalized.
    fn lookup_identity(
        &self,
        identity_number: &str,
    ) -> impl Future<Output = Result<Lookup<IdentityRecord>, UnicoreError>> + Send;

    /// `GET is-member/{identity_number}`.
    fn check_membership(
        &self,
        identity_number: &str,
    ) -> impl Future<Output = Result<Lookup<bool>, UnicoreError>> + Send;

    fn find_identity(
        &self,
        identity_number: &str,
    ) -> impl Future<Output = Option<IdentityRecord>> + Send {
        async move {
            match self.lookup_identity(identity_number).await {
                Ok(lookup) => lookup.found(),
                Err(err) => {
                    warn!(
                        identity = %redact_identity(identity_number),
                        retryable = err.is_retryable(),
                        error = %err,
                        "identity lookup failed, treating as absent"
                    );
                    None
                }
            }
        }
    }

    fn is_member(&self, identity_number: &str) -> impl Future<Output = bool> + Send {
        async move {
            match self.check_membership(identity_number).await {
                Ok(Lookup::Found(member)) => member,
                Ok(Lookup::NotFound) => false,
                Err(err) => {
                    warn!(
                        identity = %redact_identity(identity_number),
                        retryable = err.is_retryable(),
                        error = %err,
                        "membership check failed, treating as non-member"
                    );
                    false
                }
            }
        }
    }
}
