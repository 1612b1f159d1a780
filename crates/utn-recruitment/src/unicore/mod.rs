//! Client for the unicore membership registry: identity lookup with the
//! exchange-student fallback, and the membership check.

pub mod bulk;
pub mod client;
pub mod error;
pub mod gateway;
pub mod record;

pub use bulk::{verify_many, MembershipVerdict};
pub use client::UnicoreClient;
pub use error::{Lookup, UnicoreError};
pub use gateway::MembershipGateway;
pub use record::{IdentityRecord, SsnSource};
