use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::error::{Lookup, UnicoreError};
use super::gateway::MembershipGateway;

/// Membership outcome for one identity number of a bulk run.
#[derive(Debug)]
pub struct MembershipVerdict {
    pub identity_number: String,
    pub outcome: Result<Lookup<bool>, UnicoreError>,
}

impl MembershipVerdict {
    pub fn is_member(&self) -> bool {
        matches!(self.outcome, Ok(Lookup::Found(true)))
    }
}

/// Checks membership for many identity numbers with at most `parallelism`
/// requests in flight. Verdicts come back in input order.
///
/// One task is spawned per identity number up front; the bound applies to
/// requests, not to tasks.
pub async fn verify_many<G>(
    gateway: Arc<G>,
    identity_numbers: Vec<String>,
    parallelism: usize,
) -> Vec<MembershipVerdict>
where
    G: MembershipGateway + 'static,
{
    let permits = Arc::new(Semaphore::new(parallelism.max(1)));
    let mut tasks = JoinSet::new();

    for (index, identity_number) in identity_numbers.iter().cloned().enumerate() {
        let gateway = Arc::clone(&gateway);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => gateway.check_membership(&identity_number).await,
                Err(_) => Err(UnicoreError::RequestFailed(
                    "bulk verification was shut down".to_string(),
                )),
            };
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<Result<Lookup<bool>, UnicoreError>>> =
        identity_numbers.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        if let Ok((index, outcome)) = joined {
            outcomes[index] = Some(outcome);
        }
    }

    identity_numbers
        .into_iter()
        .zip(outcomes)
        .map(|(identity_number, outcome)| MembershipVerdict {
            identity_number,
            outcome: outcome.unwrap_or_else(|| {
                Err(UnicoreError::RequestFailed(
                    "verification task aborted".to_string(),
                ))
            }),
        })
        .collect()
}
