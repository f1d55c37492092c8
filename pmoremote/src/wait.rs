//! Attente bornée par scrutation

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Scrute `condition` toutes les `interval` jusqu'à ce qu'elle soit vraie
///
/// Échoue avec [`Error::Timeout`] une fois `timeout` écoulé. Aucune autre
/// forme d'annulation n'est prévue.
pub(crate) async fn poll_until<F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut condition: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let polling = async {
        loop {
            if condition().await {
                return;
            }
            tracing::trace!("condition not met, sleeping {:?}", interval);
            tokio::time::sleep(interval).await;
        }
    };

    tokio::time::timeout(timeout, polling)
        .await
        .map_err(|_| Error::Timeout(timeout))
}
