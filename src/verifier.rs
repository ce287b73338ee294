//! API key verification
//!
//! Maps a presented key to the owning tenant. Every input takes the same
//! path: the digest is computed and the indexed lookup runs whether the key
//! is well formed or not, so a rejected key reveals nothing about why it was
//! rejected, in content or in timing. The last_used_at touch happens on a
//! background task and never affects the verification outcome.

use std::time::Duration;

use metrics::counter;
use sea_orm::DatabaseConnection;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::keys;
use crate::repositories::ApiKeyRepository;

/// Hard ceiling on the background last_used_at update.
const LAST_USED_UPDATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Why verification failed.
///
/// `Invalid` deliberately carries no detail: malformed and unknown keys are
/// the same case as far as callers can observe.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("invalid API key")]
    Invalid,
    #[error("key store unavailable")]
    StoreUnavailable,
}

/// Verify a presented API key and return the owning tenant's id.
pub async fn verify(db: &DatabaseConnection, presented: &str) -> Result<Uuid, VerifyError> {
    let digest = keys::digest_key(presented);

    let row = ApiKeyRepository::new(db)
        .find_by_digest(&digest)
        .await
        .map_err(|err| {
            warn!(error = ?err, "API key lookup failed");
            counter!("api_key_verifications_unavailable_total").increment(1);
            VerifyError::StoreUnavailable
        })?;

    let Some(key) = row else {
        counter!("api_key_verifications_invalid_total").increment(1);
        return Err(VerifyError::Invalid);
    };

    // Re-check the fetched digest in constant time; the indexed equality
    // may be looser than byte equality under case-insensitive collations
    if !bool::from(ConstantTimeEq::ct_eq(
        key.key_hash.as_bytes(),
        digest.as_bytes(),
    )) {
        counter!("api_key_verifications_invalid_total").increment(1);
        return Err(VerifyError::Invalid);
    }

    spawn_last_used_touch(db.clone(), key.id);

    counter!("api_key_verifications_total").increment(1);
    Ok(key.tenant_id)
}

/// Fire-and-forget update of last_used_at.
///
/// Failures and timeouts are logged and swallowed; the caller has already
/// returned by the time this runs, and a dropped touch loses nothing but a
/// bookkeeping timestamp.
fn spawn_last_used_touch(db: DatabaseConnection, key_id: Uuid) {
    tokio::spawn(async move {
        let repo = ApiKeyRepository::new(&db);
        let update = repo.touch_last_used(key_id);
        match timeout(LAST_USED_UPDATE_TIMEOUT, update).await {
            Ok(Ok(())) => debug!(key_id = %key_id, "Updated last_used_at"),
            Ok(Err(err)) => {
                warn!(key_id = %key_id, error = ?err, "Failed to update last_used_at")
            }
            Err(_) => warn!(key_id = %key_id, "Timed out updating last_used_at"),
        }
    });
}
