//! Durable local state of the tracker. It's a single JSON document, [entities::StorageDocument],
//! holding:
//!  - `userId`, generated once and never changed afterwards.
//!  - `timeLogs`, seconds accumulated per site since the last successful sync.
//!
//! The document is guarded with advisory file locks so the cli can read it while the host is
//! writing.

pub mod entities;
pub mod local_store;

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use local_store::LocalStore;

/// Returns the persisted user id, creating and persisting one on first run.
pub async fn load_or_create_user_id(store: &impl LocalStore) -> Result<String> {
    if let Some(user_id) = store.user_id().await? {
        return Ok(user_id);
    }
    let user_id = Uuid::new_v4().to_string();
    store.set_user_id(&user_id).await?;
    info!("Generated user id {user_id}");
    Ok(user_id)
}
