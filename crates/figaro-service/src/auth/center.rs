//! Choosing the center a user works in.

use chrono::{DateTime, Utc};

use figaro_db::model::center::Center;
use figaro_db::store::UserStore;

use super::identity::Identity;
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Makes `center_id` the identity's default center, which scopes shared
/// folder lookups from the next request on.
///
/// ## Errors
/// Returns `Validation` for an unknown center and `PermissionDenied` when the
/// user is pinned to a different center.
#[tracing::instrument(skip(users, identity, now), fields(user_id = identity.user_id()))]
pub async fn choose_center(
    users: &dyn UserStore,
    identity: &Identity,
    center_id: i32,
    now: DateTime<Utc>,
) -> ServiceResult<Center> {
    let center = users
        .find_center(center_id)
        .await?
        .ok_or_else(|| ServiceError::Validation("El centro no existe".into()))?;

    if identity.user.force_default_center && identity.center_id() != Some(center_id) {
        tracing::debug!("User is pinned to its default center");
        return Err(ServiceError::PermissionDenied);
    }

    users.set_default_center(identity.user_id(), center_id, now).await?;
    tracing::info!(center_id, "Default center changed");
    Ok(center)
}
