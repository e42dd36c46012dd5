//! # Device Gate
//!
//! The request-level check every push/pull/resolve/upload call starts with
//! (spec §3 invariant 7, §4.1): a device is a valid sync principal only if
//! it exists, belongs to the requesting user, is active, and is not
//! soft-deleted. Failing this gate aborts the whole request — no entity or
//! outbox row is written (spec §8 quantified invariant).

use sqlx::PgPool;
use uuid::Uuid;

use sync_core::UserDevice;
use sync_db::repository::device;

use crate::error::{EngineError, EngineResult};

pub struct DeviceGate;

impl DeviceGate {
    /// Loads the device and checks it is a valid sync principal for
    /// `user_id`. Returns [`EngineError::DeviceNotFound`] rather than a
    /// not-found-by-id error so the gate failure is unambiguous to callers.
    pub async fn authenticate(pool: &PgPool, device_id: Uuid, user_id: Uuid) -> EngineResult<UserDevice> {
        let device = device::find_by_id(pool, device_id)
            .await?
            .ok_or(EngineError::DeviceNotFound)?;

        if !device.is_valid_sync_principal(user_id) {
            return Err(EngineError::DeviceNotFound);
        }

        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn valid_sync_principal_matches_user_and_is_active() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let device = UserDevice::create(user_id, "tok".to_string(), "ios".to_string(), "Phone".to_string(), now)
            .unwrap();
        assert!(device.is_valid_sync_principal(user_id));
        assert!(!device.is_valid_sync_principal(Uuid::new_v4()));
    }

    #[test]
    fn deactivated_device_is_not_a_valid_sync_principal() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let mut device =
            UserDevice::create(user_id, "tok".to_string(), "ios".to_string(), "Phone".to_string(), now).unwrap();
        device.deactivate(now).unwrap();
        assert!(!device.is_valid_sync_principal(user_id));
    }
}
