//! User profile reads and updates.

use std::sync::Arc;

use openmic_core::error::CoreError;
use openmic_core::store::EntityStore;
use openmic_core::types::DbId;
use openmic_core::user::{
    NotificationPreferences, PreferencesPatch, ProfilePatch, User, UserType,
};

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn EntityStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, user_id: DbId) -> Result<User, CoreError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| CoreError::user_not_found(user_id))
    }

    /// Patch name, bio and profile picture. Any user type may do this.
    pub async fn update_profile(
        &self,
        user_id: DbId,
        patch: &ProfilePatch,
    ) -> Result<User, CoreError> {
        let mut user = self.profile(user_id).await?;
        patch.apply(&mut user)?;

        if !self.store.update_user_profile(&user).await? {
            return Err(CoreError::user_not_found(user_id));
        }
        tracing::info!(%user_id, "Profile updated");
        Ok(user)
    }

    /// Patch a comedian's notification preferences.
    pub async fn update_notification_preferences(
        &self,
        user_id: DbId,
        patch: &PreferencesPatch,
    ) -> Result<NotificationPreferences, CoreError> {
        let user = self.profile(user_id).await?;
        user.require_type(UserType::Comedian, "update notification preferences")?;

        let mut prefs = user.notification_preferences;
        prefs.apply(patch);

        if !self
            .store
            .update_notification_preferences(user_id, &prefs)
            .await?
        {
            return Err(CoreError::user_not_found(user_id));
        }
        Ok(prefs)
    }
}
