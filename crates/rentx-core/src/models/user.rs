//! User profile model

use serde::{Deserialize, Serialize};

/// Locally cached user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Local record identifier
    pub id: String,
    /// Server-side account identifier
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub driver_license: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Profile fields a user can edit on the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub driver_license: Option<String>,
    pub avatar: Option<String>,
}

impl ProfileEdit {
    /// Check if the edit changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.driver_license.is_none() && self.avatar.is_none()
    }

    /// Apply this edit on top of an existing profile
    #[must_use]
    pub fn apply_to(&self, user: &User) -> User {
        let mut edited = user.clone();
        if let Some(name) = &self.name {
            edited.name.clone_from(name);
        }
        if let Some(driver_license) = &self.driver_license {
            edited.driver_license.clone_from(driver_license);
        }
        if let Some(avatar) = &self.avatar {
            edited.avatar = Some(avatar.clone());
        }
        edited
    }
}
