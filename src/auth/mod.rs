//! Teacher and admin portal gate.
//!
//! Both portals are unlocked with a shared password and remembered in session-scoped
//! storage. This only keeps students from wandering into the dashboards; it is not an
//! authentication system.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::errors::AppError;
use crate::storage::{keys, load_json, save_json, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Portal {
    Teacher,
    Admin,
}

impl Portal {
    fn session_key(self) -> &'static str {
        match self {
            Portal::Teacher => keys::TEACHER_AUTHENTICATED,
            Portal::Admin => keys::ADMIN_AUTHENTICATED,
        }
    }
}

#[derive(Clone)]
pub struct PortalGate {
    session: Arc<dyn KeyValueStore>,
    teacher_password: String,
    admin_password: String,
}

impl PortalGate {
    /// `session` should not outlive the browser session, e.g. a [`crate::storage::MemoryStore`].
    pub fn new(session: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        Self {
            session,
            teacher_password: config.teacher_password.clone(),
            admin_password: config.admin_password.clone(),
        }
    }

    fn password(&self, portal: Portal) -> &str {
        match portal {
            Portal::Teacher => &self.teacher_password,
            Portal::Admin => &self.admin_password,
        }
    }

    pub async fn unlock(&self, portal: Portal, password: &str) -> Result<(), AppError> {
        if !constant_time_compare(password, self.password(portal)) {
            tracing::warn!("Rejected {:?} portal password", portal);
            return Err(AppError::Unauthorized("Incorrect password".to_string()));
        }

        save_json(self.session.as_ref(), portal.session_key(), &true).await
    }

    pub async fn is_unlocked(&self, portal: Portal) -> bool {
        load_json(self.session.as_ref(), portal.session_key())
            .await
            .unwrap_or(false)
    }

    pub async fn lock(&self, portal: Portal) -> Result<(), AppError> {
        self.session.remove(portal.session_key()).await
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
