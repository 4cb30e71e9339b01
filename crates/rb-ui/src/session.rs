//! Register, login and logout. What the board shows depends on the
//! session, so every outcome reloads the thread list.

use std::sync::Arc;

use rb_core::error::{ApiResult, AppError};
use rb_core::models::{SessionCredential, UserId};
use rb_core::traits::ImageboardApi;
use tracing::{info, warn};

use crate::manager::ThreadsManager;

#[derive(Clone)]
pub struct SessionManager {
    api: Arc<dyn ImageboardApi>,
    threads: ThreadsManager,
}

impl SessionManager {
    pub fn new(api: Arc<dyn ImageboardApi>, threads: ThreadsManager) -> Self {
        Self { api, threads }
    }

    pub async fn register(&self, credential: &SessionCredential) -> Result<UserId, AppError> {
        let result = self.api.register(credential).await;
        self.conclude("register", result).await
    }

    pub async fn login(&self, credential: &SessionCredential) -> Result<UserId, AppError> {
        let result = self.api.login(credential).await;
        self.conclude("login", result).await
    }

    pub async fn logout(&self) -> Result<UserId, AppError> {
        let result = self.api.logout().await;
        self.conclude("logout", result).await
    }

    async fn conclude(&self, operation: &'static str, result: ApiResult<UserId>) -> Result<UserId, AppError> {
        match &result {
            Ok(user_id) => info!(operation, user_id, "session changed"),
            Err(err) => warn!(operation, error = %err, "session operation failed"),
        }
        if let Err(err) = self.threads.reload_list().await {
            warn!(operation, error = %err, "reload after session change failed");
        }
        result.map_err(AppError::from)
    }
}
