//! Board backed by the community HTTP service.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::{validate_message, MessageBoard};
use crate::errors::AppError;
use crate::models::{CommunityMessage, CreateMessageRequest, ToggleLikeRequest};
use crate::session::CurrentUser;

/// Path of the message collection on the service.
pub const MESSAGES_PATH: &str = "/api/community/messages";

/// HTTP client for a remote board. Requests are sent once; failures are returned to
/// the caller as [`AppError::Remote`].
#[derive(Clone)]
pub struct RemoteBoard {
    client: Client,
    base_url: String,
}

impl RemoteBoard {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(format!(
            "Community service returned {}",
            status
        )));
    }
    if !status.is_success() {
        tracing::warn!("Community service returned {}", status);
        return Err(AppError::Remote(format!(
            "Community service returned {}",
            status
        )));
    }
    Ok(response.json().await?)
}

#[async_trait]
impl MessageBoard for RemoteBoard {
    async fn get_all_messages(&self) -> Result<Vec<CommunityMessage>, AppError> {
        let response = self.client.get(self.url(MESSAGES_PATH)).send().await?;
        decode(response).await
    }

    async fn post_message(
        &self,
        user: &CurrentUser,
        text: &str,
    ) -> Result<CommunityMessage, AppError> {
        let request = CreateMessageRequest {
            author: user.name.clone(),
            initials: user.initials.clone(),
            message: validate_message(text)?.to_string(),
        };

        let response = self
            .client
            .post(self.url(MESSAGES_PATH))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    async fn toggle_like(
        &self,
        user: &CurrentUser,
        message_id: &str,
    ) -> Result<CommunityMessage, AppError> {
        let request = ToggleLikeRequest {
            user_id: user.id.clone(),
        };

        let response = self
            .client
            .post(self.url(&format!("{}/{}/like", MESSAGES_PATH, message_id)))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }
}
