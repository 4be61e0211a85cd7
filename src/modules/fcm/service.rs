use std::sync::Arc;
use std::time::Duration;

use log::warn;
use uuid::Uuid;

use crate::{
    ENV,
    api::error,
    modules::fcm::{
        model::{FcmNotification, FcmPayload, FcmTokenResponse},
        repository::FcmTokenRepository,
    },
};

const SEND_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Thin wrapper around the FCM HTTP endpoint. Retries transient
/// failures with exponential backoff before giving up.
#[derive(Clone)]
pub struct FcmClient {
    http: reqwest::Client,
    endpoint: String,
    server_key: Option<String>,
}

impl FcmClient {
    pub fn from_env() -> Self {
        FcmClient {
            http: reqwest::Client::new(),
            endpoint: ENV.fcm_endpoint.clone(),
            server_key: ENV.fcm_server_key.clone(),
        }
    }

    pub async fn send(&self, payload: &FcmPayload) -> Result<(), error::SystemError> {
        let Some(server_key) = &self.server_key else {
            warn!("FCM server key not configured, dropping push to {}", payload.to);
            return Ok(());
        };

        let mut backoff = INITIAL_BACKOFF;
        let mut last_err: Option<error::SystemError> = None;

        for attempt in 1..=SEND_ATTEMPTS {
            let result = self
                .http
                .post(&self.endpoint)
                .header("Authorization", format!("key={server_key}"))
                .json(payload)
                .send()
                .await
                .and_then(|res| res.error_for_status());

            match result {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!("FCM send attempt {}/{} failed: {}", attempt, SEND_ATTEMPTS, e);
                    last_err = Some(e.into());
                }
            }

            if attempt < SEND_ATTEMPTS {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }

        Err(last_err.unwrap_or_else(|| {
            error::SystemError::InternalError("FCM send failed".to_string().into())
        }))
    }
}

/// Fire-and-forget entry point used by other services. Failures are
/// logged inside the spawned task, never returned to the caller.
pub trait PushNotifier {
    fn notify(&self, user_id: Uuid, title: String, body: String);
}

pub struct FcmService<R>
where
    R: FcmTokenRepository + Send + Sync,
{
    token_repo: Arc<R>,
    client: FcmClient,
}

impl<R> Clone for FcmService<R>
where
    R: FcmTokenRepository + Send + Sync,
{
    fn clone(&self) -> Self {
        FcmService { token_repo: Arc::clone(&self.token_repo), client: self.client.clone() }
    }
}

impl<R> FcmService<R>
where
    R: FcmTokenRepository + Send + Sync,
{
    pub fn with_dependencies(token_repo: Arc<R>, client: FcmClient) -> Self {
        FcmService { token_repo, client }
    }

    pub async fn register_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<FcmTokenResponse, error::SystemError> {
        let entity = self.token_repo.upsert_token(&user_id, token).await?;
        Ok(FcmTokenResponse::from(entity))
    }

    pub async fn list_tokens(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FcmTokenResponse>, error::SystemError> {
        let tokens = self.token_repo.find_tokens_for_user(&user_id).await?;
        Ok(tokens.into_iter().map(FcmTokenResponse::from).collect())
    }

    pub async fn delete_token(
        &self,
        user_id: Uuid,
        token_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let entity = self
            .token_repo
            .find_by_id(&token_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Token not found"))?;

        if entity.user_id != user_id {
            return Err(error::SystemError::forbidden("You can only delete your own tokens"));
        }

        self.token_repo.delete(&token_id).await
    }

    pub async fn send_to_user(
        &self,
        user_id: Uuid,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> Result<(), error::SystemError> {
        let tokens = self.token_repo.find_tokens_for_user(&user_id).await?;
        for token in tokens {
            let payload = FcmPayload {
                to: token.token,
                notification: FcmNotification { title: title.to_string(), body: body.to_string() },
                data: data.clone(),
            };
            if let Err(e) = self.client.send(&payload).await {
                warn!("FCM delivery to one device of user {} failed: {:?}", user_id, e);
            }
        }
        Ok(())
    }

    pub async fn send_to_topic(
        &self,
        topic: &str,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> Result<(), error::SystemError> {
        let payload = FcmPayload {
            to: format!("/topics/{topic}"),
            notification: FcmNotification { title: title.to_string(), body: body.to_string() },
            data,
        };
        self.client.send(&payload).await
    }
}

impl<R> PushNotifier for FcmService<R>
where
    R: FcmTokenRepository + Send + Sync + 'static,
{
    fn notify(&self, user_id: Uuid, title: String, body: String) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send_to_user(user_id, &title, &body, None).await {
                warn!("Push notification to user {} failed: {:?}", user_id, e);
            }
        });
    }
}
