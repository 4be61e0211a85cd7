use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::ENV;
use crate::api::error;
use crate::configs::RedisCache;

use crate::modules::user::mailer::EmailSender;
use crate::modules::user::model::{
    SignInModel, SignUpModel, UpdateUser, UpdateUserModel, UserResponse,
};
use crate::modules::user::{model::InsertUser, repository::UserRepository};
use crate::utils::{Claims, TypeClaims, hash_password, verify_password};

const VERIFICATION_TOKEN_TTL_SECS: i64 = 60 * 60 * 24;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<RedisCache>,
    mailer: Arc<dyn EmailSender + Send + Sync>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<RedisCache>,
        mailer: Arc<dyn EmailSender + Send + Sync>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache, mailer }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = format!("user:{}", id);
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            info!("User {} found in cache", id);
            return Ok(cached_user);
        }
        let user_entity = self.repo.find_by_id(&id).await?;
        if let Some(entity) = user_entity {
            let response = UserResponse::from(entity);
            self.cache.set(&key, &response, 3600).await?;
            info!("User {} cached", id);
            Ok(response)
        } else {
            Err(error::SystemError::not_found("User not found"))
        }
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        user: UpdateUserModel,
    ) -> Result<(), error::SystemError> {
        if user.username.is_none()
            && user.email.is_none()
            && user.first_name.is_none()
            && user.last_name.is_none()
            && user.avatar_url.is_none()
            && user.bio.is_none()
            && user.phone.is_none()
        {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let update_user = UpdateUser {
            username: user.username,
            email: user.email,
            display_name: match (user.first_name, user.last_name) {
                (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
                _ => None,
            },
            avatar_url: user.avatar_url,
            bio: user.bio,
            phone: user.phone,
        };

        self.repo.update(&id, &update_user).await?;

        let key = format!("user:{}", id);
        self.cache.delete(&key).await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), error::SystemError> {
        let deleted = self.repo.delete(&id).await?;
        if !deleted {
            return Err(error::SystemError::not_found("User not found"));
        }
        self.cache.delete(&format!("user:{}", id)).await?;
        Ok(())
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<uuid::Uuid, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            username: user.username,
            email: user.email.clone(),
            hash_password,
            display_name: format!("{} {}", user.first_name, user.last_name),
        };

        let user_id = self.repo.create(&new_user).await?;

        let token =
            self.repo.create_verification_token(&user_id, VERIFICATION_TOKEN_TTL_SECS).await?;

        // Verification email is best-effort; signup already succeeded.
        let mailer = self.mailer.clone();
        let email = user.email;
        let link = format!("{}/verify?token={}", ENV.frontend_url, token.token);
        tokio::spawn(async move {
            let body = format!("Welcome! Verify your account by visiting: {link}");
            if let Err(e) = mailer.send(&email, "Verify your account", body).await {
                warn!("Failed to send verification email to {}: {:?}", email, e);
            }
        });

        Ok(user_id)
    }

    pub async fn verify_email(&self, token: Uuid) -> Result<(), error::SystemError> {
        let verified = self.repo.consume_verification_token(&token).await?;
        if !verified {
            return Err(error::SystemError::bad_request("Invalid or expired verification token"));
        }
        Ok(())
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<(String, String), error::SystemError> {
        let user_entity = self
            .repo
            .find_by_username(&user.username)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid username or password"))?;

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid username or password"));
        }

        self.issue_tokens(&user_entity.id, &user_entity.role).await
    }

    pub async fn sign_out(&self, refresh_token: Option<String>) -> Result<(), error::SystemError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };
        let Ok(claims) = Claims::decode(&token, ENV.jwt_secret.as_ref()) else {
            return Ok(());
        };
        if let Some(jti) = claims.jti {
            self.cache.delete(&format!("refresh_token:{jti}")).await?;
        }
        Ok(())
    }

    pub async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(String, String), error::SystemError> {
        let token = refresh_token
            .ok_or_else(|| error::SystemError::unauthorized("Missing refresh token"))?;
        let claims = Claims::decode(&token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Invalid refresh token"))?;

        if claims._type != Some(TypeClaims::RefreshToken) {
            return Err(error::SystemError::unauthorized("Invalid refresh token"));
        }

        let jti = claims
            .jti
            .ok_or_else(|| error::SystemError::unauthorized("Invalid refresh token"))?;
        let key = format!("refresh_token:{jti}");
        let known: Option<Uuid> = self.cache.get(&key).await?;
        if known != Some(claims.sub) {
            return Err(error::SystemError::unauthorized("Refresh token revoked"));
        }

        // Rotate: the old jti stops working the moment new tokens exist.
        self.cache.delete(&key).await?;
        self.issue_tokens(&claims.sub, &claims.role).await
    }

    pub async fn search(
        &self,
        query: &str,
        limit: i32,
    ) -> Result<Vec<UserResponse>, error::SystemError> {
        let users = self.repo.search_users(query, limit).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    async fn issue_tokens(
        &self,
        user_id: &Uuid,
        role: &crate::modules::user::schema::UserRole,
    ) -> Result<(String, String), error::SystemError> {
        let access_token = Claims::new(user_id, role, ENV.access_token_expiration)
            .with_type(TypeClaims::AccessToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::now_v7();
        let refresh_token = Claims::new(user_id, role, ENV.refresh_token_expiration)
            .with_jti(jti)
            .with_type(TypeClaims::RefreshToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let refresh_key = format!("refresh_token:{jti}");
        self.cache.set(&refresh_key, user_id, ENV.refresh_token_expiration as usize).await?;

        Ok((access_token, refresh_token))
    }
}
