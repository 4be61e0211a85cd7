use actix_web::{
    HttpResponse, ResponseError,
    http::StatusCode,
};
use deadpool_redis::{CreatePoolError, PoolError, redis::RedisError};
use std::borrow::Cow;

use crate::ENV;

/// Client-facing error: stable (kind, message) pairs only. Storage or
/// collaborator error text never reaches the caller.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());

        res.insert_header(("Access-Control-Allow-Origin", ENV.frontend_url.as_str()));
        res.insert_header(("Access-Control-Allow-Credentials", "true"));

        match self {
            Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::Unauthorized(msg)
            | Error::BadRequest(msg)
            | Error::Forbidden(msg) => res.json(ErrorBody { message: msg.clone() }),
            Error::InternalServer => {
                res.json(ErrorBody { message: "Internal Server Error".into() })
            }
        }
    }
}

/// Internal error carried through the service and repository layers.
#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    #[error("JWT Error")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    #[error("Hash Error")]
    HashError(#[from] argon2::password_hash::Error),
    #[error("Database Error: {0}")]
    DatabaseError(Cow<'static, str>),
    #[error("JSON Serialization/Deserialization Error")]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    PoolInit(#[from] CreatePoolError),
    #[error("Redis pool error: {0}")]
    PoolGet(#[from] PoolError),
    #[error("Redis error")]
    RedisError(#[from] RedisError),
    #[error("IO Error")]
    IoError(#[from] std::io::Error),
    #[error("Upstream HTTP error")]
    HttpError(#[from] reqwest::Error),
    #[error("Email transport error")]
    MailError(#[from] lettre::transport::smtp::Error),
    // Domain kinds
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0:?}")]
    Conflict(Option<DbErrorMeta>),
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug)]
pub struct DbErrorMeta {
    pub code: Option<String>,
    pub constraint: Option<String>,
    pub message: String,
}

fn conflict_message(meta: &Option<DbErrorMeta>) -> Cow<'static, str> {
    let Some(m) = meta else {
        return "Duplicate value".into();
    };

    // Conflicts raised by service-layer checks carry a message only.
    if m.code.is_none() && m.constraint.is_none() && !m.message.is_empty() {
        return m.message.clone().into();
    }

    // The reaction uniqueness constraint gets a dedicated message; for
    // the rest, derive the field name from the constraint suffix.
    if m.constraint.as_deref() == Some("reactions_owner_kind_owner_id_creator_id_key") {
        return "Reaction already exists".into();
    }

    let Some(constraint) = &m.constraint else {
        return "Duplicate value".into();
    };

    if constraint == "friend_requests_pair_idx" {
        return "Friend request already exists".into();
    }

    let field = constraint.split('_').next_back().unwrap_or("value");

    let mut chars = field.chars();
    let field = match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Value".to_string(),
    };

    format!("{field} already exists").into()
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::Unauthorized(msg) => Error::Unauthorized(msg),
            SystemError::Forbidden(msg) => Error::Forbidden(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::Conflict(meta) => Error::Conflict(conflict_message(&meta)),
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        log::error!("{:?}", err);
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    return SystemError::Conflict(Some(DbErrorMeta {
                        code: db_err.code().map(|s| s.to_string()),
                        constraint: db_err.constraint().map(|s| s.to_string()),
                        message: db_err.message().to_string(),
                    }));
                }
                Some("42P01") => {
                    return SystemError::NotFound("Resource not found".into());
                }
                _ => {
                    return SystemError::DatabaseError(db_err.message().to_string().into());
                }
            }
        }
        SystemError::InternalError(Box::new(err))
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict_with(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict(Some(DbErrorMeta {
            code: None,
            constraint: None,
            message: msg.into().into_owned(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_for_reaction_constraint() {
        let meta = Some(DbErrorMeta {
            code: Some("23505".into()),
            constraint: Some("reactions_owner_kind_owner_id_creator_id_key".into()),
            message: String::new(),
        });
        assert_eq!(conflict_message(&meta), "Reaction already exists");
    }

    #[test]
    fn conflict_message_derives_field_from_constraint() {
        let meta = Some(DbErrorMeta {
            code: Some("23505".into()),
            constraint: Some("users_email_key".into()),
            message: String::new(),
        });
        assert_eq!(conflict_message(&meta), "Key already exists".to_string());
    }

    #[test]
    fn conflict_message_without_meta() {
        assert_eq!(conflict_message(&None), "Duplicate value");
    }

    #[test]
    fn conflict_message_from_service_check() {
        let SystemError::Conflict(meta) = SystemError::conflict_with("Reaction already exists")
        else {
            panic!("expected conflict");
        };
        assert_eq!(conflict_message(&meta), "Reaction already exists");
    }
}
