use actix_web::{FromRequest, web};
use argon2::{
    Argon2, PasswordVerifier,
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordHasher, SaltString},
};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize, de::Deserializer};
use validator::Validate;

use crate::{api::error, modules::user::schema::UserRole};

lazy_static::lazy_static! {
  static ref ARGON2: Argon2<'static> = Argon2::default();
}

pub fn hash_password(password: &str) -> Result<String, error::SystemError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = ARGON2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> Result<bool, error::SystemError> {
    let parsed_hash = PasswordHash::new(hash)?;
    match ARGON2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(error::SystemError::HashError(e)),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TypeClaims {
    RefreshToken,
    AccessToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub iat: u64,
    pub exp: u64,
    pub jti: Option<uuid::Uuid>,
    pub role: UserRole,
    pub _type: Option<TypeClaims>,
}

impl Claims {
    pub fn new(sub: &uuid::Uuid, role: &UserRole, exp: u64) -> Self {
        let now = chrono::Utc::now().timestamp() as u64;
        Claims { sub: *sub, iat: now, exp: now + exp, role: role.clone(), jti: None, _type: None }
    }

    pub fn with_jti(mut self, jti: uuid::Uuid) -> Self {
        self.jti = Some(jti);
        self
    }

    pub fn with_type(mut self, _type: TypeClaims) -> Self {
        self._type = Some(_type);
        self
    }

    pub fn encode(&self, secret: &[u8]) -> Result<String, error::SystemError> {
        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, self, &EncodingKey::from_secret(secret))?;
        Ok(token)
    }

    pub fn decode(token: &str, secret: &[u8]) -> Result<Self, error::SystemError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        let token_data = decode::<Self>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(token_data.claims)
    }
}

pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDir,
}

/// Parses the `field,direction` sort grammar: either one pair or a
/// repeated list of pairs. Direction is case-insensitive asc/desc.
/// Malformed entries are ignored rather than rejected.
pub fn parse_sort(raw: &str) -> Vec<SortOrder> {
    raw.split(';')
        .filter_map(|param| {
            let mut parts = param.split(',');
            let field = parts.next()?.trim();
            let direction = parts.next()?.trim();
            if field.is_empty() || parts.next().is_some() {
                return None;
            }
            let direction = match direction.to_lowercase().as_str() {
                "asc" => SortDir::Asc,
                "desc" => SortDir::Desc,
                _ => return None,
            };
            Some(SortOrder { field: field.to_string(), direction })
        })
        .collect()
}

/// Renders an ORDER BY clause from parsed sort orders, keeping only
/// fields present in the whitelist (field name -> column expression).
/// Falls back to `default_clause` when nothing survives.
pub fn order_by_clause(
    orders: &[SortOrder],
    whitelist: &[(&str, &str)],
    default_clause: &str,
) -> String {
    let rendered: Vec<String> = orders
        .iter()
        .filter_map(|o| {
            whitelist
                .iter()
                .find(|(name, _)| *name == o.field)
                .map(|(_, col)| format!("{} {}", col, o.direction.as_sql()))
        })
        .collect();

    if rendered.is_empty() {
        default_clause.to_string()
    } else {
        rendered.join(", ")
    }
}

pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let json = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            let model = json.into_inner();
            model.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedJson(model))
        })
    }
}

pub struct ValidatedQuery<T>(pub T);

impl<T> FromRequest for ValidatedQuery<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Query::<T>::from_request(req, payload);

        Box::pin(async move {
            let query = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            query.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedQuery(query.into_inner()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_pair() {
        let orders = parse_sort("created_at,desc");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].field, "created_at");
        assert_eq!(orders[0].direction, SortDir::Desc);
    }

    #[test]
    fn parse_repeated_pairs() {
        let orders = parse_sort("created_at,desc;content,asc");
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].field, "content");
        assert_eq!(orders[1].direction, SortDir::Asc);
    }

    #[test]
    fn direction_is_case_insensitive() {
        let orders = parse_sort("created_at,DESC");
        assert_eq!(orders[0].direction, SortDir::Desc);
    }

    #[test]
    fn malformed_entries_are_ignored() {
        let orders = parse_sort("created_at;content,sideways;,desc;id,asc,extra;id,asc");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].field, "id");
    }

    #[test]
    fn order_by_respects_whitelist() {
        let orders = parse_sort("created_at,desc;hash_password,asc");
        let clause = order_by_clause(
            &orders,
            &[("created_at", "m.created_at"), ("content", "m.content")],
            "m.created_at DESC",
        );
        assert_eq!(clause, "m.created_at DESC");
    }

    #[test]
    fn order_by_falls_back_when_empty() {
        let clause = order_by_clause(&[], &[("created_at", "created_at")], "created_at DESC");
        assert_eq!(clause, "created_at DESC");
    }
}
