pub mod admin;
pub mod application;
pub mod contact;
pub mod favorites;
pub mod location;
pub mod ngo;
pub mod opportunity;
pub mod profile;
pub mod stats;
pub mod upload;

use actix_web::http::StatusCode;
use rand::Rng;
use sqlx::{query, query_as, query_scalar, FromRow, PgPool};
use std::ops::Add;
use uuid::Uuid;

use actix_web::{
    cookie::Cookie,
    web::{Data, Json},
    HttpResponse,
};

use crate::config::Config;
use crate::core::tokener::Tokener;
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;
use crate::middlewares::jwt::{Claim, JWT_TOKEN};
use crate::models::ngo::NgoApplicationInsert;
use crate::models::profile::UserType;
use crate::response::RpcOutcome;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use hex::ToHex;
use sha2::{Digest, Sha256};

/// Credential row; profile data lives in `user_profiles`, created through the
/// signup procedure.
#[derive(Debug, Clone, FromRow)]
struct AuthUser {
    id: Uuid,
    #[allow(dead_code)]
    email: String,
    #[allow(dead_code)]
    phone: String,
    password: String,
    salt: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

fn hash_password(pass: &str, slt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass);
    hasher.update(slt);
    hasher.finalize().encode_hex()
}

pub async fn login(Json(Login { username, password }): Json<Login>, db: Data<PgPool>, config: Data<Config>) -> Result<HttpResponse, Error> {
    let mut conn = db.acquire().await?;
    if let Some(user) = query_as::<_, AuthUser>("SELECT * FROM users WHERE email = $1 OR phone = $1")
        .bind(&username)
        .fetch_optional(&mut conn)
        .await?
    {
        if hash_password(&password, &user.salt) != user.password {
            return Ok(HttpResponse::build(StatusCode::FORBIDDEN).finish());
        }
        let claim = Claim {
            user: user.id.to_string(),
            exp: chrono::Utc::now().add(chrono::Duration::days(30)).timestamp(),
        };
        let tokener = JWT::new(config.jwt_secret.as_bytes().to_owned());
        let token = tokener.gen_token(&claim)?;
        return Ok(HttpResponse::build(StatusCode::OK)
            .cookie(Cookie::new(JWT_TOKEN, token.clone()))
            .json(TokenResponse { token }));
    }
    Err(Error::BusinessError("invalid username or password".into()))
}

fn random_salt() -> String {
    let chars: Vec<char> = ('0'..='9').chain('a'..='z').chain('A'..='Z').collect();
    let mut slt = String::new();
    let mut rng = thread_rng();
    for _ in 0..32 {
        let i = rng.gen_range(0..chars.len());
        slt.push(chars[i]);
    }
    slt
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    full_name: String,
    email: String,
    phone: String,
    password: String,
    user_type: UserType,
    /// Required for NGO signups; carries the organization application.
    ngo: Option<NgoApplicationInsert>,
}

#[derive(Debug, Serialize)]
struct SignupResponse {
    id: Uuid,
}

pub async fn signup(Json(data): Json<Signup>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    if data.user_type == UserType::Admin {
        return Err(Error::BusinessError("admin accounts cannot be self-registered".into()));
    }
    if data.user_type == UserType::Ngo && data.ngo.is_none() {
        return Err(Error::BusinessError("NGO signup requires organization details".into()));
    }
    let mut tx = db.begin().await?;
    let slt = random_salt();
    let user_id = Uuid::new_v4();
    if let Err(e) = query("INSERT INTO users (id, email, phone, password, salt) VALUES ($1, $2, $3, $4, $5)")
        .bind(user_id)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(hash_password(&data.password, &slt))
        .bind(&slt)
        .execute(&mut tx)
        .await
        .map_err(Error::from)
    {
        if e.is_unique_violation() {
            return Err(Error::BusinessError("an account with this email or phone already exists".into()));
        }
        return Err(e);
    }
    // profile rows are created by the backend, not written directly
    let value: serde_json::Value = query_scalar("SELECT create_user_profile_on_signup($1, $2, $3, $4)")
        .bind(user_id)
        .bind(&data.full_name)
        .bind(data.user_type)
        .bind(&data.phone)
        .fetch_one(&mut tx)
        .await?;
    serde_json::from_value::<RpcOutcome>(value)?.ensure()?;
    if let Some(ngo) = &data.ngo {
        let value: serde_json::Value = query_scalar("SELECT create_ngo_application_on_signup($1, $2)")
            .bind(user_id)
            .bind(serde_json::to_value(ngo)?)
            .fetch_one(&mut tx)
            .await?;
        serde_json::from_value::<RpcOutcome>(value)?.ensure()?;
    }
    tx.commit().await?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(SignupResponse { id: user_id }))
}

#[cfg(test)]
mod tests {
    use super::{hash_password, random_salt};

    #[test]
    fn test_hash_is_deterministic_per_salt() {
        let a = hash_password("open sesame", "salt-one");
        assert_eq!(a, hash_password("open sesame", "salt-one"));
        assert_ne!(a, hash_password("open sesame", "salt-two"));
        assert_ne!(a, hash_password("open sesam", "salt-one"));
    }

    #[test]
    fn test_salt_shape() {
        let slt = random_salt();
        assert_eq!(slt.len(), 32);
        assert!(slt.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(slt, random_salt());
    }
}
