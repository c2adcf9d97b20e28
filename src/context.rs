use actix_web::{self, Error, FromRequest, HttpMessage};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::Error as AppError;

/// Identity of the authenticated caller, inserted into request extensions by
/// the JWT middleware. Extracting it from a request outside the authenticated
/// scope fails with 401.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub id: Uuid,
}

impl FromRequest for UserInfo {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &actix_web::HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<Self>() {
            ready(Ok(user.clone()))
        } else {
            ready(Err(AppError::NotAuthenticated.into()))
        }
    }
}
