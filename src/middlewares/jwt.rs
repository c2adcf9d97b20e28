use serde::{Deserialize, Serialize};
use uuid::Uuid;

use actix_web::dev::{Service, ServiceRequest, Transform};
use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, HttpMessage};
use std::future::Future;
use std::pin::Pin;

use crate::context::UserInfo;
use crate::core::tokener::{Payload, Tokener};
use crate::impls::tokener::jwt::JWT;

pub static JWT_TOKEN: &str = "JWT_TOKEN";

#[derive(Debug, Deserialize, Serialize)]
pub struct Claim {
    pub user: String,
    pub exp: i64,
}

impl Payload for Claim {
    fn user(&self) -> &str {
        &self.user
    }
}

pub struct Jwt {
    secret: Vec<u8>,
}

impl Jwt {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<S> Transform<S, ServiceRequest> for Jwt
where
    S: Service<ServiceRequest> + 'static,
    S::Future: 'static,
    S::Error: Into<Error>,
{
    type Error = Error;
    type Response = S::Response;
    type Transform = JwtService<S>;
    type InitError = ();
    type Future = Pin<Box<dyn Future<Output = Result<Self::Transform, Self::InitError>>>>;
    fn new_transform(&self, service: S) -> Self::Future {
        let secret = self.secret.clone();
        Box::pin(async move {
            Ok(JwtService {
                tokener: JWT::new(secret),
                next_service: service,
            })
        })
    }
}

pub struct JwtService<S> {
    tokener: JWT,
    next_service: S,
}

fn request_token(req: &ServiceRequest) -> Option<String> {
    if let Some(header) = req.headers().get("Authorization") {
        if let Ok(value) = header.to_str() {
            return Some(value.strip_prefix("Bearer ").unwrap_or(value).to_owned());
        }
    }
    req.cookie(JWT_TOKEN).map(|c| c.value().to_owned())
}

impl<S> Service<ServiceRequest> for JwtService<S>
where
    S: Service<ServiceRequest>,
    S::Future: 'static,
    S::Error: Into<Error>,
{
    type Response = S::Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    fn poll_ready(&self, ctx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx).map_err(|e| e.into())
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match request_token(&req) {
            None => return Box::pin(async move { Err(ErrorUnauthorized("no token in request")) }),
            Some(token) => token,
        };
        match <JWT as Tokener<Claim>>::verify_token(&self.tokener, &token) {
            Err(e) => return Box::pin(async move { Err(ErrorUnauthorized(e)) }),
            Ok(claim) => match claim.user.parse::<Uuid>() {
                Err(e) => return Box::pin(async move { Err(ErrorUnauthorized(e)) }),
                Ok(id) => {
                    req.extensions_mut().insert(UserInfo { id });
                }
            },
        }

        let res_fut = self.next_service.call(req);
        Box::pin(async move {
            let resp = res_fut.await.map_err(|e| e.into())?;
            Ok(resp)
        })
    }
}
