use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::HttpMessage;
use sqlx::{query::QueryScalar, query_scalar, PgPool};
use std::future::Future;
use std::future::{ready, Ready};
use std::pin::Pin;
use std::task::Poll;

use crate::context::UserInfo;

/// Gate for the admin scope: the authenticated caller's profile must carry
/// the admin user type. Mounted inside the JWT scope.
pub struct RequireAdmin {
    db: PgPool,
}

impl RequireAdmin {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl<S> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = actix_web::Error>,
    S::Future: 'static,
{
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type Response = S::Response;
    type Error = S::Error;
    type InitError = ();
    type Transform = RequireAdminMiddleware<S>;
    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAdminMiddleware {
            db: self.db.clone(),
            service,
        }))
    }
}

pub struct RequireAdminMiddleware<S> {
    db: PgPool,
    service: S,
}

impl<S> Service<ServiceRequest> for RequireAdminMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = actix_web::Error>,
    S::Future: 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<ServiceResponse, Self::Error>>>>;
    fn poll_ready(&self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }
    fn call(&self, req: ServiceRequest) -> Self::Future {
        let user_info = req.extensions().get::<UserInfo>().cloned();
        if let Some(user_info) = user_info {
            let db = self.db.clone();
            let next = self.service.call(req);
            return Box::pin(async move {
                let q: QueryScalar<_, bool, _> =
                    query_scalar("SELECT EXISTS(SELECT id FROM user_profiles WHERE id = $1 AND user_type = 'admin')")
                        .bind(user_info.id);
                match db.acquire().await {
                    Ok(mut conn) => match q.fetch_one(&mut conn).await {
                        Ok(true) => next.await,
                        Ok(false) => Err(actix_web::error::ErrorForbidden("admin access required")),
                        Err(err) => Err(actix_web::error::ErrorInternalServerError(err)),
                    },
                    Err(err) => Err(actix_web::error::ErrorInternalServerError(err)),
                }
            });
        }
        Box::pin(async move { Err(actix_web::error::ErrorUnauthorized("unauthorized")) })
    }
}
