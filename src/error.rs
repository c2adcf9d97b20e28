use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("http client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("jwt error")]
    JWTError(#[from] jsonwebtoken::errors::Error),

    #[error("dotenv error")]
    DotEnvError(#[from] dotenv::Error),

    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JSONError(#[from] serde_json::Error),

    #[error("multipart error: {0}")]
    MultipartError(#[from] actix_multipart::MultipartError),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("remote procedure failed: {0}")]
    RpcFailure(String),

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("business error: {0}")]
    BusinessError(String),

    #[error("server error: {0}")]
    ServerError(String),
}

impl Error {
    // Postgres unique_violation; the apply path reads this as "already applied".
    pub fn is_unique_violation(&self) -> bool {
        if let Error::DatabaseError(sqlx::Error::Database(e)) = self {
            return e.code().as_deref() == Some("23505");
        }
        false
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Error::BusinessError(_) => StatusCode::BAD_REQUEST,
            Error::RpcFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_unique_violation_only_matches_conflict() {
        assert!(!Error::NotAuthenticated.is_unique_violation());
        assert!(!Error::DatabaseError(sqlx::Error::RowNotFound).is_unique_violation());
    }
}
