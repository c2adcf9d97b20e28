use actix_web::web::{Data, Json, Query};
use serde::Deserialize;
use sqlx::{query_scalar, PgPool};
use uuid::Uuid;

use crate::context::UserInfo;
use crate::error::Error;
use crate::models::stats::UserStats;

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub user_id: Option<Uuid>,
}

/// Dashboard stats come whole from the `get_user_stats` procedure; the shape
/// depends on whether the target is a volunteer or an NGO.
pub async fn user_stats(user: UserInfo, Query(params): Query<StatsParams>, db: Data<PgPool>) -> Result<Json<UserStats>, Error> {
    let target = params.user_id.unwrap_or(user.id);
    let value: serde_json::Value = query_scalar("SELECT get_user_stats($1)")
        .bind(target)
        .fetch_one(&mut db.acquire().await?)
        .await?;
    Ok(Json(serde_json::from_value(value)?))
}
