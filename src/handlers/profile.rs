use actix_web::web::{Data, Json, Path};
use sqlx::{query_as, query_scalar, PgPool};
use uuid::Uuid;

use crate::context::UserInfo;
use crate::error::Error;
use crate::models::profile::{ProfilePatch, UserProfile};
use crate::response::RpcOutcome;

/// The caller's own profile. A missing row (an interrupted signup) is
/// repaired through the backend procedure and the repaired row returned.
pub async fn me(user: UserInfo, db: Data<PgPool>) -> Result<Json<UserProfile>, Error> {
    let mut conn = db.acquire().await?;
    if let Some(profile) = query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(user.id)
        .fetch_optional(&mut conn)
        .await?
    {
        return Ok(Json(profile));
    }
    let value: serde_json::Value = query_scalar("SELECT create_missing_user_profile($1)")
        .bind(user.id)
        .fetch_one(&mut conn)
        .await?;
    let outcome = serde_json::from_value::<RpcOutcome>(value)?.ensure()?;
    outcome
        .profile
        .map(Json)
        .ok_or_else(|| Error::ServerError("backend did not return the repaired profile".into()))
}

pub async fn detail(profile_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<UserProfile>, Error> {
    let profile_id = profile_id.into_inner().0;
    let profile = query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_one(&mut db.acquire().await?)
        .await?;
    Ok(Json(profile))
}

pub async fn update(user: UserInfo, Json(patch): Json<ProfilePatch>, db: Data<PgPool>) -> Result<Json<UserProfile>, Error> {
    let profile = query_as::<_, UserProfile>(
        "UPDATE user_profiles SET
            full_name = COALESCE($2, full_name),
            phone = COALESCE($3, phone),
            bio = COALESCE($4, bio),
            skills = COALESCE($5, skills),
            interests = COALESCE($6, interests),
            location_address = COALESCE($7, location_address),
            city = COALESCE($8, city),
            state = COALESCE($9, state),
            pincode = COALESCE($10, pincode),
            latitude = COALESCE($11, latitude),
            longitude = COALESCE($12, longitude),
            avatar_url = COALESCE($13, avatar_url),
            updated_at = now()
        WHERE id = $1
        RETURNING *",
    )
    .bind(user.id)
    .bind(&patch.full_name)
    .bind(&patch.phone)
    .bind(&patch.bio)
    .bind(&patch.skills)
    .bind(&patch.interests)
    .bind(&patch.location_address)
    .bind(&patch.city)
    .bind(&patch.state)
    .bind(&patch.pincode)
    .bind(patch.latitude)
    .bind(patch.longitude)
    .bind(&patch.avatar_url)
    .fetch_one(&mut db.acquire().await?)
    .await?;
    Ok(Json(profile))
}
