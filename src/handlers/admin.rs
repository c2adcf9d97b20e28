use actix_web::web::{Data, Json, Path, Query};
use serde::Deserialize;
use sqlx::{query_as, query_scalar, PgPool};
use uuid::Uuid;

use crate::context::UserInfo;
use crate::core::admin::{self, Overview};
use crate::error::Error;
use crate::impls::pg::PgStore;
use crate::models::message::ContactMessage;
use crate::models::ngo::NgoApplication;
use crate::models::opportunity::VolunteerOpportunity;
use crate::models::profile::UserProfile;
use crate::request::Pagination;
use crate::response::List;

/// Stats plus the pending-NGO queue, fetched together; individual failures
/// degrade their widget instead of failing the console.
pub async fn overview(store: Data<PgStore>) -> Result<Json<Overview>, Error> {
    Ok(Json(admin::load_overview(store.get_ref()).await))
}

#[derive(Debug, Deserialize)]
pub struct DecisionBody {
    pub admin_notes: Option<String>,
}

/// Approve a pending NGO, then hand back a full reload of the console data
/// rather than patching state incrementally.
pub async fn approve_ngo(
    admin: UserInfo,
    ngo_id: Path<(Uuid,)>,
    Json(body): Json<DecisionBody>,
    store: Data<PgStore>,
) -> Result<Json<Overview>, Error> {
    let ngo_id = ngo_id.into_inner().0;
    admin::decide_ngo(store.get_ref(), ngo_id, admin.id, true, body.admin_notes.as_deref()).await?;
    Ok(Json(admin::load_overview(store.get_ref()).await))
}

pub async fn reject_ngo(
    admin: UserInfo,
    ngo_id: Path<(Uuid,)>,
    Json(body): Json<DecisionBody>,
    store: Data<PgStore>,
) -> Result<Json<Overview>, Error> {
    let ngo_id = ngo_id.into_inner().0;
    admin::decide_ngo(store.get_ref(), ngo_id, admin.id, false, body.admin_notes.as_deref()).await?;
    Ok(Json(admin::load_overview(store.get_ref()).await))
}

pub async fn users(Query(Pagination { page, size }): Query<Pagination>, db: Data<PgPool>) -> Result<Json<List<UserProfile>>, Error> {
    let mut conn = db.acquire().await?;
    let total = query_scalar("SELECT COUNT(*) FROM user_profiles").fetch_one(&mut conn).await?;
    let rows = query_as::<_, UserProfile>("SELECT * FROM user_profiles ORDER BY created_at DESC LIMIT $1 OFFSET $2")
        .bind(size)
        .bind((page - 1) * size)
        .fetch_all(&mut conn)
        .await?;
    Ok(Json(List::new(rows, total)))
}

pub async fn ngos(db: Data<PgPool>) -> Result<Json<List<NgoApplication>>, Error> {
    let rows = query_as::<_, NgoApplication>("SELECT * FROM ngo_applications ORDER BY created_at DESC")
        .fetch_all(&mut db.acquire().await?)
        .await?;
    let total = rows.len() as i64;
    Ok(Json(List::new(rows, total)))
}

pub async fn opportunities(db: Data<PgPool>) -> Result<Json<List<VolunteerOpportunity>>, Error> {
    let rows = query_as::<_, VolunteerOpportunity>(
        "SELECT o.*, p.full_name AS organization_name
        FROM volunteer_opportunities AS o
        JOIN user_profiles AS p ON o.ngo_id = p.id
        ORDER BY o.created_at DESC",
    )
    .fetch_all(&mut db.acquire().await?)
    .await?;
    let total = rows.len() as i64;
    Ok(Json(List::new(rows, total)))
}

pub async fn messages(db: Data<PgPool>) -> Result<Json<List<ContactMessage>>, Error> {
    let rows = query_as::<_, ContactMessage>("SELECT * FROM contact_messages ORDER BY created_at DESC")
        .fetch_all(&mut db.acquire().await?)
        .await?;
    let total = rows.len() as i64;
    Ok(Json(List::new(rows, total)))
}

pub async fn mark_message_read(message_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<ContactMessage>, Error> {
    let message_id = message_id.into_inner().0;
    let row = query_as::<_, ContactMessage>("UPDATE contact_messages SET status = 'read' WHERE id = $1 RETURNING *")
        .bind(message_id)
        .fetch_optional(&mut db.acquire().await?)
        .await?
        .ok_or_else(|| Error::BusinessError("message not found".into()))?;
    Ok(Json(row))
}
