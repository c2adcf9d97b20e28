use actix_web::{
    http::StatusCode,
    web::{Data, Json, Path, Query},
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use sqlx::{query_as, query_scalar, PgPool};
use uuid::Uuid;

use crate::context::UserInfo;
use crate::core::discovery::{self, ApplyOutcome};
use crate::core::review::{self, StatusCounts, StatusFilter};
use crate::error::Error;
use crate::impls::pg::PgStore;
use crate::models::application::{ApplicationInsert, ApplicationStatus, InboxApplication, MyApplication, ReviewDecision};
use crate::models::profile::UserProfile;
use crate::response::List;

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub status: ApplicationStatus,
    pub already_applied: bool,
}

/// Submit an application. A uniqueness conflict from the backend is folded
/// into the normal applied response instead of surfacing as an error.
pub async fn apply(
    user: UserInfo,
    Json(input): Json<ApplicationInsert>,
    db: Data<PgPool>,
    store: Data<PgStore>,
) -> Result<HttpResponse, Error> {
    let viewer = query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(user.id)
        .fetch_one(&mut db.acquire().await?)
        .await?;
    let existing: Option<ApplicationStatus> =
        query_scalar("SELECT status FROM volunteer_applications WHERE volunteer_id = $1 AND opportunity_id = $2")
            .bind(user.id)
            .bind(input.opportunity_id)
            .fetch_optional(&mut db.acquire().await?)
            .await?;

    match discovery::apply(store.get_ref(), &viewer, existing, &input).await? {
        ApplyOutcome::Submitted(row) => Ok(HttpResponse::build(StatusCode::CREATED).json(ApplyResponse {
            status: row.status,
            already_applied: false,
        })),
        ApplyOutcome::AlreadyApplied { status } => Ok(HttpResponse::build(StatusCode::OK).json(ApplyResponse {
            status,
            already_applied: true,
        })),
    }
}

/// The caller's own applications, newest first, joined with each opportunity.
pub async fn mine(user: UserInfo, db: Data<PgPool>) -> Result<Json<List<MyApplication>>, Error> {
    let rows = query_as::<_, MyApplication>(
        "SELECT a.id, a.opportunity_id, a.status, a.ngo_notes, a.applied_at, a.reviewed_at,
            o.title, o.category, o.city, o.state, p.full_name AS organization_name
        FROM volunteer_applications AS a
        JOIN volunteer_opportunities AS o ON a.opportunity_id = o.id
        JOIN user_profiles AS p ON o.ngo_id = p.id
        WHERE a.volunteer_id = $1
        ORDER BY a.applied_at DESC",
    )
    .bind(user.id)
    .fetch_all(&mut db.acquire().await?)
    .await?;
    let total = rows.len() as i64;
    Ok(Json(List::new(rows, total)))
}

#[derive(Debug, Deserialize)]
pub struct InboxParams {
    pub status: Option<StatusFilter>,
}

#[derive(Debug, Serialize)]
pub struct InboxResponse {
    pub counts: StatusCounts,
    pub list: Vec<InboxApplication>,
}

/// Applications against the caller's opportunities with counts re-derived
/// from the fetched list and an optional status filter applied on top.
pub async fn inbox(user: UserInfo, Query(params): Query<InboxParams>, store: Data<PgStore>) -> Result<Json<InboxResponse>, Error> {
    use crate::core::review::ReviewStore;
    let applications = store.applications_for_ngo(user.id).await?;
    let counts = review::count_by_status(&applications);
    let list = review::filter_applications(applications, params.status.unwrap_or_default());
    Ok(Json(InboxResponse { counts, list }))
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub status: ReviewDecision,
    pub ngo_notes: Option<String>,
}

pub async fn review(
    user: UserInfo,
    application_id: Path<(Uuid,)>,
    Json(body): Json<ReviewBody>,
    store: Data<PgStore>,
) -> Result<Json<InboxApplication>, Error> {
    let application_id = application_id.into_inner().0;
    let updated = review::review(store.get_ref(), user.id, application_id, body.status, body.ngo_notes.as_deref()).await?;
    Ok(Json(updated))
}
