use std::sync::Mutex;

use actix_web::web::{Data, Json, Path, Query};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, PgPool};
use uuid::Uuid;

use crate::context::UserInfo;
use crate::core::discovery::{self, ApplyControl, BrowseFilter};
use crate::core::favorites::FavoriteSet;
use crate::error::Error;
use crate::impls::pg::PgStore;
use crate::models::application::ApplicationStatus;
use crate::models::opportunity::{NearbyOpportunity, OpportunityInsert, OpportunityPatch, VolunteerOpportunity};
use crate::models::profile::{UserProfile, UserType};
use crate::response::List;

fn normalize_category(category: Option<String>) -> Option<String> {
    category.filter(|c| c != "all")
}

#[derive(Debug, Deserialize)]
pub struct BrowseParams {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub search: Option<String>,
}

/// Public browse: approval-gated active opportunities, optional text search
/// on top of the server-side filters.
pub async fn browse(Query(params): Query<BrowseParams>, store: Data<PgStore>) -> Result<Json<List<NearbyOpportunity>>, Error> {
    let filter = BrowseFilter {
        category: normalize_category(params.category),
        city: params.city,
        state: params.state,
    };
    let rows = discovery::browse(store.get_ref(), &filter).await?;
    let items: Vec<NearbyOpportunity> = rows.into_iter().map(NearbyOpportunity::from).collect();
    let items = discovery::search_filter(items, params.search.as_deref().unwrap_or(""));
    let total = items.len() as i64;
    Ok(Json(List::new(items, total)))
}

pub async fn detail(opportunity_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<VolunteerOpportunity>, Error> {
    let opportunity_id = opportunity_id.into_inner().0;
    let row = query_as::<_, VolunteerOpportunity>(
        "SELECT o.*, p.full_name AS organization_name
        FROM volunteer_opportunities AS o
        JOIN user_profiles AS p ON o.ngo_id = p.id
        WHERE o.id = $1",
    )
    .bind(opportunity_id)
    .fetch_one(&mut db.acquire().await?)
    .await?;
    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    pub radius: Option<f64>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryItem {
    #[serde(flatten)]
    pub opportunity: NearbyOpportunity,
    pub application_status: Option<ApplicationStatus>,
    pub control: ApplyControl,
    pub favorite: bool,
}

/// The discovery view: radius-bounded when the viewer's profile carries a
/// coordinate, the plain browse list otherwise, overlaid with the viewer's
/// per-opportunity application state and favorites.
pub async fn discover(
    user: UserInfo,
    Query(params): Query<DiscoverParams>,
    db: Data<PgPool>,
    store: Data<PgStore>,
    favorites: Data<Mutex<FavoriteSet>>,
) -> Result<Json<List<DiscoveryItem>>, Error> {
    let viewer = query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(user.id)
        .fetch_optional(&mut db.acquire().await?)
        .await?;
    let category = normalize_category(params.category);
    let radius = params.radius.unwrap_or(discovery::DEFAULT_RADIUS_KM);

    let items = discovery::discover(store.get_ref(), viewer.as_ref(), radius, category.as_deref()).await?;
    let items = discovery::search_filter(items, params.search.as_deref().unwrap_or(""));

    use crate::core::discovery::DiscoveryStore;
    let statuses = store.application_statuses(user.id).await?;
    let favorites = favorites.lock().map_err(|_| Error::ServerError("favorites store poisoned".into()))?;
    let items: Vec<DiscoveryItem> = items
        .into_iter()
        .map(|opportunity| {
            let status = statuses.get(&opportunity.id).copied();
            DiscoveryItem {
                favorite: favorites.contains(&opportunity.id),
                application_status: status,
                control: discovery::apply_control(status),
                opportunity,
            }
        })
        .collect();
    let total = items.len() as i64;
    Ok(Json(List::new(items, total)))
}

async fn require_ngo(user: &UserInfo, db: &PgPool) -> Result<UserProfile, Error> {
    let profile = query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(user.id)
        .fetch_one(&mut db.acquire().await?)
        .await?;
    if profile.user_type != UserType::Ngo {
        return Err(Error::BusinessError("only NGO accounts can manage opportunities".into()));
    }
    Ok(profile)
}

pub async fn create(user: UserInfo, Json(data): Json<OpportunityInsert>, db: Data<PgPool>) -> Result<Json<VolunteerOpportunity>, Error> {
    require_ngo(&user, &db).await?;
    let row = query_as::<_, VolunteerOpportunity>(
        "INSERT INTO volunteer_opportunities (
            ngo_id, title, description, requirements, category, skills_required,
            location_address, city, state, pincode, latitude, longitude,
            duration, time_commitment, volunteers_needed, max_volunteers,
            start_date, end_date, application_deadline, is_virtual,
            contact_person, contact_phone, contact_email, tags, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
            $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, 'active')
        RETURNING *",
    )
    .bind(user.id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.requirements)
    .bind(&data.category)
    .bind(&data.skills_required)
    .bind(&data.location_address)
    .bind(&data.city)
    .bind(&data.state)
    .bind(&data.pincode)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(&data.duration)
    .bind(&data.time_commitment)
    .bind(data.volunteers_needed)
    .bind(data.max_volunteers)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.application_deadline)
    .bind(data.is_virtual)
    .bind(&data.contact_person)
    .bind(&data.contact_phone)
    .bind(&data.contact_email)
    .bind(&data.tags)
    .fetch_one(&mut db.acquire().await?)
    .await?;
    Ok(Json(row))
}

pub async fn mine(user: UserInfo, db: Data<PgPool>) -> Result<Json<List<VolunteerOpportunity>>, Error> {
    let rows = query_as::<_, VolunteerOpportunity>(
        "SELECT * FROM volunteer_opportunities WHERE ngo_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&mut db.acquire().await?)
    .await?;
    let total = rows.len() as i64;
    Ok(Json(List::new(rows, total)))
}

pub async fn update(
    user: UserInfo,
    opportunity_id: Path<(Uuid,)>,
    Json(patch): Json<OpportunityPatch>,
    db: Data<PgPool>,
) -> Result<Json<VolunteerOpportunity>, Error> {
    let opportunity_id = opportunity_id.into_inner().0;
    let row = query_as::<_, VolunteerOpportunity>(
        "UPDATE volunteer_opportunities SET
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            requirements = COALESCE($5, requirements),
            category = COALESCE($6, category),
            skills_required = COALESCE($7, skills_required),
            location_address = COALESCE($8, location_address),
            city = COALESCE($9, city),
            state = COALESCE($10, state),
            pincode = COALESCE($11, pincode),
            latitude = COALESCE($12, latitude),
            longitude = COALESCE($13, longitude),
            duration = COALESCE($14, duration),
            time_commitment = COALESCE($15, time_commitment),
            volunteers_needed = COALESCE($16, volunteers_needed),
            max_volunteers = COALESCE($17, max_volunteers),
            start_date = COALESCE($18, start_date),
            end_date = COALESCE($19, end_date),
            application_deadline = COALESCE($20, application_deadline),
            status = COALESCE($21, status),
            contact_person = COALESCE($22, contact_person),
            contact_phone = COALESCE($23, contact_phone),
            contact_email = COALESCE($24, contact_email),
            tags = COALESCE($25, tags),
            updated_at = now()
        WHERE id = $1 AND ngo_id = $2
        RETURNING *",
    )
    .bind(opportunity_id)
    .bind(user.id)
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(&patch.requirements)
    .bind(&patch.category)
    .bind(&patch.skills_required)
    .bind(&patch.location_address)
    .bind(&patch.city)
    .bind(&patch.state)
    .bind(&patch.pincode)
    .bind(patch.latitude)
    .bind(patch.longitude)
    .bind(&patch.duration)
    .bind(&patch.time_commitment)
    .bind(patch.volunteers_needed)
    .bind(patch.max_volunteers)
    .bind(patch.start_date)
    .bind(patch.end_date)
    .bind(patch.application_deadline)
    .bind(patch.status)
    .bind(&patch.contact_person)
    .bind(&patch.contact_phone)
    .bind(&patch.contact_email)
    .bind(&patch.tags)
    .fetch_optional(&mut db.acquire().await?)
    .await?
    .ok_or_else(|| Error::BusinessError("opportunity not found among your postings".into()))?;
    Ok(Json(row))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

pub async fn delete_opportunity(user: UserInfo, opportunity_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<DeleteResponse>, Error> {
    let opportunity_id = opportunity_id.into_inner().0;
    let result = query("DELETE FROM volunteer_opportunities WHERE id = $1 AND ngo_id = $2")
        .bind(opportunity_id)
        .bind(user.id)
        .execute(&mut db.acquire().await?)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::BusinessError("opportunity not found among your postings".into()));
    }
    Ok(Json(DeleteResponse {
        deleted: result.rows_affected(),
    }))
}
