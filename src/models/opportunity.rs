use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "opportunity_status", rename_all = "lowercase")]
pub enum OpportunityStatus {
    Active,
    Closed,
    Draft,
}

/// Row shape of `volunteer_opportunities`. `organization_name` is flattened
/// from the owning profile when the query joins it; `volunteers_applied` is a
/// backend-derived counter this service never recomputes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VolunteerOpportunity {
    pub id: Uuid,
    pub ngo_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub category: String,
    pub skills_required: Option<Vec<String>>,
    pub location_address: String,
    pub city: String,
    pub state: String,
    pub pincode: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub duration: Option<String>,
    pub time_commitment: Option<String>,
    pub volunteers_needed: i32,
    pub max_volunteers: Option<i32>,
    pub volunteers_applied: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub application_deadline: Option<NaiveDate>,
    pub is_virtual: Option<bool>,
    pub status: OpportunityStatus,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub organization_name: Option<String>,
}

/// Shape returned by the `find_nearby_opportunities` procedure. Ordering
/// (ascending distance) and truncation are the procedure's, trusted as-is.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NearbyOpportunity {
    pub id: Uuid,
    pub ngo_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location_address: String,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub duration: Option<String>,
    pub time_commitment: Option<String>,
    pub volunteers_needed: i32,
    pub max_volunteers: Option<i32>,
    pub volunteers_applied: i32,
    pub start_date: Option<NaiveDate>,
    pub application_deadline: Option<NaiveDate>,
    pub organization_name: String,
    pub distance_km: f64,
}

impl From<VolunteerOpportunity> for NearbyOpportunity {
    /// Browse results reuse the nearby shape with a zero distance so the
    /// discovery view renders one list regardless of how it was fetched.
    fn from(o: VolunteerOpportunity) -> Self {
        NearbyOpportunity {
            id: o.id,
            ngo_id: o.ngo_id,
            title: o.title,
            description: o.description,
            category: o.category,
            location_address: o.location_address,
            city: o.city,
            state: o.state,
            latitude: o.latitude,
            longitude: o.longitude,
            duration: o.duration,
            time_commitment: o.time_commitment,
            volunteers_needed: o.volunteers_needed,
            max_volunteers: o.max_volunteers,
            volunteers_applied: o.volunteers_applied,
            start_date: o.start_date,
            application_deadline: o.application_deadline,
            organization_name: o.organization_name.unwrap_or_default(),
            distance_km: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpportunityInsert {
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub category: String,
    pub skills_required: Option<Vec<String>>,
    pub location_address: String,
    pub city: String,
    pub state: String,
    pub pincode: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub duration: Option<String>,
    pub time_commitment: Option<String>,
    pub volunteers_needed: i32,
    pub max_volunteers: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub application_deadline: Option<NaiveDate>,
    pub is_virtual: Option<bool>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Partial update by the owning NGO; absent fields keep their stored value.
#[derive(Debug, Clone, Deserialize)]
pub struct OpportunityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub category: Option<String>,
    pub skills_required: Option<Vec<String>>,
    pub location_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub duration: Option<String>,
    pub time_commitment: Option<String>,
    pub volunteers_needed: Option<i32>,
    pub max_volunteers: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub application_deadline: Option<NaiveDate>,
    pub status: Option<OpportunityStatus>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub tags: Option<Vec<String>>,
}
