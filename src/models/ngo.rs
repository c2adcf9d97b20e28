use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "ngo_verification_status", rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Row shape of `ngo_applications`, one-to-one with an NGO-typed profile.
/// `verification_status` transitions only through the admin procedures.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NgoApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_name: String,
    pub registration_number: String,
    pub email: String,
    pub phone: String,
    pub website: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
    pub focus_areas: Vec<String>,
    pub established_year: i32,
    pub team_size: String,
    pub verification_status: VerificationStatus,
    pub admin_notes: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgoApplicationInsert {
    pub organization_name: String,
    pub registration_number: String,
    pub email: String,
    pub phone: String,
    pub website: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
    pub focus_areas: Vec<String>,
    pub established_year: i32,
    pub team_size: String,
}

/// Partial update of one's own application; absent fields keep their value.
#[derive(Debug, Clone, Deserialize)]
pub struct NgoApplicationPatch {
    pub organization_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub description: Option<String>,
    pub focus_areas: Option<Vec<String>>,
    pub team_size: Option<String>,
}

/// Admin console's pending-NGO listing, joined with the owning profile.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PendingNgo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub organization_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub description: String,
    pub focus_areas: Vec<String>,
    pub established_year: i32,
    pub team_size: String,
    pub created_at: DateTime<Utc>,
}
