use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Row shape of `volunteer_applications`, the join entity between a volunteer
/// and an opportunity. At most one row per (volunteer, opportunity) pair,
/// enforced by the backend's unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VolunteerApplication {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub volunteer_id: Uuid,
    pub cover_letter: Option<String>,
    pub availability: Option<String>,
    pub experience: Option<String>,
    pub status: ApplicationStatus,
    pub ngo_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationInsert {
    pub opportunity_id: Uuid,
    pub cover_letter: Option<String>,
    pub availability: Option<String>,
    pub experience: Option<String>,
}

/// A volunteer's own application joined with the opportunity it targets.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MyApplication {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub status: ApplicationStatus,
    pub ngo_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub title: String,
    pub category: String,
    pub city: String,
    pub state: String,
    pub organization_name: String,
}

/// An inbound application as the owning NGO sees it, joined with the
/// opportunity title and the applying volunteer's profile summary.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InboxApplication {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub volunteer_id: Uuid,
    pub cover_letter: Option<String>,
    pub availability: Option<String>,
    pub experience: Option<String>,
    pub status: ApplicationStatus,
    pub ngo_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub opportunity_title: String,
    pub volunteer_name: String,
    pub volunteer_phone: Option<String>,
    pub volunteer_bio: Option<String>,
    pub volunteer_skills: Option<Vec<String>>,
}

/// Review verdicts an NGO can hand down. There is deliberately no pending
/// variant: a reviewed application cannot be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn as_status(self) -> ApplicationStatus {
        match self {
            ReviewDecision::Approved => ApplicationStatus::Approved,
            ReviewDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}
