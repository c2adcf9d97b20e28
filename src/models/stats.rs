use serde::{Deserialize, Serialize};

use crate::models::ngo::VerificationStatus;

/// Per-user stats document returned by the `get_user_stats` procedure. The
/// backend fills the volunteer- or NGO-shaped subset depending on the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_applications: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_applications: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_applications: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunities_posted: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_opportunities: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_applications_received: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
}

/// Cross-entity counts for the admin console. Any count whose fetch failed is
/// rendered as zero rather than blocking the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_volunteers: i64,
    pub total_ngos: i64,
    pub total_opportunities: i64,
    pub total_applications: i64,
    pub pending_ngos: i64,
    pub unread_messages: i64,
}
