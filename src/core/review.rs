use itertools::Itertools;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Error;
use crate::models::application::{ApplicationStatus, InboxApplication, ReviewDecision};

pub trait ReviewStore {
    async fn applications_for_ngo(&self, ngo_id: Uuid) -> Result<Vec<InboxApplication>, Error>;
    /// Flips status and stamps `reviewed_at`, but only while the row is still
    /// pending and its opportunity belongs to the given NGO. Returns None when
    /// no such row matched.
    async fn set_status_if_pending(
        &self,
        application_id: Uuid,
        ngo_id: Uuid,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Option<InboxApplication>, Error>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// Counts are re-derived from the already-fetched list; no count queries.
pub fn count_by_status(apps: &[InboxApplication]) -> StatusCounts {
    let by_status = apps.iter().counts_by(|a| a.status);
    StatusCounts {
        total: apps.len(),
        pending: by_status.get(&ApplicationStatus::Pending).copied().unwrap_or(0),
        approved: by_status.get(&ApplicationStatus::Approved).copied().unwrap_or(0),
        rejected: by_status.get(&ApplicationStatus::Rejected).copied().unwrap_or(0),
    }
}

pub fn filter_applications(apps: Vec<InboxApplication>, filter: StatusFilter) -> Vec<InboxApplication> {
    let wanted = match filter {
        StatusFilter::All => return apps,
        StatusFilter::Pending => ApplicationStatus::Pending,
        StatusFilter::Approved => ApplicationStatus::Approved,
        StatusFilter::Rejected => ApplicationStatus::Rejected,
    };
    apps.into_iter().filter(|a| a.status == wanted).collect()
}

/// One-way review: pending rows move to approved or rejected, nothing ever
/// moves back, and rows outside the caller's opportunities are untouchable.
pub async fn review<S: ReviewStore>(
    store: &S,
    ngo_id: Uuid,
    application_id: Uuid,
    decision: ReviewDecision,
    notes: Option<&str>,
) -> Result<InboxApplication, Error> {
    store
        .set_status_if_pending(application_id, ngo_id, decision.as_status(), notes)
        .await?
        .ok_or_else(|| {
            Error::BusinessError("application has already been reviewed or is not yours to review".into())
        })
}
