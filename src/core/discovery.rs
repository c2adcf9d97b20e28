use std::collections::HashMap;

use uuid::Uuid;

use crate::error::Error;
use crate::models::application::{ApplicationInsert, ApplicationStatus, VolunteerApplication};
use crate::models::opportunity::{NearbyOpportunity, VolunteerOpportunity};
use crate::models::profile::{UserProfile, UserType};

pub const DEFAULT_RADIUS_KM: f64 = 25.0;
pub const NEARBY_LIMIT: i64 = 20;

#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

pub trait DiscoveryStore {
    async fn approved_ngo_ids(&self) -> Result<Vec<Uuid>, Error>;
    async fn active_for_ngos(&self, ngo_ids: &[Uuid], filter: &BrowseFilter) -> Result<Vec<VolunteerOpportunity>, Error>;
    async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<NearbyOpportunity>, Error>;
    async fn insert_application(&self, volunteer_id: Uuid, input: &ApplicationInsert) -> Result<VolunteerApplication, Error>;
    async fn application_statuses(&self, volunteer_id: Uuid) -> Result<HashMap<Uuid, ApplicationStatus>, Error>;
}

/// Two-phase browse: resolve the approved NGO set first, then query active
/// opportunities scoped to it. An empty approved set short-circuits without
/// issuing the second query.
pub async fn browse<S: DiscoveryStore>(store: &S, filter: &BrowseFilter) -> Result<Vec<VolunteerOpportunity>, Error> {
    let approved = store.approved_ngo_ids().await?;
    if approved.is_empty() {
        return Ok(Vec::new());
    }
    store.active_for_ngos(&approved, filter).await
}

/// Discovery entry point: viewers with a stored coordinate get the
/// radius-bounded procedure result; everyone else gets the plain browse list
/// rendered with a zero distance.
pub async fn discover<S: DiscoveryStore>(
    store: &S,
    viewer: Option<&UserProfile>,
    radius_km: f64,
    category: Option<&str>,
) -> Result<Vec<NearbyOpportunity>, Error> {
    if let Some(profile) = viewer {
        if let (Some(lat), Some(lng)) = (profile.latitude, profile.longitude) {
            return store.nearby(lat, lng, radius_km, category, NEARBY_LIMIT).await;
        }
    }
    let filter = BrowseFilter {
        category: category.map(str::to_owned),
        ..BrowseFilter::default()
    };
    Ok(browse(store, &filter).await?.into_iter().map(NearbyOpportunity::from).collect())
}

/// Substring match over title/organization/description, applied only after
/// the server-filtered set; it never re-expands what the server excluded.
pub fn search_filter(items: Vec<NearbyOpportunity>, term: &str) -> Vec<NearbyOpportunity> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|o| {
            o.title.to_lowercase().contains(&term)
                || o.organization_name.to_lowercase().contains(&term)
                || o.description.to_lowercase().contains(&term)
        })
        .collect()
}

/// What the apply control on an opportunity card does for a given viewer
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyControl {
    /// No application yet: the control submits one.
    Apply,
    /// Pending or approved: the control opens a read-only details view.
    ShowDetails,
    /// Rejected: the control is disabled, re-application is not permitted.
    Locked,
}

pub fn apply_control(status: Option<ApplicationStatus>) -> ApplyControl {
    match status {
        None => ApplyControl::Apply,
        Some(ApplicationStatus::Pending) | Some(ApplicationStatus::Approved) => ApplyControl::ShowDetails,
        Some(ApplicationStatus::Rejected) => ApplyControl::Locked,
    }
}

#[derive(Debug)]
pub enum ApplyOutcome {
    Submitted(VolunteerApplication),
    /// Either the viewer already holds an application, or the backend refused
    /// the insert with a uniqueness conflict; both merge into the normal
    /// applied-state response instead of an error.
    AlreadyApplied { status: ApplicationStatus },
}

pub async fn apply<S: DiscoveryStore>(
    store: &S,
    viewer: &UserProfile,
    existing: Option<ApplicationStatus>,
    input: &ApplicationInsert,
) -> Result<ApplyOutcome, Error> {
    if viewer.user_type == UserType::Ngo {
        return Err(Error::BusinessError(
            "NGO accounts cannot apply to volunteer opportunities".into(),
        ));
    }
    match existing {
        Some(ApplicationStatus::Rejected) => {
            return Err(Error::BusinessError(
                "your previous application was rejected and cannot be reopened".into(),
            ))
        }
        Some(status) => return Ok(ApplyOutcome::AlreadyApplied { status }),
        None => {}
    }
    match store.insert_application(viewer.id, input).await {
        Ok(row) => Ok(ApplyOutcome::Submitted(row)),
        // The backend's own rejection is the source of truth for "already
        // applied"; we never predict it client-side.
        Err(e) if e.is_unique_violation() => Ok(ApplyOutcome::AlreadyApplied {
            status: ApplicationStatus::Pending,
        }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ngo::VerificationStatus;
    use chrono::Utc;
    use std::error::Error as StdError;
    use std::fmt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct UniqueViolation;

    impl fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "duplicate key value violates unique constraint")
        }
    }

    impl StdError for UniqueViolation {}

    impl sqlx::error::DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some("23505".into())
        }
        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }
        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }
        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }
    }

    fn conflict() -> Error {
        Error::DatabaseError(sqlx::Error::Database(Box::new(UniqueViolation)))
    }

    struct MemStore {
        ngos: Mutex<Vec<(Uuid, VerificationStatus)>>,
        opportunities: Mutex<Vec<VolunteerOpportunity>>,
        applications: Mutex<Vec<VolunteerApplication>>,
        second_phase_queries: AtomicUsize,
    }

    impl MemStore {
        fn new() -> Self {
            MemStore {
                ngos: Mutex::new(Vec::new()),
                opportunities: Mutex::new(Vec::new()),
                applications: Mutex::new(Vec::new()),
                second_phase_queries: AtomicUsize::new(0),
            }
        }

        fn add_ngo(&self, status: VerificationStatus) -> Uuid {
            let id = Uuid::new_v4();
            self.ngos.lock().unwrap().push((id, status));
            id
        }

        fn set_ngo_status(&self, id: Uuid, status: VerificationStatus) {
            for entry in self.ngos.lock().unwrap().iter_mut() {
                if entry.0 == id {
                    entry.1 = status;
                }
            }
        }

        fn add_opportunity(&self, ngo_id: Uuid, title: &str, category: &str, lat: f64, lng: f64) -> Uuid {
            let o = opportunity(ngo_id, title, category, lat, lng);
            let id = o.id;
            self.opportunities.lock().unwrap().push(o);
            id
        }
    }

    fn opportunity(ngo_id: Uuid, title: &str, category: &str, lat: f64, lng: f64) -> VolunteerOpportunity {
        let now = Utc::now();
        VolunteerOpportunity {
            id: Uuid::new_v4(),
            ngo_id,
            title: title.into(),
            description: format!("{} description", title),
            requirements: None,
            category: category.into(),
            skills_required: None,
            location_address: "123 Hill Road".into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            pincode: None,
            latitude: lat,
            longitude: lng,
            duration: None,
            time_commitment: None,
            volunteers_needed: 5,
            max_volunteers: Some(5),
            volunteers_applied: 0,
            start_date: None,
            end_date: None,
            application_deadline: None,
            is_virtual: None,
            status: crate::models::opportunity::OpportunityStatus::Active,
            contact_person: None,
            contact_phone: None,
            contact_email: None,
            tags: None,
            created_at: now,
            updated_at: now,
            organization_name: Some("Seva Trust".into()),
        }
    }

    fn volunteer() -> UserProfile {
        profile(UserType::Volunteer)
    }

    fn profile(user_type: UserType) -> UserProfile {
        let now = Utc::now();
        UserProfile {
            id: Uuid::new_v4(),
            full_name: "Asha Rao".into(),
            user_type,
            phone: None,
            bio: None,
            skills: None,
            interests: None,
            location_address: None,
            city: Some("Mumbai".into()),
            state: Some("Maharashtra".into()),
            pincode: None,
            latitude: Some(19.0760),
            longitude: Some(72.8777),
            avatar_url: None,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
        let (lat1, lng1, lat2, lng2) = (lat1.to_radians(), lng1.to_radians(), lat2.to_radians(), lng2.to_radians());
        let dlat = lat2 - lat1;
        let dlng = lng2 - lng1;
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        6371.0 * 2.0 * a.sqrt().asin()
    }

    impl DiscoveryStore for MemStore {
        async fn approved_ngo_ids(&self) -> Result<Vec<Uuid>, Error> {
            Ok(self
                .ngos
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, s)| *s == VerificationStatus::Approved)
                .map(|(id, _)| *id)
                .collect())
        }

        async fn active_for_ngos(&self, ngo_ids: &[Uuid], filter: &BrowseFilter) -> Result<Vec<VolunteerOpportunity>, Error> {
            self.second_phase_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .opportunities
                .lock()
                .unwrap()
                .iter()
                .filter(|o| ngo_ids.contains(&o.ngo_id))
                .filter(|o| filter.category.as_deref().map_or(true, |c| o.category == c))
                .cloned()
                .collect())
        }

        async fn nearby(
            &self,
            latitude: f64,
            longitude: f64,
            radius_km: f64,
            category: Option<&str>,
            limit: i64,
        ) -> Result<Vec<NearbyOpportunity>, Error> {
            // Emulates the remote procedure: approved NGOs only, radius
            // filter, ascending distance, truncation.
            let approved = self.approved_ngo_ids().await?;
            let mut rows: Vec<NearbyOpportunity> = self
                .opportunities
                .lock()
                .unwrap()
                .iter()
                .filter(|o| approved.contains(&o.ngo_id))
                .filter(|o| category.map_or(true, |c| o.category == c))
                .map(|o| {
                    let mut n = NearbyOpportunity::from(o.clone());
                    n.distance_km = haversine_km(latitude, longitude, o.latitude, o.longitude);
                    n
                })
                .filter(|n| n.distance_km <= radius_km)
                .collect();
            rows.sort_by(|a, b| a.distance_km.partial_cmp(&b.distance_km).unwrap());
            rows.truncate(limit as usize);
            Ok(rows)
        }

        async fn insert_application(&self, volunteer_id: Uuid, input: &ApplicationInsert) -> Result<VolunteerApplication, Error> {
            let mut apps = self.applications.lock().unwrap();
            if apps
                .iter()
                .any(|a| a.volunteer_id == volunteer_id && a.opportunity_id == input.opportunity_id)
            {
                return Err(conflict());
            }
            let row = VolunteerApplication {
                id: Uuid::new_v4(),
                opportunity_id: input.opportunity_id,
                volunteer_id,
                cover_letter: input.cover_letter.clone(),
                availability: input.availability.clone(),
                experience: input.experience.clone(),
                status: ApplicationStatus::Pending,
                ngo_notes: None,
                applied_at: Utc::now(),
                reviewed_at: None,
            };
            apps.push(row.clone());
            Ok(row)
        }

        async fn application_statuses(&self, volunteer_id: Uuid) -> Result<HashMap<Uuid, ApplicationStatus>, Error> {
            Ok(self
                .applications
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.volunteer_id == volunteer_id)
                .map(|a| (a.opportunity_id, a.status))
                .collect())
        }
    }

    fn insert_input(opportunity_id: Uuid) -> ApplicationInsert {
        ApplicationInsert {
            opportunity_id,
            cover_letter: None,
            availability: None,
            experience: None,
        }
    }

    #[tokio::test]
    async fn test_browse_excludes_unapproved_ngos() {
        let store = MemStore::new();
        let approved = store.add_ngo(VerificationStatus::Approved);
        let pending = store.add_ngo(VerificationStatus::Pending);
        store.add_opportunity(approved, "Teach weekend classes", "education", 19.0, 72.8);
        let hidden = store.add_opportunity(pending, "Beach cleanup", "environment", 19.0, 72.8);

        let result = browse(&store, &BrowseFilter::default()).await.unwrap();
        assert_eq!(result.len(), 1);
        assert!(result.iter().all(|o| o.ngo_id == approved));

        // admin approval flips visibility for the same query
        store.set_ngo_status(pending, VerificationStatus::Approved);
        let result = browse(&store, &BrowseFilter::default()).await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().any(|o| o.id == hidden));
    }

    #[tokio::test]
    async fn test_browse_short_circuits_without_approved_ngos() {
        let store = MemStore::new();
        let pending = store.add_ngo(VerificationStatus::Pending);
        store.add_opportunity(pending, "Beach cleanup", "environment", 19.0, 72.8);

        let result = browse(&store, &BrowseFilter::default()).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(store.second_phase_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_nearby_respects_radius_and_category() {
        let store = MemStore::new();
        let ngo = store.add_ngo(VerificationStatus::Approved);
        // Bandra, ~8 km from the probe point
        store.add_opportunity(ngo, "Library help", "education", 19.0596, 72.8295);
        // Pune, ~120 km away
        store.add_opportunity(ngo, "Tree planting", "education", 18.5204, 73.8567);
        // close by but wrong category
        store.add_opportunity(ngo, "Clinic assistance", "healthcare", 19.0700, 72.8700);

        let result = discover(&store, Some(&volunteer()), 10.0, Some("education")).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Library help");
        assert!(result.iter().all(|o| o.distance_km <= 10.0 && o.category == "education"));
    }

    #[tokio::test]
    async fn test_discover_without_location_falls_back_to_browse() {
        let store = MemStore::new();
        let ngo = store.add_ngo(VerificationStatus::Approved);
        store.add_opportunity(ngo, "Tree planting", "environment", 18.5204, 73.8567);

        let mut viewer = volunteer();
        viewer.latitude = None;
        viewer.longitude = None;

        let result = discover(&store, Some(&viewer), 10.0, None).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].distance_km, 0.0);
    }

    #[tokio::test]
    async fn test_apply_twice_keeps_one_row_and_reports_already_applied() {
        let store = MemStore::new();
        let ngo = store.add_ngo(VerificationStatus::Approved);
        let opp = store.add_opportunity(ngo, "Library help", "education", 19.0, 72.8);
        let viewer = volunteer();

        let first = apply(&store, &viewer, None, &insert_input(opp)).await.unwrap();
        assert!(matches!(first, ApplyOutcome::Submitted(_)));

        // second attempt races past the local status map straight into the
        // backend's unique constraint
        let second = apply(&store, &viewer, None, &insert_input(opp)).await.unwrap();
        assert!(matches!(
            second,
            ApplyOutcome::AlreadyApplied {
                status: ApplicationStatus::Pending
            }
        ));
        assert_eq!(store.applications.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_with_known_status_never_reinserts() {
        let store = MemStore::new();
        let ngo = store.add_ngo(VerificationStatus::Approved);
        let opp = store.add_opportunity(ngo, "Library help", "education", 19.0, 72.8);
        let viewer = volunteer();

        let outcome = apply(&store, &viewer, Some(ApplicationStatus::Approved), &insert_input(opp))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            ApplyOutcome::AlreadyApplied {
                status: ApplicationStatus::Approved
            }
        ));
        assert!(store.applications.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_application_cannot_be_reopened() {
        let store = MemStore::new();
        let ngo = store.add_ngo(VerificationStatus::Approved);
        let opp = store.add_opportunity(ngo, "Library help", "education", 19.0, 72.8);
        let viewer = volunteer();

        let err = apply(&store, &viewer, Some(ApplicationStatus::Rejected), &insert_input(opp))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BusinessError(_)));
        assert!(store.applications.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ngo_viewers_are_barred_from_applying() {
        let store = MemStore::new();
        let ngo = store.add_ngo(VerificationStatus::Approved);
        let opp = store.add_opportunity(ngo, "Library help", "education", 19.0, 72.8);

        let err = apply(&store, &profile(UserType::Ngo), None, &insert_input(opp)).await.unwrap_err();
        assert!(matches!(err, Error::BusinessError(_)));
    }

    #[tokio::test]
    async fn test_apply_updates_control_without_reload() {
        let store = MemStore::new();
        let ngo = store.add_ngo(VerificationStatus::Approved);
        // last remaining seat
        let opp = store.add_opportunity(ngo, "Library help", "education", 19.0, 72.8);
        let viewer = volunteer();

        let mut statuses = store.application_statuses(viewer.id).await.unwrap();
        assert_eq!(apply_control(statuses.get(&opp).copied()), ApplyControl::Apply);

        let outcome = apply(&store, &viewer, statuses.get(&opp).copied(), &insert_input(opp))
            .await
            .unwrap();
        if let ApplyOutcome::Submitted(row) = outcome {
            // the view patches its local map; no re-fetch happens
            statuses.insert(row.opportunity_id, row.status);
        } else {
            panic!("expected a fresh submission");
        }
        assert_eq!(apply_control(statuses.get(&opp).copied()), ApplyControl::ShowDetails);
    }

    #[test]
    fn test_apply_control_per_status() {
        assert_eq!(apply_control(None), ApplyControl::Apply);
        assert_eq!(apply_control(Some(ApplicationStatus::Pending)), ApplyControl::ShowDetails);
        assert_eq!(apply_control(Some(ApplicationStatus::Approved)), ApplyControl::ShowDetails);
        assert_eq!(apply_control(Some(ApplicationStatus::Rejected)), ApplyControl::Locked);
    }

    #[test]
    fn test_search_filter_narrows_without_expanding() {
        let ngo = Uuid::new_v4();
        let items: Vec<NearbyOpportunity> = vec![
            opportunity(ngo, "Teach weekend classes", "education", 19.0, 72.8),
            opportunity(ngo, "Beach cleanup", "environment", 19.0, 72.8),
        ]
        .into_iter()
        .map(NearbyOpportunity::from)
        .collect();

        assert_eq!(search_filter(items.clone(), "").len(), 2);
        assert_eq!(search_filter(items.clone(), "  ").len(), 2);

        let hits = search_filter(items.clone(), "BEACH");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Beach cleanup");

        // matches the joined organization name too
        assert_eq!(search_filter(items.clone(), "seva trust").len(), 2);
        assert!(search_filter(items, "knitting").is_empty());
    }
}
