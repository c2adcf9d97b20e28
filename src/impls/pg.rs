use std::collections::HashMap;

use sqlx::{query_as, query_scalar, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::core::admin::AdminStore;
use crate::core::discovery::{BrowseFilter, DiscoveryStore};
use crate::core::review::ReviewStore;
use crate::error::Error;
use crate::models::application::{ApplicationInsert, ApplicationStatus, InboxApplication, VolunteerApplication};
use crate::models::ngo::PendingNgo;
use crate::models::opportunity::{NearbyOpportunity, VolunteerOpportunity};
use crate::response::RpcOutcome;

/// Store backing all core services, one pooled connection per call. The
/// backend owns every business rule; these methods only issue the calls and
/// map rows.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DiscoveryStore for PgStore {
    async fn approved_ngo_ids(&self) -> Result<Vec<Uuid>, Error> {
        let ids = query_scalar("SELECT user_id FROM ngo_applications WHERE verification_status = 'approved'")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn active_for_ngos(&self, ngo_ids: &[Uuid], filter: &BrowseFilter) -> Result<Vec<VolunteerOpportunity>, Error> {
        let mut query = QueryBuilder::new(
            "SELECT o.*, p.full_name AS organization_name
            FROM volunteer_opportunities AS o
            JOIN user_profiles AS p ON o.ngo_id = p.id
            WHERE o.status = 'active' AND o.ngo_id = ANY(",
        );
        query.push_bind(ngo_ids.to_vec());
        query.push(")");
        if let Some(category) = &filter.category {
            query.push(" AND o.category = ");
            query.push_bind(category);
        }
        if let Some(city) = &filter.city {
            query.push(" AND o.city = ");
            query.push_bind(city);
        }
        if let Some(state) = &filter.state {
            query.push(" AND o.state = ");
            query.push_bind(state);
        }
        query.push(" ORDER BY o.created_at DESC");
        let rows = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<NearbyOpportunity>, Error> {
        // radius filter, distance ordering and truncation all live in the
        // procedure; the result is trusted as returned
        let rows = query_as("SELECT * FROM find_nearby_opportunities($1, $2, $3, $4, $5)")
            .bind(latitude)
            .bind(longitude)
            .bind(radius_km)
            .bind(category)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_application(&self, volunteer_id: Uuid, input: &ApplicationInsert) -> Result<VolunteerApplication, Error> {
        let row = query_as(
            "INSERT INTO volunteer_applications (opportunity_id, volunteer_id, cover_letter, availability, experience, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING *",
        )
        .bind(input.opportunity_id)
        .bind(volunteer_id)
        .bind(&input.cover_letter)
        .bind(&input.availability)
        .bind(&input.experience)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn application_statuses(&self, volunteer_id: Uuid) -> Result<HashMap<Uuid, ApplicationStatus>, Error> {
        let rows: Vec<(Uuid, ApplicationStatus)> =
            query_as("SELECT opportunity_id, status FROM volunteer_applications WHERE volunteer_id = $1")
                .bind(volunteer_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }
}

impl ReviewStore for PgStore {
    async fn applications_for_ngo(&self, ngo_id: Uuid) -> Result<Vec<InboxApplication>, Error> {
        let rows = query_as(
            "SELECT a.*,
                o.title AS opportunity_title,
                p.full_name AS volunteer_name,
                p.phone AS volunteer_phone,
                p.bio AS volunteer_bio,
                p.skills AS volunteer_skills
            FROM volunteer_applications AS a
            JOIN volunteer_opportunities AS o ON a.opportunity_id = o.id
            JOIN user_profiles AS p ON a.volunteer_id = p.id
            WHERE o.ngo_id = $1
            ORDER BY a.applied_at DESC",
        )
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_status_if_pending(
        &self,
        application_id: Uuid,
        ngo_id: Uuid,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Option<InboxApplication>, Error> {
        let row = query_as(
            "UPDATE volunteer_applications AS a
            SET status = $3, ngo_notes = $4, reviewed_at = now()
            FROM volunteer_opportunities AS o
            WHERE a.id = $1 AND a.opportunity_id = o.id AND o.ngo_id = $2 AND a.status = 'pending'
            RETURNING a.*,
                o.title AS opportunity_title,
                (SELECT full_name FROM user_profiles WHERE id = a.volunteer_id) AS volunteer_name,
                (SELECT phone FROM user_profiles WHERE id = a.volunteer_id) AS volunteer_phone,
                (SELECT bio FROM user_profiles WHERE id = a.volunteer_id) AS volunteer_bio,
                (SELECT skills FROM user_profiles WHERE id = a.volunteer_id) AS volunteer_skills",
        )
        .bind(application_id)
        .bind(ngo_id)
        .bind(status)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

impl AdminStore for PgStore {
    async fn total_users(&self) -> Result<i64, Error> {
        Ok(query_scalar("SELECT COUNT(*) FROM user_profiles").fetch_one(&self.pool).await?)
    }

    async fn total_volunteers(&self) -> Result<i64, Error> {
        Ok(query_scalar("SELECT COUNT(*) FROM user_profiles WHERE user_type = 'volunteer'")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn total_ngos(&self) -> Result<i64, Error> {
        Ok(query_scalar("SELECT COUNT(*) FROM ngo_applications").fetch_one(&self.pool).await?)
    }

    async fn total_opportunities(&self) -> Result<i64, Error> {
        Ok(query_scalar("SELECT COUNT(*) FROM volunteer_opportunities")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn total_applications(&self) -> Result<i64, Error> {
        Ok(query_scalar("SELECT COUNT(*) FROM volunteer_applications")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn pending_ngo_count(&self) -> Result<i64, Error> {
        Ok(
            query_scalar("SELECT COUNT(*) FROM ngo_applications WHERE verification_status = 'pending'")
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn unread_message_count(&self) -> Result<i64, Error> {
        Ok(query_scalar("SELECT COUNT(*) FROM contact_messages WHERE status = 'unread'")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn pending_ngos(&self) -> Result<Vec<PendingNgo>, Error> {
        let rows = query_as(
            "SELECT n.id, n.user_id, p.full_name, n.organization_name, n.email, n.phone,
                n.city, n.state, n.description, n.focus_areas, n.established_year, n.team_size, n.created_at
            FROM ngo_applications AS n
            JOIN user_profiles AS p ON n.user_id = p.id
            WHERE n.verification_status = 'pending'
            ORDER BY n.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn approve_ngo(&self, ngo_id: Uuid, admin_id: Uuid, notes: Option<&str>) -> Result<RpcOutcome, Error> {
        let value: serde_json::Value = query_scalar("SELECT approve_ngo($1, $2, $3)")
            .bind(ngo_id)
            .bind(admin_id)
            .bind(notes)
            .fetch_one(&self.pool)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn reject_ngo(&self, ngo_id: Uuid, admin_id: Uuid, notes: Option<&str>) -> Result<RpcOutcome, Error> {
        let value: serde_json::Value = query_scalar("SELECT reject_ngo($1, $2, $3)")
            .bind(ngo_id)
            .bind(admin_id)
            .bind(notes)
            .fetch_one(&self.pool)
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
