use std::future::Future;

use log::warn;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Error;
use crate::models::ngo::PendingNgo;
use crate::models::stats::PlatformStats;
use crate::response::RpcOutcome;

pub trait AdminStore {
    async fn total_users(&self) -> Result<i64, Error>;
    async fn total_volunteers(&self) -> Result<i64, Error>;
    async fn total_ngos(&self) -> Result<i64, Error>;
    async fn total_opportunities(&self) -> Result<i64, Error>;
    async fn total_applications(&self) -> Result<i64, Error>;
    async fn pending_ngo_count(&self) -> Result<i64, Error>;
    async fn unread_message_count(&self) -> Result<i64, Error>;
    async fn pending_ngos(&self) -> Result<Vec<PendingNgo>, Error>;
    async fn approve_ngo(&self, ngo_id: Uuid, admin_id: Uuid, notes: Option<&str>) -> Result<RpcOutcome, Error>;
    async fn reject_ngo(&self, ngo_id: Uuid, admin_id: Uuid, notes: Option<&str>) -> Result<RpcOutcome, Error>;
}

#[derive(Debug, Serialize)]
pub struct Overview {
    pub stats: PlatformStats,
    pub pending_ngos: Vec<PendingNgo>,
}

async fn or_zero(widget: &str, fut: impl Future<Output = Result<i64, Error>>) -> i64 {
    match fut.await {
        Ok(n) => n,
        Err(e) => {
            warn!("failed to load {} count, rendering zero: {}", widget, e);
            0
        }
    }
}

/// The console's aggregates are fetched together; each one is wrapped so a
/// single failure degrades that widget to zero instead of failing the page.
pub async fn load_stats<S: AdminStore>(store: &S) -> PlatformStats {
    let (total_users, total_volunteers, total_ngos, total_opportunities, total_applications, pending_ngos, unread_messages) = futures::join!(
        or_zero("user", store.total_users()),
        or_zero("volunteer", store.total_volunteers()),
        or_zero("ngo", store.total_ngos()),
        or_zero("opportunity", store.total_opportunities()),
        or_zero("application", store.total_applications()),
        or_zero("pending ngo", store.pending_ngo_count()),
        or_zero("unread message", store.unread_message_count()),
    );
    PlatformStats {
        total_users,
        total_volunteers,
        total_ngos,
        total_opportunities,
        total_applications,
        pending_ngos,
        unread_messages,
    }
}

pub async fn load_overview<S: AdminStore>(store: &S) -> Overview {
    let (stats, pending) = futures::join!(load_stats(store), store.pending_ngos());
    let pending_ngos = pending.unwrap_or_else(|e| {
        warn!("failed to load pending NGO list, rendering empty: {}", e);
        Vec::new()
    });
    Overview { stats, pending_ngos }
}

/// Approve or reject a pending NGO through the backend procedures. A
/// transport-level success still carries a logical flag that must be checked.
pub async fn decide_ngo<S: AdminStore>(
    store: &S,
    ngo_id: Uuid,
    admin_id: Uuid,
    approve: bool,
    notes: Option<&str>,
) -> Result<(), Error> {
    let outcome = if approve {
        store.approve_ngo(ngo_id, admin_id, notes).await?
    } else {
        store.reject_ngo(ngo_id, admin_id, notes).await?
    };
    outcome.ensure()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemStore {
        users: i64,
        volunteers: i64,
        ngos: i64,
        opportunities: i64,
        applications: i64,
        pending: i64,
        unread: i64,
        unread_fails: bool,
        approve_error: Option<String>,
        decided: Mutex<Vec<(Uuid, bool, Option<String>)>>,
    }

    impl AdminStore for MemStore {
        async fn total_users(&self) -> Result<i64, Error> {
            Ok(self.users)
        }
        async fn total_volunteers(&self) -> Result<i64, Error> {
            Ok(self.volunteers)
        }
        async fn total_ngos(&self) -> Result<i64, Error> {
            Ok(self.ngos)
        }
        async fn total_opportunities(&self) -> Result<i64, Error> {
            Ok(self.opportunities)
        }
        async fn total_applications(&self) -> Result<i64, Error> {
            Ok(self.applications)
        }
        async fn pending_ngo_count(&self) -> Result<i64, Error> {
            Ok(self.pending)
        }
        async fn unread_message_count(&self) -> Result<i64, Error> {
            if self.unread_fails {
                return Err(Error::ServerError("contact message count unavailable".into()));
            }
            Ok(self.unread)
        }
        async fn pending_ngos(&self) -> Result<Vec<PendingNgo>, Error> {
            Ok(Vec::new())
        }
        async fn approve_ngo(&self, ngo_id: Uuid, _admin_id: Uuid, notes: Option<&str>) -> Result<RpcOutcome, Error> {
            self.decided.lock().unwrap().push((ngo_id, true, notes.map(str::to_owned)));
            Ok(outcome(self.approve_error.clone()))
        }
        async fn reject_ngo(&self, ngo_id: Uuid, _admin_id: Uuid, notes: Option<&str>) -> Result<RpcOutcome, Error> {
            self.decided.lock().unwrap().push((ngo_id, false, notes.map(str::to_owned)));
            Ok(outcome(self.approve_error.clone()))
        }
    }

    fn outcome(error: Option<String>) -> RpcOutcome {
        let value = match &error {
            Some(e) => serde_json::json!({"success": false, "error": e}),
            None => serde_json::json!({"success": true}),
        };
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_failed_aggregate_degrades_to_zero_without_blocking_siblings() {
        let store = MemStore {
            users: 12,
            volunteers: 9,
            ngos: 3,
            opportunities: 7,
            applications: 21,
            pending: 2,
            unread_fails: true,
            ..MemStore::default()
        };
        let stats = load_stats(&store).await;
        assert_eq!(stats.unread_messages, 0);
        assert_eq!(stats.total_users, 12);
        assert_eq!(stats.total_volunteers, 9);
        assert_eq!(stats.total_ngos, 3);
        assert_eq!(stats.total_opportunities, 7);
        assert_eq!(stats.total_applications, 21);
        assert_eq!(stats.pending_ngos, 2);
    }

    #[tokio::test]
    async fn test_decide_ngo_checks_logical_success() {
        let store = MemStore {
            approve_error: Some("NGO not found".into()),
            ..MemStore::default()
        };
        let err = decide_ngo(&store, Uuid::new_v4(), Uuid::new_v4(), true, None).await.unwrap_err();
        match err {
            Error::RpcFailure(msg) => assert_eq!(msg, "NGO not found"),
            other => panic!("expected RpcFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decide_ngo_routes_to_the_right_procedure() {
        let store = MemStore::default();
        let ngo = Uuid::new_v4();
        decide_ngo(&store, ngo, Uuid::new_v4(), false, Some("incomplete papers")).await.unwrap();
        let decided = store.decided.lock().unwrap();
        assert_eq!(decided.len(), 1);
        assert_eq!(decided[0].0, ngo);
        assert!(!decided[0].1);
        assert_eq!(decided[0].2.as_deref(), Some("incomplete papers"));
    }
}
