use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::warn;
use uuid::Uuid;

use crate::error::Error;

/// Fixed file name, the counterpart of the original's fixed storage key.
pub const FAVORITES_FILE: &str = "favorite_opportunities.json";

/// Client-local favorites: a set of opportunity ids persisted as a JSON array
/// in the data directory. Independent of authentication and never synced to
/// the backend.
pub struct FavoriteSet {
    path: PathBuf,
    ids: HashSet<Uuid>,
}

impl FavoriteSet {
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(FAVORITES_FILE);
        let ids = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<Uuid>>(&bytes) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    warn!("ignoring unreadable favorites file: {}", e);
                    HashSet::new()
                }
            },
            Err(_) => HashSet::new(),
        };
        Self { path, ids }
    }

    /// Flips membership and rewrites the file; returns whether the id is a
    /// favorite afterwards.
    pub fn toggle(&mut self, id: Uuid) -> Result<bool, Error> {
        let now_favorite = if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        };
        self.save()?;
        Ok(now_favorite)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.ids.iter().copied().sorted().collect()
    }

    fn save(&self) -> Result<(), Error> {
        let list = self.ids();
        fs::write(&self.path, serde_json::to_vec(&list)?)?;
        Ok(())
    }
}
