use std::sync::Mutex;

use actix_web::web::{Data, Json, Path};
use serde::Serialize;
use uuid::Uuid;

use crate::core::favorites::FavoriteSet;
use crate::error::Error;

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: Uuid,
    pub favorite: bool,
}

pub async fn list(favorites: Data<Mutex<FavoriteSet>>) -> Result<Json<Vec<Uuid>>, Error> {
    let favorites = favorites.lock().map_err(|_| Error::ServerError("favorites store poisoned".into()))?;
    Ok(Json(favorites.ids()))
}

pub async fn toggle(opportunity_id: Path<(Uuid,)>, favorites: Data<Mutex<FavoriteSet>>) -> Result<Json<ToggleResponse>, Error> {
    let id = opportunity_id.into_inner().0;
    let mut favorites = favorites.lock().map_err(|_| Error::ServerError("favorites store poisoned".into()))?;
    let favorite = favorites.toggle(id)?;
    Ok(Json(ToggleResponse { id, favorite }))
}
