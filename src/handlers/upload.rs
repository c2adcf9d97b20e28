use actix_multipart::Multipart;
use actix_web::web::{Data, Json};
use bytes::Bytes;
use futures_util::TryStreamExt;
use sqlx::{query, PgPool};

use crate::context::UserInfo;
use crate::error::Error;

pub trait FileStorer {
    fn write(&self, bytes: Bytes, extension: &str) -> Result<String, Error>;
    fn read(&self, name: &str) -> Result<Bytes, Error>;
}

/// Multipart avatar upload: each file is written to blob storage and its
/// public path recorded on the caller's profile. Stored files are served
/// under /uploads by the static file service.
pub async fn create<S: FileStorer>(user: UserInfo, mut payload: Multipart, storer: Data<S>, db: Data<PgPool>) -> Result<Json<Vec<String>>, Error> {
    let mut paths = Vec::new();
    while let Some(mut field) = payload.try_next().await? {
        let extension = field
            .content_disposition()
            .get_filename()
            .and_then(|f| f.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            content.extend_from_slice(&chunk);
        }
        let name = storer.write(Bytes::from(content), &extension)?;
        let path = format!("/uploads/{}", name);
        query("UPDATE user_profiles SET avatar_url = $2, updated_at = now() WHERE id = $1")
            .bind(user.id)
            .bind(&path)
            .execute(&mut db.acquire().await?)
            .await?;
        paths.push(path);
    }
    Ok(Json(paths))
}
