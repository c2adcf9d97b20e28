use actix_web::{
    http::StatusCode,
    web::{Data, Json},
    HttpResponse,
};
use sqlx::{query_as, PgPool};

use crate::error::Error;
use crate::models::message::{ContactMessage, ContactMessageInsert};

/// Unauthenticated inbound inquiry; lands unread in the admin inbox.
pub async fn create(Json(data): Json<ContactMessageInsert>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    let row = query_as::<_, ContactMessage>(
        "INSERT INTO contact_messages (name, email, subject, message, status)
        VALUES ($1, $2, $3, $4, 'unread')
        RETURNING *",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.subject)
    .bind(&data.message)
    .fetch_one(&mut db.acquire().await?)
    .await?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(row))
}
