use actix_web::{
    http::StatusCode,
    web::{Data, Json},
    HttpResponse,
};
use sqlx::{query_as, PgPool};

use crate::context::UserInfo;
use crate::error::Error;
use crate::models::ngo::{NgoApplication, NgoApplicationInsert, NgoApplicationPatch};

/// Submit the caller's NGO application; one per profile, enforced remotely.
pub async fn submit(user: UserInfo, Json(data): Json<NgoApplicationInsert>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    let row = query_as::<_, NgoApplication>(
        "INSERT INTO ngo_applications (
            user_id, organization_name, registration_number, email, phone, website,
            address, city, state, pincode, latitude, longitude, description,
            focus_areas, established_year, team_size, verification_status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, 'pending')
        RETURNING *",
    )
    .bind(user.id)
    .bind(&data.organization_name)
    .bind(&data.registration_number)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.website)
    .bind(&data.address)
    .bind(&data.city)
    .bind(&data.state)
    .bind(&data.pincode)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(&data.description)
    .bind(&data.focus_areas)
    .bind(data.established_year)
    .bind(&data.team_size)
    .fetch_one(&mut db.acquire().await?)
    .await
    .map_err(|e| {
        let e = Error::from(e);
        if e.is_unique_violation() {
            Error::BusinessError("you have already submitted an NGO application".into())
        } else {
            e
        }
    })?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(row))
}

/// The caller's own application; absent is a normal state, not an error.
pub async fn mine(user: UserInfo, db: Data<PgPool>) -> Result<Json<Option<NgoApplication>>, Error> {
    let row = query_as::<_, NgoApplication>("SELECT * FROM ngo_applications WHERE user_id = $1")
        .bind(user.id)
        .fetch_optional(&mut db.acquire().await?)
        .await?;
    Ok(Json(row))
}

pub async fn update(user: UserInfo, Json(patch): Json<NgoApplicationPatch>, db: Data<PgPool>) -> Result<Json<NgoApplication>, Error> {
    let row = query_as::<_, NgoApplication>(
        "UPDATE ngo_applications SET
            organization_name = COALESCE($2, organization_name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            website = COALESCE($5, website),
            address = COALESCE($6, address),
            city = COALESCE($7, city),
            state = COALESCE($8, state),
            pincode = COALESCE($9, pincode),
            description = COALESCE($10, description),
            focus_areas = COALESCE($11, focus_areas),
            team_size = COALESCE($12, team_size),
            updated_at = now()
        WHERE user_id = $1
        RETURNING *",
    )
    .bind(user.id)
    .bind(&patch.organization_name)
    .bind(&patch.email)
    .bind(&patch.phone)
    .bind(&patch.website)
    .bind(&patch.address)
    .bind(&patch.city)
    .bind(&patch.state)
    .bind(&patch.pincode)
    .bind(&patch.description)
    .bind(&patch.focus_areas)
    .bind(&patch.team_size)
    .fetch_optional(&mut db.acquire().await?)
    .await?
    .ok_or_else(|| Error::BusinessError("no NGO application on file".into()))?;
    Ok(Json(row))
}
