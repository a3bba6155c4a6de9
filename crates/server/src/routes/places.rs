use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use service::domain::{Identity, Place, PlaceChanges, PlaceDraft};

use super::auth::ServerState;
use super::form::read_form;
use crate::errors::JsonApiError;

#[derive(Serialize)]
pub struct PlaceOutput { pub place: Place }

#[derive(Serialize)]
pub struct PlacesOutput { pub places: Vec<Place> }

#[derive(Serialize)]
pub struct MessageOutput { pub message: &'static str }

#[utoipa::path(get, path = "/api/places/{pid}", tag = "places", params(("pid" = Uuid, Path, description = "Place id")), responses((status = 200, description = "Place"), (status = 404, description = "Not found")))]
pub async fn get_place(State(state): State<ServerState>, Path(pid): Path<Uuid>) -> Result<Json<PlaceOutput>, JsonApiError> {
    let place = state.places.get_place(pid).await?;
    Ok(Json(PlaceOutput { place }))
}

#[utoipa::path(get, path = "/api/places/user/{uid}", tag = "places", params(("uid" = Uuid, Path, description = "User id")), responses((status = 200, description = "Places of the user, possibly empty"), (status = 404, description = "Unknown user")))]
pub async fn places_by_user(State(state): State<ServerState>, Path(uid): Path<Uuid>) -> Result<Json<PlacesOutput>, JsonApiError> {
    let places = state.places.places_by_user(uid).await?;
    Ok(Json(PlacesOutput { places }))
}

#[utoipa::path(post, path = "/api/places", tag = "places", request_body(content = crate::openapi::CreatePlaceForm, content_type = "multipart/form-data"), responses((status = 201, description = "Created"), (status = 401, description = "Unauthenticated"), (status = 422, description = "Validation or lookup failed")), security(("bearer" = [])))]
pub async fn create_place(
    State(state): State<ServerState>,
    Extension(who): Extension<Identity>,
    mp: Multipart,
) -> Result<(StatusCode, Json<PlaceOutput>), JsonApiError> {
    let form = read_form(mp).await?;
    let draft = PlaceDraft { title: form.text("title"), description: form.text("description"), address: form.text("address") };
    let place = state.places.create_place(&who, draft, form.image).await?;
    Ok((StatusCode::CREATED, Json(PlaceOutput { place })))
}

#[utoipa::path(patch, path = "/api/places/{pid}", tag = "places", params(("pid" = Uuid, Path, description = "Place id")), request_body = crate::openapi::UpdatePlaceRequest, responses((status = 200, description = "Updated"), (status = 403, description = "Not the creator"), (status = 404, description = "Not found")), security(("bearer" = [])))]
pub async fn update_place(
    State(state): State<ServerState>,
    Extension(who): Extension<Identity>,
    Path(pid): Path<Uuid>,
    Json(changes): Json<PlaceChanges>,
) -> Result<Json<PlaceOutput>, JsonApiError> {
    let place = state.places.update_place(&who, pid, changes).await?;
    Ok(Json(PlaceOutput { place }))
}

#[utoipa::path(delete, path = "/api/places/{pid}", tag = "places", params(("pid" = Uuid, Path, description = "Place id")), responses((status = 200, description = "Deleted"), (status = 403, description = "Not the creator"), (status = 404, description = "Not found")), security(("bearer" = [])))]
pub async fn delete_place(
    State(state): State<ServerState>,
    Extension(who): Extension<Identity>,
    Path(pid): Path<Uuid>,
) -> Result<Json<MessageOutput>, JsonApiError> {
    state.places.delete_place(&who, pid).await?;
    Ok(Json(MessageOutput { message: "Deleted place." }))
}
