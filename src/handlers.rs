use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    error::AppResult,
    model::{ContactRecord, CreateContactRequest, HealthStatus, UpdateContactRequest},
    state::AppState,
};

pub async fn healthcheck(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        contacts: state.contacts.cache().len().await,
    })
}

pub async fn list_contacts(State(state): State<AppState>) -> Json<Vec<ContactRecord>> {
    let mirror = state.contacts.list_all().await;
    Json(mirror.as_ref().clone())
}

pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ContactRecord>> {
    let contact = state.contacts.get_by_id(&id).await?;
    Ok(Json(contact))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> AppResult<&'static str> {
    state.contacts.create(payload).await
}

pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateContactRequest>,
) -> AppResult<&'static str> {
    state.contacts.update(&id, payload).await
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<&'static str> {
    state.contacts.remove(&id).await
}
