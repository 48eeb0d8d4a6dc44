//! Contacts resource handlers.

use crate::envelope::{Envelope, LeadResource};
use crate::error::{Action, ApiError, ApiResult};
use crate::form::LeadForm;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use leadline_core::{LEADS_PER_PAGE, PageRequest};
use leadline_metadata::LeadRow;
use serde::Deserialize;

pub const CREATED_MESSAGE: &str = "Thank you for contacting us! We will get back to you soon.";
pub const UPDATED_MESSAGE: &str = "Contact updated successfully";
pub const DELETED_MESSAGE: &str = "Contact deleted successfully";

/// Query string of the listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
}

/// Query string accepted by the method-override route.
#[derive(Debug, Default, Deserialize)]
pub struct OverrideQuery {
    #[serde(rename = "_method")]
    pub method: Option<String>,
}

/// Ids are numeric; anything else cannot name a contact.
fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}

fn resource(state: &AppState, row: LeadRow) -> LeadResource {
    LeadResource::new(row, |key| state.leads.file_url(key))
}

/// GET /api/contacts?page=N - List contacts, newest first.
pub async fn list_contacts(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<Vec<LeadResource>>>> {
    let raw_page = query.ok().and_then(|Query(q)| q.page);
    let page = PageRequest::parse(raw_page.as_deref(), LEADS_PER_PAGE);

    let result = state
        .leads
        .list(page)
        .await
        .map_err(|e| ApiError::from_lead(Action::List, e))?;

    let leads = result
        .leads
        .into_iter()
        .map(|row| resource(&state, row))
        .collect();
    Ok(Json(Envelope::ok(leads).with_meta(result.meta)))
}

/// POST /api/contacts - Submit a new contact lead.
pub async fn create_contact(
    State(state): State<AppState>,
    form: LeadForm,
) -> ApiResult<(StatusCode, Json<Envelope<LeadResource>>)> {
    let row = state
        .leads
        .create(form.fields, form.file)
        .await
        .map_err(|e| ApiError::from_lead(Action::Create, e))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(resource(&state, row)).with_message(CREATED_MESSAGE)),
    ))
}

/// GET /api/contacts/{id} - Show one contact.
pub async fn show_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<LeadResource>>> {
    let id = parse_id(&id)?;
    let row = state
        .leads
        .get(id)
        .await
        .map_err(|e| ApiError::from_lead(Action::Show, e))?;

    Ok(Json(Envelope::ok(resource(&state, row))))
}

/// PUT|PATCH /api/contacts/{id} - Partially update a contact.
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: LeadForm,
) -> ApiResult<Json<Envelope<LeadResource>>> {
    let id = parse_id(&id)?;
    let row = state
        .leads
        .update(id, form.fields, form.file)
        .await
        .map_err(|e| ApiError::from_lead(Action::Update, e))?;

    Ok(Json(
        Envelope::ok(resource(&state, row)).with_message(UPDATED_MESSAGE),
    ))
}

/// POST /api/contacts/{id} - Update through a `_method=PUT|PATCH` override.
///
/// Browsers cannot send files with PUT, so the dashboard posts the form and
/// names the intended method in the query string or a `_method` field.
pub async fn update_contact_override(
    state: State<AppState>,
    id: Path<String>,
    query: Result<Query<OverrideQuery>, QueryRejection>,
    form: LeadForm,
) -> ApiResult<Json<Envelope<LeadResource>>> {
    let method = form
        .method
        .clone()
        .or_else(|| query.ok().and_then(|Query(q)| q.method));

    match method.as_deref().map(str::to_ascii_uppercase).as_deref() {
        Some("PUT" | "PATCH") => update_contact(state, id, form).await,
        Some(other) => Err(ApiError::MethodNotAllowed(other.to_string())),
        None => Err(ApiError::MethodNotAllowed("POST".to_string())),
    }
}

/// DELETE /api/contacts/{id} - Delete a contact and its attachment.
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<()>>> {
    let id = parse_id(&id)?;
    state
        .leads
        .delete(id)
        .await
        .map_err(|e| ApiError::from_lead(Action::Delete, e))?;

    Ok(Json(Envelope::confirmation(DELETED_MESSAGE)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_ids_are_not_found() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::NotFound)));
        assert!(matches!(parse_id("1.5"), Err(ApiError::NotFound)));
        assert!(matches!(parse_id(""), Err(ApiError::NotFound)));
    }
}
