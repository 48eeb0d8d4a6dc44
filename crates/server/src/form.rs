//! Lead form extraction from multipart, JSON or urlencoded bodies.

use crate::error::ApiError;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{StatusCode, header};
use axum::{Form, Json};
use leadline_core::LeadFields;
use leadline_storage::Upload;
use serde::Deserialize;

/// Form field carrying an HTTP method override.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// A submitted lead form.
#[derive(Debug, Default)]
pub struct LeadForm {
    pub fields: LeadFields,
    pub file: Option<Upload>,
    /// `_method` value, when the body carried one.
    pub method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FlatBody {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    business_name: Option<String>,
    message: Option<String>,
    #[serde(rename = "_method")]
    method: Option<String>,
}

impl From<FlatBody> for LeadForm {
    fn from(body: FlatBody) -> Self {
        Self {
            fields: LeadFields {
                name: body.name,
                email: body.email,
                phone: body.phone,
                business_name: body.business_name,
                message: body.message,
            },
            file: None,
            method: body.method,
        }
    }
}

impl<S> FromRequest<S> for LeadForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        let Some(content_type) = content_type else {
            return Ok(LeadForm::default());
        };

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(body) = Json::<FlatBody>::from_request(req, state)
                .await
                .map_err(|e| match e.status() {
                    StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
                    _ => ApiError::BadRequest(e.body_text()),
                })?;
            Ok(body.into())
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(body) = Form::<FlatBody>::from_request(req, state)
                .await
                .map_err(|e| match e.status() {
                    StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
                    _ => ApiError::BadRequest(e.body_text()),
                })?;
            Ok(body.into())
        } else {
            Err(ApiError::UnsupportedMediaType(content_type))
        }
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<LeadForm, ApiError> {
    let mut form = LeadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            // An untouched file input arrives as an empty, unnamed part.
            if data.is_empty() && filename.as_deref().is_none_or(str::is_empty) {
                continue;
            }
            form.file = Some(Upload {
                filename,
                content_type,
                data,
            });
            continue;
        }

        let slot = match name.as_str() {
            "name" => &mut form.fields.name,
            "email" => &mut form.fields.email,
            "phone" => &mut form.fields.phone,
            "business_name" => &mut form.fields.business_name,
            "message" => &mut form.fields.message,
            METHOD_OVERRIDE_FIELD => &mut form.method,
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }

    Ok(form)
}
