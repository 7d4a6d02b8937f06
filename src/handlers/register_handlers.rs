//! HTTP handlers for pet registrations.
//! Decodes multipart bodies into sections plus photo bytes and delegates
//! everything else to `RecordService`.

use crate::{
    errors::AppError,
    models::record::{Fields, Record},
    services::{
        merge_policy::{RecordPatch, UpdateMode},
        record_service::RecordService,
    },
};
use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::MultipartRejection,
    },
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const OWNER_INFO_FIELD: &str = "ownerInfo";
pub const PET_INFO_FIELD: &str = "petInfo";
pub const PET_PHOTO_FIELD: &str = "petPhoto";

/// Decoded `multipart/form-data` body shared by create and update.
///
/// `ownerInfo` and `petInfo` arrive as JSON text parts; `petPhoto` is a file
/// part. A part that is missing, blank, or an empty file counts as omitted.
#[derive(Debug, Default)]
pub struct RegisterForm {
    pub owner_info: Option<Fields>,
    pub pet_info: Option<Fields>,
    pub pet_photo: Option<Bytes>,
}

impl RegisterForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                OWNER_INFO_FIELD => form.owner_info = parse_section(&name, &field.text().await?)?,
                PET_INFO_FIELD => form.pet_info = parse_section(&name, &field.text().await?)?,
                PET_PHOTO_FIELD => {
                    let bytes = field.bytes().await?;
                    form.pet_photo = (!bytes.is_empty()).then_some(bytes);
                }
                other => debug!("ignoring multipart field `{}`", other),
            }
        }
        Ok(form)
    }

    fn into_patch(self) -> RecordPatch {
        RecordPatch {
            owner_info: self.owner_info,
            pet_info: self.pet_info,
            pet_photo: self.pet_photo.map(|bytes| bytes.to_vec()),
        }
    }
}

/// Parse a section part. Blank text means the section was not supplied.
fn parse_section(name: &str, raw: &str) -> Result<Option<Fields>, AppError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => Ok(Some(fields)),
        Ok(_) => Err(AppError::bad_request(format!(
            "`{}` must be a JSON object",
            name
        ))),
        Err(err) => Err(AppError::bad_request(format!(
            "`{}` is not valid JSON: {}",
            name, err
        ))),
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub register: Record,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET `/register` — every stored registration.
pub async fn list_registers(
    State(service): State<RecordService>,
) -> Result<Json<Vec<Record>>, AppError> {
    Ok(Json(service.list().await?))
}

/// GET `/register/{id}`
pub async fn get_register(
    State(service): State<RecordService>,
    Path(id): Path<String>,
) -> Result<Json<Record>, AppError> {
    Ok(Json(service.get(&id).await?))
}

/// POST `/register` — create from a multipart form.
pub async fn create_register(
    State(service): State<RecordService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let form = RegisterForm::from_multipart(multipart?).await?;
    let register = service
        .create(
            form.owner_info.unwrap_or_default(),
            form.pet_info.unwrap_or_default(),
            form.pet_photo.map(|bytes| bytes.to_vec()),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Register created successfully",
            register,
        }),
    ))
}

/// PATCH `/register/{id}` — merge supplied keys into the stored sections.
pub async fn patch_register(
    State(service): State<RecordService>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Record>, AppError> {
    update_register(service, id, UpdateMode::Merge, multipart).await
}

/// PUT `/register/{id}` — replace supplied sections wholesale.
pub async fn put_register(
    State(service): State<RecordService>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Record>, AppError> {
    update_register(service, id, UpdateMode::Replace, multipart).await
}

async fn update_register(
    service: RecordService,
    id: String,
    mode: UpdateMode,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Record>, AppError> {
    // An unknown id is a 404 whatever the body holds.
    let existing = service.get(&id).await?;
    let form = RegisterForm::from_multipart(multipart?).await?;
    Ok(Json(
        service
            .update_resolved(existing, mode, form.into_patch())
            .await?,
    ))
}

/// DELETE `/register/{id}`
pub async fn delete_register(
    State(service): State<RecordService>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    service.delete(&id).await?;
    Ok(Json(MessageResponse {
        message: "Register deleted",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_section_is_omitted() {
        assert!(parse_section("ownerInfo", "  ").unwrap().is_none());
    }

    #[test]
    fn empty_object_is_supplied_empty() {
        let parsed = parse_section("ownerInfo", "{}").unwrap();
        assert_eq!(parsed, Some(Fields::new()));
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = parse_section("petInfo", "[1, 2]").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "`petInfo` must be a JSON object");
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = parse_section("petInfo", "{petName:").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.starts_with("`petInfo` is not valid JSON"));
    }
}
