// handlers/protected/cats.rs - Cat creation and caller-scoped mutations

use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::{AppState, JsonBody};
use crate::authz::cat_scope;
use crate::database::models::{CatOutput, NewCat, OwnerRef};
use crate::error::ApiError;
use crate::geo::{Coordinates, Point};
use crate::handlers::payloads::CatPatch;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::uploads::Upload;
use crate::validation::{parse_id, Validator};

const FILE_FIELD: &str = "cat";
const TEXT_FIELDS: [&str; 5] = ["cat_name", "weight", "birthdate", "lat", "lng"];

/// Parsed multipart body of POST /cats. Unknown parts, `owner` included, are dropped.
#[derive(Debug, Default)]
struct CatForm {
    fields: HashMap<String, String>,
    upload: Option<Upload>,
}

impl CatForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = CatForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == FILE_FIELD {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let original_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;

                if Upload::is_image(&content_type) && !bytes.is_empty() {
                    form.upload = Some(Upload {
                        original_name,
                        content_type,
                        bytes,
                    });
                } else {
                    tracing::debug!("Ignoring non-image upload of type {:?}", content_type);
                }
            } else if TEXT_FIELDS.contains(&name.as_str()) {
                let text = field.text().await?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Client-supplied position. Both halves or neither.
    fn location_hint(&self, v: &mut Validator) -> Option<Coordinates> {
        let lat = self.fields.get("lat");
        let lng = self.fields.get("lng");
        match (lat, lng) {
            (None, None) => None,
            (Some(lat), Some(lng)) => {
                let parsed = match (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) {
                    (Ok(lat), Ok(lng)) => Coordinates::new(lat, lng).map_err(|e| e.to_string()),
                    _ => Err("lat and lng must be numbers".to_string()),
                };
                match parsed {
                    Ok(coords) => Some(coords),
                    Err(problem) => {
                        v.reject("location", problem);
                        None
                    }
                }
            }
            _ => {
                v.reject("location", "lat and lng must be given together");
                None
            }
        }
    }
}

/// POST /cats - multipart form; the caller becomes the owner
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<CatOutput> {
    let form = CatForm::read(multipart).await?;

    let mut v = Validator::new();
    let cat_name = form.text("cat_name").trim().to_string();
    v.non_empty("cat_name", &cat_name);
    let weight = v.number("weight", &Value::String(form.text("weight").to_string()));
    let birthdate = v.date("birthdate", form.text("birthdate"));
    let hint = form.location_hint(&mut v);
    v.finish()?;

    let (weight, birthdate) = match (weight, birthdate) {
        (Some(weight), Some(birthdate)) => (weight, birthdate),
        _ => return Err(ApiError::bad_request("Invalid cat fields")),
    };

    let location = state
        .geolocator
        .locate(form.upload.as_ref(), hint)
        .await
        .map_err(|e| ApiError::invalid_field("location", e.to_string()))?;

    let filename = match &form.upload {
        Some(upload) => state.uploads.save(upload).await?,
        None => String::new(),
    };

    let cat = state
        .store
        .create_cat(NewCat {
            cat_name,
            weight,
            birthdate,
            filename,
            owner: OwnerRef(actor.id),
            location: Point::from(location),
        })
        .await?;

    tracing::info!("User {} added cat {}", actor.id, cat.id);
    Ok(ApiResponse::created("Cat created", cat))
}

/// GET /cats/user - the caller's cats
pub async fn mine(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<Json<Vec<CatOutput>>, ApiError> {
    let cats = state.store.list_cats_by_owner(OwnerRef(actor.id)).await?;
    Ok(Json(cats))
}

/// PUT /cats/:id - another user's cat reads as not found
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<CatPatch>,
) -> ApiResult<CatOutput> {
    let id = parse_id(&id)?;
    let changes = patch.into_changes()?;
    let cat = state
        .store
        .update_cat(id, cat_scope(&actor), changes)
        .await?;
    Ok(ApiResponse::success("Cat updated", cat))
}

/// DELETE /cats/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<CatOutput> {
    let id = parse_id(&id)?;
    let cat = state.store.delete_cat(id, cat_scope(&actor)).await?;
    Ok(ApiResponse::success("Cat deleted", cat))
}
