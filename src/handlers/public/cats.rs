// handlers/public/cats.rs - Cat reads and bounding-box search

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::AppState;
use crate::database::models::CatOutput;
use crate::error::ApiError;
use crate::geo::{BoundingBox, Coordinates};
use crate::validation::{parse_id, Validator};

/// Opposite corners, each "lat,lng".
#[derive(Debug, Default, Deserialize)]
pub struct AreaQuery {
    #[serde(rename = "topRight")]
    pub top_right: Option<String>,
    #[serde(rename = "bottomLeft")]
    pub bottom_left: Option<String>,
}

impl AreaQuery {
    /// `None` when neither corner was given.
    pub fn bounding_box(&self) -> Result<Option<BoundingBox>, ApiError> {
        if self.top_right.is_none() && self.bottom_left.is_none() {
            return Ok(None);
        }
        self.required_box().map(Some)
    }

    /// Both corners must be present and parse.
    pub fn required_box(&self) -> Result<BoundingBox, ApiError> {
        let mut v = Validator::new();
        let top_right = corner(&mut v, "topRight", self.top_right.as_deref());
        let bottom_left = corner(&mut v, "bottomLeft", self.bottom_left.as_deref());
        v.finish()?;

        top_right
            .zip(bottom_left)
            .map(|(tr, bl)| BoundingBox::from_corners(tr, bl))
            .ok_or_else(|| ApiError::bad_request("Both corners are required"))
    }
}

fn corner(v: &mut Validator, field: &str, raw: Option<&str>) -> Option<Coordinates> {
    match raw.map(str::parse::<Coordinates>) {
        Some(Ok(coords)) => Some(coords),
        Some(Err(e)) => {
            v.reject(field, e.to_string());
            None
        }
        None => {
            v.reject(field, "is required");
            None
        }
    }
}

/// GET /cats[?topRight=lat,lng&bottomLeft=lat,lng]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AreaQuery>,
) -> Result<Json<Vec<CatOutput>>, ApiError> {
    let cats = match query.bounding_box()? {
        Some(bbox) => state.store.list_cats_in_box(&bbox).await?,
        None => state.store.list_cats().await?,
    };
    Ok(Json(cats))
}

/// GET /cats/area?topRight=lat,lng&bottomLeft=lat,lng - both corners required
pub async fn area(
    State(state): State<AppState>,
    Query(query): Query<AreaQuery>,
) -> Result<Json<Vec<CatOutput>>, ApiError> {
    let bbox = query.required_box()?;
    Ok(Json(state.store.list_cats_in_box(&bbox).await?))
}

/// GET /cats/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CatOutput>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get_cat(id).await?))
}
