use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::geo::Point;

/// Owner as written: just the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerRef(pub Uuid);

/// Owner as read: the id resolved to a display summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_name: String,
}

/// Stored cat with its owner reference unresolved.
#[derive(Debug, Clone)]
pub struct Cat {
    pub id: Uuid,
    pub cat_name: String,
    pub weight: f64,
    pub birthdate: NaiveDate,
    pub filename: String,
    pub owner: OwnerRef,
    pub location: Point,
}

impl Cat {
    pub fn output(&self, owner: OwnerSummary) -> CatOutput {
        CatOutput {
            id: self.id,
            cat_name: self.cat_name.clone(),
            weight: self.weight,
            birthdate: self.birthdate,
            filename: self.filename.clone(),
            location: self.location,
            owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatOutput {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub cat_name: String,
    pub weight: f64,
    pub birthdate: NaiveDate,
    pub filename: String,
    pub location: Point,
    pub owner: OwnerSummary,
}

#[derive(Debug, Clone)]
pub struct NewCat {
    pub cat_name: String,
    pub weight: f64,
    pub birthdate: NaiveDate,
    pub filename: String,
    pub owner: OwnerRef,
    pub location: Point,
}

/// Allow-listed cat mutation. Owner is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct CatChanges {
    pub cat_name: Option<String>,
    pub weight: Option<f64>,
    pub birthdate: Option<NaiveDate>,
    pub filename: Option<String>,
    pub location: Option<Point>,
}

impl CatChanges {
    pub fn is_empty(&self) -> bool {
        self.cat_name.is_none()
            && self.weight.is_none()
            && self.birthdate.is_none()
            && self.filename.is_none()
            && self.location.is_none()
    }

    pub fn apply_to(self, cat: &mut Cat) {
        if let Some(cat_name) = self.cat_name {
            cat.cat_name = cat_name;
        }
        if let Some(weight) = self.weight {
            cat.weight = weight;
        }
        if let Some(birthdate) = self.birthdate {
            cat.birthdate = birthdate;
        }
        if let Some(filename) = self.filename {
            cat.filename = filename;
        }
        if let Some(location) = self.location {
            cat.location = location;
        }
    }
}
