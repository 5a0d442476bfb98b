//! Floor of the building.

use serde::{Deserialize, Serialize};

/// Opaque floor identifier.
///
/// Never use this for vertical arithmetic; `Floor::floor_number` is the
/// only ordering signal between floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FloorId(pub i64);

impl std::fmt::Display for FloorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A floor with an optional floor-plan image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub name: String,
    /// Vertical ordering key. Need not be contiguous.
    pub floor_number: i32,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
}

impl Floor {
    pub fn new(id: FloorId, name: impl Into<String>, floor_number: i32) -> Self {
        Self {
            id,
            name: name.into(),
            floor_number,
            image_width: None,
            image_height: None,
        }
    }

    pub fn with_image(mut self, width: u32, height: u32) -> Self {
        self.image_width = Some(width);
        self.image_height = Some(height);
        self
    }

    /// Center of the floor-plan image, when both dimensions are known.
    pub fn plan_center(&self) -> Option<(f64, f64)> {
        match (self.image_width, self.image_height) {
            (Some(w), Some(h)) => Some((f64::from(w) / 2.0, f64::from(h) / 2.0)),
            _ => None,
        }
    }
}

/// Payload for creating a floor. The store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewFloor {
    pub name: String,
    pub floor_number: i32,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
}

impl NewFloor {
    pub fn new(name: impl Into<String>, floor_number: i32) -> Self {
        Self { name: name.into(), floor_number, ..Default::default() }
    }

    pub fn with_image(mut self, width: u32, height: u32) -> Self {
        self.image_width = Some(width);
        self.image_height = Some(height);
        self
    }
}

/// Partial update of a floor. `None` leaves a field untouched; the image
/// dimensions take `Some(None)` to clear.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FloorPatch {
    pub name: Option<String>,
    pub floor_number: Option<i32>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub image_width: Option<Option<u32>>,
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub image_height: Option<Option<u32>>,
}

impl FloorPatch {
    pub fn renumber(floor_number: i32) -> Self {
        Self { floor_number: Some(floor_number), ..Default::default() }
    }

    pub fn apply(&self, floor: &mut Floor) {
        if let Some(name) = &self.name { floor.name = name.clone(); }
        if let Some(number) = self.floor_number { floor.floor_number = number; }
        if let Some(width) = self.image_width { floor.image_width = width; }
        if let Some(height) = self.image_height { floor.image_height = height; }
    }
}
