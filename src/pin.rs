//! Pins: user-placed correspondences between a render-space position and a
//! texture-space UV coordinate.

use crate::error::{Error, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable pin identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(String);

impl PinId {
    /// Fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PinId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PinId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Writes a `Vec2` as `{x, y}` instead of glam's `[x, y]`.
mod xy {
    use glam::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Xy {
        x: f32,
        y: f32,
    }

    pub fn serialize<S: Serializer>(v: &Vec2, serializer: S) -> Result<S::Ok, S::Error> {
        Xy { x: v.x, y: v.y }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec2, D::Error> {
        let Xy { x, y } = Xy::deserialize(deserializer)?;
        Ok(Vec2::new(x, y))
    }
}

/// Wire shape: `{ id, position: {x, y}, uv: {x, y} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    id: PinId,
    /// Position in render/display space
    #[serde(with = "xy")]
    pub position: Vec2,
    /// Texture-space coordinate, normally within [0, 1]
    #[serde(with = "xy")]
    pub uv: Vec2,
}

impl Pin {
    pub fn new(position: Vec2, uv: Vec2) -> Self {
        Self::with_id(PinId::generate(), position, uv)
    }

    pub fn with_id(id: impl Into<PinId>, position: Vec2, uv: Vec2) -> Self {
        Self {
            id: id.into(),
            position,
            uv,
        }
    }

    pub fn id(&self) -> &PinId {
        &self.id
    }

    pub fn uv_in_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.uv.x) && (0.0..=1.0).contains(&self.uv.y)
    }
}

/// Pins in insertion order, looked up by id.
#[derive(Debug, Clone, Default)]
pub struct PinSet {
    pins: Vec<Pin>,
}

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pin: Pin) -> Result<()> {
        if self.get(pin.id()).is_some() {
            return Err(Error::DuplicatePin(pin.id().to_string()));
        }
        self.pins.push(pin);
        Ok(())
    }

    pub fn get(&self, id: &PinId) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.id() == id)
    }

    pub fn get_mut(&mut self, id: &PinId) -> Option<&mut Pin> {
        self.pins.iter_mut().find(|pin| pin.id() == id)
    }

    pub fn move_to(&mut self, id: &PinId, position: Vec2) -> Result<()> {
        self.expect_mut(id)?.position = position;
        Ok(())
    }

    pub fn set_uv(&mut self, id: &PinId, uv: Vec2) -> Result<()> {
        self.expect_mut(id)?.uv = uv;
        Ok(())
    }

    pub fn remove(&mut self, id: &PinId) -> Option<Pin> {
        let index = self.pins.iter().position(|pin| pin.id() == id)?;
        Some(self.pins.remove(index))
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter()
    }

    /// `(position, uv)` pairs for a warp solver.
    pub fn correspondences(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.pins.iter().map(|pin| (pin.position, pin.uv))
    }

    fn expect_mut(&mut self, id: &PinId) -> Result<&mut Pin> {
        self.get_mut(id)
            .ok_or_else(|| Error::UnknownPin(id.to_string()))
    }
}
