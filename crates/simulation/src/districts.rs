use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::structures::Category;

/// Income multiplier for a structure whose category matches its district.
pub const DISTRICT_BONUS: f64 = 1.2;

/// A named stretch `[start, end)` of the town that favours one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct DistrictSpan {
    pub name: String,
    pub start: f32,
    pub end: f32,
    pub favours: Category,
}

impl DistrictSpan {
    pub fn contains(&self, position: f32) -> bool {
        position >= self.start && position < self.end
    }
}

/// Player-designated districts. Spans may not overlap; the first match wins.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct Districts {
    pub spans: Vec<DistrictSpan>,
}

impl Districts {
    pub fn district_at(&self, position: f32) -> Option<&DistrictSpan> {
        self.spans.iter().find(|d| d.contains(position))
    }

    /// Bonus factor for a structure of `category` placed at `position`.
    pub fn bonus_at(&self, position: f32, category: Category) -> f64 {
        match self.district_at(position) {
            Some(district) if district.favours == category => DISTRICT_BONUS,
            _ => 1.0,
        }
    }

    /// Add a span unless it overlaps an existing one.
    pub fn designate(
        &mut self,
        name: impl Into<String>,
        start: f32,
        end: f32,
        favours: Category,
    ) -> bool {
        if end <= start {
            return false;
        }
        if self.spans.iter().any(|d| start < d.end && d.start < end) {
            return false;
        }
        self.spans.push(DistrictSpan {
            name: name.into(),
            start,
            end,
            favours,
        });
        true
    }
}

impl crate::Saveable for Districts {
    const SAVE_KEY: &'static str = "districts";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.spans.is_empty() {
            return None;
        }
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

pub struct DistrictsPlugin;

impl Plugin for DistrictsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Districts>();

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<Districts>();
    }
}
