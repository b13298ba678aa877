// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export snapshot of an accumulator
//!
//! Parallel attribute arrays ready to become vertex buffers, plus helpers
//! consumers use to derive extra per-vertex data from them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry_data::{ensure_length, GeometryKind, NO_UV, NO_VALUE};

/// Distinct values above which a categorical lookup is not built
pub const MAX_LOOKUP_CATEGORIES: usize = 110;

/// Texture arrays of one theme
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureTheme {
    pub index: Vec<i32>,
    pub uvs: Vec<[f32; 2]>,
}

impl TextureTheme {
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub(crate) fn ensure_length(&mut self, len: usize) {
        ensure_length(&mut self.index, len, NO_VALUE);
        ensure_length(&mut self.uvs, len, NO_UV);
    }

    pub(crate) fn extend(&mut self, mut other: TextureTheme) {
        self.index.append(&mut other.index);
        self.uvs.append(&mut other.uvs);
    }
}

/// Range of consecutive vertices sharing one texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawGroup {
    pub start: usize,
    pub count: usize,
    /// Texture index, or -1 for untextured vertices
    pub texture: i32,
}

/// Finalized attribute arrays; every array has `count()` entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryExport {
    pub geometry_type: GeometryKind,
    pub object_ids: Vec<i32>,
    #[serde(rename = "objectType")]
    pub object_types: Vec<i32>,
    pub semantic_surfaces: Vec<i32>,
    pub semantic_classes: Vec<i32>,
    pub geometry_ids: Vec<i32>,
    pub boundary_ids: Vec<i32>,
    pub lod_ids: Vec<i32>,
    pub materials: IndexMap<String, Vec<i32>>,
    pub textures: IndexMap<String, TextureTheme>,
    /// Per-vertex category index set by [`GeometryExport::set_attribute_lookup`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_values: Option<Vec<i32>>,
}

impl GeometryExport {
    /// Number of vertex records
    #[inline]
    pub fn count(&self) -> usize {
        self.object_ids.len()
    }

    /// Check that every array (theme arrays included) has `count()` entries
    pub fn is_aligned(&self) -> bool {
        let n = self.count();
        self.object_types.len() == n
            && self.semantic_surfaces.len() == n
            && self.semantic_classes.len() == n
            && self.geometry_ids.len() == n
            && self.boundary_ids.len() == n
            && self.lod_ids.len() == n
            && self.materials.values().all(|v| v.len() == n)
            && self
                .textures
                .values()
                .all(|t| t.index.len() == n && t.uvs.len() == n)
    }

    /// Expand a per-object value into a per-vertex category index.
    ///
    /// `object_values[i]` is the value of the object with index `i`. Values are
    /// numbered in first-seen order; vertices whose object index is unknown
    /// get -1. Nothing is written when there are too many distinct values or
    /// when the result would not line up with the other arrays. Returns whether
    /// the lookup was applied.
    pub fn set_attribute_lookup<V: PartialEq>(&mut self, object_values: &[V]) -> bool {
        let mut unique: Vec<&V> = Vec::new();
        let object_lookup: Vec<i32> = object_values
            .iter()
            .map(|value| match unique.iter().position(|u| *u == value) {
                Some(index) => index as i32,
                None => {
                    unique.push(value);
                    (unique.len() - 1) as i32
                }
            })
            .collect();

        if unique.len() >= MAX_LOOKUP_CATEGORIES {
            debug!(categories = unique.len(), "Too many distinct values for an attribute lookup");
            return false;
        }

        let values: Vec<i32> = self
            .object_ids
            .iter()
            .map(|&object_id| {
                usize::try_from(object_id)
                    .ok()
                    .and_then(|i| object_lookup.get(i))
                    .copied()
                    .unwrap_or(NO_VALUE)
            })
            .collect();

        if !self.is_aligned() || values.len() != self.count() {
            warn!(
                values = values.len(),
                count = self.count(),
                "Wrong size of attributes array"
            );
            return false;
        }

        self.attribute_values = Some(values);
        true
    }

    /// Split the vertices into runs sharing the same texture of `theme`.
    ///
    /// Empty when the theme is unknown.
    pub fn texture_groups(&self, theme: &str) -> Vec<DrawGroup> {
        let Some(texture) = self.textures.get(theme) else {
            return Vec::new();
        };

        let mut groups: Vec<DrawGroup> = Vec::new();
        for (i, &index) in texture.index.iter().enumerate() {
            match groups.last_mut() {
                Some(group) if group.texture == index => group.count += 1,
                _ => groups.push(DrawGroup {
                    start: i,
                    count: 1,
                    texture: index,
                }),
            }
        }
        groups
    }
}
