// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-vertex attribute accumulator
//!
//! One record per emitted vertex, stored as parallel arrays so each field can
//! be uploaded as its own vertex attribute. Material and texture values are
//! sparse per theme and back-filled with sentinels to stay aligned with the
//! record count.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::export::{GeometryExport, TextureTheme};

/// Sentinel for "no material / no texture" in theme arrays
pub const NO_VALUE: i32 = -1;

/// Sentinel texture coordinate
pub const NO_UV: [f32; 2] = [0.0, 0.0];

/// Primitive class produced by a topology parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum GeometryKind {
    Points = 0,
    Lines = 1,
    Triangles = 2,
}

impl From<GeometryKind> for u8 {
    fn from(kind: GeometryKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for GeometryKind {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(GeometryKind::Points),
            1 => Ok(GeometryKind::Lines),
            2 => Ok(GeometryKind::Triangles),
            other => Err(format!("unknown geometry kind {}", other)),
        }
    }
}

/// Texture value of one vertex under one theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureValue {
    /// Texture index, or [`NO_VALUE`]
    pub index: i32,
    /// Texture coordinate
    pub uv: [f32; 2],
}

impl TextureValue {
    pub const NONE: TextureValue = TextureValue {
        index: NO_VALUE,
        uv: NO_UV,
    };
}

impl Default for TextureValue {
    fn default() -> Self {
        Self::NONE
    }
}

/// Pad `values` with `sentinel` up to `len`
#[inline]
pub(crate) fn ensure_length<T: Clone>(values: &mut Vec<T>, len: usize, sentinel: T) {
    if values.len() < len {
        values.resize(len, sentinel);
    }
}

/// Get the entry for `theme`, inserting an empty one if needed
#[inline]
fn theme_entry<'m, V: Default>(map: &'m mut IndexMap<String, V>, theme: &str) -> &'m mut V {
    let index = match map.get_index_of(theme) {
        Some(index) => index,
        None => map.insert_full(theme.to_owned(), V::default()).0,
    };
    &mut map[index]
}

/// Accumulated vertex records of one primitive class
#[derive(Debug, Clone)]
pub struct GeometryData {
    geometry_type: GeometryKind,
    vertex_ids: Vec<u32>,
    object_ids: Vec<i32>,
    object_types: Vec<i32>,
    semantic_surfaces: Vec<i32>,
    semantic_classes: Vec<i32>,
    geometry_ids: Vec<i32>,
    boundary_ids: Vec<i32>,
    lod_ids: Vec<i32>,
    materials: IndexMap<String, Vec<i32>>,
    textures: IndexMap<String, TextureTheme>,
}

impl GeometryData {
    /// Create an empty accumulator
    pub fn new(geometry_type: GeometryKind) -> Self {
        Self {
            geometry_type,
            vertex_ids: Vec::new(),
            object_ids: Vec::new(),
            object_types: Vec::new(),
            semantic_surfaces: Vec::new(),
            semantic_classes: Vec::new(),
            geometry_ids: Vec::new(),
            boundary_ids: Vec::new(),
            lod_ids: Vec::new(),
            materials: IndexMap::new(),
            textures: IndexMap::new(),
        }
    }

    /// Append one vertex record.
    ///
    /// Every theme listed in `materials` / `textures` is back-filled up to the
    /// previous record before the new value is appended.
    #[allow(clippy::too_many_arguments)]
    pub fn add_vertex(
        &mut self,
        vertex_id: u32,
        object_id: i32,
        object_type: i32,
        surface_type: i32,
        surface_class: i32,
        geometry_id: i32,
        boundary_id: i32,
        lod_id: i32,
        materials: &[(&str, i32)],
        textures: &[(&str, TextureValue)],
    ) {
        self.vertex_ids.push(vertex_id);
        self.object_ids.push(object_id);
        self.object_types.push(object_type);
        self.semantic_surfaces.push(surface_type);
        self.semantic_classes.push(surface_class);
        self.geometry_ids.push(geometry_id);
        self.boundary_ids.push(boundary_id);
        self.lod_ids.push(lod_id);

        for &(theme, value) in materials {
            self.append_material(theme, value);
        }
        for &(theme, value) in textures {
            self.append_texture(theme, value);
        }

        debug_assert!(self.is_aligned(), "vertex record fields out of sync");
    }

    fn append_material(&mut self, theme: &str, value: i32) {
        let previous = self.count() - 1;
        let values = theme_entry(&mut self.materials, theme);
        ensure_length(values, previous, NO_VALUE);
        values.push(value);
    }

    fn append_texture(&mut self, theme: &str, value: TextureValue) {
        let previous = self.count() - 1;
        let theme_values = theme_entry(&mut self.textures, theme);
        theme_values.ensure_length(previous);
        theme_values.index.push(value.index);
        theme_values.uvs.push(value.uv);
    }

    /// Back-fill every theme array to the record count
    pub fn complete_themes(&mut self) {
        let count = self.count();
        for values in self.materials.values_mut() {
            ensure_length(values, count, NO_VALUE);
        }
        for theme_values in self.textures.values_mut() {
            theme_values.ensure_length(count);
        }
    }

    /// Number of vertex records
    #[inline]
    pub fn count(&self) -> usize {
        self.vertex_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty()
    }

    #[inline]
    pub fn geometry_type(&self) -> GeometryKind {
        self.geometry_type
    }

    /// Check that every per-record field has `count()` entries
    pub fn is_aligned(&self) -> bool {
        let n = self.count();
        self.object_ids.len() == n
            && self.object_types.len() == n
            && self.semantic_surfaces.len() == n
            && self.semantic_classes.len() == n
            && self.geometry_ids.len() == n
            && self.boundary_ids.len() == n
            && self.lod_ids.len() == n
    }

    /// Flat xyz coordinates of every record, in record order.
    ///
    /// Ids outside the pool resolve to the origin so the buffer stays aligned
    /// with the attribute arrays.
    pub fn resolve_vertices(&self, pool: &[[f64; 3]]) -> Vec<f32> {
        let mut vertices = Vec::with_capacity(self.count() * 3);
        let mut missing = 0usize;

        for &id in &self.vertex_ids {
            match pool.get(id as usize) {
                Some(v) => vertices.extend_from_slice(&[v[0] as f32, v[1] as f32, v[2] as f32]),
                None => {
                    missing += 1;
                    vertices.extend_from_slice(&[0.0, 0.0, 0.0]);
                }
            }
        }

        if missing > 0 {
            debug!(missing, pool_size = pool.len(), "Vertex ids outside the vertex pool");
        }

        vertices
    }

    /// Snapshot of all arrays with theme arrays back-filled to `count()`
    pub fn finalize(&mut self) -> GeometryExport {
        self.complete_themes();
        GeometryExport {
            geometry_type: self.geometry_type,
            object_ids: self.object_ids.clone(),
            object_types: self.object_types.clone(),
            semantic_surfaces: self.semantic_surfaces.clone(),
            semantic_classes: self.semantic_classes.clone(),
            geometry_ids: self.geometry_ids.clone(),
            boundary_ids: self.boundary_ids.clone(),
            lod_ids: self.lod_ids.clone(),
            materials: self.materials.clone(),
            textures: self.textures.clone(),
            attribute_values: None,
        }
    }

    /// Consume the accumulator into its export snapshot without copying
    pub fn into_export(mut self) -> GeometryExport {
        self.complete_themes();
        GeometryExport {
            geometry_type: self.geometry_type,
            object_ids: self.object_ids,
            object_types: self.object_types,
            semantic_surfaces: self.semantic_surfaces,
            semantic_classes: self.semantic_classes,
            geometry_ids: self.geometry_ids,
            boundary_ids: self.boundary_ids,
            lod_ids: self.lod_ids,
            materials: self.materials,
            textures: self.textures,
            attribute_values: None,
        }
    }

    /// Append all records of `other` after the records of `self`.
    ///
    /// A theme missing on one side counts as a full sentinel array of that
    /// side's length.
    pub fn merge(&mut self, mut other: GeometryData) {
        if other.geometry_type != self.geometry_type {
            warn!(
                this = ?self.geometry_type,
                other = ?other.geometry_type,
                "Merging different types of geometry data"
            );
        }

        let own_count = self.count();
        let total = own_count + other.count();

        self.complete_themes();
        other.complete_themes();

        self.vertex_ids.append(&mut other.vertex_ids);
        self.object_ids.append(&mut other.object_ids);
        self.object_types.append(&mut other.object_types);
        self.semantic_surfaces.append(&mut other.semantic_surfaces);
        self.semantic_classes.append(&mut other.semantic_classes);
        self.geometry_ids.append(&mut other.geometry_ids);
        self.boundary_ids.append(&mut other.boundary_ids);
        self.lod_ids.append(&mut other.lod_ids);

        for (theme, mut values) in other.materials {
            let target = theme_entry(&mut self.materials, &theme);
            ensure_length(target, own_count, NO_VALUE);
            target.append(&mut values);
        }
        for (theme, other_values) in other.textures {
            let target = theme_entry(&mut self.textures, &theme);
            target.ensure_length(own_count);
            target.extend(other_values);
        }

        // Themes only present on this side
        for values in self.materials.values_mut() {
            ensure_length(values, total, NO_VALUE);
        }
        for theme_values in self.textures.values_mut() {
            theme_values.ensure_length(total);
        }

        debug_assert!(self.is_aligned(), "vertex record fields out of sync after merge");
    }

    /// Overwrite the object index of every record
    pub fn set_object_id(&mut self, object_id: i32) {
        self.object_ids.fill(object_id);
    }

    /// Overwrite the object type index of every record
    pub fn set_object_type(&mut self, object_type: i32) {
        self.object_types.fill(object_type);
    }

    /// Overwrite the geometry index of every record
    pub fn set_geometry_id(&mut self, geometry_id: i32) {
        self.geometry_ids.fill(geometry_id);
    }

    #[inline]
    pub fn vertex_ids(&self) -> &[u32] {
        &self.vertex_ids
    }

    #[inline]
    pub fn object_ids(&self) -> &[i32] {
        &self.object_ids
    }

    #[inline]
    pub fn object_types(&self) -> &[i32] {
        &self.object_types
    }

    #[inline]
    pub fn semantic_surfaces(&self) -> &[i32] {
        &self.semantic_surfaces
    }

    #[inline]
    pub fn semantic_classes(&self) -> &[i32] {
        &self.semantic_classes
    }

    #[inline]
    pub fn geometry_ids(&self) -> &[i32] {
        &self.geometry_ids
    }

    #[inline]
    pub fn boundary_ids(&self) -> &[i32] {
        &self.boundary_ids
    }

    #[inline]
    pub fn lod_ids(&self) -> &[i32] {
        &self.lod_ids
    }

    /// Material arrays per theme (may be shorter than `count()` before finalize)
    #[inline]
    pub fn materials(&self) -> &IndexMap<String, Vec<i32>> {
        &self.materials
    }

    /// Texture arrays per theme (may be shorter than `count()` before finalize)
    #[inline]
    pub fn textures(&self) -> &IndexMap<String, TextureTheme> {
        &self.textures
    }
}
