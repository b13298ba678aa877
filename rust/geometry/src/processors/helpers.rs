// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared helper functions for topology parsers.
//!
//! Identity resolution (object, type, LOD), geometry flattening and the
//! per-boundary lookups of semantics, materials and textures.

use citylite_core::{flatten, CityModel, Geometry, Nested, SemanticSurface};
use smallvec::SmallVec;

use crate::geometry_data::{TextureValue, NO_UV, NO_VALUE};
use crate::legend::Legend;

/// Identity fields shared by every vertex of one geometry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Identity {
    pub(super) object_id: i32,
    pub(super) object_type: i32,
    pub(super) geometry_id: i32,
    pub(super) lod_id: i32,
}

/// Resolve object index, object type index and LOD index.
///
/// An object missing from the collection yields -1 identity fields rather
/// than an error so its geometry still lines up with everything else.
pub(super) fn resolve_identity(
    legend: &mut Legend,
    model: &CityModel,
    object_id: &str,
    geometry: &Geometry,
    geometry_index: usize,
) -> Identity {
    let (object_index, object_type) = match model.city_objects.get_full(object_id) {
        Some((index, _, object)) => (
            index as i32,
            object
                .object_type
                .as_deref()
                .map_or(NO_VALUE, |t| legend.object_type_index(t)),
        ),
        None => (NO_VALUE, NO_VALUE),
    };

    Identity {
        object_id: object_index,
        object_type,
        geometry_id: geometry_index as i32,
        lod_id: legend.lod_index(geometry.lod.as_ref()),
    }
}

/// Material source of one theme after flattening
pub(super) enum MaterialSlots<'a> {
    PerBoundary(Vec<&'a Nested<Option<u32>>>),
    Uniform(i32),
}

/// Geometry with boundaries and every aligned value array flattened by the
/// same depth
pub(super) struct FlatGeometry<'a> {
    pub(super) boundaries: Vec<&'a Nested<u32>>,
    pub(super) semantic_values: Vec<&'a Nested<Option<u32>>>,
    pub(super) surfaces: &'a [SemanticSurface],
    pub(super) materials: Vec<(&'a str, MaterialSlots<'a>)>,
    pub(super) textures: Vec<(&'a str, Vec<&'a Nested<Option<u32>>>)>,
}

impl<'a> FlatGeometry<'a> {
    pub(super) fn new(geometry: &'a Geometry, depth: usize) -> Self {
        let (semantic_values, surfaces) = match &geometry.semantics {
            Some(semantics) => (
                semantics
                    .values
                    .as_deref()
                    .map(|values| flatten(values, depth))
                    .unwrap_or_default(),
                semantics.surfaces.as_slice(),
            ),
            None => (Vec::new(), &[][..]),
        };

        let materials = geometry
            .material
            .iter()
            .map(|(theme, reference)| {
                let slots = match (&reference.values, reference.value) {
                    (Some(values), _) => MaterialSlots::PerBoundary(flatten(values, depth)),
                    (None, Some(value)) => MaterialSlots::Uniform(value as i32),
                    (None, None) => MaterialSlots::Uniform(NO_VALUE),
                };
                (theme.as_str(), slots)
            })
            .collect();

        let textures = geometry
            .texture
            .iter()
            .map(|(theme, reference)| (theme.as_str(), flatten(&reference.values, depth)))
            .collect();

        Self {
            boundaries: flatten(&geometry.boundaries, depth),
            semantic_values,
            surfaces,
            materials,
            textures,
        }
    }

    /// Index into `surfaces` for boundary `index`
    #[inline]
    pub(super) fn semantic_slot(&self, index: usize) -> Option<usize> {
        self.semantic_values
            .get(index)
            .and_then(|slot| slot.as_value())
            .and_then(|slot| slot.map(|s| s as usize))
    }

    /// Material value per theme for boundary `index`
    pub(super) fn materials_at(&self, index: usize) -> SmallVec<[(&'a str, i32); 2]> {
        self.materials
            .iter()
            .map(|(theme, slots)| {
                let value = match slots {
                    MaterialSlots::PerBoundary(values) => values
                        .get(index)
                        .and_then(|v| v.as_value())
                        .and_then(|v| v.map(|m| m as i32))
                        .unwrap_or(NO_VALUE),
                    MaterialSlots::Uniform(value) => *value,
                };
                (*theme, value)
            })
            .collect()
    }

    /// Texture rings per theme for boundary `index`
    pub(super) fn texture_rings_at(
        &self,
        index: usize,
    ) -> SmallVec<[(&'a str, Option<&'a [Nested<Option<u32>>]>); 2]> {
        self.textures
            .iter()
            .map(|(theme, values)| (*theme, values.get(index).and_then(|v| v.as_list())))
            .collect()
    }
}

/// Surface type index for a semantic slot; -1 when absent or out of range
pub(super) fn surface_type_index(
    legend: &mut Legend,
    slot: Option<usize>,
    surfaces: &[SemanticSurface],
) -> i32 {
    slot.and_then(|s| surfaces.get(s))
        .map_or(NO_VALUE, |surface| legend.surface_type_index(&surface.surface_type))
}

/// Class index for a semantic slot; -1 when absent, out of range or unclassed
pub(super) fn class_index(
    legend: &mut Legend,
    slot: Option<usize>,
    surfaces: &[SemanticSurface],
) -> i32 {
    slot.and_then(|s| surfaces.get(s))
        .and_then(|surface| surface.class.as_deref())
        .map_or(NO_VALUE, |class| legend.class_index(class))
}

/// Texture value of the vertex at `position` within ring `ring_index`.
///
/// `rings` holds one `[texture, uv, uv, ...]` list per ring; the texture of
/// the first ring applies to the whole surface.
pub(super) fn texture_at(
    model: &CityModel,
    rings: Option<&[Nested<Option<u32>>]>,
    ring_index: usize,
    position: usize,
) -> TextureValue {
    let Some(rings) = rings else {
        return TextureValue::NONE;
    };

    let index = match rings.first().and_then(|ring| ring.get(0)).and_then(Nested::as_value) {
        Some(Some(texture)) => *texture as i32,
        _ => return TextureValue::NONE,
    };

    let uv = rings
        .get(ring_index)
        .and_then(|ring| ring.get(position + 1))
        .and_then(Nested::as_value)
        .and_then(|uv| *uv)
        .and_then(|uv| model.texture_vertex(uv as usize))
        .map_or(NO_UV, |[u, v]| [u as f32, v as f32]);

    TextureValue { index, uv }
}
