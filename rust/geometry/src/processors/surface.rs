// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface parser - triangulates surface, solid and multi-solid geometry

use std::borrow::Cow;

use citylite_core::{Geometry, Nested};
use smallvec::SmallVec;
use tracing::debug;

use super::helpers::{self, FlatGeometry, Identity};
use super::{GeometryParser, ParseContext};
use crate::geometry_data::{GeometryData, GeometryKind, TextureValue};
use crate::legend::Legend;
use crate::triangulation::triangulate_ring;
use crate::Point3;

/// Outer ring followed by its holes as one id list
struct CombinedRing {
    ids: Vec<u32>,
    hole_offsets: SmallVec<[usize; 4]>,
    /// Source ring index of each kept ring
    ring_indices: SmallVec<[usize; 4]>,
}

impl CombinedRing {
    /// Rings with fewer than 3 points are dropped; without a usable outer
    /// ring the whole surface is dropped.
    fn from_rings(rings: &[Nested<u32>]) -> Option<Self> {
        let mut combined = CombinedRing {
            ids: Vec::new(),
            hole_offsets: SmallVec::new(),
            ring_indices: SmallVec::new(),
        };

        for (ring_index, ring) in rings.iter().enumerate() {
            if ring.values().count() < 3 {
                if ring_index == 0 {
                    return None;
                }
                continue;
            }
            if !combined.ids.is_empty() {
                combined.hole_offsets.push(combined.ids.len());
            }
            combined.ring_indices.push(ring_index);
            combined.ids.extend(ring.values().copied());
        }

        (combined.ids.len() >= 3).then_some(combined)
    }

    /// Source ring index and position within that ring of a combined position
    fn locate(&self, position: usize) -> (usize, usize) {
        let ring = self
            .hole_offsets
            .iter()
            .take_while(|&&offset| offset <= position)
            .count();
        let start = match ring {
            0 => 0,
            _ => self.hole_offsets[ring - 1],
        };
        (self.ring_indices[ring], position - start)
    }
}

/// Parser for MultiSurface, CompositeSurface, Solid, MultiSolid and
/// CompositeSolid entries. Emits three records per triangle.
#[derive(Debug, Clone)]
pub struct SurfaceParser {
    geom_data: GeometryData,
    legend: Legend,
    triangulations: usize,
}

impl SurfaceParser {
    pub fn new() -> Self {
        Self::with_legend(Legend::new())
    }

    pub fn with_legend(legend: Legend) -> Self {
        Self {
            geom_data: GeometryData::new(GeometryKind::Triangles),
            legend,
            triangulations: 0,
        }
    }

    /// Number of rings sent through the triangulator so far
    #[inline]
    pub fn triangulation_count(&self) -> usize {
        self.triangulations
    }

    fn parse_surfaces(&mut self, ctx: &ParseContext<'_>, flat: &FlatGeometry<'_>, identity: Identity) {
        let textured = ctx.model.appearance.is_some() && !flat.textures.is_empty();

        for (surface_index, surface) in flat.boundaries.iter().enumerate() {
            let Some(rings) = surface.as_list() else {
                continue;
            };
            let Some(ring) = CombinedRing::from_rings(rings) else {
                continue;
            };

            let triangles: Cow<'_, [usize]> = if ring.ids.len() == 3 {
                Cow::Borrowed(&[0, 1, 2])
            } else {
                let points: Vec<Point3<f64>> = ring.ids.iter().map(|&id| ctx.vertex(id)).collect();
                self.triangulations += 1;
                match triangulate_ring(&points, &ring.hole_offsets) {
                    Ok(indices) => Cow::Owned(indices),
                    Err(e) => {
                        debug!(surface = surface_index, error = %e, "Skipping surface that failed to triangulate");
                        continue;
                    }
                }
            };

            let slot = flat.semantic_slot(surface_index);
            let surface_type = helpers::surface_type_index(&mut self.legend, slot, flat.surfaces);
            let surface_class = helpers::class_index(&mut self.legend, slot, flat.surfaces);
            let materials = flat.materials_at(surface_index);
            let texture_rings = if textured {
                flat.texture_rings_at(surface_index)
            } else {
                SmallVec::new()
            };

            for &position in triangles.iter() {
                let textures: SmallVec<[(&str, TextureValue); 2]> = texture_rings
                    .iter()
                    .map(|&(theme, rings)| {
                        let (ring_index, ring_position) = ring.locate(position);
                        (theme, helpers::texture_at(ctx.model, rings, ring_index, ring_position))
                    })
                    .collect();

                self.geom_data.add_vertex(
                    ring.ids[position],
                    identity.object_id,
                    identity.object_type,
                    surface_type,
                    surface_class,
                    identity.geometry_id,
                    surface_index as i32,
                    identity.lod_id,
                    &materials,
                    &textures,
                );
            }
        }
    }
}

impl Default for SurfaceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryParser for SurfaceParser {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Triangles
    }

    fn parse_geometry(
        &mut self,
        ctx: &ParseContext<'_>,
        geometry: &Geometry,
        object_id: &str,
        geometry_index: usize,
    ) {
        let Some(depth) = geometry.kind.surface_depth() else {
            return;
        };

        let identity =
            helpers::resolve_identity(&mut self.legend, ctx.model, object_id, geometry, geometry_index);
        let flat = FlatGeometry::new(geometry, depth);
        self.parse_surfaces(ctx, &flat, identity);
    }

    fn geom_data(&self) -> &GeometryData {
        &self.geom_data
    }

    fn geom_data_mut(&mut self) -> &mut GeometryData {
        &mut self.geom_data
    }

    fn legend(&self) -> &Legend {
        &self.legend
    }

    fn legend_mut(&mut self) -> &mut Legend {
        &mut self.legend
    }
}
