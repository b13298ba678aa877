// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point parser - MultiPoint entries, one record per point

use citylite_core::{Geometry, GeometryType};

use super::helpers::{self, FlatGeometry};
use super::{GeometryParser, ParseContext};
use crate::geometry_data::{GeometryData, GeometryKind};
use crate::legend::Legend;

#[derive(Debug, Clone)]
pub struct PointParser {
    geom_data: GeometryData,
    legend: Legend,
}

impl PointParser {
    pub fn new() -> Self {
        Self::with_legend(Legend::new())
    }

    pub fn with_legend(legend: Legend) -> Self {
        Self {
            geom_data: GeometryData::new(GeometryKind::Points),
            legend,
        }
    }
}

impl Default for PointParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryParser for PointParser {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Points
    }

    fn parse_geometry(
        &mut self,
        ctx: &ParseContext<'_>,
        geometry: &Geometry,
        object_id: &str,
        geometry_index: usize,
    ) {
        if geometry.kind != GeometryType::MultiPoint {
            return;
        }

        let identity =
            helpers::resolve_identity(&mut self.legend, ctx.model, object_id, geometry, geometry_index);
        let flat = FlatGeometry::new(geometry, 0);

        for (point_index, point) in flat.boundaries.iter().enumerate() {
            let Some(&vertex_id) = point.as_value() else {
                continue;
            };

            let slot = flat.semantic_slot(point_index);
            let surface_type = helpers::surface_type_index(&mut self.legend, slot, flat.surfaces);
            let surface_class = helpers::class_index(&mut self.legend, slot, flat.surfaces);

            self.geom_data.add_vertex(
                vertex_id,
                identity.object_id,
                identity.object_type,
                surface_type,
                surface_class,
                identity.geometry_id,
                point_index as i32,
                identity.lod_id,
                &[],
                &[],
            );
        }
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
