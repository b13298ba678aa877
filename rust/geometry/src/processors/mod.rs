// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology parsers
//!
//! Each parser turns the geometry entries of one topology into vertex records:
//!
//! - `surface`: MultiSurface, CompositeSurface, Solid, MultiSolid and
//!   CompositeSolid, triangulated
//! - `line`: MultiLineString, as line segments
//! - `point`: MultiPoint
//! - `helpers`: identity resolution and per-boundary lookups shared by all

use std::borrow::Cow;

use citylite_core::{CityModel, Geometry};

use crate::geometry_data::{GeometryData, GeometryKind};
use crate::legend::Legend;
use crate::Point3;

mod helpers;
mod line;
mod point;
mod surface;


pub use line::LineParser;
pub use point::PointParser;
pub use surface::SurfaceParser;

/// Read-only document state shared by every parser during one parse
pub struct ParseContext<'a> {
    pub model: &'a CityModel,
    /// Vertex pool in real-world coordinates
    pub vertices: Cow<'a, [[f64; 3]]>,
}

impl<'a> ParseContext<'a> {
    pub fn new(model: &'a CityModel) -> Self {
        Self {
            model,
            vertices: model.transformed_vertices(),
        }
    }

    /// Position of vertex `id`; the origin when the id is outside the pool
    #[inline]
    pub fn vertex(&self, id: u32) -> Point3<f64> {
        self.vertices
            .get(id as usize)
            .map_or_else(Point3::origin, |&[x, y, z]| Point3::new(x, y, z))
    }
}

/// Topology parser - turns geometry entries into vertex records
pub trait GeometryParser {
    /// Kind of records this parser emits
    fn kind(&self) -> GeometryKind;

    /// Append the records of one geometry entry of object `object_id`.
    ///
    /// Entries of a topology this parser does not handle are ignored.
    fn parse_geometry(
        &mut self,
        ctx: &ParseContext<'_>,
        geometry: &Geometry,
        object_id: &str,
        geometry_index: usize,
    );

    fn geom_data(&self) -> &GeometryData;

    fn geom_data_mut(&mut self) -> &mut GeometryData;

    fn legend(&self) -> &Legend;

    fn legend_mut(&mut self) -> &mut Legend;

    /// Hand over the accumulated records, leaving an empty accumulator
    fn take_geom_data(&mut self) -> GeometryData {
        let kind = self.kind();
        std::mem::replace(self.geom_data_mut(), GeometryData::new(kind))
    }

    /// Drop the accumulated records
    fn clean(&mut self) {
        let kind = self.kind();
        *self.geom_data_mut() = GeometryData::new(kind);
    }
}

/// One parser per topology, in emission order
#[derive(Debug, Clone)]
pub enum TopologyParser {
    Surface(SurfaceParser),
    Line(LineParser),
    Point(PointParser),
}

impl TopologyParser {
    /// Surface, line and point parsers, in that order
    pub fn all() -> [TopologyParser; 3] {
        [
            TopologyParser::Surface(SurfaceParser::new()),
            TopologyParser::Line(LineParser::new()),
            TopologyParser::Point(PointParser::new()),
        ]
    }
}

macro_rules! dispatch {
    ($self:expr, $parser:ident => $body:expr) => {
        match $self {
            TopologyParser::Surface($parser) => $body,
            TopologyParser::Line($parser) => $body,
            TopologyParser::Point($parser) => $body,
        }
    };
}

impl GeometryParser for TopologyParser {
    fn kind(&self) -> GeometryKind {
        dispatch!(self, p => p.kind())
    }

    fn parse_geometry(
        &mut self,
        ctx: &ParseContext<'_>,
        geometry: &Geometry,
        object_id: &str,
        geometry_index: usize,
    ) {
        dispatch!(self, p => p.parse_geometry(ctx, geometry, object_id, geometry_index))
    }

    fn geom_data(&self) -> &GeometryData {
        dispatch!(self, p => p.geom_data())
    }

    fn geom_data_mut(&mut self) -> &mut GeometryData {
        dispatch!(self, p => p.geom_data_mut())
    }

    fn legend(&self) -> &Legend {
        dispatch!(self, p => p.legend())
    }

    fn legend_mut(&mut self) -> &mut Legend {
        dispatch!(self, p => p.legend_mut())
    }
}
