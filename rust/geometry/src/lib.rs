// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityLite Geometry Processing
//!
//! Turns CityJSON geometry entries into flat per-vertex attribute streams
//! using earcutr triangulation and nalgebra for plane projection.

pub mod error;
pub mod export;
pub mod geometry_data;
pub mod legend;
pub mod processors;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use error::{Error, Result};
pub use export::{DrawGroup, GeometryExport, TextureTheme};
pub use geometry_data::{GeometryData, GeometryKind, TextureValue};
pub use legend::{ColorMap, Legend};
pub use processors::{
    GeometryParser, LineParser, ParseContext, PointParser, SurfaceParser, TopologyParser,
};
pub use triangulation::{newell_normal, project_to_2d, triangulate_ring};
