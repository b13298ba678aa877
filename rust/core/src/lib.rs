// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CityLite Core
//!
//! Document model for CityJSON city models, deserialized with
//! [serde](https://docs.rs/serde).
//!
//! ## Overview
//!
//! - **City model**: objects in document order, a shared vertex pool, optional
//!   vertex transform and appearance (texture coordinates)
//! - **Geometry entries**: typed geometry kind, LOD tag, variable-depth
//!   boundaries plus semantics / material / texture sections keyed by theme
//! - **Nested arrays**: [`Nested`] models every variable-depth array and can be
//!   flattened level by level without copying
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use citylite_core::CityModel;
//!
//! let model = CityModel::from_json(&content)?;
//! for (id, object) in &model.city_objects {
//!     println!("{}: {} geometries", id, object.geometry.len());
//! }
//! ```

pub mod error;
pub mod model;
pub mod nested;

pub use error::{Error, Result};
pub use model::{
    Appearance, CityModel, CityObject, Geometry, GeometryType, Lod, MaterialReference, Semantics,
    SemanticSurface, TextureReference, Transform,
};
pub use nested::{flatten, Nested};
