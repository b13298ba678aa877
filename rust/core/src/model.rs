// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! City model document types
//!
//! Mirrors the parts of CityJSON the geometry pipeline consumes. Unknown keys
//! are ignored so extension properties never block loading.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::nested::Nested;
use crate::{Error, Result};

/// A complete city model: objects plus the shared vertex pool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CityModel {
    /// Document type ("CityJSON" or "CityJSONFeature")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Objects keyed by id, in document order
    #[serde(rename = "CityObjects", default)]
    pub city_objects: IndexMap<String, CityObject>,
    /// Shared vertex pool; integer coordinates when `transform` is present
    #[serde(default)]
    pub vertices: Vec<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<Appearance>,
}

impl CityModel {
    /// Parse a model from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let model: CityModel = serde_json::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    /// Parse a model from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let model: CityModel = serde_json::from_slice(bytes)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        match self.kind.as_deref() {
            None | Some("CityJSON") | Some("CityJSONFeature") => Ok(()),
            Some(other) => Err(Error::InvalidDocument(format!(
                "unsupported document type '{}'",
                other
            ))),
        }
    }

    /// Position of an object in the collection, if present
    #[inline]
    pub fn object_index(&self, object_id: &str) -> Option<usize> {
        self.city_objects.get_index_of(object_id)
    }

    /// Number of objects in the collection
    #[inline]
    pub fn object_count(&self) -> usize {
        self.city_objects.len()
    }

    /// Vertex pool in real-world coordinates.
    ///
    /// Borrows the pool when there is no transform.
    pub fn transformed_vertices(&self) -> Cow<'_, [[f64; 3]]> {
        match &self.transform {
            Some(transform) if !transform.is_identity() => Cow::Owned(
                self.vertices
                    .iter()
                    .map(|v| transform.apply(*v))
                    .collect(),
            ),
            _ => Cow::Borrowed(&self.vertices),
        }
    }

    /// Texture coordinate by index into `appearance.vertices-texture`
    #[inline]
    pub fn texture_vertex(&self, index: usize) -> Option<[f64; 2]> {
        self.appearance
            .as_ref()
            .and_then(|a| a.vertices_texture.get(index))
            .copied()
    }
}

/// Vertex compression transform: `real = stored * scale + translate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: [f64; 3],
    pub translate: [f64; 3],
}

impl Transform {
    #[inline]
    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        [
            v[0] * self.scale[0] + self.translate[0],
            v[1] * self.scale[1] + self.translate[1],
            v[2] * self.scale[2] + self.translate[2],
        ]
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.scale == [1.0, 1.0, 1.0] && self.translate == [0.0, 0.0, 0.0]
    }
}

/// Appearance section; only texture coordinates are consumed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Appearance {
    #[serde(rename = "vertices-texture", default)]
    pub vertices_texture: Vec<[f64; 2]>,
}

/// A single city object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CityObject {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub geometry: Vec<Geometry>,
}

/// Declared topology of a geometry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    MultiPoint,
    MultiLineString,
    MultiSurface,
    CompositeSurface,
    Solid,
    MultiSolid,
    CompositeSolid,
    GeometryInstance,
    #[serde(other)]
    Unknown,
}

impl GeometryType {
    /// Container levels above the surface list, or `None` for non-surface types
    #[inline]
    pub fn surface_depth(self) -> Option<usize> {
        match self {
            GeometryType::MultiSurface | GeometryType::CompositeSurface => Some(0),
            GeometryType::Solid => Some(1),
            GeometryType::MultiSolid | GeometryType::CompositeSolid => Some(2),
            _ => None,
        }
    }
}

/// Level-of-detail tag, normalised to text ("2", "2.2", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Lod(String);

impl Lod {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Lod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Lod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Older files store the LOD as a number
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawLod {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawLod::deserialize(deserializer)? {
            RawLod::Text(text) => Lod(text),
            RawLod::Number(number) => Lod(number.to_string()),
        })
    }
}

/// One geometry entry of a city object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: GeometryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lod: Option<Lod>,
    #[serde(default)]
    pub boundaries: Vec<Nested<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantics: Option<Semantics>,
    /// Material references keyed by theme
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub material: IndexMap<String, MaterialReference>,
    /// Texture references keyed by theme
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub texture: IndexMap<String, TextureReference>,
}

/// Semantic surfaces plus the per-boundary slots pointing into them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Semantics {
    #[serde(default)]
    pub surfaces: Vec<SemanticSurface>,
    #[serde(default)]
    pub values: Option<Vec<Nested<Option<u32>>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticSurface {
    #[serde(rename = "type")]
    pub surface_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

/// Material of a theme: per-surface `values` or a single `value`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Nested<Option<u32>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

/// Texture of a theme: per surface, per ring `[texture, uv, uv, ...]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureReference {
    #[serde(default)]
    pub values: Vec<Nested<Option<u32>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "type": "CityJSON",
        "version": "2.0",
        "transform": { "scale": [0.5, 0.5, 1.0], "translate": [100.0, 200.0, 0.0] },
        "CityObjects": {
            "b": { "type": "Building", "geometry": [
                { "type": "Solid", "lod": 2,
                  "boundaries": [[[[0, 1, 2]]]],
                  "semantics": { "surfaces": [{ "type": "WallSurface" }], "values": [[0]] } }
            ] },
            "a": { "type": "Road" }
        },
        "vertices": [[0, 0, 0], [2, 0, 0], [2, 2, 1]]
    }"#;

    #[test]
    fn test_objects_keep_document_order() {
        let model = CityModel::from_json(MINIMAL).unwrap();
        let ids: Vec<&str> = model.city_objects.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(model.object_index("a"), Some(1));
        assert_eq!(model.object_index("missing"), None);
    }

    #[test]
    fn test_numeric_lod_is_normalised() {
        let model = CityModel::from_json(MINIMAL).unwrap();
        let geometry = &model.city_objects["b"].geometry[0];
        assert_eq!(geometry.lod.as_ref().map(Lod::as_str), Some("2"));
        assert_eq!(geometry.kind, GeometryType::Solid);
        assert_eq!(geometry.kind.surface_depth(), Some(1));
    }

    #[test]
    fn test_transform_applied_to_pool() {
        let model = CityModel::from_json(MINIMAL).unwrap();
        let pool = model.transformed_vertices();
        assert_eq!(pool[1], [101.0, 200.0, 0.0]);
        assert_eq!(pool[2], [101.0, 201.0, 1.0]);
    }

    #[test]
    fn test_pool_borrowed_without_transform() {
        let model = CityModel {
            vertices: vec![[1.0, 2.0, 3.0]],
            ..Default::default()
        };
        assert!(matches!(model.transformed_vertices(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unknown_geometry_type() {
        let geometry: Geometry =
            serde_json::from_str(r#"{ "type": "Tetrahedron", "boundaries": [] }"#).unwrap();
        assert_eq!(geometry.kind, GeometryType::Unknown);
        assert_eq!(geometry.kind.surface_depth(), None);
    }

    #[test]
    fn test_rejects_foreign_document_type() {
        let result = CityModel::from_json(r#"{ "type": "FeatureCollection" }"#);
        assert!(matches!(result, Err(Error::InvalidDocument(_))));
    }
}
