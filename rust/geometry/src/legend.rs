// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LOD table and colour legends
//!
//! Attribute arrays store small integers; the legend maps them back to names.
//! The index of a name is its insertion position, so the maps are
//! insertion-ordered and only ever grow during a parse.

use std::hash::{Hash, Hasher};

use citylite_core::Lod;
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// Name to RGB colour, in assignment order
pub type ColorMap = IndexMap<String, u32>;

/// Default colours of CityJSON object types
const OBJECT_PALETTE: &[(&str, u32)] = &[
    ("Building", 0x7497df),
    ("BuildingPart", 0x7497df),
    ("BuildingInstallation", 0x7497df),
    ("Bridge", 0x999999),
    ("BridgePart", 0x999999),
    ("BridgeInstallation", 0x999999),
    ("BridgeConstructionElement", 0x999999),
    ("CityObjectGroup", 0xffffb3),
    ("CityFurniture", 0x7497df),
    ("GenericCityObject", 0x7497df),
    ("LandUse", 0xffffb3),
    ("PlantCover", 0x39ac39),
    ("Railway", 0x000000),
    ("Road", 0x999999),
    ("SolitaryVegetationObject", 0x39ac39),
    ("TINRelief", 0xffdb99),
    ("TransportSquare", 0x999999),
    ("Tunnel", 0x999999),
    ("TunnelPart", 0x999999),
    ("TunnelInstallation", 0x999999),
    ("WaterBody", 0x4da6ff),
];

/// Default colours of semantic surface types
const SURFACE_PALETTE: &[(&str, u32)] = &[
    ("GroundSurface", 0x999999),
    ("WallSurface", 0xffffff),
    ("RoofSurface", 0xff0000),
    ("TrafficArea", 0x6e6e6e),
    ("AuxiliaryTrafficArea", 0x2c8200),
    ("Window", 0x0059ff),
    ("Door", 0x640000),
    ("ClosureSurface", 0xdddddd),
    ("OuterCeilingSurface", 0x3b3b3b),
    ("OuterFloorSurface", 0x3b3b3b),
    ("WaterSurface", 0x4da6ff),
    ("WaterGroundSurface", 0x999999),
    ("WaterClosureSurface", 0xdddddd),
];

/// Colour for a name: palette entry when known, otherwise derived from a hash
pub fn color_for(name: &str) -> u32 {
    OBJECT_PALETTE
        .iter()
        .chain(SURFACE_PALETTE)
        .find(|(known, _)| *known == name)
        .map(|&(_, color)| color)
        .unwrap_or_else(|| {
            let mut hasher = FxHasher::default();
            name.hash(&mut hasher);
            (hasher.finish() & 0x00ff_ffff) as u32
        })
}

/// Object type colours for every known CityJSON type
pub fn default_object_colors() -> ColorMap {
    OBJECT_PALETTE
        .iter()
        .map(|&(name, color)| (name.to_owned(), color))
        .collect()
}

/// Index of `name` in `map`, assigning a colour when it is new
fn color_index(map: &mut ColorMap, name: &str) -> i32 {
    if let Some(index) = map.get_index_of(name) {
        return index as i32;
    }
    map.insert_full(name.to_owned(), color_for(name)).0 as i32
}

/// LOD table plus object, surface and class colour legends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Legend {
    pub lods: Vec<String>,
    pub object_colors: ColorMap,
    pub surface_colors: ColorMap,
    pub class_colors: ColorMap,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `lod` in the LOD table, appending it when new; -1 without LOD
    pub fn lod_index(&mut self, lod: Option<&Lod>) -> i32 {
        let Some(lod) = lod else {
            return -1;
        };
        match self.lods.iter().position(|known| known == lod.as_str()) {
            Some(index) => index as i32,
            None => {
                self.lods.push(lod.as_str().to_owned());
                (self.lods.len() - 1) as i32
            }
        }
    }

    #[inline]
    pub fn object_type_index(&mut self, object_type: &str) -> i32 {
        color_index(&mut self.object_colors, object_type)
    }

    #[inline]
    pub fn surface_type_index(&mut self, surface_type: &str) -> i32 {
        color_index(&mut self.surface_colors, surface_type)
    }

    #[inline]
    pub fn class_index(&mut self, class: &str) -> i32 {
        color_index(&mut self.class_colors, class)
    }

    /// Swap the parse-wide parts (LOD table, object and class colours) with
    /// `other`. Surface colours are left in place.
    pub fn exchange_shared(&mut self, other: &mut Legend) {
        std::mem::swap(&mut self.lods, &mut other.lods);
        std::mem::swap(&mut self.object_colors, &mut other.object_colors);
        std::mem::swap(&mut self.class_colors, &mut other.class_colors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lod_index_assigned_in_order() {
        let mut legend = Legend::new();
        assert_eq!(legend.lod_index(Some(&Lod::new("2"))), 0);
        assert_eq!(legend.lod_index(Some(&Lod::new("1"))), 1);
        assert_eq!(legend.lod_index(Some(&Lod::new("2"))), 0);
        assert_eq!(legend.lod_index(None), -1);
        assert_eq!(legend.lods, vec!["2", "1"]);
    }

    #[test]
    fn test_seeded_colors_keep_their_index() {
        let mut legend = Legend {
            object_colors: default_object_colors(),
            ..Default::default()
        };
        assert_eq!(legend.object_type_index("Building"), 0);
        assert_eq!(legend.object_type_index("WaterBody"), 20);

        let fresh = legend.object_type_index("Hedge");
        assert_eq!(fresh, OBJECT_PALETTE.len() as i32);
        assert_eq!(legend.object_colors["Hedge"], color_for("Hedge"));
    }

    #[test]
    fn test_palette_and_derived_colors() {
        assert_eq!(color_for("RoofSurface"), 0xff0000);
        assert_eq!(color_for("Custom"), color_for("Custom"));
        assert!(color_for("Custom") <= 0xffffff);
    }

    #[test]
    fn test_exchange_shared_leaves_surface_colors() {
        let mut shared = Legend::new();
        shared.lod_index(Some(&Lod::new("1")));
        shared.class_index("roof");

        let mut parser = Legend::new();
        parser.surface_type_index("WallSurface");

        parser.exchange_shared(&mut shared);
        assert_eq!(parser.lods, vec!["1"]);
        assert!(parser.class_colors.contains_key("roof"));
        assert!(parser.surface_colors.contains_key("WallSurface"));
        assert!(shared.lods.is_empty());

        parser.exchange_shared(&mut shared);
        assert_eq!(shared.lods, vec!["1"]);
        assert!(parser.lods.is_empty());
    }
}
