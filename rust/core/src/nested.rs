// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Variable-depth arrays
//!
//! CityJSON nests boundaries (and the semantic, material and texture values
//! aligned with them) one level deeper per topological container: rings in
//! surfaces, surfaces in shells, shells in solids. [`Nested`] keeps that shape
//! as-is and [`flatten`] removes container levels by borrowing.

use serde::{Deserialize, Serialize};

/// A value or a list of nested values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested<T> {
    Value(T),
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// Get the children if this is a list
    #[inline]
    pub fn as_list(&self) -> Option<&[Nested<T>]> {
        match self {
            Nested::List(items) => Some(items),
            Nested::Value(_) => None,
        }
    }

    /// Get the leaf value if this is not a list
    #[inline]
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Nested::Value(value) => Some(value),
            Nested::List(_) => None,
        }
    }

    /// Get child `index` of a list
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Nested<T>> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Iterate over the direct leaf values of a list, skipping nested lists
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.as_list()
            .unwrap_or(&[])
            .iter()
            .filter_map(Nested::as_value)
    }
}

impl<T: Copy> Nested<T> {
    /// Collect the direct leaf values of a list
    pub fn to_vec(&self) -> Vec<T> {
        self.values().copied().collect()
    }
}

/// Flatten `items` by `depth` container levels.
///
/// Lists at the top `depth` levels are spliced into their parent; leaf values
/// met before `depth` is exhausted stay where they are.
pub fn flatten<T>(items: &[Nested<T>], depth: usize) -> Vec<&Nested<T>> {
    let mut out = Vec::with_capacity(items.len());
    flatten_into(items, depth, &mut out);
    out
}

fn flatten_into<'a, T>(items: &'a [Nested<T>], depth: usize, out: &mut Vec<&'a Nested<T>>) {
    for item in items {
        match item {
            Nested::List(children) if depth > 0 => flatten_into(children, depth - 1, out),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(ids: &[u32]) -> Nested<u32> {
        Nested::List(ids.iter().map(|&i| Nested::Value(i)).collect())
    }

    #[test]
    fn test_deserialize_mixed_depth() {
        let parsed: Vec<Nested<Option<u32>>> = serde_json::from_str("[0, null, [1, 2]]").unwrap();
        assert_eq!(parsed[0], Nested::Value(Some(0)));
        assert_eq!(parsed[1], Nested::Value(None));
        assert_eq!(parsed[2].to_vec(), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_flatten_zero_depth_is_identity() {
        let items = vec![ring(&[0, 1, 2]), ring(&[3, 4, 5])];
        let flat = flatten(&items, 0);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[1].to_vec(), vec![3, 4, 5]);
    }

    #[test]
    fn test_flatten_composite_shells_in_order() {
        // Shells [[A, B], [C]] flatten to [A, B, C]
        let a = Nested::List(vec![ring(&[0, 1, 2])]);
        let b = Nested::List(vec![ring(&[3, 4, 5])]);
        let c = Nested::List(vec![ring(&[6, 7, 8])]);
        let items = vec![
            Nested::List(vec![a.clone(), b.clone()]),
            Nested::List(vec![c.clone()]),
        ];

        let flat = flatten(&items, 1);
        assert_eq!(flat, vec![&a, &b, &c]);
    }

    #[test]
    fn test_flatten_two_levels() {
        let items: Vec<Nested<u32>> =
            serde_json::from_str("[[[[[0,1,2]]], [[[3,4,5]]]], [[[[6,7,8]]]]]").unwrap();
        let flat = flatten(&items, 2);
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[2].get(0).unwrap().to_vec(), vec![6, 7, 8]);
    }

    #[test]
    fn test_flatten_keeps_leaves_in_place() {
        let items: Vec<Nested<Option<u32>>> = serde_json::from_str("[[0, 1], null, [2]]").unwrap();
        let flat = flatten(&items, 1);
        let values: Vec<_> = flat.iter().map(|n| n.as_value().copied()).collect();
        assert_eq!(values, vec![Some(Some(0)), Some(Some(1)), Some(None), Some(Some(2))]);
    }
}
