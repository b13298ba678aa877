// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chunked parse driver integration tests

use citylite_core::CityModel;
use citylite_geometry::GeometryKind;
use citylite_processing::{parse_document, parse_documents, ChunkData, ChunkParser, ParserConfig};
use serde_json::{json, Map, Value};

fn document(city_objects: Map<String, Value>, vertices: Value) -> CityModel {
    let doc = json!({
        "type": "CityJSON",
        "version": "1.1",
        "CityObjects": city_objects,
        "vertices": vertices
    });
    CityModel::from_json(&doc.to_string()).expect("valid test document")
}

/// `objects` buildings with one triangle each
fn triangle_city(objects: usize) -> CityModel {
    let mut city_objects = Map::new();
    for i in 0..objects {
        city_objects.insert(
            format!("building-{i}"),
            json!({
                "type": "Building",
                "geometry": [
                    { "type": "MultiSurface", "lod": "1", "boundaries": [[[0, 1, 2]]] }
                ]
            }),
        );
    }
    document(city_objects, json!([[0, 0, 0], [1, 0, 0], [1, 1, 0]]))
}

fn collect(parser: &mut ChunkParser, model: &CityModel) -> Vec<ChunkData> {
    let mut chunks = Vec::new();
    parser.parse(model, |chunk| chunks.push(chunk), || {});
    chunks
}

#[test]
fn test_three_chunks_plus_remainder() {
    let k = 5;
    let model = triangle_city(3 * k + 1);
    let mut parser = ChunkParser::with_chunk_size(k);

    let chunks = collect(&mut parser, &model);

    assert_eq!(chunks.len(), 4);
    let counts: Vec<usize> = chunks.iter().map(ChunkData::count).collect();
    assert_eq!(counts, vec![15, 15, 15, 3]);
    assert_eq!(counts.iter().sum::<usize>(), (3 * k + 1) * 3);

    for chunk in &chunks {
        assert!(chunk.attributes.is_aligned());
        assert_eq!(chunk.vertices.len(), chunk.count() * 3);
    }
}

#[test]
fn test_exact_multiple_has_no_empty_final_chunk() {
    let model = triangle_city(10);
    let mut parser = ChunkParser::with_chunk_size(5);

    assert_eq!(collect(&mut parser, &model).len(), 2);
}

#[test]
fn test_object_ids_are_global() {
    let model = triangle_city(4);
    let mut parser = ChunkParser::with_chunk_size(2);

    let chunks = collect(&mut parser, &model);
    assert_eq!(chunks[0].attributes.object_ids, vec![0, 0, 0, 1, 1, 1]);
    assert_eq!(chunks[1].attributes.object_ids, vec![2, 2, 2, 3, 3, 3]);
    assert!(chunks[1].attributes.object_types.iter().all(|&t| t == 0));
}

#[test]
fn test_objects_without_geometry_count_toward_chunks() {
    let mut city_objects = Map::new();
    for i in 0..10 {
        let geometry = if i % 2 == 0 {
            json!([{ "type": "MultiSurface", "lod": "1", "boundaries": [[[0, 1, 2]]] }])
        } else {
            json!([])
        };
        city_objects.insert(format!("o{i}"), json!({ "type": "Building", "geometry": geometry }));
    }
    let model = document(city_objects, json!([[0, 0, 0], [1, 0, 0], [1, 1, 0]]));
    let mut parser = ChunkParser::with_chunk_size(2);

    let chunks = collect(&mut parser, &model);
    assert_eq!(chunks.len(), 5);
    assert!(chunks.iter().all(|c| c.count() == 3));
}

#[test]
fn test_one_chunk_per_topology() {
    let mut city_objects = Map::new();
    city_objects.insert(
        "tree".into(),
        json!({
            "type": "SolitaryVegetationObject",
            "geometry": [
                { "type": "MultiSurface", "lod": "2", "boundaries": [[[0, 1, 2]]] },
                { "type": "MultiLineString", "lod": "1", "boundaries": [[0, 1, 2]] },
                { "type": "MultiPoint", "lod": "0", "boundaries": [2] }
            ]
        }),
    );
    let model = document(city_objects, json!([[0, 0, 0], [1, 0, 0], [1, 1, 0]]));
    let mut parser = ChunkParser::new();

    let chunks = collect(&mut parser, &model);
    let kinds: Vec<GeometryKind> = chunks.iter().map(|c| c.attributes.geometry_type).collect();
    assert_eq!(
        kinds,
        vec![GeometryKind::Triangles, GeometryKind::Lines, GeometryKind::Points]
    );

    assert_eq!(chunks[0].attributes.geometry_ids, vec![0, 0, 0]);
    assert_eq!(chunks[1].attributes.geometry_ids, vec![1, 1, 1, 1]);
    assert_eq!(chunks[2].attributes.geometry_ids, vec![2]);

    // Shared LOD table across parsers
    assert_eq!(chunks[2].lods, vec!["2", "1", "0"]);
    assert_eq!(chunks[0].attributes.lod_ids, vec![0, 0, 0]);
    assert_eq!(chunks[1].attributes.lod_ids, vec![1; 4]);
    assert_eq!(chunks[2].attributes.lod_ids, vec![2]);
}

#[test]
fn test_wall_quad_end_to_end() {
    let mut city_objects = Map::new();
    city_objects.insert(
        "wall".into(),
        json!({
            "type": "Building",
            "geometry": [{
                "type": "MultiSurface",
                "lod": "2",
                "boundaries": [[[0, 1, 2, 3]]],
                "semantics": { "surfaces": [{ "type": "WallSurface" }], "values": [0] }
            }]
        }),
    );
    let model = document(city_objects, json!([[0, 0, 0], [10, 0, 0], [10, 0, 3], [0, 0, 3]]));
    let mut parser = ChunkParser::with_chunk_size(1);

    let mut chunks = Vec::new();
    let mut completions = 0;
    let legend = parser.parse(&model, |chunk| chunks.push(chunk), || completions += 1);

    assert_eq!(completions, 1);
    assert_eq!(chunks.len(), 1);

    let chunk = &chunks[0];
    assert_eq!(chunk.count(), 6);
    assert!(chunk.attributes.lod_ids.iter().all(|&l| l == 0));
    assert!(chunk.attributes.semantic_surfaces.iter().all(|&s| s == 0));
    assert_eq!(chunk.lods, vec!["2"]);
    assert!(chunk.surface_colors.contains_key("WallSurface"));
    assert!(chunk.vertices.chunks(3).all(|v| v[1] == 0.0));

    assert_eq!(legend.lods, vec!["2"]);
    assert_eq!(legend.surface_colors.get_index_of("WallSurface"), Some(0));
}

#[test]
fn test_seeded_legend_keeps_indices() {
    let first = triangle_city(2);
    let legend = parse_document(&first, &ParserConfig::default()).legend;

    let mut city_objects = Map::new();
    city_objects.insert(
        "road".into(),
        json!({
            "type": "Road",
            "geometry": [{ "type": "MultiSurface", "lod": "0", "boundaries": [[[0, 1, 2]]] }]
        }),
    );
    city_objects.insert(
        "house".into(),
        json!({
            "type": "Building",
            "geometry": [{ "type": "MultiSurface", "lod": "1", "boundaries": [[[0, 1, 2]]] }]
        }),
    );
    let second = document(city_objects, json!([[0, 0, 0], [1, 0, 0], [1, 1, 0]]));

    let result = parse_document(&second, &ParserConfig::seeded_from(&legend));
    let attributes = &result.chunks[0].attributes;

    // Building and LOD "1" keep index 0 from the first document
    assert_eq!(attributes.object_types, vec![1, 1, 1, 0, 0, 0]);
    assert_eq!(attributes.lod_ids, vec![1, 1, 1, 0, 0, 0]);
    assert_eq!(result.legend.lods, vec!["1", "0"]);
}

#[test]
fn test_transformed_vertices_in_chunk() {
    let doc = json!({
        "type": "CityJSON",
        "CityObjects": {
            "a": {
                "type": "Building",
                "geometry": [{ "type": "MultiSurface", "lod": "1", "boundaries": [[[0, 1, 2]]] }]
            }
        },
        "vertices": [[0, 0, 0], [1000, 0, 0], [1000, 1000, 0]],
        "transform": { "scale": [0.001, 0.001, 0.001], "translate": [5.0, 0.0, 0.0] }
    });
    let model = CityModel::from_json(&doc.to_string()).unwrap();
    let result = parse_document(&model, &ParserConfig::default());

    assert_eq!(result.chunks[0].vertices, vec![5.0, 0.0, 0.0, 6.0, 0.0, 0.0, 6.0, 1.0, 0.0]);
}

#[test]
fn test_parse_documents_in_parallel() {
    let models = vec![triangle_city(3), triangle_city(7), triangle_city(0)];
    let results = parse_documents(&models, &ParserConfig::default().with_chunk_size(2));

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].chunks.len(), 2);
    assert_eq!(results[1].chunks.len(), 4);
    assert!(results[2].chunks.is_empty());
    assert_eq!(results[1].record_count(), 21);
}

#[test]
fn test_chunk_serializes_camel_case() {
    let mut parser = ChunkParser::new();
    let chunks = collect(&mut parser, &triangle_city(1));

    let json = serde_json::to_value(&chunks[0]).unwrap();
    assert!(json.get("objectColors").is_some());
    assert!(json.get("surfaceColors").is_some());
    assert_eq!(json["attributes"]["geometryType"], 2);
}
