// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark of the chunked parse driver on a synthetic city.
//!
//! Run with: cargo bench -p citylite-processing --bench chunking

use citylite_core::CityModel;
use citylite_processing::ChunkParser;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Map, Value};

/// Grid of box-shaped buildings, each a Solid of six quads
fn generate_city(buildings: usize) -> CityModel {
    let mut vertices: Vec<Value> = Vec::with_capacity(buildings * 8);
    let mut city_objects = Map::new();

    for i in 0..buildings {
        let x = (i % 100) as f64 * 20.0;
        let y = (i / 100) as f64 * 20.0;
        let base = (i * 8) as u32;

        for &(dx, dy, z) in &[
            (0.0, 0.0, 0.0),
            (10.0, 0.0, 0.0),
            (10.0, 10.0, 0.0),
            (0.0, 10.0, 0.0),
            (0.0, 0.0, 12.0),
            (10.0, 0.0, 12.0),
            (10.0, 10.0, 12.0),
            (0.0, 10.0, 12.0),
        ] {
            vertices.push(json!([x + dx, y + dy, z]));
        }

        let quad = |a: u32, b: u32, c: u32, d: u32| json!([[base + a, base + b, base + c, base + d]]);
        city_objects.insert(
            format!("building-{i}"),
            json!({
                "type": "Building",
                "geometry": [{
                    "type": "Solid",
                    "lod": "2",
                    "boundaries": [[
                        quad(0, 3, 2, 1),
                        quad(4, 5, 6, 7),
                        quad(0, 1, 5, 4),
                        quad(1, 2, 6, 5),
                        quad(2, 3, 7, 6),
                        quad(3, 0, 4, 7)
                    ]],
                    "semantics": {
                        "surfaces": [
                            { "type": "GroundSurface" },
                            { "type": "RoofSurface" },
                            { "type": "WallSurface" }
                        ],
                        "values": [[0, 1, 2, 2, 2, 2]]
                    }
                }]
            }),
        );
    }

    let doc = json!({ "type": "CityJSON", "CityObjects": city_objects, "vertices": vertices });
    CityModel::from_json(&doc.to_string()).expect("valid generated document")
}

fn bench_chunked_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunked_parse");

    for &buildings in &[100usize, 1000, 5000] {
        let model = generate_city(buildings);
        group.throughput(Throughput::Elements(buildings as u64));

        for &chunk_size in &[100usize, 2000] {
            group.bench_with_input(
                BenchmarkId::new(format!("chunk_{}", chunk_size), buildings),
                &model,
                |b, model| {
                    b.iter(|| {
                        let mut parser = ChunkParser::with_chunk_size(chunk_size);
                        let mut records = 0usize;
                        parser.parse(model, |chunk| records += chunk.count(), || {});
                        black_box(records)
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_chunked_parse);
criterion_main!(benches);
