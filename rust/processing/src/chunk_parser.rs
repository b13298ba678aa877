// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chunked parse driver
//!
//! Walks the city objects once in document order, hands every geometry entry
//! to the surface, line and point parsers and flushes their accumulators
//! every `chunk_size` objects. The LOD table, object colours and class colours
//! are shared by all parsers; surface colours belong to each parser.

use std::time::Instant;

use citylite_core::CityModel;
use citylite_geometry::{
    ColorMap, GeometryExport, GeometryParser, Legend, ParseContext, TopologyParser,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ParserConfig, DEFAULT_CHUNK_SIZE};

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    Running,
    Complete,
}

/// One flushed batch of a single parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkData {
    /// Flat xyz per vertex record
    pub vertices: Vec<f32>,
    pub attributes: GeometryExport,
    pub lods: Vec<String>,
    pub object_colors: ColorMap,
    pub surface_colors: ColorMap,
    pub class_colors: ColorMap,
}

impl ChunkData {
    /// Number of vertex records in the chunk
    #[inline]
    pub fn count(&self) -> usize {
        self.attributes.count()
    }
}

pub struct ChunkParser {
    parsers: [TopologyParser; 3],
    /// Parse-wide legend; surface colours are filled in on completion
    legend: Legend,
    chunk_size: usize,
    state: ParserState,
}

impl ChunkParser {
    pub fn new() -> Self {
        Self {
            parsers: TopologyParser::all(),
            legend: Legend::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            state: ParserState::Idle,
        }
    }

    /// Driver flushing every `chunk_size` objects (at least 1)
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            ..Self::new()
        }
    }

    /// Apply chunk size, colours and LOD table from `config`.
    ///
    /// Fields left out keep their current value; a zero chunk size is ignored.
    pub fn apply_config(&mut self, config: &ParserConfig) {
        match config.effective_chunk_size() {
            Some(chunk_size) => self.chunk_size = chunk_size,
            None if config.chunk_size.is_some() => {
                warn!(chunk_size = self.chunk_size, "Ignoring zero chunk size");
            }
            None => {}
        }
        if let Some(object_colors) = &config.object_colors {
            self.legend.object_colors = object_colors.clone();
        }
        if let Some(class_colors) = &config.class_colors {
            self.legend.class_colors = class_colors.clone();
        }
        if let Some(lods) = &config.lods {
            self.legend.lods = lods.clone();
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[inline]
    pub fn state(&self) -> ParserState {
        self.state
    }

    #[inline]
    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    /// Parse every object of `model`.
    ///
    /// `on_chunk` receives one [`ChunkData`] per non-empty parser at every
    /// flush; `on_complete` runs once after the final flush. Returns the
    /// legend of the whole parse. A driver parses once; later calls only log
    /// a warning and return the current legend.
    pub fn parse<F, C>(&mut self, model: &CityModel, mut on_chunk: F, on_complete: C) -> Legend
    where
        F: FnMut(ChunkData),
        C: FnOnce(),
    {
        if self.state != ParserState::Idle {
            warn!(state = ?self.state, "Parser already used, ignoring parse request");
            return self.legend.clone();
        }
        self.state = ParserState::Running;

        let start = Instant::now();
        let ctx = ParseContext::new(model);
        info!(
            objects = model.object_count(),
            vertices = ctx.vertices.len(),
            chunk_size = self.chunk_size,
            "Starting chunked parse"
        );

        let mut processed = 0usize;
        let mut chunks = 0usize;

        for (object_id, object) in &model.city_objects {
            for (geometry_index, geometry) in object.geometry.iter().enumerate() {
                for parser in &mut self.parsers {
                    parser.legend_mut().exchange_shared(&mut self.legend);
                    parser.parse_geometry(&ctx, geometry, object_id, geometry_index);
                    parser.legend_mut().exchange_shared(&mut self.legend);
                }
            }

            processed += 1;
            if processed >= self.chunk_size {
                chunks += self.flush(&ctx, &mut on_chunk);
                processed = 0;
            }
        }

        chunks += self.flush(&ctx, &mut on_chunk);

        // Surface colours of the first parser become the reported legend
        if let Some(first) = self.parsers.first() {
            self.legend.surface_colors = first.legend().surface_colors.clone();
        }
        self.state = ParserState::Complete;

        info!(
            chunks,
            lods = self.legend.lods.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chunked parse complete"
        );

        on_complete();
        self.legend.clone()
    }

    /// Hand every non-empty accumulator to `on_chunk`; returns the number of
    /// chunks emitted
    fn flush<F: FnMut(ChunkData)>(&mut self, ctx: &ParseContext<'_>, on_chunk: &mut F) -> usize {
        let mut emitted = 0;

        for parser in &mut self.parsers {
            if parser.geom_data().is_empty() {
                continue;
            }

            let data = parser.take_geom_data();
            let vertices = data.resolve_vertices(&ctx.vertices);
            let attributes = data.into_export();

            debug!(
                geometry_type = ?attributes.geometry_type,
                count = attributes.count(),
                "Flushing chunk"
            );

            on_chunk(ChunkData {
                vertices,
                attributes,
                lods: self.legend.lods.clone(),
                object_colors: self.legend.object_colors.clone(),
                surface_colors: parser.legend().surface_colors.clone(),
                class_colors: self.legend.class_colors.clone(),
            });
            emitted += 1;
        }

        emitted
    }
}

impl Default for ChunkParser {
    fn default() -> Self {
        Self::new()
    }
}
