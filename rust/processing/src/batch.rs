// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-document parsing.
//!
//! Each document gets its own driver, so documents parse in parallel on the
//! rayon pool while chunks within one document stay in order.

use citylite_core::CityModel;
use citylite_geometry::Legend;
use rayon::prelude::*;
use tracing::info;

use crate::chunk_parser::{ChunkData, ChunkParser};
use crate::config::ParserConfig;

/// All chunks of one document plus the legend of its parse
#[derive(Debug, Clone)]
pub struct DocumentChunks {
    pub chunks: Vec<ChunkData>,
    pub legend: Legend,
}

impl DocumentChunks {
    /// Vertex records across every chunk
    pub fn record_count(&self) -> usize {
        self.chunks.iter().map(ChunkData::count).sum()
    }
}

/// Parse one document to completion with `config`
pub fn parse_document(model: &CityModel, config: &ParserConfig) -> DocumentChunks {
    let mut parser = ChunkParser::new();
    parser.apply_config(config);

    let mut chunks = Vec::new();
    let legend = parser.parse(model, |chunk| chunks.push(chunk), || {});
    DocumentChunks { chunks, legend }
}

/// Parse independent documents in parallel; results keep input order.
///
/// Every document starts from the same `config`, so legends are not shared
/// between them.
pub fn parse_documents(models: &[CityModel], config: &ParserConfig) -> Vec<DocumentChunks> {
    info!(documents = models.len(), "Parsing documents in parallel");
    models
        .par_iter()
        .map(|model| parse_document(model, config))
        .collect()
}
