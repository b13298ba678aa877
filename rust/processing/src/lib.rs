// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityLite Processing
//!
//! Drives the topology parsers over a whole document, flushing vertex and
//! attribute buffers every few objects, and runs that driver on a blocking
//! tokio task so callers receive chunks as messages.

pub mod batch;
pub mod chunk_parser;
pub mod config;
pub mod error;
pub mod worker;

pub use batch::{parse_document, parse_documents, DocumentChunks};
pub use chunk_parser::{ChunkData, ChunkParser, ParserState};
pub use config::{ParserConfig, CHUNK_SIZE_ENV, DEFAULT_CHUNK_SIZE};
pub use error::{Result, WorkerError};
pub use worker::{ParserWorker, WorkerMessage, WorkerRequest};
