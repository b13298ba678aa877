// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background parse worker.
//!
//! The driver runs on a blocking tokio task. Requests go in over one
//! unbounded channel and chunks come back over another, so the caller's
//! async context never blocks on geometry work. Vertex buffers are moved into
//! the messages, never copied.

use citylite_core::CityModel;
use citylite_geometry::Legend;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::chunk_parser::{ChunkData, ChunkParser};
use crate::config::ParserConfig;
use crate::error::{Result, WorkerError};

/// Request sent to the worker
#[derive(Debug)]
pub enum WorkerRequest {
    /// Optional; only honoured before `Parse`
    Configure(ParserConfig),
    /// Parse a document; the worker stops afterwards
    Parse(Box<CityModel>),
}

/// Message emitted by the worker
#[derive(Debug)]
pub enum WorkerMessage {
    ChunkLoaded(Box<ChunkData>),
    /// Every chunk has been sent
    Done,
}

pub struct ParserWorker {
    requests: mpsc::UnboundedSender<WorkerRequest>,
    messages: mpsc::UnboundedReceiver<WorkerMessage>,
    handle: JoinHandle<Result<Legend>>,
}

impl ParserWorker {
    /// Start a worker on the blocking thread pool of the current runtime
    pub fn spawn() -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        let handle = tokio::task::spawn_blocking(move || run_worker(request_rx, message_tx));

        Self {
            requests: request_tx,
            messages: message_rx,
            handle,
        }
    }

    pub fn configure(&self, config: ParserConfig) -> Result<()> {
        self.send(WorkerRequest::Configure(config))
    }

    pub fn parse(&self, model: CityModel) -> Result<()> {
        self.send(WorkerRequest::Parse(Box::new(model)))
    }

    pub fn send(&self, request: WorkerRequest) -> Result<()> {
        self.requests.send(request).map_err(|_| WorkerError::Closed)
    }

    /// Next message; `None` once the worker has stopped and every message
    /// has been received
    pub async fn recv(&mut self) -> Option<WorkerMessage> {
        self.messages.recv().await
    }

    /// Wait for the worker to stop and return the legend of its parse.
    ///
    /// Undelivered messages are discarded.
    pub async fn join(self) -> Result<Legend> {
        let ParserWorker {
            requests, handle, ..
        } = self;
        drop(requests);
        handle.await?
    }

    /// Parse `model` on a fresh worker and collect every chunk
    pub async fn run(config: ParserConfig, model: CityModel) -> Result<(Vec<ChunkData>, Legend)> {
        let mut worker = ParserWorker::spawn();
        worker.configure(config)?;
        worker.parse(model)?;

        let mut chunks = Vec::new();
        while let Some(message) = worker.recv().await {
            match message {
                WorkerMessage::ChunkLoaded(chunk) => chunks.push(*chunk),
                WorkerMessage::Done => break,
            }
        }

        let legend = worker.join().await?;
        Ok((chunks, legend))
    }
}

fn run_worker(
    mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
    messages: mpsc::UnboundedSender<WorkerMessage>,
) -> Result<Legend> {
    let mut parser = ChunkParser::new();

    while let Some(request) = requests.blocking_recv() {
        match request {
            WorkerRequest::Configure(config) => parser.apply_config(&config),
            WorkerRequest::Parse(model) => {
                let legend = parser.parse(
                    &model,
                    |chunk| {
                        if messages.send(WorkerMessage::ChunkLoaded(Box::new(chunk))).is_err() {
                            debug!("Chunk receiver dropped");
                        }
                    },
                    || {
                        let _ = messages.send(WorkerMessage::Done);
                    },
                );
                return Ok(legend);
            }
        }
    }

    Err(WorkerError::NoDocument)
}
