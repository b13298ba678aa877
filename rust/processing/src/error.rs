// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the parse worker

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Worker channel closed")]
    Closed,

    #[error("Worker stopped before receiving a document")]
    NoDocument,

    #[error("Join error")]
    Join(#[from] tokio::task::JoinError),
}
