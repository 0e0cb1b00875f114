// SPDX-License-Identifier: MIT
//
// Top-level error: terminal failures plus log setup failures.

use std::io;
use std::path::PathBuf;

use duxi_term::error::TermError;
use thiserror::Error;

/// Anything that ends the process with a non-zero status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Term(#[from] TermError),

    #[error("invalid DUXI_LOG_LEVEL: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot install log subscriber: {0}")]
    Subscriber(String),
}
