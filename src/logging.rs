// SPDX-License-Identifier: MIT
//
// Log setup.
//
// stdout is the screen and stderr shares the same terminal, so log lines
// only ever go to a file. Without `DUXI_LOG` no subscriber is installed and
// every tracing macro is a no-op.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::AppError;

/// Install the global file subscriber described by `config`, if any.
///
/// # Errors
///
/// [`AppError::LogFilter`] for an unparsable level directive,
/// [`AppError::LogFile`] if the file cannot be opened for appending, and
/// [`AppError::Subscriber`] if a global subscriber already exists.
pub fn init(config: &Config) -> Result<(), AppError> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let filter = EnvFilter::try_new(&config.log_level)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| AppError::LogFile {
            path: path.clone(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::Subscriber(e.to_string()))
}
