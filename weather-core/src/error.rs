use std::{io, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

/// Why a single weather lookup failed. Never leaves the provider: `fetch`
/// turns it into an invalid record after logging it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("forecast response is missing day {0}")]
    MissingForecastDay(usize),
}

/// City list file errors. These propagate: the app cannot run without a known
/// city list.
#[derive(Debug, Error)]
pub enum CityListError {
    #[error("failed to read city list {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write city list {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
