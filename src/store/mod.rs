pub mod poster_store;

pub use poster_store::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Failed to encode store for {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },
}
