use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnforcerError {
    #[error("failed to set mode {mode:#o} on {path:?}: {source}")]
    SetMode {
        path: PathBuf,
        mode: u32,
        source: std::io::Error,
    },
}
