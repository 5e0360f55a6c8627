//! Error types raised while generating accessor modules.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while generating or writing the accessor module.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodegenError {
    /// Listing the installed datasets failed.
    #[error("failed to list datasets in {path}")]
    ListDatasets {
        /// Output directory that was scanned.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Writing the generated module failed.
    #[error("failed to write generated module to {path}")]
    WriteModule {
        /// Target module path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
}
