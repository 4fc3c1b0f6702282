use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Not a weft metadata blob (bad magic)")]
    BadMagic,

    #[error("Metadata header truncated: {len} bytes")]
    TruncatedHeader { len: usize },

    #[error("Unsupported metadata schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error("Decode error: {0}")]
    Decode(#[from] postcard::Error),
}

pub type MetadataResult<T> = Result<T, MetadataError>;
