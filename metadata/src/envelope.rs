//! The binary envelope: header, then a postcard-encoded payload list.

use crate::{MetadataError, MetadataResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::mem::size_of;
use tracing::debug;

/// Magic bytes identifying a weft metadata blob.
pub const MAGIC: &[u8; 8] = b"WEFTMETA";

/// Envelope layout version.
pub const SCHEMA_VERSION: u32 = 1;

/// Total header size in bytes (magic + version).
pub const HEADER_SIZE: usize = MAGIC.len() + size_of::<u32>();

/// One encoded record, tagged with what it is and which version wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub kind: String,
    pub version: u32,
    pub bytes: Vec<u8>,
}

impl Payload {
    pub fn encode<T: Serialize>(kind: impl Into<String>, version: u32, value: &T) -> MetadataResult<Self> {
        Ok(Self {
            kind: kind.into(),
            version,
            bytes: postcard::to_allocvec(value)?,
        })
    }
}

/// Result of reading one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    Value(T),
    /// Written by a version this reader does not know.
    Skipped { kind: String, version: u32 },
}

impl<T> Decoded<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Decoded::Value(value) => Some(value),
            Decoded::Skipped { .. } => None,
        }
    }
}

/// An ordered list of payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    payloads: Vec<Payload>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, payload: Payload) {
        self.payloads.push(payload);
    }

    /// Encode `value` and append it.
    pub fn add<T: Serialize>(&mut self, kind: &str, version: u32, value: &T) -> MetadataResult<()> {
        self.payloads.push(Payload::encode(kind, version, value)?);
        Ok(())
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Decode every payload of `kind`. Payloads written with another
    /// version are reported as skipped.
    pub fn read<T: DeserializeOwned>(&self, kind: &str, supported: u32) -> MetadataResult<Vec<Decoded<T>>> {
        self.payloads
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| {
                if p.version != supported {
                    debug!(kind, version = p.version, supported, "skipping payload");
                    return Ok(Decoded::Skipped {
                        kind: p.kind.clone(),
                        version: p.version,
                    });
                }
                Ok(Decoded::Value(postcard::from_bytes(&p.bytes)?))
            })
            .collect()
    }

    /// Header followed by the payload list.
    pub fn to_bytes(&self) -> MetadataResult<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
        out.extend(postcard::to_allocvec(&self.payloads)?);
        Ok(out)
    }

    pub fn from_bytes(data: &[u8]) -> MetadataResult<Self> {
        let body = validate_blob(data)?;
        let payloads: Vec<Payload> = postcard::from_bytes(body)?;
        Ok(Self { payloads })
    }
}

/// Validates the blob header and returns the bytes after it.
pub fn validate_blob(data: &[u8]) -> MetadataResult<&[u8]> {
    if data.len() < HEADER_SIZE {
        return Err(MetadataError::TruncatedHeader { len: data.len() });
    }
    if &data[..MAGIC.len()] != MAGIC {
        return Err(MetadataError::BadMagic);
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&data[MAGIC.len()..HEADER_SIZE]);
    let found = u32::from_le_bytes(version);
    if found != SCHEMA_VERSION {
        return Err(MetadataError::UnsupportedSchema {
            found,
            expected: SCHEMA_VERSION,
        });
    }
    Ok(&data[HEADER_SIZE..])
}
