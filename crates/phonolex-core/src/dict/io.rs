//! Binary file formats: 4-byte magic, 1-byte version, bincode body.
//!
//! `load` accepts either the binary or the text format, detected by magic.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Bigram, DictError, Lexicon, LexiconEntry};

const LEXICON_MAGIC: &[u8; 4] = b"PLXL";
const BIGRAM_MAGIC: &[u8; 4] = b"PLXB";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 4 + 1;

/// Kind of a binary data file, by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Lexicon,
    Bigram,
}

/// Identify a binary data file. Returns `None` for text or unknown data.
pub fn detect(bytes: &[u8]) -> Option<FileKind> {
    match bytes.get(..4)? {
        m if m == LEXICON_MAGIC => Some(FileKind::Lexicon),
        m if m == BIGRAM_MAGIC => Some(FileKind::Bigram),
        _ => None,
    }
}

fn encode<T: Serialize>(magic: &[u8; 4], value: &T) -> Result<Vec<u8>, DictError> {
    let body = bincode::serialize(value).map_err(DictError::Serialize)?;
    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.extend_from_slice(magic);
    buf.push(VERSION);
    buf.extend_from_slice(&body);
    Ok(buf)
}

fn decode<T: DeserializeOwned>(magic: &[u8; 4], data: &[u8]) -> Result<T, DictError> {
    if data.len() < HEADER_SIZE {
        return Err(DictError::InvalidHeader);
    }
    if &data[..4] != magic {
        return Err(DictError::InvalidMagic);
    }
    if data[4] != VERSION {
        return Err(DictError::UnsupportedVersion(data[4]));
    }
    bincode::deserialize(&data[HEADER_SIZE..]).map_err(DictError::Deserialize)
}

/// Atomic write: write to .tmp then rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DictError> {
    let tmp = path.with_extension("tmp");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_text(bytes: Vec<u8>) -> Result<String, DictError> {
    String::from_utf8(bytes).map_err(|e| DictError::Parse {
        line: 0,
        reason: format!("not UTF-8 text: {e}"),
    })
}

impl Lexicon {
    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        encode(LEXICON_MAGIC, &self.entries)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        let entries: Vec<LexiconEntry> = decode(LEXICON_MAGIC, data)?;
        Ok(Self::from_entries(entries))
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        write_atomic(path, &self.to_bytes()?)
    }

    /// Open a binary lexicon.
    pub fn open(path: &Path) -> Result<Self, DictError> {
        Self::from_bytes(&fs::read(path)?)
    }

    /// Load a lexicon in either the binary or the text format.
    pub fn load(path: &Path) -> Result<Self, DictError> {
        let bytes = fs::read(path)?;
        match detect(&bytes) {
            Some(FileKind::Lexicon) => Self::from_bytes(&bytes),
            Some(FileKind::Bigram) => Err(DictError::InvalidMagic),
            None => Self::from_text(&read_text(bytes)?),
        }
    }
}

impl Bigram {
    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        encode(BIGRAM_MAGIC, self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        decode(BIGRAM_MAGIC, data)
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        write_atomic(path, &self.to_bytes()?)
    }

    /// Open a binary bigram file.
    pub fn open(path: &Path) -> Result<Self, DictError> {
        Self::from_bytes(&fs::read(path)?)
    }

    /// Load bigram counts in either the binary or the text format.
    pub fn load(path: &Path) -> Result<Self, DictError> {
        let bytes = fs::read(path)?;
        match detect(&bytes) {
            Some(FileKind::Bigram) => Self::from_bytes(&bytes),
            Some(FileKind::Lexicon) => Err(DictError::InvalidMagic),
            None => Self::from_text(&read_text(bytes)?),
        }
    }
}
