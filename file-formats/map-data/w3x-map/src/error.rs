//! Error types for map translation

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use w3_data::{CursorError, FourCC};

use crate::file_kind::FileKind;
use crate::generator::CodeCase;
use crate::objects::ObjectCategory;

/// Result type alias for map operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding, encoding, loading or saving a map
#[derive(Error, Debug)]
pub enum Error {
    /// Low-level read or write failure, including reads past the end of a buffer
    #[error(transparent)]
    Cursor(#[from] CursorError),

    /// File system error on a map file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{file}: invalid magic, expected {expected}, found {found:?}")]
    InvalidMagic {
        file: &'static str,
        expected: FourCC,
        found: FourCC,
    },

    #[error("{file}: unsupported format version {version}")]
    UnsupportedVersion { file: &'static str, version: i32 },

    /// The buffer holds more bytes than its header accounts for
    #[error("{file}: {remaining} bytes left over after the declared records")]
    TrailingData { file: &'static str, remaining: usize },

    #[error("{file}: invalid {field}: {value}")]
    InvalidValue {
        file: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{field} is {value}, maximum is {max}")]
    ValueOutOfRange {
        field: &'static str,
        value: i64,
        max: i64,
    },

    #[error("{field} has {found} entries, expected {expected}")]
    CountMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// A terrain layer does not cover the map's tilepoint grid
    #[error("terrain layer {layer} is {found:?}, map is {expected:?}")]
    LayerMismatch {
        layer: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A flat modification in a leveled category, or the reverse
    #[error("modification {id} in {category} data must be {}", if *leveled { "leveled" } else { "flat" })]
    ModificationShape {
        category: ObjectCategory,
        id: FourCC,
        leveled: bool,
    },

    /// A type code appears more than once across an object table
    #[error("object code {0} is already defined")]
    DuplicateObjectCode(FourCC),

    /// A custom object whose parent type code is empty
    #[error("custom object types need a parent type")]
    MissingParent,

    #[error("unknown file kind: {0:?}")]
    UnknownFileKind(String),

    #[error("no unused {0} codes left")]
    FourCCExhausted(CodeCase),

    /// A type handle that does not belong to this manager
    #[error("type handle does not refer to a registered type")]
    InvalidHandle,

    #[error("{0} has not been loaded")]
    NotLoaded(FileKind),

    #[error("no map directory has been set")]
    NoMapDirectory,

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_value(
        file: &'static str,
        field: &'static str,
        value: impl ToString,
    ) -> Self {
        Error::InvalidValue {
            file,
            field,
            value: value.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
