//! Binary primitives shared by the Warcraft III map file translators.
//!
//! Every map file is a flat little-endian stream: fixed-width integers,
//! floats, null-terminated strings and fixed-length character arrays such as
//! four-character type codes. [`W3Reader`] walks such a buffer front to back
//! and [`W3Writer`] produces one; neither exposes random access.
//!
//! ```
//! use w3_data::{FourCC, W3Reader, W3Writer};
//!
//! let mut writer = W3Writer::new();
//! writer.write_fourcc(FourCC::new(*b"hfoo"));
//! writer.write_f32(1.25);
//! writer.write_cstring("Footman").unwrap();
//!
//! let bytes = writer.into_inner();
//! let mut reader = W3Reader::new(&bytes);
//! assert_eq!(reader.read_fourcc().unwrap(), FourCC::new(*b"hfoo"));
//! assert_eq!(reader.read_f32().unwrap(), 1.25);
//! assert_eq!(reader.read_cstring().unwrap(), "Footman");
//! assert!(reader.is_exhausted());
//! ```

#![forbid(unsafe_code)]

pub mod cursor;
pub mod error;
pub mod fourcc;
pub mod types;

pub use cursor::{W3Reader, W3Writer, round_to_precision};
pub use error::{CursorError, Result};
pub use fourcc::FourCC;
pub use types::{W3DataR, W3DataW, W3Vec};

pub mod prelude {
    pub use crate::cursor::{W3Reader, W3Writer};
    pub use crate::fourcc::FourCC;
    pub use crate::types::{W3DataR, W3DataW, W3Vec};
}
