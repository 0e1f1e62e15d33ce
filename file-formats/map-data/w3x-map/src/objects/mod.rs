//! Object modification tables (`war3map.w3u` and friends).
//!
//! Each table lists field overrides for stock objects ("original") and
//! for new objects cloned from a stock parent ("custom"). The same codec
//! serves every [`ObjectCategory`]; the category only decides whether a
//! modification carries a level and data column.

mod category;
mod modification;
mod table;
mod translator;

pub use category::ObjectCategory;
pub use modification::{Modification, ModificationType, ModificationValue};
pub use table::{ModificationMap, ObjectKey, ObjectModificationTable};
pub use translator::{OBJECTS_VERSION, ObjectTranslator};
