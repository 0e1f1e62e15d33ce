//! # w3x_map - Warcraft III map data
//!
//! Translators between the binary files of an extracted Warcraft III map
//! directory and an in-memory object model, plus an authoring layer that
//! registers new object types and placements and merges them back on save.
//!
//! ## Features
//!
//! - Terrain (`war3map.w3e`), map info (`war3map.w3i`), unit and doodad
//!   placements, cameras and regions
//! - Object modification tables for all seven object categories, and their
//!   skin counterparts
//! - Unique type code generation in the upper-case (hero) and lower-case
//!   partitions
//! - Optional `serde` support for every model type
//!
//! ## Examples
//!
//! ### Translating a single file
//!
//! ```
//! use w3x_map::{Camera, CamerasTranslator, Translator};
//!
//! let cameras = vec![Camera {
//!     distance: 1650.0,
//!     name: "Intro".to_string(),
//!     ..Camera::default()
//! }];
//!
//! let bytes = CamerasTranslator.encode(&cameras)?;
//! let decoded = CamerasTranslator.decode(&bytes)?;
//! assert_eq!(decoded.model[0].name, "Intro");
//! assert_eq!(decoded.model[0].near_clipping, Some(16.0));
//! # Ok::<(), w3x_map::Error>(())
//! ```
//!
//! ### Adding a custom hero
//!
//! ```no_run
//! use w3x_map::{MapManager, Modification, UnitKind, Unit};
//! use w3_data::FourCC;
//!
//! # fn main() -> Result<(), w3x_map::Error> {
//! let mut manager = MapManager::new();
//! manager.load("maps/Example.w3x")?;
//!
//! let paladin = manager.add_unit_type(
//!     UnitKind::Hero,
//!     FourCC::new(*b"Hpal"),
//!     vec![Modification::flat(FourCC::new(*b"unam"), "Test Hero")],
//! )?;
//! manager.add_unit(paladin, Unit::default())?;
//! manager.save()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod camera;
pub mod doodad;
pub mod error;
pub mod file_kind;
pub mod generator;
pub mod grid;
pub mod info;
pub mod item_drops;
pub mod manager;
pub mod map_data;
pub mod objects;
pub mod region;
pub mod terrain;
pub mod translator;
pub mod unit;

pub use camera::{Camera, CamerasTranslator};
pub use doodad::{Doodad, DoodadFlags, DoodadPlacements, DoodadsTranslator, SpecialDoodad};
pub use error::{Error, Result};
pub use file_kind::FileKind;
pub use generator::{CodeCase, FourCCGenerator};
pub use grid::Grid;
pub use info::{InfoTranslator, MapFlags, MapInfo};
pub use item_drops::{ItemDrop, ItemDrops, ItemSet};
pub use manager::{
    AbilityTypeId, BuffTypeId, DoodadTypeId, MapManager, ObjectType, PlacedDoodad, PlacedUnit,
    TypeRef, UnitKind, UnitTypeId,
};
pub use map_data::{FileDiagnostic, LoadOptions, MapData};
pub use objects::{
    Modification, ModificationMap, ModificationType, ModificationValue, ObjectCategory, ObjectKey,
    ObjectModificationTable, ObjectTranslator,
};
pub use region::{Region, RegionsTranslator};
pub use terrain::{MapSize, Terrain, TerrainTranslator, TilepointFlags};
pub use translator::{DecodeOptions, Decoded, Diagnostic, Translator};
pub use unit::{Unit, UnitsTranslator};

/// Render any model as pretty-printed JSON.
#[cfg(feature = "serde")]
pub fn to_json<T: serde::Serialize>(model: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

/// Parse a model from its JSON form.
#[cfg(feature = "serde")]
pub fn from_json<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}
