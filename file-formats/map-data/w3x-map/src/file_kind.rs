use std::fmt;
use std::str::FromStr;

use crate::camera::CAMERAS_FILE;
use crate::doodad::DOODADS_FILE;
use crate::error::Error;
use crate::info::INFO_FILE;
use crate::objects::ObjectCategory;
use crate::region::REGIONS_FILE;
use crate::terrain::TERRAIN_FILE;
use crate::unit::UNITS_FILE;

/// One file of a map directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileKind {
    Info,
    Terrain,
    Units,
    Doodads,
    Cameras,
    Regions,
    Objects(ObjectCategory),
    Skins(ObjectCategory),
}

impl FileKind {
    /// Every kind, in load order.
    pub fn all() -> impl Iterator<Item = FileKind> {
        [
            FileKind::Info,
            FileKind::Terrain,
            FileKind::Units,
            FileKind::Doodads,
            FileKind::Cameras,
            FileKind::Regions,
        ]
        .into_iter()
        .chain(ObjectCategory::ALL.into_iter().map(FileKind::Objects))
        .chain(ObjectCategory::ALL.into_iter().map(FileKind::Skins))
    }

    pub fn file_name(self) -> &'static str {
        match self {
            FileKind::Info => INFO_FILE,
            FileKind::Terrain => TERRAIN_FILE,
            FileKind::Units => UNITS_FILE,
            FileKind::Doodads => DOODADS_FILE,
            FileKind::Cameras => CAMERAS_FILE,
            FileKind::Regions => REGIONS_FILE,
            FileKind::Objects(category) => category.file_name(),
            FileKind::Skins(category) => category.skin_file_name(),
        }
    }

    /// Whether a map may lack this file.
    pub fn is_optional(self) -> bool {
        !matches!(
            self,
            FileKind::Info | FileKind::Terrain | FileKind::Units | FileKind::Doodads
        )
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Info => f.write_str("info"),
            FileKind::Terrain => f.write_str("terrain"),
            FileKind::Units => f.write_str("units"),
            FileKind::Doodads => f.write_str("doodads"),
            FileKind::Cameras => f.write_str("cameras"),
            FileKind::Regions => f.write_str("regions"),
            FileKind::Objects(category) => write!(f, "{}Data", category.key()),
            FileKind::Skins(category) => write!(f, "{}Skin", category.key()),
        }
    }
}

impl FromStr for FileKind {
    type Err = Error;

    /// Parse names such as `terrain`, `unitData` or `abilitySkin`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "info" => Some(FileKind::Info),
            "terrain" => Some(FileKind::Terrain),
            "units" => Some(FileKind::Units),
            "doodads" => Some(FileKind::Doodads),
            "cameras" => Some(FileKind::Cameras),
            "regions" => Some(FileKind::Regions),
            _ => s
                .strip_suffix("Data")
                .and_then(ObjectCategory::from_key)
                .map(FileKind::Objects)
                .or_else(|| {
                    s.strip_suffix("Skin")
                        .and_then(ObjectCategory::from_key)
                        .map(FileKind::Skins)
                }),
        };
        kind.ok_or_else(|| Error::UnknownFileKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_names_round_trip() {
        let kinds: Vec<_> = FileKind::all().collect();
        assert_eq!(kinds.len(), 6 + 2 * 7);
        for kind in kinds {
            assert_eq!(kind.to_string().parse::<FileKind>().unwrap(), kind);
        }
    }

    #[test_case("unitData", FileKind::Objects(ObjectCategory::Units), "war3map.w3u")]
    #[test_case("destructibleData", FileKind::Objects(ObjectCategory::Destructibles), "war3map.w3b")]
    #[test_case("abilitySkin", FileKind::Skins(ObjectCategory::Abilities), "war3mapSkin.w3a")]
    #[test_case("units", FileKind::Units, "war3mapUnits.doo")]
    #[test_case("terrain", FileKind::Terrain, "war3map.w3e")]
    fn test_parse(name: &str, kind: FileKind, file: &str) {
        assert_eq!(name.parse::<FileKind>().unwrap(), kind);
        assert_eq!(kind.file_name(), file);
    }

    #[test]
    fn test_unknown_kind() {
        match "triggers".parse::<FileKind>() {
            Err(Error::UnknownFileKind(name)) => assert_eq!(name, "triggers"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!("Data".parse::<FileKind>().is_err());
    }

    #[test]
    fn test_required_files() {
        let required: Vec<_> = FileKind::all().filter(|k| !k.is_optional()).collect();
        assert_eq!(
            required,
            [
                FileKind::Info,
                FileKind::Terrain,
                FileKind::Units,
                FileKind::Doodads
            ]
        );
    }
}
