use std::fmt;

/// The kind of game object an object modification table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectCategory {
    Units,
    Items,
    Destructibles,
    Doodads,
    Abilities,
    Buffs,
    Upgrades,
}

impl ObjectCategory {
    pub const ALL: [ObjectCategory; 7] = [
        ObjectCategory::Units,
        ObjectCategory::Items,
        ObjectCategory::Destructibles,
        ObjectCategory::Doodads,
        ObjectCategory::Abilities,
        ObjectCategory::Buffs,
        ObjectCategory::Upgrades,
    ];

    /// Position in [`ALL`](Self::ALL).
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Whether modifications carry a level and a data column.
    pub fn is_leveled(self) -> bool {
        matches!(
            self,
            ObjectCategory::Abilities | ObjectCategory::Doodads | ObjectCategory::Upgrades
        )
    }

    pub fn extension(self) -> &'static str {
        match self {
            ObjectCategory::Units => "w3u",
            ObjectCategory::Items => "w3t",
            ObjectCategory::Destructibles => "w3b",
            ObjectCategory::Doodads => "w3d",
            ObjectCategory::Abilities => "w3a",
            ObjectCategory::Buffs => "w3h",
            ObjectCategory::Upgrades => "w3q",
        }
    }

    /// Name of the data file, e.g. `war3map.w3u`.
    pub fn file_name(self) -> &'static str {
        match self {
            ObjectCategory::Units => "war3map.w3u",
            ObjectCategory::Items => "war3map.w3t",
            ObjectCategory::Destructibles => "war3map.w3b",
            ObjectCategory::Doodads => "war3map.w3d",
            ObjectCategory::Abilities => "war3map.w3a",
            ObjectCategory::Buffs => "war3map.w3h",
            ObjectCategory::Upgrades => "war3map.w3q",
        }
    }

    /// Name of the skin file, e.g. `war3mapSkin.w3u`.
    pub fn skin_file_name(self) -> &'static str {
        match self {
            ObjectCategory::Units => "war3mapSkin.w3u",
            ObjectCategory::Items => "war3mapSkin.w3t",
            ObjectCategory::Destructibles => "war3mapSkin.w3b",
            ObjectCategory::Doodads => "war3mapSkin.w3d",
            ObjectCategory::Abilities => "war3mapSkin.w3a",
            ObjectCategory::Buffs => "war3mapSkin.w3h",
            ObjectCategory::Upgrades => "war3mapSkin.w3q",
        }
    }

    /// Singular name used to build file kind names (`unitData`, `unitSkin`).
    pub fn key(self) -> &'static str {
        match self {
            ObjectCategory::Units => "unit",
            ObjectCategory::Items => "item",
            ObjectCategory::Destructibles => "destructible",
            ObjectCategory::Doodads => "doodad",
            ObjectCategory::Abilities => "ability",
            ObjectCategory::Buffs => "buff",
            ObjectCategory::Upgrades => "upgrade",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectCategory::Units => "units",
            ObjectCategory::Items => "items",
            ObjectCategory::Destructibles => "destructibles",
            ObjectCategory::Doodads => "doodads",
            ObjectCategory::Abilities => "abilities",
            ObjectCategory::Buffs => "buffs",
            ObjectCategory::Upgrades => "upgrades",
        }
    }
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
