//! Pre-placed units (`war3mapUnits.doo`).

use w3_data::{FourCC, W3DataR, W3DataW, W3Reader, W3Vec, W3Writer};

use crate::doodad::{read_doo_header, write_doo_header};
use crate::error::{Error, Result};
use crate::item_drops::ItemDrops;
use crate::translator::{Diagnostic, Translator};

pub const UNITS_FILE: &str = "war3mapUnits.doo";

/// Largest level a random-unit spec can hold (24 bits on disk).
pub const MAX_RANDOM_LEVEL: u32 = 0x00FF_FFFF;

/// Target acquisition range meaning "use the unit's default".
pub const ACQUISITION_NORMAL: f32 = -1.0;
/// Target acquisition range meaning "camp".
pub const ACQUISITION_CAMP: f32 = -2.0;

/// Hero attributes; ignored by the game for non-hero units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroStats {
    pub level: i32,
    pub strength: i32,
    pub agility: i32,
    pub intelligence: i32,
}

impl Default for HeroStats {
    fn default() -> Self {
        Self {
            level: 1,
            strength: 0,
            agility: 0,
            intelligence: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryItem {
    pub slot: i32,
    pub item: FourCC,
}

impl W3DataR for InventoryItem {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            slot: reader.read_i32()?,
            item: reader.read_fourcc()?,
        })
    }
}

impl W3DataW for InventoryItem {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_i32(self.slot);
        writer.write_fourcc(self.item);
        Ok(())
    }
}

/// An ability whose level or autocast state differs from the unit default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifiedAbility {
    pub ability: FourCC,
    pub active: bool,
    pub level: i32,
}

impl W3DataR for ModifiedAbility {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            ability: reader.read_fourcc()?,
            active: reader.read_i32()? != 0,
            level: reader.read_i32()?,
        })
    }
}

impl W3DataW for ModifiedAbility {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_fourcc(self.ability);
        writer.write_i32(i32::from(self.active));
        writer.write_i32(self.level);
        Ok(())
    }
}

/// How a random unit or item placeholder picks its actual type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RandomSpec {
    /// Any unit or item of the given level
    Any { level: u32, item_class: u8 },
    /// An entry of one of the map's random unit tables
    FromGroup { group: i32, column: i32 },
    /// A weighted choice from an explicit list
    FromSet(Vec<RandomChoice>),
}

impl Default for RandomSpec {
    fn default() -> Self {
        Self::Any {
            level: 0,
            item_class: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomChoice {
    pub unit: FourCC,
    pub chance: i32,
}

impl W3DataR for RandomChoice {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            unit: reader.read_fourcc()?,
            chance: reader.read_i32()?,
        })
    }
}

impl W3DataW for RandomChoice {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_fourcc(self.unit);
        writer.write_i32(self.chance);
        Ok(())
    }
}

/// A unit, item or start location placed on the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub type_id: FourCC,
    pub variation: i32,
    pub position: [f32; 3],
    /// Facing, in radians
    pub rotation: f32,
    pub scale: [f32; 3],
    pub skin: FourCC,
    pub flags: u8,
    pub player: i32,
    pub reserved: [u8; 2],
    /// `-1` for the type's default
    pub hit_points: i32,
    /// `-1` for the type's default
    pub mana: i32,
    pub drops: ItemDrops,
    pub gold: i32,
    pub target_acquisition: f32,
    pub hero: HeroStats,
    pub inventory: Vec<InventoryItem>,
    pub abilities: Vec<ModifiedAbility>,
    pub random: RandomSpec,
    /// `-1` for the owning player's color
    pub color: i32,
    /// Region id a waygate leads to, `-1` when inactive
    pub waygate: i32,
    pub creation_id: i32,
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            type_id: FourCC::NONE,
            variation: 0,
            position: [0.0; 3],
            rotation: 0.0,
            scale: [1.0; 3],
            skin: FourCC::NONE,
            flags: 2,
            player: 0,
            reserved: [0; 2],
            hit_points: -1,
            mana: -1,
            drops: ItemDrops::default(),
            gold: 12500,
            target_acquisition: ACQUISITION_NORMAL,
            hero: HeroStats::default(),
            inventory: Vec::new(),
            abilities: Vec::new(),
            random: RandomSpec::default(),
            color: -1,
            waygate: -1,
            creation_id: 0,
        }
    }
}

impl Unit {
    fn read(reader: &mut W3Reader<'_>) -> Result<Self> {
        let type_id = reader.read_fourcc()?;
        let variation = reader.read_i32()?;
        let position = <[f32; 3]>::read_from(reader)?;
        let rotation = reader.read_f32()?;
        let scale = <[f32; 3]>::read_from(reader)?;
        let skin = reader.read_fourcc()?;
        let flags = reader.read_u8()?;
        let player = reader.read_i32()?;
        let reserved = [reader.read_u8()?, reader.read_u8()?];
        let hit_points = reader.read_i32()?;
        let mana = reader.read_i32()?;
        let drops = ItemDrops::read_from(reader)?;
        let gold = reader.read_i32()?;
        let target_acquisition = reader.read_f32()?;
        let hero = HeroStats {
            level: reader.read_i32()?,
            strength: reader.read_i32()?,
            agility: reader.read_i32()?,
            intelligence: reader.read_i32()?,
        };
        let inventory = reader.read_vec()?;
        let abilities = reader.read_vec()?;

        let offset = reader.position();
        let random = match reader.read_i32()? {
            0 => {
                let [a, b, c] = [reader.read_u8()?, reader.read_u8()?, reader.read_u8()?];
                RandomSpec::Any {
                    level: u32::from_le_bytes([a, b, c, 0]),
                    item_class: reader.read_u8()?,
                }
            }
            1 => RandomSpec::FromGroup {
                group: reader.read_i32()?,
                column: reader.read_i32()?,
            },
            2 => RandomSpec::FromSet(reader.read_vec()?),
            other => {
                return Err(Error::invalid_value(
                    UNITS_FILE,
                    "random flag",
                    format!("{other} at offset {offset}"),
                ));
            }
        };

        Ok(Self {
            type_id,
            variation,
            position,
            rotation,
            scale,
            skin,
            flags,
            player,
            reserved,
            hit_points,
            mana,
            drops,
            gold,
            target_acquisition,
            hero,
            inventory,
            abilities,
            random,
            color: reader.read_i32()?,
            waygate: reader.read_i32()?,
            creation_id: reader.read_i32()?,
        })
    }

    fn write(&self, writer: &mut W3Writer) -> Result<()> {
        writer.write_fourcc(self.type_id);
        writer.write_i32(self.variation);
        self.position.write_to(writer)?;
        writer.write_f32(self.rotation);
        self.scale.write_to(writer)?;
        writer.write_fourcc(self.skin);
        writer.write_u8(self.flags);
        writer.write_i32(self.player);
        writer.write_bytes(&self.reserved);
        writer.write_i32(self.hit_points);
        writer.write_i32(self.mana);
        self.drops.write_to(writer)?;
        writer.write_i32(self.gold);
        writer.write_f32(self.target_acquisition);
        writer.write_i32(self.hero.level);
        writer.write_i32(self.hero.strength);
        writer.write_i32(self.hero.agility);
        writer.write_i32(self.hero.intelligence);
        writer.write_vec(&self.inventory)?;
        writer.write_vec(&self.abilities)?;

        match &self.random {
            RandomSpec::Any { level, item_class } => {
                if *level > MAX_RANDOM_LEVEL {
                    return Err(Error::ValueOutOfRange {
                        field: "random level",
                        value: i64::from(*level),
                        max: i64::from(MAX_RANDOM_LEVEL),
                    });
                }
                writer.write_i32(0);
                let [a, b, c, _] = level.to_le_bytes();
                writer.write_bytes(&[a, b, c, *item_class]);
            }
            RandomSpec::FromGroup { group, column } => {
                writer.write_i32(1);
                writer.write_i32(*group);
                writer.write_i32(*column);
            }
            RandomSpec::FromSet(choices) => {
                writer.write_i32(2);
                writer.write_vec(choices)?;
            }
        }

        writer.write_i32(self.color);
        writer.write_i32(self.waygate);
        writer.write_i32(self.creation_id);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnitsTranslator;

impl Translator for UnitsTranslator {
    type Model = Vec<Unit>;

    fn label(&self) -> &'static str {
        UNITS_FILE
    }

    fn read(
        &self,
        reader: &mut W3Reader<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<Unit>> {
        read_doo_header(reader, UNITS_FILE, diagnostics)?;
        let count = reader.read_count()?;
        let mut units = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            units.push(Unit::read(reader)?);
        }
        log::debug!("{UNITS_FILE}: read {} units", units.len());
        Ok(units)
    }

    fn write(&self, units: &Vec<Unit>, writer: &mut W3Writer) -> Result<()> {
        write_doo_header(writer);
        writer.write_count(units.len())?;
        for unit in units {
            unit.write(writer)?;
        }
        Ok(())
    }
}
