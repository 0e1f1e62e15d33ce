//! Map information (`war3map.w3i`).
//!
//! Three revisions of the layout are understood:
//!
//! - `25`: The Frozen Throne
//! - `28`: adds the editor's game build and the script language
//! - `31`: adds supported graphics modes, game data version and enemy
//!   priorities per player
//!
//! A map is written back with the revision it was read with.

use bitflags::bitflags;
use w3_data::{FourCC, W3DataR, W3DataW, W3Reader, W3Vec, W3Writer};

use crate::error::{Error, Result};
use crate::item_drops::ItemDrop;
use crate::translator::{Diagnostic, Translator};

pub const INFO_FILE: &str = "war3map.w3i";

/// Layout revisions this crate reads and writes.
pub const SUPPORTED_INFO_VERSIONS: [i32; 3] = [25, 28, 31];

bitflags! {
    /// Map-wide option flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MapFlags: u32 {
        const HIDE_MINIMAP = 0x0000_0001;
        const MODIFY_ALLY_PRIORITIES = 0x0000_0002;
        const MELEE = 0x0000_0004;
        const MASKED_AREAS_PARTIALLY_VISIBLE = 0x0000_0010;
        const FIXED_PLAYER_SETTINGS = 0x0000_0020;
        const CUSTOM_FORCES = 0x0000_0040;
        const CUSTOM_TECH_TREE = 0x0000_0080;
        const CUSTOM_ABILITIES = 0x0000_0100;
        const CUSTOM_UPGRADES = 0x0000_0200;
        const WAVES_ON_CLIFF_SHORES = 0x0000_0800;
        const WAVES_ON_ROLLING_SHORES = 0x0000_1000;
        const TERRAIN_FOG = 0x0000_2000;
        const REQUIRES_EXPANSION = 0x0000_4000;
        const ITEM_CLASSIFICATION = 0x0000_8000;
        const WATER_TINTING = 0x0001_0000;
        const ACCURATE_PROBABILITY = 0x0002_0000;
        const CUSTOM_ABILITY_SKINS = 0x0004_0000;

        const _ = !0;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ForceFlags: u32 {
        const ALLIED = 0x01;
        const ALLIED_VICTORY = 0x02;
        const SHARED_VISION = 0x04;
        const SHARED_UNIT_CONTROL = 0x10;
        const SHARED_ADVANCED_UNIT_CONTROL = 0x20;

        const _ = !0;
    }
}

/// Build of the editor that last saved the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameVersion {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
    pub build: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenText {
    pub path: String,
    pub text: String,
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadingScreen {
    /// Index of a stock background, `-1` for none or a custom model
    pub background: i32,
    pub screen: ScreenText,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fog {
    pub kind: i32,
    pub start_z: f32,
    pub end_z: f32,
    pub density: f32,
    /// RGBA
    pub color: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScriptLanguage {
    #[default]
    Jass,
    Lua,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub number: i32,
    /// 1 human, 2 computer, 3 neutral, 4 rescuable
    pub controller: i32,
    /// 1 human, 2 orc, 3 undead, 4 night elf
    pub race: i32,
    pub fixed_start: bool,
    pub name: String,
    pub start: [f32; 2],
    pub ally_low_priorities: u32,
    pub ally_high_priorities: u32,
    pub enemy_low_priorities: u32,
    pub enemy_high_priorities: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Force {
    pub flags: ForceFlags,
    /// Bit `n` set when player `n` belongs to the force
    pub players: u32,
    pub name: String,
}

impl W3DataR for Force {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            flags: ForceFlags::from_bits_retain(reader.read_u32()?),
            players: reader.read_u32()?,
            name: reader.read_cstring()?,
        })
    }
}

impl W3DataW for Force {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_u32(self.flags.bits());
        writer.write_u32(self.players);
        writer.write_cstring(&self.name)
    }
}

/// Availability override of one upgrade level for a set of players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpgradeAvailability {
    pub players: u32,
    pub id: FourCC,
    pub level: i32,
    /// 0 unavailable, 1 available, 2 researched
    pub availability: i32,
}

impl W3DataR for UpgradeAvailability {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            players: reader.read_u32()?,
            id: reader.read_fourcc()?,
            level: reader.read_i32()?,
            availability: reader.read_i32()?,
        })
    }
}

impl W3DataW for UpgradeAvailability {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_u32(self.players);
        writer.write_fourcc(self.id);
        writer.write_i32(self.level);
        writer.write_i32(self.availability);
        Ok(())
    }
}

/// A unit, item, ability or upgrade made unavailable to a set of players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TechAvailability {
    pub players: u32,
    pub id: FourCC,
}

impl W3DataR for TechAvailability {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            players: reader.read_u32()?,
            id: reader.read_fourcc()?,
        })
    }
}

impl W3DataW for TechAvailability {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_u32(self.players);
        writer.write_fourcc(self.id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomUnitRow {
    pub chance: i32,
    /// One unit per column of the owning table
    pub units: Vec<FourCC>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomUnitTable {
    pub number: i32,
    pub name: String,
    /// Column kinds: 0 unit, 1 building, 2 item
    pub columns: Vec<i32>,
    pub rows: Vec<RandomUnitRow>,
}

impl W3DataR for RandomUnitTable {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        let number = reader.read_i32()?;
        let name = reader.read_cstring()?;
        let columns: Vec<i32> = reader.read_vec()?;
        let row_count = reader.read_count()?;
        let mut rows = Vec::with_capacity(row_count.min(reader.remaining()));
        for _ in 0..row_count {
            let chance = reader.read_i32()?;
            let units = (0..columns.len())
                .map(|_| reader.read_fourcc())
                .collect::<w3_data::Result<_>>()?;
            rows.push(RandomUnitRow { chance, units });
        }
        Ok(Self {
            number,
            name,
            columns,
            rows,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomItemTable {
    pub number: i32,
    pub name: String,
    pub sets: Vec<Vec<ItemDrop>>,
}

impl W3DataR for RandomItemTable {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        let number = reader.read_i32()?;
        let name = reader.read_cstring()?;
        let set_count = reader.read_count()?;
        let mut sets = Vec::with_capacity(set_count.min(reader.remaining()));
        for _ in 0..set_count {
            let item_count = reader.read_count()?;
            let mut items = Vec::with_capacity(item_count.min(reader.remaining()));
            // Chance comes first here, unlike the drop sets of placed objects.
            for _ in 0..item_count {
                let chance = reader.read_i32()?;
                let item = reader.read_fourcc()?;
                items.push(ItemDrop { item, chance });
            }
            sets.push(items);
        }
        Ok(Self { number, name, sets })
    }
}

impl W3DataW for RandomItemTable {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_i32(self.number);
        writer.write_cstring(&self.name)?;
        writer.write_count(self.sets.len())?;
        for set in &self.sets {
            writer.write_count(set.len())?;
            for drop in set {
                writer.write_i32(drop.chance);
                writer.write_fourcc(drop.item);
            }
        }
        Ok(())
    }
}

/// Contents of `war3map.w3i`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapInfo {
    /// Layout revision, one of [`SUPPORTED_INFO_VERSIONS`]
    pub version: i32,
    pub saves: i32,
    pub editor_version: i32,
    /// Present from revision 28
    pub game_version: GameVersion,
    pub name: String,
    pub author: String,
    pub description: String,
    pub recommended_players: String,
    /// Camera bound corners as x, y pairs
    pub camera_bounds: [f32; 8],
    /// Margins between camera bounds and map edge: left, right, bottom, top
    pub camera_complements: [i32; 4],
    pub playable_size: [i32; 2],
    pub flags: MapFlags,
    pub tileset: char,
    pub loading_screen: LoadingScreen,
    pub game_data_set: i32,
    pub prologue: ScreenText,
    pub fog: Fog,
    pub weather: Option<FourCC>,
    pub sound_environment: String,
    /// Tileset whose lighting is used, `'\0'` for the map's own
    pub light_environment: char,
    /// RGBA
    pub water_tint: [u8; 4],
    /// Present from revision 28
    pub script_language: ScriptLanguage,
    /// Present from revision 31
    pub supported_modes: i32,
    /// Present from revision 31
    pub game_data_version: i32,
    pub players: Vec<Player>,
    pub forces: Vec<Force>,
    pub upgrades: Vec<UpgradeAvailability>,
    pub techs: Vec<TechAvailability>,
    pub random_unit_tables: Vec<RandomUnitTable>,
    pub random_item_tables: Vec<RandomItemTable>,
}

impl Default for MapInfo {
    fn default() -> Self {
        Self {
            version: 31,
            saves: 0,
            editor_version: 6072,
            game_version: GameVersion::default(),
            name: String::new(),
            author: String::new(),
            description: String::new(),
            recommended_players: String::new(),
            camera_bounds: [0.0; 8],
            camera_complements: [0; 4],
            playable_size: [0; 2],
            flags: MapFlags::default(),
            tileset: 'L',
            loading_screen: LoadingScreen {
                background: -1,
                screen: ScreenText::default(),
            },
            game_data_set: 0,
            prologue: ScreenText::default(),
            fog: Fog::default(),
            weather: None,
            sound_environment: String::new(),
            light_environment: '\0',
            water_tint: [255; 4],
            script_language: ScriptLanguage::Jass,
            supported_modes: 3,
            game_data_version: 1,
            players: Vec::new(),
            forces: Vec::new(),
            upgrades: Vec::new(),
            techs: Vec::new(),
            random_unit_tables: Vec::new(),
            random_item_tables: Vec::new(),
        }
    }
}

fn read_screen_text(reader: &mut W3Reader<'_>) -> Result<ScreenText> {
    Ok(ScreenText {
        path: reader.read_cstring()?,
        text: reader.read_cstring()?,
        title: reader.read_cstring()?,
        subtitle: reader.read_cstring()?,
    })
}

fn write_screen_text(screen: &ScreenText, writer: &mut W3Writer) -> Result<()> {
    writer.write_cstring(&screen.path)?;
    writer.write_cstring(&screen.text)?;
    writer.write_cstring(&screen.title)?;
    writer.write_cstring(&screen.subtitle)?;
    Ok(())
}

fn read_player(reader: &mut W3Reader<'_>, version: i32) -> Result<Player> {
    let mut player = Player {
        number: reader.read_i32()?,
        controller: reader.read_i32()?,
        race: reader.read_i32()?,
        fixed_start: reader.read_i32()? != 0,
        name: reader.read_cstring()?,
        start: [reader.read_f32()?, reader.read_f32()?],
        ally_low_priorities: reader.read_u32()?,
        ally_high_priorities: reader.read_u32()?,
        ..Default::default()
    };
    if version >= 31 {
        player.enemy_low_priorities = reader.read_u32()?;
        player.enemy_high_priorities = reader.read_u32()?;
    }
    Ok(player)
}

fn write_player(player: &Player, version: i32, writer: &mut W3Writer) -> Result<()> {
    writer.write_i32(player.number);
    writer.write_i32(player.controller);
    writer.write_i32(player.race);
    writer.write_i32(i32::from(player.fixed_start));
    writer.write_cstring(&player.name)?;
    writer.write_f32(player.start[0]);
    writer.write_f32(player.start[1]);
    writer.write_u32(player.ally_low_priorities);
    writer.write_u32(player.ally_high_priorities);
    if version >= 31 {
        writer.write_u32(player.enemy_low_priorities);
        writer.write_u32(player.enemy_high_priorities);
    }
    Ok(())
}

fn write_random_unit_table(table: &RandomUnitTable, writer: &mut W3Writer) -> Result<()> {
    writer.write_i32(table.number);
    writer.write_cstring(&table.name)?;
    writer.write_vec(&table.columns)?;
    writer.write_count(table.rows.len())?;
    for row in &table.rows {
        if row.units.len() != table.columns.len() {
            return Err(Error::CountMismatch {
                field: "random unit row",
                expected: table.columns.len(),
                found: row.units.len(),
            });
        }
        writer.write_i32(row.chance);
        for unit in &row.units {
            writer.write_fourcc(*unit);
        }
    }
    Ok(())
}

fn read_tileset(reader: &mut W3Reader<'_>) -> Result<char> {
    Ok(char::from(reader.read_u8()?))
}

fn write_tileset(writer: &mut W3Writer, tileset: char) -> Result<()> {
    Ok(writer.write_chars(&tileset.to_string(), 1)?)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InfoTranslator;

impl Translator for InfoTranslator {
    type Model = MapInfo;

    fn label(&self) -> &'static str {
        INFO_FILE
    }

    fn read(&self, reader: &mut W3Reader<'_>, _: &mut Vec<Diagnostic>) -> Result<MapInfo> {
        let version = reader.read_i32()?;
        if !SUPPORTED_INFO_VERSIONS.contains(&version) {
            return Err(Error::UnsupportedVersion {
                file: INFO_FILE,
                version,
            });
        }

        let saves = reader.read_i32()?;
        let editor_version = reader.read_i32()?;
        let game_version = if version >= 28 {
            GameVersion {
                major: reader.read_i32()?,
                minor: reader.read_i32()?,
                patch: reader.read_i32()?,
                build: reader.read_i32()?,
            }
        } else {
            GameVersion::default()
        };

        let name = reader.read_cstring()?;
        let author = reader.read_cstring()?;
        let description = reader.read_cstring()?;
        let recommended_players = reader.read_cstring()?;
        let camera_bounds = <[f32; 8]>::read_from(reader)?;
        let camera_complements = <[i32; 4]>::read_from(reader)?;
        let playable_size = <[i32; 2]>::read_from(reader)?;
        let flags = MapFlags::from_bits_retain(reader.read_u32()?);
        let tileset = read_tileset(reader)?;

        let loading_screen = LoadingScreen {
            background: reader.read_i32()?,
            screen: read_screen_text(reader)?,
        };
        let game_data_set = reader.read_i32()?;
        let prologue = read_screen_text(reader)?;

        let fog = Fog {
            kind: reader.read_i32()?,
            start_z: reader.read_f32()?,
            end_z: reader.read_f32()?,
            density: reader.read_f32()?,
            color: <[u8; 4]>::read_from(reader)?,
        };
        let weather = reader.read_fourcc()?;
        let sound_environment = reader.read_cstring()?;
        let light_environment = read_tileset(reader)?;
        let water_tint = <[u8; 4]>::read_from(reader)?;

        let script_language = if version >= 28 {
            match reader.read_i32()? {
                0 => ScriptLanguage::Jass,
                1 => ScriptLanguage::Lua,
                other => return Err(Error::invalid_value(INFO_FILE, "script language", other)),
            }
        } else {
            ScriptLanguage::Jass
        };
        let (supported_modes, game_data_version) = if version >= 31 {
            (reader.read_i32()?, reader.read_i32()?)
        } else {
            (3, 1)
        };

        let player_count = reader.read_count()?;
        let mut players = Vec::with_capacity(player_count.min(reader.remaining()));
        for _ in 0..player_count {
            players.push(read_player(reader, version)?);
        }
        let forces: Vec<Force> = reader.read_vec()?;
        let upgrades: Vec<UpgradeAvailability> = reader.read_vec()?;
        let techs: Vec<TechAvailability> = reader.read_vec()?;
        let random_unit_tables: Vec<RandomUnitTable> = reader.read_vec()?;
        let random_item_tables: Vec<RandomItemTable> = reader.read_vec()?;

        log::debug!(
            "{INFO_FILE}: version {version}, {} players, {} forces",
            players.len(),
            forces.len()
        );
        Ok(MapInfo {
            version,
            saves,
            editor_version,
            game_version,
            name,
            author,
            description,
            recommended_players,
            camera_bounds,
            camera_complements,
            playable_size,
            flags,
            tileset,
            loading_screen,
            game_data_set,
            prologue,
            fog,
            weather: (!weather.is_none()).then_some(weather),
            sound_environment,
            light_environment,
            water_tint,
            script_language,
            supported_modes,
            game_data_version,
            players,
            forces,
            upgrades,
            techs,
            random_unit_tables,
            random_item_tables,
        })
    }

    fn write(&self, info: &MapInfo, writer: &mut W3Writer) -> Result<()> {
        let version = info.version;
        if !SUPPORTED_INFO_VERSIONS.contains(&version) {
            return Err(Error::UnsupportedVersion {
                file: INFO_FILE,
                version,
            });
        }

        writer.write_i32(version);
        writer.write_i32(info.saves);
        writer.write_i32(info.editor_version);
        if version >= 28 {
            let game = &info.game_version;
            [game.major, game.minor, game.patch, game.build].write_to(writer)?;
        }

        writer.write_cstring(&info.name)?;
        writer.write_cstring(&info.author)?;
        writer.write_cstring(&info.description)?;
        writer.write_cstring(&info.recommended_players)?;
        info.camera_bounds.write_to(writer)?;
        info.camera_complements.write_to(writer)?;
        info.playable_size.write_to(writer)?;
        writer.write_u32(info.flags.bits());
        write_tileset(writer, info.tileset)?;

        writer.write_i32(info.loading_screen.background);
        write_screen_text(&info.loading_screen.screen, writer)?;
        writer.write_i32(info.game_data_set);
        write_screen_text(&info.prologue, writer)?;

        writer.write_i32(info.fog.kind);
        writer.write_f32(info.fog.start_z);
        writer.write_f32(info.fog.end_z);
        writer.write_f32(info.fog.density);
        writer.write_bytes(&info.fog.color);
        writer.write_fourcc(info.weather.unwrap_or(FourCC::NONE));
        writer.write_cstring(&info.sound_environment)?;
        write_tileset(writer, info.light_environment)?;
        writer.write_bytes(&info.water_tint);

        if version >= 28 {
            writer.write_i32(match info.script_language {
                ScriptLanguage::Jass => 0,
                ScriptLanguage::Lua => 1,
            });
        }
        if version >= 31 {
            writer.write_i32(info.supported_modes);
            writer.write_i32(info.game_data_version);
        }

        writer.write_count(info.players.len())?;
        for player in &info.players {
            write_player(player, version, writer)?;
        }
        writer.write_vec(&info.forces)?;
        writer.write_vec(&info.upgrades)?;
        writer.write_vec(&info.techs)?;
        writer.write_count(info.random_unit_tables.len())?;
        for table in &info.random_unit_tables {
            write_random_unit_table(table, writer)?;
        }
        writer.write_vec(&info.random_item_tables)?;
        Ok(())
    }
}
