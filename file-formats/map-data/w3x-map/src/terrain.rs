//! Terrain heightmap and tile layers (`war3map.w3e`).
//!
//! The terrain is stored as a grid of tilepoints (tile corners). Each
//! tilepoint packs nine values into seven bytes:
//!
//! | bytes | content                                                   |
//! |-------|-----------------------------------------------------------|
//! | 0-1   | ground height                                             |
//! | 2-3   | water height, bit `0x4000` is the boundary flag           |
//! | 4     | high nibble [`TilepointFlags`], low nibble ground texture |
//! | 5     | ground variation (high 5 bits), cliff variation (low 3)   |
//! | 6     | high nibble cliff texture, low nibble layer height        |

use bitflags::bitflags;
use w3_data::{FourCC, W3Reader, W3Vec, W3Writer};

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::translator::{Diagnostic, Translator, expect_magic};

pub const TERRAIN_FILE: &str = "war3map.w3e";

const TERRAIN_MAGIC: &[u8; 4] = b"W3E!";
const TERRAIN_VERSION: i32 = 11;
const TILEPOINT_SIZE: usize = 7;
const BOUNDARY_BIT: i16 = 0x4000;

/// Cliff texture index meaning "no cliff".
pub const NO_CLIFF_TEXTURE: u8 = 15;
/// Height of a flat tilepoint at layer zero.
pub const DEFAULT_GROUND_HEIGHT: i16 = 0x2000;
pub const DEFAULT_WATER_HEIGHT: i16 = 0x1E00;

bitflags! {
    /// Per-tilepoint flags, kept at their on-disk bit positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TilepointFlags: u8 {
        /// Ramp between two cliff layers
        const RAMP = 0x10;
        const BLIGHT = 0x20;
        const WATER = 0x40;
        /// Camera bounds area set with the boundary tool
        const BOUNDARY = 0x80;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapSize {
    /// Tilepoint columns
    pub width: usize,
    /// Tilepoint rows
    pub height: usize,
    /// World position of the bottom-left tilepoint
    pub offset: [f32; 2],
}

impl MapSize {
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Terrain {
    /// Tileset letter, e.g. `L` for Lordaeron Summer
    pub tileset: char,
    pub custom_tileset: bool,
    pub tile_palette: Vec<FourCC>,
    pub cliff_palette: Vec<FourCC>,
    pub map: MapSize,
    pub ground_height: Grid<i16>,
    pub water_height: Grid<i16>,
    pub boundary_flag: Grid<bool>,
    pub flags: Grid<TilepointFlags>,
    pub ground_texture: Grid<u8>,
    pub ground_variation: Grid<u8>,
    pub cliff_variation: Grid<u8>,
    pub cliff_texture: Grid<u8>,
    pub layer_height: Grid<u8>,
}

impl Terrain {
    /// Flat terrain on the default cliff layer, textured with the first palette entry.
    pub fn flat(tileset: char, width: usize, height: usize) -> Self {
        Self {
            tileset,
            custom_tileset: false,
            tile_palette: Vec::new(),
            cliff_palette: Vec::new(),
            map: MapSize {
                width,
                height,
                offset: [0.0; 2],
            },
            ground_height: Grid::filled(width, height, DEFAULT_GROUND_HEIGHT),
            water_height: Grid::filled(width, height, DEFAULT_WATER_HEIGHT),
            boundary_flag: Grid::filled(width, height, false),
            flags: Grid::filled(width, height, TilepointFlags::empty()),
            ground_texture: Grid::filled(width, height, 0),
            ground_variation: Grid::filled(width, height, 0),
            cliff_variation: Grid::filled(width, height, 0),
            cliff_texture: Grid::filled(width, height, NO_CLIFF_TEXTURE),
            layer_height: Grid::filled(width, height, 2),
        }
    }

    /// Check that every layer covers exactly the tilepoint grid.
    pub fn validate(&self) -> Result<()> {
        let expected = self.map.dimensions();
        let layers = [
            ("ground_height", self.ground_height.dimensions()),
            ("water_height", self.water_height.dimensions()),
            ("boundary_flag", self.boundary_flag.dimensions()),
            ("flags", self.flags.dimensions()),
            ("ground_texture", self.ground_texture.dimensions()),
            ("ground_variation", self.ground_variation.dimensions()),
            ("cliff_variation", self.cliff_variation.dimensions()),
            ("cliff_texture", self.cliff_texture.dimensions()),
            ("layer_height", self.layer_height.dimensions()),
        ];
        for (layer, found) in layers {
            if found != expected {
                return Err(Error::LayerMismatch {
                    layer,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

fn nibble(field: &'static str, value: u8) -> Result<u8> {
    bounded(field, value, 0x0F)
}

fn bounded(field: &'static str, value: u8, max: u8) -> Result<u8> {
    if value > max {
        return Err(Error::ValueOutOfRange {
            field,
            value: i64::from(value),
            max: i64::from(max),
        });
    }
    Ok(value)
}

fn layer<T>(width: usize, height: usize, name: &'static str, cells: Vec<T>) -> Result<Grid<T>> {
    let found = cells.len();
    Grid::from_vec(width, height, cells).ok_or(Error::LayerMismatch {
        layer: name,
        expected: (width, height),
        found: (found, 1),
    })
}

fn read_dimension(reader: &mut W3Reader<'_>, field: &'static str) -> Result<usize> {
    let value = reader.read_i32()?;
    usize::try_from(value).map_err(|_| Error::invalid_value(TERRAIN_FILE, field, value))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TerrainTranslator;

impl Translator for TerrainTranslator {
    type Model = Terrain;

    fn label(&self) -> &'static str {
        TERRAIN_FILE
    }

    fn read(&self, reader: &mut W3Reader<'_>, _: &mut Vec<Diagnostic>) -> Result<Terrain> {
        expect_magic(reader, TERRAIN_FILE, TERRAIN_MAGIC)?;
        let version = reader.read_i32()?;
        if version != TERRAIN_VERSION {
            return Err(Error::UnsupportedVersion {
                file: TERRAIN_FILE,
                version,
            });
        }

        let tileset = char::from(reader.read_u8()?);
        let custom_tileset = reader.read_i32()? != 0;
        let tile_palette = reader.read_vec()?;
        let cliff_palette = reader.read_vec()?;
        let width = read_dimension(reader, "width")?;
        let height = read_dimension(reader, "height")?;
        let offset = [reader.read_f32()?, reader.read_f32()?];

        let points = width.checked_mul(height).ok_or_else(|| {
            Error::invalid_value(TERRAIN_FILE, "size", format!("{width}x{height}"))
        })?;
        // Reject oversized headers before allocating nine layers for them.
        let bytes = reader.read_bytes(points.saturating_mul(TILEPOINT_SIZE))?;

        let mut ground_height = Vec::with_capacity(points);
        let mut water_height = Vec::with_capacity(points);
        let mut boundary_flag = Vec::with_capacity(points);
        let mut flags = Vec::with_capacity(points);
        let mut ground_texture = Vec::with_capacity(points);
        let mut ground_variation = Vec::with_capacity(points);
        let mut cliff_variation = Vec::with_capacity(points);
        let mut cliff_texture = Vec::with_capacity(points);
        let mut layer_height = Vec::with_capacity(points);

        for point in bytes.chunks_exact(TILEPOINT_SIZE) {
            ground_height.push(i16::from_le_bytes([point[0], point[1]]));
            let water = i16::from_le_bytes([point[2], point[3]]);
            water_height.push(water & !BOUNDARY_BIT);
            boundary_flag.push(water & BOUNDARY_BIT != 0);
            flags.push(TilepointFlags::from_bits_truncate(point[4]));
            ground_texture.push(point[4] & 0x0F);
            ground_variation.push(point[5] >> 3);
            cliff_variation.push(point[5] & 0x07);
            cliff_texture.push(point[6] >> 4);
            layer_height.push(point[6] & 0x0F);
        }

        log::debug!("{TERRAIN_FILE}: {width}x{height} tilepoints, tileset {tileset}");
        Ok(Terrain {
            tileset,
            custom_tileset,
            tile_palette,
            cliff_palette,
            map: MapSize {
                width,
                height,
                offset,
            },
            ground_height: layer(width, height, "ground_height", ground_height)?,
            water_height: layer(width, height, "water_height", water_height)?,
            boundary_flag: layer(width, height, "boundary_flag", boundary_flag)?,
            flags: layer(width, height, "flags", flags)?,
            ground_texture: layer(width, height, "ground_texture", ground_texture)?,
            ground_variation: layer(width, height, "ground_variation", ground_variation)?,
            cliff_variation: layer(width, height, "cliff_variation", cliff_variation)?,
            cliff_texture: layer(width, height, "cliff_texture", cliff_texture)?,
            layer_height: layer(width, height, "layer_height", layer_height)?,
        })
    }

    fn write(&self, terrain: &Terrain, writer: &mut W3Writer) -> Result<()> {
        terrain.validate()?;

        writer.write_bytes(TERRAIN_MAGIC);
        writer.write_i32(TERRAIN_VERSION);
        writer.write_chars(&terrain.tileset.to_string(), 1)?;
        writer.write_i32(i32::from(terrain.custom_tileset));
        writer.write_vec(&terrain.tile_palette)?;
        writer.write_vec(&terrain.cliff_palette)?;
        for (field, value) in [("width", terrain.map.width), ("height", terrain.map.height)] {
            let value = i32::try_from(value).map_err(|_| Error::ValueOutOfRange {
                field,
                value: i64::try_from(value).unwrap_or(i64::MAX),
                max: i64::from(i32::MAX),
            })?;
            writer.write_i32(value);
        }
        writer.write_f32(terrain.map.offset[0]);
        writer.write_f32(terrain.map.offset[1]);

        let points = terrain.map.width * terrain.map.height;
        for i in 0..points {
            let water = terrain.water_height.cells()[i];
            if water & BOUNDARY_BIT != 0 {
                return Err(Error::ValueOutOfRange {
                    field: "water height",
                    value: i64::from(water),
                    max: i64::from(BOUNDARY_BIT - 1),
                });
            }
            let water = if terrain.boundary_flag.cells()[i] {
                water | BOUNDARY_BIT
            } else {
                water
            };

            let flags = terrain.flags.cells()[i].bits();
            let ground_texture = nibble("ground texture", terrain.ground_texture.cells()[i])?;
            let ground_variation =
                bounded("ground variation", terrain.ground_variation.cells()[i], 0x1F)?;
            let cliff_variation =
                bounded("cliff variation", terrain.cliff_variation.cells()[i], 0x07)?;
            let cliff_texture = nibble("cliff texture", terrain.cliff_texture.cells()[i])?;
            let layer_height = nibble("layer height", terrain.layer_height.cells()[i])?;

            writer.write_i16(terrain.ground_height.cells()[i]);
            writer.write_i16(water);
            writer.write_u8(flags | ground_texture);
            writer.write_u8((ground_variation << 3) | cliff_variation);
            writer.write_u8((cliff_texture << 4) | layer_height);
        }
        Ok(())
    }
}
