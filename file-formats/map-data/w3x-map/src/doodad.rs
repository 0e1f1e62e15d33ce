//! Pre-placed doodads and destructibles (`war3map.doo`).

use bitflags::bitflags;
use w3_data::{FourCC, W3DataR, W3DataW, W3Reader, W3Vec, W3Writer};

use crate::error::{Error, Result};
use crate::item_drops::ItemDrops;
use crate::translator::{Diagnostic, Translator, expect_magic};

pub const DOODADS_FILE: &str = "war3map.doo";

const DOO_MAGIC: &[u8; 4] = b"W3do";
const DOO_VERSION: i32 = 8;
const DOO_SUBVERSION: i32 = 11;
const SPECIAL_DOODADS_VERSION: i32 = 0;

/// Read the header shared by the unit and doodad placement files.
pub(crate) fn read_doo_header(
    reader: &mut W3Reader<'_>,
    file: &'static str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<()> {
    expect_magic(reader, file, DOO_MAGIC)?;
    let version = reader.read_i32()?;
    if version != DOO_VERSION {
        return Err(Error::UnsupportedVersion { file, version });
    }
    let offset = reader.position();
    let subversion = reader.read_i32()?;
    if subversion < DOO_SUBVERSION {
        // Older layouts have no skin field.
        return Err(Error::UnsupportedVersion {
            file,
            version: subversion,
        });
    }
    if subversion != DOO_SUBVERSION {
        diagnostics.push(Diagnostic::new(
            offset,
            format!("subversion {subversion} read as {DOO_SUBVERSION}"),
        ));
    }
    Ok(())
}

pub(crate) fn write_doo_header(writer: &mut W3Writer) {
    writer.write_bytes(DOO_MAGIC);
    writer.write_i32(DOO_VERSION);
    writer.write_i32(DOO_SUBVERSION);
}

bitflags! {
    /// Visibility and collision state of a placed doodad.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DoodadFlags: u8 {
        const VISIBLE = 0x01;
        const SOLID = 0x02;
        /// Z position is absolute instead of following the terrain
        const CUSTOM_HEIGHT = 0x04;

        const _ = !0;
    }
}

impl Default for DoodadFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::SOLID
    }
}

/// A doodad or destructible placed on the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Doodad {
    pub type_id: FourCC,
    pub variation: i32,
    pub position: [f32; 3],
    /// Facing, in radians
    pub angle: f32,
    pub scale: [f32; 3],
    pub skin: FourCC,
    pub flags: DoodadFlags,
    /// Remaining life, in percent
    pub life: u8,
    pub drops: ItemDrops,
    pub creation_id: i32,
}

impl Default for Doodad {
    fn default() -> Self {
        Self {
            type_id: FourCC::NONE,
            variation: 0,
            position: [0.0; 3],
            angle: 0.0,
            scale: [1.0; 3],
            skin: FourCC::NONE,
            flags: DoodadFlags::default(),
            life: 100,
            drops: ItemDrops::default(),
            creation_id: 0,
        }
    }
}

impl W3DataR for Doodad {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            type_id: reader.read_fourcc()?,
            variation: reader.read_i32()?,
            position: <[f32; 3]>::read_from(reader)?,
            angle: reader.read_f32()?,
            scale: <[f32; 3]>::read_from(reader)?,
            skin: reader.read_fourcc()?,
            flags: DoodadFlags::from_bits_retain(reader.read_u8()?),
            life: reader.read_u8()?,
            drops: ItemDrops::read_from(reader)?,
            creation_id: reader.read_i32()?,
        })
    }
}

impl W3DataW for Doodad {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_fourcc(self.type_id);
        writer.write_i32(self.variation);
        self.position.write_to(writer)?;
        writer.write_f32(self.angle);
        self.scale.write_to(writer)?;
        writer.write_fourcc(self.skin);
        writer.write_u8(self.flags.bits());
        writer.write_u8(self.life);
        self.drops.write_to(writer)?;
        writer.write_i32(self.creation_id);
        Ok(())
    }
}

/// A doodad baked into the terrain, such as a cliff-side decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecialDoodad {
    pub type_id: FourCC,
    pub variation: i32,
    /// Tile coordinates
    pub position: [i32; 2],
}

impl W3DataR for SpecialDoodad {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            type_id: reader.read_fourcc()?,
            variation: reader.read_i32()?,
            position: [reader.read_i32()?, reader.read_i32()?],
        })
    }
}

impl W3DataW for SpecialDoodad {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_fourcc(self.type_id);
        writer.write_i32(self.variation);
        writer.write_i32(self.position[0]);
        writer.write_i32(self.position[1]);
        Ok(())
    }
}

/// Both placement lists stored in `war3map.doo`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoodadPlacements {
    pub doodads: Vec<Doodad>,
    pub special: Vec<SpecialDoodad>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DoodadsTranslator;

impl Translator for DoodadsTranslator {
    type Model = DoodadPlacements;

    fn label(&self) -> &'static str {
        DOODADS_FILE
    }

    fn read(
        &self,
        reader: &mut W3Reader<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<DoodadPlacements> {
        read_doo_header(reader, DOODADS_FILE, diagnostics)?;
        let doodads: Vec<Doodad> = reader.read_vec()?;

        let offset = reader.position();
        let special_version = reader.read_i32()?;
        if special_version != SPECIAL_DOODADS_VERSION {
            diagnostics.push(Diagnostic::new(
                offset,
                format!("unexpected special doodad version {special_version}"),
            ));
        }
        let special: Vec<SpecialDoodad> = reader.read_vec()?;

        log::debug!(
            "{DOODADS_FILE}: read {} doodads, {} special doodads",
            doodads.len(),
            special.len()
        );
        Ok(DoodadPlacements { doodads, special })
    }

    fn write(&self, model: &DoodadPlacements, writer: &mut W3Writer) -> Result<()> {
        write_doo_header(writer);
        writer.write_vec(&model.doodads)?;
        writer.write_i32(SPECIAL_DOODADS_VERSION);
        writer.write_vec(&model.special)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn placements() -> DoodadPlacements {
        DoodadPlacements {
            doodads: vec![
                Doodad {
                    type_id: FourCC::new(*b"LTlt"),
                    variation: 3,
                    position: [64.0, -192.0, 12.25],
                    angle: 1.571,
                    scale: [0.9, 0.9, 0.9],
                    skin: FourCC::new(*b"LTlt"),
                    creation_id: 1,
                    ..Default::default()
                },
                Doodad {
                    type_id: FourCC::new(*b"LTbr"),
                    flags: DoodadFlags::VISIBLE | DoodadFlags::CUSTOM_HEIGHT,
                    life: 50,
                    creation_id: 2,
                    ..Default::default()
                },
            ],
            special: vec![SpecialDoodad {
                type_id: FourCC::new(*b"ZPsh"),
                variation: 0,
                position: [12, 40],
            }],
        }
    }

    #[test]
    fn test_round_trip() {
        let model = placements();
        let bytes = DoodadsTranslator.encode(&model).unwrap();
        let decoded = DoodadsTranslator.decode(&bytes).unwrap();
        assert!(decoded.diagnostics.is_empty());
        assert_eq!(decoded.model, model);
        assert_eq!(DoodadsTranslator.encode(&decoded.model).unwrap(), bytes);
    }

    #[test]
    fn test_unknown_flag_bits_survive() {
        let model = DoodadPlacements {
            doodads: vec![Doodad {
                flags: DoodadFlags::from_bits_retain(0x83),
                ..Default::default()
            }],
            special: Vec::new(),
        };
        let bytes = DoodadsTranslator.encode(&model).unwrap();
        let decoded = DoodadsTranslator.decode(&bytes).unwrap().model;
        assert_eq!(decoded.doodads[0].flags.bits(), 0x83);
        assert!(decoded.doodads[0].flags.contains(DoodadFlags::SOLID));
    }

    #[test]
    fn test_header_checks() {
        let mut bytes = DoodadsTranslator.encode(&placements()).unwrap();
        bytes[4] = 7;
        assert!(matches!(
            DoodadsTranslator.decode(&bytes),
            Err(Error::UnsupportedVersion { version: 7, .. })
        ));

        bytes[4] = 8;
        bytes[0] = b'X';
        assert!(matches!(
            DoodadsTranslator.decode(&bytes),
            Err(Error::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_newer_subversion_is_diagnostic() {
        let mut bytes = DoodadsTranslator.encode(&placements()).unwrap();
        bytes[8] = 12;
        let decoded = DoodadsTranslator.decode(&bytes).unwrap();
        assert_eq!(decoded.model, placements());
        assert_eq!(decoded.diagnostics.len(), 1);
    }
}
