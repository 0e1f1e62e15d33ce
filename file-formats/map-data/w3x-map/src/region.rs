//! Trigger regions (`war3map.w3r`).

use w3_data::{FourCC, W3Reader, W3Vec, W3Writer};

use crate::error::Result;
use crate::translator::{Diagnostic, Translator};

pub const REGIONS_FILE: &str = "war3map.w3r";

const REGIONS_VERSION: i32 = 5;
const REGION_END: u8 = 0xFF;

/// A rectangular region, in world coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
    pub name: String,
    pub id: i32,
    /// Weather effect covering the region
    pub weather: Option<FourCC>,
    pub ambient_sound: String,
    /// Display color as `[r, g, b]`
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegionsTranslator;

impl Translator for RegionsTranslator {
    type Model = Vec<Region>;

    fn label(&self) -> &'static str {
        REGIONS_FILE
    }

    fn read(
        &self,
        reader: &mut W3Reader<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<Region>> {
        let offset = reader.position();
        let version = reader.read_i32()?;
        if version != REGIONS_VERSION {
            diagnostics.push(Diagnostic::new(
                offset,
                format!("unexpected region file version {version}"),
            ));
        }

        let count = reader.read_count()?;
        let mut regions = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            let left = reader.read_f32()?;
            let bottom = reader.read_f32()?;
            let right = reader.read_f32()?;
            let top = reader.read_f32()?;
            let name = reader.read_cstring()?;
            let id = reader.read_i32()?;
            let weather = reader.read_fourcc()?;
            let ambient_sound = reader.read_cstring()?;
            let [b, g, r] = [reader.read_u8()?, reader.read_u8()?, reader.read_u8()?];

            let end_offset = reader.position();
            let end = reader.read_u8()?;
            if end != REGION_END {
                diagnostics.push(Diagnostic::new(
                    end_offset,
                    format!("region {id} ends with 0x{end:02X} instead of 0xFF"),
                ));
            }

            regions.push(Region {
                left,
                bottom,
                right,
                top,
                name,
                id,
                weather: (!weather.is_none()).then_some(weather),
                ambient_sound,
                color: [r, g, b],
            });
        }
        Ok(regions)
    }

    fn write(&self, regions: &Vec<Region>, writer: &mut W3Writer) -> Result<()> {
        writer.write_i32(REGIONS_VERSION);
        writer.write_count(regions.len())?;
        for region in regions {
            writer.write_f32(region.left);
            writer.write_f32(region.bottom);
            writer.write_f32(region.right);
            writer.write_f32(region.top);
            writer.write_cstring(&region.name)?;
            writer.write_i32(region.id);
            writer.write_fourcc(region.weather.unwrap_or(FourCC::NONE));
            writer.write_cstring(&region.ambient_sound)?;
            let [r, g, b] = region.color;
            writer.write_bytes(&[b, g, r, REGION_END]);
        }
        Ok(())
    }
}
