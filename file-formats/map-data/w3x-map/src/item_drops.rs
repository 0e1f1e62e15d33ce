//! Item drop tables attached to placed units and destructibles.

use w3_data::{FourCC, W3DataR, W3DataW, W3Reader, W3Vec, W3Writer};

/// One possible drop and its chance in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDrop {
    pub item: FourCC,
    pub chance: i32,
}

impl W3DataR for ItemDrop {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            item: reader.read_fourcc()?,
            chance: reader.read_i32()?,
        })
    }
}

impl W3DataW for ItemDrop {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_fourcc(self.item);
        writer.write_i32(self.chance);
        Ok(())
    }
}

/// A set of drops of which at most one is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemSet {
    pub items: Vec<ItemDrop>,
}

impl W3DataR for ItemSet {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            items: reader.read_vec()?,
        })
    }
}

impl W3DataW for ItemSet {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_vec(&self.items)
    }
}

/// Drops carried by a placed object: a map-level random item table, or
/// inline sets, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDrops {
    /// Index into the map's random item tables, `-1` for none
    pub table: i32,
    pub sets: Vec<ItemSet>,
}

impl Default for ItemDrops {
    fn default() -> Self {
        Self {
            table: -1,
            sets: Vec::new(),
        }
    }
}

impl W3DataR for ItemDrops {
    fn read_from(reader: &mut W3Reader<'_>) -> w3_data::Result<Self> {
        Ok(Self {
            table: reader.read_i32()?,
            sets: reader.read_vec()?,
        })
    }
}

impl W3DataW for ItemDrops {
    fn write_to(&self, writer: &mut W3Writer) -> w3_data::Result<()> {
        writer.write_i32(self.table);
        writer.write_vec(&self.sets)
    }
}
