use std::collections::HashSet;

use w3_data::{FourCC, W3Reader, W3Vec, W3Writer};

use super::category::ObjectCategory;
use super::modification::{Modification, ModificationType, ModificationValue};
use super::table::{ModificationMap, ObjectKey, ObjectModificationTable};
use crate::error::{Error, Result};
use crate::translator::{Diagnostic, Translator};

/// Format revision written by [`ObjectTranslator`].
pub const OBJECTS_VERSION: i32 = 2;

/// Codec for one object modification table, data or skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectTranslator {
    category: ObjectCategory,
    skin: bool,
}

impl ObjectTranslator {
    pub fn new(category: ObjectCategory) -> Self {
        Self {
            category,
            skin: false,
        }
    }

    /// Codec for the `war3mapSkin.*` variant of `category`.
    pub fn skin(category: ObjectCategory) -> Self {
        Self {
            category,
            skin: true,
        }
    }

    pub fn category(&self) -> ObjectCategory {
        self.category
    }

    fn read_modification(
        &self,
        reader: &mut W3Reader<'_>,
        owner: (FourCC, FourCC),
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Modification> {
        let id = reader.read_fourcc()?;
        let raw_type = reader.read_i32()?;
        let kind = ModificationType::from_raw(raw_type)
            .ok_or_else(|| Error::invalid_value(self.label(), "modification type", raw_type))?;
        let level = if self.category.is_leveled() {
            Some((reader.read_i32()?, reader.read_i32()?))
        } else {
            None
        };
        let value = match kind {
            ModificationType::Int => ModificationValue::Int(reader.read_i32()?),
            ModificationType::Real => ModificationValue::Real(reader.read_f32()?),
            ModificationType::Unreal => ModificationValue::Unreal(reader.read_f32()?),
            ModificationType::String => ModificationValue::String(reader.read_cstring()?),
        };

        let offset = reader.position();
        let end = reader.read_fourcc()?;
        let (original, new) = owner;
        if !(end.is_none() || end == original || end == new) {
            diagnostics.push(Diagnostic::new(
                offset,
                format!("modification {id} of {original} ends with {end:?}"),
            ));
        }

        Ok(match level {
            Some((level, column)) => Modification::Leveled {
                id,
                value,
                level,
                column,
            },
            None => Modification::Flat { id, value },
        })
    }

    fn read_entry(
        &self,
        reader: &mut W3Reader<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(FourCC, FourCC, Vec<Modification>)> {
        let original = reader.read_fourcc()?;
        let new = reader.read_fourcc()?;
        let count = reader.read_count()?;
        let mut modifications = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            modifications.push(self.read_modification(reader, (original, new), diagnostics)?);
        }
        Ok((original, new, modifications))
    }

    fn write_entry(
        &self,
        writer: &mut W3Writer,
        original: FourCC,
        new: FourCC,
        modifications: &[Modification],
    ) -> Result<()> {
        let own_code = if new.is_none() { original } else { new };
        writer.write_fourcc(original);
        writer.write_fourcc(new);
        writer.write_count(modifications.len())?;

        for modification in modifications {
            if modification.is_leveled() != self.category.is_leveled() {
                return Err(Error::ModificationShape {
                    category: self.category,
                    id: modification.id(),
                    leveled: self.category.is_leveled(),
                });
            }
            writer.write_fourcc(modification.id());
            writer.write_i32(modification.kind().raw());
            if let Some((level, column)) = modification.level() {
                writer.write_i32(level);
                writer.write_i32(column);
            }
            match modification.value() {
                ModificationValue::Int(n) => writer.write_i32(*n),
                ModificationValue::Real(n) | ModificationValue::Unreal(n) => writer.write_f32(*n),
                ModificationValue::String(s) => writer.write_cstring(s)?,
            }
            writer.write_fourcc(own_code);
        }
        Ok(())
    }
}

impl Translator for ObjectTranslator {
    type Model = ObjectModificationTable;

    fn label(&self) -> &'static str {
        if self.skin {
            self.category.skin_file_name()
        } else {
            self.category.file_name()
        }
    }

    fn read(
        &self,
        reader: &mut W3Reader<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<ObjectModificationTable> {
        let version = reader.read_i32()?;
        if !(1..=OBJECTS_VERSION).contains(&version) {
            return Err(Error::UnsupportedVersion {
                file: self.label(),
                version,
            });
        }

        let mut original = ModificationMap::new();
        let count = reader.read_count()?;
        for _ in 0..count {
            let offset = reader.position();
            let (code, new, modifications) = self.read_entry(reader, diagnostics)?;
            if !new.is_none() {
                diagnostics.push(Diagnostic::new(
                    offset,
                    format!("stock object {code} carries new id {new:?}"),
                ));
            }
            if original.insert(code, modifications).is_some() {
                diagnostics.push(Diagnostic::new(offset, format!("{code} is listed twice")));
            }
        }

        let mut custom = ModificationMap::new();
        let mut custom_codes = HashSet::new();
        let count = reader.read_count()?;
        for _ in 0..count {
            let offset = reader.position();
            let (parent, code, modifications) = self.read_entry(reader, diagnostics)?;
            if code.is_none() {
                return Err(Error::invalid_value(
                    self.label(),
                    "custom object id",
                    format!("empty id derived from {parent} at offset {offset}"),
                ));
            }
            if parent.is_none() {
                return Err(Error::invalid_value(
                    self.label(),
                    "custom object parent",
                    format!("empty parent of {code} at offset {offset}"),
                ));
            }
            if original.contains_key(&code) {
                diagnostics.push(Diagnostic::new(
                    offset,
                    format!("{code} is both a stock override and a custom object"),
                ));
            }
            if !custom_codes.insert(code) {
                diagnostics.push(Diagnostic::new(offset, format!("{code} is listed twice")));
            }
            custom.insert(ObjectKey::new(code, parent), modifications);
        }

        log::debug!(
            "{}: {} stock overrides, {} custom objects",
            self.label(),
            original.len(),
            custom.len()
        );
        Ok(ObjectModificationTable { original, custom })
    }

    fn write(&self, table: &ObjectModificationTable, writer: &mut W3Writer) -> Result<()> {
        writer.write_i32(OBJECTS_VERSION);

        writer.write_count(table.original.len())?;
        for (code, modifications) in table.original.iter() {
            self.write_entry(writer, *code, FourCC::NONE, modifications)?;
        }

        writer.write_count(table.custom.len())?;
        for (key, modifications) in table.custom.iter() {
            self.write_entry(writer, key.parent, key.code, modifications)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(s: &str) -> FourCC {
        s.parse().unwrap()
    }

    fn unit_table() -> ObjectModificationTable {
        let mut table = ObjectModificationTable::new();
        table
            .insert_original(
                code("hfoo"),
                vec![
                    Modification::flat(code("uhpm"), 500),
                    Modification::flat(code("umvs"), 300.5f32),
                ],
            )
            .unwrap();
        table
            .insert_custom(
                ObjectKey::new(code("H000"), code("Hpal")),
                vec![Modification::flat(code("unam"), "Test Hero")],
            )
            .unwrap();
        table
    }

    #[test]
    fn test_flat_round_trip() {
        let table = unit_table();
        let translator = ObjectTranslator::new(ObjectCategory::Units);
        let bytes = translator.encode(&table).unwrap();
        let decoded = translator.decode(&bytes).unwrap();
        assert!(decoded.diagnostics.is_empty());
        assert_eq!(decoded.model, table);
        assert_eq!(translator.encode(&decoded.model).unwrap(), bytes);
    }

    #[test]
    fn test_flat_layout() {
        let mut table = ObjectModificationTable::new();
        table
            .insert_custom(
                ObjectKey::new(code("h000"), code("hfoo")),
                vec![Modification::flat(code("uhpm"), 1)],
            )
            .unwrap();
        let bytes = ObjectTranslator::new(ObjectCategory::Units)
            .encode(&table)
            .unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&2i32.to_le_bytes());
        expected.extend_from_slice(&0i32.to_le_bytes());
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(b"hfooh000");
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(b"uhpm");
        expected.extend_from_slice(&0i32.to_le_bytes());
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(b"h000");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_leveled_round_trip() {
        let mut table = ObjectModificationTable::new();
        table
            .insert_custom(
                ObjectKey::new(code("A000"), code("AHbz")),
                vec![
                    Modification::leveled(code("alev"), 3, 0, 0),
                    Modification::leveled(code("Hbz2"), 45.25f32, 2, 2),
                    Modification::leveled(code("atp1"), "Blizzard", 1, 0),
                ],
            )
            .unwrap();

        let translator = ObjectTranslator::new(ObjectCategory::Abilities);
        let bytes = translator.encode(&table).unwrap();
        let decoded = translator.decode(&bytes).unwrap();
        assert_eq!(decoded.model, table);
    }

    #[test]
    fn test_shape_mismatch() {
        let table = unit_table();
        assert!(matches!(
            ObjectTranslator::new(ObjectCategory::Abilities).encode(&table),
            Err(Error::ModificationShape {
                category: ObjectCategory::Abilities,
                leveled: true,
                ..
            })
        ));
    }

    #[test]
    fn test_crs_field_keeps_nul_byte() {
        let mut table = ObjectModificationTable::new();
        table
            .insert_original(
                code("Acrs"),
                vec![Modification::leveled(FourCC::new(*b"Crs\0"), 0.5f32, 1, 1)],
            )
            .unwrap();
        let translator = ObjectTranslator::new(ObjectCategory::Abilities);
        let decoded = translator
            .decode(&translator.encode(&table).unwrap())
            .unwrap()
            .model;
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_version_one_is_read() {
        let translator = ObjectTranslator::new(ObjectCategory::Units);
        let mut bytes = translator.encode(&unit_table()).unwrap();
        bytes[0] = 1;
        assert_eq!(translator.decode(&bytes).unwrap().model, unit_table());

        bytes[0] = 3;
        assert!(matches!(
            translator.decode(&bytes),
            Err(Error::UnsupportedVersion { version: 3, .. })
        ));
    }

    #[test]
    fn test_foreign_end_token_is_diagnostic() {
        let translator = ObjectTranslator::new(ObjectCategory::Units);
        let mut bytes = translator.encode(&unit_table()).unwrap();
        let len = bytes.len();
        bytes[len - 4..].copy_from_slice(b"XXXX");
        let decoded = translator.decode(&bytes).unwrap();
        assert_eq!(decoded.model, unit_table());
        assert_eq!(decoded.diagnostics.len(), 1);
    }

    #[test]
    fn test_zero_end_token_accepted() {
        let translator = ObjectTranslator::new(ObjectCategory::Units);
        let mut bytes = translator.encode(&unit_table()).unwrap();
        let len = bytes.len();
        bytes[len - 4..].copy_from_slice(&[0; 4]);
        assert!(translator.decode(&bytes).unwrap().diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_value_type() {
        let translator = ObjectTranslator::new(ObjectCategory::Units);
        let mut bytes = translator.encode(&unit_table()).unwrap();
        // version, count, hfoo, 0000, count, uhpm
        bytes[24] = 7;
        assert!(matches!(
            translator.decode(&bytes),
            Err(Error::InvalidValue {
                field: "modification type",
                ..
            })
        ));
    }

    /// A version 2 table holding only custom entries without modifications.
    fn custom_entries(entries: &[(FourCC, FourCC)]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&(entries.len() as i32).to_le_bytes());
        for (parent, code) in entries {
            bytes.extend_from_slice(parent.as_bytes());
            bytes.extend_from_slice(code.as_bytes());
            bytes.extend_from_slice(&0i32.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_custom_entry_without_parent() {
        let bytes = custom_entries(&[(FourCC::NONE, code("h000"))]);
        assert!(matches!(
            ObjectTranslator::new(ObjectCategory::Units).decode(&bytes),
            Err(Error::InvalidValue {
                field: "custom object parent",
                ..
            })
        ));
    }

    #[test]
    fn test_custom_code_repeated_under_other_parent() {
        let bytes = custom_entries(&[(code("hfoo"), code("h000")), (code("hkni"), code("h000"))]);
        let decoded = ObjectTranslator::new(ObjectCategory::Units)
            .decode(&bytes)
            .unwrap();
        assert_eq!(decoded.model.custom.len(), 2);
        assert_eq!(decoded.diagnostics.len(), 1);
        assert!(decoded.diagnostics[0].message.contains("h000 is listed twice"));
    }

    #[test]
    fn test_skin_label() {
        assert_eq!(
            ObjectTranslator::skin(ObjectCategory::Units).label(),
            "war3mapSkin.w3u"
        );
        assert_eq!(
            ObjectTranslator::new(ObjectCategory::Buffs).label(),
            "war3map.w3h"
        );
    }
}
