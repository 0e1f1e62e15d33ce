//! Authoring layer over [`MapData`]: new object types and their placements.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use w3_data::FourCC;

use crate::doodad::{Doodad, DoodadPlacements, DoodadsTranslator};
use crate::error::{Error, Result};
use crate::file_kind::FileKind;
use crate::generator::{CodeCase, FourCCGenerator};
use crate::info::MapInfo;
use crate::map_data::{LoadOptions, MapData};
use crate::objects::{
    Modification, ModificationMap, ObjectCategory, ObjectKey, ObjectModificationTable,
    ObjectTranslator,
};
use crate::terrain::Terrain;
use crate::translator::Translator;
use crate::unit::{Unit, UnitsTranslator};

/// Parent of every doodad type created with [`MapManager::add_doodad_type`].
pub const BASE_DOODAD_TYPE: FourCC = FourCC::new(*b"YOlb");
/// Parent of every destructible type created with [`MapManager::add_doodad_type`].
pub const BASE_DESTRUCTIBLE_TYPE: FourCC = FourCC::new(*b"OTds");

/// Categories whose custom section is owned by the manager.
const MANAGED: [ObjectCategory; 5] = [
    ObjectCategory::Units,
    ObjectCategory::Doodads,
    ObjectCategory::Destructibles,
    ObjectCategory::Abilities,
    ObjectCategory::Buffs,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitKind {
    /// Gets an upper-case code
    Hero,
    /// Gets a lower-case code
    Unit,
}

/// A custom object type: a generated code, the stock type it clones and
/// the fields it overrides.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectType {
    pub code: FourCC,
    pub parent: FourCC,
    pub data: Vec<Modification>,
}

impl ObjectType {
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.code, self.parent)
    }
}

static NEXT_MANAGER: AtomicU64 = AtomicU64::new(1);

/// The manager and load generation a handle was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Owner {
    manager: u64,
    generation: u32,
}

impl Owner {
    fn fresh() -> Self {
        Self {
            manager: NEXT_MANAGER.fetch_add(1, Ordering::Relaxed),
            generation: 0,
        }
    }

    fn next_generation(self) -> Self {
        Self {
            generation: self.generation.wrapping_add(1),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitTypeId {
    owner: Owner,
    index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DoodadTypeId {
    owner: Owner,
    destructible: bool,
    index: usize,
}

impl DoodadTypeId {
    pub fn is_destructible(&self) -> bool {
        self.destructible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbilityTypeId {
    owner: Owner,
    index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuffTypeId {
    owner: Owner,
    index: usize,
}

/// The type of a placed instance: one of the manager's types, or any other
/// code (stock or defined elsewhere).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef<H> {
    Custom(H),
    Stock(FourCC),
}

impl<H> From<FourCC> for TypeRef<H> {
    fn from(code: FourCC) -> Self {
        TypeRef::Stock(code)
    }
}

impl From<UnitTypeId> for TypeRef<UnitTypeId> {
    fn from(id: UnitTypeId) -> Self {
        TypeRef::Custom(id)
    }
}

impl From<DoodadTypeId> for TypeRef<DoodadTypeId> {
    fn from(id: DoodadTypeId) -> Self {
        TypeRef::Custom(id)
    }
}

/// A unit placement whose type is resolved when the map is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedUnit {
    pub type_ref: TypeRef<UnitTypeId>,
    /// Placement data; `type_id` is overwritten on save
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedDoodad {
    pub type_ref: TypeRef<DoodadTypeId>,
    /// Placement data; `type_id` is overwritten on save
    pub doodad: Doodad,
}

/// Registers new object types and instances and merges them into the map
/// on save.
///
/// The manager owns the custom section of the unit, doodad, destructible,
/// ability and buff tables: on save those sections are rebuilt from the
/// manager's types. Custom entries present at load time are adopted as
/// types, so they survive unless removed.
///
/// Type handles belong to the manager that issued them and are only valid
/// until its next [`load`](Self::load). A clone accepts the handles of the
/// manager it was cloned from.
#[derive(Debug, Clone)]
pub struct MapManager {
    owner: Owner,
    map: MapData,
    generator: FourCCGenerator,
    unit_types: Vec<ObjectType>,
    doodad_types: Vec<ObjectType>,
    destructible_types: Vec<ObjectType>,
    ability_types: Vec<ObjectType>,
    buff_types: Vec<ObjectType>,
    units: Vec<PlacedUnit>,
    doodads: Vec<PlacedDoodad>,
}

impl Default for MapManager {
    fn default() -> Self {
        Self::with_options(LoadOptions::default())
    }
}

impl MapManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            owner: Owner::fresh(),
            map: MapData::with_options(options),
            generator: FourCCGenerator::new(),
            unit_types: Vec::new(),
            doodad_types: Vec::new(),
            destructible_types: Vec::new(),
            ability_types: Vec::new(),
            buff_types: Vec::new(),
            units: Vec::new(),
            doodads: Vec::new(),
        }
    }

    /// Load a map directory and adopt its custom types and placements.
    ///
    /// Handles issued before the load are rejected afterwards.
    pub fn load(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        self.map.load(dir)?;
        let map = &self.map;
        let owner = self.owner.next_generation();

        let mut generator = FourCCGenerator::new();
        for category in ObjectCategory::ALL {
            for code in map.objects(category).codes().chain(map.skins(category).codes()) {
                generator.add_used(code);
            }
        }
        for unit in map.units() {
            generator.add_used(unit.type_id);
        }
        for doodad in map.doodads() {
            generator.add_used(doodad.type_id);
        }

        let adopt = |category: ObjectCategory| -> Vec<ObjectType> {
            map.objects(category)
                .custom
                .iter()
                .map(|(key, data)| ObjectType {
                    code: key.code,
                    parent: key.parent,
                    data: data.to_vec(),
                })
                .collect()
        };
        let unit_types = adopt(ObjectCategory::Units);
        let doodad_types = adopt(ObjectCategory::Doodads);
        let destructible_types = adopt(ObjectCategory::Destructibles);
        let ability_types = adopt(ObjectCategory::Abilities);
        let buff_types = adopt(ObjectCategory::Buffs);

        let units = map
            .units()
            .iter()
            .map(|unit| PlacedUnit {
                type_ref: find_type(&unit_types, unit.type_id).map_or(
                    TypeRef::Stock(unit.type_id),
                    |index| TypeRef::Custom(UnitTypeId { owner, index }),
                ),
                unit: unit.clone(),
            })
            .collect();
        let doodads = map
            .doodads()
            .iter()
            .map(|doodad| {
                let code = doodad.type_id;
                let custom = find_type(&doodad_types, code)
                    .map(|index| DoodadTypeId {
                        owner,
                        destructible: false,
                        index,
                    })
                    .or_else(|| {
                        find_type(&destructible_types, code).map(|index| DoodadTypeId {
                            owner,
                            destructible: true,
                            index,
                        })
                    });
                PlacedDoodad {
                    type_ref: custom.map_or(TypeRef::Stock(code), TypeRef::Custom),
                    doodad: doodad.clone(),
                }
            })
            .collect();

        log::debug!(
            "Adopted {} unit, {} doodad, {} destructible, {} ability and {} buff types",
            unit_types.len(),
            doodad_types.len(),
            destructible_types.len(),
            ability_types.len(),
            buff_types.len()
        );

        self.owner = owner;
        self.generator = generator;
        self.unit_types = unit_types;
        self.doodad_types = doodad_types;
        self.destructible_types = destructible_types;
        self.ability_types = ability_types;
        self.buff_types = buff_types;
        self.units = units;
        self.doodads = doodads;
        Ok(())
    }

    pub fn map(&self) -> &MapData {
        &self.map
    }

    /// Direct access to the underlying tables. Custom sections of the
    /// managed categories are replaced on save.
    pub fn map_mut(&mut self) -> &mut MapData {
        &mut self.map
    }

    pub fn generator(&self) -> &FourCCGenerator {
        &self.generator
    }

    pub fn info(&self) -> Option<&MapInfo> {
        self.map.info()
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.map.terrain()
    }

    pub fn terrain_mut(&mut self) -> Option<&mut Terrain> {
        self.map.terrain_mut()
    }

    pub fn add_unit_type(
        &mut self,
        kind: UnitKind,
        parent: FourCC,
        data: Vec<Modification>,
    ) -> Result<UnitTypeId> {
        check_type(ObjectCategory::Units, parent, &data)?;
        let case = match kind {
            UnitKind::Hero => CodeCase::Upper,
            UnitKind::Unit => CodeCase::Lower,
        };
        let code = self.generator.generate(case)?;
        log::debug!("New unit type {code} from {parent}");
        self.unit_types.push(ObjectType { code, parent, data });
        Ok(UnitTypeId {
            owner: self.owner,
            index: self.unit_types.len() - 1,
        })
    }

    /// Create a doodad or destructible type cloned from the fixed base type
    /// of its kind.
    ///
    /// Doodad modifications are leveled, destructible ones are flat.
    pub fn add_doodad_type(
        &mut self,
        data: Vec<Modification>,
        is_destructible: bool,
    ) -> Result<DoodadTypeId> {
        let (category, parent) = if is_destructible {
            (ObjectCategory::Destructibles, BASE_DESTRUCTIBLE_TYPE)
        } else {
            (ObjectCategory::Doodads, BASE_DOODAD_TYPE)
        };
        check_type(category, parent, &data)?;
        let code = self.generator.generate(CodeCase::Lower)?;
        let types = if is_destructible {
            &mut self.destructible_types
        } else {
            &mut self.doodad_types
        };
        log::debug!("New doodad type {code} from {parent}");
        types.push(ObjectType { code, parent, data });
        Ok(DoodadTypeId {
            owner: self.owner,
            destructible: is_destructible,
            index: types.len() - 1,
        })
    }

    pub fn add_ability_type(
        &mut self,
        parent: FourCC,
        data: Vec<Modification>,
    ) -> Result<AbilityTypeId> {
        check_type(ObjectCategory::Abilities, parent, &data)?;
        let code = self.generator.generate(CodeCase::Any)?;
        self.ability_types.push(ObjectType { code, parent, data });
        Ok(AbilityTypeId {
            owner: self.owner,
            index: self.ability_types.len() - 1,
        })
    }

    pub fn add_buff_type(&mut self, parent: FourCC, data: Vec<Modification>) -> Result<BuffTypeId> {
        check_type(ObjectCategory::Buffs, parent, &data)?;
        let code = self.generator.generate(CodeCase::Any)?;
        self.buff_types.push(ObjectType { code, parent, data });
        Ok(BuffTypeId {
            owner: self.owner,
            index: self.buff_types.len() - 1,
        })
    }

    pub fn unit_type(&self, id: UnitTypeId) -> Option<&ObjectType> {
        self.unit_types.get(id.index).filter(|_| self.owns(id.owner))
    }

    pub fn unit_type_mut(&mut self, id: UnitTypeId) -> Option<&mut ObjectType> {
        if !self.owns(id.owner) {
            return None;
        }
        self.unit_types.get_mut(id.index)
    }

    pub fn doodad_type(&self, id: DoodadTypeId) -> Option<&ObjectType> {
        if !self.owns(id.owner) {
            return None;
        }
        if id.destructible {
            self.destructible_types.get(id.index)
        } else {
            self.doodad_types.get(id.index)
        }
    }

    pub fn doodad_type_mut(&mut self, id: DoodadTypeId) -> Option<&mut ObjectType> {
        if !self.owns(id.owner) {
            return None;
        }
        if id.destructible {
            self.destructible_types.get_mut(id.index)
        } else {
            self.doodad_types.get_mut(id.index)
        }
    }

    pub fn ability_type(&self, id: AbilityTypeId) -> Option<&ObjectType> {
        self.ability_types.get(id.index).filter(|_| self.owns(id.owner))
    }

    pub fn buff_type(&self, id: BuffTypeId) -> Option<&ObjectType> {
        self.buff_types.get(id.index).filter(|_| self.owns(id.owner))
    }

    pub fn unit_types(&self) -> &[ObjectType] {
        &self.unit_types
    }

    pub fn doodad_types(&self) -> &[ObjectType] {
        &self.doodad_types
    }

    pub fn destructible_types(&self) -> &[ObjectType] {
        &self.destructible_types
    }

    pub fn ability_types(&self) -> &[ObjectType] {
        &self.ability_types
    }

    pub fn buff_types(&self) -> &[ObjectType] {
        &self.buff_types
    }

    /// Place a unit. Returns its index in [`units`](Self::units).
    pub fn add_unit(&mut self, ty: impl Into<TypeRef<UnitTypeId>>, unit: Unit) -> Result<usize> {
        let type_ref = ty.into();
        self.unit_code(type_ref)?;
        self.units.push(PlacedUnit { type_ref, unit });
        Ok(self.units.len() - 1)
    }

    /// Place a doodad or destructible. Returns its index in
    /// [`doodads`](Self::doodads).
    pub fn add_doodad(
        &mut self,
        ty: impl Into<TypeRef<DoodadTypeId>>,
        doodad: Doodad,
    ) -> Result<usize> {
        let type_ref = ty.into();
        self.doodad_code(type_ref)?;
        self.doodads.push(PlacedDoodad { type_ref, doodad });
        Ok(self.doodads.len() - 1)
    }

    pub fn units(&self) -> &[PlacedUnit] {
        &self.units
    }

    pub fn doodads(&self) -> &[PlacedDoodad] {
        &self.doodads
    }

    /// Remove every placed unit, including those loaded from the map.
    pub fn clear_units(&mut self) {
        self.units.clear();
    }

    /// Remove every placed doodad, including those loaded from the map.
    pub fn clear_doodads(&mut self) {
        self.doodads.clear();
    }

    /// The code a unit type reference resolves to.
    pub fn unit_code(&self, type_ref: TypeRef<UnitTypeId>) -> Result<FourCC> {
        match type_ref {
            TypeRef::Stock(code) => Ok(code),
            TypeRef::Custom(id) => self
                .unit_type(id)
                .map(|ty| ty.code)
                .ok_or(Error::InvalidHandle),
        }
    }

    /// The code a doodad type reference resolves to.
    pub fn doodad_code(&self, type_ref: TypeRef<DoodadTypeId>) -> Result<FourCC> {
        match type_ref {
            TypeRef::Stock(code) => Ok(code),
            TypeRef::Custom(id) => self
                .doodad_type(id)
                .map(|ty| ty.code)
                .ok_or(Error::InvalidHandle),
        }
    }

    /// Write the map to `dir` and make it the map directory.
    pub fn save_to(&mut self, dir: impl Into<PathBuf>) -> Result<Vec<FileKind>> {
        self.map.set_map_dir(dir);
        self.save()
    }

    /// Merge types and placements into the map and write every touched file.
    ///
    /// Every file is encoded before anything in memory or on disk changes,
    /// so any error short of I/O leaves both intact. An I/O failure can
    /// leave some files written; saving again writes the same bytes.
    pub fn save(&mut self) -> Result<Vec<FileKind>> {
        if self.map.map_dir().is_none() {
            return Err(Error::NoMapDirectory);
        }

        let mut tables = Vec::with_capacity(MANAGED.len());
        for category in MANAGED {
            let types = self.types_of(category);
            let current = self.map.objects(category);
            let mut staged = ObjectModificationTable {
                original: current.original.clone(),
                custom: ModificationMap::new(),
            };
            for ty in types {
                if staged.custom.contains_key(&ty.key()) {
                    return Err(Error::DuplicateObjectCode(ty.code));
                }
                staged.insert_custom(ty.key(), ty.data.clone())?;
            }
            if staged != *current || !types.is_empty() {
                tables.push((category, staged));
            }
        }

        let units = self
            .units
            .iter()
            .map(|placed| {
                let code = self.unit_code(placed.type_ref)?;
                let mut unit = placed.unit.clone();
                unit.type_id = code;
                if unit.skin.is_none() {
                    unit.skin = code;
                }
                Ok(unit)
            })
            .collect::<Result<Vec<_>>>()?;
        let doodads = DoodadPlacements {
            doodads: self
                .doodads
                .iter()
                .map(|placed| {
                    let code = self.doodad_code(placed.type_ref)?;
                    let mut doodad = placed.doodad.clone();
                    doodad.type_id = code;
                    if doodad.skin.is_none() {
                        doodad.skin = code;
                    }
                    Ok(doodad)
                })
                .collect::<Result<Vec<_>>>()?,
            special: self.map.special_doodads().to_vec(),
        };

        let mut kinds: BTreeSet<FileKind> = self.map.touched().collect();
        kinds.extend([FileKind::Units, FileKind::Doodads]);
        if self.map.terrain().is_some() {
            kinds.insert(FileKind::Terrain);
        }
        kinds.extend(tables.iter().map(|(category, _)| FileKind::Objects(*category)));

        let mut files = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let bytes = match kind {
                FileKind::Units => UnitsTranslator.encode(&units)?,
                FileKind::Doodads => DoodadsTranslator.encode(&doodads)?,
                FileKind::Objects(category) => {
                    match tables.iter().find(|(table_category, _)| *table_category == category) {
                        Some((_, table)) => ObjectTranslator::new(category).encode(table)?,
                        None => self.map.encode(kind)?,
                    }
                }
                _ => self.map.encode(kind)?,
            };
            files.push((kind, bytes));
        }

        for (category, staged) in tables {
            *self.map.objects_mut(category) = staged;
        }
        *self.map.units_mut() = units;
        *self.map.doodads_mut() = doodads.doodads;
        if self.map.terrain().is_some() {
            self.map.touch(FileKind::Terrain);
        }

        let saved = self.map.write_files(files)?;
        log::info!(
            "Saved {} types, {} units and {} doodads",
            self.unit_types.len()
                + self.doodad_types.len()
                + self.destructible_types.len()
                + self.ability_types.len()
                + self.buff_types.len(),
            self.units.len(),
            self.doodads.len()
        );
        Ok(saved)
    }

    fn owns(&self, owner: Owner) -> bool {
        self.owner == owner
    }

    fn types_of(&self, category: ObjectCategory) -> &[ObjectType] {
        match category {
            ObjectCategory::Units => &self.unit_types,
            ObjectCategory::Doodads => &self.doodad_types,
            ObjectCategory::Destructibles => &self.destructible_types,
            ObjectCategory::Abilities => &self.ability_types,
            ObjectCategory::Buffs => &self.buff_types,
            ObjectCategory::Items | ObjectCategory::Upgrades => &[],
        }
    }
}

/// Reject a new type whose parent is empty or whose modifications have the
/// wrong shape for `category`.
fn check_type(category: ObjectCategory, parent: FourCC, data: &[Modification]) -> Result<()> {
    if parent.is_none() {
        return Err(Error::MissingParent);
    }
    let leveled = category.is_leveled();
    match data.iter().find(|modification| modification.is_leveled() != leveled) {
        Some(modification) => Err(Error::ModificationShape {
            category,
            id: modification.id(),
            leveled,
        }),
        None => Ok(()),
    }
}

fn find_type(types: &[ObjectType], code: FourCC) -> Option<usize> {
    types.iter().position(|ty| ty.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(s: &str) -> FourCC {
        s.parse().unwrap()
    }

    #[test]
    fn test_unit_type_codes_follow_kind() {
        let mut manager = MapManager::new();
        let hero = manager
            .add_unit_type(UnitKind::Hero, code("Hpal"), Vec::new())
            .unwrap();
        let footman = manager
            .add_unit_type(UnitKind::Unit, code("hfoo"), Vec::new())
            .unwrap();

        assert!(manager.unit_type(hero).unwrap().code.first().is_ascii_uppercase());
        assert!(manager.unit_type(footman).unwrap().code.first().is_ascii_lowercase());
        assert_eq!(manager.unit_type(hero).unwrap().parent, code("Hpal"));
    }

    #[test]
    fn test_doodad_types_use_base_parents() {
        let mut manager = MapManager::new();
        let doodad = manager.add_doodad_type(Vec::new(), false).unwrap();
        let destructible = manager.add_doodad_type(Vec::new(), true).unwrap();

        assert!(!doodad.is_destructible());
        assert!(destructible.is_destructible());
        assert_eq!(manager.doodad_type(doodad).unwrap().parent, BASE_DOODAD_TYPE);
        assert_eq!(
            manager.doodad_type(destructible).unwrap().parent,
            BASE_DESTRUCTIBLE_TYPE
        );
        assert_eq!(manager.doodad_types().len(), 1);
        assert_eq!(manager.destructible_types().len(), 1);
        assert_ne!(
            manager.doodad_type(doodad).unwrap().code,
            manager.doodad_type(destructible).unwrap().code
        );
    }

    #[test]
    fn test_placements_keep_handles() {
        let mut manager = MapManager::new();
        let ty = manager
            .add_unit_type(UnitKind::Unit, code("hfoo"), Vec::new())
            .unwrap();
        manager.add_unit(ty, Unit::default()).unwrap();
        manager.add_unit(code("hpea"), Unit::default()).unwrap();

        // Renaming the type is seen by the placement.
        manager.unit_type_mut(ty).unwrap().code = code("hZZZ");
        assert_eq!(manager.unit_code(manager.units()[0].type_ref).unwrap(), code("hZZZ"));
        assert_eq!(manager.unit_code(manager.units()[1].type_ref).unwrap(), code("hpea"));

        manager.clear_units();
        assert!(manager.units().is_empty());
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut other = MapManager::new();
        let foreign = other
            .add_unit_type(UnitKind::Unit, code("hfoo"), Vec::new())
            .unwrap();

        let mut manager = MapManager::new();
        let own = manager
            .add_unit_type(UnitKind::Unit, code("hkni"), Vec::new())
            .unwrap();

        assert!(manager.unit_type(own).is_some());
        assert!(manager.unit_type(foreign).is_none());
        assert!(manager.unit_type_mut(foreign).is_none());
        assert!(matches!(
            manager.unit_code(TypeRef::Custom(foreign)),
            Err(Error::InvalidHandle)
        ));
        assert!(matches!(
            manager.add_unit(foreign, Unit::default()),
            Err(Error::InvalidHandle)
        ));
        assert!(manager.units().is_empty());

        let foreign = other.add_doodad_type(Vec::new(), true).unwrap();
        manager.add_doodad_type(Vec::new(), true).unwrap();
        assert!(manager.doodad_type(foreign).is_none());
        assert!(matches!(
            manager.add_doodad(foreign, Doodad::default()),
            Err(Error::InvalidHandle)
        ));

        let foreign = other.add_buff_type(code("BHbd"), Vec::new()).unwrap();
        manager.add_buff_type(code("BHbd"), Vec::new()).unwrap();
        assert!(manager.buff_type(foreign).is_none());
    }

    #[test]
    fn test_clone_accepts_source_handles() {
        let mut manager = MapManager::new();
        let ty = manager
            .add_unit_type(UnitKind::Unit, code("hfoo"), Vec::new())
            .unwrap();
        manager.add_unit(ty, Unit::default()).unwrap();

        let copy = manager.clone();
        assert_eq!(copy.unit_type(ty), manager.unit_type(ty));
        assert!(copy.unit_code(copy.units()[0].type_ref).is_ok());
    }

    #[test]
    fn test_new_types_need_parent() {
        let mut manager = MapManager::new();
        assert!(matches!(
            manager.add_unit_type(UnitKind::Unit, FourCC::NONE, Vec::new()),
            Err(Error::MissingParent)
        ));
        assert!(matches!(
            manager.add_ability_type(FourCC::NONE, Vec::new()),
            Err(Error::MissingParent)
        ));
        assert!(matches!(
            manager.add_buff_type(FourCC::NONE, Vec::new()),
            Err(Error::MissingParent)
        ));
        assert!(manager.unit_types().is_empty());
        assert!(manager.ability_types().is_empty());
        assert!(manager.buff_types().is_empty());
        assert_eq!(manager.generator().used_count(), 0);
    }

    #[test]
    fn test_new_types_check_modification_shape() {
        let mut manager = MapManager::new();
        assert!(matches!(
            manager.add_doodad_type(vec![Modification::flat(code("dnam"), "Rock")], false),
            Err(Error::ModificationShape {
                category: ObjectCategory::Doodads,
                leveled: true,
                ..
            })
        ));
        assert!(matches!(
            manager.add_ability_type(code("AHbz"), vec![Modification::flat(code("anam"), "Storm")]),
            Err(Error::ModificationShape {
                category: ObjectCategory::Abilities,
                leveled: true,
                ..
            })
        ));
        assert!(matches!(
            manager.add_unit_type(
                UnitKind::Unit,
                code("hfoo"),
                vec![Modification::leveled(code("unam"), "Footman", 1, 0)],
            ),
            Err(Error::ModificationShape {
                category: ObjectCategory::Units,
                leveled: false,
                ..
            })
        ));
        assert!(manager.doodad_types().is_empty());

        let rock = manager
            .add_doodad_type(vec![Modification::leveled(code("dnam"), "Rock", 1, 0)], false)
            .unwrap();
        let barrel = manager
            .add_doodad_type(vec![Modification::flat(code("bnam"), "Barrel")], true)
            .unwrap();
        assert_eq!(manager.doodad_type(rock).unwrap().data.len(), 1);
        assert_eq!(manager.doodad_type(barrel).unwrap().data.len(), 1);
    }

    #[test]
    fn test_unencodable_type_leaves_map_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = MapManager::new();
        manager.map_mut().set_map_dir(dir.path());
        let ty = manager
            .add_unit_type(UnitKind::Unit, code("hfoo"), Vec::new())
            .unwrap();
        manager.add_unit(ty, Unit::default()).unwrap();
        manager.unit_type_mut(ty).unwrap().data =
            vec![Modification::leveled(code("unam"), "Footman", 1, 0)];

        assert!(matches!(
            manager.save(),
            Err(Error::ModificationShape {
                category: ObjectCategory::Units,
                ..
            })
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(manager.map().units().is_empty());
        assert!(manager.map().objects(ObjectCategory::Units).custom.is_empty());
        assert!(!manager.map().is_touched(FileKind::Units));

        manager.unit_type_mut(ty).unwrap().data.clear();
        let saved = manager.save().unwrap();
        assert!(saved.contains(&FileKind::Units));
        assert_eq!(manager.map().units()[0].type_id, manager.unit_type(ty).unwrap().code);
    }

    #[test]
    fn test_save_without_directory() {
        let mut manager = MapManager::new();
        assert!(matches!(manager.save(), Err(Error::NoMapDirectory)));
    }

    #[test]
    fn test_clashing_code_leaves_state_intact() {
        let mut manager = MapManager::new();
        manager
            .map_mut()
            .objects_mut(ObjectCategory::Units)
            .insert_original(code("A000"), Vec::new())
            .unwrap();
        manager.map_mut().set_map_dir(std::env::temp_dir().join("w3x-map-unused"));
        // The generator was never told about A000.
        manager
            .add_unit_type(UnitKind::Hero, code("Hpal"), Vec::new())
            .unwrap();
        manager.add_unit(code("hfoo"), Unit::default()).unwrap();

        assert!(matches!(
            manager.save(),
            Err(Error::DuplicateObjectCode(c)) if c == code("A000")
        ));
        assert!(manager.map().units().is_empty());
        assert!(manager.map().objects(ObjectCategory::Units).custom.is_empty());
    }
}
