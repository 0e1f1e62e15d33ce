use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use w3_data::{CursorError, FourCC};

use super::modification::Modification;
use crate::error::{Error, Result};

/// Key of a custom object: its own code and the stock type it derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub code: FourCC,
    pub parent: FourCC,
}

impl ObjectKey {
    pub fn new(code: FourCC, parent: FourCC) -> Self {
        Self { code, parent }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code, self.parent)
    }
}

impl FromStr for ObjectKey {
    type Err = CursorError;

    /// Parse the `code:parent` form.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (code, parent) = s
            .split_once(':')
            .ok_or_else(|| CursorError::InvalidFourCC(s.to_string()))?;
        Ok(Self {
            code: code.parse()?,
            parent: parent.parse()?,
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ObjectKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ObjectKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Object entries in the order they were inserted.
///
/// Inserting an existing key replaces its modifications without moving it,
/// so a decoded table encodes back in its original order.
#[derive(Debug, Clone)]
pub struct ModificationMap<K> {
    entries: Vec<(K, Vec<Modification>)>,
    index: HashMap<K, usize>,
}

impl<K> Default for ModificationMap<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: PartialEq> PartialEq for ModificationMap<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Copy + Eq + Hash> ModificationMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace. Returns the replaced modifications.
    pub fn insert(
        &mut self,
        key: K,
        modifications: Vec<Modification>,
    ) -> Option<Vec<Modification>> {
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, modifications)),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, modifications));
                None
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&[Modification]> {
        self.index.get(key).map(|&i| self.entries[i].1.as_slice())
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut Vec<Modification>> {
        let i = *self.index.get(key)?;
        Some(&mut self.entries[i].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<Vec<Modification>> {
        let i = self.index.remove(key)?;
        let (_, modifications) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(modifications)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[Modification])> {
        self.entries.iter().map(|(k, m)| (k, m.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl<K: Copy + Eq + Hash> FromIterator<(K, Vec<Modification>)> for ModificationMap<K> {
    fn from_iter<I: IntoIterator<Item = (K, Vec<Modification>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, modifications) in iter {
            map.insert(key, modifications);
        }
        map
    }
}

#[cfg(feature = "serde")]
impl<K: serde::Serialize> serde::Serialize for ModificationMap<K> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.entries.iter().map(|(k, m)| (k, m)))
    }
}

#[cfg(feature = "serde")]
impl<'de, K> serde::Deserialize<'de> for ModificationMap<K>
where
    K: serde::Deserialize<'de> + Copy + Eq + Hash,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor<K>(std::marker::PhantomData<K>);

        impl<'de, K> serde::de::Visitor<'de> for Visitor<K>
        where
            K: serde::Deserialize<'de> + Copy + Eq + Hash,
        {
            type Value = ModificationMap<K>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of object codes to modification lists")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut map = ModificationMap::new();
                while let Some((key, modifications)) = access.next_entry()? {
                    map.insert(key, modifications);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(Visitor(std::marker::PhantomData))
    }
}

/// Field overrides for one object category.
///
/// `original` changes stock objects in place; `custom` defines new objects
/// cloned from a stock parent. A type code lives in at most one of the two.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectModificationTable {
    pub original: ModificationMap<FourCC>,
    pub custom: ModificationMap<ObjectKey>,
}

impl ObjectModificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty() && self.custom.is_empty()
    }

    /// Every type code defined or overridden by this table.
    pub fn codes(&self) -> impl Iterator<Item = FourCC> + '_ {
        self.original
            .keys()
            .copied()
            .chain(self.custom.keys().map(|key| key.code))
    }

    pub fn contains_code(&self, code: FourCC) -> bool {
        self.original.contains_key(&code) || self.custom_key(code).is_some()
    }

    /// The custom key whose own code is `code`.
    pub fn custom_key(&self, code: FourCC) -> Option<ObjectKey> {
        self.custom.keys().find(|key| key.code == code).copied()
    }

    /// Override a stock object. Fails if `code` is already a custom object.
    pub fn insert_original(
        &mut self,
        code: FourCC,
        modifications: Vec<Modification>,
    ) -> Result<Option<Vec<Modification>>> {
        if self.custom_key(code).is_some() {
            return Err(Error::DuplicateObjectCode(code));
        }
        Ok(self.original.insert(code, modifications))
    }

    /// Define a custom object. Fails if its parent is empty, or if its code
    /// is already used by a stock override or by a custom object with
    /// another parent.
    pub fn insert_custom(
        &mut self,
        key: ObjectKey,
        modifications: Vec<Modification>,
    ) -> Result<Option<Vec<Modification>>> {
        if key.parent.is_none() {
            return Err(Error::MissingParent);
        }
        if self.original.contains_key(&key.code) {
            return Err(Error::DuplicateObjectCode(key.code));
        }
        if let Some(existing) = self.custom_key(key.code) {
            if existing != key {
                return Err(Error::DuplicateObjectCode(key.code));
            }
        }
        Ok(self.custom.insert(key, modifications))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(s: &str) -> FourCC {
        s.parse().unwrap()
    }

    fn name(value: &str) -> Vec<Modification> {
        vec![Modification::flat(code("unam"), value)]
    }

    #[test]
    fn test_key_text_form() {
        let key = ObjectKey::new(code("h000"), code("hfoo"));
        assert_eq!(key.to_string(), "h000:hfoo");
        assert_eq!("h000:hfoo".parse::<ObjectKey>().unwrap(), key);
        assert!("h000".parse::<ObjectKey>().is_err());
        assert!("h000:hfo".parse::<ObjectKey>().is_err());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut map = ModificationMap::new();
        map.insert(code("hpea"), name("a"));
        map.insert(code("hfoo"), name("b"));
        map.insert(code("hkni"), name("c"));
        let replaced = map.insert(code("hpea"), name("d"));

        assert_eq!(replaced, Some(name("a")));
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![code("hpea"), code("hfoo"), code("hkni")]);
        assert_eq!(map.get(&code("hpea")), Some(name("d").as_slice()));
    }

    #[test]
    fn test_remove_reindexes() {
        let mut map: ModificationMap<FourCC> =
            [(code("hpea"), name("a")), (code("hfoo"), name("b")), (code("hkni"), name("c"))]
                .into_iter()
                .collect();
        assert_eq!(map.remove(&code("hpea")), Some(name("a")));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&code("hkni")), Some(name("c").as_slice()));
        map.get_mut(&code("hkni")).unwrap().clear();
        assert_eq!(map.get(&code("hkni")), Some(&[][..]));
    }

    #[test]
    fn test_code_lives_in_one_section() {
        let mut table = ObjectModificationTable::new();
        table.insert_original(code("hfoo"), name("Footman")).unwrap();
        table
            .insert_custom(ObjectKey::new(code("h000"), code("hfoo")), name("Guard"))
            .unwrap();

        assert!(matches!(
            table.insert_custom(ObjectKey::new(code("hfoo"), code("hkni")), name("x")),
            Err(Error::DuplicateObjectCode(_))
        ));
        assert!(matches!(
            table.insert_custom(ObjectKey::new(code("h000"), code("hkni")), name("x")),
            Err(Error::DuplicateObjectCode(_))
        ));
        assert!(matches!(
            table.insert_original(code("h000"), name("x")),
            Err(Error::DuplicateObjectCode(_))
        ));

        // Same key replaces in place.
        table
            .insert_custom(ObjectKey::new(code("h000"), code("hfoo")), name("Captain"))
            .unwrap();
        assert_eq!(table.custom.len(), 1);

        let codes: Vec<_> = table.codes().collect();
        assert_eq!(codes, vec![code("hfoo"), code("h000")]);
        assert!(table.contains_code(code("h000")));
        assert!(!table.contains_code(code("hkni")));
    }

    #[test]
    fn test_custom_object_needs_parent() {
        let mut table = ObjectModificationTable::new();
        assert!(matches!(
            table.insert_custom(ObjectKey::new(code("h000"), FourCC::NONE), name("Orphan")),
            Err(Error::MissingParent)
        ));
        assert!(table.is_empty());
    }
}
