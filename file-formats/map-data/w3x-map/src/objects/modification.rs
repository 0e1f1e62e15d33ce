use std::fmt;

use w3_data::FourCC;

/// On-disk tag selecting how a modification value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ModificationType {
    Int,
    Real,
    /// A real clamped to `[0, 1]` by the game
    Unreal,
    String,
}

impl ModificationType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Int),
            1 => Some(Self::Real),
            2 => Some(Self::Unreal),
            3 => Some(Self::String),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Int => 0,
            Self::Real => 1,
            Self::Unreal => 2,
            Self::String => 3,
        }
    }
}

/// A typed field value. The variant fixes the on-disk encoding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "value", rename_all = "lowercase")
)]
pub enum ModificationValue {
    Int(i32),
    Real(f32),
    Unreal(f32),
    String(String),
}

impl ModificationValue {
    pub fn kind(&self) -> ModificationType {
        match self {
            Self::Int(_) => ModificationType::Int,
            Self::Real(_) => ModificationType::Real,
            Self::Unreal(_) => ModificationType::Unreal,
            Self::String(_) => ModificationType::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ModificationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Real(n) | Self::Unreal(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i32> for ModificationValue {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

impl From<f32> for ModificationValue {
    fn from(n: f32) -> Self {
        Self::Real(n)
    }
}

impl From<&str> for ModificationValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ModificationValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// One overridden field of a game object.
///
/// Leveled categories (see
/// [`ObjectCategory::is_leveled`](crate::ObjectCategory::is_leveled)) store a
/// level and data column with every value; the others do not. Each form has
/// its own variant so neither can be written into the wrong kind of table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Modification {
    Flat {
        id: FourCC,
        value: ModificationValue,
    },
    Leveled {
        id: FourCC,
        value: ModificationValue,
        level: i32,
        /// Data column, `0` for A, `1` for B and so on
        column: i32,
    },
}

impl Modification {
    pub fn flat(id: FourCC, value: impl Into<ModificationValue>) -> Self {
        Self::Flat {
            id,
            value: value.into(),
        }
    }

    pub fn leveled(
        id: FourCC,
        value: impl Into<ModificationValue>,
        level: i32,
        column: i32,
    ) -> Self {
        Self::Leveled {
            id,
            value: value.into(),
            level,
            column,
        }
    }

    pub fn id(&self) -> FourCC {
        match self {
            Self::Flat { id, .. } | Self::Leveled { id, .. } => *id,
        }
    }

    pub fn value(&self) -> &ModificationValue {
        match self {
            Self::Flat { value, .. } | Self::Leveled { value, .. } => value,
        }
    }

    pub fn kind(&self) -> ModificationType {
        self.value().kind()
    }

    pub fn is_leveled(&self) -> bool {
        matches!(self, Self::Leveled { .. })
    }

    /// `(level, column)` for leveled modifications.
    pub fn level(&self) -> Option<(i32, i32)> {
        match self {
            Self::Flat { .. } => None,
            Self::Leveled { level, column, .. } => Some((*level, *column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, ModificationType::Int)]
    #[test_case(1, ModificationType::Real)]
    #[test_case(2, ModificationType::Unreal)]
    #[test_case(3, ModificationType::String)]
    fn test_type_tags(raw: i32, kind: ModificationType) {
        assert_eq!(ModificationType::from_raw(raw), Some(kind));
        assert_eq!(kind.raw(), raw);
    }

    #[test]
    fn test_unknown_type_tag() {
        assert_eq!(ModificationType::from_raw(4), None);
        assert_eq!(ModificationType::from_raw(-1), None);
    }

    #[test]
    fn test_accessors() {
        let name = Modification::flat(FourCC::new(*b"unam"), "Test Hero");
        assert_eq!(name.id(), FourCC::new(*b"unam"));
        assert_eq!(name.kind(), ModificationType::String);
        assert_eq!(name.value().as_str(), Some("Test Hero"));
        assert_eq!(name.level(), None);

        let damage = Modification::leveled(FourCC::new(*b"Hbz2"), 45.5f32, 2, 2);
        assert!(damage.is_leveled());
        assert_eq!(damage.level(), Some((2, 2)));
        assert_eq!(damage.value(), &ModificationValue::Real(45.5));
    }
}
