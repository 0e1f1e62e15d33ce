//! Four-character type codes.

use std::fmt;
use std::str::FromStr;

use crate::error::CursorError;

/// A four-byte identifier naming a game object type or field, e.g. `hfoo`.
///
/// Codes are compared bytewise. Text conversion treats every byte as one
/// Latin-1 character, so codes carrying NUL bytes (`Crs\0`) survive a trip
/// through [`Display`](fmt::Display) and [`FromStr`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FourCC([u8; 4]);

impl FourCC {
    /// The all-zero code, used on disk for "no code".
    pub const NONE: Self = Self([0; 4]);

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == [0; 4]
    }

    /// The leading character, which the game uses to tell heroes from units.
    pub fn first(&self) -> u8 {
        self.0[0]
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({:?})", self.to_string())
    }
}

impl FromStr for FourCC {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 4];
        let mut count = 0;
        for c in s.chars() {
            let b = u8::try_from(u32::from(c))
                .map_err(|_| CursorError::InvalidFourCC(s.to_string()))?;
            if count == 4 {
                return Err(CursorError::InvalidFourCC(s.to_string()));
            }
            bytes[count] = b;
            count += 1;
        }
        if count != 4 {
            return Err(CursorError::InvalidFourCC(s.to_string()));
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<&str> for FourCC {
    type Error = CursorError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FourCC {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FourCC {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_display_and_parse() {
        let code: FourCC = "Hpal".parse().unwrap();
        assert_eq!(code, FourCC::new(*b"Hpal"));
        assert_eq!(code.to_string(), "Hpal");
        assert_eq!(code.first(), b'H');
        assert!(!code.is_none());
    }

    #[test]
    fn test_nul_bytes_survive_text() {
        let code = FourCC::new(*b"Crs\0");
        let parsed: FourCC = code.to_string().parse().unwrap();
        assert_eq!(parsed, code);
        assert!(FourCC::NONE.is_none());
    }

    #[test_case("" ; "empty")]
    #[test_case("abc" ; "too short")]
    #[test_case("abcde" ; "too long")]
    #[test_case("ab\u{263a}c" ; "wide char")]
    fn test_invalid(s: &str) {
        assert!(matches!(
            s.parse::<FourCC>(),
            Err(CursorError::InvalidFourCC(_))
        ));
    }
}
