//! Allocation of unused object type codes.

use std::collections::HashSet;
use std::fmt;

use w3_data::FourCC;

use crate::error::{Error, Result};

/// Characters used for positions two to four of a generated code.
const TAIL_ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const TAIL_SPACE: u32 = 62 * 62 * 62;
/// Codes available in one partition.
pub const PARTITION_SIZE: u32 = 26 * TAIL_SPACE;

/// Which partition the first character of a code is drawn from.
///
/// The game treats unit types whose code starts with an upper-case letter
/// as heroes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodeCase {
    Upper,
    Lower,
    /// Lower-case codes first, upper-case once those run out
    Any,
}

impl fmt::Display for CodeCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CodeCase::Upper => "upper-case",
            CodeCase::Lower => "lower-case",
            CodeCase::Any => "any-case",
        })
    }
}

/// Hands out four-character codes that are not yet taken.
///
/// Codes are produced in a fixed order within each partition, so two
/// generators seeded with the same used codes yield the same sequence.
#[derive(Debug, Clone, Default)]
pub struct FourCCGenerator {
    used: HashSet<FourCC>,
    upper: u32,
    lower: u32,
}

impl FourCCGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_used(codes: impl IntoIterator<Item = FourCC>) -> Self {
        Self {
            used: codes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Mark `code` as taken. Returns `false` if it already was.
    pub fn add_used(&mut self, code: FourCC) -> bool {
        self.used.insert(code)
    }

    pub fn is_used(&self, code: FourCC) -> bool {
        self.used.contains(&code)
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Produce an unused code and mark it as used.
    pub fn generate(&mut self, case: CodeCase) -> Result<FourCC> {
        let code = match case {
            CodeCase::Upper => self.next_in(b'A'),
            CodeCase::Lower => self.next_in(b'a'),
            CodeCase::Any => self.next_in(b'a').or_else(|| self.next_in(b'A')),
        };
        let code = code.ok_or(Error::FourCCExhausted(case))?;
        self.used.insert(code);
        Ok(code)
    }

    fn next_in(&mut self, first: u8) -> Option<FourCC> {
        loop {
            let cursor = if first == b'A' {
                &mut self.upper
            } else {
                &mut self.lower
            };
            if *cursor >= PARTITION_SIZE {
                return None;
            }
            let code = code_at(first, *cursor);
            *cursor += 1;
            if !self.used.contains(&code) {
                return Some(code);
            }
        }
    }

    #[cfg(test)]
    fn skip_to(&mut self, case: CodeCase, position: u32) {
        match case {
            CodeCase::Upper => self.upper = position,
            CodeCase::Lower => self.lower = position,
            CodeCase::Any => {
                self.upper = position;
                self.lower = position;
            }
        }
    }
}

fn code_at(first: u8, n: u32) -> FourCC {
    let digit = |place: u32| TAIL_ALPHABET[(n / place % 62) as usize];
    // n < PARTITION_SIZE keeps the lead offset below 26
    let lead = first + (n / TAIL_SPACE) as u8;
    FourCC::new([lead, digit(62 * 62), digit(62), digit(1)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn code(s: &str) -> FourCC {
        s.parse().unwrap()
    }

    #[test]
    fn test_sequence() {
        let mut generator = FourCCGenerator::new();
        assert_eq!(generator.generate(CodeCase::Upper).unwrap(), code("A000"));
        assert_eq!(generator.generate(CodeCase::Upper).unwrap(), code("A001"));
        assert_eq!(generator.generate(CodeCase::Lower).unwrap(), code("a000"));
        assert_eq!(generator.generate(CodeCase::Any).unwrap(), code("a001"));
    }

    #[test]
    fn test_partition_boundaries() {
        assert_eq!(code_at(b'a', 61), code("a00z"));
        assert_eq!(code_at(b'a', 62), code("a010"));
        assert_eq!(code_at(b'a', TAIL_SPACE), code("b000"));
        assert_eq!(code_at(b'A', PARTITION_SIZE - 1), code("Zzzz"));
    }

    #[test]
    fn test_used_codes_are_skipped() {
        let mut generator = FourCCGenerator::with_used([code("A000"), code("A002")]);
        assert_eq!(generator.generate(CodeCase::Upper).unwrap(), code("A001"));
        assert_eq!(generator.generate(CodeCase::Upper).unwrap(), code("A003"));
        assert!(generator.is_used(code("A003")));
        assert!(!generator.add_used(code("A003")));
    }

    #[test]
    fn test_exhaustion() {
        let mut generator = FourCCGenerator::new();
        generator.skip_to(CodeCase::Upper, PARTITION_SIZE - 1);
        assert_eq!(generator.generate(CodeCase::Upper).unwrap(), code("Zzzz"));
        assert!(matches!(
            generator.generate(CodeCase::Upper),
            Err(Error::FourCCExhausted(CodeCase::Upper))
        ));

        // The lower partition is unaffected, and `Any` falls back to upper.
        assert_eq!(generator.generate(CodeCase::Lower).unwrap(), code("a000"));
        generator.skip_to(CodeCase::Lower, PARTITION_SIZE);
        assert!(matches!(
            generator.generate(CodeCase::Any),
            Err(Error::FourCCExhausted(CodeCase::Any))
        ));
    }

    #[test]
    fn test_any_falls_back_to_upper() {
        let mut generator = FourCCGenerator::new();
        generator.skip_to(CodeCase::Lower, PARTITION_SIZE);
        assert_eq!(generator.generate(CodeCase::Any).unwrap(), code("A000"));
    }

    proptest! {
        #[test]
        fn prop_generated_codes_are_fresh(
            seeded in proptest::collection::hash_set("[Aa][0-9A-Za-z]{3}", 0..200),
            cases in proptest::collection::vec(
                prop_oneof![Just(CodeCase::Upper), Just(CodeCase::Lower), Just(CodeCase::Any)],
                1..300,
            ),
        ) {
            let seeded: HashSet<FourCC> = seeded.iter().map(|s| code(s)).collect();
            let mut generator = FourCCGenerator::with_used(seeded.iter().copied());
            let mut produced = HashSet::new();
            for case in cases {
                let generated = generator.generate(case).unwrap();
                prop_assert!(!seeded.contains(&generated));
                prop_assert!(produced.insert(generated));
                match case {
                    CodeCase::Upper => prop_assert!(generated.first().is_ascii_uppercase()),
                    CodeCase::Lower | CodeCase::Any => {
                        prop_assert!(generated.first().is_ascii_lowercase())
                    }
                }
            }
        }
    }
}
