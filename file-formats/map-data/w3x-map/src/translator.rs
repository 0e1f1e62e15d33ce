//! The codec contract shared by every map file format.

use std::fmt;

use w3_data::{W3Reader, W3Writer};

use crate::error::{Error, Result};

/// Decoding behaviour shared by all translators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeOptions {
    /// Reject buffers with bytes left over after the declared records.
    ///
    /// When disabled the leftover bytes are reported as a [`Diagnostic`].
    pub strict_length: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict_length: true,
        }
    }
}

impl DecodeOptions {
    /// Options that tolerate trailing bytes.
    pub fn lenient() -> Self {
        Self {
            strict_length: false,
        }
    }
}

/// A non-fatal irregularity found while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// Byte offset the irregularity was found at
    pub offset: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at offset {}: {}", self.offset, self.message)
    }
}

/// The result of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub model: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Decoded<T> {
    pub fn into_model(self) -> T {
        self.model
    }
}

/// A bidirectional mapping between one file format and its model.
///
/// Implementors only describe the record layout through [`read`](Self::read)
/// and [`write`](Self::write). The provided methods add the end-of-buffer
/// check and diagnostic reporting, so a translator never has to remember
/// to verify that its counts matched the buffer.
pub trait Translator {
    type Model;

    /// File name used in errors and log messages, e.g. `war3map.w3e`.
    fn label(&self) -> &'static str;

    fn read(
        &self,
        reader: &mut W3Reader<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Self::Model>;

    fn write(&self, model: &Self::Model, writer: &mut W3Writer) -> Result<()>;

    fn decode(&self, bytes: &[u8]) -> Result<Decoded<Self::Model>> {
        self.decode_with(bytes, DecodeOptions::default())
    }

    fn decode_with(&self, bytes: &[u8], options: DecodeOptions) -> Result<Decoded<Self::Model>> {
        let mut reader = W3Reader::new(bytes);
        let mut diagnostics = Vec::new();
        let model = self.read(&mut reader, &mut diagnostics)?;

        if !reader.is_exhausted() {
            let remaining = reader.remaining();
            if options.strict_length {
                return Err(Error::TrailingData {
                    file: self.label(),
                    remaining,
                });
            }
            diagnostics.push(Diagnostic::new(
                reader.position(),
                format!("{remaining} trailing bytes ignored"),
            ));
        }
        if reader.lossy_strings() > 0 {
            diagnostics.push(Diagnostic::new(
                reader.position(),
                format!(
                    "{} strings were not valid UTF-8 and were decoded lossily",
                    reader.lossy_strings()
                ),
            ));
        }
        for diagnostic in &diagnostics {
            log::warn!("{}: {}", self.label(), diagnostic);
        }

        Ok(Decoded { model, diagnostics })
    }

    fn encode(&self, model: &Self::Model) -> Result<Vec<u8>> {
        let mut writer = W3Writer::new();
        self.write(model, &mut writer)?;
        log::debug!("{}: encoded {} bytes", self.label(), writer.len());
        Ok(writer.into_inner())
    }
}

/// Read a four-byte magic and compare it against the expected value.
pub(crate) fn expect_magic(
    reader: &mut W3Reader<'_>,
    file: &'static str,
    expected: &[u8; 4],
) -> Result<()> {
    let found = reader.read_fourcc()?;
    if found.as_bytes() != expected {
        return Err(Error::InvalidMagic {
            file,
            expected: expected.into(),
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A count-prefixed list of integers.
    struct IntList;

    impl Translator for IntList {
        type Model = Vec<i32>;

        fn label(&self) -> &'static str {
            "ints"
        }

        fn read(&self, reader: &mut W3Reader<'_>, _: &mut Vec<Diagnostic>) -> Result<Vec<i32>> {
            use w3_data::W3Vec;
            Ok(reader.read_vec()?)
        }

        fn write(&self, model: &Vec<i32>, writer: &mut W3Writer) -> Result<()> {
            Ok(writer.write_vec(model)?)
        }
    }

    #[test]
    fn test_strict_rejects_trailing_bytes() {
        let mut bytes = IntList.encode(&vec![7, 8]).unwrap();
        bytes.push(0xAA);

        match IntList.decode(&bytes) {
            Err(Error::TrailingData { file, remaining }) => {
                assert_eq!(file, "ints");
                assert_eq!(remaining, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_lenient_reports_trailing_bytes() {
        let mut bytes = IntList.encode(&vec![7, 8]).unwrap();
        bytes.extend_from_slice(&[0xAA, 0xBB]);

        let decoded = IntList.decode_with(&bytes, DecodeOptions::lenient()).unwrap();
        assert_eq!(decoded.model, vec![7, 8]);
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].offset, 12);
    }

    #[test]
    fn test_truncated_buffer_is_out_of_data() {
        let bytes = IntList.encode(&vec![1, 2, 3]).unwrap();
        let result = IntList.decode(&bytes[..bytes.len() - 2]);
        assert!(matches!(result, Err(Error::Cursor(_))));
    }

    #[test]
    fn test_magic_mismatch() {
        let mut reader = W3Reader::new(b"W3E?");
        let err = expect_magic(&mut reader, "war3map.w3e", b"W3E!").unwrap_err();
        assert_eq!(
            err.to_string(),
            "war3map.w3e: invalid magic, expected W3E!, found FourCC(\"W3E?\")"
        );
    }
}
