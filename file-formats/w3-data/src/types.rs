//! Read/write traits for fixed-shape records.

use crate::cursor::{W3Reader, W3Writer};
use crate::error::{CursorError, Result};
use crate::fourcc::FourCC;

pub trait W3DataR: Sized {
    fn read_from(reader: &mut W3Reader<'_>) -> Result<Self>;
}

pub trait W3DataW {
    fn write_to(&self, writer: &mut W3Writer) -> Result<()>;
}

/// Count-prefixed sequences: an `i32` element count followed by the elements.
pub trait W3Vec {
    fn read_count(&mut self) -> Result<usize>;

    fn read_vec<T: W3DataR>(&mut self) -> Result<Vec<T>>;
}

impl W3Vec for W3Reader<'_> {
    fn read_count(&mut self) -> Result<usize> {
        let offset = self.position();
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| CursorError::InvalidCount { offset, count })
    }

    fn read_vec<T: W3DataR>(&mut self) -> Result<Vec<T>> {
        let count = self.read_count()?;
        // Every element takes at least one byte, so a count beyond the
        // remaining length cannot be honoured and must not drive allocation.
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(T::read_from(self)?);
        }
        Ok(items)
    }
}

impl W3Writer {
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = i32::try_from(count).map_err(|_| CursorError::CountOverflow(count))?;
        self.write_i32(count);
        Ok(())
    }

    pub fn write_vec<T: W3DataW>(&mut self, items: &[T]) -> Result<()> {
        self.write_count(items.len())?;
        for item in items {
            item.write_to(self)?;
        }
        Ok(())
    }
}

impl W3DataR for u8 {
    fn read_from(reader: &mut W3Reader<'_>) -> Result<Self> {
        reader.read_u8()
    }
}

impl W3DataW for u8 {
    fn write_to(&self, writer: &mut W3Writer) -> Result<()> {
        writer.write_u8(*self);
        Ok(())
    }
}

impl W3DataR for i32 {
    fn read_from(reader: &mut W3Reader<'_>) -> Result<Self> {
        reader.read_i32()
    }
}

impl W3DataW for i32 {
    fn write_to(&self, writer: &mut W3Writer) -> Result<()> {
        writer.write_i32(*self);
        Ok(())
    }
}

impl W3DataR for f32 {
    fn read_from(reader: &mut W3Reader<'_>) -> Result<Self> {
        reader.read_f32()
    }
}

impl W3DataW for f32 {
    fn write_to(&self, writer: &mut W3Writer) -> Result<()> {
        writer.write_f32(*self);
        Ok(())
    }
}

impl W3DataR for FourCC {
    fn read_from(reader: &mut W3Reader<'_>) -> Result<Self> {
        reader.read_fourcc()
    }
}

impl W3DataW for FourCC {
    fn write_to(&self, writer: &mut W3Writer) -> Result<()> {
        writer.write_fourcc(*self);
        Ok(())
    }
}

impl W3DataR for String {
    fn read_from(reader: &mut W3Reader<'_>) -> Result<Self> {
        reader.read_cstring()
    }
}

impl W3DataW for String {
    fn write_to(&self, writer: &mut W3Writer) -> Result<()> {
        writer.write_cstring(self)
    }
}

impl<T: W3DataR + Copy + Default, const N: usize> W3DataR for [T; N] {
    fn read_from(reader: &mut W3Reader<'_>) -> Result<Self> {
        let mut out = [T::default(); N];
        for slot in &mut out {
            *slot = T::read_from(reader)?;
        }
        Ok(out)
    }
}

impl<T: W3DataW, const N: usize> W3DataW for [T; N] {
    fn write_to(&self, writer: &mut W3Writer) -> Result<()> {
        for item in self {
            item.write_to(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vec_round_trip() {
        let palette = vec![FourCC::new(*b"Ldrt"), FourCC::new(*b"Lgrs")];
        let mut writer = W3Writer::new();
        writer.write_vec(&palette).unwrap();
        assert_eq!(writer.len(), 4 + 8);

        let bytes = writer.into_inner();
        let mut reader = W3Reader::new(&bytes);
        assert_eq!(reader.read_vec::<FourCC>().unwrap(), palette);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_negative_count() {
        let bytes = (-1i32).to_le_bytes();
        let mut reader = W3Reader::new(&bytes);
        assert_eq!(
            reader.read_vec::<i32>(),
            Err(CursorError::InvalidCount {
                offset: 0,
                count: -1
            })
        );
    }

    #[test]
    fn test_oversized_count_is_out_of_data() {
        let mut bytes = i32::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        let mut reader = W3Reader::new(&bytes);
        assert!(matches!(
            reader.read_vec::<i32>(),
            Err(CursorError::OutOfData { .. })
        ));
    }

    #[test]
    fn test_arrays() {
        let mut writer = W3Writer::new();
        [1.5f32, -2.0, 0.125].write_to(&mut writer).unwrap();
        let bytes = writer.into_inner();
        let mut reader = W3Reader::new(&bytes);
        assert_eq!(<[f32; 3]>::read_from(&mut reader).unwrap(), [1.5, -2.0, 0.125]);
    }
}
