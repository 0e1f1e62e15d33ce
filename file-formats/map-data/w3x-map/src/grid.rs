//! Fixed-size row-major 2-D storage for per-tilepoint layers.

/// A `width × height` grid stored row by row, row 0 first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridParts<T>"))]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

/// Unchecked serialized form of a [`Grid`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct GridParts<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<GridParts<T>> for Grid<T> {
    type Error = String;

    fn try_from(parts: GridParts<T>) -> Result<Self, Self::Error> {
        let len = parts.cells.len();
        Grid::from_vec(parts.width, parts.height, parts.cells).ok_or_else(|| {
            format!(
                "{}x{} grid cannot hold {len} cells",
                parts.width, parts.height
            )
        })
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap row-major cells. Returns `None` if `cells` does not hold exactly
    /// `width × height` values.
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Option<Self> {
        (width.checked_mul(height)? == cells.len()).then_some(Self {
            width,
            height,
            cells,
        })
    }

    /// Build from nested rows. All rows must share one length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.cells.get(self.index(x, y)?)
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        let index = self.index(x, y)?;
        self.cells.get_mut(index)
    }

    /// Overwrite one cell. Returns `false` when the position is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn row(&self, y: usize) -> Option<&[T]> {
        let start = y.checked_mul(self.width)?;
        self.cells.get(start..start.checked_add(self.width)?)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks panics on zero, and a zero-width grid has no rows to yield.
        self.cells.chunks(self.width.max(1))
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width {
            return None;
        }
        y.checked_mul(self.width)?.checked_add(x)
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn into_rows(self) -> Vec<Vec<T>> {
        let width = self.width;
        let mut cells = self.cells.into_iter();
        (0..self.height)
            .map(|_| cells.by_ref().take(width).collect())
            .collect()
    }
}
