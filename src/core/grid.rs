#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed-size row-major 2D container addressed by `(x, y)`.
///
/// Cell `(x, y)` lives at linear index `y * width + x`. Out-of-range access
/// never panics: reads yield `None` and writes are dropped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid2D<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy + Default> Grid2D<T> {
    /// Create a `width x height` grid of default cells.
    ///
    /// Zero dimensions are clamped to 1.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows; see [`Grid2D::try_new`].
    pub fn new(width: usize, height: usize) -> Self {
        match Self::try_new(width, height) {
            Some(grid) => grid,
            None => panic!("grid {width}x{height} overflows usize"),
        }
    }

    /// Like [`Grid2D::new`], but returns `None` when the cell count overflows.
    pub fn try_new(width: usize, height: usize) -> Option<Self> {
        let width = width.max(1);
        let height = height.max(1);
        let len = width.checked_mul(height)?;
        Some(Self {
            width,
            height,
            cells: vec![T::default(); len],
        })
    }

    /// Reset every cell to `T::default()`.
    pub fn clear(&mut self) {
        self.cells.fill(T::default());
    }
}

impl<T> Grid2D<T> {
    /// Wrap an existing row-major buffer. Returns `None` if the length does not match.
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Option<Self> {
        if width == 0 || height == 0 || width.checked_mul(height) != Some(cells.len()) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Linear index of `(x, y)`, or `None` when out of range.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.width * y + x)
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        match self.index_of(x, y) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        Some(&self.cells[start..start + self.width])
    }

    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }
}

impl<T: Copy> Grid2D<T> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        self.index_of(x, y).map(|idx| self.cells[idx])
    }

    /// Bilinear interpolation at fractional coordinates, projecting each
    /// corner sample through `project` before blending.
    ///
    /// Returns `None` when `x` is outside `[0, width)` or `y` outside
    /// `[0, height)`. The 2x2 neighbourhood is clamped so it never reads past
    /// the last row or column; a coordinate on (or beyond) the last index
    /// takes the last cell with full weight.
    pub fn bilinear_with<F>(&self, x: f32, y: f32, project: F) -> Option<f32>
    where
        F: Fn(T) -> f32,
    {
        // Negated form so NaN coordinates are rejected too.
        if !(x >= 0.0 && x < self.width as f32 && y >= 0.0 && y < self.height as f32) {
            return None;
        }

        let x0 = (x as usize).min(self.width.saturating_sub(2));
        let y0 = (y as usize).min(self.height.saturating_sub(2));
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let tx = (x - x0 as f32).min(1.0);
        let ty = (y - y0 as f32).min(1.0);

        let f0 = project(self.cells[self.width * y0 + x0]);
        let f1 = project(self.cells[self.width * y0 + x1]);
        let f2 = project(self.cells[self.width * y1 + x0]);
        let f3 = project(self.cells[self.width * y1 + x1]);

        Some((f0 + (f1 - f0) * tx) * (1.0 - ty) + (f2 + (f3 - f2) * tx) * ty)
    }
}

impl<T: Copy + Into<f32>> Grid2D<T> {
    /// Bilinear interpolation with the identity projection.
    pub fn bilinear(&self, x: f32, y: f32) -> Option<f32> {
        self.bilinear_with(x, y, Into::into)
    }
}
