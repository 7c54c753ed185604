//! The shared 2D trail field.
//!
//! Agents deposit their color into the field while moving and read it back
//! through their sensors. Every tick the field is blurred toward the 3x3
//! neighborhood mean and then decayed by a fixed amount.
//!
//! # Layout
//!
//! Cells are `Vec3` color values stored row-major (`y * width + x`). Values
//! are conceptually unbounded above but settle toward `[0, 1]` under decay.
//!
//! # Double buffering
//!
//! The diffusion pass reads only the primary buffer and writes only the
//! scratch buffer. Once every cell has been computed the buffers are swapped,
//! so no cell ever observes a value already updated in the same pass.
//!
//! ```
//! use physarum::{DepositMode, TrailField, Vec3};
//!
//! let mut field = TrailField::new(8, 8);
//! field.deposit(4, 4, Vec3::ONE, DepositMode::Overwrite);
//! field.diffuse_and_decay(0.1, 0.01);
//!
//! // Some of the deposit has spread to the neighbor.
//! assert!(field.get(5, 4).x > 0.0);
//! ```

use glam::{Vec2, Vec3};
use rayon::prelude::*;

use crate::config::DepositMode;

/// Summary statistics of the field, used for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldStats {
    /// Mean intensity over all cells and channels.
    pub mean: f32,
    /// Largest single channel value.
    pub max: f32,
    /// Number of cells with any non-zero channel.
    pub lit_cells: usize,
}

/// Dense `width x height` grid of deposit values.
#[derive(Clone, Debug)]
pub struct TrailField {
    width: u32,
    height: u32,
    /// Current values, read by sensing and rendering.
    cells: Vec<Vec3>,
    /// Diffusion output, swapped in at the end of each pass.
    scratch: Vec<Vec3>,
}

impl TrailField {
    /// Allocate a zero-filled field.
    ///
    /// The field is never resized afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "field must not be empty (got {}x{})", width, height);
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Vec3::ZERO; len],
            scratch: vec![Vec3::ZERO; len],
        }
    }

    /// Field width in cells.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Field height in cells.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a continuous position lies inside `[0, width) x [0, height)`.
    #[inline]
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x < self.width as f32
            && position.y < self.height as f32
    }

    /// Index of the cell containing `position`, if it is inside the field.
    #[inline]
    pub fn cell_index(&self, position: Vec2) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        // `contains` rules out NaN, so truncation is a floor here.
        let x = (position.x as u32).min(self.width - 1);
        let y = (position.y as u32).min(self.height - 1);
        Some(self.index(x, y))
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Value at integer coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        assert!(x < self.width && y < self.height, "cell ({}, {}) out of bounds", x, y);
        self.cells[self.index(x, y)]
    }

    /// Value at signed coordinates, or `None` outside the field.
    ///
    /// Sensors use this: out-of-range samples are skipped, never clamped.
    #[inline]
    pub fn sample(&self, x: i64, y: i64) -> Option<Vec3> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.cells[y as usize * self.width as usize + x as usize])
    }

    /// Overwrite a single cell.
    pub fn set(&mut self, x: u32, y: u32, value: Vec3) {
        let idx = self.index(x, y);
        self.cells[idx] = value;
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: Vec3) {
        self.cells.fill(value);
    }

    /// Deposit `value` at integer coordinates using `mode`.
    pub fn deposit(&mut self, x: u32, y: u32, value: Vec3, mode: DepositMode) {
        let idx = self.index(x, y);
        self.deposit_at(idx, value, mode);
    }

    /// Deposit `value` at a flat cell index using `mode`.
    pub(crate) fn deposit_at(&mut self, idx: usize, value: Vec3, mode: DepositMode) {
        let cell = &mut self.cells[idx];
        *cell = match mode {
            DepositMode::Overwrite => value,
            DepositMode::Max => cell.max(value),
            DepositMode::Additive => *cell + value,
        };
    }

    /// Blur every cell toward its 3x3 neighborhood mean, then decay it.
    ///
    /// For each cell:
    /// 1. `mean` of the 3x3 neighborhood, clamping neighbor coordinates to
    ///    the nearest edge row/column
    /// 2. `blended = original * (1 - diffuse_rate) + mean * diffuse_rate`
    /// 3. subtract `decay_rate` from each channel, floored at zero
    ///
    /// Rows are processed in parallel into the scratch buffer; the buffers
    /// are swapped only after the whole grid is done.
    pub fn diffuse_and_decay(&mut self, diffuse_rate: f32, decay_rate: f32) {
        let width = self.width as usize;
        let max_x = width as isize - 1;
        let max_y = self.height as isize - 1;
        let src = &self.cells;
        let keep = 1.0 - diffuse_rate;
        let decay = Vec3::splat(decay_rate);

        self.scratch
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let mut sum = Vec3::ZERO;
                    for dy in -1..=1 {
                        let sy = (y as isize + dy).clamp(0, max_y) as usize;
                        for dx in -1..=1 {
                            let sx = (x as isize + dx).clamp(0, max_x) as usize;
                            sum += src[sy * width + sx];
                        }
                    }
                    let mean = sum / 9.0;
                    let original = src[y * width + x];
                    let blended = original * keep + mean * diffuse_rate;
                    *out = (blended - decay).max(Vec3::ZERO);
                }
            });

        std::mem::swap(&mut self.cells, &mut self.scratch);
    }

    /// The renderable buffer, row-major, one color per cell.
    #[inline]
    pub fn cells(&self) -> &[Vec3] {
        &self.cells
    }

    /// Convert the field to 8-bit RGBA rows, clamping channels to `[0, 1]`.
    ///
    /// `out` is resized to `width * height * 4` bytes.
    pub fn write_rgba8(&self, out: &mut Vec<u8>) {
        out.resize(self.cells.len() * 4, 0);
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(out.as_mut_slice());
        pixels
            .par_iter_mut()
            .zip(self.cells.par_iter())
            .for_each(|(px, color)| {
                let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
                *px = [c.x as u8, c.y as u8, c.z as u8, 255];
            });
    }

    /// Like [`write_rgba8`](Self::write_rgba8) into a fresh buffer.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_rgba8(&mut out);
        out
    }

    /// Compute summary statistics.
    pub fn stats(&self) -> FieldStats {
        if self.cells.is_empty() {
            return FieldStats::default();
        }
        let (sum, max, lit) = self
            .cells
            .par_iter()
            .map(|c| (c.element_sum(), c.max_element(), usize::from(*c != Vec3::ZERO)))
            .reduce(
                || (0.0_f32, 0.0_f32, 0usize),
                |a, b| (a.0 + b.0, a.1.max(b.1), a.2 + b.2),
            );
        FieldStats {
            mean: sum / (self.cells.len() * 3) as f32,
            max,
            lit_cells: lit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "field must not be empty")]
    fn test_new_rejects_zero_width() {
        TrailField::new(0, 3);
    }

    #[test]
    #[should_panic(expected = "field must not be empty")]
    fn test_new_rejects_zero_height() {
        TrailField::new(3, 0);
    }

    #[test]
    fn test_new_field_is_zeroed() {
        let field = TrailField::new(16, 9);
        assert_eq!(field.width(), 16);
        assert_eq!(field.height(), 9);
        assert_eq!(field.cells().len(), 144);
        assert!(field.cells().iter().all(|c| *c == Vec3::ZERO));
    }

    #[test]
    fn test_cell_index_floors_position() {
        let field = TrailField::new(10, 5);
        assert_eq!(field.cell_index(Vec2::new(0.0, 0.0)), Some(0));
        assert_eq!(field.cell_index(Vec2::new(3.9, 2.2)), Some(23));
        assert_eq!(field.cell_index(Vec2::new(9.99, 4.99)), Some(49));
        assert_eq!(field.cell_index(Vec2::new(10.0, 0.0)), None);
        assert_eq!(field.cell_index(Vec2::new(-0.1, 0.0)), None);
        assert_eq!(field.cell_index(Vec2::new(f32::NAN, 1.0)), None);
    }

    #[test]
    fn test_sample_skips_out_of_bounds() {
        let mut field = TrailField::new(4, 4);
        field.set(3, 3, Vec3::ONE);
        assert_eq!(field.sample(3, 3), Some(Vec3::ONE));
        assert_eq!(field.sample(-1, 0), None);
        assert_eq!(field.sample(0, 4), None);
    }

    #[test]
    fn test_deposit_modes() {
        let mut field = TrailField::new(2, 2);
        let a = Vec3::new(0.2, 0.8, 0.0);
        let b = Vec3::new(0.6, 0.1, 0.0);

        field.deposit(0, 0, a, DepositMode::Overwrite);
        field.deposit(0, 0, b, DepositMode::Overwrite);
        assert_eq!(field.get(0, 0), b);

        field.deposit(1, 0, a, DepositMode::Max);
        field.deposit(1, 0, b, DepositMode::Max);
        assert_eq!(field.get(1, 0), Vec3::new(0.6, 0.8, 0.0));

        field.deposit(0, 1, a, DepositMode::Additive);
        field.deposit(0, 1, b, DepositMode::Additive);
        assert!((field.get(0, 1) - (a + b)).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_uniform_field_only_decays() {
        let mut field = TrailField::new(7, 5);
        field.fill(Vec3::splat(0.5));
        field.diffuse_and_decay(0.3, 0.1);
        for c in field.cells() {
            assert!((c.x - 0.4).abs() < 1e-6, "got {}", c.x);
            assert!((c.y - 0.4).abs() < 1e-6);
            assert!((c.z - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let mut field = TrailField::new(3, 3);
        field.fill(Vec3::splat(0.05));
        field.diffuse_and_decay(0.0, 0.1);
        assert!(field.cells().iter().all(|c| *c == Vec3::ZERO));
    }

    #[test]
    fn test_diffusion_reads_only_previous_values() {
        // A single lit cell: its right neighbor must see exactly one ninth of
        // the original value, regardless of processing order.
        let mut field = TrailField::new(5, 1);
        field.set(2, 0, Vec3::splat(0.9));
        field.diffuse_and_decay(1.0, 0.0);

        // With one row, the clamped 3x3 window counts each column three times.
        let expected_center = 0.9 * 3.0 / 9.0;
        assert!((field.get(2, 0).x - expected_center).abs() < 1e-6);
        assert!((field.get(3, 0).x - expected_center).abs() < 1e-6);
        assert!((field.get(1, 0).x - expected_center).abs() < 1e-6);
        assert_eq!(field.get(0, 0), Vec3::ZERO);
        assert_eq!(field.get(4, 0), Vec3::ZERO);
    }

    #[test]
    fn test_edge_clamping_overweights_own_value() {
        // Corner cell of a 3x3 field: the clamped window counts the corner
        // four times, its two edge neighbors twice and the center once.
        let mut field = TrailField::new(3, 3);
        field.set(0, 0, Vec3::splat(0.9));
        field.diffuse_and_decay(1.0, 0.0);
        assert!((field.get(0, 0).x - 0.4).abs() < 1e-6);
        assert!((field.get(1, 1).x - 0.1).abs() < 1e-6);
        assert_eq!(field.get(2, 2), Vec3::ZERO);
    }

    #[test]
    fn test_rgba8_conversion_clamps() {
        let mut field = TrailField::new(2, 1);
        field.set(0, 0, Vec3::new(2.0, 0.5, 0.0));
        let mut out = Vec::new();
        field.write_rgba8(&mut out);
        assert_eq!(out, vec![255, 128, 0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_stats() {
        let mut field = TrailField::new(2, 2);
        assert_eq!(field.stats(), FieldStats::default());

        field.set(1, 1, Vec3::new(0.3, 0.6, 0.9));
        let stats = field.stats();
        assert_eq!(stats.lit_cells, 1);
        assert!((stats.max - 0.9).abs() < 1e-6);
        assert!((stats.mean - 1.8 / 12.0).abs() < 1e-6);
    }
}
