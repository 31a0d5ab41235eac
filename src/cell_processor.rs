//! Sparse per-row cell storage and the coverage sweep.
//!
//! Cells emitted by the rasterizer are appended to a single arena (the cell
//! stash) and threaded into one singly-linked list per image row. The sweep
//! then walks each touched row once: it collapses the row's list into a
//! dense scratch strip, integrates the running cover left to right, folds
//! cover/area into 8-bit coverage under the active fill rule, and hands
//! every non-zero coverage to the blender. Sweeping leaves the processor
//! empty but keeps all allocations for the next fill.
//!
//! Viewport policy: rows outside `[0, height)` are dropped at ingestion;
//! contributions left of column zero accumulate into the row's `left_cover`
//! so interior spans still start with the right winding; contributions at or
//! beyond `width` only widen the row's x range, since the sweep never reads
//! past the last visible column.

use crate::basics::{compute_cell_coverage, compute_span_coverage, FillRule};
use crate::blender::Blender;
use crate::error::{Error, Result};
use crate::rasterizer::CellSink;

/// Stash index meaning "no cell".
const INVALID_CELL_INDEX: u32 = u32::MAX;

// ============================================================================
// PixelRange — min/max tracker with an empty sentinel
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct PixelRange {
    min: u16,
    max: u16,
}

impl PixelRange {
    fn new() -> Self {
        Self {
            min: u16::MAX,
            max: u16::MIN,
        }
    }

    #[inline]
    fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    #[inline]
    fn reset(&mut self) {
        self.min = u16::MAX;
        self.max = u16::MIN;
    }

    #[inline]
    fn update(&mut self, val: u16) {
        if val < self.min {
            self.min = val;
        }
        if val > self.max {
            self.max = val;
        }
    }
}

// ============================================================================
// Cells
// ============================================================================

/// Dense scratch cell used during the sweep.
#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    cover: i32,
    area: i32,
}

impl Cell {
    #[inline]
    fn is_empty(&self) -> bool {
        self.cover == 0 && self.area == 0
    }

    #[inline]
    fn reset(&mut self) {
        self.cover = 0;
        self.area = 0;
    }
}

/// Arena cell: cover/area plus its column and the next list link.
#[derive(Debug, Clone, Copy)]
struct StashedCell {
    cover: i32,
    area: i32,
    next: u32,
    x: u16,
}

// ============================================================================
// CellStash — append-only arena with bulk reset
// ============================================================================

/// Appendable cell arena indexed by `u32`, with a high-water mark.
///
/// Reset just rewinds `in_use`; capacity survives across fills so steady
/// state allocates nothing. New cells come from the slack between `in_use`
/// and the vector length before the vector grows: +4 elements while small,
/// +25% afterwards, capped at the index space (`u32::MAX` is the "none"
/// sentinel, so exactly that many cells can exist).
#[derive(Debug, Default)]
struct CellStash {
    cells: Vec<StashedCell>,
    in_use: u32,
}

impl CellStash {
    /// Hand out the next free cell index, or `None` when the index space
    /// is exhausted.
    fn acquire(&mut self) -> Option<u32> {
        if self.in_use == INVALID_CELL_INDEX {
            return None;
        }

        let idx = self.in_use as usize;
        if idx == self.cells.len() {
            if self.cells.len() == self.cells.capacity() {
                let size = self.cells.len();
                let grow = if size < 20 { 4 } else { size / 4 };
                let new_capacity = (size + grow).min(INVALID_CELL_INDEX as usize);
                self.cells.reserve_exact(new_capacity - size);
            }
            self.cells.push(StashedCell {
                cover: 0,
                area: 0,
                next: INVALID_CELL_INDEX,
                x: 0,
            });
        }

        self.in_use += 1;
        Some(idx as u32)
    }

    #[inline]
    fn reset(&mut self) {
        self.in_use = 0;
    }
}

// ============================================================================
// Row
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Row {
    first_cell: u32,
    left_cover: i32,
    x_range: PixelRange,
}

impl Row {
    fn new() -> Self {
        Self {
            first_cell: INVALID_CELL_INDEX,
            left_cover: 0,
            x_range: PixelRange::new(),
        }
    }

    #[inline]
    fn reset(&mut self) {
        self.first_cell = INVALID_CELL_INDEX;
        self.left_cover = 0;
        self.x_range.reset();
    }
}

// ============================================================================
// CellProcessor
// ============================================================================

/// Owner of all per-frame rasterization state for one target size.
///
/// Ingests cells through the [`CellSink`] implementation, integrates them
/// into per-pixel coverage in [`sweep`](CellProcessor::sweep), and resets
/// itself in place afterwards.
pub struct CellProcessor {
    rows: Vec<Row>,
    dense: Vec<Cell>,
    stash: CellStash,
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    y_range: PixelRange,
    overflow: bool,
}

impl CellProcessor {
    /// Create a processor for a `width` × `height` viewport.
    ///
    /// Either dimension being zero yields a degenerate processor that drops
    /// every cell and sweeps as a no-op.
    pub fn new(width: u16, height: u16) -> Self {
        let degenerate = width == 0 || height == 0;
        let (width, height) = if degenerate {
            (0, 0)
        } else {
            (width as i32, height as i32)
        };
        Self {
            rows: vec![Row::new(); height as usize],
            dense: Vec::new(),
            stash: CellStash::default(),
            width,
            height,
            x: 0,
            y: 0,
            y_range: PixelRange::new(),
            overflow: false,
        }
    }

    pub fn width(&self) -> u16 {
        self.width as u16
    }

    pub fn height(&self) -> u16 {
        self.height as u16
    }

    /// Integrate all accumulated cells into coverage and drive the blender.
    ///
    /// Rows are visited top to bottom across the observed y range; within a
    /// row the blender is positioned once and advanced with `inc_x`, and
    /// `blend` is only called for non-zero coverage. Completion resets the
    /// rows, the y range, and the stash's high-water mark in place.
    ///
    /// Fails with [`Error::TooManyCells`] if the cell stash saturated while
    /// this fill was accumulating; the processor contents are invalid at
    /// that point and the owning renderer should be discarded.
    pub fn sweep<B: Blender>(&mut self, blender: &mut B, fill_rule: FillRule) -> Result<()> {
        if self.overflow {
            return Err(Error::TooManyCells);
        }

        if self.y_range.is_valid() {
            let y_max = self.y_range.max as i32;
            let mut y = self.y_range.min as i32;
            blender.set_y(y);

            loop {
                let row = self.rows[y as usize];
                if row.x_range.is_valid() {
                    let x_min = row.x_range.min as i32;
                    let x_max = row.x_range.max as i32;

                    let span = (x_max - x_min + 1) as usize;
                    if self.dense.len() < span {
                        self.dense.resize(span, Cell::default());
                    }

                    // Collapse the row's list; revisited pixels merge here.
                    let mut idx = row.first_cell;
                    while idx != INVALID_CELL_INDEX {
                        let src = self.stash.cells[idx as usize];
                        let dst = &mut self.dense[src.x as usize - x_min as usize];
                        dst.cover += src.cover;
                        dst.area += src.area;
                        idx = src.next;
                    }

                    let mut cover = row.left_cover;
                    let mut mid_coverage = 0u8;
                    let mut x = x_min;
                    blender.set_x(x);

                    loop {
                        let cell = &mut self.dense[(x - x_min) as usize];
                        let coverage;

                        if !cell.is_empty() {
                            cover += cell.cover;
                            coverage = compute_cell_coverage(cover, cell.area, fill_rule);
                            mid_coverage = 0;
                            cell.reset();
                        } else {
                            // Cover is constant across a gap, so its folded
                            // coverage is computed once and reused.
                            if mid_coverage == 0 && cover != 0 {
                                mid_coverage = compute_span_coverage(cover, fill_rule);
                            }
                            coverage = mid_coverage;
                        }

                        if coverage > 0 {
                            blender.blend(coverage);
                        }

                        if x < x_max {
                            x += 1;
                            blender.inc_x();
                        } else {
                            break;
                        }
                    }

                    self.rows[y as usize].reset();
                }

                if y < y_max {
                    y += 1;
                    blender.inc_y();
                } else {
                    break;
                }
            }

            self.y_range.reset();
        }

        self.stash.reset();
        Ok(())
    }
}

impl CellSink for CellProcessor {
    #[inline]
    fn set_x(&mut self, x: i32) {
        self.x = x;
    }

    #[inline]
    fn inc_x(&mut self) {
        self.x += 1;
    }

    #[inline]
    fn set_y(&mut self, y: i32) {
        self.y = y;
    }

    fn set_cell(&mut self, cover: i32, area: i32) {
        if self.y < 0 || self.y >= self.height {
            // Above or below the viewport.
            return;
        }

        let row = &mut self.rows[self.y as usize];

        if self.x >= 0 {
            if self.x < self.width {
                // Merge with the row's head cell when it sits at the same
                // column; deeper duplicates collapse during the sweep.
                if row.first_cell != INVALID_CELL_INDEX {
                    let head = &mut self.stash.cells[row.first_cell as usize];
                    if head.x as i32 == self.x {
                        head.cover += cover;
                        head.area += area;
                        return;
                    }
                }

                match self.stash.acquire() {
                    Some(idx) => {
                        let cell = &mut self.stash.cells[idx as usize];
                        cell.cover = cover;
                        cell.area = area;
                        cell.next = row.first_cell;
                        cell.x = self.x as u16;
                        row.first_cell = idx;
                        row.x_range.update(self.x as u16);
                    }
                    None => {
                        self.overflow = true;
                        return;
                    }
                }
            } else {
                // Beyond the right edge: the sweep stops at x_range.max, so
                // the cover itself is discarded.
                row.x_range.update((self.width - 1) as u16);
            }
        } else {
            // Entirely left of the viewport: pure vertical cover for every
            // visible pixel on this row.
            row.left_cover += cover;
            row.x_range.update(0);
        }

        self.y_range.update(self.y as u16);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Rasterizer;

    /// Blender that records every blend with its resolved position.
    #[derive(Default)]
    struct RecordingBlender {
        x: i32,
        y: i32,
        blends: Vec<(i32, i32, u8)>,
    }

    impl Blender for RecordingBlender {
        fn set_y(&mut self, y: i32) {
            self.y = y;
        }
        fn set_x(&mut self, x: i32) {
            self.x = x;
        }
        fn inc_x(&mut self) {
            self.x += 1;
        }
        fn inc_y(&mut self) {
            self.y += 1;
        }
        fn blend(&mut self, coverage: u8) {
            self.blends.push((self.x, self.y, coverage));
        }
    }

    fn coverage_at(blender: &RecordingBlender, x: i32, y: i32) -> u8 {
        blender
            .blends
            .iter()
            .rev()
            .find(|&&(bx, by, _)| bx == x && by == y)
            .map(|&(_, _, c)| c)
            .unwrap_or(0)
    }

    fn emit(proc_: &mut CellProcessor, x: i32, y: i32, cover: i32, area: i32) {
        proc_.set_y(y);
        proc_.set_x(x);
        proc_.set_cell(cover, area);
    }

    // ------------------------------------------------------------------
    // Ingestion policy
    // ------------------------------------------------------------------

    #[test]
    fn test_head_merge_only_deduplicates_consecutive_emissions() {
        let mut proc_ = CellProcessor::new(16, 16);
        emit(&mut proc_, 3, 2, 10, 100);
        emit(&mut proc_, 3, 2, 5, 50);
        // Same position twice in a row merges in place.
        assert_eq!(proc_.stash.in_use, 1);
        assert_eq!(proc_.stash.cells[0].cover, 15);
        assert_eq!(proc_.stash.cells[0].area, 150);
        // A different column in between forces a fresh cell even though the
        // column repeats.
        emit(&mut proc_, 4, 2, 1, 1);
        emit(&mut proc_, 3, 2, 1, 1);
        assert_eq!(proc_.stash.in_use, 3);
    }

    #[test]
    fn test_rows_outside_viewport_are_dropped() {
        let mut proc_ = CellProcessor::new(8, 8);
        emit(&mut proc_, 2, -1, 256, 0);
        emit(&mut proc_, 2, 8, 256, 0);
        assert_eq!(proc_.stash.in_use, 0);
        assert!(!proc_.y_range.is_valid());

        let mut blender = RecordingBlender::default();
        proc_.sweep(&mut blender, FillRule::NonZero).unwrap();
        assert!(blender.blends.is_empty());
    }

    #[test]
    fn test_left_of_viewport_accumulates_left_cover() {
        let mut proc_ = CellProcessor::new(8, 8);
        emit(&mut proc_, -5, 3, 256, 12345);
        assert_eq!(proc_.rows[3].left_cover, 256);
        assert_eq!(proc_.stash.in_use, 0);

        // The whole visible row inherits the winding.
        let mut blender = RecordingBlender::default();
        proc_.sweep(&mut blender, FillRule::NonZero).unwrap();
        assert_eq!(coverage_at(&blender, 0, 3), 255);
        // x_range only reaches column 0; pixels further right are not
        // visited because nothing widened the range.
        assert_eq!(blender.blends.len(), 1);
    }

    #[test]
    fn test_right_of_viewport_discards_cover_but_widens_range() {
        let mut proc_ = CellProcessor::new(8, 8);
        emit(&mut proc_, -1, 3, 256, 0);
        emit(&mut proc_, 100, 3, -256, 0);
        assert_eq!(proc_.stash.in_use, 0);

        // left_cover drives every pixel up to x_range.max = width - 1.
        let mut blender = RecordingBlender::default();
        proc_.sweep(&mut blender, FillRule::NonZero).unwrap();
        for x in 0..8 {
            assert_eq!(coverage_at(&blender, x, 3), 255, "column {}", x);
        }
    }

    #[test]
    fn test_degenerate_processor_is_inert() {
        let mut proc_ = CellProcessor::new(0, 16);
        emit(&mut proc_, 1, 1, 256, 0);
        let mut blender = RecordingBlender::default();
        proc_.sweep(&mut blender, FillRule::NonZero).unwrap();
        assert!(blender.blends.is_empty());
    }

    // ------------------------------------------------------------------
    // Stash reuse
    // ------------------------------------------------------------------

    #[test]
    fn test_stash_reuses_capacity_after_reset() {
        let mut stash = CellStash::default();
        for _ in 0..30 {
            stash.acquire().unwrap();
        }
        let len = stash.cells.len();
        assert_eq!(len, 30);
        stash.reset();
        assert_eq!(stash.acquire().unwrap(), 0);
        // Reacquisition consumes the slack without growing the vector.
        assert_eq!(stash.cells.len(), len);
    }

    // ------------------------------------------------------------------
    // Sweep integration
    // ------------------------------------------------------------------

    fn rasterize_path(proc_: &mut CellProcessor, path: &[(f32, f32)]) {
        let mut ras = Rasterizer::new();
        ras.move_to_d(proc_, path[0].0, path[0].1);
        for &(x, y) in &path[1..] {
            ras.line_to_d(proc_, x, y);
        }
        ras.close(proc_);
    }

    #[test]
    fn test_axis_aligned_rect_fills_solid_with_gap_span() {
        let mut proc_ = CellProcessor::new(16, 16);
        rasterize_path(
            &mut proc_,
            &[(1.0, 1.0), (9.0, 1.0), (9.0, 4.0), (1.0, 4.0)],
        );

        let mut blender = RecordingBlender::default();
        proc_.sweep(&mut blender, FillRule::NonZero).unwrap();

        // Rows 1..4, columns 1..9; columns 2..8 are gap pixels that reuse
        // the cached mid coverage.
        for y in 1..4 {
            for x in 1..9 {
                assert_eq!(coverage_at(&blender, x, y), 255, "({}, {})", x, y);
            }
            assert_eq!(coverage_at(&blender, 0, y), 0);
            assert_eq!(coverage_at(&blender, 9, y), 0);
        }
        for x in 0..16 {
            assert_eq!(coverage_at(&blender, x, 0), 0);
            assert_eq!(coverage_at(&blender, x, 4), 0);
        }
    }

    #[test]
    fn test_half_pixel_rect_edges_antialias() {
        let mut proc_ = CellProcessor::new(8, 8);
        rasterize_path(
            &mut proc_,
            &[(1.5, 1.5), (4.5, 1.5), (4.5, 3.5), (1.5, 3.5)],
        );

        let mut blender = RecordingBlender::default();
        proc_.sweep(&mut blender, FillRule::NonZero).unwrap();

        // Row 2 is fully inside vertically: edge columns carry half
        // coverage, interior full.
        assert_eq!(coverage_at(&blender, 1, 2), 127);
        assert_eq!(coverage_at(&blender, 2, 2), 255);
        assert_eq!(coverage_at(&blender, 3, 2), 255);
        assert_eq!(coverage_at(&blender, 4, 2), 127);
        // Corner pixel: quarter coverage.
        assert_eq!(coverage_at(&blender, 1, 1), 63);
    }

    #[test]
    fn test_self_overlap_even_odd_cancels_interior() {
        let mut proc_ = CellProcessor::new(16, 16);
        // Two identical rects: winding 2 everywhere inside.
        for _ in 0..2 {
            rasterize_path(
                &mut proc_,
                &[(2.0, 2.0), (10.0, 2.0), (10.0, 6.0), (2.0, 6.0)],
            );
        }

        let mut even_odd = RecordingBlender::default();
        proc_.sweep(&mut even_odd, FillRule::EvenOdd).unwrap();
        assert_eq!(coverage_at(&even_odd, 5, 3), 0);

        // Same geometry under non-zero stays solid.
        for _ in 0..2 {
            rasterize_path(
                &mut proc_,
                &[(2.0, 2.0), (10.0, 2.0), (10.0, 6.0), (2.0, 6.0)],
            );
        }
        let mut non_zero = RecordingBlender::default();
        proc_.sweep(&mut non_zero, FillRule::NonZero).unwrap();
        assert_eq!(coverage_at(&non_zero, 5, 3), 255);
    }

    #[test]
    fn test_sweep_resets_state_for_next_fill() {
        let mut proc_ = CellProcessor::new(8, 8);
        rasterize_path(&mut proc_, &[(1.0, 1.0), (5.0, 1.0), (5.0, 5.0), (1.0, 5.0)]);

        let mut first = RecordingBlender::default();
        proc_.sweep(&mut first, FillRule::NonZero).unwrap();
        assert!(!first.blends.is_empty());
        assert_eq!(proc_.stash.in_use, 0);

        // A second sweep with no new path work must not touch the blender.
        let mut second = RecordingBlender::default();
        proc_.sweep(&mut second, FillRule::NonZero).unwrap();
        assert!(second.blends.is_empty());
    }

    #[test]
    fn test_blender_positioning_protocol() {
        let mut proc_ = CellProcessor::new(8, 8);
        rasterize_path(&mut proc_, &[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]);

        // Track the raw call sequence.
        #[derive(Default)]
        struct CallLog {
            x: i32,
            y: i32,
            calls: Vec<String>,
        }
        impl Blender for CallLog {
            fn set_y(&mut self, y: i32) {
                self.y = y;
                self.calls.push(format!("set_y({})", y));
            }
            fn set_x(&mut self, x: i32) {
                self.x = x;
                self.calls.push(format!("set_x({})", x));
            }
            fn inc_x(&mut self) {
                self.x += 1;
                self.calls.push("inc_x".into());
            }
            fn inc_y(&mut self) {
                self.y += 1;
                self.calls.push("inc_y".into());
            }
            fn blend(&mut self, coverage: u8) {
                self.calls.push(format!("blend({},{},{})", self.x, self.y, coverage));
            }
        }

        let mut log = CallLog::default();
        proc_.sweep(&mut log, FillRule::NonZero).unwrap();

        // Rows 1 and 2, columns 1 and 2 (edges land on pixel borders, so
        // column 3 holds the cancelling cell and blends nothing).
        assert_eq!(
            log.calls,
            vec![
                "set_y(1)",
                "set_x(1)",
                "blend(1,1,255)",
                "inc_x",
                "blend(2,1,255)",
                "inc_x",
                "inc_y",
                "set_x(1)",
                "blend(1,2,255)",
                "inc_x",
                "blend(2,2,255)",
                "inc_x",
            ]
        );
    }
}
