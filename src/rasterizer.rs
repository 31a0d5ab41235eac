//! Segment decomposition into per-cell cover/area emissions.
//!
//! The `Rasterizer` walks each line segment one scanline at a time with an
//! integer DDA and reports, for every pixel cell the segment traverses, the
//! signed vertical distance crossed inside the cell (`cover`, in 1/256ths of
//! a pixel) and twice the cover-weighted mean horizontal position (`area`).
//! The only state it keeps is the current pen position and the subpath
//! origin, both in 24.8 fixed-point; all per-frame bookkeeping lives in the
//! [`CellSink`] it feeds.
//!
//! Sign conventions: cover is positive for segments heading down (+y) and
//! negative heading up. Horizontal segments change nothing and are dropped
//! at the door.

use crate::basics::{to_fixed_24_dot_8, SUBPIXEL_MASK, SUBPIXEL_SCALE, SUBPIXEL_SHIFT};

// ============================================================================
// CellSink — the capability the rasterizer emits into
// ============================================================================

/// Receiver for cell emissions.
///
/// Within one scanline the rasterizer positions the sink once with `set_y`,
/// places the first cell with `set_x`, and advances with `inc_x` for each
/// subsequent cell; emission order along a scanline is strictly ascending x.
pub trait CellSink {
    /// Set the current cell column. May be negative or beyond the right edge.
    fn set_x(&mut self, x: i32);

    /// Advance the current cell column by one.
    fn inc_x(&mut self);

    /// Set the current cell row.
    fn set_y(&mut self, y: i32);

    /// Accumulate `cover` and `area` into the current cell.
    fn set_cell(&mut self, cover: i32, area: i32);
}

// ============================================================================
// Rasterizer
// ============================================================================

/// Stateless-per-segment scanline decomposer.
///
/// Carries only the pen position and the subpath origin. `move_to` closes
/// the contour in progress by emitting the segment back to the origin, so a
/// sink always receives closed outlines once the final `close` lands.
#[derive(Debug, Default)]
pub struct Rasterizer {
    start_x: i32,
    start_y: i32,
    x: i32,
    y: i32,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the pen and subpath origin.
    pub fn reset(&mut self) {
        self.start_x = 0;
        self.start_y = 0;
        self.x = 0;
        self.y = 0;
    }

    /// Begin a new subpath at a float position.
    pub fn move_to_d<S: CellSink>(&mut self, sink: &mut S, x: f32, y: f32) {
        self.move_to(sink, to_fixed_24_dot_8(x), to_fixed_24_dot_8(y));
    }

    /// Extend the current subpath to a float position.
    pub fn line_to_d<S: CellSink>(&mut self, sink: &mut S, x: f32, y: f32) {
        self.line_to(sink, to_fixed_24_dot_8(x), to_fixed_24_dot_8(y));
    }

    /// Begin a new subpath at a 24.8 fixed-point position.
    ///
    /// The contour in progress is closed first: the segment from the pen
    /// back to the previous subpath origin is emitted.
    pub fn move_to<S: CellSink>(&mut self, sink: &mut S, x: i32, y: i32) {
        Self::add_line(sink, self.x, self.y, self.start_x, self.start_y);
        self.start_x = x;
        self.start_y = y;
        self.x = x;
        self.y = y;
    }

    /// Extend the current subpath to a 24.8 fixed-point position.
    pub fn line_to<S: CellSink>(&mut self, sink: &mut S, x: i32, y: i32) {
        Self::add_line(sink, self.x, self.y, x, y);
        self.x = x;
        self.y = y;
    }

    /// Close the current subpath with a segment back to its origin.
    pub fn close<S: CellSink>(&mut self, sink: &mut S) {
        let (x, y) = (self.start_x, self.start_y);
        self.line_to(sink, x, y);
    }

    // ========================================================================
    // Segment decomposition
    // ========================================================================

    fn add_line<S: CellSink>(sink: &mut S, x_0: i32, y_0: i32, x_1: i32, y_1: i32) {
        if y_0 == y_1 {
            // Horizontal: zero net cover and area.
            return;
        }

        if x_0 == x_1 {
            Self::add_vertical(sink, x_0, y_0, y_1);
            return;
        }

        // Canonicalize so the walk always descends in y; the const direction
        // parameters keep the sign fixups out of the inner loops.
        if x_1 > x_0 {
            if y_1 > y_0 {
                Self::add_line_dir::<true, true, true, S>(sink, x_0, y_0, x_1, y_1);
            } else {
                Self::add_line_dir::<true, false, false, S>(sink, x_1, y_1, x_0, y_0);
            }
        } else if y_1 > y_0 {
            Self::add_line_dir::<false, true, false, S>(sink, x_0, y_0, x_1, y_1);
        } else {
            Self::add_line_dir::<false, false, true, S>(sink, x_1, y_1, x_0, y_0);
        }
    }

    /// Vertical segment: one cell per crossed row at a fixed column.
    fn add_vertical<S: CellSink>(sink: &mut S, x: i32, y_0: i32, y_1: i32) {
        let int_x = x >> SUBPIXEL_SHIFT;
        let frac_x = x & SUBPIXEL_MASK;
        let mut int_y_0 = y_0 >> SUBPIXEL_SHIFT;
        let mut int_y_1 = y_1 >> SUBPIXEL_SHIFT;
        let frac_y_0 = y_0 & SUBPIXEL_MASK;
        let frac_y_1 = y_1 & SUBPIXEL_MASK;

        if int_y_0 == int_y_1 {
            let cover = frac_y_1 - frac_y_0;
            sink.set_x(int_x);
            sink.set_y(int_y_0);
            sink.set_cell(cover, (cover * frac_x) << 1);
            return;
        }

        let cover;
        let area;

        if y_0 < y_1 {
            if frac_y_0 != 0 {
                let head = SUBPIXEL_SCALE - frac_y_0;
                sink.set_x(int_x);
                sink.set_y(int_y_0);
                sink.set_cell(head, (head * frac_x) << 1);
                int_y_0 += 1;
            }

            if frac_y_1 != 0 {
                sink.set_x(int_x);
                sink.set_y(int_y_1);
                sink.set_cell(frac_y_1, (frac_y_1 * frac_x) << 1);
            }

            cover = SUBPIXEL_SCALE;
            area = frac_x << 9;
        } else {
            if frac_y_0 != 0 {
                let head = -frac_y_0;
                sink.set_x(int_x);
                sink.set_y(int_y_0);
                sink.set_cell(head, (head * frac_x) << 1);
            }

            if frac_y_1 != 0 {
                let tail = frac_y_1 - SUBPIXEL_SCALE;
                sink.set_x(int_x);
                sink.set_y(int_y_1);
                sink.set_cell(tail, (tail * frac_x) << 1);
                int_y_1 += 1;
            }

            std::mem::swap(&mut int_y_0, &mut int_y_1);
            cover = -SUBPIXEL_SCALE;
            area = -(frac_x << 9);
        }

        while int_y_0 < int_y_1 {
            sink.set_x(int_x);
            sink.set_y(int_y_0);
            sink.set_cell(cover, area);
            int_y_0 += 1;
        }
    }

    /// General segment walk, monomorphized over the three traversal
    /// directions.
    ///
    /// `X_POS`: x grows along the segment as originally drawn. `Y_POS`: y
    /// grows as drawn (cover sign). `XY_POS`: x grows while walking down in
    /// y, i.e. in canonicalized traversal order. The caller already swapped
    /// endpoints so `y_1 > y_0` here.
    fn add_line_dir<const X_POS: bool, const Y_POS: bool, const XY_POS: bool, S: CellSink>(
        sink: &mut S,
        x_0: i32,
        y_0: i32,
        x_1: i32,
        y_1: i32,
    ) {
        let int_x_0 = x_0 >> SUBPIXEL_SHIFT;
        let int_x_1 = x_1 >> SUBPIXEL_SHIFT;
        let int_y_0 = y_0 >> SUBPIXEL_SHIFT;
        let int_y_1 = y_1 >> SUBPIXEL_SHIFT;
        let frac_x_0 = x_0 & SUBPIXEL_MASK;
        let frac_x_1 = x_1 & SUBPIXEL_MASK;

        if int_y_0 == int_y_1 {
            // Only one scanline is involved.
            if XY_POS {
                Self::add_scanline::<Y_POS, S>(
                    sink, int_y_0, int_x_0, int_x_1, frac_x_0, frac_x_1, x_1 - x_0, y_1 - y_0,
                );
            } else {
                Self::add_scanline::<Y_POS, S>(
                    sink, int_y_0, int_x_1, int_x_0, frac_x_1, frac_x_0, x_0 - x_1, y_1 - y_0,
                );
            }
            return;
        }

        let d_y = (y_1 - y_0) as u32;
        let d_x = if XY_POS {
            (x_1 as i64 - x_0 as i64) as u32
        } else {
            (x_0 as i64 - x_1 as i64) as u32
        };
        let frac_y_0 = y_0 & SUBPIXEL_MASK;
        let frac_y_1 = y_1 & SUBPIXEL_MASK;

        let mut int_y = int_y_0;
        let mut x = x_0;
        let mut int_x;
        let mut frac_x;
        let mut rem: u32;

        if frac_y_0 != 0 {
            // Partial head scanline of height 0x100 - frac_y_0.
            let head_y = SUBPIXEL_SCALE - frac_y_0;
            let mut delta_x;

            if d_x < 0x0100_0000 {
                let p = d_x * head_y as u32;
                delta_x = (p / d_y) as i32;
                rem = p % d_y;
            } else {
                // Widen: d_x * head_y would not fit in 32 bits.
                let p = d_x as u64 * head_y as u64;
                delta_x = (p / d_y as u64) as i32;
                rem = (p % d_y as u64) as u32;
            }

            if !X_POS && rem != 0 {
                // Keep x monotonic without losing the remainder.
                delta_x += 1;
                rem = d_y - rem;
            }

            if XY_POS {
                x += delta_x;
            } else {
                x -= delta_x;
            }

            int_x = x >> SUBPIXEL_SHIFT;
            frac_x = x & SUBPIXEL_MASK;

            if XY_POS {
                Self::add_scanline::<Y_POS, S>(
                    sink, int_y_0, int_x_0, int_x, frac_x_0, frac_x, x - x_0, head_y,
                );
            } else {
                Self::add_scanline::<Y_POS, S>(
                    sink, int_y_0, int_x, int_x_0, frac_x, frac_x_0, x_0 - x, head_y,
                );
            }

            int_y += 1;
        } else {
            int_x = int_x_0;
            frac_x = frac_x_0;
            rem = 0;
        }

        if int_y < int_y_1 {
            // Full scanlines of height 0x100: one division up front, then an
            // add-and-carry DDA per row.
            let mut inc_x;
            let mut modulo;

            if d_x < 0x0100_0000 {
                let p = d_x << SUBPIXEL_SHIFT;
                inc_x = (p / d_y) as i32;
                modulo = p % d_y;
            } else {
                let p = (d_x as u64) << SUBPIXEL_SHIFT;
                inc_x = (p / d_y as u64) as i32;
                modulo = (p % d_y as u64) as u32;
            }

            let annex;
            if X_POS {
                annex = 1;
            } else {
                if modulo != 0 {
                    inc_x += 1;
                    modulo = d_y - modulo;
                }
                annex = -1;
            }

            loop {
                let mut delta_x = inc_x;
                rem += modulo;
                if rem >= d_y {
                    delta_x += annex;
                    rem -= d_y;
                }

                let next_x = if XY_POS { x + delta_x } else { x - delta_x };
                let int_next_x = next_x >> SUBPIXEL_SHIFT;
                let frac_next_x = next_x & SUBPIXEL_MASK;

                if XY_POS {
                    Self::add_scanline::<Y_POS, S>(
                        sink, int_y, int_x, int_next_x, frac_x, frac_next_x, delta_x,
                        SUBPIXEL_SCALE,
                    );
                } else {
                    Self::add_scanline::<Y_POS, S>(
                        sink, int_y, int_next_x, int_x, frac_next_x, frac_x, delta_x,
                        SUBPIXEL_SCALE,
                    );
                }

                x = next_x;
                int_x = int_next_x;
                frac_x = frac_next_x;
                int_y += 1;
                if int_y >= int_y_1 {
                    break;
                }
            }
        }

        if frac_y_1 != 0 {
            // Partial tail scanline of height frac_y_1.
            if XY_POS {
                Self::add_scanline::<Y_POS, S>(
                    sink, int_y_1, int_x, int_x_1, frac_x, frac_x_1, x_1 - x, frac_y_1,
                );
            } else {
                Self::add_scanline::<Y_POS, S>(
                    sink, int_y_1, int_x_1, int_x, frac_x_1, frac_x, x - x_1, frac_y_1,
                );
            }
        }
    }

    /// Emit the cells of one scanline crossing, from `int_x_0` to `int_x_1`
    /// left to right.
    ///
    /// `d_x` and `d_y` are the positive extents of the crossing within this
    /// scanline (`d_y <= 0x100`); the cover sign comes from `Y_POS`.
    #[allow(clippy::too_many_arguments)]
    fn add_scanline<const Y_POS: bool, S: CellSink>(
        sink: &mut S,
        int_y: i32,
        int_x_0: i32,
        int_x_1: i32,
        frac_x_0: i32,
        frac_x_1: i32,
        d_x: i32,
        d_y: i32,
    ) {
        sink.set_y(int_y);

        if int_x_0 == int_x_1 {
            // Inside one cell.
            let cover = if Y_POS { d_y } else { -d_y };
            sink.set_x(int_x_0);
            sink.set_cell(cover, cover * (frac_x_0 + frac_x_1));
            return;
        }

        let mut int_x = int_x_0;
        let mut y = 0;
        let mut rem;
        let mut cell_placed;

        if frac_x_0 != 0 {
            // Entry cell spans from frac_x_0 to the right cell border.
            let p = (SUBPIXEL_SCALE - frac_x_0) * d_y;
            let mut delta_y = p / d_x;
            rem = p % d_x;

            let cover;
            if Y_POS {
                cover = delta_y;
            } else {
                if rem != 0 {
                    delta_y += 1;
                    rem = d_x - rem;
                }
                cover = -delta_y;
            }

            sink.set_x(int_x_0);
            sink.set_cell(cover, cover * (frac_x_0 + SUBPIXEL_SCALE));
            int_x += 1;
            y += delta_y;
            cell_placed = true;
        } else {
            rem = 0;
            cell_placed = false;
        }

        if int_x < int_x_1 {
            // Interior cells are crossed border to border.
            let p = d_y << SUBPIXEL_SHIFT;
            let mut inc_y = p / d_x;
            let mut modulo = p % d_x;

            let annex;
            if Y_POS {
                annex = 1;
            } else {
                if modulo != 0 {
                    inc_y += 1;
                    modulo = d_x - modulo;
                }
                annex = -1;
            }

            loop {
                let mut delta_y = inc_y;
                rem += modulo;
                if rem >= d_x {
                    delta_y += annex;
                    rem -= d_x;
                }

                let cover = if Y_POS { delta_y } else { -delta_y };

                if cell_placed {
                    sink.inc_x();
                } else {
                    sink.set_x(int_x);
                    cell_placed = true;
                }
                sink.set_cell(cover, cover << SUBPIXEL_SHIFT);

                y += delta_y;
                int_x += 1;
                if int_x >= int_x_1 {
                    break;
                }
            }
        }

        if frac_x_1 != 0 {
            // Exit cell takes whatever height is left.
            let delta_y = d_y - y;
            if delta_y != 0 {
                let cover = if Y_POS { delta_y } else { -delta_y };
                sink.inc_x();
                sink.set_cell(cover, cover * frac_x_1);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
