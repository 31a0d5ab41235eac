//! High-level float-coordinate rendering facade.
//!
//! `Renderer` ties the pipeline together: it owns the rasterizer, the cell
//! processor sized to the target image, and the blender, and exposes the
//! float path API (`move_to` / `line_to` / `bezier_to` / `close_outline` /
//! `fill`). Coordinates are in pixels, +x right and +y down, with pixel
//! (i, j) occupying the unit square [i, i+1) × [j, j+1).

use crate::basics::FillRule;
use crate::bezier::subdivide_cubic;
use crate::blender::Blender;
use crate::cell_processor::CellProcessor;
use crate::error::Result;
use crate::rasterizer::Rasterizer;

/// Path-filling renderer over a caller-provided blender.
///
/// The float pen position and subpath origin are tracked here, before
/// fixed-point quantization, so Bézier flattening starts from the exact
/// coordinates the caller supplied.
pub struct Renderer<B: Blender> {
    rasterizer: Rasterizer,
    cell_proc: CellProcessor,
    blender: B,
    start_x: f32,
    start_y: f32,
    x: f32,
    y: f32,
}

impl<B: Blender> Renderer<B> {
    /// Create a renderer for a `width` × `height` target.
    ///
    /// Panics if either dimension is zero.
    pub fn new(width: u16, height: u16, blender: B) -> Self {
        assert!(width > 0, "renderer width must be non-zero");
        assert!(height > 0, "renderer height must be non-zero");
        Self {
            rasterizer: Rasterizer::new(),
            cell_proc: CellProcessor::new(width, height),
            blender,
            start_x: 0.0,
            start_y: 0.0,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn blender(&self) -> &B {
        &self.blender
    }

    pub fn blender_mut(&mut self) -> &mut B {
        &mut self.blender
    }

    /// Begin a new subpath. The previous subpath, if any, is closed.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.rasterizer.move_to_d(&mut self.cell_proc, x, y);
        self.start_x = x;
        self.start_y = y;
        self.x = x;
        self.y = y;
    }

    /// Straight segment from the pen to (x, y).
    pub fn line_to(&mut self, x: f32, y: f32) {
        self.rasterizer.line_to_d(&mut self.cell_proc, x, y);
        self.x = x;
        self.y = y;
    }

    /// Cubic Bézier from the pen with control points (x_1, y_1), (x_2, y_2)
    /// and end point (x_3, y_3), flattened into line segments.
    pub fn bezier_to(&mut self, x_1: f32, y_1: f32, x_2: f32, y_2: f32, x_3: f32, y_3: f32) {
        let rasterizer = &mut self.rasterizer;
        let cell_proc = &mut self.cell_proc;
        subdivide_cubic(
            |x, y| rasterizer.line_to_d(cell_proc, x, y),
            self.x,
            self.y,
            x_1,
            y_1,
            x_2,
            y_2,
            x_3,
            y_3,
        );
        self.x = x_3;
        self.y = y_3;
    }

    /// Close the current subpath back to its origin.
    pub fn close_outline(&mut self) {
        self.rasterizer.close(&mut self.cell_proc);
        self.x = self.start_x;
        self.y = self.start_y;
    }

    /// Fill everything accumulated since the last fill under `fill_rule`.
    ///
    /// The current subpath is closed implicitly. On success the renderer is
    /// ready for the next path; on [`Error::TooManyCells`] it should be
    /// discarded.
    ///
    /// [`Error::TooManyCells`]: crate::Error::TooManyCells
    pub fn fill(&mut self, fill_rule: FillRule) -> Result<()> {
        self.close_outline();
        self.cell_proc.sweep(&mut self.blender, fill_rule)
    }

    /// [`fill`](Renderer::fill) under the non-zero winding rule.
    pub fn fill_non_zero(&mut self) -> Result<()> {
        self.fill(FillRule::NonZero)
    }

    /// [`fill`](Renderer::fill) under the even-odd rule.
    pub fn fill_even_odd(&mut self) -> Result<()> {
        self.fill(FillRule::EvenOdd)
    }
}

// ============================================================================
// Tests
// ============================================================================
