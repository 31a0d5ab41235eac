//! # scanfill
//!
//! Anti-aliased 2D polygon rasterizer producing subpixel-accurate coverage.
//!
//! Paths built from move-to / line-to / cubic Bézier / close commands in
//! float coordinates are filled into a caller-owned image with exact
//! analytic coverage: no supersampling, integer-only inner loops.
//!
//! ## Architecture
//!
//! Rendering is a three-stage pipeline; each stage's output feeds the next:
//!
//! 1. **Path building** — float commands become 24.8 fixed-point line
//!    segments (curves are flattened by forward differences)
//! 2. **Cell accumulation** — every segment is decomposed into signed
//!    cover/area contributions for each pixel cell it crosses, stored
//!    sparsely per row
//! 3. **Sweep** — per scanline, cells are integrated left to right into
//!    8-bit coverage under a fill rule and handed to a blender
//!
//! The blender is a capability supplied by the caller; color spaces, image
//! allocation, and presentation stay outside the crate.
//!
//! ## Example
//!
//! ```
//! use scanfill::{BgraBlender, FillRule, Renderer};
//!
//! let mut image = vec![0u32; 64 * 64];
//! let blender = unsafe { BgraBlender::new(image.as_mut_ptr(), 64, 64, 64 * 4) };
//! let mut renderer = Renderer::new(64, 64, blender);
//!
//! renderer.blender_mut().set_color(0xffff_ffff);
//! renderer.move_to(8.0, 8.0);
//! renderer.line_to(56.0, 8.0);
//! renderer.line_to(32.0, 56.0);
//! renderer.fill(FillRule::NonZero).unwrap();
//!
//! assert_eq!(image[20 * 64 + 32], 0xffff_ffff);
//! ```

pub mod basics;
pub mod bezier;
pub mod blender;
pub mod cell_processor;
pub mod error;
pub mod rasterizer;
pub mod renderer;
pub mod rendering_buffer;

pub use crate::basics::{to_fixed_24_dot_8, to_fixed_26_dot_6, FillRule};
pub use crate::blender::{BgraBlender, Blender, BlenderBase};
pub use crate::cell_processor::CellProcessor;
pub use crate::error::{Error, Result};
pub use crate::rasterizer::{CellSink, Rasterizer};
pub use crate::renderer::Renderer;
pub use crate::rendering_buffer::RenderingBuffer;
