//! Cubic Bézier flattening by forward differences.
//!
//! A cubic is rewritten in the power basis and evaluated incrementally with
//! three running difference accumulators, so the per-sample cost is six
//! additions. The step count comes from the sum of the control polygon's
//! chord components divided by four, which keeps successive samples roughly
//! four subpixel units apart — adequate for 24.8 rasterization without
//! oversampling short curves.

/// Flatten the cubic `(x_0, y_0) .. (x_3, y_3)` into line-to targets.
///
/// `emit` receives every sample after the start point, in order; the last
/// sample lands on `(x_3, y_3)` up to floating-point roundoff. Degenerate
/// curves whose control points coincide emit nothing. Whenever anything is
/// emitted at all, at least four samples are produced.
#[allow(clippy::too_many_arguments)]
pub fn subdivide_cubic<F>(
    mut emit: F,
    x_0: f32,
    y_0: f32,
    x_1: f32,
    y_1: f32,
    x_2: f32,
    y_2: f32,
    x_3: f32,
    y_3: f32,
) where
    F: FnMut(f32, f32),
{
    let d_x_0 = (x_1 - x_0).abs();
    let d_y_0 = (y_1 - y_0).abs();
    let d_x_1 = (x_2 - x_1).abs();
    let d_y_1 = (y_2 - y_1).abs();
    let d_x_2 = (x_3 - x_2).abs();
    let d_y_2 = (y_3 - y_2).abs();

    let mut step_count =
        ((d_x_0 + d_y_0 + d_x_1 + d_y_1 + d_x_2 + d_y_2) * 0.25).ceil() as u32;
    if step_count == 0 {
        return;
    }
    if step_count < 4 {
        step_count = 4;
    }

    // B(t) = c_0 + c_1*t + c_2*t^2 + c_3*t^3 with
    // c_0 = p_0
    // c_1 = 3*(p_1 - p_0)
    // c_2 = 3*p_0 - 6*p_1 + 3*p_2
    // c_3 = p_3 - 3*p_2 + 3*p_1 - p_0
    let c_1_x = 3.0 * (x_1 - x_0);
    let c_1_y = 3.0 * (y_1 - y_0);
    let c_2_x = 3.0 * x_0 - 6.0 * x_1 + 3.0 * x_2;
    let c_2_y = 3.0 * y_0 - 6.0 * y_1 + 3.0 * y_2;
    let c_3_x = x_3 - 3.0 * x_2 + 3.0 * x_1 - x_0;
    let c_3_y = y_3 - 3.0 * y_2 + 3.0 * y_1 - y_0;

    let d_t = 1.0 / step_count as f32;
    let d_t_sqr = d_t * d_t;
    let d_t_cub = d_t * d_t_sqr;

    let mut d_x = c_3_x * d_t_cub + c_2_x * d_t_sqr + c_1_x * d_t;
    let mut d_y = c_3_y * d_t_cub + c_2_y * d_t_sqr + c_1_y * d_t;
    let mut d_d_x = c_2_x * d_t_sqr * 2.0;
    let mut d_d_y = c_2_y * d_t_sqr * 2.0;
    let d_d_d_x = c_3_x * d_t_cub * 6.0;
    let d_d_d_y = c_3_y * d_t_cub * 6.0;

    let mut x = x_0;
    let mut y = y_0;
    let mut remaining = step_count;

    loop {
        x += d_x;
        y += d_y;
        emit(x, y);

        remaining -= 1;
        if remaining == 0 {
            break;
        }
        d_d_x += d_d_d_x;
        d_d_y += d_d_d_y;
        d_x += d_d_x;
        d_y += d_d_y;
    }
}

// ============================================================================
// Tests
// ============================================================================
