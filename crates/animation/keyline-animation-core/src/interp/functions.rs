//! Built-in easing curves over normalized progress.
//!
//! Every function maps [0,1] onto [0,1], is monotonic non-decreasing and
//! fixes both endpoints.

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input progress in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
pub fn bezier_ease(p: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    if x1 == y1 && x2 == y2 {
        return p;
    }
    // Monotonic X in [0,1] assumed for x1/x2 in [0,1]
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = p;
    for _ in 0..48 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - p).abs() < 1e-9 {
            break;
        }
        if x < p {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

#[inline]
pub fn linear(p: f64) -> f64 {
    p
}

#[inline]
pub fn ease_in(p: f64) -> f64 {
    bezier_ease(p, 0.42, 0.0, 1.0, 1.0)
}

#[inline]
pub fn ease_out(p: f64) -> f64 {
    bezier_ease(p, 0.0, 0.0, 0.58, 1.0)
}

#[inline]
pub fn ease_in_out(p: f64) -> f64 {
    bezier_ease(p, 0.42, 0.0, 0.58, 1.0)
}

#[inline]
pub fn ease(p: f64) -> f64 {
    bezier_ease(p, 0.25, 0.1, 0.25, 1.0)
}

/// Hermite smoothstep.
#[inline]
pub fn smooth(p: f64) -> f64 {
    p * p * (3.0 - 2.0 * p)
}

/// Holds the start state for the whole segment and jumps on arrival.
#[inline]
pub fn step(p: f64) -> f64 {
    if p >= 1.0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn curves_fix_endpoints() {
        for f in [linear, ease_in, ease_out, ease_in_out, ease, smooth, step] {
            approx(f(0.0), 0.0, 1e-9);
            approx(f(1.0), 1.0, 1e-9);
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for f in [linear, ease_in, ease_out, ease_in_out, ease, smooth, step] {
            let mut last = f(0.0);
            for i in 1..=200 {
                let y = f(i as f64 / 200.0);
                assert!(y + 1e-9 >= last, "not monotonic at {i}");
                last = y;
            }
        }
    }

    #[test]
    fn ease_in_out_is_symmetric_at_midpoint() {
        approx(ease_in_out(0.5), 0.5, 1e-6);
        assert!(ease_in(0.25) < 0.25);
        assert!(ease_out(0.25) > 0.25);
    }
}
