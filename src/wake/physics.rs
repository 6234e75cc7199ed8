use crate::consts::GEOMETRY_EPSILON;
use std::f64::consts::PI;

/// Position of a cell in the frame of one wind direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePoint {
    /// Distance along the direction the wind travels.
    pub downwind: f64,
    /// Signed distance perpendicular to it.
    pub crosswind: f64,
}

/// Projects `(x, y)` into the downwind/crosswind frame of a meteorological
/// direction (degrees clockwise from north, the direction wind comes FROM).
pub fn to_wind_frame(x: f64, y: f64, direction_deg: f64) -> FramePoint {
    let theta = direction_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    // Wind travels towards (-sin, -cos).
    FramePoint {
        downwind: -x * sin - y * cos,
        crosswind: x * cos - y * sin,
    }
}

/// Area of the intersection of two circles with radii `r1`, `r2` whose
/// centres are `d` apart.
pub fn circle_overlap_area(r1: f64, r2: f64, d: f64) -> f64 {
    if r1 <= 0.0 || r2 <= 0.0 {
        return 0.0;
    }
    if d >= r1 + r2 {
        return 0.0;
    }
    let small = r1.min(r2);
    if d <= (r1 - r2).abs() {
        return PI * small * small;
    }

    let a1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0);
    let a2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0);
    let k = (-d + r1 + r2) * (d + r1 - r2) * (d - r1 + r2) * (d + r1 + r2);

    r1 * r1 * a1.acos() + r2 * r2 * a2.acos() - 0.5 * k.max(0.0).sqrt()
}

/// Geometry of the wake one rotor casts on another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WakeHit {
    pub distance: f64,
    pub wake_radius: f64,
    /// Share of the downwind rotor area inside the wake, in [0, 1].
    pub overlap: f64,
}

/// Tests whether `down` sits in the wake cone of `up`.
///
/// Returns `None` for unshaded pairs. Coincident positions count as fully
/// shaded at zero distance.
pub fn wake_hit(up: FramePoint, down: FramePoint, rotor_radius: f64, expansion: f64) -> Option<WakeHit> {
    let dx = down.downwind - up.downwind;
    let dc = (down.crosswind - up.crosswind).abs();

    if dx.abs() <= GEOMETRY_EPSILON && dc <= GEOMETRY_EPSILON {
        return Some(WakeHit {
            distance: 0.0,
            wake_radius: rotor_radius,
            overlap: 1.0,
        });
    }
    if dx <= GEOMETRY_EPSILON {
        return None;
    }

    let wake_radius = rotor_radius + expansion * dx;
    if dc >= wake_radius + rotor_radius {
        return None;
    }

    let rotor_area = PI * rotor_radius * rotor_radius;
    let overlap = (circle_overlap_area(wake_radius, rotor_radius, dc) / rotor_area).clamp(0.0, 1.0);
    if overlap <= 0.0 {
        return None;
    }

    Some(WakeHit {
        distance: dx,
        wake_radius,
        overlap,
    })
}

/// Jensen velocity deficit of one wake, scaled by the overlapped rotor share.
#[inline]
pub fn jensen_deficit(hit: &WakeHit, rotor_radius: f64, induction: f64) -> f64 {
    let ratio = rotor_radius / hit.wake_radius;
    hit.overlap * induction * ratio * ratio
}

/// Root-sum-of-squares combination of individual deficits.
pub fn combine_deficits(deficits: &[f64]) -> f64 {
    deficits.iter().map(|d| d * d).sum::<f64>().sqrt()
}
