use crate::{
    constants::{NEARLY_ZERO, YAW_EPS},
    types::{Quat, Vec3},
};
use nalgebra::{Vector2, Vector3};

/// World "up" axis. The controller axis of every capsule is +Y.
#[inline]
pub fn up() -> Vec3 {
    Vector3::y()
}

pub fn yaw_from_xz(xz: Vector2<f32>) -> Option<f32> {
    if xz.norm_squared() > YAW_EPS {
        return Some((-xz[0]).atan2(-xz[1]));
    }

    None
}

/// Yaw-only rotation (about +Y) facing along the planar part of `dir`.
///
/// Returns `None` if the planar part is too small to define a heading.
pub fn facing_from_direction(dir: &Vec3) -> Option<Quat> {
    yaw_from_xz(Vector2::new(dir.x, dir.z))
        .map(|yaw| Quat::from_axis_angle(&Vector3::y_axis(), yaw))
}

/// Drop the Y component.
#[inline]
pub fn to_planar(v: &Vec3) -> Vector2<f32> {
    Vector2::new(v.x, v.z)
}

/// Normalize `v`, or zero if it is too short to have a direction.
#[inline]
pub fn safe_normal(v: &Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
}

/// Remove the component of `v` along `normal` (which must be unit length).
#[inline]
pub fn project_on_plane(v: &Vec3, normal: &Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

#[inline]
pub fn is_nearly_zero(v: &Vec3) -> bool {
    v.x.abs() <= NEARLY_ZERO && v.y.abs() <= NEARLY_ZERO && v.z.abs() <= NEARLY_ZERO
}

/// Closest point to `point` on the closed segment `[a, b]`.
///
/// A degenerate segment (a == b) always yields `a`.
pub fn closest_point_on_segment(point: &Vec3, a: &Vec3, b: &Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f32::EPSILON {
        return *a;
    }

    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    if t <= 0.0 {
        *a
    } else if t >= 1.0 {
        *b
    } else {
        a + ab * t
    }
}

/// Squared distance between the closest points of segments `[p1, q1]` and `[p2, q2]`.
///
/// Degenerate segments are treated as points.
pub fn segment_distance_sq(p1: &Vec3, q1: &Vec3, p2: &Vec3, q2: &Vec3) -> f32 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let (s, t) = if a <= f32::EPSILON && e <= f32::EPSILON {
        (0.0, 0.0)
    } else if a <= f32::EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= f32::EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            // Parallel segments: any `s` works, start from p1.
            let s = if denom > f32::EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t = (b * s + f) / e;
            if t < 0.0 {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (((b - c) / a).clamp(0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };

    ((p1 + d1 * s) - (p2 + d2 * t)).norm_squared()
}

/// Returns true when endpoint `a` is the nearer one to `position`.
///
/// Ties go to `a`, so the choice is stable for identical inputs.
#[inline]
pub fn a_is_nearer(position: &Vec3, a: &Vec3, b: &Vec3) -> bool {
    (a - position).norm_squared() <= (b - position).norm_squared()
}
