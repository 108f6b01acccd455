//! Ray representation and basic ray-geometry tests.

use csgray_math::{Aabb3, BoundingSphere, Dir3, Point3, Vec3, FAR_DIST};

/// A ray in 3D space defined by origin and unit direction.
///
/// Points along the ray are `origin + t * direction`. `min_dist` and
/// `max_dist` bound the part of the ray inside the model; they start out
/// unbounded and are narrowed on the working copy the shooter makes.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Distance at which the ray enters the model bounds.
    pub min_dist: f64,
    /// Distance at which the ray leaves the model bounds.
    pub max_dist: f64,
    /// Successor ray for reflection or refraction continuation.
    pub deflected: Option<Box<Ray>>,
    inv_direction: Vec3,
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized. A zero direction produces a ray
    /// that fails [`Ray::is_valid`].
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        let dir = Dir3::new_normalize(direction);
        let inv = dir.map(|c| 1.0 / c);
        let sign = [
            usize::from(inv.x < 0.0),
            usize::from(inv.y < 0.0),
            usize::from(inv.z < 0.0),
        ];
        Self {
            origin,
            direction: dir,
            min_dist: -FAR_DIST,
            max_dist: FAR_DIST,
            deflected: None,
            inv_direction: inv,
            sign,
        }
    }

    /// Ray from azimuth and elevation in degrees, aimed back at `target`.
    ///
    /// The origin is placed `distance` away from `target` in the
    /// direction the view looks from.
    pub fn from_az_el(target: Point3, az_deg: f64, el_deg: f64, distance: f64) -> Self {
        let (az, el) = (az_deg.to_radians(), el_deg.to_radians());
        let toward_eye = Vec3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin());
        Self::new(target + toward_eye * distance, -toward_eye)
    }

    /// Chain a successor ray to be shot after this one.
    pub fn with_deflection(mut self, next: Ray) -> Self {
        self.deflected = Some(Box::new(next));
        self
    }

    /// True if origin and direction are finite and the direction has unit length.
    pub fn is_valid(&self) -> bool {
        self.origin.coords.iter().all(|c| c.is_finite())
            && self.direction.iter().all(|c| c.is_finite())
            && (self.direction.norm_squared() - 1.0).abs() < 1e-4
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Narrow `min_dist`/`max_dist` to the given range.
    pub fn clip(&mut self, min_dist: f64, max_dist: f64) {
        self.min_dist = self.min_dist.max(min_dist);
        self.max_dist = self.max_dist.min(max_dist);
    }

    /// Test whether the ray certainly misses a bounding sphere.
    #[inline]
    pub fn misses_sphere(&self, sphere: &BoundingSphere) -> bool {
        sphere.rejects(&self.origin, &self.direction)
    }

    /// Test ray-AABB intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))` if the ray intersects the box,
    /// where `t_min` and `t_max` are the entry and exit parameters; `t_min`
    /// is clamped to zero when the origin is inside. Boxes wholly behind the
    /// origin are misses.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let bounds = [aabb.min, aabb.max];
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for axis in 0..3 {
            let near = bounds[self.sign[axis]][axis];
            let far = bounds[1 - self.sign[axis]][axis];
            let o = self.origin[axis];
            if self.inv_direction[axis].is_infinite() {
                // Parallel to this slab: inside it or never.
                if o < near.min(far) || o > near.max(far) {
                    return None;
                }
                continue;
            }
            t_min = t_min.max((near - o) * self.inv_direction[axis]);
            t_max = t_max.min((far - o) * self.inv_direction[axis]);
        }

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb3 {
        Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn test_zero_direction_invalid() {
        let ray = Ray::new(Point3::origin(), Vec3::zeros());
        assert!(!ray.is_valid());
        assert!(Ray::new(Point3::origin(), Vec3::z()).is_valid());
    }

    #[test]
    fn test_nan_origin_invalid() {
        let ray = Ray::new(Point3::new(f64::NAN, 0.0, 0.0), Vec3::z());
        assert!(!ray.is_valid());
    }

    #[test]
    fn test_ray_aabb_hit() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit_box()).unwrap();
        assert!((t_min - 5.0).abs() < 1e-10);
        assert!((t_max - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_aabb_parallel_outside_slab() {
        let ray = Ray::new(Point3::new(-5.0, 5.0, 0.5), Vec3::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn test_ray_inside_aabb() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(t_min, 0.0);
        assert!((t_max - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_ray_aabb_behind() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn test_from_az_el_looks_at_target() {
        let ray = Ray::from_az_el(Point3::origin(), 0.0, 0.0, 100.0);
        assert!((ray.origin.x - 100.0).abs() < 1e-9);
        assert!((ray.direction.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_deflection_chain() {
        let first = Ray::new(Point3::origin(), Vec3::x())
            .with_deflection(Ray::new(Point3::new(1.0, 0.0, 0.0), Vec3::y()));
        let next = first.deflected.as_deref().unwrap();
        assert!((next.direction.y - 1.0).abs() < 1e-12);
    }
}
