//! Domain boundary handling.
//!
//! The simulation domain is an axis-aligned box. Particles that leave it are
//! absorbed: their velocity is zeroed and they stay where they are. There is
//! no reflection, friction or projection back inside.

use bevy::prelude::*;

use super::error::{SphError, SphResult};

/// Axis-aligned simulation domain.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct DomainBox {
    /// Minimum corner (x_start, y_start, z_start).
    pub min: Vec3,
    /// Maximum corner (x_end, y_end, z_end).
    pub max: Vec3,
}

impl Default for DomainBox {
    fn default() -> Self {
        Self {
            min: Vec3::splat(-3.0),
            max: Vec3::splat(9.0),
        }
    }
}

impl DomainBox {
    /// Create a domain box with custom bounds.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a domain box centered at origin.
    pub fn centered(half_extents: Vec3) -> Self {
        Self::new(-half_extents, half_extents)
    }

    /// Check the box is finite and non-empty on every axis.
    pub fn validate(&self) -> SphResult<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min.cmplt(self.max).all() {
            Ok(())
        } else {
            Err(SphError::InvalidDomain {
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Check if a point is inside the box, faces included.
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if a point lies strictly inside the box, faces excluded.
    pub fn strictly_contains(&self, point: Vec3) -> bool {
        point.cmpgt(self.min).all() && point.cmplt(self.max).all()
    }

    /// Whether a particle at `point` is outside the box on any axis.
    ///
    /// This is the boundary policy: the integrator freezes such particles.
    #[inline]
    pub fn is_outside(&self, point: Vec3) -> bool {
        !self.contains(point)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The 12 box edges as line segments, for wireframe drawing.
    pub fn edges(&self) -> [[Vec3; 2]; 12] {
        let (a, b) = (self.min, self.max);
        let corner = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        [
            // Along x.
            [corner(a.x, a.y, a.z), corner(b.x, a.y, a.z)],
            [corner(a.x, b.y, a.z), corner(b.x, b.y, a.z)],
            [corner(a.x, a.y, b.z), corner(b.x, a.y, b.z)],
            [corner(a.x, b.y, b.z), corner(b.x, b.y, b.z)],
            // Along z.
            [corner(a.x, a.y, a.z), corner(a.x, a.y, b.z)],
            [corner(b.x, a.y, a.z), corner(b.x, a.y, b.z)],
            [corner(a.x, b.y, a.z), corner(a.x, b.y, b.z)],
            [corner(b.x, b.y, a.z), corner(b.x, b.y, b.z)],
            // Along y.
            [corner(a.x, a.y, a.z), corner(a.x, b.y, a.z)],
            [corner(b.x, a.y, a.z), corner(b.x, b.y, a.z)],
            [corner(a.x, a.y, b.z), corner(a.x, b.y, b.z)],
            [corner(b.x, a.y, b.z), corner(b.x, b.y, b.z)],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_box_contains() {
        let domain = DomainBox::default();
        assert!(domain.contains(Vec3::ZERO));
        assert!(domain.contains(Vec3::splat(9.0)));
        assert!(!domain.contains(Vec3::new(0.0, -3.5, 0.0)));
        assert!(!domain.contains(Vec3::new(0.0, 0.0, 9.1)));
    }

    #[test]
    fn test_is_outside_on_any_axis() {
        let domain = DomainBox::centered(Vec3::ONE);
        assert!(!domain.is_outside(Vec3::new(0.5, -0.5, 0.9)));
        assert!(domain.is_outside(Vec3::new(1.5, 0.0, 0.0)));
        assert!(domain.is_outside(Vec3::new(0.0, -1.5, 0.0)));
        assert!(domain.is_outside(Vec3::new(0.0, 0.0, 1.01)));
    }

    #[test]
    fn test_strictly_contains_excludes_faces() {
        let domain = DomainBox::centered(Vec3::ONE);
        assert!(domain.strictly_contains(Vec3::ZERO));
        assert!(!domain.strictly_contains(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_validate() {
        assert!(DomainBox::default().validate().is_ok());
        let inverted = DomainBox::new(Vec3::ONE, Vec3::new(2.0, 0.5, 2.0));
        assert!(matches!(
            inverted.validate(),
            Err(SphError::InvalidDomain { .. })
        ));
        let flat = DomainBox::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        assert!(flat.validate().is_err());
    }

    #[test]
    fn test_edges() {
        let domain = DomainBox::default();
        let edges = domain.edges();
        let size = domain.size();
        for [start, end] in edges {
            assert!(domain.contains(start) && domain.contains(end));
            // Each edge runs along exactly one axis, over the full box extent.
            let delta = (end - start).abs();
            let axes = delta.cmpgt(Vec3::ZERO).bitmask().count_ones();
            assert_eq!(axes, 1);
            assert!((delta.max_element() - size.max_element()).abs() < 1e-6);
        }
        assert_eq!(domain.center(), Vec3::splat(3.0));
    }
}
