//! SPH smoothing kernels.
//!
//! Closed forms from Müller, Charypar & Gross, "Particle-Based Fluid Simulation
//! for Interactive Applications" (2003). Every kernel takes the displacement
//! `r = x_i - x_j` and the support radius `h`, and vanishes for `|r| > h`.

use std::f32::consts::PI;

use bevy::prelude::*;

/// Distances below this are treated as coincident particles.
pub const MIN_KERNEL_DISTANCE: f32 = 1e-6;

/// SPH kernel functions.
pub struct SphKernels;

impl SphKernels {
    /// Poly6 kernel for density estimation.
    /// W(r, h) = (315 / 64πh⁹) * (h² - r²)³ for r ≤ h
    #[inline]
    pub fn poly6(r: Vec3, h: f32) -> f32 {
        let r_sq = r.length_squared();
        let h_sq = h * h;
        if r_sq > h_sq {
            return 0.0;
        }
        let diff = h_sq - r_sq;
        315.0 / (64.0 * PI * h.powi(9)) * diff * diff * diff
    }

    /// Gradient of the poly6 kernel, used for the color field normal.
    /// ∇W(r, h) = -(945 / 32πh⁹) * (h² - r²)² * r
    #[inline]
    pub fn poly6_gradient(r: Vec3, h: f32) -> Vec3 {
        let r_sq = r.length_squared();
        let h_sq = h * h;
        if r_sq > h_sq {
            return Vec3::ZERO;
        }
        let diff = h_sq - r_sq;
        -945.0 / (32.0 * PI * h.powi(9)) * diff * diff * r
    }

    /// Laplacian of the poly6 kernel, used for the color field curvature.
    /// ∇²W(r, h) = -(945 / 32πh⁹) * (h² - r²) * (3h² - 7r²)
    #[inline]
    pub fn poly6_laplacian(r: Vec3, h: f32) -> f32 {
        let r_sq = r.length_squared();
        let h_sq = h * h;
        if r_sq > h_sq {
            return 0.0;
        }
        -945.0 / (32.0 * PI * h.powi(9)) * (h_sq - r_sq) * (3.0 * h_sq - 7.0 * r_sq)
    }

    /// Spiky kernel.
    /// W(r, h) = (15 / πh⁶) * (h - r)³
    #[inline]
    pub fn spiky(r: Vec3, h: f32) -> f32 {
        let r_len = r.length();
        if r_len > h {
            return 0.0;
        }
        let diff = h - r_len;
        15.0 / (PI * h.powi(6)) * diff * diff * diff
    }

    /// Gradient of the spiky kernel for pressure forces.
    /// ∇W(r, h) = -(45 / πh⁶) * (h - r)² * (r / |r|)
    ///
    /// Returns zero for coincident particles, where the direction is undefined.
    #[inline]
    pub fn spiky_gradient(r: Vec3, h: f32) -> Vec3 {
        let r_len = r.length();
        if r_len > h || r_len < MIN_KERNEL_DISTANCE {
            return Vec3::ZERO;
        }
        let diff = h - r_len;
        -45.0 / (PI * h.powi(6)) * diff * diff * (r / r_len)
    }

    /// Viscosity kernel.
    /// W(r, h) = (15 / 2πh³) * (-r³/2h³ + r²/h² + h/2r - 1)
    ///
    /// The closed form diverges at `r = 0`; coincident particles get zero.
    #[inline]
    pub fn viscosity(r: Vec3, h: f32) -> f32 {
        let r_len = r.length();
        if r_len > h || r_len < MIN_KERNEL_DISTANCE {
            return 0.0;
        }
        let h3 = h * h * h;
        let shape = -r_len * r_len * r_len / (2.0 * h3) + r_len * r_len / (h * h)
            + h / (2.0 * r_len)
            - 1.0;
        15.0 / (2.0 * PI * h3) * shape
    }

    /// Laplacian of the viscosity kernel.
    /// ∇²W(r, h) = (45 / πh⁶) * (h - r)
    #[inline]
    pub fn viscosity_laplacian(r: Vec3, h: f32) -> f32 {
        let r_len = r.length();
        if r_len > h {
            return 0.0;
        }
        45.0 / (PI * h.powi(6)) * (h - r_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: f32 = 1.0;

    fn outside_samples() -> Vec<Vec3> {
        vec![
            Vec3::new(1.0001, 0.0, 0.0),
            Vec3::new(0.0, -1.5, 0.0),
            Vec3::new(0.8, 0.8, 0.8),
            Vec3::splat(10.0),
        ]
    }

    #[test]
    fn test_compact_support() {
        for r in outside_samples() {
            assert_eq!(SphKernels::poly6(r, H), 0.0);
            assert_eq!(SphKernels::poly6_gradient(r, H), Vec3::ZERO);
            assert_eq!(SphKernels::poly6_laplacian(r, H), 0.0);
            assert_eq!(SphKernels::spiky(r, H), 0.0);
            assert_eq!(SphKernels::spiky_gradient(r, H), Vec3::ZERO);
            assert_eq!(SphKernels::viscosity(r, H), 0.0);
            assert_eq!(SphKernels::viscosity_laplacian(r, H), 0.0);
        }
    }

    #[test]
    fn test_continuity_at_support_radius() {
        for r in [Vec3::X, Vec3::NEG_Y, Vec3::Z * H] {
            assert!(SphKernels::poly6(r, H).abs() < 1e-6);
            assert!(SphKernels::poly6_gradient(r, H).length() < 1e-6);
            assert!(SphKernels::poly6_laplacian(r, H).abs() < 1e-6);
            assert!(SphKernels::spiky(r, H).abs() < 1e-6);
            assert!(SphKernels::spiky_gradient(r, H).length() < 1e-6);
            assert!(SphKernels::viscosity_laplacian(r, H).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normalization_constants() {
        // At r = 0 the kernels reduce to their normalization factors times a power of h.
        let h = 2.0_f32;
        let poly6_0 = SphKernels::poly6(Vec3::ZERO, h);
        let expected = 315.0 / (64.0 * PI * h.powi(9)) * h.powi(6);
        assert!((poly6_0 - expected).abs() / expected < 1e-6);

        let spiky_0 = SphKernels::spiky(Vec3::ZERO, h);
        let expected = 15.0 / (PI * h.powi(6)) * h.powi(3);
        assert!((spiky_0 - expected).abs() / expected < 1e-6);

        let lap_0 = SphKernels::viscosity_laplacian(Vec3::ZERO, h);
        let expected = 45.0 / (PI * h.powi(6)) * h;
        assert!((lap_0 - expected).abs() / expected < 1e-6);
    }

    #[test]
    fn test_poly6_decreases_with_distance() {
        let w_0 = SphKernels::poly6(Vec3::ZERO, H);
        let w_half = SphKernels::poly6(Vec3::new(0.5, 0.0, 0.0), H);
        let w_edge = SphKernels::poly6(Vec3::new(0.99, 0.0, 0.0), H);
        assert!(w_0 > w_half);
        assert!(w_half > w_edge);
        assert!(w_edge > 0.0);
    }

    #[test]
    fn test_spiky_gradient_zero_distance_guard() {
        let grad = SphKernels::spiky_gradient(Vec3::ZERO, H);
        assert_eq!(grad, Vec3::ZERO);
        assert!(grad.is_finite());

        // Tiny but nonzero separations stay finite and keep their direction.
        let r = Vec3::new(1e-4, 0.0, 0.0);
        let grad = SphKernels::spiky_gradient(r, H);
        assert!(grad.is_finite());
        assert!(grad.x < 0.0);
        assert_eq!(grad.y, 0.0);
    }

    #[test]
    fn test_spiky_gradient_points_toward_neighbor() {
        let r = Vec3::new(0.5, 0.0, 0.0);
        let grad = SphKernels::spiky_gradient(r, H);
        assert!(grad.x < 0.0);
        assert!((SphKernels::spiky_gradient(-r, H) + grad).length() < 1e-6);
    }

    #[test]
    fn test_poly6_gradient_matches_finite_difference() {
        let r = Vec3::new(0.3, -0.2, 0.1);
        let eps = 1e-3;
        let analytic = SphKernels::poly6_gradient(r, H);
        let numeric_x = (SphKernels::poly6(r + Vec3::X * eps, H)
            - SphKernels::poly6(r - Vec3::X * eps, H))
            / (2.0 * eps);
        assert!((analytic.x - numeric_x).abs() < 1e-2 * numeric_x.abs().max(1.0));
    }

    #[test]
    fn test_viscosity_guards_zero_distance() {
        assert_eq!(SphKernels::viscosity(Vec3::ZERO, H), 0.0);
        assert!(SphKernels::viscosity(Vec3::new(0.5, 0.0, 0.0), H) > 0.0);
        assert!(SphKernels::viscosity_laplacian(Vec3::ZERO, H) > 0.0);
    }
}
