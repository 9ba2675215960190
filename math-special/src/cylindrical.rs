//! Cylindrical Bessel and Hankel functions of integer order
//!
//! Thin layer over `spec_math`, which provides J_ν and Y_ν for real order.

use num_complex::Complex64;
use spec_math::Bessel;

/// Cylindrical Bessel function of the first kind, order `n`
pub fn bessel_j(n: usize, x: f64) -> f64 {
    x.bessel_jv(n as f64)
}

/// Cylindrical Bessel function of the second kind (Neumann), order `n`
pub fn bessel_y(n: usize, x: f64) -> f64 {
    x.bessel_yv(n as f64)
}

/// Hankel function of the first kind H_n^(1)(x) = J_n(x) + i Y_n(x)
pub fn hankel_first_kind(n: usize, x: f64) -> Complex64 {
    Complex64::new(bessel_j(n, x), bessel_y(n, x))
}

/// J_n, Y_n of one argument for n = 0..=max_order with derivatives
///
/// Derivatives use Z_n' = Z_{n-1} - (n/x) Z_n and Z_0' = -Z_1.
#[derive(Debug, Clone)]
pub struct CylindricalBesselTable {
    x: f64,
    j: Vec<f64>,
    y: Vec<f64>,
}

impl CylindricalBesselTable {
    pub fn new(max_order: usize, x: f64) -> Self {
        let j = (0..=max_order + 1).map(|n| bessel_j(n, x)).collect();
        let y = (0..=max_order + 1).map(|n| bessel_y(n, x)).collect();
        Self { x, j, y }
    }

    pub fn argument(&self) -> f64 {
        self.x
    }

    pub fn max_order(&self) -> usize {
        self.j.len() - 2
    }

    pub fn j(&self, n: usize) -> f64 {
        self.j[n]
    }

    pub fn y(&self, n: usize) -> f64 {
        self.y[n]
    }

    pub fn dj(&self, n: usize) -> f64 {
        derivative(&self.j, n, self.x)
    }

    pub fn dy(&self, n: usize) -> f64 {
        derivative(&self.y, n, self.x)
    }

    pub fn h(&self, n: usize) -> Complex64 {
        Complex64::new(self.j(n), self.y(n))
    }

    pub fn dh(&self, n: usize) -> Complex64 {
        Complex64::new(self.dj(n), self.dy(n))
    }
}

#[inline]
fn derivative(values: &[f64], n: usize, x: f64) -> f64 {
    if n == 0 {
        -values[1]
    } else {
        values[n - 1] - n as f64 / x * values[n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_bessel_reference_values() {
        let x = 1.0;
        assert_abs_diff_eq!(bessel_j(0, x), 0.7651976865579666, epsilon = 1e-10);
        assert_abs_diff_eq!(bessel_j(1, x), 0.4400505857449335, epsilon = 1e-10);
        assert_abs_diff_eq!(bessel_y(0, x), 0.08825696421567696, epsilon = 1e-10);
        assert_abs_diff_eq!(bessel_y(1, x), -0.7812128213002887, epsilon = 1e-10);
    }

    #[test]
    fn test_wronskian() {
        // J_n Y_n' - J_n' Y_n = 2/(πx)
        for &x in &[0.5, 3.0, 12.0] {
            let table = CylindricalBesselTable::new(10, x);
            for n in 0..=10 {
                let w = table.j(n) * table.dy(n) - table.dj(n) * table.y(n);
                assert_abs_diff_eq!(w * PI * x / 2.0, 1.0, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_hankel_matches_table() {
        let table = CylindricalBesselTable::new(4, 2.5);
        for n in 0..=4 {
            assert!((table.h(n) - hankel_first_kind(n, 2.5)).norm() < 1e-14);
        }
        assert_eq!(table.max_order(), 4);
    }
}
