//! Spherical Bessel and Hankel functions
//!
//! ## Definitions
//!
//! Spherical Bessel function of first kind:
//! ```text
//! j_n(x) = √(π/2x) * J_{n+1/2}(x)
//! ```
//!
//! Spherical Bessel function of second kind (Neumann):
//! ```text
//! y_n(x) = √(π/2x) * Y_{n+1/2}(x)
//! ```
//!
//! Spherical Hankel function of first kind:
//! ```text
//! h_n^(1)(x) = j_n(x) + i * y_n(x)
//! ```
//!
//! Modal scattering solutions need every order up to the truncation order at
//! each interface radius, so the functions here return whole ladders of orders
//! and [`SphericalBesselTable`] caches one argument's ladder together with the
//! derivatives used in the boundary conditions.

use num_complex::Complex64;

/// Magnitude at which Miller's recurrence is rescaled to stay finite
const MILLER_RESCALE: f64 = 1e250;

/// Compute spherical Bessel functions j_n(x) for n = 0, 1, ..., order-1
///
/// Uses Miller's downward recurrence for numerical stability, which is
/// essential when n > x. The recurrence relation is:
/// ```text
/// j_{n-1}(x) = (2n+1)/x * j_n(x) - j_{n+1}(x)
/// ```
///
/// The recurrence is rescaled whenever it grows past `1e250`, which happens for
/// small arguments, and the ladder is normalised against whichever of
/// j_0(x) = sin(x)/x and j_1(x) is larger so that zeros of sin(x) do not
/// destroy the scale.
///
/// # Arguments
/// * `order` - Number of terms (returns j_0 through j_{order-1})
/// * `x` - Argument (must be > 0)
///
/// # Example
/// ```
/// use math_echo_special::spherical_bessel_j;
/// let j = spherical_bessel_j(5, 1.0);
/// assert!((j[0] - 1.0_f64.sin()).abs() < 1e-12);
/// ```
pub fn spherical_bessel_j(order: usize, x: f64) -> Vec<f64> {
    assert!(order >= 1, "Order must be at least 1");

    let mut result = vec![0.0; order];

    // Handle very small x
    if x.abs() < 1e-15 {
        result[0] = 1.0;
        return result;
    }

    if x.abs() < 1e-10 {
        // Series expansion for small x
        result[0] = 1.0 - x * x / 6.0;
        if order > 1 {
            result[1] = x / 3.0;
        }
        return result;
    }

    // Start well above both the requested order and the argument
    let start_n = order + (x.abs() as usize) + 20;

    let mut values = vec![0.0; start_n + 2];
    values[start_n] = 1e-30;

    for k in (0..start_n).rev() {
        values[k] = (2 * k + 3) as f64 / x * values[k + 1] - values[k + 2];
        if values[k].abs() > MILLER_RESCALE {
            for v in values[k..].iter_mut() {
                *v /= MILLER_RESCALE;
            }
        }
    }

    let (sin_x, cos_x) = x.sin_cos();
    let true_j0 = sin_x / x;
    let true_j1 = sin_x / (x * x) - cos_x / x;
    let scale = if true_j0.abs() >= true_j1.abs() {
        true_j0 / values[0]
    } else {
        true_j1 / values[1]
    };

    for (r, v) in result.iter_mut().zip(values.iter()) {
        *r = v * scale;
    }

    result
}

/// Compute spherical Bessel functions y_n(x) (Neumann functions) for n = 0, 1, ..., order-1
///
/// Uses upward recurrence, which is stable for y_n:
/// ```text
/// y_{n+1}(x) = (2n+1)/x * y_n(x) - y_{n-1}(x)
/// ```
///
/// Starting values:
/// ```text
/// y_0(x) = -cos(x)/x
/// y_1(x) = -cos(x)/x² - sin(x)/x
/// ```
///
/// # Arguments
/// * `order` - Number of terms (returns y_0 through y_{order-1})
/// * `x` - Argument (must be > 0)
pub fn spherical_bessel_y(order: usize, x: f64) -> Vec<f64> {
    assert!(order >= 1, "Order must be at least 1");

    let mut result = vec![0.0; order];

    if x.abs() < 1e-15 {
        // y_n → -∞ as x → 0
        result.fill(f64::NEG_INFINITY);
        return result;
    }

    let (sin_x, cos_x) = x.sin_cos();

    result[0] = -cos_x / x;

    if order == 1 {
        return result;
    }

    result[1] = -cos_x / (x * x) - sin_x / x;

    for n in 2..order {
        result[n] = (2 * n - 1) as f64 / x * result[n - 1] - result[n - 2];
    }

    result
}

/// Compute spherical Hankel functions of the first kind h_n^(1)(x) for n = 0, 1, ..., order-1
///
/// Each value is assembled from the stable j_n and y_n ladders above.
pub fn spherical_hankel_first_kind(order: usize, x: f64) -> Vec<Complex64> {
    let j = spherical_bessel_j(order, x);
    let y = spherical_bessel_y(order, x);
    j.into_iter()
        .zip(y)
        .map(|(re, im)| Complex64::new(re, im))
        .collect()
}

/// Compute derivative of spherical Bessel j_n'(x)
///
/// Uses the recurrence relation:
/// ```text
/// j_n'(x) = j_{n-1}(x) - (n+1)/x * j_n(x)
/// ```
pub fn spherical_bessel_j_derivative(order: usize, x: f64) -> Vec<f64> {
    let j = spherical_bessel_j(order + 1, x);
    (0..order).map(|n| ladder_derivative(&j, n, x)).collect()
}

/// Compute derivative of spherical Bessel y_n'(x)
///
/// Uses the recurrence relation:
/// ```text
/// y_n'(x) = y_{n-1}(x) - (n+1)/x * y_n(x)
/// ```
pub fn spherical_bessel_y_derivative(order: usize, x: f64) -> Vec<f64> {
    let y = spherical_bessel_y(order + 1, x);
    (0..order).map(|n| ladder_derivative(&y, n, x)).collect()
}

#[inline]
fn ladder_derivative(values: &[f64], n: usize, x: f64) -> f64 {
    if n == 0 {
        // z_0' = -z_1
        -values[1]
    } else {
        values[n - 1] - (n + 1) as f64 / x * values[n]
    }
}

/// Second derivative from the spherical Bessel equation
///
/// ```text
/// z'' = -(2/x) z' + (n(n+1)/x² - 1) z
/// ```
#[inline]
fn ladder_second_derivative(value: f64, derivative: f64, n: usize, x: f64) -> f64 {
    let nn = (n * (n + 1)) as f64;
    -2.0 / x * derivative + (nn / (x * x) - 1.0) * value
}

/// Which solution of the spherical Bessel equation to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SphericalKind {
    /// Regular solution j_n
    First,
    /// Irregular solution y_n
    Second,
}

/// Spherical Bessel ladders j_n, y_n of one argument for n = 0..=max_order
///
/// Boundary conditions at an interface need the values and derivatives of
/// several orders at the same radius; the table evaluates the two recurrences
/// once and derives everything else on demand.
#[derive(Debug, Clone)]
pub struct SphericalBesselTable {
    x: f64,
    j: Vec<f64>,
    y: Vec<f64>,
}

impl SphericalBesselTable {
    /// Evaluate the ladders for orders `0..=max_order` at `x > 0`
    pub fn new(max_order: usize, x: f64) -> Self {
        // One extra order for the derivative recurrence
        Self {
            x,
            j: spherical_bessel_j(max_order + 2, x),
            y: spherical_bessel_y(max_order + 2, x),
        }
    }

    /// The common argument
    pub fn argument(&self) -> f64 {
        self.x
    }

    /// Highest order with a valid derivative
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
        ladder_derivative(&self.j, n, self.x)
    }

    pub fn dy(&self, n: usize) -> f64 {
        ladder_derivative(&self.y, n, self.x)
    }

    pub fn d2j(&self, n: usize) -> f64 {
        ladder_second_derivative(self.j(n), self.dj(n), n, self.x)
    }

    pub fn d2y(&self, n: usize) -> f64 {
        ladder_second_derivative(self.y(n), self.dy(n), n, self.x)
    }

    /// h_n^(1)(x)
    pub fn h(&self, n: usize) -> Complex64 {
        Complex64::new(self.j(n), self.y(n))
    }

    /// d/dx h_n^(1)(x)
    pub fn dh(&self, n: usize) -> Complex64 {
        Complex64::new(self.dj(n), self.dy(n))
    }

    /// z_n(x) for the requested kind
    pub fn value(&self, kind: SphericalKind, n: usize) -> f64 {
        match kind {
            SphericalKind::First => self.j(n),
            SphericalKind::Second => self.y(n),
        }
    }

    /// z_n'(x) for the requested kind
    pub fn derivative(&self, kind: SphericalKind, n: usize) -> f64 {
        match kind {
            SphericalKind::First => self.dj(n),
            SphericalKind::Second => self.dy(n),
        }
    }

    /// z_n''(x) for the requested kind
    pub fn second_derivative(&self, kind: SphericalKind, n: usize) -> f64 {
        match kind {
            SphericalKind::First => self.d2j(n),
            SphericalKind::Second => self.d2y(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_spherical_bessel_j0() {
        let j = spherical_bessel_j(1, 1.0);
        assert!((j[0] - 1.0_f64.sin()).abs() < EPSILON);

        let j = spherical_bessel_j(1, PI);
        assert!((j[0] - PI.sin() / PI).abs() < EPSILON);
    }

    #[test]
    fn test_spherical_bessel_j1() {
        // j_1(x) = sin(x)/x² - cos(x)/x
        let x = 2.0;
        let j = spherical_bessel_j(2, x);
        let expected = x.sin() / (x * x) - x.cos() / x;
        assert!((j[1] - expected).abs() < EPSILON);
    }

    #[test]
    fn test_spherical_bessel_j_at_zero_of_sine() {
        // j_2(π) = 3/π² since sin(π) = 0 and cos(π) = -1
        let j = spherical_bessel_j(3, PI);
        assert_relative_eq!(j[2], 3.0 / (PI * PI), max_relative = 1e-10);
    }

    #[test]
    fn test_spherical_bessel_j_small_argument_high_order() {
        // j_n(x) ≈ x^n / (2n+1)!! for x << 1
        let x = 1e-4;
        let j = spherical_bessel_j(12, x);
        let mut double_factorial = 1.0;
        for k in (1..=21).step_by(2) {
            double_factorial *= k as f64;
        }
        let expected = x.powi(10) / double_factorial;
        assert!(j.iter().all(|v| v.is_finite()));
        assert_relative_eq!(j[10], expected, max_relative = 1e-6);
    }

    #[test]
    fn test_spherical_bessel_y0_y1() {
        let x = 1.0;
        let y = spherical_bessel_y(2, x);
        assert!((y[0] + x.cos() / x).abs() < EPSILON);

        let x = 2.0;
        let y = spherical_bessel_y(2, x);
        let expected = -x.cos() / (x * x) - x.sin() / x;
        assert!((y[1] - expected).abs() < EPSILON);
    }

    #[test]
    fn test_cross_product_wronskian() {
        // j_n y_n' - j_n' y_n = 1/x²
        for &x in &[0.3, 1.7, 8.0, 25.0] {
            let table = SphericalBesselTable::new(30, x);
            for n in 0..=30 {
                let w = table.j(n) * table.dy(n) - table.dj(n) * table.y(n);
                assert_relative_eq!(w * x * x, 1.0, max_relative = 1e-8);
            }
        }
    }

    #[test]
    fn test_second_derivative_matches_finite_difference() {
        let x = 3.3;
        let dx = 1e-4;
        let centre = SphericalBesselTable::new(6, x);
        let plus = SphericalBesselTable::new(6, x + dx);
        let minus = SphericalBesselTable::new(6, x - dx);
        for n in 0..=6 {
            let fd = (plus.dj(n) - minus.dj(n)) / (2.0 * dx);
            assert!((centre.d2j(n) - fd).abs() < 1e-6);
            let fd = (plus.dy(n) - minus.dy(n)) / (2.0 * dx);
            assert!((centre.d2y(n) - fd).abs() < 1e-6);
        }
    }

    #[test]
    fn test_derivative_ladders_match_table() {
        let x = 4.2;
        let dj = spherical_bessel_j_derivative(8, x);
        let dy = spherical_bessel_y_derivative(8, x);
        let table = SphericalBesselTable::new(8, x);
        for n in 0..8 {
            assert_relative_eq!(dj[n], table.dj(n), max_relative = 1e-12);
            assert_relative_eq!(dy[n], table.dy(n), max_relative = 1e-12);
            assert_eq!(table.value(SphericalKind::First, n), table.j(n));
            assert_eq!(table.derivative(SphericalKind::Second, n), table.dy(n));
        }
    }

    #[test]
    fn test_spherical_hankel_consistency() {
        let x = 3.0;
        let h = spherical_hankel_first_kind(5, x);
        let table = SphericalBesselTable::new(5, x);
        for (n, hn) in h.iter().enumerate() {
            assert!((hn - table.h(n)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_hankel_asymptotic() {
        // h_0(x) = -i exp(ix)/x
        let x = 50.0;
        let h = spherical_hankel_first_kind(3, x);
        assert!((h[0].re - x.sin() / x).abs() < 1e-12);
        assert!((h[0].im + x.cos() / x).abs() < 1e-12);
    }
}
