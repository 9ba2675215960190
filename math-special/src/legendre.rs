//! Legendre polynomials and associated functions
//!
//! Used for the angular parts of the spherical and spheroidal modal series.

/// Compute Legendre polynomials P_n(x) for n = 0, 1, ..., order-1
///
/// Uses the stable three-term recurrence relation:
/// ```text
/// (n+1) P_{n+1}(x) = (2n+1) x P_n(x) - n P_{n-1}(x)
/// ```
///
/// # Arguments
/// * `order` - Number of terms (must be >= 1)
/// * `x` - Argument (typically cos(θ), so |x| <= 1)
///
/// # Example
/// ```
/// use math_echo_special::legendre_polynomials;
/// let p = legendre_polynomials(5, 0.5);
/// assert!((p[0] - 1.0).abs() < 1e-10);
/// assert!((p[1] - 0.5).abs() < 1e-10);
/// ```
pub fn legendre_polynomials(order: usize, x: f64) -> Vec<f64> {
    assert!(order >= 1, "Order must be at least 1");

    let mut result = vec![0.0; order];

    result[0] = 1.0;

    if order == 1 {
        return result;
    }

    result[1] = x;

    // P_{n} = ((2n-1) x P_{n-1} - (n-1) P_{n-2}) / n
    for n in 2..order {
        let n_f64 = n as f64;
        result[n] =
            ((2.0 * n_f64 - 1.0) * x * result[n - 1] - (n_f64 - 1.0) * result[n - 2]) / n_f64;
    }

    result
}

/// Single Legendre polynomial Pₙ(x)
pub fn legendre_p(n: usize, x: f64) -> f64 {
    match n {
        0 => 1.0,
        1 => x,
        _ => legendre_polynomials(n + 1, x)[n],
    }
}

/// Compute associated Legendre functions P_n^m(x) for fixed m
///
/// Includes the Condon-Shortley phase:
/// ```text
/// P_n^m(x) = (-1)^m (1-x²)^{m/2} d^m/dx^m P_n(x)
/// ```
///
/// These overflow for large m; prefer [`normalized_associated_legendre`]
/// beyond m ≈ 100.
///
/// # Returns
/// Vector of P_m^m, P_{m+1}^m, ..., P_{n_max}^m
pub fn associated_legendre(n_max: usize, m: usize, x: f64) -> Vec<f64> {
    assert!(m <= n_max, "Order m must be <= degree n_max");

    let num_values = n_max - m + 1;
    let mut result = vec![0.0; num_values];

    let sqrt_1_minus_x2 = (1.0 - x * x).max(0.0).sqrt();
    let mut pmm = 1.0;

    // P_m^m = (-1)^m (2m-1)!! (1-x²)^{m/2}
    for i in 1..=m {
        pmm *= -((2 * i - 1) as f64) * sqrt_1_minus_x2;
    }

    result[0] = pmm;

    if num_values == 1 {
        return result;
    }

    let pm1m = x * (2 * m + 1) as f64 * pmm;
    result[1] = pm1m;

    let mut p_prev = pmm;
    let mut p_curr = pm1m;

    for n in (m + 2)..=n_max {
        let n_f64 = n as f64;
        let m_f64 = m as f64;
        let p_next =
            ((2.0 * n_f64 - 1.0) * x * p_curr - (n_f64 + m_f64 - 1.0) * p_prev) / (n_f64 - m_f64);
        result[n - m] = p_next;
        p_prev = p_curr;
        p_curr = p_next;
    }

    result
}

/// Unit-norm associated Legendre functions P̄_n^m(x) for n = m..=n_max
///
/// Normalised so that ∫₋₁¹ (P̄_n^m)² dx = 1:
/// ```text
/// P̄_n^m = √((2n+1)/2 · (n-m)!/(n+m)!) P_n^m
/// ```
///
/// Evaluated directly in normalised form so that no factorials appear and
/// high orders stay finite. The Condon-Shortley phase is kept.
pub fn normalized_associated_legendre(n_max: usize, m: usize, x: f64) -> Vec<f64> {
    assert!(m <= n_max, "Order m must be <= degree n_max");

    let mut result = vec![0.0; n_max - m + 1];
    let sqrt_1_minus_x2 = (1.0 - x * x).max(0.0).sqrt();

    let mut pmm = std::f64::consts::FRAC_1_SQRT_2;
    for i in 1..=m {
        let i = i as f64;
        pmm *= -((2.0 * i + 1.0) / (2.0 * i)).sqrt() * sqrt_1_minus_x2;
    }
    result[0] = pmm;

    if result.len() == 1 {
        return result;
    }

    let m_f64 = m as f64;
    result[1] = x * (2.0 * m_f64 + 3.0).sqrt() * pmm;

    for n in (m + 2)..=n_max {
        let k = n as f64;
        let a = ((4.0 * k * k - 1.0) / (k * k - m_f64 * m_f64)).sqrt();
        let b = (((k - 1.0) * (k - 1.0) - m_f64 * m_f64) / (4.0 * (k - 1.0) * (k - 1.0) - 1.0))
            .sqrt();
        result[n - m] = a * (x * result[n - m - 1] - b * result[n - m - 2]);
    }

    result
}

/// ln((n+m)!/(n-m)!) as a sum of logarithms
pub fn log_factorial_ratio(n: usize, m: usize) -> f64 {
    ((n - m + 1)..=(n + m)).map(|k| (k as f64).ln()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_legendre_p2() {
        // P_2(x) = (3x² - 1)/2
        let x = 0.5;
        let p = legendre_polynomials(3, x);
        let expected = (3.0 * x * x - 1.0) / 2.0;
        assert!((p[2] - expected).abs() < EPSILON);
    }

    #[test]
    fn test_legendre_p3() {
        // P_3(x) = (5x³ - 3x)/2
        let x = 0.6;
        let p = legendre_polynomials(4, x);
        let expected = (5.0 * x * x * x - 3.0 * x) / 2.0;
        assert!((p[3] - expected).abs() < EPSILON);
    }

    #[test]
    fn test_legendre_at_minus_one() {
        // P_n(-1) = (-1)^n, the backscatter phase factor
        let p = legendre_polynomials(40, -1.0);
        for (n, pn) in p.iter().enumerate() {
            let expected = if n % 2 == 0 { 1.0 } else { -1.0 };
            assert!((pn - expected).abs() < 1e-10, "P_{}(-1) = {}", n, pn);
        }
    }

    #[test]
    fn test_single_legendre() {
        let x = 0.7;
        for n in 0..5 {
            let p_arr = legendre_polynomials(n + 1, x);
            assert!((p_arr[n] - legendre_p(n, x)).abs() < EPSILON);
        }
    }

    #[test]
    fn test_associated_legendre_p11() {
        // P_1^1 = -(1-x²)^{1/2}
        let x = 0.5;
        let p = associated_legendre(1, 1, x);
        assert!((p[0] + (1.0 - x * x).sqrt()).abs() < EPSILON);
    }

    #[test]
    fn test_normalized_matches_scaled_associated() {
        let x = 0.37;
        for m in 0..5 {
            let raw = associated_legendre(12, m, x);
            let normed = normalized_associated_legendre(12, m, x);
            for (i, (&p, &pbar)) in raw.iter().zip(normed.iter()).enumerate() {
                let n = m + i;
                let scale = ((2 * n + 1) as f64 / 2.0 * (-log_factorial_ratio(n, m)).exp()).sqrt();
                assert_relative_eq!(pbar, scale * p, max_relative = 1e-10, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_normalized_unit_norm() {
        // Composite Simpson on [-1, 1]
        let m = 2;
        let steps = 4000;
        let h = 2.0 / steps as f64;
        let mut integrals = vec![0.0; 7];
        for s in 0..=steps {
            let x = -1.0 + s as f64 * h;
            let w = if s == 0 || s == steps {
                1.0
            } else if s % 2 == 1 {
                4.0
            } else {
                2.0
            };
            let p = normalized_associated_legendre(m + 6, m, x);
            for (acc, v) in integrals.iter_mut().zip(p.iter()) {
                *acc += w * v * v * h / 3.0;
            }
        }
        for value in integrals {
            assert_relative_eq!(value, 1.0, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_normalized_high_order_finite() {
        let p = normalized_associated_legendre(400, 300, 0.2);
        assert!(p.iter().all(|v| v.is_finite()));
    }
}
