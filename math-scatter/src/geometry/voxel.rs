//! Voxel grids of material categories

use ndarray::Array3;

/// Sphere of `radius` voxelised on a cubic grid of spacing `voxel_size`
///
/// Voxels whose centres lie inside the sphere get category 1, the rest 0.
/// The grid keeps one layer of medium around the body.
pub fn voxel_sphere(radius: f64, voxel_size: f64) -> Array3<u8> {
    let n = (2.0 * radius / voxel_size).round() as usize + 2;
    let offset = (n as f64 - 1.0) / 2.0;
    let r2 = (radius / voxel_size).powi(2);
    Array3::from_shape_fn((n, n, n), |(i, j, k)| {
        let d2 = (i as f64 - offset).powi(2)
            + (j as f64 - offset).powi(2)
            + (k as f64 - offset).powi(2);
        u8::from(d2 <= r2)
    })
}

/// Rotate a grid by `degrees` in the plane of `axes`, nearest neighbour
///
/// The output is enlarged to hold the rotated grid; voxels that map from
/// outside the input are category 0. A rotation by a multiple of 360°
/// returns the input unchanged.
pub fn rotate_nearest(grid: &Array3<u8>, degrees: f64, axes: (usize, usize)) -> Array3<u8> {
    if degrees.rem_euclid(360.0) == 0.0 {
        return grid.clone();
    }
    let (p, q) = axes;
    let (sin, cos) = degrees.to_radians().sin_cos();

    let in_shape = [grid.shape()[0], grid.shape()[1], grid.shape()[2]];
    let np = in_shape[p] as f64;
    let nq = in_shape[q] as f64;
    let out_p = ((np * cos.abs() + nq * sin.abs()).round() as usize).max(1);
    let out_q = ((np * sin.abs() + nq * cos.abs()).round() as usize).max(1);

    let mut out_shape = in_shape;
    out_shape[p] = out_p;
    out_shape[q] = out_q;

    let in_cp = (np - 1.0) / 2.0;
    let in_cq = (nq - 1.0) / 2.0;
    let out_cp = (out_p as f64 - 1.0) / 2.0;
    let out_cq = (out_q as f64 - 1.0) / 2.0;

    Array3::from_shape_fn((out_shape[0], out_shape[1], out_shape[2]), |(i, j, k)| {
        let mut idx = [i, j, k];
        let u = idx[p] as f64 - out_cp;
        let v = idx[q] as f64 - out_cq;
        let src_p = (cos * u + sin * v + in_cp).round();
        let src_q = (-sin * u + cos * v + in_cq).round();
        if src_p < 0.0 || src_q < 0.0 || src_p >= np || src_q >= nq {
            return 0;
        }
        idx[p] = src_p as usize;
        idx[q] = src_q as usize;
        grid[idx]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn count(grid: &Array3<u8>, category: u8) -> usize {
        grid.iter().filter(|&&c| c == category).count()
    }

    #[test]
    fn test_voxel_sphere_volume() {
        let (radius, size) = (0.01, 0.0004);
        let grid = voxel_sphere(radius, size);
        assert_eq!(grid.shape(), &[52, 52, 52]);
        let volume = count(&grid, 1) as f64 * size.powi(3);
        let exact = 4.0 / 3.0 * PI * radius.powi(3);
        assert!((volume / exact - 1.0).abs() < 0.02);
        assert_eq!(grid[[0, 0, 0]], 0);
    }

    #[test]
    fn test_rotation_identity_and_quarter_turn() {
        let mut grid = Array3::<u8>::zeros((4, 2, 6));
        grid[[0, 1, 5]] = 2;
        assert_eq!(rotate_nearest(&grid, 360.0, (0, 2)), grid);

        let turned = rotate_nearest(&grid, 90.0, (0, 2));
        assert_eq!(turned.shape(), &[6, 2, 4]);
        assert_eq!(count(&turned, 2), 1);
    }

    #[test]
    fn test_rotation_keeps_sphere_volume() {
        let grid = voxel_sphere(0.01, 0.0005);
        let rotated = rotate_nearest(&grid, 30.0, (0, 2));
        let before = count(&grid, 1) as f64;
        let after = count(&rotated, 1) as f64;
        assert!((after / before - 1.0).abs() < 0.05);
    }
}
