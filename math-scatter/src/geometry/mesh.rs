//! Closed triangle meshes

use crate::error::{Result, ScatterError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One triangular facet reduced to what a surface integral needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub centroid: [f64; 3],
    /// Unit normal from the counter-clockwise winding
    pub normal: [f64; 3],
    pub area: f64,
}

/// Triangulated closed surface
///
/// Faces are wound counter-clockwise seen from outside, so the winding
/// normal points out of the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex coordinates [m]
    pub vertices: Vec<[f64; 3]>,
    /// Vertex indices of each face
    pub faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[usize; 3]>) -> Result<Self> {
        let mesh = Self { vertices, faces };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Check that the mesh has faces, finite vertices and valid indices
    pub fn validate(&self) -> Result<()> {
        if self.faces.is_empty() {
            return Err(ScatterError::DegenerateGeometry {
                reason: "mesh has no faces".to_string(),
            });
        }
        if self.vertices.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ScatterError::DegenerateGeometry {
                reason: "mesh has non-finite vertex coordinates".to_string(),
            });
        }
        if let Some(face) = self
            .faces
            .iter()
            .find(|f| f.iter().any(|&i| i >= self.vertices.len()))
        {
            return Err(ScatterError::DegenerateGeometry {
                reason: format!(
                    "face {:?} refers past the {} vertices",
                    face,
                    self.vertices.len()
                ),
            });
        }
        Ok(())
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Facets with non-zero area
    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.faces.iter().filter_map(|face| {
            let [a, b, c] = face.map(|i| self.vertices[i]);
            let u = sub(b, a);
            let w = sub(c, a);
            let n = cross(u, w);
            let twice_area = norm(n);
            if twice_area <= 0.0 {
                return None;
            }
            Some(Facet {
                centroid: [
                    (a[0] + b[0] + c[0]) / 3.0,
                    (a[1] + b[1] + c[1]) / 3.0,
                    (a[2] + b[2] + c[2]) / 3.0,
                ],
                normal: [n[0] / twice_area, n[1] / twice_area, n[2] / twice_area],
                area: 0.5 * twice_area,
            })
        })
    }

    pub fn surface_area(&self) -> f64 {
        self.facets().map(|f| f.area).sum()
    }

    /// Largest distance from the vertex centroid to a vertex
    pub fn bounding_radius(&self) -> f64 {
        let count = self.vertices.len().max(1) as f64;
        let mut centre = [0.0; 3];
        for v in &self.vertices {
            for i in 0..3 {
                centre[i] += v[i] / count;
            }
        }
        self.vertices
            .iter()
            .map(|v| norm(sub(*v, centre)))
            .fold(0.0, f64::max)
    }

    /// Sphere of `radius` centred on the origin, by repeated subdivision of
    /// an icosahedron
    ///
    /// Level `subdivisions` has 20·4ⁿ faces.
    pub fn icosphere(radius: f64, subdivisions: usize) -> Self {
        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;

        let mut vertices: Vec<[f64; 3]> = vec![
            [-1.0, phi, 0.0],
            [1.0, phi, 0.0],
            [-1.0, -phi, 0.0],
            [1.0, -phi, 0.0],
            [0.0, -1.0, phi],
            [0.0, 1.0, phi],
            [0.0, -1.0, -phi],
            [0.0, 1.0, -phi],
            [phi, 0.0, -1.0],
            [phi, 0.0, 1.0],
            [-phi, 0.0, -1.0],
            [-phi, 0.0, 1.0],
        ];
        for v in &mut vertices {
            *v = unit(*v);
        }

        let mut faces: Vec<[usize; 3]> = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut next = Vec::with_capacity(faces.len() * 4);
            let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();

            for &[v0, v1, v2] in &faces {
                let m01 = midpoint(&mut vertices, &mut midpoints, v0, v1);
                let m12 = midpoint(&mut vertices, &mut midpoints, v1, v2);
                let m20 = midpoint(&mut vertices, &mut midpoints, v2, v0);

                next.push([v0, m01, m20]);
                next.push([v1, m12, m01]);
                next.push([v2, m20, m12]);
                next.push([m01, m12, m20]);
            }

            faces = next;
        }

        let vertices = vertices
            .into_iter()
            .map(|v| [v[0] * radius, v[1] * radius, v[2] * radius])
            .collect();

        Self { vertices, faces }
    }
}

/// Shared edge midpoint, projected back onto the unit sphere
fn midpoint(
    vertices: &mut Vec<[f64; 3]>,
    cache: &mut HashMap<(usize, usize), usize>,
    v0: usize,
    v1: usize,
) -> usize {
    let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let (a, b) = (vertices[v0], vertices[v1]);
    let mid = unit([
        (a[0] + b[0]) / 2.0,
        (a[1] + b[1]) / 2.0,
        (a[2] + b[2]) / 2.0,
    ]);

    let idx = vertices.len();
    vertices.push(mid);
    cache.insert(key, idx);
    idx
}

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn unit(v: [f64; 3]) -> [f64; 3] {
    let len = norm(v);
    [v[0] / len, v[1] / len, v[2] / len]
}
