use serde::Serialize;

use super::{BBox, Point3};

/// Consistent copy of the accumulated tube buffers.
///
/// Produced after every edit and handed to the renderer; never mutated in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshSnapshot {
    pub vertices: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub uvs: Vec<[f64; 2]>,
    pub indices: Vec<u32>,
    /// Total arc length along the tube axis.
    pub arc_length: f64,
}

impl MeshSnapshot {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Index triples in buffer order.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.vertices
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.vertices.len() as u32;
        self.indices.iter().all(|&i| i < n)
    }

    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.vertices.len();
        self.normals.len() == n && self.uvs.len() == n
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("tube indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("tube has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("tube has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err(format!(
                "tube attribute buffers do not match vertex count (v:{} n:{} uv:{})",
                self.vertices.len(),
                self.normals.len(),
                self.uvs.len()
            ));
        }
        if !self.arc_length.is_finite() || self.arc_length < 0.0 {
            return Err(format!("tube arc length is invalid: {}", self.arc_length));
        }
        Ok(())
    }

    /// `[x0, y0, z0, x1, y1, z1, ...]` without copying.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        self.vertices.as_flattened()
    }

    #[must_use]
    pub fn normals_flat(&self) -> &[f64] {
        self.normals.as_flattened()
    }

    /// `[u0, v0, u1, v1, ...]` without copying.
    #[must_use]
    pub fn uvs_flat(&self) -> &[f64] {
        self.uvs.as_flattened()
    }

    /// Packed `f32` positions for GPU upload.
    #[must_use]
    pub fn positions_f32(&self) -> Vec<f32> {
        to_f32(self.positions_flat())
    }

    #[must_use]
    pub fn normals_f32(&self) -> Vec<f32> {
        to_f32(self.normals_flat())
    }

    #[must_use]
    pub fn uvs_f32(&self) -> Vec<f32> {
        to_f32(self.uvs_flat())
    }

    /// Axis-aligned bounds of all vertices, `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        BBox::from_points(self.vertices.iter().copied().map(Point3::from_array))
    }

    /// Compares every buffer element-wise within `tol`. Indices must match exactly.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.indices == other.indices
            && (self.arc_length - other.arc_length).abs() <= tol
            && slices_approx_eq(self.positions_flat(), other.positions_flat(), tol)
            && slices_approx_eq(self.normals_flat(), other.normals_flat(), tol)
            && slices_approx_eq(self.uvs_flat(), other.uvs_flat(), tol)
    }
}

fn to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|&v| v as f32).collect()
}

fn slices_approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol)
}
