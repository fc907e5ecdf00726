//! CPU-side mesh representation used by loaders.

/// Non-indexed triangle list, three parallel attribute streams in draw order.
///
/// Every logical vertex `i` is `(positions[i], uvs[i], normals[i])`; each run of
/// three consecutive vertices is one triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderObject {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
}

impl RenderObject {
    pub fn new(positions: Vec<[f32; 3]>, uvs: Vec<[f32; 2]>, normals: Vec<[f32; 3]>) -> Self {
        Self {
            positions,
            uvs,
            normals,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All streams have the same length and hold whole triangles.
    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len();
        self.uvs.len() == n && self.normals.len() == n && n % 3 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_consistent() {
        let obj = RenderObject::default();
        assert!(obj.is_empty());
        assert!(obj.is_consistent());
        assert_eq!(obj.triangle_count(), 0);
    }

    #[test]
    fn mismatched_streams_are_inconsistent() {
        let obj = RenderObject::new(vec![[0.0; 3]; 3], vec![[0.0; 2]; 2], vec![[0.0; 3]; 3]);
        assert!(!obj.is_consistent());
    }
}
