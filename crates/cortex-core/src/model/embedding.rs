/// A dense vector for a memory (§3).
///
/// At most one embedding exists per memory; dimension must match the
/// embedder's declared dimension for every row in a given store instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub memory_id: i64,
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(memory_id: i64, vector: Vec<f32>) -> Self {
        Self { memory_id, vector }
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    /// Pack to little-endian bytes for BLOB storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.vector.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Unpack from little-endian bytes; `None` if the byte length isn't a
    /// multiple of 4.
    pub fn vector_from_bytes(bytes: &[u8]) -> Option<Vec<f32>> {
        if bytes.len() % 4 != 0 {
            return None;
        }
        Some(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }
}

/// Cosine similarity between two equal-length vectors. Returns 0.0 for
/// mismatched lengths or zero-norm vectors rather than panicking or
/// producing NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
