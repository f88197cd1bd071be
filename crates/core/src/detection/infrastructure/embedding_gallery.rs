//! Matching of face embeddings against a labelled gallery.

use crate::shared::frame::Frame;

/// Minimum cosine similarity for a face to take a gallery label.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.4;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

/// Resize a face crop to 112x112, normalize to [-1, 1], NCHW layout.
pub fn preprocess(face: &Frame) -> ndarray::Array4<f32> {
    let src_w = face.width() as usize;
    let src_h = face.height() as usize;
    let src = face.as_ndarray();

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));
    for y in 0..INPUT_SIZE {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / INPUT_SIZE as f64) as usize).min(src_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x =
                (((x as f64 + 0.5) * src_w as f64 / INPUT_SIZE as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }
    tensor
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product; equals cosine similarity for L2-normalized inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}

/// Labelled reference embeddings, one per enrolled face.
#[derive(Debug, Default)]
pub struct EmbeddingGallery {
    entries: Vec<(String, Vec<f32>)>,
    threshold: f64,
}

impl EmbeddingGallery {
    pub fn new(threshold: f64) -> Self {
        Self {
            entries: Vec::new(),
            threshold,
        }
    }

    /// Adds a reference embedding. The vector is normalized on insert.
    pub fn enroll(&mut self, label: &str, mut embedding: Vec<f32>) {
        l2_normalize(&mut embedding);
        self.entries.push((label.to_string(), embedding));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct labels, sorted.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.iter().map(|(l, _)| l.clone()).collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Best-scoring label at or above the threshold.
    pub fn best_match(&self, embedding: &[f32]) -> Option<(&str, f64)> {
        self.entries
            .iter()
            .map(|(label, reference)| (label.as_str(), cosine_similarity(reference, embedding)))
            .filter(|(_, sim)| *sim >= self.threshold)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Matches every face of one frame, giving each label to at most one
    /// face: the one with the highest similarity. Losers come back `None`.
    pub fn assign(&self, embeddings: &[Vec<f32>]) -> Vec<Option<String>> {
        let matches: Vec<Option<(&str, f64)>> =
            embeddings.iter().map(|e| self.best_match(e)).collect();

        matches
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let (label, sim) = (*m)?;
                let beaten = matches.iter().enumerate().any(|(j, other)| match other {
                    Some((other_label, other_sim)) if *other_label == label && j != i => {
                        *other_sim > sim || (*other_sim == sim && j < i)
                    }
                    _ => false,
                });
                (!beaten).then(|| label.to_string())
            })
            .collect()
    }
}
