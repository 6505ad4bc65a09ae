//! Cosine-similarity ranking of catalog items against the user vector

use ndarray::ArrayView1;

use super::features::FeatureVector;

/// Catalog item with its similarity to the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<'a, T> {
    pub item: &'a T,
    pub score: f64,
}

/// Cosine similarity; a zero-norm vector on either side scores 0
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let a = ArrayView1::from(a.as_slice());
    let b = ArrayView1::from(b.as_slice());

    let norm = a.dot(&a).sqrt() * b.dot(&b).sqrt();
    if norm == 0.0 {
        return 0.0;
    }
    a.dot(&b) / norm
}

/// Top `k` items by similarity, highest first. Ties keep catalog order.
pub fn top_k<'a, T>(
    user: &FeatureVector,
    candidates: impl IntoIterator<Item = (&'a T, FeatureVector)>,
    k: usize,
) -> Vec<Ranked<'a, T>> {
    let mut ranked: Vec<Ranked<'a, T>> = candidates
        .into_iter()
        .map(|(item, vector)| Ranked {
            item,
            score: cosine_similarity(user, &vector),
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(k);
    ranked
}
