use crate::pack::unpack_embedding;

/// A stored embedding in one of the three shapes the driver layer may
/// hand back: packed little-endian bytes, a legacy JSON-encoded array, or
/// an already-decoded native vector.
#[derive(Debug, Clone)]
pub enum RawEmbedding {
  Bytes(Vec<u8>),
  Json(String),
  Native(Vec<f32>),
}

impl RawEmbedding {
  /// Parse into a float vector. Returns `None` on any malformed input —
  /// parsing failures are skipped by the caller, never fatal to the
  /// search.
  pub fn parse(&self) -> Option<Vec<f32>> {
    match self {
      Self::Bytes(bytes) => unpack_embedding(bytes),
      Self::Json(text) => serde_json::from_str(text).ok(),
      Self::Native(vec) => Some(vec.clone()),
    }
  }
}

/// Cosine similarity between two vectors, in `[-1.0, 1.0]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.is_empty() || b.is_empty() || a.len() != b.len() {
    return 0.0;
  }

  let mut dot = 0.0_f64;
  let mut norm_a = 0.0_f64;
  let mut norm_b = 0.0_f64;

  for (&x, &y) in a.iter().zip(b.iter()) {
    let x = x as f64;
    let y = y as f64;
    dot = x.mul_add(y, dot);
    norm_a = x.mul_add(x, norm_a);
    norm_b = y.mul_add(y, norm_b);
  }

  let denom = norm_a.sqrt() * norm_b.sqrt();
  if denom < 1e-12 {
    return 0.0;
  }

  (dot / denom) as f32
}

fn l2_normalize(v: &mut [f32]) {
  let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
  if norm > 1e-12 {
    for x in v.iter_mut() {
      *x /= norm;
    }
  }
}

/// Given candidate `(id, raw_embedding)` pairs and a query vector, return
/// the top-`limit` `(id, similarity)` pairs by cosine similarity,
/// descending, ties broken by input order.
///
/// Rows whose embedding fails to parse, or whose dimension doesn't match
/// the query, are dropped rather than failing the whole search.
pub fn find_similar<Id: Clone>(query: &[f32], candidates: &[(Id, RawEmbedding)], limit: usize) -> Vec<(Id, f32)> {
  let mut query = query.to_vec();
  l2_normalize(&mut query);

  let mut scored: Vec<(usize, Id, f32)> = Vec::with_capacity(candidates.len());

  for (idx, (id, raw)) in candidates.iter().enumerate() {
    let Some(mut vec) = raw.parse() else {
      continue;
    };
    if vec.len() != query.len() {
      continue;
    }
    l2_normalize(&mut vec);
    let score = cosine_similarity(&query, &vec);
    scored.push((idx, id.clone(), score));
  }

  scored.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

  let k = limit.min(scored.len());
  scored.into_iter().take(k).map(|(_, id, score)| (id, score)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identical_vectors_score_one() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
  }

  #[test]
  fn orthogonal_vectors_score_zero() {
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
  }

  #[test]
  fn find_similar_is_non_increasing_and_bounded_by_input() {
    let query = vec![1.0, 0.0];
    let candidates = vec![
      (1, RawEmbedding::Native(vec![1.0, 0.0])),
      (2, RawEmbedding::Native(vec![0.0, 1.0])),
      (3, RawEmbedding::Native(vec![0.7, 0.7])),
    ];

    let results = find_similar(&query, &candidates, 10);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, 1);
    for pair in results.windows(2) {
      assert!(pair[0].1 >= pair[1].1);
    }
  }

  #[test]
  fn limit_greater_than_n_yields_exactly_n() {
    let query = vec![1.0];
    let candidates = vec![(1, RawEmbedding::Native(vec![1.0]))];
    assert_eq!(find_similar(&query, &candidates, 50).len(), 1);
  }

  #[test]
  fn skips_unparseable_and_mismatched_dimension_rows() {
    let query = vec![1.0, 0.0];
    let candidates = vec![
      (1, RawEmbedding::Bytes(vec![0, 1, 2])), // truncated, unparseable
      (2, RawEmbedding::Native(vec![1.0, 0.0, 0.0])), // dimension mismatch
      (3, RawEmbedding::Native(vec![1.0, 0.0])),
    ];
    let results = find_similar(&query, &candidates, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, 3);
  }
}
