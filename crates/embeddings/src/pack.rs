/// Pack a float32 vector as little-endian bytes: `pack('<f', v[0]) || ...`.
pub fn pack_embedding(v: &[f32]) -> Vec<u8> {
  v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Unpack little-endian packed float32 bytes back into a vector. Returns
/// `None` if the byte length is not a multiple of 4.
pub fn unpack_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_within_float32_precision() {
    let v = vec![0.1_f32, -2.5, 3.333_333, 0.0, 1e10];
    let packed = pack_embedding(&v);
    let unpacked = unpack_embedding(&packed).unwrap();
    assert_eq!(v, unpacked);
  }

  #[test]
  fn rejects_truncated_bytes() {
    assert_eq!(unpack_embedding(&[1, 2, 3]), None);
  }
}
