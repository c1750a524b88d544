use sha2::{Digest, Sha256};

/// Compute the `uniq` dedup fingerprint: SHA-256 hex of the lowercased,
/// alphanumeric-only concatenation of the input terms.
pub fn uniq(parts: &[&str]) -> String {
  let normalized: String = parts
    .iter()
    .flat_map(|s| s.chars())
    .filter(|c| c.is_ascii_alphanumeric())
    .map(|c| c.to_ascii_lowercase())
    .collect();

  let mut hasher = Sha256::new();
  hasher.update(normalized.as_bytes());
  let digest = hasher.finalize();
  digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_non_alnum_and_lowercases() {
    let a = uniq(&["Favorite Color is Blue!"]);
    let b = uniq(&["favoritecoloris", "blue"]);
    assert_eq!(a, b);
  }

  #[test]
  fn is_64_lowercase_hex_chars() {
    let h = uniq(&["hello"]);
    assert_eq!(h.len(), 64);
    assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
  }

  #[test]
  fn distinct_inputs_differ() {
    assert_ne!(uniq(&["abc"]), uniq(&["abd"]));
  }
}
