//! Small utility helpers used across modules.

/// Join the configured base URL with an endpoint path without doubling
/// slashes. Endpoint paths in this crate always start with '/'.
pub fn join_url(base: &str, path: &str) -> String {
  format!("{}{}", base.trim_end_matches('/'), path)
}

/// Log-safe truncation for large or user-authored strings.
/// Avoids spamming logs with whole response bodies; counts characters, not
/// bytes, so multi-byte text never splits mid-character.
pub fn trunc_for_log(s: &str, max_chars: usize) -> String {
  if s.chars().count() <= max_chars {
    return s.to_string();
  }
  let head: String = s.chars().take(max_chars).collect();
  format!("{}… ({} bytes total)", head, s.len())
}
