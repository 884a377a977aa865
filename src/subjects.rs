//! Built-in subject catalogue and round-length choices.
//!
//! Subject names are opaque identifiers to this client: they are shown to
//! the user and echoed back to the backend verbatim, never parsed. The
//! built-ins match what the arena backend serves today; deployments can
//! swap the whole catalogue via the TOML overlay (see config.rs).

/// Rounds per sitting the user may pick from.
pub const DEFAULT_ROUND_CHOICES: &[u32] = &[5, 10];

/// Subjects the arena backend currently has item pools for.
pub fn builtin_subjects() -> Vec<String> {
  [
    "객체지향프로그래밍",
    "디지털논리회로",
    "디지털시스템설계",
    "멀티미디어",
    "자료구조론",
    "컴퓨터네트워크",
    "회로이론1",
    "기계학습개론",
    "데이터베이스설계",
    "신호및시스템",
    "알고리즘설계",
    "전자기학1",
    "정보보호론",
    "확률변수",
  ]
  .into_iter()
  .map(str::to_string)
  .collect()
}
