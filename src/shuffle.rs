//! Slot randomization for the presentation layer.
//!
//! Each round flips a fair coin to decide which backend label lands in
//! slot A, so position preference cannot leak into the preference data.
//! The three functions are pure over their inputs; everything here is
//! testable without a UI or a network.

use rand::Rng;

use crate::domain::{ModelLabel, ModelPair, QuizItem, Slot, SlotMapping};

/// Draw a fresh mapping for a new round. Independent fair coin per call.
pub fn draw(rng: &mut impl Rng) -> SlotMapping {
  SlotMapping { swapped: rng.gen_bool(0.5) }
}

/// The items in display order (slot A, slot B) under `mapping`.
pub fn present(items: &ModelPair, mapping: SlotMapping) -> (&QuizItem, &QuizItem) {
  if mapping.swapped {
    (&items.model_b, &items.model_a)
  } else {
    (&items.model_a, &items.model_b)
  }
}

/// Backend label of the item that was shown in `slot` under `mapping`.
/// Exact inverse of [`present`]: the reported label always names the item
/// the user actually saw in that position.
pub fn resolve(slot: Slot, mapping: SlotMapping) -> ModelLabel {
  match (slot, mapping.swapped) {
    (Slot::A, false) | (Slot::B, true) => ModelLabel::ModelA,
    (Slot::A, true) | (Slot::B, false) => ModelLabel::ModelB,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pair() -> ModelPair {
    ModelPair {
      model_a: QuizItem {
        question: "What does a stack pop return?".to_string(),
        choices: vec!["top".to_string(), "bottom".to_string()],
        answer: "top".to_string(),
        explanation: "LIFO order.".to_string(),
      },
      model_b: QuizItem {
        question: "What does a queue dequeue return?".to_string(),
        choices: vec!["front".to_string(), "back".to_string()],
        answer: "front".to_string(),
        explanation: "FIFO order.".to_string(),
      },
    }
  }

  #[test]
  fn unswapped_mapping_is_identity() {
    let items = pair();
    let (a, b) = present(&items, SlotMapping { swapped: false });
    assert_eq!(a, &items.model_a);
    assert_eq!(b, &items.model_b);
  }

  #[test]
  fn swapped_mapping_inverts_both_slots() {
    let items = pair();
    let (a, b) = present(&items, SlotMapping { swapped: true });
    assert_eq!(a, &items.model_b);
    assert_eq!(b, &items.model_a);
  }

  #[test]
  fn resolve_is_the_exact_inverse_of_present() {
    let items = pair();
    for swapped in [false, true] {
      let mapping = SlotMapping { swapped };
      let (shown_a, shown_b) = present(&items, mapping);
      assert_eq!(items.by_label(resolve(Slot::A, mapping)), shown_a);
      assert_eq!(items.by_label(resolve(Slot::B, mapping)), shown_b);
    }
  }

  #[test]
  fn draw_is_roughly_fair() {
    let mut rng = rand::thread_rng();
    let n = 10_000;
    let swapped = (0..n).filter(|_| draw(&mut rng).swapped).count();
    // 10k fair flips stay within ±5% of half except with vanishing odds.
    let lo = (n as f64 * 0.45) as usize;
    let hi = (n as f64 * 0.55) as usize;
    assert!(
      (lo..=hi).contains(&swapped),
      "swap frequency out of range: {swapped}/{n}"
    );
  }
}
