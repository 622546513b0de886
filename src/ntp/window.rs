use super::timestamp::Span;
use super::WINDOW_SIZE;

/// Rolling window over the most recent round-trip delays of one server.
///
/// Slot `n % WINDOW_SIZE` holds the delay of poll `n`, so the oldest sample
/// is overwritten once the window is full. Jitter is the spread (max - min)
/// of the slots written so far. This is a simple stability proxy, not the
/// RFC 5905 peer dispersion.
#[derive(Debug)]
pub struct DispersionWindow {
  delays: [Span; WINDOW_SIZE],
  count: u64,
}

impl DispersionWindow {
  pub fn new() -> DispersionWindow {
    DispersionWindow {
      delays: [Span::ZERO; WINDOW_SIZE],
      count: 0,
    }
  }

  /// Number of samples seen this session, including evicted ones.
  pub fn count(&self) -> u64 {
    self.count
  }

  /// Stores a delay, evicting the oldest if full, and returns the new jitter.
  pub fn push(&mut self, delay: Span) -> Span {
    let slot = (self.count % WINDOW_SIZE as u64) as usize;
    self.delays[slot] = delay;
    self.count += 1;
    self.jitter()
  }

  /// The spread of the valid slots, zero while empty.
  pub fn jitter(&self) -> Span {
    let valid = &self.delays[..self.len()];
    match (valid.iter().max(), valid.iter().min()) {
      (Some(&max), Some(&min)) => max - min,
      _ => Span::ZERO,
    }
  }

  pub fn len(&self) -> usize {
    self.count.min(WINDOW_SIZE as u64) as usize
  }

  pub fn is_empty(&self) -> bool {
    self.count == 0
  }
}

impl Default for DispersionWindow {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn secs(values: &[i64]) -> Vec<Span> {
    values.iter().map(|&s| Span::from_secs(s)).collect()
  }

  #[test]
  fn empty_window() {
    let w = DispersionWindow::new();
    assert!(w.is_empty());
    assert_eq!(w.len(), 0);
    assert_eq!(w.jitter(), Span::ZERO);
  }

  #[test]
  fn single_sample_has_no_spread() {
    let mut w = DispersionWindow::new();
    assert_eq!(w.push(Span::from_millis(40)), Span::ZERO);
    assert_eq!(w.len(), 1);
  }

  #[test]
  fn grows_then_spans_all_slots() {
    let mut w = DispersionWindow::new();
    let jitters: Vec<Span> = secs(&[5, 1, 3, 2, 4, 8, 0, 6]).into_iter().map(|d| w.push(d)).collect();
    assert_eq!(jitters, secs(&[0, 4, 4, 4, 4, 7, 8, 8]));
    assert_eq!(w.len(), WINDOW_SIZE);
    assert_eq!(w.count(), 8);
  }

  #[test]
  fn unwritten_slots_are_ignored() {
    // zero-initialised slots must not count as a minimum
    let mut w = DispersionWindow::new();
    w.push(Span::from_secs(3));
    assert_eq!(w.push(Span::from_secs(5)), Span::from_secs(2));
  }

  #[test]
  fn ninth_sample_evicts_oldest() {
    let mut w = DispersionWindow::new();
    for d in secs(&[9, 1, 2, 3, 4, 5, 6, 7]) {
      w.push(d);
    }
    assert_eq!(w.jitter(), Span::from_secs(8));
    // slot 0 (the 9) is overwritten
    assert_eq!(w.push(Span::from_secs(4)), Span::from_secs(6));
    assert_eq!(w.len(), WINDOW_SIZE);
    assert_eq!(w.count(), 9);
  }

  #[test]
  fn keeps_sliding() {
    let mut w = DispersionWindow::new();
    for i in 0..20 {
      w.push(Span::from_secs(i));
    }
    // only 12..=19 remain
    assert_eq!(w.jitter(), Span::from_secs(7));
  }

  #[test]
  fn negative_delays() {
    let mut w = DispersionWindow::new();
    w.push(Span::from_millis(-5));
    assert_eq!(w.push(Span::from_millis(3)), Span::from_millis(8));
  }
}
