//! Pure indicator math: percentage change, rounding, clamping, RSI
//! (spec.md §4.3, §4.4). Kept dependency-free and side-effect-free so the
//! scenario tests of spec.md §8 can assert on it directly.

/// Rounds half-away-from-zero to `decimals` places (spec.md §8 S1: "decimals
/// 2 dp, rounding half-away-from-zero"). `f64::round` already rounds halves
/// away from zero, so this just scales/unscales.
pub fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `pct(curr, prev, d) = round(((curr-prev)/prev * 100), d)`, with
/// divide-by-zero yielding 0 (spec.md §4.3). `decimals = None` returns the
/// unrounded value (used by C4's accumulators, spec.md §4.4).
pub fn pct(curr: f64, prev: f64, decimals: Option<i32>) -> f64 {
    if prev == 0.0 {
        return 0.0;
    }
    let raw = (curr - prev) / prev * 100.0;
    match decimals {
        Some(d) => round(raw, d),
        None => raw,
    }
}

/// Symmetric clamp used by C4's per-symbol diffs (spec.md §4.4, §8
/// invariant 6).
pub fn clamp(value: f64, bound: f64) -> f64 {
    value.clamp(-bound, bound)
}

/// Relative Strength Index over a window, per spec.md §4.3/GLOSSARY.
/// `window` is a slice of consecutive values (e.g. bids); RSI accumulates
/// gains/losses across adjacent pairs, so a window of `p+1` values yields
/// `RSI(p)`.
pub fn rsi(window: &[f64]) -> f64 {
    let mut up = 0.0;
    let mut down = 0.0;
    for pair in window.windows(2) {
        let diff = pair[1] - pair[0];
        if diff > 0.0 {
            up += diff;
        } else {
            down += -diff;
        }
    }
    if up == 0.0 && down == 0.0 {
        return 50.0;
    }
    if up == 0.0 {
        return 0.0;
    }
    if down == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + up / down)
}
