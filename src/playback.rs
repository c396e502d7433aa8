//! Pacing helpers shared by interactive play and trace replay

use crate::game::RoundEvent;

pub const DEFAULT_PLAYBACK_DELAY_MS: u64 = 50;

/// Whether any event starts a war
pub fn has_war_event(events: &[RoundEvent]) -> bool {
    events.iter().any(RoundEvent::is_war)
}

/// Delay between rounds, scaled by a playback speed multiplier
///
/// A negative or non-finite delay disables waiting. A missing, non-positive
/// or non-finite speed leaves the delay unscaled.
pub fn compute_playback_delay_ms(speed: Option<f64>, delay_ms: Option<f64>, fallback: u64) -> u64 {
    let base = delay_ms.unwrap_or(fallback as f64);
    if !base.is_finite() || base < 0.0 {
        return 0;
    }
    let speed = speed.unwrap_or(1.0);
    if !speed.is_finite() || speed <= 0.0 {
        return base.round() as u64;
    }
    (base / speed).round().max(0.0) as u64
}
