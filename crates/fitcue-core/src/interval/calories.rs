//! Calorie model.
//!
//! Standard MET formula, `MET * 3.5 * kg / 200` kcal per minute, applied
//! one second at a time so the running total always matches the phases
//! that were actually ticked through.

use super::config::IntervalConfig;
use super::phase::SessionPhase;

/// Oxygen uptake per MET, ml/kg/min.
const OXYGEN_PER_MET: f64 = 3.5;
const KCAL_DIVISOR: f64 = 200.0;

/// Kilocalories burned during one second spent in `phase`.
pub fn kcal_per_second(phase: SessionPhase, body_weight_kg: f64) -> f64 {
    phase.intensity_factor() * OXYGEN_PER_MET * body_weight_kg / KCAL_DIVISOR / 60.0
}

/// Estimate for a full, uninterrupted session.
pub fn estimate_session_kcal(config: &IntervalConfig, body_weight_kg: f64) -> f64 {
    config
        .timeline()
        .iter()
        .map(|seg| kcal_per_second(seg.phase, body_weight_kg) * f64::from(seg.duration_secs))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_second_at_default_weight() {
        let kcal = kcal_per_second(SessionPhase::Work, 75.0);
        // 8 * 3.5 * 75 / 200 / 60
        assert!((kcal - 0.175).abs() < 1e-12);
    }

    #[test]
    fn idle_burns_nothing() {
        assert_eq!(kcal_per_second(SessionPhase::Idle, 90.0), 0.0);
        assert_eq!(kcal_per_second(SessionPhase::Finished, 90.0), 0.0);
    }

    #[test]
    fn session_estimate_sums_segments() {
        let config = IntervalConfig::new(60, 60, 60, 60, 1).unwrap();
        let expected = 60.0 * kcal_per_second(SessionPhase::Warmup, 75.0)
            + 60.0 * kcal_per_second(SessionPhase::Work, 75.0)
            + 60.0 * kcal_per_second(SessionPhase::Cooldown, 75.0);
        assert!((estimate_session_kcal(&config, 75.0) - expected).abs() < 1e-9);
    }
}
