//! Allocation of amounts over recipients and over time
//!
//! [`pro_rata`] is used whenever an economy-level amount (QE remainder,
//! helicopter money, new lending, bank spending) is spread over banks or
//! clients. Weights are usually each recipient's deposits plus savings.
//! [`schedule_tranches`] spreads a loan's principal over its repayment
//! cycles.

use std::collections::VecDeque;

/// Split `total` proportionally to `weights`
///
/// Negative weights count as zero. When every weight is zero the amount is
/// split equally. An empty weight list yields an empty allocation.
///
/// # Example
/// ```
/// use euro_economy_core::core::allocation::pro_rata;
///
/// assert_eq!(pro_rata(90.0, &[1.0, 2.0]), vec![30.0, 60.0]);
/// assert_eq!(pro_rata(10.0, &[0.0, 0.0]), vec![5.0, 5.0]);
/// ```
pub fn pro_rata(total: f64, weights: &[f64]) -> Vec<f64> {
    if weights.is_empty() {
        return Vec::new();
    }

    let clamped: Vec<f64> = weights.iter().map(|w| w.max(0.0)).collect();
    let sum: f64 = clamped.iter().sum();

    if sum > 0.0 {
        clamped.iter().map(|w| total * w / sum).collect()
    } else {
        let share = total / weights.len() as f64;
        vec![share; weights.len()]
    }
}

/// Fraction of `part` in `whole`, zero when `whole` is not positive
pub fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

/// Add equal tranches of `amount` to the next `duration` slots of `schedule`
///
/// Slot 0 falls due next cycle. Tranches stack onto slots already holding
/// earlier loans; a zero duration is treated as one cycle.
pub fn schedule_tranches(schedule: &mut VecDeque<f64>, amount: f64, duration: usize) {
    let duration = duration.max(1);
    let tranche = amount / duration as f64;
    for i in 0..duration {
        match schedule.get_mut(i) {
            Some(existing) => *existing += tranche,
            None => schedule.push_back(tranche),
        }
    }
}
