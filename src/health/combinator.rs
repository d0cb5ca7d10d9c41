//! Overall status policy: the most severe entry wins

use super::types::HealthStatus;

/// Reduce per-check statuses to one overall status
///
/// Any `Unhealthy` entry makes the result `Unhealthy`, otherwise any
/// `Degraded` entry makes it `Degraded`. No entries at all is `Healthy`.
pub fn combine<I>(statuses: I) -> HealthStatus
where
    I: IntoIterator<Item = HealthStatus>,
{
    statuses
        .into_iter()
        .min()
        .unwrap_or(HealthStatus::Healthy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::health::types::HealthStatus::*;

    #[test]
    fn test_empty_is_healthy() {
        assert_eq!(combine(Vec::<HealthStatus>::new()), Healthy);
    }

    #[test]
    fn test_single_unhealthy_wins() {
        assert_eq!(combine([Healthy, Healthy, Unhealthy, Healthy]), Unhealthy);
        assert_eq!(combine([Degraded, Unhealthy]), Unhealthy);
    }

    #[test]
    fn test_degraded_without_unhealthy() {
        assert_eq!(combine([Healthy, Degraded, Healthy]), Degraded);
    }

    #[test]
    fn test_all_healthy() {
        assert_eq!(combine([Healthy, Healthy]), Healthy);
    }

    fn status() -> impl Strategy<Value = HealthStatus> {
        prop_oneof![Just(Healthy), Just(Degraded), Just(Unhealthy)]
    }

    proptest! {
        #[test]
        fn prop_order_does_not_matter(mut statuses in prop::collection::vec(status(), 0..32)) {
            let forward = combine(statuses.clone());
            statuses.reverse();
            prop_assert_eq!(forward, combine(statuses.clone()));
            statuses.sort();
            prop_assert_eq!(forward, combine(statuses));
        }

        #[test]
        fn prop_matches_precedence_rule(statuses in prop::collection::vec(status(), 0..32)) {
            let expected = if statuses.contains(&Unhealthy) {
                Unhealthy
            } else if statuses.contains(&Degraded) {
                Degraded
            } else {
                Healthy
            };
            prop_assert_eq!(combine(statuses), expected);
        }
    }
}
