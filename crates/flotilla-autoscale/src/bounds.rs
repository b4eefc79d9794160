//! Bound resolution: turns a scale request into a bounded target count.
//!
//! Pure and total: malformed labels fall back to defaults and the result
//! is clamped rather than rejected, so a bad label never fails a scale
//! operation.

use std::collections::HashMap;

use tracing::debug;

use flotilla_core::{BoundsConfig, ScaleDirection};

/// Effective bounds and the new count that lies within them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBounds {
    pub min: u64,
    pub max: u64,
    pub count: u64,
}

/// Resolve the new count for a target currently at `current`.
///
/// A non-zero `delta` is an explicit step and overrides labels and
/// defaults. A zero `delta` takes the step from the direction's label,
/// falling back to the configured default.
pub fn resolve(
    current: u64,
    delta: u64,
    direction: ScaleDirection,
    labels: &HashMap<String, String>,
    cfg: &BoundsConfig,
) -> ResolvedBounds {
    let step: i128 = if delta != 0 {
        delta as i128
    } else {
        match direction {
            ScaleDirection::Down => label_int(labels, &cfg.scale_down_label)
                .unwrap_or(cfg.default_scale_down_by as i128),
            ScaleDirection::Up => label_int(labels, &cfg.scale_up_label)
                .unwrap_or(cfg.default_scale_up_by as i128),
        }
    };
    let signed_step = match direction {
        ScaleDirection::Up => step,
        ScaleDirection::Down => -step,
    };

    let min = label_bound(labels, &cfg.min_label).unwrap_or(cfg.default_min);
    // Conflicting overrides: the minimum wins so the output stays ordered.
    let max = label_bound(labels, &cfg.max_label)
        .unwrap_or(cfg.default_max)
        .max(min);

    let tentative = (current as i128 + signed_step).max(0);
    let count = tentative.clamp(min as i128, max as i128) as u64;

    debug!(current, step = signed_step, min, max, count, "bounds resolved");
    ResolvedBounds { min, max, count }
}

/// Integer value of a label, if present and parseable.
fn label_int(labels: &HashMap<String, String>, key: &str) -> Option<i128> {
    labels.get(key)?.trim().parse::<i64>().ok().map(i128::from)
}

/// Non-negative integer value of a label.
fn label_bound(labels: &HashMap<String, String>, key: &str) -> Option<u64> {
    labels.get(key)?.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(min: u64, max: u64, down: u64, up: u64) -> BoundsConfig {
        BoundsConfig {
            min_label: "min".to_string(),
            max_label: "max".to_string(),
            scale_down_label: "down".to_string(),
            scale_up_label: "up".to_string(),
            default_min: min,
            default_max: max,
            default_scale_down_by: down,
            default_scale_up_by: up,
        }
    }

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_up_step_is_capped_at_max() {
        let cfg = cfg(1, 10, 1, 3);
        for current in 0..15u64 {
            let r = resolve(current, 0, ScaleDirection::Up, &HashMap::new(), &cfg);
            assert_eq!(r.count, (current + 3).min(10), "current={current}");
            assert!(r.count >= r.min);
        }
    }

    #[test]
    fn explicit_delta_overrides_labels_and_defaults() {
        let cfg = cfg(0, 100, 1, 1);
        let tags = labels(&[("up", "5"), ("down", "5")]);
        assert_eq!(resolve(10, 2, ScaleDirection::Up, &tags, &cfg).count, 12);
        assert_eq!(resolve(10, 2, ScaleDirection::Down, &tags, &cfg).count, 8);
    }

    #[test]
    fn step_labels_override_defaults() {
        let cfg = cfg(0, 100, 1, 1);
        let tags = labels(&[("up", "4"), ("down", "3")]);
        assert_eq!(resolve(10, 0, ScaleDirection::Up, &tags, &cfg).count, 14);
        assert_eq!(resolve(10, 0, ScaleDirection::Down, &tags, &cfg).count, 7);
    }

    #[test]
    fn unparseable_step_label_falls_back() {
        let cfg = cfg(0, 100, 2, 2);
        let tags = labels(&[("up", "lots"), ("down", "")]);
        assert_eq!(resolve(10, 0, ScaleDirection::Up, &tags, &cfg).count, 12);
        assert_eq!(resolve(10, 0, ScaleDirection::Down, &tags, &cfg).count, 8);
    }

    #[test]
    fn bound_labels_take_precedence() {
        let cfg = cfg(1, 5, 1, 1);
        let tags = labels(&[("min", "3"), ("max", "8")]);
        let r = resolve(7, 0, ScaleDirection::Up, &tags, &cfg);
        assert_eq!((r.min, r.max, r.count), (3, 8, 8));

        let r = resolve(4, 0, ScaleDirection::Down, &tags, &cfg);
        assert_eq!((r.min, r.max, r.count), (3, 8, 3));
    }

    #[test]
    fn invalid_bound_labels_are_ignored() {
        let cfg = cfg(2, 6, 1, 1);
        for bad in ["-1", "abc", "1.5", ""] {
            let tags = labels(&[("min", bad), ("max", bad)]);
            let r = resolve(4, 0, ScaleDirection::Up, &tags, &cfg);
            assert_eq!((r.min, r.max), (2, 6), "label value {bad:?}");
        }
    }

    #[test]
    fn negative_intermediate_is_clamped() {
        let cfg = cfg(0, 10, 1, 1);
        let r = resolve(2, 50, ScaleDirection::Down, &HashMap::new(), &cfg);
        assert_eq!(r.count, 0);

        let r = resolve(u64::MAX, u64::MAX, ScaleDirection::Down, &HashMap::new(), &cfg);
        assert_eq!(r.count, 0);
    }

    #[test]
    fn huge_values_do_not_overflow() {
        let cfg = cfg(0, u64::MAX, 1, 1);
        let r = resolve(u64::MAX, u64::MAX, ScaleDirection::Up, &HashMap::new(), &cfg);
        assert_eq!(r.count, u64::MAX);
    }

    #[test]
    fn negative_step_label_moves_the_other_way() {
        // A negative label step is a parseable integer; the result is still clamped.
        let cfg = cfg(0, 10, 1, 1);
        let tags = labels(&[("down", "-2")]);
        assert_eq!(resolve(5, 0, ScaleDirection::Down, &tags, &cfg).count, 7);
    }

    #[test]
    fn conflicting_bounds_keep_output_ordered() {
        let cfg = cfg(1, 5, 1, 1);
        let tags = labels(&[("min", "9"), ("max", "4")]);
        let r = resolve(2, 0, ScaleDirection::Up, &tags, &cfg);
        assert_eq!((r.min, r.max, r.count), (9, 9, 9));
    }

    #[test]
    fn output_is_always_within_bounds() {
        let label_values = ["", "0", "3", "7", "-4", "x", "100"];
        for min in 0..4u64 {
            for max in 0..8u64 {
                let cfg = cfg(min, max, 2, 3);
                for current in [0u64, 1, 5, 20] {
                    for delta in [0u64, 1, 9] {
                        for dir in [ScaleDirection::Up, ScaleDirection::Down] {
                            for lv in label_values {
                                let tags = labels(&[
                                    ("min", lv),
                                    ("max", lv),
                                    ("up", lv),
                                    ("down", lv),
                                ]);
                                let r = resolve(current, delta, dir, &tags, &cfg);
                                assert!(r.min <= r.count && r.count <= r.max, "{r:?}");
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn example_from_four_to_six() {
        let cfg = cfg(2, 6, 1, 2);
        let r = resolve(4, 0, ScaleDirection::Up, &HashMap::new(), &cfg);
        assert_eq!((r.min, r.max, r.count), (2, 6, 6));
        let r = resolve(6, 0, ScaleDirection::Up, &HashMap::new(), &cfg);
        assert_eq!(r.count, 6);
    }
}
