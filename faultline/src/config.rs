use std::collections::{HashMap, HashSet};
use std::env;

use tracing::error;

const ENV_ENABLED: &str = "FAULTLINE_ENABLED";
const ENV_WORKER_CRASH_RATE: &str = "FAULTLINE_WORKER_CRASH_RATE";
const ENV_NETWORK_ERROR_RATE: &str = "FAULTLINE_NETWORK_ERROR_RATE";
const ENV_CORRUPT_IMAGE_RATE: &str = "FAULTLINE_CORRUPT_IMAGE_RATE";
const ENV_IMAGE_404_RATE: &str = "FAULTLINE_IMAGE_404_RATE";
const ENV_TRANSIENT_ERROR_RATE: &str = "FAULTLINE_TRANSIENT_ERROR_RATE";
const ENV_PERMANENT_ERROR_IMAGES: &str = "FAULTLINE_PERMANENT_ERROR_IMAGES";

const DEFAULT_RATE: f64 = 0.0;

/// Configuration for the fault injector, read once from `FAULTLINE_*`
/// variables and immutable afterwards.
///
/// Every rate is guaranteed to be within `[0.0, 1.0]` after loading: a
/// malformed or out-of-range value substitutes the default `0.0` with a
/// diagnostic instead of failing construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultConfig {
    /// Master switch. When false every query reports "no fault" and the
    /// permanent-failure list is ignored entirely.
    pub enabled: bool,
    /// Probability of the worker crashing during job processing.
    pub worker_crash_rate: f64,
    /// Probability of network errors during API calls.
    pub network_error_rate: f64,
    /// Probability of an image arriving corrupted during download.
    pub corrupt_image_rate: f64,
    /// Probability of an image returning 404 Not Found.
    pub image_404_rate: f64,
    /// Probability of transient (retryable) failures.
    pub transient_error_rate: f64,
    /// Identifiers (full URL or bare filename) that fail every time,
    /// independent of the rates.
    pub permanent_error_images: HashSet<String>,
}

impl FaultConfig {
    /// Loads configuration from a snapshot of environment variables.
    ///
    /// Production callers pass `std::env::vars()` (or use
    /// [`FaultConfig::from_env`]); tests pass an explicit list so isolated
    /// configurations can run in parallel without touching the process
    /// environment. Loading never fails.
    pub fn load(
        env_vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let env_vars: HashMap<String, String> = env_vars
            .into_iter()
            .map(|(key, val)| (key.into(), val.into()))
            .filter(|(key, _val)| {
                [
                    ENV_ENABLED,
                    ENV_WORKER_CRASH_RATE,
                    ENV_NETWORK_ERROR_RATE,
                    ENV_CORRUPT_IMAGE_RATE,
                    ENV_IMAGE_404_RATE,
                    ENV_TRANSIENT_ERROR_RATE,
                    ENV_PERMANENT_ERROR_IMAGES,
                ]
                .contains(&key.as_str())
            })
            .collect();

        let enabled = env_vars
            .get(ENV_ENABLED)
            .is_some_and(|v| v.to_lowercase() == "true");

        let permanent_error_images: HashSet<String> = env_vars
            .get(ENV_PERMANENT_ERROR_IMAGES)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        FaultConfig {
            enabled,
            worker_crash_rate: parse_rate(&env_vars, ENV_WORKER_CRASH_RATE),
            network_error_rate: parse_rate(&env_vars, ENV_NETWORK_ERROR_RATE),
            corrupt_image_rate: parse_rate(&env_vars, ENV_CORRUPT_IMAGE_RATE),
            image_404_rate: parse_rate(&env_vars, ENV_IMAGE_404_RATE),
            transient_error_rate: parse_rate(&env_vars, ENV_TRANSIENT_ERROR_RATE),
            permanent_error_images,
        }
    }

    /// Loads configuration from the current process environment.
    pub fn from_env() -> Self {
        Self::load(env::vars())
    }
}

/// Parses one rate variable. Missing means the default; a value that does
/// not parse as `f64` or falls outside `[0.0, 1.0]` (NaN included) is
/// reported and substituted with the default.
fn parse_rate(env_vars: &HashMap<String, String>, var: &str) -> f64 {
    let Some(raw) = env_vars.get(var) else {
        return DEFAULT_RATE;
    };
    match raw.trim().parse::<f64>() {
        Ok(rate) if (0.0..=1.0).contains(&rate) => rate,
        Ok(rate) => {
            error!(
                env_var = var,
                value = rate,
                "Invalid rate, must be between 0.0 and 1.0. Using default: {DEFAULT_RATE}"
            );
            DEFAULT_RATE
        }
        Err(_) => {
            error!(
                env_var = var,
                value = %raw,
                "Invalid rate format. Using default: {DEFAULT_RATE}"
            );
            DEFAULT_RATE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_empty_snapshot_is_disabled_default() {
        let config = FaultConfig::load(Vec::<(String, String)>::new());
        assert_eq!(config, FaultConfig::default());
        assert!(!config.enabled);
        assert_eq!(config.worker_crash_rate, 0.0);
        assert!(config.permanent_error_images.is_empty());
    }

    #[test]
    fn test_load_full_snapshot() {
        let config = FaultConfig::load([
            (ENV_ENABLED, "true"),
            (ENV_WORKER_CRASH_RATE, "0.01"),
            (ENV_NETWORK_ERROR_RATE, "0.2"),
            (ENV_CORRUPT_IMAGE_RATE, "0.05"),
            (ENV_IMAGE_404_RATE, "0.1"),
            (ENV_TRANSIENT_ERROR_RATE, "0.3"),
            (ENV_PERMANENT_ERROR_IMAGES, "a.jpg,b.png"),
        ]);
        assert!(config.enabled);
        assert_eq!(config.worker_crash_rate, 0.01);
        assert_eq!(config.network_error_rate, 0.2);
        assert_eq!(config.corrupt_image_rate, 0.05);
        assert_eq!(config.image_404_rate, 0.1);
        assert_eq!(config.transient_error_rate, 0.3);
        assert_eq!(config.permanent_error_images.len(), 2);
        assert!(config.permanent_error_images.contains("a.jpg"));
        assert!(config.permanent_error_images.contains("b.png"));
    }

    #[test]
    fn test_enable_flag_is_case_insensitive_single_literal() {
        for truthy in ["true", "TRUE", "True"] {
            let config = FaultConfig::load([(ENV_ENABLED, truthy)]);
            assert!(config.enabled, "{truthy} should enable");
        }
        for falsy in ["false", "1", "yes", "on", ""] {
            let config = FaultConfig::load([(ENV_ENABLED, falsy)]);
            assert!(!config.enabled, "{falsy:?} should not enable");
        }
    }

    #[test]
    fn test_invalid_rate_falls_back_to_default() {
        for bad in ["abc", "1.5", "-0.2", "NaN", "inf", ""] {
            let config = FaultConfig::load([
                (ENV_ENABLED, "true"),
                (ENV_NETWORK_ERROR_RATE, bad),
            ]);
            assert_eq!(
                config.network_error_rate, 0.0,
                "{bad:?} should fall back to the default"
            );
        }
    }

    #[test]
    fn test_rate_bounds_are_inclusive() {
        let config = FaultConfig::load([
            (ENV_IMAGE_404_RATE, "0.0"),
            (ENV_CORRUPT_IMAGE_RATE, "1.0"),
        ]);
        assert_eq!(config.image_404_rate, 0.0);
        assert_eq!(config.corrupt_image_rate, 1.0);
    }

    #[test]
    fn test_rate_tolerates_surrounding_whitespace() {
        let config = FaultConfig::load([(ENV_TRANSIENT_ERROR_RATE, " 0.5 ")]);
        assert_eq!(config.transient_error_rate, 0.5);
    }

    #[test]
    fn test_one_bad_rate_does_not_affect_others() {
        let config = FaultConfig::load([
            (ENV_WORKER_CRASH_RATE, "oops"),
            (ENV_IMAGE_404_RATE, "0.25"),
        ]);
        assert_eq!(config.worker_crash_rate, 0.0);
        assert_eq!(config.image_404_rate, 0.25);
    }

    #[test]
    fn test_permanent_images_trimmed_and_empties_dropped() {
        let config = FaultConfig::load([(
            ENV_PERMANENT_ERROR_IMAGES,
            "a.jpg, b.png , ,c.gif,,",
        )]);
        assert_eq!(config.permanent_error_images.len(), 3);
        assert!(config.permanent_error_images.contains("a.jpg"));
        assert!(config.permanent_error_images.contains("b.png"));
        assert!(config.permanent_error_images.contains("c.gif"));
    }

    #[test]
    fn test_unrelated_variables_are_ignored() {
        let config = FaultConfig::load([
            ("PATH", "/usr/bin"),
            ("FAULTLINE_NO_SUCH_SETTING", "true"),
            (ENV_ENABLED, "true"),
        ]);
        assert!(config.enabled);
        assert_eq!(config, FaultConfig {
            enabled: true,
            ..FaultConfig::default()
        });
    }

    #[test]
    fn test_from_env_upholds_rate_invariant() {
        // Whatever the process environment holds, loaded rates stay in range.
        let config = FaultConfig::from_env();
        for rate in [
            config.worker_crash_rate,
            config.network_error_rate,
            config.corrupt_image_rate,
            config.image_404_rate,
            config.transient_error_rate,
        ] {
            assert!((0.0..=1.0).contains(&rate));
        }
    }
}
