use bytes::Bytes;
use rand::Rng;
use tracing::{error, info, warn};

use crate::config::FaultConfig;
use crate::error::{FaultError, ImageFaultKind};

/// Fixed payload returned by [`FaultInjector::corrupt_image_data`]. Plain
/// ASCII with no image magic bytes, so every standard decoder rejects it.
const CORRUPT_IMAGE_PAYLOAD: &[u8] = b"CORRUPT_IMAGE_DATA_NOT_VALID_JPEG_OR_PNG";

/// Verdict of [`FaultInjector::maybe_crash_worker`].
///
/// A `Crash` verdict simulates an abrupt worker death. The injector never
/// terminates the process itself; the host's top-level loop is expected to
/// translate `Crash` into its own exit path so the process-supervision
/// layer can observe the death and restart the worker.
#[must_use = "a Crash verdict must be translated into worker termination by the caller"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashDecision {
    /// Keep processing.
    Continue,
    /// Abandon the process now.
    Crash,
}

impl CrashDecision {
    /// True when the worker should terminate.
    pub fn is_crash(self) -> bool {
        matches!(self, CrashDecision::Crash)
    }
}

/// Configurable fault injection for exercising worker error handling.
///
/// Host code calls one query per decision point (before a download, before
/// an API call, when deciding crash-vs-continue) and acts on the verdict.
/// All queries are independent draws against the configured rates; the
/// injector performs no I/O, no retries, and keeps no state across calls.
///
/// # Example
///
/// ```
/// use faultline::{FaultConfig, FaultInjector};
///
/// let config = FaultConfig {
///     enabled: true,
///     image_404_rate: 1.0,
///     ..FaultConfig::default()
/// };
/// let injector = FaultInjector::new(config);
/// assert!(injector.maybe_image_404("https://example.com/a.jpg"));
/// ```
#[derive(Debug, Clone)]
pub struct FaultInjector {
    config: FaultConfig,
}

impl FaultInjector {
    /// Creates an injector from an explicit configuration.
    ///
    /// Emits a warning-level summary of the configured rates when fault
    /// injection is enabled, an informational notice otherwise.
    pub fn new(config: FaultConfig) -> Self {
        if config.enabled {
            warn!(
                worker_crash = %percent(config.worker_crash_rate),
                network_error = %percent(config.network_error_rate),
                corrupt_image = %percent(config.corrupt_image_rate),
                image_404 = %percent(config.image_404_rate),
                transient_error = %percent(config.transient_error_rate),
                permanent_error_images = config.permanent_error_images.len(),
                "FAULT INJECTION ENABLED - simulated faults will be injected"
            );
        } else {
            info!("Fault injection disabled");
        }
        FaultInjector { config }
    }

    /// Creates an injector from the current process environment.
    pub fn from_env() -> Self {
        Self::new(FaultConfig::from_env())
    }

    /// Whether the master switch is on. Lets hosts skip whole blocks of
    /// decision points cheaply.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// One probability draw: triggers iff the injector is enabled and a
    /// uniform draw in `[0, 1)` falls strictly below `rate`. A rate of 0.0
    /// never triggers; a rate of 1.0 always does.
    fn should_trigger(&self, rate: f64) -> bool {
        self.config.enabled && rand::rng().random::<f64>() < rate
    }

    /// Decides whether the worker should simulate an abrupt crash while
    /// doing `context`.
    pub fn maybe_crash_worker(&self, context: &str) -> CrashDecision {
        if self.should_trigger(self.config.worker_crash_rate) {
            error!(context, "SIMULATED WORKER CRASH - worker should terminate now");
            return CrashDecision::Crash;
        }
        CrashDecision::Continue
    }

    /// Decides whether `operation` should behave as a failed network call.
    pub fn maybe_network_error(&self, operation: &str) -> bool {
        if self.should_trigger(self.config.network_error_rate) {
            error!(operation, "SIMULATED NETWORK ERROR");
            return true;
        }
        false
    }

    /// Decides whether fetching `image_url` should behave as 404 Not Found.
    /// Identifiers on the permanent-failure list always report true.
    pub fn maybe_image_404(&self, image_url: &str) -> bool {
        if self.is_permanent_error_image(image_url) {
            error!(image_url, "PERMANENT IMAGE ERROR (404)");
            return true;
        }
        if self.should_trigger(self.config.image_404_rate) {
            error!(image_url, "SIMULATED IMAGE 404");
            return true;
        }
        false
    }

    /// Decides whether the bytes of `image_url` should arrive corrupted.
    /// Identifiers on the permanent-failure list always report true.
    pub fn maybe_corrupt_image(&self, image_url: &str) -> bool {
        if self.is_permanent_error_image(image_url) {
            error!(image_url, "PERMANENT IMAGE ERROR (corrupt)");
            return true;
        }
        if self.should_trigger(self.config.corrupt_image_rate) {
            error!(image_url, "SIMULATED CORRUPT IMAGE");
            return true;
        }
        false
    }

    /// Decides whether `operation` should fail transiently. Transient
    /// faults are temporary: the caller is expected to re-queue the work
    /// for retry, unlike permanent failures which are reported terminal.
    pub fn maybe_transient_error(&self, operation: &str) -> bool {
        if self.should_trigger(self.config.transient_error_rate) {
            error!(operation, "SIMULATED TRANSIENT ERROR");
            return true;
        }
        false
    }

    /// Manufactures the network failure a caller should surface after
    /// [`maybe_network_error`](Self::maybe_network_error) triggered, picking
    /// uniformly among connection-refused, timeout, and server-error kinds.
    /// All three are transient, so `is_retryable` holds for every value
    /// returned here.
    pub fn network_error(&self, operation: &str) -> FaultError {
        match rand::rng().random_range(0..3) {
            0 => FaultError::Connection(operation.to_string()),
            1 => FaultError::Timeout(operation.to_string()),
            _ => FaultError::ServerError(operation.to_string()),
        }
    }

    /// Manufactures the image failure of the requested kind for the caller
    /// to surface. Every kind maps to a failure; [`ImageFaultKind::Unknown`]
    /// yields a generic fault rather than silently succeeding.
    pub fn image_error(&self, image_url: &str, kind: ImageFaultKind) -> FaultError {
        match kind {
            ImageFaultKind::NotFound => FaultError::ImageNotFound(image_url.to_string()),
            ImageFaultKind::Corrupt => FaultError::CorruptImage(image_url.to_string()),
            ImageFaultKind::Timeout => FaultError::Timeout(format!("downloading {image_url}")),
            ImageFaultKind::Unknown => FaultError::Unknown(image_url.to_string()),
        }
    }

    /// Returns the fixed byte payload used to simulate a corrupted
    /// download. Guaranteed non-empty and undecodable as an image.
    pub fn corrupt_image_data(&self) -> Bytes {
        Bytes::from_static(CORRUPT_IMAGE_PAYLOAD)
    }

    /// Logs the enabled flag, all five rates and the permanent-failure set
    /// size for observability.
    pub fn log_statistics(&self) {
        if !self.config.enabled {
            info!("Fault injection is disabled");
            return;
        }
        info!(
            worker_crash = %percent(self.config.worker_crash_rate),
            network_error = %percent(self.config.network_error_rate),
            corrupt_image = %percent(self.config.corrupt_image_rate),
            image_404 = %percent(self.config.image_404_rate),
            transient_error = %percent(self.config.transient_error_rate),
            permanent_error_images = self.config.permanent_error_images.len(),
            "Fault injection rates"
        );
    }

    /// Permanent-failure membership: matches the full identifier or its
    /// filename (the part after the last `/`). Skipped entirely when the
    /// injector is disabled or the set is empty.
    fn is_permanent_error_image(&self, image_url: &str) -> bool {
        if !self.config.enabled || self.config.permanent_error_images.is_empty() {
            return false;
        }
        let filename = image_url.rsplit('/').next().unwrap_or(image_url);
        self.config.permanent_error_images.contains(image_url)
            || self.config.permanent_error_images.contains(filename)
    }
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}
