//! Configurable fault injection for exercising the failure paths of job
//! processing workers: simulated crashes, network errors, corrupt or missing
//! images, transient hiccups and a permanent-failure list for specific
//! identifiers.
//!
//! The injector makes probability decisions only. It performs no I/O and
//! never terminates the process; host code calls one query per decision
//! point and acts on the verdict (return the manufactured error, hand back
//! the corrupt payload, or exit the worker on a crash verdict). With the
//! master switch off every query is an inert `false`/`Continue`, so the
//! calls can stay in production code paths.
//!
//! Configuration comes from `FAULTLINE_*` environment variables (see
//! [`FaultConfig`]) or can be built directly:
//!
//! ```
//! use faultline::{FaultConfig, FaultInjector, ImageFaultKind};
//!
//! let injector = FaultInjector::new(FaultConfig {
//!     enabled: true,
//!     image_404_rate: 1.0,
//!     ..FaultConfig::default()
//! });
//!
//! let url = "https://example.com/images/0001.jpg";
//! if injector.maybe_image_404(url) {
//!     let err = injector.image_error(url, ImageFaultKind::NotFound);
//!     assert!(!err.is_retryable());
//! }
//! ```

/// Environment-driven configuration with rate validation.
mod config;

/// Simulated failure types and retryability classification.
mod error;

/// The decision-point queries and error factories.
mod injector;

pub use config::FaultConfig;
pub use error::{FaultError, ImageFaultKind, Result};
pub use injector::{CrashDecision, FaultInjector};
