//! Dependency preflight.
//!
//! Before any check runs, every tool the invoker may need is probed. The
//! verdict is cached for a fixed time-to-live in a [`DependencyCache`] that
//! the caller owns and passes in, together with the current instant.

use crate::checks::Requirement;
use crate::core::executor::CommandRunner;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Prefix of every missing-dependency message.
pub const MISSING_PREFIX: &str = "Missing required dependencies";

/// Whether the required tools are available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    /// All probes succeeded.
    pub ok: bool,
    /// Remediation message for the first missing dependency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DependencyStatus {
    /// Everything is present.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    /// `name` is missing; `remedy` says how to install it.
    #[must_use]
    pub fn missing(name: &str, remedy: &str) -> Self {
        Self {
            ok: false,
            message: Some(format!(
                "{MISSING_PREFIX}: {name} is not available. {remedy}"
            )),
        }
    }
}

/// A preflight verdict with the instant it was taken.
#[derive(Debug, Clone)]
struct CachedStatus {
    checked_at: Instant,
    status: DependencyStatus,
}

/// Time-boxed memo of the last preflight verdict.
///
/// Invalidated only by age; filesystem changes do not refresh it.
#[derive(Debug, Clone)]
pub struct DependencyCache {
    ttl: Duration,
    entry: Option<CachedStatus>,
}

impl DependencyCache {
    /// Creates an empty cache whose entries live for `ttl`.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Returns the cached verdict if it is younger than the TTL at `now`.
    #[must_use]
    pub fn get(&self, now: Instant) -> Option<&DependencyStatus> {
        self.entry
            .as_ref()
            .filter(|entry| now.saturating_duration_since(entry.checked_at) < self.ttl)
            .map(|entry| &entry.status)
    }

    /// Stores a fresh verdict taken at `now`.
    pub fn store(&mut self, now: Instant, status: DependencyStatus) {
        self.entry = Some(CachedStatus {
            checked_at: now,
            status,
        });
    }
}

/// Probes a fixed, ordered list of requirements.
#[derive(Debug, Clone)]
pub struct Preflight {
    requirements: Vec<Requirement>,
}

impl Preflight {
    /// Creates a preflight over `requirements`, probed in the given order.
    #[must_use]
    pub const fn new(requirements: Vec<Requirement>) -> Self {
        Self { requirements }
    }

    /// Returns the cached verdict when still valid at `now`, otherwise
    /// probes and caches a new one.
    pub async fn verify<R: CommandRunner>(
        &self,
        runner: &R,
        cache: &mut DependencyCache,
        now: Instant,
    ) -> DependencyStatus {
        if let Some(status) = cache.get(now) {
            tracing::debug!(ok = status.ok, "Using cached dependency status");
            return status.clone();
        }

        let status = self.probe(runner).await;
        cache.store(now, status.clone());
        status
    }

    /// Runs the probes, stopping at the first one that fails.
    async fn probe<R: CommandRunner>(&self, runner: &R) -> DependencyStatus {
        for requirement in &self.requirements {
            let present = match runner.run(&requirement.probe).await {
                Ok(output) => output.success(),
                Err(e) => {
                    tracing::debug!(probe = %requirement.probe, error = %e, "Probe failed to run");
                    false
                },
            };

            if !present {
                tracing::warn!(dependency = %requirement.name, "Missing dependency");
                return DependencyStatus::missing(&requirement.name, &requirement.remedy);
            }
        }

        tracing::debug!("All dependencies present");
        DependencyStatus::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{Error, Result};
    use crate::core::executor::{CommandOutput, Invocation};
    use std::cell::RefCell;

    /// Answers probes by program name; records what was asked.
    struct FakeProbes {
        missing: RefCell<Vec<&'static str>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeProbes {
        fn new(missing: &[&'static str]) -> Self {
            Self {
                missing: RefCell::new(missing.to_vec()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeProbes {
        async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
            let line = invocation.to_string();
            self.calls.borrow_mut().push(line.clone());
            if self.missing.borrow().iter().any(|m| line.contains(m)) {
                if invocation.program == "bun" && invocation.args == ["--version"] {
                    return Err(Error::CommandNotFound {
                        command: "bun".into(),
                    });
                }
                return Ok(CommandOutput {
                    exit_code: 1,
                    ..CommandOutput::default()
                });
            }
            Ok(CommandOutput::default())
        }
    }

    fn requirement(name: &str, program: &str, args: &[&str]) -> Requirement {
        Requirement {
            name: name.to_string(),
            probe: Invocation::new(program).args(args.iter().copied()),
            remedy: format!("Install {name}"),
        }
    }

    fn preflight() -> Preflight {
        Preflight::new(vec![
            requirement("bun", "bun", &["--version"]),
            requirement("typescript (tsc)", "bun", &["x", "tsc", "--version"]),
            requirement("eslint (eslint)", "bun", &["x", "eslint", "--version"]),
        ])
    }

    #[tokio::test]
    async fn test_all_present() {
        let probes = FakeProbes::new(&[]);
        let mut cache = DependencyCache::new(Duration::from_secs(300));

        let status = preflight()
            .verify(&probes, &mut cache, Instant::now())
            .await;

        assert_eq!(status, DependencyStatus::ok());
        assert_eq!(probes.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_short_circuits_on_first_missing() {
        let probes = FakeProbes::new(&["tsc"]);
        let mut cache = DependencyCache::new(Duration::from_secs(300));

        let status = preflight()
            .verify(&probes, &mut cache, Instant::now())
            .await;

        assert!(!status.ok);
        let message = status.message.expect("message");
        assert!(message.starts_with("Missing required dependencies: typescript (tsc)"));
        assert!(message.contains("Install typescript (tsc)"));
        assert_eq!(probes.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_package_manager_spawn_failure_is_missing() {
        let probes = FakeProbes::new(&["bun --version"]);
        let mut cache = DependencyCache::new(Duration::from_secs(300));

        let status = preflight()
            .verify(&probes, &mut cache, Instant::now())
            .await;

        assert!(!status.ok);
        assert!(status
            .message
            .as_deref()
            .is_some_and(|m| m.contains("bun is not available")));
        assert_eq!(probes.calls(), vec!["bun --version"]);
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let probes = FakeProbes::new(&[]);
        let mut cache = DependencyCache::new(Duration::from_secs(300));
        let start = Instant::now();

        let first = preflight().verify(&probes, &mut cache, start).await;
        probes.missing.borrow_mut().push("tsc");
        let second = preflight()
            .verify(&probes, &mut cache, start + Duration::from_secs(299))
            .await;

        assert_eq!(first, second);
        assert_eq!(probes.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_reprobes_after_ttl() {
        let probes = FakeProbes::new(&[]);
        let mut cache = DependencyCache::new(Duration::from_secs(300));
        let start = Instant::now();

        let first = preflight().verify(&probes, &mut cache, start).await;
        probes.missing.borrow_mut().push("tsc");
        let second = preflight()
            .verify(&probes, &mut cache, start + Duration::from_secs(300))
            .await;

        assert!(first.ok);
        assert!(!second.ok);
        assert_eq!(probes.calls().len(), 5);
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = DependencyCache::new(Duration::from_secs(1));
        assert!(cache.get(Instant::now()).is_none());
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let mut cache = DependencyCache::new(Duration::ZERO);
        let now = Instant::now();
        cache.store(now, DependencyStatus::ok());
        assert!(cache.get(now).is_none());
    }

    #[test]
    fn test_missing_status_serialization() {
        let status = DependencyStatus::missing("bun", "Install it from https://bun.sh");
        let json = serde_json::to_value(&status).expect("serialize");
        assert_eq!(json["ok"], false);
        assert_eq!(
            json["message"],
            "Missing required dependencies: bun is not available. Install it from https://bun.sh"
        );
    }
}
