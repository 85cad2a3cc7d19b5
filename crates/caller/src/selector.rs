//! One-time strategy selection
//!
//! Candidates are probed in priority order. A probe constructs the strategy
//! (which enforces its runtime gate) and then resolves a known call site
//! through it; the first strategy that returns the expected frame wins and is
//! memoised for the lifetime of the selector.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};

use crate::error::{ProbeError, SelectionError, StackError};
use crate::frame::StackFrame;
use crate::getter::StackGetter;
use crate::marker::Marker;
use crate::runtime::Runtime;
use crate::strategy::{Strategy, StrategyKind};

static GLOBAL: LazyLock<Arc<StrategySelector>> = LazyLock::new(|| {
    Arc::new(StrategySelector::new(
        Runtime::current(),
        StrategyKind::PRIORITY,
    ))
});

/// Picks, once, the strategy a [`CallerFinder`](crate::CallerFinder) uses.
#[derive(Debug)]
pub struct StrategySelector {
    runtime: Runtime,
    candidates: Vec<StrategyKind>,
    selected: OnceLock<Result<Strategy, SelectionError>>,
    probe_attempts: AtomicUsize,
}

impl StrategySelector {
    /// Selector over `candidates`, probed in the given order.
    pub fn new(runtime: Runtime, candidates: impl IntoIterator<Item = StrategyKind>) -> Self {
        let mut unique = Vec::new();
        for kind in candidates {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        Self {
            runtime,
            candidates: unique,
            selected: OnceLock::new(),
            probe_attempts: AtomicUsize::new(0),
        }
    }

    /// The process-wide selector: current runtime, default priority.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Runtime the candidates are probed against.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Candidates in probing order.
    pub fn candidates(&self) -> &[StrategyKind] {
        &self.candidates
    }

    /// The selected strategy, probing on first call.
    ///
    /// Concurrent first callers block until the single probe run completes;
    /// every caller observes the same result afterwards.
    pub fn select(&self) -> Result<&Strategy, SelectionError> {
        self.selected
            .get_or_init(|| self.probe_all())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Kind of the selected strategy, if selection already ran and succeeded.
    pub fn selected_kind(&self) -> Option<StrategyKind> {
        match self.selected.get() {
            Some(Ok(strategy)) => Some(strategy.kind()),
            _ => None,
        }
    }

    /// Number of strategy probes performed so far.
    pub fn probe_attempts(&self) -> usize {
        self.probe_attempts.load(Ordering::Acquire)
    }

    fn probe_all(&self) -> Result<Strategy, SelectionError> {
        let mut failures = Vec::new();

        for &kind in &self.candidates {
            self.probe_attempts.fetch_add(1, Ordering::AcqRel);
            match probe(kind, &self.runtime) {
                Ok(strategy) => {
                    tracing::debug!(
                        strategy = %kind,
                        runtime = %self.runtime,
                        skipped = failures.len(),
                        "call-site strategy selected"
                    );
                    return Ok(strategy);
                }
                Err(err @ ProbeError::IncompatibleRuntime { .. }) => {
                    tracing::debug!(strategy = %kind, error = %err, "call-site strategy not applicable");
                    failures.push(err);
                }
                Err(err) => {
                    tracing::warn!(strategy = %kind, error = %err, "call-site strategy failed probing, falling back");
                    failures.push(err);
                }
            }
        }

        let err = SelectionError::NoStrategy(failures);
        tracing::error!(runtime = %self.runtime, error = %err, "no call-site strategy available; log sites cannot be resolved");
        Err(err)
    }
}

/// Construct `kind` for `runtime` and verify it resolves a known call site.
#[inline(never)]
pub fn probe(kind: StrategyKind, runtime: &Runtime) -> Result<Strategy, ProbeError> {
    let strategy = kind.construct(runtime)?;

    let frame = ProbeSite::resolve(&strategy).map_err(|source| ProbeError::SelfTest {
        strategy: kind,
        source,
    })?;

    if frame.declaring_type() != module_path!() || frame.method_name() != "probe" {
        return Err(ProbeError::WrongFrame {
            strategy: kind,
            expected: format!("{}::probe", module_path!()),
            found: frame.to_string(),
        });
    }
    Ok(strategy)
}

/// Marker type for the self test; its only caller is [`probe`].
struct ProbeSite;

impl ProbeSite {
    #[inline(never)]
    fn resolve(getter: &dyn StackGetter) -> Result<StackFrame, StackError> {
        getter.caller_of(&Marker::of::<Self>(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RustcVersion;

    fn future_runtime() -> Runtime {
        Runtime::new(Some(RustcVersion::new(2, 0, 0)), std::env::consts::OS, std::env::consts::ARCH)
    }

    #[test]
    fn every_strategy_passes_its_self_test_on_the_host() {
        let runtime = Runtime::current();
        for kind in StrategyKind::PRIORITY {
            let strategy = probe(kind, &runtime).unwrap();
            assert_eq!(strategy.kind(), kind);
        }
    }

    #[test]
    fn gated_strategy_falls_through_to_next_candidate() {
        let selector = StrategySelector::new(future_runtime(), StrategyKind::PRIORITY);
        let strategy = selector.select().unwrap();
        assert_eq!(strategy.kind(), StrategyKind::BacktraceCapture);
        assert_eq!(selector.probe_attempts(), 2);
    }

    #[test]
    fn total_failure_reports_every_candidate() {
        let selector = StrategySelector::new(future_runtime(), [StrategyKind::StackWalk]);
        let err = selector.select().unwrap_err();
        let SelectionError::NoStrategy(failures) = &err;
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], ProbeError::IncompatibleRuntime { .. }));

        // The failure is memoised, not retried.
        assert_eq!(selector.select().unwrap_err(), err);
        assert_eq!(selector.probe_attempts(), 1);
    }

    #[test]
    fn empty_candidate_list_is_a_selection_error() {
        let selector = StrategySelector::new(Runtime::current(), []);
        let err = selector.select().unwrap_err();
        assert!(err.to_string().contains("no candidates configured"));
    }

    #[test]
    fn duplicate_candidates_are_collapsed() {
        let selector = StrategySelector::new(
            Runtime::current(),
            [StrategyKind::StdTrace, StrategyKind::StdTrace, StrategyKind::StackWalk],
        );
        assert_eq!(selector.candidates(), &[StrategyKind::StdTrace, StrategyKind::StackWalk]);
    }

    #[test]
    fn selected_kind_is_none_before_selection() {
        let selector = StrategySelector::new(Runtime::current(), [StrategyKind::StdTrace]);
        assert_eq!(selector.selected_kind(), None);
        selector.select().unwrap();
        assert_eq!(selector.selected_kind(), Some(StrategyKind::StdTrace));
    }
}
