//! Strategy selection: version gating, fallback and one-time initialisation

use std::sync::{Arc, Barrier};
use std::thread;

use pretty_assertions::assert_eq;
use rstest::rstest;
use sitelog_caller::{
    CallerFinder, ProbeError, Runtime, RustcVersion, SelectionError, StackWalk, Strategy, StrategyKind,
    StrategySelector,
};

fn runtime(major: u32, os: &str) -> Runtime {
    Runtime::new(Some(RustcVersion::new(major, 88, 0)), os, std::env::consts::ARCH)
}

#[rstest]
#[case::current_major(runtime(1, "linux"), true)]
#[case::future_major(runtime(2, "linux"), false)]
#[case::unsupported_os(runtime(1, "uefi"), false)]
#[case::unknown_version(Runtime::new(None, "linux", "x86_64"), false)]
fn stack_walk_is_gated_on_runtime(#[case] runtime: Runtime, #[case] supported: bool) {
    assert_eq!(StackWalk::supports(&runtime), supported);
    assert_eq!(StackWalk::new(&runtime).is_ok(), supported);
}

#[test]
fn host_runtime_reports_compiler_version() {
    let runtime = Runtime::current();
    assert_eq!(runtime.major_version(), Some(1));
    assert_eq!(runtime.os, std::env::consts::OS);
}

#[test]
fn preferred_strategy_wins_on_the_host() {
    let selector = StrategySelector::new(Runtime::current(), StrategyKind::PRIORITY);

    assert_eq!(selector.select().unwrap().kind(), StrategyKind::StackWalk);
    assert_eq!(selector.probe_attempts(), 1);
}

#[test]
fn incompatible_runtime_falls_back_without_error() {
    let selector = StrategySelector::new(runtime(2, std::env::consts::OS), StrategyKind::PRIORITY);

    let strategy = selector.select().unwrap();

    assert_eq!(strategy.kind(), StrategyKind::BacktraceCapture);
    assert_eq!(selector.selected_kind(), Some(StrategyKind::BacktraceCapture));
}

#[test]
fn configured_order_is_respected() {
    let selector = StrategySelector::new(
        Runtime::current(),
        [StrategyKind::StdTrace, StrategyKind::StackWalk],
    );

    assert_eq!(selector.select().unwrap().kind(), StrategyKind::StdTrace);
}

#[test]
fn total_failure_surfaces_as_error_not_panic() {
    let selector = StrategySelector::new(runtime(2, "uefi"), [StrategyKind::StackWalk]);

    let err = selector.select().unwrap_err();

    let SelectionError::NoStrategy(failures) = &err;
    assert!(matches!(
        failures.as_slice(),
        [ProbeError::IncompatibleRuntime { strategy: StrategyKind::StackWalk, .. }]
    ));
    assert!(err.to_string().contains("stack-walk"), "{err}");

    let finder = CallerFinder::new(Arc::new(selector));
    assert!(finder.find_caller_of(&sitelog_caller::Marker::module("selection"), 0).is_err());
}

#[test]
fn concurrent_first_use_initialises_once() {
    const THREADS: usize = 8;
    let selector = Arc::new(StrategySelector::new(Runtime::current(), StrategyKind::PRIORITY));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let selector = Arc::clone(&selector);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let strategy = selector.select().unwrap();
                strategy as *const Strategy as usize
            })
        })
        .collect();

    let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(selector.probe_attempts(), 1);
}

#[test]
fn global_selector_is_shared() {
    let first = StrategySelector::global();
    let second = StrategySelector::global();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(std::ptr::eq(first.select().unwrap(), second.select().unwrap()));
}
