//! Process-wide logging start-up.
//!
//! [`init`] is safe to call from every node invocation: only the first call
//! installs the logger, later calls are no-ops.

use std::sync::atomic::{AtomicBool, Ordering};

static STARTED: AtomicBool = AtomicBool::new(false);

/// Starts logging once per process.
///
/// Returns `true` only for the call that performed the initialization. With
/// the `logging` feature disabled this just records that start-up happened and
/// leaves logger installation to the host application.
pub fn init() -> bool {
    if STARTED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return false;
    }
    install_logger();
    log::debug!("telemetry initialized");
    true
}

pub fn is_initialized() -> bool {
    STARTED.load(Ordering::Acquire)
}

#[cfg(feature = "logging")]
fn install_logger() {
    // Another logger may already be installed by the host.
    if let Err(err) = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    )
    .try_init()
    {
        log::debug!("logger already installed: {err}");
    }
}

#[cfg(not(feature = "logging"))]
fn install_logger() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_calls_are_noops() {
        init();
        assert!(is_initialized());
        assert!(!init());
    }

    #[test]
    fn concurrent_calls_initialize_exactly_once() {
        let winners = (0..8)
            .map(|_| std::thread::spawn(init))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|started| *started)
            .count();

        assert!(winners <= 1);
        assert!(is_initialized());
    }
}
