use std::{backtrace, panic};

/// Routes panic reports, with a captured backtrace, through `tracing` so they
/// end up next to the rollout logs.
pub fn init() {
    panic::set_hook(Box::new(|info| {
        let backtrace = backtrace::Backtrace::force_capture();
        tracing::error!("{info}\n\n{backtrace}");
    }));
}
