use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::runtime::{Builder, Runtime};

/// How long [`GleanRuntime::run`] waits for leftover tasks at shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Current-thread Tokio runtime; one command runs per process.
pub struct GleanRuntime {
    runtime: Runtime,
}

impl GleanRuntime {
    /// ```
    /// use glean_runtime::GleanRuntime;
    ///
    /// let runtime = GleanRuntime::build("doctest-runtime").expect("runtime builds");
    /// assert_eq!(runtime.run(async { 2 + 2 }), 4);
    /// ```
    pub fn build(thread_name: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name(thread_name)
            .build()?;
        Ok(Self { runtime })
    }

    /// Drive `fut` to completion, then shut the runtime down.
    pub fn run<F: Future>(self, fut: F) -> F::Output {
        let out = self.runtime.block_on(fut);
        self.runtime.shutdown_timeout(SHUTDOWN_GRACE);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_spawned_work() {
        let runtime = GleanRuntime::build("glean-test").unwrap();
        let out = runtime.run(async { tokio::spawn(async { "done" }).await.unwrap() });
        assert_eq!(out, "done");
    }

    #[test]
    fn timers_are_enabled() {
        let runtime = GleanRuntime::build("glean-test").unwrap();
        runtime.run(tokio::time::sleep(Duration::from_millis(1)));
    }
}
