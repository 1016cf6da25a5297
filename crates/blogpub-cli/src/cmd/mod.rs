pub mod config;
pub mod generate;
pub mod link;
pub mod publish;

use std::future::Future;

/// Run `fut` to completion on a fresh tokio runtime.
pub(crate) fn block_on<F: Future>(fut: F) -> anyhow::Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()?;
    Ok(rt.block_on(fut))
}
