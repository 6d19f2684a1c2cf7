//! `bottler candidates`.

use anyhow::Result;
use bottler_core::ExeCandidate;

use crate::bootstrap::CliContext;

pub async fn execute(
    ctx: &CliContext,
    environment: &str,
    subpath: Option<String>,
    top: Option<usize>,
) -> Result<Vec<ExeCandidate>> {
    ctx.orchestrator
        .tracker()
        .set_subpath(environment, subpath);
    let candidates = ctx.orchestrator.candidates(environment, top).await?;
    println!("{}", serde_json::to_string_pretty(&candidates)?);
    Ok(candidates)
}
