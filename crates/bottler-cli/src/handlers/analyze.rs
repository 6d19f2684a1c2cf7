//! `bottler analyze`.

use anyhow::Result;
use bottler_core::DependencyReport;

use crate::bootstrap::CliContext;

pub async fn execute(ctx: &CliContext, program: &str) -> Result<DependencyReport> {
    let report = ctx.orchestrator.analyze(program).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.success {
        anyhow::bail!(
            "dependency scan failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(report)
}
