//! `bottler tools`.

use anyhow::Result;
use serde_json::json;

use crate::bootstrap::CliContext;

pub fn execute(ctx: &CliContext) -> Result<()> {
    let report = json!({
        "toolchain": ctx.toolchain,
        "prefix_base": ctx.prefix_base,
        "prefix_source": format!("{:?}", ctx.prefix_source),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
