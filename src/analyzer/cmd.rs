use std::process::Command;

use anyhow::{Context, Result, anyhow};

pub(super) fn run_analyzer(analyzer: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(analyzer)
        .args(args)
        .output()
        .with_context(|| format!("failed to spawn {analyzer} with args: {args:?}"))?;

    if output.status.success() {
        String::from_utf8(output.stdout).context("analyzer output was not valid UTF-8")
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(anyhow!(
            "{analyzer} command failed for args {args:?}: {stderr}"
        ))
    }
}
