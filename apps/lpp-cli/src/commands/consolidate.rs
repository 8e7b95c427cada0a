// consolidate.rs: Write the consolidated policy file.

use std::path::Path;

use anyhow::Context;
use lpp_policy::{build_policy, read_rule_lines};

use crate::config::LppConfig;

pub fn execute(config: &LppConfig, rules: Option<&Path>, output: &Path) -> anyhow::Result<()> {
    let path = config.rules_path(rules);
    if !path.exists() {
        println!("No rule log found at {}", path.display());
        return Ok(());
    }

    let lines = read_rule_lines(&path)?;
    let generalizer = config
        .policy
        .generalizer()
        .with_context(|| format!("building patterns from {}", config.policy_path.display()))?;
    let document = build_policy(&lines, &generalizer, &config.policy.consolidator());

    if let Err(e) = document.write_to(output) {
        tracing::error!("{}", e);
        return Err(e.into());
    }

    println!(
        "Wrote {} codebase(s), {} permission(s) to {}",
        document.len(),
        document.clause_count(),
        output.display()
    );
    if document.skipped() > 0 {
        println!(
            "Skipped {} malformed line(s) in {}",
            document.skipped(),
            path.display()
        );
    }
    Ok(())
}
