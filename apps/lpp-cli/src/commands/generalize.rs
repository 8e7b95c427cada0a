// generalize.rs: Preview generalization of a rule log.
//
// Prints every line as it would enter consolidation. Lines rewritten by a
// pattern are marked with `*` and the pattern name.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use lpp_grant::GrantRule;
use lpp_policy::{read_rule_lines, Generalizer};

use crate::config::LppConfig;

pub fn execute(config: &LppConfig, rules: Option<&Path>) -> anyhow::Result<()> {
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

    let stdout = std::io::stdout();
    let changed = render(&generalizer, &lines, &mut stdout.lock())?;
    println!();
    println!(
        "{} of {} line(s) generalized ({})",
        changed,
        lines.len(),
        path.display()
    );
    Ok(())
}

/// Write the preview; returns how many lines changed.
fn render(generalizer: &Generalizer, lines: &[String], out: &mut impl Write) -> anyhow::Result<usize> {
    let mut changed = 0;
    for line in lines {
        let generalized = generalizer.generalize(line);
        if generalized == *line {
            writeln!(out, "  {}", line)?;
            continue;
        }
        changed += 1;
        let pattern = GrantRule::parse(line)
            .ok()
            .and_then(|rule| generalizer.matching_pattern(&rule).map(str::to_string))
            .unwrap_or_default();
        writeln!(out, "* {}    [{}]", generalized, pattern)?;
    }
    Ok(changed)
}
