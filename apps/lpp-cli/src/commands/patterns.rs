// patterns.rs: Print the effective pattern table.
//
// The output is a complete policy.toml with the built-in patterns
// inlined, ready to be copied into `.lpp/` and edited.

use lpp_policy::PolicyConfig;

use crate::config::LppConfig;

pub fn execute(config: &LppConfig) -> anyhow::Result<()> {
    print!("{}", render(&config.policy)?);
    Ok(())
}

fn render(policy: &PolicyConfig) -> anyhow::Result<String> {
    let expanded = PolicyConfig {
        include_defaults: false,
        pattern: policy.effective_patterns(),
        ..policy.clone()
    };
    Ok(toml::to_string(&expanded)?)
}
