use gl_domain::config::{Config, ConfigSeverity};

/// Parse and validate the config, printing any issues.
///
/// Returns `false` when errors are found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!(
        "\n{} error(s), {} warning(s) in {config_path}",
        error_count, warning_count,
    );

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
/// Plaintext credentials are masked.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let output = toml::to_string_pretty(&masked(config))
        .map_err(|e| anyhow::anyhow!("serializing config: {e}"))?;
    print!("{output}");
    Ok(())
}

fn masked(config: &Config) -> Config {
    const MASK: &str = "********";
    let mut out = config.clone();
    if out.model.auth.key.is_some() {
        out.model.auth.key = Some(MASK.into());
    }
    if let Some(auth) = out.tools.auth.as_mut() {
        if auth.key.is_some() {
            auth.key = Some(MASK.into());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_domain::config::AuthConfig;

    #[test]
    fn show_masks_plaintext_keys() {
        let mut cfg = Config::default();
        cfg.model.auth.key = Some("sk-secret".into());
        cfg.tools.auth = Some(AuthConfig {
            env: None,
            key: Some("tool-secret".into()),
        });
        let rendered = toml::to_string_pretty(&masked(&cfg)).unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(!rendered.contains("tool-secret"));
        assert!(rendered.contains("********"));
    }

    #[test]
    fn defaults_validate_without_errors() {
        assert!(validate(&Config::default(), "config.toml"));
    }
}
