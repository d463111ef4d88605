//! Configuration loading for the powgen CLI.
//!
//! Reads a YAML run configuration, expands `${VAR}` and `${VAR:-default}`
//! references from the environment, then parses and validates it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use powgen::PowGenConfig;

// ============================================================================
// Loading
// ============================================================================

/// Load and validate a run configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PowGenConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;

    let expanded = expand_env_vars(&content)?;

    let config = PowGenConfig::from_yaml_str(&expanded)
        .with_context(|| format!("Invalid config in {:?}", path.as_ref()))?;

    Ok(config)
}

// ============================================================================
// Environment substitution
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut depth = 1;

            while depth > 0 {
                match chars.next() {
                    Some('{') => {
                        depth += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        depth -= 1;
                        if depth > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve `VAR` or `VAR:-default`. An empty variable takes the default.
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_expand_env_vars_simple() {
        std::env::set_var("POWGEN_TEST_SIMPLE", "/srv/data");
        let result = expand_env_vars("dataset: ${POWGEN_TEST_SIMPLE}/merra_{year}.nc").unwrap();
        assert_eq!(result, "dataset: /srv/data/merra_{year}.nc");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        std::env::remove_var("POWGEN_TEST_UNSET");
        let result = expand_env_vars("value_${POWGEN_TEST_UNSET:-fallback}_end").unwrap();
        assert_eq!(result, "value_fallback_end");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        std::env::remove_var("POWGEN_TEST_REQUIRED");
        assert!(expand_env_vars("${POWGEN_TEST_REQUIRED}").is_err());
    }

    #[test]
    fn test_expand_env_vars_unclosed() {
        assert!(expand_env_vars("path: ${POWGEN_TEST_OPEN").is_err());
    }

    #[test]
    fn test_year_placeholder_is_untouched() {
        let result = expand_env_vars("/data/merra_{year}.nc and $HOME").unwrap();
        assert_eq!(result, "/data/merra_{year}.nc and $HOME");
    }

    #[test]
    fn test_resolve_var_expr_override_default() {
        std::env::set_var("POWGEN_TEST_SET", "custom");
        assert_eq!(resolve_var_expr("POWGEN_TEST_SET:-default").unwrap(), "custom");
    }

    #[test]
    fn test_resolve_var_expr_empty_takes_default() {
        std::env::set_var("POWGEN_TEST_EMPTY", "");
        assert_eq!(resolve_var_expr("POWGEN_TEST_EMPTY:-42").unwrap(), "42");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("powgen.yaml");
        std::env::set_var("POWGEN_TEST_DEST", "/out");
        fs::write(
            &path,
            r#"
grid:
  num_lats: 4
  num_lons: 5
paths:
  dataset: /in/merra_{year}.nc
  destination: ${POWGEN_TEST_DEST}
  resume_log: ${POWGEN_TEST_DEST}/resume.log
simulators:
  solar:
    program: ${POWGEN_TEST_SOLAR_SIM:-pvwatts-sim}
  wind:
    program: windpower-sim
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.grid.num_lats, 4);
        assert_eq!(config.paths.destination, PathBuf::from("/out"));
        assert_eq!(config.paths.resume_log, PathBuf::from("/out/resume.log"));
        assert_eq!(config.simulators.solar.program, "pvwatts-sim");
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/powgen.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../config/powgen.yaml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.grid.num_lats, 37);
        assert_eq!(config.grid.num_lons, 31);
        assert_eq!(config.wind_class.file_prefix, "merra_wecc_");
    }
}
