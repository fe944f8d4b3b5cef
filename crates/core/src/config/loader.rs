use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// Overrides use `REELFLIX_<SECTION>__<FIELD>`, e.g.
/// `REELFLIX_SEARCH__MIN_INTERVAL_MS=250`; a double underscore separates
/// nesting levels so field names keep their single underscores.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("REELFLIX_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[[sources]]
name = "primary"
base_url = "https://catalog.example/api.php/provide/vod/"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].name, "primary");
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.search.min_interval_ms, 5000);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[server]
port = "not a port"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = load_config_from_str(include_str!("../../../../config.example.toml")).unwrap();
        crate::config::validate_config(&config).unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(
            config.sources[0].base_url,
            "https://jszyapi.com/api.php/provide/vod/"
        );
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_env_overrides_underscored_fields() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[server]
port = 3000

[search]
min_interval_ms = 1000
"#,
            )?;
            jail.set_env("REELFLIX_SERVER__PORT", "4000");
            jail.set_env("REELFLIX_SEARCH__MIN_INTERVAL_MS", "250");
            jail.set_env("REELFLIX_CATALOG__TIMEOUT_SECS", "3");
            jail.set_env("REELFLIX_CATALOG__USER_AGENT", "reelflix-test");

            let config = load_config(Path::new("config.toml")).unwrap();
            assert_eq!(config.server.port, 4000);
            assert_eq!(config.search.min_interval_ms, 250);
            assert_eq!(config.catalog.timeout_secs, 3);
            assert_eq!(config.catalog.user_agent.as_deref(), Some("reelflix-test"));
            Ok(())
        });
    }

    #[test]
    fn test_env_path_variable_is_not_a_field() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "")?;
            jail.set_env("REELFLIX_CONFIG", "config.toml");

            let config = load_config(Path::new("config.toml")).unwrap();
            assert_eq!(config.server.port, 8080);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3000

[search]
min_interval_ms = 250

[[sources]]
name = "a"
base_url = "https://a.example/vod/"

[[sources]]
name = "b"
base_url = "https://b.example/vod/"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.search.min_interval_ms, 250);
        let names: Vec<_> = config.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
