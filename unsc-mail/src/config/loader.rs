//! Configuration loading from files and environment variables.

use config::{Config, Environment, File};

use crate::error::{ServiceError, ServiceResult};

use super::AppConfig;

/// Environment variable prefix, e.g. `UNSC_MAIL__TELEGRAM__BOT_TOKEN`
const ENV_PREFIX: &str = "UNSC_MAIL";

/// Load configuration from an optional `config.*` file and env vars
pub fn load_config() -> ServiceResult<AppConfig> {
    let builder = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

    deserialize(builder)
}

fn deserialize(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> ServiceResult<AppConfig> {
    builder
        .build()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize config: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DownloadMode;
    use crate::i18n::Locale;
    use config::FileFormat;

    #[test]
    fn test_defaults_without_sources() {
        let config = deserialize(Config::builder()).unwrap();

        assert!(!config.run.production);
        assert_eq!(config.feed.url, "https://undocs.org/rss/scdocs.xml");
        assert_eq!(config.feed.max_age_secs, 43_200);
        assert_eq!(config.download.mode, DownloadMode::Browser);
        assert_eq!(config.download.timeout_secs, 60);
        assert_eq!(config.download.document_language.as_deref(), Some("ru"));
        assert_eq!(config.formatting.locale, Locale::Ru);
        assert_eq!(config.formatting.max_description_chars, 750);
    }

    #[test]
    fn test_file_overrides() {
        let toml = r#"
[run]
production = true

[download]
mode = "http"
timeout_secs = 15

[telegram]
bot_token = "123:abc"
test_channel = "@dev_channel"

[formatting]
locale = "en"
max_description_chars = 300
"#;
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        let config = deserialize(builder).unwrap();

        assert!(config.run.production);
        assert_eq!(config.download.mode, DownloadMode::Http);
        assert_eq!(config.download.timeout_secs, 15);
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.telegram.test_channel.as_deref(), Some("@dev_channel"));
        assert_eq!(config.formatting.locale, Locale::En);
        assert_eq!(config.formatting.max_description_chars, 300);
        // Untouched sections keep their defaults
        assert_eq!(config.storage.pdf_dir, std::path::PathBuf::from("./pdf"));
    }

    #[test]
    fn test_unknown_download_mode_is_rejected() {
        let builder = Config::builder().add_source(File::from_str(
            "[download]\nmode = \"carrier-pigeon\"\n",
            FileFormat::Toml,
        ));

        assert!(matches!(
            deserialize(builder),
            Err(ServiceError::Config { .. })
        ));
    }
}
