use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection string, e.g. `sqlite:trivia.db`
    pub url: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
    pub run_migrations: bool,
}

/// Reads settings from defaults, an optional config file and `TRIVIA_*` variables, in that order.
///
/// Nested keys use a double underscore: `TRIVIA_DATABASE__URL=sqlite:/var/lib/trivia.db`.
pub fn get_configuration(file: &str) -> Result<Settings, ConfigError> {
    Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 5000)?
        .set_default("database.url", "sqlite:trivia.db")?
        .set_default("database.max_connections", 5)?
        .set_default("database.run_migrations", true)?
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix("TRIVIA")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let settings = get_configuration("does-not-exist").unwrap();
        assert_eq!(settings.database.max_connections, 5);
        assert!(settings.database.run_migrations);
        assert!(settings.database.url.expose_secret().starts_with("sqlite:"));
    }

    #[test]
    fn address_joins_host_and_port() {
        let app = ApplicationSettings {
            host: "0.0.0.0".to_owned(),
            port: 8080,
        };
        assert_eq!(app.address(), "0.0.0.0:8080");
    }
}
