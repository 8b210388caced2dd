use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ICONS_URL: &str =
    "https://api.github.com/repos/Switcheo/token-icons/contents/tokens";
pub const DEFAULT_PRICES_URL: &str = "https://interview.switcheo.com/prices.json";
pub const DEFAULT_ICON_SUFFIX: &str = ".svg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory listing of token icon files
    pub icons_url: String,

    /// Price feed returning `{currency, date, price}` entries
    pub prices_url: String,

    /// File suffix marking an icon entry; stripped to get the token name
    pub icon_suffix: String,

    /// Sent with every request, the icon listing rejects anonymous clients
    pub user_agent: String,

    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            icons_url: DEFAULT_ICONS_URL.to_string(),
            prices_url: DEFAULT_PRICES_URL.to_string(),
            icon_suffix: DEFAULT_ICON_SUFFIX.to_string(),
            user_agent: concat!("kata/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional `kata.yaml` and the environment
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("kata.yaml"))
            .merge(Env::prefixed("KATA_"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_point_at_public_sources() {
        Jail::expect_with(|_jail| {
            let config = Config::load()?;
            assert_eq!(config.icons_url, DEFAULT_ICONS_URL);
            assert_eq!(config.prices_url, DEFAULT_PRICES_URL);
            assert_eq!(config.icon_suffix, ".svg");
            assert_eq!(config.request_timeout(), Duration::from_secs(30));
            Ok(())
        });
    }

    #[test]
    fn yaml_overrides_defaults_and_env_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "kata.yaml",
                "prices_url: \"http://localhost:8080/prices.json\"\nrequest_timeout_secs: 5\n",
            )?;

            let config = Config::load()?;
            assert_eq!(config.prices_url, "http://localhost:8080/prices.json");
            assert_eq!(config.request_timeout(), Duration::from_secs(5));
            assert_eq!(config.icons_url, DEFAULT_ICONS_URL);

            jail.set_env("KATA_REQUEST_TIMEOUT_SECS", "12");
            jail.set_env("KATA_ICON_SUFFIX", ".png");
            let config = Config::load()?;
            assert_eq!(config.request_timeout_secs, 12);
            assert_eq!(config.icon_suffix, ".png");
            assert_eq!(config.prices_url, "http://localhost:8080/prices.json");
            Ok(())
        });
    }
}
