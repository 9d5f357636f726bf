use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    pub tax_rate: f64,
    pub deposit_rate: f64,
    pub hold_ttl_seconds: u64,
    /// Seconds between background expiry sweeps
    #[serde(default = "default_sweep_interval")]
    pub expiry_sweep_seconds: u64,
    pub currency: String,
}

fn default_sweep_interval() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file, not checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of COVE)
            // Eg. `COVE__SERVER__PORT=8080` would set the server port
            .add_source(config::Environment::with_prefix("COVE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
