use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub http_port: u16,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub kafka_enabled: bool,
    pub kafka_bootstrap_servers: String,
    pub kafka_topic: String,
    pub kafka_group_id: String,
    pub kafka_auto_offset_reset: String,
    pub kafka_sasl_mechanism: String,
    pub kafka_username: String,
    pub kafka_password: String,
    pub kafka_security_protocol: String,
    pub kafka_max_retries: u32,
    pub kafka_circuit_breaker_cooldown: u64,
    pub service: ServiceSettings,
    pub log_level: String,
}

/// Settings the request handlers and the device consumer share.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceSettings {
    pub sos: SosSettings,
    pub digital_id_validity_days: i64,
    pub verification_base_url: String,
    pub alert_list_limit: i64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            sos: SosSettings::default(),
            digital_id_validity_days: 30,
            verification_base_url: "https://tourguard.gov".to_string(),
            alert_list_limit: 50,
        }
    }
}

/// Tunables for the SOS hold gesture and the E-FIR it produces.
#[derive(Debug, Deserialize, Clone)]
pub struct SosSettings {
    pub hold_duration: Duration,
    pub tick: Duration,
    /// Longest gap between client polls before a hold counts as released.
    pub keepalive: Option<Duration>,
    pub police_station: String,
}

impl Default for SosSettings {
    fn default() -> Self {
        Self {
            hold_duration: Duration::from_millis(3000),
            tick: Duration::from_millis(100),
            keepalive: Some(Duration::from_millis(1500)),
            police_station: "Central Police Station".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let http_port = parse_or("HTTP_PORT", 8080);
        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            _ => StoreBackend::Postgres,
        };

        let kafka_enabled = parse_or("KAFKA_ENABLED", false);
        let kafka_bootstrap_servers =
            env::var("KAFKA_BOOTSTRAP_SERVERS").unwrap_or_else(|_| "localhost:9092".to_string());
        let kafka_topic =
            env::var("KAFKA_TOPIC").unwrap_or_else(|_| "tourguard-device-sos".to_string());
        let kafka_group_id =
            env::var("KAFKA_GROUP_ID").unwrap_or_else(|_| "tourguard-sos-consumer".to_string());
        let kafka_auto_offset_reset =
            env::var("KAFKA_AUTO_OFFSET_RESET").unwrap_or_else(|_| "latest".to_string());
        let kafka_sasl_mechanism =
            env::var("KAFKA_SASL_MECHANISM").unwrap_or_else(|_| "SCRAM-SHA-256".to_string());
        let kafka_username = env::var("KAFKA_USERNAME").unwrap_or_default();
        let kafka_password = env::var("KAFKA_PASSWORD").unwrap_or_default();
        let kafka_security_protocol =
            env::var("KAFKA_SECURITY_PROTOCOL").unwrap_or_else(|_| "SASL_PLAINTEXT".to_string());
        let kafka_max_retries = parse_or("KAFKA_MAX_RETRIES", 5);
        let kafka_circuit_breaker_cooldown = parse_or("KAFKA_CIRCUIT_BREAKER_COOLDOWN", 300);

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "tourguard".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "tourguard".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "tourguard".to_string());

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );

        let defaults = ServiceSettings::default();
        let sos = SosSettings {
            hold_duration: Duration::from_millis(parse_or("SOS_HOLD_MS", 3000)),
            tick: Duration::from_millis(parse_or("SOS_TICK_MS", 100)),
            // 0 turns the keepalive off
            keepalive: match parse_or("SOS_KEEPALIVE_MS", 1500) {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            police_station: env::var("SOS_POLICE_STATION").unwrap_or(defaults.sos.police_station),
        };
        let service = ServiceSettings {
            sos,
            digital_id_validity_days: parse_or(
                "DIGITAL_ID_VALIDITY_DAYS",
                defaults.digital_id_validity_days,
            ),
            verification_base_url: env::var("VERIFICATION_BASE_URL")
                .unwrap_or(defaults.verification_base_url),
            alert_list_limit: parse_or("ALERT_LIST_LIMIT", defaults.alert_list_limit),
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            http_port,
            store_backend,
            database_url,
            kafka_enabled,
            kafka_bootstrap_servers,
            kafka_topic,
            kafka_group_id,
            kafka_auto_offset_reset,
            kafka_sasl_mechanism,
            kafka_username,
            kafka_password,
            kafka_security_protocol,
            kafka_max_retries,
            kafka_circuit_breaker_cooldown,
            service,
            log_level,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
