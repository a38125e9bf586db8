use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub openai_api_key: String,
    pub retell_api_key: String,
    /// Public origin of the candidate-facing client, used to build share links.
    pub base_url: String,
    pub email: EmailConfig,
    /// Seconds a proctoring board survives without a fresh frame.
    pub proctoring_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from_email: String,
    pub from_name: String,
    pub transport: EmailTransportConfig,
}

#[derive(Debug, Clone)]
pub enum EmailTransportConfig {
    Smtp {
        host: String,
        port: u16,
        username: String,
        password: String,
    },
    /// Writes `.eml` files into a directory instead of sending. Development only.
    File { path: String },
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            retell_api_key: require_env("RETELL_API_KEY")?,
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            email: EmailConfig::from_env()?,
            proctoring_ttl_secs: std::env::var("PROCTORING_TTL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("PROCTORING_TTL_SECS must be a whole number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self> {
        let from_email = std::env::var("EMAIL_FROM")
            .unwrap_or_else(|_| "no-reply@hirevoice.local".to_string());
        let from_name = std::env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "HireVoice".to_string());

        // SMTP_HOST switches to real delivery; otherwise mail lands on disk.
        let transport = match std::env::var("SMTP_HOST") {
            Ok(host) => EmailTransportConfig::Smtp {
                host,
                port: std::env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse::<u16>()
                    .context("SMTP_PORT must be a valid port number")?,
                username: require_env("SMTP_USERNAME")?,
                password: require_env("SMTP_PASSWORD")?,
            },
            Err(_) => EmailTransportConfig::File {
                path: std::env::var("EMAIL_FILE_DIR").unwrap_or_else(|_| "./emails".to_string()),
            },
        };

        Ok(EmailConfig {
            from_email,
            from_name,
            transport,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
