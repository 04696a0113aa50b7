use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    /// `NODE_ENV=development`: reset codes go to the console even if SMTP is configured.
    pub development: bool,
    // SMTP (optional; reset codes are logged to the console without it)
    pub email_host: Option<String>,
    pub email_port: u16,
    pub email_user: Option<String>,
    pub email_password: Option<String>,
    pub email_from: String,
    pub email_timeout_secs: u64,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|s| !s.is_empty());

        let database_url = var("DATABASE_URL")
            .or_else(|| var("DB_CONNECTION_STRING"))
            .ok_or_else(|| {
                anyhow::anyhow!("Missing required env var: DATABASE_URL (or DB_CONNECTION_STRING)")
            })?;

        Ok(Self {
            database_url,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".into())
                .parse()?,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: var("PORT").unwrap_or_else(|| "3000".into()).parse()?,
            development: var("NODE_ENV").is_some_and(|v| v == "development"),
            email_host: var("EMAIL_HOST"),
            email_port: var("EMAIL_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            email_user: var("EMAIL_USER"),
            email_password: var("EMAIL_PASSWORD"),
            email_from: var("EMAIL_FROM").unwrap_or_else(|| "noreply@fbiapp.com".into()),
            email_timeout_secs: var("EMAIL_TIMEOUT_SECS")
                .unwrap_or_else(|| "15".into())
                .parse()?,
        })
    }
}
