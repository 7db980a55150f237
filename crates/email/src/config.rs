use anyhow::{Context, Result, anyhow};
use shared::{
    config::{EnvLookup, GrpcServerConfig, env_or, parse_env_or, process_env},
    utils::LogConfig,
};
use std::{fmt, str::FromStr};

pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SENDER: &str = "no-reply@hipstershop.example";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailMode {
    #[default]
    Dummy,
    Live,
}

impl FromStr for EmailMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dummy" => Ok(EmailMode::Dummy),
            "live" => Ok(EmailMode::Live),
            other => Err(anyhow!("EMAIL_MODE must be 'dummy' or 'live', got '{other}'")),
        }
    }
}

impl fmt::Display for EmailMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailMode::Dummy => write!(f, "dummy"),
            EmailMode::Live => write!(f, "live"),
        }
    }
}

/// Settings for the live backend. Fields stay optional here so that dummy
/// mode starts without them; the live dispatcher rejects missing values.
#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub server: GrpcServerConfig,
    pub log: LogConfig,
    pub mode: EmailMode,
    pub smtp: SmtpConfig,
}

impl EmailConfig {
    pub fn init() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let server = GrpcServerConfig::from_lookup(lookup)?;
        let mode = env_or(lookup, "EMAIL_MODE", "dummy")
            .parse::<EmailMode>()
            .context("invalid email mode")?;

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let smtp = SmtpConfig {
            host: non_empty("SMTP_HOST"),
            port: parse_env_or(lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            username: non_empty("SMTP_USERNAME"),
            password: non_empty("SMTP_PASSWORD"),
            from: env_or(lookup, "EMAIL_FROM", DEFAULT_SENDER),
        };

        Ok(Self {
            server,
            log: LogConfig::from_lookup(lookup),
            mode,
            smtp,
        })
    }
}
