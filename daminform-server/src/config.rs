use anyhow::Context;
use std::env;
use std::path::PathBuf;

/// Runtime configuration, loaded from the environment (with `.env`
/// support). Only the database URL is mandatory; everything else defaults
/// to the standard deployment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_port: u16,

    /// Root of the asset working tree.
    pub working_folder: PathBuf,
    /// Directory name pruned from every scan, subtree included.
    pub skip_subdir: String,
    /// Recognized asset extension, without the dot.
    pub asset_extension: String,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: Option<String>,

    pub mail_from: String,
    /// Domain appended to lead identities to form recipient addresses.
    pub mail_domain: String,
    pub subject_prefix: String,
    pub manager_addresses: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let mail_domain =
            env::var("MAIL_DOMAIN").unwrap_or_else(|_| "ahs.ca".to_string());

        Ok(Self {
            database_url,
            listen_port: env::var("LISTEN_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            working_folder: env::var("WORKING_FOLDER")
                .unwrap_or_else(|_| "/var/dam/working".to_string())
                .into(),
            skip_subdir: env::var("SKIP_SUBDIR")
                .unwrap_or_else(|_| "changesets".to_string()),
            asset_extension: env::var("ASSET_EXTENSION")
                .unwrap_or_else(|_| "oet".to_string()),

            smtp_host: env::var("SMTP_HOST")
                .unwrap_or_else(|_| "mail".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .unwrap_or(25),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),

            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| format!("noreply@{mail_domain}")),
            mail_domain,
            subject_prefix: env::var("SUBJECT_PREFIX")
                .unwrap_or_else(|_| "DAM: ".to_string()),
            manager_addresses: parse_addresses(
                &env::var("MANAGER_ADDRESSES").unwrap_or_default(),
            ),
        })
    }
}

fn parse_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
