use std::{fmt::Display, str::FromStr};

use log::*;

use crate::{GenericError, NalaBoxError};

const DEFAULT_PORT: &str = "3002";
const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub supabase_url: String,
    pub supabase_key: String,
    pub google_maps_token: Option<String>,
}

impl Config {
    /// Reads settings from the environment, loading `.env` first when present.
    pub fn load() -> Result<Self, GenericError> {
        if dotenv::dotenv().is_err() {
            debug!("No .env file found, reading the process environment only.");
        }
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, GenericError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(NalaBoxError::MissingConfig(key))
        };

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or_default(&lookup, "PORT", DEFAULT_PORT)?,
            supabase_url: required("SUPABASE_URL")?,
            supabase_key: required("SUPABASE_KEY")?,
            google_maps_token: lookup("GOOGLE_MAPS_TOKEN").filter(|t| !t.trim().is_empty()),
        })
    }

    /// PostgREST endpoint of the Supabase project.
    pub fn rest_endpoint(&self) -> String {
        let base = self.supabase_url.trim_end_matches('/');
        if base.ends_with("/rest/v1") {
            base.to_string()
        } else {
            format!("{}/rest/v1", base)
        }
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, GenericError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    });
    raw.parse()
        .map_err(|e| format!("Invalid {} value {:?}: {}", key, raw, e).into())
}
