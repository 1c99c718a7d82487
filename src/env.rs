use log::LevelFilter;
use std::str::FromStr;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HTTP_PORT: (&str, u16) = ("MW_HTTP_PORT", 8080);
pub const DATABASE_FILE: (&str, &str) = ("MW_DATABASE_FILE", "data/app.db");
pub const LOGGING_DIR: (&str, &str) = ("MW_LOGGING_DIR", "data/logs");
pub const SESSION_IDLE_DAYS: (&str, u64) = ("MW_SESSION_IDLE_DAYS", 2);
pub const SESSION_TOKEN_EXPIRE_DAYS: (&str, u64) = ("MW_SESSION_TOKEN_EXPIRE_DAYS", 30);

pub fn logging_level() -> LevelFilter {
    const ENV_KEY: &str = "MW_LOG_LEVEL";
    const DEFAULT: LevelFilter = LevelFilter::Info;
    std::env::var(ENV_KEY).map_or(DEFAULT, |value| {
        LevelFilter::from_str(&value).unwrap_or(DEFAULT)
    })
}

#[inline]
pub fn str_env(pair: (&str, &str)) -> String {
    std::env::var(pair.0).unwrap_or_else(|_| pair.1.to_string())
}

#[inline]
pub fn u16_env(pair: (&str, u16)) -> u16 {
    std::env::var(pair.0).map_or(pair.1, |value| value.parse::<u16>().unwrap_or(pair.1))
}

#[inline]
pub fn u64_env(pair: (&str, u64)) -> u64 {
    std::env::var(pair.0).map_or(pair.1, |value| value.parse::<u64>().unwrap_or(pair.1))
}
