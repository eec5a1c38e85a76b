//! 从环境变量读取配置。
//!
//! `COOKIE_QUARK` 支持多账号，账号之间用换行或 `&&` 分隔。按原始字节读取，
//! 某个账号里有非 UTF-8 内容只会让该账号失败。

use regex::bytes::Regex;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::credential::RawAccount;
use crate::error::ConfigError;

pub const COOKIE_VAR: &str = "COOKIE_QUARK";
pub const LOG_FILE_VAR: &str = "QUARK_LOG_FILE";
pub const NOTIFY_URL_VAR: &str = "QUARK_NOTIFY_URL";
const DEFAULT_LOG_FILE: &str = "app.log";

#[derive(Debug, Clone)]
pub struct Config {
    accounts: Option<Vec<RawAccount>>,
    pub log_file: PathBuf,
    pub notify_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var_os(COOKIE_VAR),
            env::var_os(LOG_FILE_VAR),
            env::var(NOTIFY_URL_VAR).ok(),
        )
    }

    fn from_vars(
        cookie: Option<OsString>,
        log_file: Option<OsString>,
        notify_url: Option<String>,
    ) -> Self {
        Self {
            accounts: cookie.map(|raw| split_accounts(&raw.into_encoded_bytes())),
            log_file: log_file
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            notify_url: notify_url.filter(|u| !u.trim().is_empty()),
        }
    }

    /// 变量未设置时返回 [`ConfigError::MissingCookie`]。
    pub fn accounts(&self) -> Result<&[RawAccount], ConfigError> {
        self.accounts.as_deref().ok_or(ConfigError::MissingCookie)
    }
}

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\n|&&").expect("valid separator regex"))
}

/// 按换行或 `&&` 切分，去掉首尾空白，丢弃空段。
pub fn split_accounts(raw: &[u8]) -> Vec<RawAccount> {
    separator()
        .split(raw)
        .map(<[u8]>::trim_ascii)
        .filter(|blob| !blob.is_empty())
        .map(RawAccount::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_mixed_separators() {
        let accounts = split_accounts(b"kps=A;sign=S1\n&&kps=B;sign=S2");
        assert_eq!(
            accounts,
            vec![
                RawAccount::from("kps=A;sign=S1"),
                RawAccount::from("kps=B;sign=S2"),
            ]
        );
    }

    #[test]
    fn test_split_either_separator() {
        assert_eq!(split_accounts(b"a=1\nb=2").len(), 2);
        assert_eq!(split_accounts(b"a=1&&b=2").len(), 2);
        assert_eq!(split_accounts(b"  a=1 \r\n\n  ").len(), 1);
        assert!(split_accounts(b"").is_empty());
    }

    #[test]
    fn test_split_keeps_non_utf8_blob_isolated() {
        let accounts = split_accounts(b"kps=A&&kps=\xff\nkps=C");
        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[1].as_bytes(), b"kps=\xff");
    }

    #[test]
    fn test_missing_cookie() {
        let config = Config::from_vars(None, None, None);
        assert!(matches!(config.accounts(), Err(ConfigError::MissingCookie)));
        assert_eq!(config.log_file, PathBuf::from("app.log"));
        assert!(config.notify_url.is_none());
    }

    #[test]
    fn test_from_vars() {
        let config = Config::from_vars(
            Some(OsString::from("kps=A\nkps=B")),
            Some(OsString::from("/tmp/quark.log")),
            Some("  ".to_string()),
        );
        assert_eq!(config.accounts().unwrap().len(), 2);
        assert_eq!(config.log_file, PathBuf::from("/tmp/quark.log"));
        assert!(config.notify_url.is_none());
    }
}
