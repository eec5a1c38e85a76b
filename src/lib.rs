mod batch;
mod bytes;
mod checkin;
mod client;
mod config;
mod credential;
mod error;
mod notify;

pub use batch::*;
pub use bytes::*;
pub use checkin::*;
pub use client::*;
pub use config::*;
pub use credential::*;
pub use error::*;
pub use notify::*;

use anyhow::Context;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 日志文件建不了（只读目录等）时返回错误信息，调用方退回只写标准输出。
fn open_log_file(log_file: &Path) -> Result<File, String> {
    File::create(log_file)
        .map_err(|e| format!("Failed to create log file {}: {}", log_file.display(), e))
}

pub fn init_log_env(log_file: &Path) -> anyhow::Result<()> {
    let (file, file_err) = match open_log_file(log_file) {
        Ok(file) => (Some(file), None),
        Err(e) => (None, Some(e)),
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")), // 默认 info，可用 RUST_LOG 覆盖
        )
        .with(
            fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .with(file.map(|file| {
            // 文件层不带 ANSI 颜色
            fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
        }))
        .try_init()
        .context("Failed to install tracing subscriber")?;
    if let Some(e) = file_err {
        warn!("{}, logging to stdout only", e);
    }
    Ok(())
}
