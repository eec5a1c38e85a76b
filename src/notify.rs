//! 签到结果的推送出口。

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const TITLE: &str = "夸克自动签到";

/// 接收标题和正文，调用方不依赖返回值以外的任何东西。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> anyhow::Result<()>;
}

/// 直接打印到标准输出。
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, title: &str, body: &str) -> anyhow::Result<()> {
        println!("{}: {}", title, body);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    body: &'a str,
}

/// 以 JSON `{"title","body"}` POST 到配置的地址。
#[derive(Debug)]
pub struct WebhookNotifier {
    http: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build webhook client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, title: &str, body: &str) -> anyhow::Result<()> {
        debug!(url = %self.url, "Posting notification");
        self.http
            .post(&self.url)
            .json(&WebhookPayload { title, body })
            .send()
            .await
            .context("Webhook request failed")?
            .error_for_status()
            .context("Webhook rejected notification")?;
        Ok(())
    }
}

/// 依次推送到每个出口；全部尝试完后返回第一个错误。
#[derive(Default)]
pub struct FanOut {
    targets: Vec<Box<dyn Notifier>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.targets.push(Box::new(notifier));
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl Notifier for FanOut {
    async fn notify(&self, title: &str, body: &str) -> anyhow::Result<()> {
        let mut first_err = None;
        for target in &self.targets {
            if let Err(e) = target.notify(title, body).await {
                warn!(error = %e, "Notifier failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
