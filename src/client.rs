//! 夸克网盘接口客户端。
//!
//! 三个接口：成长信息、每日签到、抽奖余额。任何传输错误、非 2xx 状态码、
//! 非法 JSON 或缺少 `data` 都以 [`ApiError`] 返回，不会 panic。

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::credential::CredentialSet;
use crate::error::ApiError;

const GROWTH_INFO_URL: &str = "https://drive-m.quark.cn/1/clouddrive/capacity/growth/info";
const GROWTH_SIGN_URL: &str = "https://drive-m.quark.cn/1/clouddrive/capacity/growth/sign";
const QUERY_BALANCE_URL: &str = "https://coral2.quark.cn/currency/v1/queryBalance";
const BALANCE_MODULE_CODE: &str = "1f3563d38896438db994f118d4ff53cb";
const MOBILE_USER_AGENT: &str =
    "Mozilla/5.0 (Android 13; Mobile; rv:109.0) Gecko/115.0 Firefox/115.0";
const TIMEOUT: Duration = Duration::from_secs(10);
const UNKNOWN_ERROR: &str = "未知错误";

/// 成长信息里的 `data`。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrowthInfo {
    #[serde(rename = "88VIP", default, deserialize_with = "lenient_bool")]
    pub vip_88: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_capacity: f64,
    #[serde(default, deserialize_with = "or_default")]
    pub cap_composition: CapComposition,
    #[serde(default, deserialize_with = "or_default")]
    pub cap_sign: CapSign,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapComposition {
    /// 签到累计获得的容量（字节）。
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sign_reward: f64,
}

/// 今日签到状态与连签进度。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapSign {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub sign_daily: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sign_daily_reward: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sign_progress: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sign_target: u64,
}

// 缺失、null、类型不对的数值一律按 0 处理
fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(d)?.as_f64().unwrap_or(0.0))
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .unwrap_or(0))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(d)?))
}

fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// null、false、0、空字符串、空数组、空对象视为“没有”。
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// 取出非空的 `data`；没有就返回 `None`。
fn take_data(body: &mut Value) -> Option<Value> {
    body.get_mut("data")
        .map(Value::take)
        .filter(is_truthy)
}

/// 业务失败时的提示文本，按顺序取第一个存在的字段。
fn reject_message(body: &Value, fields: &[&str]) -> String {
    fields
        .iter()
        .find_map(|f| body.get(*f).and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

/// 对一个账号的接口操作。
///
/// [`QuarkClient`] 是真实实现；签到流程只依赖这个 trait。
#[async_trait]
pub trait GrowthApi: Send + Sync {
    /// 当前容量与今日签到状态。
    async fn growth_info(&self) -> Result<GrowthInfo, ApiError>;

    /// 执行签到，成功时返回本次奖励的字节数。
    async fn sign(&self) -> Result<f64, ApiError>;

    /// 抽奖余额。
    async fn balance(&self) -> Result<f64, ApiError>;
}

/// 接口地址，测试时可替换成本地服务。
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub growth_info: String,
    pub growth_sign: String,
    pub query_balance: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            growth_info: GROWTH_INFO_URL.to_string(),
            growth_sign: GROWTH_SIGN_URL.to_string(),
            query_balance: QUERY_BALANCE_URL.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct QuarkClient {
    http: Client,
    credentials: CredentialSet,
    endpoints: Endpoints,
}

impl QuarkClient {
    pub fn new(credentials: CredentialSet) -> Result<Self, ApiError> {
        let http = Client::builder()
            .default_headers(build_base_request_headers())
            .timeout(TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            credentials,
            endpoints: Endpoints::default(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    fn growth_query(&self) -> [(&'static str, &str); 5] {
        [
            ("pr", "ucpro"),
            ("fr", "android"),
            ("kps", self.credentials.kps().unwrap_or_default()),
            ("sign", self.credentials.sign().unwrap_or_default()),
            ("vcode", self.credentials.vcode().unwrap_or_default()),
        ]
    }

    /// 发送请求并把响应体解析成 JSON。
    async fn send_json(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn build_base_request_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    // 模拟安卓移动端，接口会按客户端区分行为
    let common = [
        (
            HeaderName::from_static("user-agent"),
            HeaderValue::from_static(MOBILE_USER_AGENT),
        ),
        (
            HeaderName::from_static("accept"),
            HeaderValue::from_static("application/json, text/plain, */*"),
        ),
        (
            HeaderName::from_static("connection"),
            HeaderValue::from_static("keep-alive"),
        ),
    ];
    for (name, value) in common {
        headers.insert(name, value);
    }
    headers
}

#[async_trait]
impl GrowthApi for QuarkClient {
    #[instrument(skip(self))]
    async fn growth_info(&self) -> Result<GrowthInfo, ApiError> {
        debug!("Fetching growth info");
        let request = self
            .http
            .get(&self.endpoints.growth_info)
            .query(&self.growth_query());
        let mut body = self.send_json(request).await.inspect_err(|e| {
            warn!(error = %e, "Growth info request failed");
        })?;
        let data = take_data(&mut body).ok_or(ApiError::MissingData)?;
        Ok(serde_json::from_value(data)?)
    }

    #[instrument(skip(self))]
    async fn sign(&self) -> Result<f64, ApiError> {
        debug!("Performing daily sign");
        let request = self
            .http
            .post(&self.endpoints.growth_sign)
            .query(&self.growth_query())
            .json(&serde_json::json!({ "sign_cyclic": true }));
        let mut body = self.send_json(request).await?;
        match take_data(&mut body) {
            Some(data) => Ok(data
                .get("sign_daily_reward")
                .and_then(Value::as_f64)
                .unwrap_or(0.0)),
            None => Err(ApiError::Rejected(reject_message(&body, &["message"]))),
        }
    }

    #[instrument(skip(self))]
    async fn balance(&self) -> Result<f64, ApiError> {
        debug!("Querying balance");
        let request = self.http.get(&self.endpoints.query_balance).query(&[
            ("moduleCode", BALANCE_MODULE_CODE),
            ("kps", self.credentials.kps().unwrap_or_default()),
        ]);
        let mut body = self.send_json(request).await?;
        match take_data(&mut body) {
            Some(data) => Ok(data.get("balance").and_then(Value::as_f64).unwrap_or(0.0)),
            None => Err(ApiError::Rejected(reject_message(&body, &["msg"]))),
        }
    }
}
