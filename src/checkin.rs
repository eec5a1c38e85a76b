//! 单个账号的签到流程：查询成长信息 → 判断今日是否已签 → 未签则签到 → 生成日志。
//!
//! 整个流程没有重试，每个分支最终都得到一份 [`AccountReport`]。

use std::fmt;
use tracing::{info, warn};

use crate::bytes::format_bytes;
use crate::client::{GrowthApi, GrowthInfo};
use crate::error::ApiError;

const UNKNOWN_USER: &str = "未知用户";

/// 一次签到流程的终态。
#[derive(Debug)]
pub enum CheckInOutcome {
    /// 拿不到成长信息，后续接口都不会调用。
    InfoFailed(ApiError),
    AlreadySigned(GrowthInfo),
    Signed { info: GrowthInfo, reward: f64 },
    SignFailed { info: GrowthInfo, error: ApiError },
}

impl CheckInOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::AlreadySigned(_) | Self::Signed { .. })
    }
}

/// 驱动一个账号走完签到流程。
pub async fn check_in(api: &dyn GrowthApi) -> CheckInOutcome {
    let info = match api.growth_info().await {
        Ok(info) => info,
        Err(e) => return CheckInOutcome::InfoFailed(e),
    };
    if info.cap_sign.sign_daily {
        return CheckInOutcome::AlreadySigned(info);
    }
    match api.sign().await {
        Ok(reward) => CheckInOutcome::Signed { info, reward },
        Err(error) => CheckInOutcome::SignFailed { info, error },
    }
}

/// 单个账号的日志，按行保存。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountReport {
    lines: Vec<String>,
}

impl AccountReport {
    pub fn render(outcome: &CheckInOutcome, user: Option<&str>) -> Self {
        let mut report = Self::default();
        let info = match outcome {
            CheckInOutcome::InfoFailed(_) => {
                report.push("❌ 签到异常: 获取成长信息失败");
                return report;
            }
            CheckInOutcome::AlreadySigned(info)
            | CheckInOutcome::Signed { info, .. }
            | CheckInOutcome::SignFailed { info, .. } => info,
        };

        let tier = if info.vip_88 { "88VIP" } else { "普通用户" };
        report.push(format!(" {} {}", tier, user.unwrap_or(UNKNOWN_USER)));
        report.push(format!(
            "💾 网盘总容量：{}，签到累计容量：{}",
            format_bytes(info.total_capacity),
            format_bytes(info.cap_composition.sign_reward)
        ));

        let sign = &info.cap_sign;
        match outcome {
            CheckInOutcome::AlreadySigned(_) => report.push(format!(
                "✅ 签到日志: 今日已签到+{}，连签进度({}/{})",
                format_bytes(sign.sign_daily_reward),
                sign.sign_progress,
                sign.sign_target
            )),
            // 进度是本地 +1 推算的，没有重新查询
            CheckInOutcome::Signed { reward, .. } => report.push(format!(
                "✅ 执行签到: 今日签到+{}，连签进度({}/{})",
                format_bytes(*reward),
                sign.sign_progress.saturating_add(1),
                sign.sign_target
            )),
            CheckInOutcome::SignFailed { error, .. } => {
                report.push(format!("❌ 签到异常: {}", error))
            }
            CheckInOutcome::InfoFailed(_) => {}
        }
        report
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

}

impl fmt::Display for AccountReport {
    /// 每行以换行结尾。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// 签到并生成日志，同时返回是否成功。
pub async fn run_check_in(
    api: &dyn GrowthApi,
    user: Option<&str>,
) -> (bool, AccountReport) {
    let outcome = check_in(api).await;
    match &outcome {
        CheckInOutcome::InfoFailed(e) => warn!(error = %e, "Failed to fetch growth info"),
        CheckInOutcome::SignFailed { error, .. } => warn!(error = %error, "Sign failed"),
        CheckInOutcome::AlreadySigned(_) => info!("Already signed today"),
        CheckInOutcome::Signed { reward, .. } => info!(reward, "Signed"),
    }
    (outcome.is_success(), AccountReport::render(&outcome, user))
}
