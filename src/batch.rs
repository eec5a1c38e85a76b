//! 多账号批量签到。
//!
//! 账号按输入顺序逐个处理，某个账号失败只会在它自己的段落里留下一行错误，
//! 不影响其它账号，也不会中断整批。

use tracing::{error, info, instrument, warn};

use crate::checkin::run_check_in;
use crate::client::GrowthApi;
use crate::credential::{CredentialSet, RawAccount};
use crate::error::ApiError;
use crate::notify::{Notifier, TITLE};

/// 单个账号的处理结果，`position` 从 1 开始。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    pub position: usize,
    pub succeeded: bool,
}

/// 所有账号拼接后的日志。
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    body: String,
    entries: Vec<AccountEntry>,
}

impl BatchReport {
    /// 推送用的完整正文。
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn entries(&self) -> &[AccountEntry] {
        &self.entries
    }

    /// 去掉末尾一个换行后的正文。
    pub fn message(&self) -> &str {
        self.body.strip_suffix('\n').unwrap_or(&self.body)
    }

    fn record(&mut self, position: usize, succeeded: bool, section: &str) {
        self.body.push_str(section);
        self.entries.push(AccountEntry {
            position,
            succeeded,
        });
    }
}

pub struct BatchRunner<F, N> {
    make_client: F,
    notifier: N,
}

impl<F, A, N> BatchRunner<F, N>
where
    F: Fn(CredentialSet) -> Result<A, ApiError>,
    A: GrowthApi,
    N: Notifier,
{
    pub fn new(make_client: F, notifier: N) -> Self {
        Self {
            make_client,
            notifier,
        }
    }

    /// 处理全部账号，把汇总结果交给推送，返回去掉末尾换行的正文。
    pub async fn run(&self, accounts: &[RawAccount]) -> String {
        let report = self.collect(accounts).await;
        if let Err(e) = self.notifier.notify(TITLE, report.body()).await {
            error!(error = %e, "Failed to deliver notification");
            println!("{}\n❌ 结果输出失败，请查看运行日志！", e);
        }
        report.message().to_string()
    }

    /// 只签到不推送。
    pub async fn collect(&self, accounts: &[RawAccount]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, raw) in accounts.iter().enumerate() {
            let position = index + 1;
            let (succeeded, section) = self.run_account(position, raw).await;
            report.record(position, succeeded, &section);
        }
        report
    }

    #[instrument(skip(self, raw))]
    async fn run_account(&self, position: usize, raw: &RawAccount) -> (bool, String) {
        let credentials = match CredentialSet::try_from(raw) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "Failed to parse cookie");
                let line = format!("🙍🏻‍♂️ 第{}个账号 ❌ Cookie解析失败：{}\n", position, e);
                println!("{}", line);
                return (false, line);
            }
        };

        let mut section = format!("🙍🏻‍♂️ 第{}个账号\n", position);
        let user = credentials.user().map(str::to_string);
        let succeeded = match (self.make_client)(credentials) {
            Ok(client) => {
                let (ok, report) = run_check_in(&client, user.as_deref()).await;
                info!(success = ok, "Account processed");
                section.push_str(&report.to_string());
                ok
            }
            Err(e) => {
                error!(error = %e, "Failed to set up account client");
                section.push_str(&format!("❌ 账号签到执行失败：{}\n", e));
                false
            }
        };
        section.push('\n');
        (succeeded, section)
    }
}
