use checkin_quark::{
    init_log_env, BatchRunner, Config, ConsoleNotifier, FanOut, Notifier, QuarkClient,
    WebhookNotifier, TITLE,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // 没有 .env 也没关系
    let config = Config::from_env();
    init_log_env(&config.log_file)?;

    let mut notifier = FanOut::new().with(ConsoleNotifier);
    if let Some(url) = &config.notify_url {
        match WebhookNotifier::new(url.as_str()) {
            Ok(webhook) => notifier = notifier.with(webhook),
            Err(e) => error!("{:?}", e),
        }
    }

    println!("----------夸克网盘开始签到----------");
    let accounts = match config.accounts() {
        Ok(accounts) => accounts,
        Err(e) => {
            let line = format!("❌{}", e);
            println!("{}", line);
            if let Err(e) = notifier.notify(TITLE, &line).await {
                error!("{:?}", e);
            }
            return Ok(());
        }
    };
    println!("✅ 检测到共 {} 个夸克账号\n", accounts.len());
    info!(accounts = accounts.len(), "Starting check-in");

    let runner = BatchRunner::new(QuarkClient::new, notifier);
    runner.run(accounts).await;
    println!("----------夸克网盘签到完毕----------");
    Ok(())
}
