use anyhow::Result;
use qbank_module_builder::utils::logging;
use qbank_module_builder::{App, Config};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::initialize(config).await?;

    // Ctrl-C 后不再派发新的详情请求
    let cancel = app.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ 收到中断信号，停止派发新的请求");
            cancel.cancel();
        }
    });

    // 运行应用
    app.run().await?;

    Ok(())
}
