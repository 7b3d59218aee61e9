use anyhow::Result;
use question_set_composer::utils::logging;
use question_set_composer::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;

    if stats.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
