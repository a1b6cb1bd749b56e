use anyhow::Result;
use arabic_proofreader::config::Config;
use arabic_proofreader::{http, utils};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    utils::init(config.verbose_logging);
    utils::logging::log_startup(&config);

    // 启动服务
    http::serve(&config).await?;

    Ok(())
}
