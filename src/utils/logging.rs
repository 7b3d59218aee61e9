/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// 初始化日志
///
/// 读取 `RUST_LOG`，未设置时默认 info。重复调用不会报错。
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 程序配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量组卷模式");
    info!("🌐 API 地址: {}", config.api_base_url);
    info!("📊 最大并发数: {}", config.max_concurrent_plans);
    if config.dry_run {
        info!("💡 dry run：只组卷和预览，不提交");
    }
    info!("{}", "=".repeat(60));
}

/// 记录计划加载信息
///
/// # 参数
/// - `total`: 计划总数
/// - `max_concurrent`: 最大并发数
pub fn log_plans_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个组卷计划", total);
    info!("📋 最多同时处理 {} 个\n", max_concurrent);
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `dry_run`: 是否为 dry run
pub fn print_final_stats(success: usize, failed: usize, total: usize, dry_run: bool) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    if dry_run {
        info!("✅ 组卷通过: {}/{} (未提交)", success, total);
    } else {
        info!("✅ 成功: {}/{}", success, total);
    }
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
