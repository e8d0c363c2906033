/// 日志工具模块
///
/// 提供批量解题过程中的日志格式化和输出辅助函数
use std::path::Path;

use tracing::info;

use crate::config::Config;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量解题模式");
    info!("🤖 模型: {}", config.llm_model_name);
    info!("📊 最大并发数: {}", config.max_concurrent_puzzles.max(1));
    info!("💾 输出格式: {}", config.output_format);
    info!("{}", "=".repeat(60));
}

/// 记录题目加载信息
///
/// # 参数
/// - `total`: 题目总数
/// - `source`: 题目文件路径
pub fn log_puzzles_loaded(total: usize, source: &Path) {
    info!("✓ 从 {} 加载了 {} 道题目", source.display(), total);
}

/// 记录单题进度
pub fn log_progress(current: usize, total: usize, id: i64, question: &str) {
    info!(
        "[{}/{}] 题目 #{}: {}",
        current,
        total,
        id,
        truncate_text(question, 60)
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `answered`: 成功得到答案的数量
/// - `failed`: 记录为错误的数量
/// - `total`: 总数
/// - `output_path`: 答案文件路径
pub fn print_final_stats(answered: usize, failed: usize, total: usize, output_path: &Path) {
    info!("{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", answered, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("答案已保存至: {}", output_path.display());
}

/// 截断长文本用于日志显示
///
/// 换行会被替换为空格，保证一条日志只占一行
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.chars().count() > max_len {
        flat.chars().take(max_len).collect::<String>() + "..."
    } else {
        flat
    }
}
