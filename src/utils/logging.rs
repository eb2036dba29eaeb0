use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::models::Section;
use crate::orchestrator::bank_assembler::SectionReport;
use crate::services::ProgressObserver;

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。可重复调用。
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n题库抓取与组卷日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发请求数
/// - `debug_limit`: 调试模式下每个部分的题目上限
pub fn log_startup(max_concurrent: usize, debug_limit: Option<usize>) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题库抓取与组卷");
    info!("📊 最大并发请求数: {}", max_concurrent);
    if let Some(limit) = debug_limit {
        info!("🐞 调试模式: 每个部分只处理前 {} 道题", limit);
    }
    info!("{}", "=".repeat(60));
}

/// 记录部分开始信息
pub fn log_section_start(section: Section) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理 {} 部分", section);
    info!("{}", "=".repeat(60));
}

/// 记录部分完成信息
pub fn log_section_complete(report: &SectionReport) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ {} 部分完成: 目录 {} 道, 合并 {} 道, 详情成功 {}/{}",
        report.section,
        report.catalog_size,
        report.merged,
        report.details.succeeded,
        report.details.total
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `reports`: 各部分统计
/// - `modules`: 抽样完成的模块数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(reports: &[SectionReport], modules: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for report in reports {
        info!(
            "📚 {}: 题目 {} | 详情成功 {} | 失败 {} | 取消 {} | 丢弃 {}",
            report.section,
            report.merged,
            report.details.succeeded,
            report.details.failed,
            report.details.cancelled,
            report.dropped
        );
    }
    info!("📝 已生成 {} 个模块", modules);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 把进度写入日志，百分比变化时才输出
#[derive(Default)]
pub struct LogProgress {
    last: Mutex<Option<u8>>,
}

impl ProgressObserver for LogProgress {
    fn on_progress(&self, percent: u8, message: &str) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if *last == Some(percent) {
            debug!("[{:>3}%] {}", percent, message);
            return;
        }
        *last = Some(percent);
        info!("[{:>3}%] {}", percent, message);
    }
}
