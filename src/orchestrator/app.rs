//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、HTTP 客户端、组卷配额
//! 2. **题库组装**：委托 `BankAssembler` 抓取并合并两个部分
//! 3. **组卷抽样**：委托 `build_module_plan` 为每个模块抽题
//! 4. **结果输出**：写出题目数据和组卷结果，打印统计
//!
//! 取消令牌由调用方持有（例如 Ctrl-C），取消后未完成的详情记为缺失。

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::clients::QbankClient;
use crate::config::Config;
use crate::models::{load_quota_table, write_json, QuotaTable};
use crate::orchestrator::bank_assembler::BankAssembler;
use crate::orchestrator::module_builder::build_module_plan;
use crate::services::{ModuleSampler, Progress};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats, LogProgress};

/// 应用主结构
pub struct App {
    config: Config,
    client: QbankClient,
    quotas: QuotaTable,
    cancel: CancellationToken,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        log_startup(
            config.max_concurrent_requests,
            config.debug_mode.then_some(config.debug_limit),
        );

        let client = QbankClient::new(config.client_settings()).context("创建 HTTP 客户端失败")?;

        let quotas = match &config.quota_file {
            Some(path) => {
                info!("📁 加载组卷配额: {}", path);
                load_quota_table(Path::new(path)).await?
            }
            None => QuotaTable::default(),
        };

        Ok(Self {
            config,
            client,
            quotas,
            cancel: CancellationToken::new(),
        })
    }

    /// 取消令牌，触发后停止派发新的详情请求
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let progress = Progress::new(Arc::new(LogProgress::default()));

        // 抓取并合并题库
        let assembler =
            BankAssembler::from_config(&self.config, self.client.clone(), self.cancel.clone());
        let bank = assembler.assemble(&progress).await?;

        write_json(Path::new(&self.config.output_dataset_file), &bank.questions).await?;
        info!(
            "💾 题目数据已写入 {} ({} 道)",
            self.config.output_dataset_file,
            bank.questions.len()
        );

        // 组卷
        let sampler = match self.config.sampling_seed {
            Some(seed) => ModuleSampler::with_seed(seed),
            None => ModuleSampler::new(),
        };
        let mut sampler = sampler.with_max_attempts(self.config.sampling_max_attempts);
        let plan = build_module_plan(&bank, &self.quotas, &mut sampler)?;

        write_json(Path::new(&self.config.output_modules_file), &plan).await?;
        info!("💾 组卷结果已写入 {}", self.config.output_modules_file);

        progress.report(100, "全部完成");

        // 输出最终统计
        print_final_stats(&bank.reports, plan.modules.len(), &self.config.output_log_file);

        Ok(())
    }
}
