//! # QBank Module Builder
//!
//! 抓取题库目录与详情，合并为一份题目数据，并按配额随机组卷
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只负责 HTTP 请求，返回原始状态码和响应体
//! - `QbankClient` - 目录 / external_id / ibn 三个接口
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `DetailFetcher` / `CatalogFetcher` - 获取并解析详情、目录
//! - `FetchDispatcher` - 有界并发派发详情请求，支持取消
//! - `merge` - 按 questionId 合并目录与详情
//! - `ModuleSampler` - 按配额随机抽题
//! - `Progress` - 单调递增的进度上报
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个部分"的完整处理流程
//! - `SectionFlow` - 目录 → 详情 → 合并
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用入口，输出题目数据和组卷结果
//! - `orchestrator/bank_assembler` - 组装两个部分
//! - `orchestrator/module_builder` - 为每个模块抽样
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::QbankClient;
pub use config::{ClientSettings, Config};
pub use error::{AppError, AppResult, SamplingError};
pub use models::{CandidateSummary, DetailPayload, Difficulty, LookupKey, MergedQuestion, Section};
pub use orchestrator::{build_module_plan, App, BankAssembler, ModulePlan, QuestionBank};
pub use services::{FetchDispatcher, ModuleSampler, Progress};
pub use workflow::SectionFlow;
