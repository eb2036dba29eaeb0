//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整体流程调度和结果汇总，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 持有 HTTP 客户端、组卷配额和取消令牌
//! - 写出题目数据和组卷结果
//!
//! ### `bank_assembler` - 题库组装器
//! - 依次处理阅读、数学两个部分
//! - 合并两个部分的题目，questionId 冲突时保留先处理的部分
//! - 输出每个部分的统计信息
//!
//! ### `module_builder` - 组卷
//! - 为每个 (部分, 模块) 按配额独立抽样
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! bank_assembler (处理两个 Section)      module_builder (处理四个模块)
//!     ↓                                      ↓
//! workflow::SectionFlow (单个 Section)   services::ModuleSampler
//!     ↓
//! services (能力层：catalog / detail / dispatch / merge)
//!     ↓
//! clients (HTTP：QbankClient)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：bank_assembler 管抓取，module_builder 管抽样
//! 2. **向下依赖**：编排层 → workflow → services → clients
//! 3. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod app;
pub mod bank_assembler;
pub mod module_builder;

// 重新导出主要类型
pub use app::App;
pub use bank_assembler::{BankAssembler, QuestionBank, SectionReport};
pub use module_builder::{build_module_plan, ModulePlan, ModuleSelection};
