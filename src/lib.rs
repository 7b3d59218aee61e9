//! # Question Set Composer
//!
//! 从题库中挑选题目、组成分部分题集并提交到题集服务的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 接口层（Clients）
//! - `clients/` - 题库 HTTP 接口，只负责收发
//! - `ApiClient` - 题库类型、题目查询、题集创建
//! - `BankTypeCatalog` / `QuestionSource` / `QuestionSetGateway` - 供上层依赖的接口抽象
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `PoolBrowser` - 拉取题目池，丢弃过期的搜索结果
//! - `FilteredPool` - 按难度和科目本地筛选，结果随题目池版本缓存
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 两步组卷流程，所有规则都在这里校验
//! - `basic_info` / `parts` / `custom_question` - 纯函数状态转换
//! - `Composer` - 步骤控制、提示信息、提交
//! - `preview` - 只读预览和答题练习
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_composer` - 批量处理组卷计划，管理并发
//! - `orchestrator/plan_composer` - 把单个计划回放到组卷流程上
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
pub use clients::{ApiClient, BankTypeCatalog, QuestionSetGateway, QuestionSource};
pub use config::Config;
pub use error::{AppError, AppResult, ValidationError};
pub use models::{Category, CompositionPlan, Draft, Question, QuestionSetPayload, QuestionType};
pub use orchestrator::{process_plan, App};
pub use workflow::{Composer, PartsAction, Step, SubmitOutcome};
