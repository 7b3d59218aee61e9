//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，把组卷计划回放成一次次组卷操作。
//!
//! ## 模块划分
//!
//! ### `batch_composer` - 批量组卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载组卷计划（Vec<CompositionPlan>）
//! - 控制并发数量
//! - 输出全局统计信息
//!
//! ### `plan_composer` - 单个计划处理器
//! - 回放基本信息、部分、题目和自定义题目
//! - 拉取题目池并输出预览
//! - 提交题集
//!
//! ## 层次关系
//!
//! ```text
//! batch_composer (处理 Vec<CompositionPlan>)
//!     ↓
//! plan_composer (处理单个计划)
//!     ↓
//! workflow::Composer (两步组卷流程)
//!     ↓
//! services (题目池 / 搜索编号)
//!     ↓
//! clients (HTTP 接口)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_composer 管批量，plan_composer 管单个
//! 2. **向下依赖**：编排层 → workflow → services → clients
//! 3. **无业务规则**：校验全部由 workflow 完成，这里只调度和统计

pub mod batch_composer;
pub mod plan_composer;

pub use batch_composer::{App, ProcessingStats};
pub use plan_composer::{process_plan, PlanStats};
