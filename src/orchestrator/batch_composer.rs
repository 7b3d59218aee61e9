//! 批量组卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量组卷计划的加载、并发处理和统计。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、创建 API 客户端
//! 2. **批量加载**：扫描并加载所有组卷计划（`Vec<CompositionPlan>`）
//! 3. **并发控制**：最多同时处理 `max_concurrent_plans` 个计划
//! 4. **失败隔离**：单个计划失败不影响其余计划
//! 5. **全局统计**：汇总所有计划的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个计划的细节，委托 plan_composer
//! - **资源所有者**：唯一创建 `ApiClient` 的模块

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::clients::ApiClient;
use crate::config::Config;
use crate::models::CompositionPlan;
use crate::orchestrator::plan_composer;
use crate::utils::logging::{log_plans_loaded, log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    client: ApiClient,
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        log_startup(&config);

        let client = ApiClient::new(&config)?;
        Ok(Self { config, client })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let plans = self.load_plans().await?;

        if plans.is_empty() {
            warn!("⚠️ 没有找到待处理的组卷计划，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_plans_loaded(plans.len(), self.config.max_concurrent_plans);

        let stats = self.process_all_plans(plans).await;
        print_final_stats(stats.success, stats.failed, stats.total, self.config.dry_run);
        Ok(stats)
    }

    /// 加载组卷计划
    async fn load_plans(&self) -> Result<Vec<CompositionPlan>> {
        info!("\n📁 正在扫描组卷计划: {}", self.config.plan_folder);
        Ok(crate::models::load_all_plans(&self.config.plan_folder).await?)
    }

    /// 处理所有计划
    async fn process_all_plans(&self, plans: Vec<CompositionPlan>) -> ProcessingStats {
        let total = plans.len();
        let limit = self.config.max_concurrent_plans.max(1);

        let results: Vec<bool> = stream::iter(plans.iter().enumerate())
            .map(|(index, plan)| self.process_one(index + 1, plan))
            .buffer_unordered(limit)
            .collect()
            .await;

        let success = results.iter().filter(|ok| **ok).count();
        ProcessingStats {
            success,
            failed: total - success,
            total,
        }
    }

    async fn process_one(&self, plan_index: usize, plan: &CompositionPlan) -> bool {
        match plan_composer::process_plan(&self.client, plan, plan_index, &self.config).await {
            Ok(stats) => stats.submitted || self.config.dry_run,
            Err(e) => {
                error!("[计划 {}] ❌ 处理过程中发生错误: {}", plan_index, e);
                false
            }
        }
    }
}
