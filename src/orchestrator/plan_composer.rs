//! 单个组卷计划处理器 - 编排层
//!
//! ## 职责
//!
//! 把一份 TOML 组卷计划按用户操作的顺序回放到 [`Composer`] 上，
//! 让计划和手工组卷走完全相同的校验。
//!
//! ## 核心功能
//!
//! 1. **基本信息**：标题、题型、题库类型、科目、题量、难度；
//!    题库类型必须存在于目录中，科目只能选该类型下启用的科目
//! 2. **拉取题目**：按科目和题型搜索题库，只允许选择可见的题目
//! 3. **部分回放**：新建/编辑部分，分配题库题目，录入自定义题目
//! 4. **预览**：输出每个部分的题量和总分
//! 5. **提交**：dry run 时跳过
//! 6. **统计输出**：记录分配/录入/被拒绝数量

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{error, info, warn};

use crate::clients::{BankTypeCatalog, QuestionSetGateway, QuestionSource};
use crate::config::Config;
use crate::models::{CompositionPlan, PlanCustomQuestion, PlanPart, QuestionBankType, QuestionType};
use crate::services::{FilteredPool, PoolBrowser, QuestionPool};
use crate::utils::logging::truncate_text;
use crate::workflow::{BasicInfoAction, Composer, EditorAction, PartsAction, SubmitOutcome};

/// 单个计划的处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlanStats {
    /// 分配成功的题库题目
    pub toggled: usize,
    /// 保存成功的自定义题目
    pub custom_added: usize,
    /// 被拒绝的操作
    pub rejected: usize,
    /// 是否已提交（dry run 时为 false）
    pub submitted: bool,
}

/// 处理单个组卷计划
///
/// # 参数
/// - `api`: 题库接口（题库类型目录、题目查询、创建题集）
/// - `plan`: 组卷计划
/// - `plan_index`: 计划序号（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 返回处理统计；计划本身无法组卷或提交失败时返回错误
pub async fn process_plan<C>(
    api: &C,
    plan: &CompositionPlan,
    plan_index: usize,
    config: &Config,
) -> Result<PlanStats>
where
    C: BankTypeCatalog + QuestionSource + QuestionSetGateway + Clone,
{
    log_plan_start(plan_index, plan);

    let mut composer = Composer::new(api.clone());
    let mut stats = PlanStats::default();

    // ========== 第一步：基本信息 ==========
    let catalog = api.list_question_bank_types().await?;
    let bank_type = catalog
        .iter()
        .find(|t| t.id == plan.question_bank_type)
        .ok_or_else(|| {
            anyhow!(
                "[计划 {}] 未知的题库类型: {}",
                plan_index,
                plan.question_bank_type
            )
        })?;
    info!("[计划 {}] 题库类型: {}", plan_index, bank_type.label());

    let subjects = selectable_subjects(bank_type, plan, plan_index, &mut stats);
    for action in basic_info_actions(plan, subjects)? {
        if composer.update_basic_info(action).is_err() {
            stats.rejected += 1;
        }
    }
    if let Err(e) = composer.next() {
        return Err(anyhow!("[计划 {}] 基本信息不完整: {}", plan_index, e));
    }

    // ========== 第二步：拉取题目池 ==========
    let browser = PoolBrowser::new(Arc::new(api.clone()));
    browser.search(composer.draft(), plan.search.as_deref()).await?;
    let pool = browser.snapshot();
    info!(
        "[计划 {}] 题目池: {} 道题",
        plan_index,
        pool.questions().len()
    );

    // ========== 第三步：部分与题目 ==========
    let mut filtered = FilteredPool::new();
    for (part_index, part) in plan.parts.iter().enumerate() {
        if !open_part(&mut composer, part_index, part, plan_index) {
            stats.rejected += 1;
            continue;
        }
        assign_bank_questions(&mut composer, &pool, &mut filtered, part, plan_index, &mut stats);
        for custom in &part.custom_questions {
            add_custom_question(&mut composer, custom, plan_index, &mut stats);
        }
    }

    // ========== 预览 ==========
    if let Some(preview) = composer.preview(pool.questions()) {
        info!(
            "[计划 {}] 预览: {} 个部分, {} 道题, 共 {} 分",
            plan_index,
            preview.sections.len(),
            preview.question_count(),
            preview.total_marks()
        );
        if config.verbose_logging {
            info!("\n{}", preview);
        }
    }

    // ========== 提交 ==========
    if config.dry_run {
        info!("[计划 {}] 💡 dry run 模式，跳过提交", plan_index);
        log_plan_stats(plan_index, &stats);
        return Ok(stats);
    }

    match composer.submit().await? {
        SubmitOutcome::Created(created) => {
            let id = created
                .get("_id")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string();
            info!("[计划 {}] ✓ 题集已创建: {}", plan_index, id);
            stats.submitted = true;
        }
        SubmitOutcome::Rejected(e) => {
            error!("[计划 {}] ❌ 提交被拒绝: {}", plan_index, e);
            stats.rejected += 1;
        }
    }

    log_plan_stats(plan_index, &stats);
    Ok(stats)
}

/// 计划中可选的科目：只保留该题库类型下启用的科目，其余跳过
fn selectable_subjects(
    bank_type: &QuestionBankType,
    plan: &CompositionPlan,
    plan_index: usize,
    stats: &mut PlanStats,
) -> Vec<String> {
    let mut selected = Vec::new();
    for subject_id in &plan.subjects {
        if bank_type.active_subjects().any(|s| &s.id == subject_id) {
            selected.push(subject_id.clone());
            continue;
        }
        match bank_type.subject_name(subject_id) {
            Some(name) => warn!(
                "[计划 {}] ⚠️ 科目 {} ({}) 未启用，跳过",
                plan_index, name, subject_id
            ),
            None => warn!(
                "[计划 {}] ⚠️ 科目 {} 不属于题库类型 {}，跳过",
                plan_index,
                subject_id,
                bank_type.label()
            ),
        }
        stats.rejected += 1;
    }
    selected
}

/// 把计划的基本信息转成操作序列
fn basic_info_actions(
    plan: &CompositionPlan,
    subjects: Vec<String>,
) -> Result<Vec<BasicInfoAction>> {
    let question_type = QuestionType::from_label(&plan.question_type)
        .ok_or_else(|| anyhow!("无法识别的题型: {}", plan.question_type))?;

    let mut actions = vec![
        BasicInfoAction::SetTitle(plan.title.clone()),
        BasicInfoAction::SetType(question_type),
        BasicInfoAction::SetQuestionBankType(plan.question_bank_type.clone()),
    ];
    actions.extend(subjects.into_iter().map(BasicInfoAction::ToggleSubject));
    // 非正数等同于输入框清空
    let count = plan
        .question_count
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0);
    actions.push(BasicInfoAction::SetQuestionCount(count));
    actions.extend(plan.difficulty.iter().copied().map(BasicInfoAction::ToggleDifficulty));
    Ok(actions)
}

/// 准备部分：第一个部分沿用默认部分，其余新建；成功后该部分处于选中状态
fn open_part<G: QuestionSetGateway>(
    composer: &mut Composer<G>,
    part_index: usize,
    part: &PlanPart,
    plan_index: usize,
) -> bool {
    let reuse_default = part_index == 0 && !composer.parts().categories.is_empty();
    let open = if reuse_default {
        PartsAction::OpenEditCategory(0)
    } else {
        PartsAction::OpenAddCategory
    };

    let actions = [
        open,
        PartsAction::SetCategoryName(part.name.clone()),
        PartsAction::SetCategoryCondition(part.condition.clone()),
        PartsAction::SetCategoryMinQuestions(part.min_questions),
        PartsAction::SaveCategory,
    ];
    for action in actions {
        if let Err(e) = composer.dispatch(action) {
            warn!("[计划 {}] ⚠️ 部分 {} 无法保存: {}", plan_index, part.name, e);
            let _ = composer.dispatch(PartsAction::CancelCategory);
            return false;
        }
    }

    if reuse_default && composer.dispatch(PartsAction::SelectCategory(0)).is_err() {
        return false;
    }
    info!("[计划 {}] 📂 部分: {}", plan_index, part.name);
    true
}

/// 分配题库题目；不在当前筛选结果中的题目跳过
fn assign_bank_questions<G: QuestionSetGateway>(
    composer: &mut Composer<G>,
    pool: &QuestionPool,
    filtered: &mut FilteredPool,
    part: &PlanPart,
    plan_index: usize,
    stats: &mut PlanStats,
) {
    let visible = filtered.view(pool, composer.draft());
    for id in &part.questions {
        if !visible.iter().any(|q| &q.id == id) {
            warn!("[计划 {}] ⚠️ 题目 {} 不在题目池中，跳过", plan_index, id);
            stats.rejected += 1;
            continue;
        }
        if composer.parts().is_selected(id) {
            warn!("[计划 {}] ⚠️ 题目 {} 已在当前部分中", plan_index, id);
            continue;
        }
        match composer.dispatch(PartsAction::ToggleQuestion(id.clone())) {
            Ok(()) => stats.toggled += 1,
            Err(e) => {
                warn!("[计划 {}] ⚠️ 题目 {}: {}", plan_index, id, e);
                stats.rejected += 1;
            }
        }
    }
}

/// 通过编辑器录入一道自定义题目
fn add_custom_question<G: QuestionSetGateway>(
    composer: &mut Composer<G>,
    custom: &PlanCustomQuestion,
    plan_index: usize,
    stats: &mut PlanStats,
) {
    if let Err(e) = composer.dispatch(PartsAction::OpenAddCustomQuestion) {
        warn!("[计划 {}] ⚠️ 无法新增自定义题目: {}", plan_index, e);
        stats.rejected += 1;
        return;
    }

    let result = fill_editor(composer, custom)
        .and_then(|_| composer.dispatch(PartsAction::SaveCustomQuestion));
    match result {
        Ok(()) => {
            info!(
                "[计划 {}] ✓ 自定义题目: {}",
                plan_index,
                truncate_text(&custom.question_text, 30)
            );
            stats.custom_added += 1;
        }
        Err(e) => {
            warn!(
                "[计划 {}] ⚠️ 自定义题目未保存 ({}): {}",
                plan_index,
                truncate_text(&custom.question_text, 30),
                e
            );
            let _ = composer.dispatch(PartsAction::CancelCustomQuestion);
            stats.rejected += 1;
        }
    }
}

fn fill_editor<G: QuestionSetGateway>(
    composer: &mut Composer<G>,
    custom: &PlanCustomQuestion,
) -> Result<(), crate::error::ValidationError> {
    let edit = PartsAction::EditCustomQuestion;

    composer.dispatch(edit(EditorAction::SetText(custom.question_text.clone())))?;
    composer.dispatch(edit(EditorAction::SetMark(custom.mark)))?;

    for (index, option) in custom.options.iter().enumerate() {
        composer.dispatch(edit(EditorAction::AddOption))?;
        composer.dispatch(edit(EditorAction::ChangeOption {
            index,
            text: option.clone(),
        }))?;
    }
    if !custom.correct_answer.is_empty() {
        composer.dispatch(edit(EditorAction::SelectCorrectAnswer(
            custom.correct_answer.clone(),
        )))?;
    }

    for sub in &custom.sub_questions {
        composer.dispatch(edit(EditorAction::AddSubQuestion))?;
        // 新小问的ID由编辑器生成，取最后一个
        let id = composer
            .parts()
            .question_form
            .as_ref()
            .and_then(|form| form.question.sub_questions.last())
            .map(|s| s.id.clone());
        if let Some(id) = id {
            composer.dispatch(edit(EditorAction::ChangeSubQuestion {
                id,
                text: Some(sub.text.clone()),
                mark: Some(sub.mark),
            }))?;
        }
    }
    Ok(())
}

// ========== 日志辅助函数 ==========

fn log_plan_start(plan_index: usize, plan: &CompositionPlan) {
    info!("\n{}", "─".repeat(60));
    info!(
        "[计划 {}] 📄 {} ({}, {} 个部分, {} 道题)",
        plan_index,
        plan.title,
        plan.question_type,
        plan.parts.len(),
        plan.question_total()
    );
    if let Some(path) = &plan.file_path {
        info!("[计划 {}] 文件: {}", plan_index, path);
    }
}

fn log_plan_stats(plan_index: usize, stats: &PlanStats) {
    info!(
        "[计划 {}] 📊 分配 {} / 自定义 {} / 拒绝 {}",
        plan_index, stats.toggled, stats.custom_added, stats.rejected
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::QuestionQuery;
    use crate::error::AppResult;
    use crate::models::{BankQuestion, Difficulty, QuestionSetPayload, QuestionsResponse, Subject};
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct FakeApi {
        questions: Vec<BankQuestion>,
        submitted: Arc<Mutex<Vec<QuestionSetPayload>>>,
    }

    fn subject(id: &str, name: &str, is_active: bool) -> Subject {
        Subject {
            id: id.into(),
            name: name.into(),
            is_active,
        }
    }

    impl BankTypeCatalog for FakeApi {
        async fn list_question_bank_types(&self) -> AppResult<Vec<QuestionBankType>> {
            Ok(vec![QuestionBankType {
                id: "bt1".into(),
                curriculum: None,
                subjects: vec![
                    subject("s1", "Math", true),
                    subject("s2", "Latin", false),
                    subject("s3", "Physics", true),
                ],
            }])
        }
    }

    impl QuestionSource for FakeApi {
        async fn fetch_questions(&self, _query: &QuestionQuery) -> AppResult<QuestionsResponse> {
            Ok(QuestionsResponse {
                questions: self.questions.clone(),
                ..QuestionsResponse::default()
            })
        }
    }

    impl QuestionSetGateway for FakeApi {
        async fn create_question_set(&self, payload: &QuestionSetPayload) -> AppResult<Value> {
            self.submitted.lock().unwrap().push(payload.clone());
            Ok(serde_json::json!({ "_id": "set1" }))
        }
    }

    fn bank(id: &str) -> BankQuestion {
        BankQuestion {
            id: id.into(),
            question_text: format!("<p>question {}</p>", id),
            question_type: QuestionType::Mcq,
            options: vec!["A".into(), "B".into()],
            correct_answer: Some("A".into()),
            sub_questions: Vec::new(),
            difficulty: None,
            subject: Some("s1".into()),
            mark: Some(2),
        }
    }

    fn plan(toml_text: &str) -> CompositionPlan {
        toml::from_str(toml_text).unwrap()
    }

    const PLAN: &str = r#"
title = "Midterm"
type = "MCQ"
questionBankType = "bt1"
subjects = ["s1"]
questionCount = 4

[[parts]]
name = "Section 1"
minQuestions = 2
questions = ["q1", "q2", "missing"]

[[parts]]
name = "Section 2"
questions = ["q3"]

[[parts.customQuestions]]
questionText = "2 + 2 = ?"
mark = 3
options = ["3", "4", ""]
correctAnswer = "4"
"#;

    #[tokio::test]
    async fn replays_plan_and_submits() {
        let api = FakeApi {
            questions: vec![bank("q1"), bank("q2"), bank("q3")],
            ..FakeApi::default()
        };
        let stats = process_plan(&api, &plan(PLAN), 1, &Config::default())
            .await
            .unwrap();

        assert_eq!(stats.toggled, 3);
        assert_eq!(stats.custom_added, 1);
        assert_eq!(stats.rejected, 1);
        assert!(stats.submitted);

        let submitted = api.submitted.lock().unwrap();
        let payload = &submitted[0];
        assert_eq!(payload.question_count, Some(4));
        assert_eq!(payload.categories.len(), 2);
        assert_eq!(payload.categories[0].name, "Section 1");
        assert_eq!(payload.categories[0].questions, vec!["q1", "q2"]);
        assert_eq!(payload.categories[1].custom_questions[0].options, vec!["3", "4"]);
        assert_eq!(payload.categories[1].custom_questions[0].correct_answer, "4");
    }

    #[tokio::test]
    async fn cap_rejects_extra_questions() {
        let mut capped = plan(PLAN);
        capped.question_count = Some(2);
        let api = FakeApi {
            questions: vec![bank("q1"), bank("q2"), bank("q3")],
            ..FakeApi::default()
        };
        let stats = process_plan(&api, &capped, 1, &Config::default())
            .await
            .unwrap();

        assert_eq!(stats.toggled, 2);
        assert_eq!(stats.custom_added, 0);
        // missing + q3 + custom question
        assert_eq!(stats.rejected, 3);
        let submitted = api.submitted.lock().unwrap();
        assert_eq!(submitted[0].categories.len(), 1);
    }

    #[tokio::test]
    async fn dry_run_never_submits() {
        let api = FakeApi {
            questions: vec![bank("q1"), bank("q2"), bank("q3")],
            ..FakeApi::default()
        };
        let config = Config {
            dry_run: true,
            ..Config::default()
        };
        let stats = process_plan(&api, &plan(PLAN), 1, &config).await.unwrap();
        assert!(!stats.submitted);
        assert!(api.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_type_fails_the_plan() {
        let mut broken = plan(PLAN);
        broken.question_type = "ESSAY".into();
        let api = FakeApi::default();
        assert!(process_plan(&api, &broken, 1, &Config::default()).await.is_err());
    }

    #[tokio::test]
    async fn plan_without_valid_parts_is_not_submitted() {
        let api = FakeApi {
            questions: vec![bank("q1")],
            ..FakeApi::default()
        };
        let thin = plan(
            r#"
title = "Quiz"
type = "MCQ"
questionBankType = "bt1"
subjects = ["s1"]

[[parts]]
name = "Only"
minQuestions = 3
questions = ["q1"]
"#,
        );
        let stats = process_plan(&api, &thin, 1, &Config::default()).await.unwrap();
        assert!(!stats.submitted);
        assert!(api.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_bank_type_fails_the_plan() {
        let mut foreign = plan(PLAN);
        foreign.question_bank_type = "no-such-bank-type".into();
        let api = FakeApi {
            questions: vec![bank("q1"), bank("q2"), bank("q3")],
            ..FakeApi::default()
        };

        let err = process_plan(&api, &foreign, 1, &Config::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no-such-bank-type"));
        assert!(api.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn inactive_and_foreign_subjects_are_skipped() {
        let mut mixed = plan(PLAN);
        mixed.subjects = vec!["s1".into(), "s2".into(), "ghost-subject".into()];
        let api = FakeApi {
            questions: vec![bank("q1"), bank("q2"), bank("q3")],
            ..FakeApi::default()
        };
        let stats = process_plan(&api, &mixed, 1, &Config::default())
            .await
            .unwrap();

        // s2 + ghost-subject + missing
        assert_eq!(stats.rejected, 3);
        assert!(stats.submitted);
        let submitted = api.submitted.lock().unwrap();
        assert_eq!(submitted[0].subjects, vec!["s1"]);
    }

    #[tokio::test]
    async fn plan_with_no_selectable_subject_fails() {
        let mut ghost = plan(PLAN);
        ghost.subjects = vec!["ghost-subject".into()];
        let api = FakeApi {
            questions: vec![bank("q1")],
            ..FakeApi::default()
        };

        assert!(process_plan(&api, &ghost, 1, &Config::default()).await.is_err());
        assert!(api.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn difficulty_filter_hides_questions_from_assignment() {
        let mut hard_only = plan(PLAN);
        hard_only.difficulty = vec![Difficulty::Hard];
        let mut easy = bank("q2");
        easy.difficulty = Some(Difficulty::Easy);
        let mut hard = bank("q1");
        hard.difficulty = Some(Difficulty::Hard);
        let mut hard3 = bank("q3");
        hard3.difficulty = Some(Difficulty::Hard);
        let api = FakeApi {
            questions: vec![hard, easy, hard3],
            ..FakeApi::default()
        };
        let stats = process_plan(&api, &hard_only, 1, &Config::default())
            .await
            .unwrap();

        // q2 被难度筛掉 + missing
        assert_eq!(stats.toggled, 2);
        assert_eq!(stats.rejected, 2);
        let submitted = api.submitted.lock().unwrap();
        assert!(submitted[0]
            .categories
            .iter()
            .all(|c| !c.questions.contains(&"q2".to_string())));
    }
}
