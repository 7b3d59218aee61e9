use crate::error::{AppError, AppResult, FileError};
use crate::models::plan::CompositionPlan;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载组卷计划
pub async fn load_plan(toml_file_path: &Path) -> AppResult<CompositionPlan> {
    let display = toml_file_path.display().to_string();
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&display, e))?;

    let plan: CompositionPlan =
        toml::from_str(&content).map_err(|e| AppError::toml_parse_failed(&display, e))?;

    Ok(plan.with_file_path(display))
}

/// 加载文件夹中所有 TOML 组卷计划
///
/// 单个文件解析失败只记录警告，不影响其它计划。结果按文件名排序。
pub async fn load_all_plans(folder_path: &str) -> AppResult<Vec<CompositionPlan>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut plans = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_plan(&path).await {
            Ok(plan) => {
                tracing::info!("成功加载 {} 个部分, {} 道题", plan.parts.len(), plan.question_total());
                plans.push(plan);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;

    const PLAN: &str = r#"
title = "Midterm"
type = "MCQ"
questionBankType = "bt1"
subjects = ["s1"]
questionCount = 5
difficulty = ["EASY"]

[[parts]]
name = "Part A"
condition = "Answer all questions"
minQuestions = 2
questions = ["q1", "q2"]

[[parts.customQuestions]]
questionText = "Which is prime?"
mark = 2
options = ["4", "7"]
correctAnswer = "7"
"#;

    #[tokio::test]
    async fn loads_plan_and_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("midterm.toml");
        std::fs::write(&path, PLAN).unwrap();

        let plan = load_plan(&path).await.unwrap();
        assert_eq!(plan.title, "Midterm");
        assert_eq!(plan.question_count, Some(5));
        assert_eq!(plan.difficulty, vec![Difficulty::Easy]);
        assert_eq!(plan.parts[0].min_questions, 2);
        assert_eq!(plan.parts[0].custom_questions[0].correct_answer, "7");
        assert_eq!(plan.question_total(), 3);
        assert!(plan.file_path.unwrap().ends_with("midterm.toml"));
    }

    #[tokio::test]
    async fn broken_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), PLAN).unwrap();
        std::fs::write(dir.path().join("b.toml"), "title = ").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let plans = load_all_plans(dir.path().to_str().unwrap()).await.unwrap();
        assert_eq!(plans.len(), 1);
    }

    #[tokio::test]
    async fn missing_folder_is_an_error() {
        let err = load_all_plans("/definitely/not/here").await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::DirectoryNotFound { .. })));
    }
}
