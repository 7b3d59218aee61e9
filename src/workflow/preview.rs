//! 试卷预览
//!
//! 纯投影：按学生看到的样子展示当前各部分的题目，不修改任何输入。
//! 每个部分先列题库题目（找不到的ID直接跳过），再列自定义题目。

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::models::{BankQuestion, Category, Question, QuestionType};

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^>]+>").expect("HTML 标签正则无效")
});

/// 预览中的一个部分
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSection<'a> {
    pub name: &'a str,
    pub condition: &'a str,
    pub questions: Vec<Question<'a>>,
}

impl PreviewSection<'_> {
    pub fn total_marks(&self) -> u32 {
        self.questions
            .iter()
            .fold(0u32, |acc, q| acc.saturating_add(q.marks()))
    }
}

/// 整卷预览
#[derive(Debug, Clone, PartialEq)]
pub struct Preview<'a> {
    pub title: &'a str,
    pub question_type: QuestionType,
    pub sections: Vec<PreviewSection<'a>>,
}

impl Preview<'_> {
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    pub fn total_marks(&self) -> u32 {
        self.sections
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.total_marks()))
    }
}

/// 生成预览
pub fn render_preview<'a>(
    bank_questions: &'a [BankQuestion],
    categories: &'a [Category],
    title: &'a str,
    question_type: QuestionType,
) -> Preview<'a> {
    let by_id: HashMap<&str, &BankQuestion> =
        bank_questions.iter().map(|q| (q.id.as_str(), q)).collect();

    let sections = categories
        .iter()
        .map(|category| {
            let bank = category
                .questions
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).copied())
                .map(Question::Bank);
            let custom = category.custom_questions.iter().map(Question::Custom);
            PreviewSection {
                name: &category.name,
                condition: &category.condition,
                questions: bank.chain(custom).collect(),
            }
        })
        .collect();

    Preview {
        title,
        question_type,
        sections,
    }
}

/// 去掉题干中的 HTML 标签，用于纯文本展示
pub fn plain_text(html: &str) -> String {
    HTML_TAG.replace_all(html, "").trim().to_string()
}

/// 序号转字母：A..Z 之后是 AA, AB, ...
fn letter_label(index: usize, first: u8) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push((first + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

fn option_label(index: usize) -> String {
    letter_label(index, b'A')
}

fn sub_question_label(index: usize) -> String {
    letter_label(index, b'a')
}

fn marks_label(marks: u32) -> String {
    if marks == 1 {
        "1 mark".to_string()
    } else {
        format!("{} marks", marks)
    }
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.title, self.question_type)?;
        writeln!(
            f,
            "{} questions, {}",
            self.question_count(),
            marks_label(self.total_marks())
        )?;

        let mut number = 0;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "== {} [{}] ==", section.name, marks_label(section.total_marks()))?;
            if !section.condition.is_empty() {
                writeln!(f, "{}", section.condition)?;
            }
            for question in &section.questions {
                number += 1;
                writeln!(
                    f,
                    "{}. {} [{}]",
                    number,
                    plain_text(question.text()),
                    marks_label(question.marks())
                )?;
                let correct = question.correct_answer();
                for (i, option) in question.options().iter().enumerate() {
                    let mark = if Some(option.as_str()) == correct { " ✓" } else { "" };
                    writeln!(f, "   {}. {}{}", option_label(i), option, mark)?;
                }
                for (i, sub) in question.sub_questions().iter().enumerate() {
                    writeln!(
                        f,
                        "   ({}) {} [{}]",
                        sub_question_label(i),
                        plain_text(&sub.sub_question_text),
                        marks_label(sub.mark)
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// 预览模式下的作答记录
///
/// 只用于界面反馈，按题目键（或小问ID）记录所选答案。
#[derive(Debug, Clone, Default)]
pub struct PreviewSession {
    selected: HashMap<String, String>,
}

impl PreviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, key: impl Into<String>, answer: impl Into<String>) {
        self.selected.insert(key.into(), answer.into());
    }

    pub fn selected(&self, key: &str) -> Option<&str> {
        self.selected.get(key).map(String::as_str)
    }

    /// 所选答案是否正确；未作答或题目没有标准答案时为 `None`
    pub fn is_correct(&self, question: &Question<'_>) -> Option<bool> {
        let answer = self.selected(question.key())?;
        let correct = question.correct_answer()?;
        Some(answer == correct)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
