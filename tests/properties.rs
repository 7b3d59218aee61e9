use proptest::prelude::*;
use question_set_composer::error::AppResult;
use question_set_composer::models::{CustomQuestion, Draft, QuestionSetPayload, QuestionType};
use question_set_composer::workflow::{basic_info, custom_question, parts};
use question_set_composer::workflow::{BasicInfoAction, Composer, EditorAction, PartsAction, PartsState};
use question_set_composer::QuestionSetGateway;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
struct CountingGateway {
    calls: Arc<AtomicUsize>,
}

impl QuestionSetGateway for CountingGateway {
    async fn create_question_set(&self, _payload: &QuestionSetPayload) -> AppResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "_id": "set1" }))
    }
}

fn arb_question_type() -> impl Strategy<Value = Option<QuestionType>> {
    prop_oneof![
        Just(None),
        Just(Some(QuestionType::Mcq)),
        Just(Some(QuestionType::Written)),
    ]
}

fn mcq_draft(cap: Option<u32>) -> Draft {
    Draft {
        title: "Quiz".into(),
        question_type: Some(QuestionType::Mcq),
        question_bank_type: Some("bt1".into()),
        subjects: vec!["s1".into()],
        question_count: cap,
        ..Draft::default()
    }
}

fn question_id() -> impl Strategy<Value = String> {
    (0..6u8).prop_map(|n| format!("q{}", n))
}

proptest! {
    /// 基本信息有效当且仅当五个条件同时满足
    #[test]
    fn prop_basic_info_validity(
        title in "[ a-z]{0,4}",
        question_type in arb_question_type(),
        bank_type in proptest::option::of("bt[0-9]"),
        subjects in proptest::collection::vec("s[0-9]", 0..3),
        count in proptest::option::of(0..5u32),
    ) {
        let draft = Draft {
            title: title.clone(),
            question_type,
            question_bank_type: bank_type.clone(),
            subjects: subjects.clone(),
            question_count: count,
            ..Draft::default()
        };
        let expected = !title.trim().is_empty()
            && question_type.is_some()
            && bank_type.is_some()
            && !subjects.is_empty()
            && count.map_or(true, |c| c > 0);
        prop_assert_eq!(basic_info::is_valid(&draft), expected);
    }

    /// 切换题库类型总会清空已选科目
    #[test]
    fn prop_switching_bank_type_clears_subjects(
        subjects in proptest::collection::vec("s[0-9]", 0..6),
        next_type in "bt[0-9]",
    ) {
        let mut draft = basic_info::reduce(&Draft::default(), BasicInfoAction::SetQuestionBankType("bt-first".into()));
        for subject in subjects {
            draft = basic_info::reduce(&draft, BasicInfoAction::ToggleSubject(subject));
        }
        let switched = basic_info::reduce(&draft, BasicInfoAction::SetQuestionBankType(next_type));
        prop_assert!(switched.subjects.is_empty());
        prop_assert!(switched.filter_subjects.is_empty());
    }

    /// 任意切换序列都不会超过题量上限
    #[test]
    fn prop_toggles_never_exceed_cap(
        cap in 1..4u32,
        ids in proptest::collection::vec(question_id(), 0..20),
    ) {
        let draft = mcq_draft(Some(cap));
        let mut state = PartsState::new();
        for id in ids {
            if let Ok(next) = parts::reduce(&state, &draft, PartsAction::ToggleQuestion(id)) {
                state = next;
            }
            prop_assert!(state.total() <= cap as usize);
        }
    }

    /// 同一题目切换两次回到原状态
    #[test]
    fn prop_double_toggle_is_identity(
        ids in proptest::collection::vec(question_id(), 0..10),
        target in question_id(),
    ) {
        let draft = mcq_draft(None);
        let mut state = PartsState::new();
        for id in ids {
            state = parts::reduce(&state, &draft, PartsAction::ToggleQuestion(id)).unwrap();
        }
        let once = parts::reduce(&state, &draft, PartsAction::ToggleQuestion(target.clone())).unwrap();
        let twice = parts::reduce(&once, &draft, PartsAction::ToggleQuestion(target)).unwrap();
        prop_assert_eq!(twice.categories[0].questions.clone(), state.categories[0].questions.clone());
    }

    /// 删除正确答案对应的选项后，正确答案被清空
    #[test]
    fn prop_removing_correct_option_clears_answer(
        options in proptest::collection::hash_set("[A-Z][a-z]{0,3}", 2..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let options: Vec<String> = options.into_iter().collect();
        let index = pick.index(options.len());
        let mut question = CustomQuestion::blank("custom-1", QuestionType::Mcq);
        question.options = options.clone();
        question.correct_answer = options[index].clone();

        let next = custom_question::reduce(&question, EditorAction::RemoveOption(index));
        prop_assert_eq!(next.correct_answer, "");
        prop_assert_eq!(next.options.len(), options.len() - 1);
    }

    /// 没有小问的主观题保存时合成唯一一个小问
    #[test]
    fn prop_written_save_synthesizes_one_sub_question(
        text in "[a-z]{1,12}",
        mark in 1..20u32,
    ) {
        let mut question = CustomQuestion::blank("custom-1", QuestionType::Written);
        question.question_text = text.clone();
        question.mark = mark;

        let saved = custom_question::finalize(&question).unwrap();
        prop_assert_eq!(saved.sub_questions.len(), 1);
        prop_assert_eq!(&saved.sub_questions[0].sub_question_text, &text);
        prop_assert_eq!(saved.sub_questions[0].mark, mark);
    }

    /// 没有有效部分时不会调用创建接口
    #[test]
    fn prop_submit_requires_a_valid_part(
        min in 1..6u32,
        picked in 0..6usize,
    ) {
        let gateway = CountingGateway::default();
        let mut composer = Composer::new(gateway.clone());
        for action in [
            BasicInfoAction::SetTitle("Quiz".into()),
            BasicInfoAction::SetType(QuestionType::Mcq),
            BasicInfoAction::SetQuestionBankType("bt1".into()),
            BasicInfoAction::ToggleSubject("s1".into()),
        ] {
            composer.update_basic_info(action).unwrap();
        }
        composer.next().unwrap();
        for action in [
            PartsAction::OpenEditCategory(0),
            PartsAction::SetCategoryMinQuestions(min),
            PartsAction::SaveCategory,
        ] {
            composer.dispatch(action).unwrap();
        }
        for n in 0..picked {
            composer.dispatch(PartsAction::ToggleQuestion(format!("q{}", n))).unwrap();
        }

        tokio_test::block_on(composer.submit()).unwrap();
        let expected = usize::from(picked >= min as usize);
        prop_assert_eq!(gateway.calls.load(Ordering::SeqCst), expected);
    }
}
