use question_set_composer::config::Config;
use question_set_composer::error::{AppResult, ValidationError};
use question_set_composer::models::{valid_categories, Category, QuestionSetPayload, QuestionType};
use question_set_composer::workflow::{BasicInfoAction, Composer, EditorAction, PartsAction};
use question_set_composer::{App, QuestionSetGateway, SubmitOutcome};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

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

fn midterm(gateway: CountingGateway, cap: Option<u32>) -> Composer<CountingGateway> {
    let mut composer = Composer::new(gateway);
    for action in [
        BasicInfoAction::SetTitle("Midterm".into()),
        BasicInfoAction::SetType(QuestionType::Mcq),
        BasicInfoAction::SetQuestionBankType("bt1".into()),
        BasicInfoAction::ToggleSubject("s1".into()),
        BasicInfoAction::SetQuestionCount(cap),
    ] {
        composer.update_basic_info(action).expect("基本信息设置失败");
    }
    composer.next().expect("无法进入部分与题目步骤");
    composer
}

fn add_part(composer: &mut Composer<CountingGateway>, name: &str, min: u32) {
    for action in [
        PartsAction::OpenAddCategory,
        PartsAction::SetCategoryName(name.into()),
        PartsAction::SetCategoryMinQuestions(min),
        PartsAction::SaveCategory,
    ] {
        composer.dispatch(action).expect("新增部分失败");
    }
}

#[tokio::test]
async fn cap_blocks_third_question() {
    let mut composer = midterm(CountingGateway::default(), Some(2));
    composer.dispatch(PartsAction::RemoveCategory(0)).unwrap();
    add_part(&mut composer, "Part A", 1);

    composer.dispatch(PartsAction::ToggleQuestion("q1".into())).unwrap();
    composer.dispatch(PartsAction::ToggleQuestion("q2".into())).unwrap();
    let rejected = composer.dispatch(PartsAction::ToggleQuestion("q3".into()));

    assert_eq!(rejected, Err(ValidationError::CapReached { max: 2 }));
    assert_eq!(
        composer.take_notice().as_deref(),
        Some("Maximum 2 questions reached")
    );
    assert_eq!(composer.parts().categories[0].questions, vec!["q1", "q2"]);
}

#[tokio::test]
async fn removing_correct_option_blocks_save_until_reselected() {
    let mut composer = midterm(CountingGateway::default(), None);
    let edit = PartsAction::EditCustomQuestion;

    for action in [
        PartsAction::OpenAddCustomQuestion,
        edit(EditorAction::SetText("Pick one".into())),
        edit(EditorAction::AddOption),
        edit(EditorAction::ChangeOption { index: 0, text: "A".into() }),
        edit(EditorAction::AddOption),
        edit(EditorAction::ChangeOption { index: 1, text: "B".into() }),
        edit(EditorAction::AddOption),
        edit(EditorAction::ChangeOption { index: 2, text: "C".into() }),
        edit(EditorAction::SelectCorrectAnswer("A".into())),
        edit(EditorAction::RemoveOption(0)),
    ] {
        composer.dispatch(action).unwrap();
    }

    let form = composer.parts().question_form.as_ref().unwrap();
    assert_eq!(form.question.options, vec!["B", "C"]);
    assert_eq!(form.question.correct_answer, "");

    assert_eq!(
        composer.dispatch(PartsAction::SaveCustomQuestion),
        Err(ValidationError::MissingCorrectAnswer)
    );

    composer
        .dispatch(edit(EditorAction::SelectCorrectAnswer("B".into())))
        .unwrap();
    composer.dispatch(PartsAction::SaveCustomQuestion).unwrap();
    assert_eq!(composer.parts().categories[0].custom_questions.len(), 1);
}

#[test]
fn part_below_minimum_is_excluded_until_filled() {
    let mut category = Category::new("cat-1", "Part A", 3);
    category.questions = vec!["q1".into(), "q2".into()];
    assert!(valid_categories(std::slice::from_ref(&category)).is_empty());

    category.questions.push("q3".into());
    assert_eq!(valid_categories(&[category]).len(), 1);
}

#[tokio::test]
async fn only_valid_parts_are_submitted() {
    let gateway = CountingGateway::default();
    let mut composer = midterm(gateway.clone(), None);

    // 默认部分要求 3 道题
    for id in ["q1", "q2", "q3"] {
        composer.dispatch(PartsAction::ToggleQuestion(id.into())).unwrap();
    }
    add_part(&mut composer, "Part B", 2);
    composer.dispatch(PartsAction::ToggleQuestion("q4".into())).unwrap();

    let payload = composer.submission().unwrap();
    assert_eq!(payload.categories.len(), 1);
    assert_eq!(payload.categories[0].name, "Part A");

    let outcome = composer.submit().await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Created(_)));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn question_in_one_part_cannot_join_another() {
    let mut composer = midterm(CountingGateway::default(), None);
    composer.dispatch(PartsAction::ToggleQuestion("q1".into())).unwrap();
    add_part(&mut composer, "Part B", 1);

    assert!(matches!(
        composer.dispatch(PartsAction::ToggleQuestion("q1".into())),
        Err(ValidationError::AlreadyAssigned { .. })
    ));
    assert_eq!(composer.parts().total(), 1);
}

const PLAN: &str = r#"
title = "Weekly quiz"
type = "WRITTEN"
questionBankType = "bt1"
subjects = ["s1"]

[[parts]]
name = "Part A"
questions = ["q1"]

[[parts.customQuestions]]
questionText = "Explain the chain rule"
mark = 4
"#;

#[tokio::test]
async fn app_composes_and_submits_plans_from_folder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/question-bank-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "_id": "bt1", "subjects": [{ "_id": "s1", "name": "Math" }] }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "questions": [
                { "_id": "q1", "questionText": "Define a derivative", "type": "WRITTEN",
                  "subQuestions": [{ "_id": "sq1", "subQuestionText": "Define", "mark": 2 }] }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/question-sets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "set9" })))
        .expect(1)
        .mount(&server)
        .await;

    let folder = tempfile::tempdir().unwrap();
    std::fs::write(folder.path().join("01_quiz.toml"), PLAN).unwrap();
    std::fs::write(
        folder.path().join("02_bad_type.toml"),
        PLAN.replace("WRITTEN", "ESSAY"),
    )
    .unwrap();
    std::fs::write(
        folder.path().join("03_foreign_bank.toml"),
        PLAN.replace("\"bt1\"", "\"no-such-bank-type\""),
    )
    .unwrap();
    std::fs::write(folder.path().join("04_broken.toml"), "title = ").unwrap();

    let config = Config {
        api_base_url: server.uri(),
        plan_folder: folder.path().to_string_lossy().to_string(),
        ..Config::default()
    };
    let stats = App::initialize(config).await.unwrap().run().await.unwrap();

    // 无法解析的文件在加载阶段被跳过
    assert_eq!(stats.total, 3);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.failed, 2);

    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .expect("没有提交题集");
    let body: Value = serde_json::from_slice(&post.body).unwrap();
    assert_eq!(body["title"], "Weekly quiz");
    assert_eq!(body["type"], "WRITTEN");
    let custom = &body["categories"][0]["customQuestions"][0];
    assert_eq!(custom["questionText"], "Explain the chain rule");
    assert_eq!(custom["subQuestions"][0]["mark"], 4);
}

#[tokio::test]
async fn missing_plan_folder_is_an_error() {
    let config = Config {
        plan_folder: "/definitely/not/here".into(),
        ..Config::default()
    };
    let app = App::initialize(config).await.unwrap();
    assert!(app.run().await.is_err());
}
