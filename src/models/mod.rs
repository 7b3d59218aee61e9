pub mod category;
pub mod draft;
pub mod loaders;
pub mod plan;
pub mod question;
pub mod subject;

pub use category::{total_questions, valid_categories, Category, CategoryStatus};
pub use draft::{Draft, QuestionSetPayload};
pub use loaders::{load_all_plans, load_plan};
pub use plan::{CompositionPlan, PlanCustomQuestion, PlanPart, PlanSubQuestion};
pub use question::{
    BankQuestion, CustomQuestion, Difficulty, Question, QuestionType, QuestionsResponse,
    SubQuestion,
};
pub use subject::{Curriculum, QuestionBankType, Subject};
