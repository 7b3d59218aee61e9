pub mod basic_info;
pub mod composer;
pub mod custom_question;
pub mod parts;
pub mod preview;

pub use basic_info::BasicInfoAction;
pub use composer::{Composer, ComposerState, Step, SubmitOutcome};
pub use custom_question::EditorAction;
pub use parts::{build_submission, CategoryForm, PartsAction, PartsState, QuestionForm};
pub use preview::{plain_text, render_preview, Preview, PreviewSection, PreviewSession};
