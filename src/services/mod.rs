pub mod question_pool;
pub mod search_sequencer;

pub use question_pool::{filter_questions, FilteredPool, PoolBrowser, QuestionPool};
pub use search_sequencer::{SearchSequencer, SearchToken, Sequenced};
