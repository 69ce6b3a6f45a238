pub mod bank;
pub mod fallback;
pub mod rng;
pub mod selector;

pub use bank::{InMemoryQuestionBank, Question, QuestionBank};
pub use selector::{QuestionSampler, Sample, SampleRequest};
