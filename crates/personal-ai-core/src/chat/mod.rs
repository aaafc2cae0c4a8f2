pub mod selector;
pub mod session;

pub use selector::{classify, personalize, pick_template, Category, ResponseSelector};
pub use session::{counter_level, ChatSession, ChatView, CounterLevel, MAX_INPUT_CHARS, SUGGESTIONS};
