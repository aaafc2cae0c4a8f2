pub mod chat;
pub mod config;
pub mod debounce;
pub mod error;
pub mod profile;
pub mod random;
pub mod state;
pub mod store;
pub mod validation;
pub mod wizard;

// Re-export main types for convenience
pub use chat::{ChatSession, ChatView, ResponseSelector};
pub use config::Config;
pub use debounce::Debouncer;
pub use error::{ChatError, FieldError, FormError, StoreError};
pub use profile::{initials_of, Profile, Style};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use state::{Message, Sender};
pub use store::{FileProfileStore, MemoryProfileStore, ProfileStore, STORAGE_KEY};
pub use validation::{validate_field, Feedback, FieldName};
pub use wizard::{FormView, FormWizard, Navigation, NotifyLevel, StepAction, TOTAL_STEPS};
