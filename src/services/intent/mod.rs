pub mod completeness;
pub mod extract;
pub mod markup;
pub mod registry;

pub use completeness::is_card_intent_complete;
pub use extract::{ExtractResult, IntentExtractor};
pub use registry::{validate_card, FieldIssue, ValidationFailure};
