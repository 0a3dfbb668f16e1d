pub mod enums;
pub mod questionnaire;
pub mod triage_result;

pub use enums::*;
pub use questionnaire::*;
pub use triage_result::*;
