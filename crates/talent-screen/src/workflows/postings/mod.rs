//! Recruiter-side screening questions: the question model, the suggested catalog, the
//! question set editor, and draft/publish persistence for job postings.

pub mod catalog;
pub mod editor;
pub mod question;
pub mod question_set;
pub mod repository;
pub mod router;
pub mod service;

pub use catalog::CatalogEntry;
pub use editor::{EditorError, QuestionPatch, QuestionSetEditor, SuggestedOutcome};
pub use question::{
    revariant, Currency, OptionId, OriginKind, Question, QuestionId, QuestionKind,
    QuestionOption, QuestionOrigin, QuestionVariant, RangeDefaults, RangeSpec, RangeType,
    RangeUnit, RawQuestion,
};
pub use question_set::QuestionSet;
pub use repository::{PostingId, PostingStore};
pub use router::posting_router;
pub use service::{DraftView, PostingEditorService, PostingError};
