//! The quiz engine: domain model, scoring, matching, session sequencing,
//! content decoding, and the collaborator boundaries for content and
//! result persistence.

pub mod content;
pub mod domain;
pub mod matching;
pub mod results;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod store;

pub use content::{ContentError, ContentSource, QuizContent, RawQuizExport};
pub use domain::{
    Answer, Choice, Client, NormalizedProfile, Question, QuizOption, RankedTemplate, ScoreState,
    StyleDimension, Template, TraitLevel, TraitMap, TraitWeights,
};
pub use results::{
    build_record, dimension_balances, results_view, top_traits, DimensionBalance, ResultRecord,
    ResultsView,
};
pub use router::quiz_router;
pub use service::{OptionView, QuestionView, QuizService, QuizServiceError, SessionSnapshot};
pub use session::{
    ContactInfo, QuizOutcome, QuizPhase, Session, SessionError, SessionEvent, Transition,
};
pub use store::{ResultStore, StoreError};
