use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use super::content::{ContentError, ContentSource, QuizContent};
use super::domain::Choice;
use super::results::{self, ResultsView};
use super::session::{ContactInfo, QuizPhase, Session, SessionError, SessionEvent};
use super::store::ResultStore;

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> String {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("sess-{id:06}")
}

/// Service composing the content source, the in-memory session registry,
/// and the result store.
pub struct QuizService<C, S> {
    content: Arc<C>,
    store: Arc<S>,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

struct SessionEntry {
    quiz: Arc<QuizContent>,
    session: Session,
}

#[derive(Debug, thiserror::Error)]
pub enum QuizServiceError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("session '{0}' not found")]
    SessionNotFound(String),
    #[error("results are not available until the quiz is submitted")]
    ResultsNotReady,
}

impl<C, S> QuizService<C, S>
where
    C: ContentSource + 'static,
    S: ResultStore + 'static,
{
    pub fn new(content: Arc<C>, store: Arc<S>) -> Self {
        Self {
            content,
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Load the client's quiz and open a session on its intro screen.
    pub fn create_session(&self, slug: &str) -> Result<SessionSnapshot, QuizServiceError> {
        let quiz = Arc::new(self.content.load(slug)?);
        let session = Session::new(next_session_id());
        let snapshot = snapshot_of(&session, &quiz);

        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        sessions.insert(
            session.session_id.clone(),
            SessionEntry { quiz, session },
        );

        Ok(snapshot)
    }

    pub fn start(&self, session_id: &str) -> Result<SessionSnapshot, QuizServiceError> {
        self.apply_event(session_id, SessionEvent::Start)
    }

    pub fn choose(&self, session_id: &str, choice: Choice) -> Result<SessionSnapshot, QuizServiceError> {
        self.apply_event(session_id, SessionEvent::Choose(choice))
    }

    pub fn restart(&self, session_id: &str) -> Result<SessionSnapshot, QuizServiceError> {
        self.apply_event(session_id, SessionEvent::Restart)
    }

    /// Submit-or-skip: finish the session, hand the record to the store,
    /// and return the results.
    ///
    /// A store failure is logged and swallowed; the respondent is never
    /// blocked by persistence.
    pub fn submit(
        &self,
        session_id: &str,
        contact: ContactInfo,
    ) -> Result<ResultsView, QuizServiceError> {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| QuizServiceError::SessionNotFound(session_id.to_string()))?;

        entry
            .session
            .apply(&entry.quiz, SessionEvent::Submit(contact))?;

        if let Some(outcome) = entry.session.outcome.as_ref() {
            let record = results::build_record(
                &entry.session,
                &entry.quiz.client,
                &outcome.ranked,
                Utc::now(),
            );
            if let Err(err) = self.store.save(&record) {
                warn!(
                    session_id = %entry.session.session_id,
                    error = %err,
                    "result record handoff failed; continuing to results"
                );
            }
        }

        results::results_view(&entry.session).ok_or(QuizServiceError::ResultsNotReady)
    }

    pub fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, QuizServiceError> {
        let sessions = self.sessions.lock().expect("session mutex poisoned");
        let entry = sessions
            .get(session_id)
            .ok_or_else(|| QuizServiceError::SessionNotFound(session_id.to_string()))?;
        Ok(snapshot_of(&entry.session, &entry.quiz))
    }

    pub fn results(&self, session_id: &str) -> Result<ResultsView, QuizServiceError> {
        let sessions = self.sessions.lock().expect("session mutex poisoned");
        let entry = sessions
            .get(session_id)
            .ok_or_else(|| QuizServiceError::SessionNotFound(session_id.to_string()))?;
        results::results_view(&entry.session).ok_or(QuizServiceError::ResultsNotReady)
    }

    fn apply_event(
        &self,
        session_id: &str,
        event: SessionEvent,
    ) -> Result<SessionSnapshot, QuizServiceError> {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| QuizServiceError::SessionNotFound(session_id.to_string()))?;

        entry.session.apply(&entry.quiz, event)?;
        Ok(snapshot_of(&entry.session, &entry.quiz))
    }
}

/// Where a session currently stands, shaped for clients driving the quiz.
///
/// Option trait weights never leave the server; the question view carries
/// labels and images only.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: QuizPhase,
    pub client_name: String,
    pub intro_title: String,
    pub intro_subtitle: String,
    pub question_count: usize,
    pub answered: usize,
    pub progress_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<QuestionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub category: String,
    pub option_a: OptionView,
    pub option_b: OptionView,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn snapshot_of(session: &Session, quiz: &QuizContent) -> SessionSnapshot {
    let question_count = quiz.question_count();
    let current_question = match session.phase {
        QuizPhase::Quiz => quiz
            .questions
            .get(session.current_question)
            .map(|question| QuestionView {
                index: session.current_question,
                category: question.category.clone(),
                option_a: OptionView {
                    label: question.option_a.label.clone(),
                    image: question.option_a.image.clone(),
                },
                option_b: OptionView {
                    label: question.option_b.label.clone(),
                    image: question.option_b.image.clone(),
                },
            }),
        _ => None,
    };

    let progress_percent = if question_count > 0 {
        session.current_question as f64 / question_count as f64 * 100.0
    } else {
        0.0
    };

    SessionSnapshot {
        session_id: session.session_id.clone(),
        phase: session.phase,
        client_name: quiz.client.name.clone(),
        intro_title: quiz.client.intro_title.clone(),
        intro_subtitle: quiz.client.intro_subtitle.clone(),
        question_count,
        answered: session.answers.len(),
        progress_percent,
        current_question,
    }
}
