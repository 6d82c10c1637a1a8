use serde::{Deserialize, Serialize};

use super::content::QuizContent;
use super::domain::{Answer, Choice, NormalizedProfile, RankedTemplate, ScoreState};
use super::{matching, results, scoring};

/// Phases a session moves through. `Intro` is initial; `Results` is
/// terminal except for an explicit restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    Intro,
    Quiz,
    Contact,
    Results,
}

impl QuizPhase {
    pub const fn ordered() -> [Self; 4] {
        [Self::Intro, Self::Quiz, Self::Contact, Self::Results]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Intro => "Intro",
            Self::Quiz => "Quiz",
            Self::Contact => "Contact",
            Self::Results => "Results",
        }
    }
}

/// Optional free-text contact details collected before results.
///
/// Both fields are accepted as given; skipping the screen submits the
/// empty default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Inputs the state machine reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Start,
    Choose(Choice),
    Submit(ContactInfo),
    Restart,
}

impl SessionEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Choose(_) => "choose",
            Self::Submit(_) => "submit",
            Self::Restart => "restart",
        }
    }
}

/// What a successfully applied event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Intro → Quiz at the first question.
    Started,
    /// Choice recorded; the quiz advanced to `next_question`.
    Recorded { next_question: usize },
    /// Choice recorded on the last question; now collecting contact info.
    AwaitingContact,
    /// Contact submitted (or skipped); the outcome is computed.
    Completed,
    /// Duplicate choice arrived while one was still being processed.
    Ignored,
    /// Results → Intro with all per-run state cleared.
    Restarted,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("event '{event}' not accepted in phase '{phase}'")]
    UnexpectedEvent {
        phase: &'static str,
        event: &'static str,
    },
    #[error("question index {index} outside the loaded quiz")]
    QuestionOutOfRange { index: usize },
}

/// Profile and ranking computed exactly once when the quiz is submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizOutcome {
    pub profile: NormalizedProfile,
    pub ranked: Vec<RankedTemplate>,
    pub top_traits: Vec<String>,
}

/// One respondent's pass through a quiz.
///
/// The id is generated once and survives restarts; everything else is
/// per-run state owned by the transition handling below.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub phase: QuizPhase,
    pub current_question: usize,
    pub scores: ScoreState,
    pub answers: Vec<Answer>,
    pub contact: ContactInfo,
    pub outcome: Option<QuizOutcome>,
    pub(crate) processing: bool,
}

impl Session {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            phase: QuizPhase::Intro,
            current_question: 0,
            scores: ScoreState::new(),
            answers: Vec::new(),
            contact: ContactInfo::default(),
            outcome: None,
            processing: false,
        }
    }

    /// Apply one event against the loaded quiz content.
    ///
    /// All session mutation happens here, inside the handling of a single
    /// event. Events that the current phase cannot accept are rejected;
    /// the one silent no-op is a duplicate choice caught by the
    /// in-flight guard.
    pub fn apply(
        &mut self,
        content: &QuizContent,
        event: SessionEvent,
    ) -> Result<Transition, SessionError> {
        let event_name = event.name();
        match (self.phase, event) {
            (QuizPhase::Intro, SessionEvent::Start) => {
                self.phase = QuizPhase::Quiz;
                self.current_question = 0;
                Ok(Transition::Started)
            }
            (QuizPhase::Quiz, SessionEvent::Choose(choice)) => self.record_choice(content, choice),
            (QuizPhase::Contact, SessionEvent::Submit(contact)) => {
                self.complete(content, contact);
                Ok(Transition::Completed)
            }
            (QuizPhase::Results, SessionEvent::Restart) => {
                self.reset();
                Ok(Transition::Restarted)
            }
            (phase, _) => Err(SessionError::UnexpectedEvent {
                phase: phase.label(),
                event: event_name,
            }),
        }
    }

    /// Side effects of a choice, in order: accumulate the chosen option's
    /// traits, append the answer, then advance or move to contact.
    fn record_choice(
        &mut self,
        content: &QuizContent,
        choice: Choice,
    ) -> Result<Transition, SessionError> {
        if self.processing {
            return Ok(Transition::Ignored);
        }

        let question = content
            .questions
            .get(self.current_question)
            .ok_or(SessionError::QuestionOutOfRange {
                index: self.current_question,
            })?;

        self.processing = true;

        let option = question.option(choice);
        scoring::accumulate(&mut self.scores, &option.traits);
        self.answers.push(Answer {
            question_id: question.id.clone(),
            category: question.category.clone(),
            choice,
            choice_label: option.label.clone(),
        });

        let transition = if self.current_question + 1 < content.questions.len() {
            self.current_question += 1;
            Transition::Recorded {
                next_question: self.current_question,
            }
        } else {
            self.phase = QuizPhase::Contact;
            Transition::AwaitingContact
        };

        self.processing = false;
        Ok(transition)
    }

    /// Submit-or-skip: store the contact as given and compute the outcome.
    /// The accumulator never runs here; recomputation of an existing
    /// outcome is skipped.
    fn complete(&mut self, content: &QuizContent, contact: ContactInfo) {
        self.contact = contact;
        if self.outcome.is_none() {
            let profile = scoring::normalize(&self.scores);
            let ranked = matching::rank_templates(&profile, &content.templates);
            let top_traits = results::top_traits(&self.scores);
            self.outcome = Some(QuizOutcome {
                profile,
                ranked,
                top_traits,
            });
        }
        self.phase = QuizPhase::Results;
    }

    /// Clear every per-run field; the session id is kept.
    fn reset(&mut self) {
        self.phase = QuizPhase::Intro;
        self.current_question = 0;
        self.scores = ScoreState::new();
        self.answers.clear();
        self.contact = ContactInfo::default();
        self.outcome = None;
        self.processing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::content::QuizContent;
    use crate::quiz::domain::{Client, Question, QuizOption, Template, TraitLevel, TraitWeights};

    fn option(label: &str, traits: &[(&str, f64)]) -> QuizOption {
        QuizOption {
            image: None,
            label: label.to_string(),
            traits: traits
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect::<TraitWeights>(),
        }
    }

    fn content() -> QuizContent {
        let questions = (1..=3i64)
            .map(|order| Question {
                id: format!("q{order}"),
                order,
                category: format!("Question {order}"),
                option_a: option("Minimal", &[("minimal", 1.0)]),
                option_b: option("Rich", &[("rich", 1.0)]),
            })
            .collect();

        let template = |id: &str, level: TraitLevel| Template {
            id: id.to_string(),
            name: format!("Template {id}"),
            description: String::new(),
            preview_image: None,
            match_profile: [("minimal".to_string(), level)].into_iter().collect(),
            order: 0,
        };

        QuizContent {
            client: Client {
                id: "client-1".to_string(),
                name: "Acme".to_string(),
                slug: "acme".to_string(),
                logo: None,
                intro_title: "Find Your Brand Style".to_string(),
                intro_subtitle: "A couple of minutes".to_string(),
            },
            questions,
            templates: vec![
                template("fit", TraitLevel::High),
                template("miss", TraitLevel::Low),
            ],
        }
    }

    fn run_to_contact(session: &mut Session, content: &QuizContent) {
        session.apply(content, SessionEvent::Start).expect("start");
        for _ in 0..content.questions.len() {
            session
                .apply(content, SessionEvent::Choose(Choice::A))
                .expect("choice");
        }
    }

    #[test]
    fn start_moves_into_quiz_at_first_question() {
        let content = content();
        let mut session = Session::new("sess-1");

        let transition = session.apply(&content, SessionEvent::Start).expect("start");
        assert_eq!(transition, Transition::Started);
        assert_eq!(session.phase, QuizPhase::Quiz);
        assert_eq!(session.current_question, 0);
    }

    #[test]
    fn choices_accumulate_and_advance_in_order() {
        let content = content();
        let mut session = Session::new("sess-1");
        session.apply(&content, SessionEvent::Start).expect("start");

        let first = session
            .apply(&content, SessionEvent::Choose(Choice::A))
            .expect("first choice");
        assert_eq!(first, Transition::Recorded { next_question: 1 });
        assert_eq!(session.scores.get("minimal"), Some(&1.0));
        assert_eq!(session.answers.len(), 1);
        assert_eq!(session.answers[0].choice_label, "Minimal");

        session
            .apply(&content, SessionEvent::Choose(Choice::B))
            .expect("second choice");
        let last = session
            .apply(&content, SessionEvent::Choose(Choice::A))
            .expect("last choice");
        assert_eq!(last, Transition::AwaitingContact);
        assert_eq!(session.phase, QuizPhase::Contact);
        assert_eq!(session.scores.get("minimal"), Some(&2.0));
        assert_eq!(session.scores.get("rich"), Some(&1.0));
    }

    #[test]
    fn duplicate_choice_is_ignored_while_processing() {
        let content = content();
        let mut session = Session::new("sess-1");
        session.apply(&content, SessionEvent::Start).expect("start");

        session.processing = true;
        let transition = session
            .apply(&content, SessionEvent::Choose(Choice::A))
            .expect("guarded choice");
        assert_eq!(transition, Transition::Ignored);
        assert!(session.scores.is_empty());
        assert!(session.answers.is_empty());
        assert_eq!(session.current_question, 0);
    }

    #[test]
    fn submit_computes_outcome_once_and_moves_to_results() {
        let content = content();
        let mut session = Session::new("sess-1");
        run_to_contact(&mut session, &content);

        let transition = session
            .apply(&content, SessionEvent::Submit(ContactInfo::default()))
            .expect("submit");
        assert_eq!(transition, Transition::Completed);
        assert_eq!(session.phase, QuizPhase::Results);

        let outcome = session.outcome.as_ref().expect("outcome computed");
        assert_eq!(outcome.profile.get("minimal"), Some(&TraitLevel::High));
        assert_eq!(outcome.ranked[0].template.id, "fit");
        assert_eq!(outcome.ranked[0].match_percent, 100);
        assert_eq!(outcome.ranked[1].match_percent, 0);
        assert_eq!(outcome.top_traits, vec!["minimal".to_string()]);
    }

    #[test]
    fn skip_funnels_through_the_same_transition() {
        let content = content();
        let mut session = Session::new("sess-1");
        run_to_contact(&mut session, &content);

        session
            .apply(&content, SessionEvent::Submit(ContactInfo::default()))
            .expect("skip submits empty contact");
        assert_eq!(session.phase, QuizPhase::Results);
        assert_eq!(session.contact, ContactInfo::default());
    }

    #[test]
    fn events_out_of_phase_are_rejected() {
        let content = content();
        let mut session = Session::new("sess-1");

        let err = session
            .apply(&content, SessionEvent::Choose(Choice::A))
            .expect_err("choice before start");
        assert!(matches!(err, SessionError::UnexpectedEvent { .. }));

        let err = session
            .apply(&content, SessionEvent::Restart)
            .expect_err("restart before results");
        assert!(matches!(err, SessionError::UnexpectedEvent { .. }));
    }

    #[test]
    fn restart_resets_everything_but_the_id() {
        let content = content();
        let mut session = Session::new("sess-1");
        run_to_contact(&mut session, &content);
        session
            .apply(
                &content,
                SessionEvent::Submit(ContactInfo {
                    name: "Sam".to_string(),
                    email: "sam@example.com".to_string(),
                }),
            )
            .expect("submit");

        session
            .apply(&content, SessionEvent::Restart)
            .expect("restart");

        assert_eq!(session.session_id, "sess-1");
        assert_eq!(session.phase, QuizPhase::Intro);
        assert_eq!(session.current_question, 0);
        assert!(session.scores.is_empty());
        assert!(session.answers.is_empty());
        assert_eq!(session.contact, ContactInfo::default());
        assert!(session.outcome.is_none());
    }

    #[test]
    fn rerun_after_restart_matches_a_fresh_session() {
        let content = content();

        let mut restarted = Session::new("sess-1");
        run_to_contact(&mut restarted, &content);
        restarted
            .apply(&content, SessionEvent::Submit(ContactInfo::default()))
            .expect("submit");
        restarted
            .apply(&content, SessionEvent::Restart)
            .expect("restart");
        run_to_contact(&mut restarted, &content);

        let mut fresh = Session::new("sess-2");
        run_to_contact(&mut fresh, &content);

        assert_eq!(restarted.scores, fresh.scores);
        assert_eq!(restarted.answers.len(), fresh.answers.len());
    }
}
