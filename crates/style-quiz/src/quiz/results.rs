use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Answer, Client, NormalizedProfile, RankedTemplate, ScoreState, StyleDimension,
};
use super::session::{QuizPhase, Session};

/// How many traits the record's display string carries.
pub const TOP_TRAIT_LIMIT: usize = 4;

/// Trait names by descending raw score, first four.
///
/// Ties keep the order traits were first scored in. This ranking is
/// independent of the normalizer but agrees with it on which traits
/// dominate.
pub fn top_traits(scores: &ScoreState) -> Vec<String> {
    let mut entries: Vec<(&str, f64)> = scores.iter().map(|(name, value)| (name, *value)).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries
        .into_iter()
        .take(TOP_TRAIT_LIMIT)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// The flat record handed to the external result store, one per completed
/// session. Field names follow the store's columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "Client")]
    pub client: Vec<String>,
    #[serde(rename = "Session ID")]
    pub session_id: String,
    #[serde(rename = "Submitted At")]
    pub submitted_at: DateTime<Utc>,
    #[serde(rename = "Scores")]
    pub scores: ScoreState,
    #[serde(rename = "Answers")]
    pub answers: Vec<Answer>,
    #[serde(rename = "Top Traits")]
    pub top_traits: String,
    #[serde(rename = "Recommended Template")]
    pub recommended_template: String,
    #[serde(rename = "Respondent Name")]
    pub respondent_name: String,
    #[serde(rename = "Respondent Email")]
    pub respondent_email: String,
}

/// Serialize a completed session into the store's record shape.
pub fn build_record(
    session: &Session,
    client: &Client,
    ranked: &[RankedTemplate],
    submitted_at: DateTime<Utc>,
) -> ResultRecord {
    ResultRecord {
        client: vec![client.id.clone()],
        session_id: session.session_id.clone(),
        submitted_at,
        scores: session.scores.clone(),
        answers: session.answers.clone(),
        top_traits: top_traits(&session.scores).join(", "),
        recommended_template: ranked
            .first()
            .map(|entry| entry.template.name.clone())
            .unwrap_or_default(),
        respondent_name: session.contact.name.clone(),
        respondent_email: session.contact.email.clone(),
    }
}

/// Raw left/right pull on one bipolar dimension, for the results view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionBalance {
    pub dimension: StyleDimension,
    pub label: &'static str,
    pub left_trait: &'static str,
    pub right_trait: &'static str,
    pub left_score: f64,
    pub right_score: f64,
    pub left_percent: f64,
}

/// Balance of each fixed dimension; traits outside the vocabulary are
/// scored but not visualized. The total floors at 1 so an untouched
/// dimension renders as an even split of zero, not a division by zero.
pub fn dimension_balances(scores: &ScoreState) -> Vec<DimensionBalance> {
    StyleDimension::ordered()
        .iter()
        .map(|dimension| {
            let left_score = scores.get(dimension.trait_name()).copied().unwrap_or(0.0);
            let right_score = scores.get(dimension.opposite()).copied().unwrap_or(0.0);
            let total = (left_score + right_score).max(1.0);

            DimensionBalance {
                dimension: *dimension,
                label: dimension.label(),
                left_trait: dimension.trait_name(),
                right_trait: dimension.opposite(),
                left_score,
                right_score,
                left_percent: left_score / total * 100.0,
            }
        })
        .collect()
}

/// Read-only payload shown once a session reaches results.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsView {
    pub session_id: String,
    pub phase: QuizPhase,
    pub top_traits: Vec<String>,
    pub profile: NormalizedProfile,
    pub dimensions: Vec<DimensionBalance>,
    pub templates: Vec<RankedTemplate>,
    pub answers: Vec<Answer>,
}

/// `None` until the session's outcome has been computed.
pub fn results_view(session: &Session) -> Option<ResultsView> {
    let outcome = session.outcome.as_ref()?;
    Some(ResultsView {
        session_id: session.session_id.clone(),
        phase: session.phase,
        top_traits: outcome.top_traits.clone(),
        profile: outcome.profile.clone(),
        dimensions: dimension_balances(&session.scores),
        templates: outcome.ranked.clone(),
        answers: session.answers.clone(),
    })
}
