use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::domain::{Client, Question, QuizOption, Template, TraitLevel, TraitMap, TraitWeights};

/// Intro copy used when the client record leaves the fields blank.
pub const DEFAULT_INTRO_TITLE: &str = "Find Your Brand Style";
pub const DEFAULT_INTRO_SUBTITLE: &str = "Answer a few questions to discover your visual direction";

/// Everything the state machine needs for one loaded quiz: the client, the
/// ordered active questions, and the candidate templates.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizContent {
    pub client: Client,
    pub questions: Vec<Question>,
    pub templates: Vec<Template>,
}

impl QuizContent {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("no active quiz found for client '{slug}'")]
    ClientNotFound { slug: String },
    #[error("no active questions configured for this client")]
    NoQuestions,
    #[error("content source unavailable: {0}")]
    Unavailable(String),
}

/// Collaborator that resolves quiz content for a client slug.
///
/// The record store behind it is out of scope; adapters supply in-memory or
/// file-backed content.
pub trait ContentSource: Send + Sync {
    fn load(&self, slug: &str) -> Result<QuizContent, ContentError>;
}

/// A record as the external store exports it: opaque id plus named fields.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord<F> {
    pub id: String,
    pub fields: F,
}

/// Attachment shape used for option images.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAttachment {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnails: Option<RawThumbnails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawThumbnails {
    #[serde(default)]
    pub large: Option<RawThumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawThumbnail {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawClientFields {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Slug")]
    pub slug: String,
    #[serde(rename = "Logo URL", default, deserialize_with = "empty_string_as_none")]
    pub logo: Option<String>,
    #[serde(rename = "Active", default)]
    pub active: bool,
    #[serde(
        rename = "Intro Title",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub intro_title: Option<String>,
    #[serde(
        rename = "Intro Subtitle",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub intro_subtitle: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestionFields {
    #[serde(rename = "Client", default)]
    pub client: Vec<String>,
    #[serde(rename = "Order", default)]
    pub order: i64,
    #[serde(rename = "Question Text", default)]
    pub category: String,
    #[serde(rename = "Option A Image", default)]
    pub option_a_image: Vec<RawAttachment>,
    #[serde(rename = "Option A Description", default)]
    pub option_a_label: String,
    #[serde(rename = "Option A Traits", default)]
    pub option_a_traits: Option<String>,
    #[serde(rename = "Option B Image", default)]
    pub option_b_image: Vec<RawAttachment>,
    #[serde(rename = "Option B Description", default)]
    pub option_b_label: String,
    #[serde(rename = "Option B Traits", default)]
    pub option_b_traits: Option<String>,
    #[serde(rename = "Active", default)]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTemplateFields {
    #[serde(rename = "Client", default)]
    pub client: Vec<String>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(
        rename = "Preview Image",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub preview_image: Option<String>,
    #[serde(rename = "Match Profile", default)]
    pub match_profile: Option<String>,
    #[serde(rename = "Order", default)]
    pub order: i64,
}

/// One full export of a client's quiz content.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuizExport {
    #[serde(default)]
    pub clients: Vec<RawRecord<RawClientFields>>,
    #[serde(default)]
    pub questions: Vec<RawRecord<RawQuestionFields>>,
    #[serde(default)]
    pub templates: Vec<RawRecord<RawTemplateFields>>,
}

/// Resolve one client's quiz from a raw export.
///
/// Questions and templates are filtered to the client and (for questions)
/// to active records, then sorted ascending by order. A client with no
/// active questions is unusable and reported as such.
pub fn decode_export(slug: &str, export: RawQuizExport) -> Result<QuizContent, ContentError> {
    let client_record = export
        .clients
        .into_iter()
        .find(|record| record.fields.active && record.fields.slug == slug)
        .ok_or_else(|| ContentError::ClientNotFound {
            slug: slug.to_string(),
        })?;

    let client = decode_client(client_record);
    let questions = decode_questions(&client.id, export.questions);
    if questions.is_empty() {
        return Err(ContentError::NoQuestions);
    }
    let templates = decode_templates(&client.id, export.templates);

    Ok(QuizContent {
        client,
        questions,
        templates,
    })
}

pub fn decode_client(record: RawRecord<RawClientFields>) -> Client {
    let fields = record.fields;
    Client {
        id: record.id,
        name: fields.name,
        slug: fields.slug,
        logo: fields.logo,
        intro_title: fields
            .intro_title
            .unwrap_or_else(|| DEFAULT_INTRO_TITLE.to_string()),
        intro_subtitle: fields
            .intro_subtitle
            .unwrap_or_else(|| DEFAULT_INTRO_SUBTITLE.to_string()),
    }
}

pub fn decode_questions(
    client_id: &str,
    records: Vec<RawRecord<RawQuestionFields>>,
) -> Vec<Question> {
    let mut questions: Vec<Question> = records
        .into_iter()
        .filter(|record| {
            record.fields.active && record.fields.client.iter().any(|link| link == client_id)
        })
        .map(|record| {
            let fields = record.fields;
            Question {
                order: fields.order,
                category: fields.category,
                option_a: QuizOption {
                    image: attachment_url(&fields.option_a_image),
                    label: fields.option_a_label,
                    traits: decode_weights(&record.id, fields.option_a_traits.as_deref()),
                },
                option_b: QuizOption {
                    image: attachment_url(&fields.option_b_image),
                    label: fields.option_b_label,
                    traits: decode_weights(&record.id, fields.option_b_traits.as_deref()),
                },
                id: record.id,
            }
        })
        .collect();

    questions.sort_by_key(|question| question.order);
    questions
}

pub fn decode_templates(
    client_id: &str,
    records: Vec<RawRecord<RawTemplateFields>>,
) -> Vec<Template> {
    let mut templates: Vec<Template> = records
        .into_iter()
        .filter(|record| record.fields.client.iter().any(|link| link == client_id))
        .map(|record| {
            let fields = record.fields;
            Template {
                name: fields.name,
                description: fields.description,
                preview_image: fields.preview_image,
                match_profile: decode_levels(&record.id, fields.match_profile.as_deref()),
                order: fields.order,
                id: record.id,
            }
        })
        .collect();

    templates.sort_by_key(|template| template.order);
    templates
}

/// First attachment's URL, falling back to its large thumbnail.
pub fn attachment_url(attachments: &[RawAttachment]) -> Option<String> {
    let first = attachments.first()?;
    first.url.clone().or_else(|| {
        first
            .thumbnails
            .as_ref()
            .and_then(|thumbnails| thumbnails.large.as_ref())
            .and_then(|large| large.url.clone())
    })
}

/// Trait weights arrive as a JSON object in a text field. A value that
/// fails to decode becomes an empty mapping; one bad record never aborts
/// the quiz.
fn decode_weights(record_id: &str, raw: Option<&str>) -> TraitWeights {
    decode_trait_field(record_id, raw, "trait weights")
}

fn decode_levels(record_id: &str, raw: Option<&str>) -> TraitMap<TraitLevel> {
    decode_trait_field(record_id, raw, "match profile")
}

fn decode_trait_field<V: for<'de> Deserialize<'de>>(
    record_id: &str,
    raw: Option<&str>,
    what: &str,
) -> TraitMap<V> {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return TraitMap::new();
    };

    match serde_json::from_str(raw) {
        Ok(map) => map,
        Err(err) => {
            debug!(record_id, error = %err, "{what} failed to decode; treating as empty");
            TraitMap::new()
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_record(id: &str, order: i64, active: bool, traits_a: &str) -> RawRecord<RawQuestionFields> {
        RawRecord {
            id: id.to_string(),
            fields: RawQuestionFields {
                client: vec!["client-1".to_string()],
                order,
                category: format!("Question {order}"),
                option_a_image: Vec::new(),
                option_a_label: "Left".to_string(),
                option_a_traits: Some(traits_a.to_string()),
                option_b_image: Vec::new(),
                option_b_label: "Right".to_string(),
                option_b_traits: None,
                active,
            },
        }
    }

    #[test]
    fn questions_are_filtered_and_sorted() {
        let records = vec![
            question_record("q2", 2, true, r#"{"bold": 1}"#),
            question_record("q3", 3, false, r#"{"warm": 1}"#),
            question_record("q1", 1, true, r#"{"minimal": 1}"#),
        ];

        let questions = decode_questions("client-1", records);
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
    }

    #[test]
    fn questions_for_other_clients_are_dropped() {
        let mut foreign = question_record("q9", 1, true, "{}");
        foreign.fields.client = vec!["client-2".to_string()];

        let questions = decode_questions("client-1", vec![foreign]);
        assert!(questions.is_empty());
    }

    #[test]
    fn malformed_trait_weights_become_empty() {
        let records = vec![question_record("q1", 1, true, "{not json")];
        let questions = decode_questions("client-1", records);

        assert!(questions[0].option_a.traits.is_empty());
        assert!(questions[0].option_b.traits.is_empty());
    }

    #[test]
    fn attachment_url_prefers_direct_url() {
        let attachments = vec![RawAttachment {
            url: Some("https://cdn.example/full.png".to_string()),
            thumbnails: Some(RawThumbnails {
                large: Some(RawThumbnail {
                    url: Some("https://cdn.example/thumb.png".to_string()),
                }),
            }),
        }];

        assert_eq!(
            attachment_url(&attachments).as_deref(),
            Some("https://cdn.example/full.png")
        );
    }

    #[test]
    fn attachment_url_falls_back_to_large_thumbnail() {
        let attachments = vec![RawAttachment {
            url: None,
            thumbnails: Some(RawThumbnails {
                large: Some(RawThumbnail {
                    url: Some("https://cdn.example/thumb.png".to_string()),
                }),
            }),
        }];

        assert_eq!(
            attachment_url(&attachments).as_deref(),
            Some("https://cdn.example/thumb.png")
        );
        assert_eq!(attachment_url(&[]), None);
    }

    #[test]
    fn client_intro_copy_falls_back_to_defaults() {
        let client = decode_client(RawRecord {
            id: "client-1".to_string(),
            fields: RawClientFields {
                name: "Acme".to_string(),
                slug: "acme".to_string(),
                logo: None,
                active: true,
                intro_title: None,
                intro_subtitle: None,
            },
        });

        assert_eq!(client.intro_title, DEFAULT_INTRO_TITLE);
        assert_eq!(client.intro_subtitle, DEFAULT_INTRO_SUBTITLE);
    }
}
