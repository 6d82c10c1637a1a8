use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use style_quiz::config::ContentConfig;
use style_quiz::error::AppError;
use style_quiz::quiz::content::decode_export;
use style_quiz::quiz::{
    Choice, Client, ContentError, ContentSource, Question, QuizContent, QuizOption, RawQuizExport,
    ResultRecord, ResultStore, StoreError, Template, TraitLevel, TraitMap, TraitWeights,
};

/// Client slug served by the bundled sample content.
pub(crate) const SAMPLE_SLUG: &str = "demo";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Result store that keeps records in memory; the production store lives
/// behind the same trait in an external collaborator.
#[derive(Default, Clone)]
pub(crate) struct InMemoryResultStore {
    records: Arc<Mutex<Vec<ResultRecord>>>,
}

impl ResultStore for InMemoryResultStore {
    fn save(&self, record: &ResultRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("result store mutex poisoned");
        guard.push(record.clone());
        Ok(())
    }
}

impl InMemoryResultStore {
    pub(crate) fn records(&self) -> Vec<ResultRecord> {
        self.records
            .lock()
            .expect("result store mutex poisoned")
            .clone()
    }
}

/// Content source backing the serve/demo commands: either a JSON export of
/// the record store or the bundled sample quiz.
pub(crate) enum AppContentSource {
    Export(RawQuizExport),
    Sample,
}

impl ContentSource for AppContentSource {
    fn load(&self, slug: &str) -> Result<QuizContent, ContentError> {
        match self {
            Self::Export(export) => decode_export(slug, export.clone()),
            Self::Sample if slug == SAMPLE_SLUG => Ok(sample_content()),
            Self::Sample => Err(ContentError::ClientNotFound {
                slug: slug.to_string(),
            }),
        }
    }
}

pub(crate) fn content_source_from_config(
    config: &ContentConfig,
) -> Result<AppContentSource, AppError> {
    match &config.path {
        Some(path) => content_source_from_file(path),
        None => Ok(AppContentSource::Sample),
    }
}

pub(crate) fn content_source_from_file(path: &Path) -> Result<AppContentSource, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let export: RawQuizExport = serde_json::from_str(&raw)?;
    Ok(AppContentSource::Export(export))
}

/// Resolve content for a slug from an optional export file, defaulting to
/// the bundled sample.
pub(crate) fn resolve_content(path: Option<&Path>, slug: &str) -> Result<QuizContent, AppError> {
    let source = match path {
        Some(path) => content_source_from_file(path)?,
        None => AppContentSource::Sample,
    };
    Ok(source.load(slug)?)
}

/// A choice pattern parsed from a string such as `ABBA`.
#[derive(Debug, Clone)]
pub(crate) struct ChoicePattern(Vec<Choice>);

impl ChoicePattern {
    /// Choice for question `index`, cycling the pattern past its end.
    pub(crate) fn choice_at(&self, index: usize) -> Choice {
        self.0[index % self.0.len()]
    }
}

impl Default for ChoicePattern {
    fn default() -> Self {
        Self(vec![Choice::A])
    }
}

pub(crate) fn parse_choices(value: &str) -> Result<ChoicePattern, String> {
    let mut choices = Vec::new();
    for ch in value.trim().chars() {
        match ch.to_ascii_uppercase() {
            'A' => choices.push(Choice::A),
            'B' => choices.push(Choice::B),
            other => return Err(format!("expected only 'A' or 'B', found '{other}'")),
        }
    }
    if choices.is_empty() {
        return Err("choice pattern must not be empty".to_string());
    }
    Ok(ChoicePattern(choices))
}

fn weights(pairs: &[(&str, f64)]) -> TraitWeights {
    pairs
        .iter()
        .map(|(name, weight)| (name.to_string(), *weight))
        .collect()
}

fn levels(pairs: &[(&str, TraitLevel)]) -> TraitMap<TraitLevel> {
    pairs
        .iter()
        .map(|(name, level)| (name.to_string(), *level))
        .collect()
}

/// Bundled quiz touching every bipolar dimension once, so the demo and a
/// bare `serve` have something to run against.
pub(crate) fn sample_content() -> QuizContent {
    let question = |id: &str, order: i64, category: &str, a: QuizOption, b: QuizOption| Question {
        id: id.to_string(),
        order,
        category: category.to_string(),
        option_a: a,
        option_b: b,
    };
    let option = |label: &str, traits: TraitWeights| QuizOption {
        image: None,
        label: label.to_string(),
        traits,
    };

    let questions = vec![
        question(
            "sample-q1",
            1,
            "Layout",
            option(
                "Minimal grid",
                weights(&[("minimal", 1.0), ("geometric", 1.0)]),
            ),
            option(
                "Layered collage",
                weights(&[("rich", 1.0), ("organic", 1.0)]),
            ),
        ),
        question(
            "sample-q2",
            2,
            "Typography",
            option("Bold display type", weights(&[("bold", 1.0)])),
            option("Refined serif", weights(&[("refined", 1.0)])),
        ),
        question(
            "sample-q3",
            3,
            "Color palette",
            option("Warm earth tones", weights(&[("warm", 1.0)])),
            option("Cool blues", weights(&[("cool", 1.0)])),
        ),
        question(
            "sample-q4",
            4,
            "Imagery",
            option("Playful illustration", weights(&[("playful", 1.0)])),
            option("Serious photography", weights(&[("serious", 1.0)])),
        ),
        question(
            "sample-q5",
            5,
            "Texture",
            option(
                "Clean and flat",
                weights(&[("minimal", 1.0), ("bold", 1.0)]),
            ),
            option(
                "Organic grain",
                weights(&[("organic", 1.0), ("warm", 1.0)]),
            ),
        ),
    ];

    let template = |id: &str, order: i64, name: &str, description: &str, profile| Template {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        preview_image: None,
        match_profile: profile,
        order,
    };

    let templates = vec![
        template(
            "sample-t1",
            1,
            "Minimal Editorial",
            "Whitespace, grids, and restrained type.",
            levels(&[
                ("minimal", TraitLevel::High),
                ("geometric", TraitLevel::Medium),
            ]),
        ),
        template(
            "sample-t2",
            2,
            "Warm Organic",
            "Earthy palettes with soft, natural shapes.",
            levels(&[("warm", TraitLevel::High), ("organic", TraitLevel::Medium)]),
        ),
        template(
            "sample-t3",
            3,
            "Bold Statement",
            "Display type and saturated color up front.",
            levels(&[("bold", TraitLevel::High), ("playful", TraitLevel::Medium)]),
        ),
    ];

    QuizContent {
        client: Client {
            id: "sample-client".to_string(),
            name: "Demo Studio".to_string(),
            slug: SAMPLE_SLUG.to_string(),
            logo: None,
            intro_title: "Find Your Brand Style".to_string(),
            intro_subtitle: "Answer a few questions to discover your visual direction".to_string(),
        },
        questions,
        templates,
    }
}
