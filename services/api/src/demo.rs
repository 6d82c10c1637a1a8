use crate::infra::{
    parse_choices, resolve_content, ChoicePattern, InMemoryResultStore, SAMPLE_SLUG,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use style_quiz::error::AppError;
use style_quiz::quiz::{
    dimension_balances, matching, scoring, top_traits, ContactInfo, ContentError, ContentSource,
    QuizContent, QuizService, ScoreState, Template,
};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON export of the record store (defaults to the bundled sample)
    #[arg(long)]
    pub(crate) content: Option<PathBuf>,
    /// Client slug to resolve within the export
    #[arg(long, default_value = SAMPLE_SLUG)]
    pub(crate) client: String,
    /// Choice sequence, e.g. ABBA; cycled to cover every question
    #[arg(long, value_parser = parse_choices)]
    pub(crate) choices: ChoicePattern,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// JSON export of the record store (defaults to the bundled sample)
    #[arg(long)]
    pub(crate) content: Option<PathBuf>,
    /// Client slug to resolve within the export
    #[arg(long, default_value = SAMPLE_SLUG)]
    pub(crate) client: String,
    /// Choice sequence, e.g. ABBA; cycled to cover every question
    #[arg(long, value_parser = parse_choices, default_value = "A")]
    pub(crate) choices: ChoicePattern,
    /// Respondent name recorded with the results
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Respondent email recorded with the results
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Submit without contact details, like the skip path in the UI
    #[arg(long)]
    pub(crate) skip_contact: bool,
}

/// Rank templates for a choice sequence by running the pure pipeline
/// directly: accumulate, normalize, match.
pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        content,
        client,
        choices,
    } = args;

    let quiz = resolve_content(content.as_deref(), &client)?;

    let mut scores = ScoreState::new();
    for (index, question) in quiz.questions.iter().enumerate() {
        let choice = choices.choice_at(index);
        scoring::accumulate(&mut scores, &question.option(choice).traits);
    }

    println!("Style score for '{}'", quiz.client.name);
    println!(
        "Questions answered: {} | Templates considered: {}",
        quiz.questions.len(),
        quiz.templates.len()
    );

    render_scores(&scores);
    render_ranking(&scores, &quiz.templates);

    Ok(())
}

/// Drive a full session through the service facade, the way the HTTP API
/// does, and print what the respondent would see.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        content,
        client,
        choices,
        name,
        email,
        skip_contact,
    } = args;

    let quiz = resolve_content(content.as_deref(), &client)?;
    let source = Arc::new(FixedContentSource { quiz: quiz.clone() });
    let store = Arc::new(InMemoryResultStore::default());
    let service = QuizService::new(source, store.clone());

    println!("Brand style quiz demo");
    println!("Client: {} ({})", quiz.client.name, quiz.client.slug);
    println!("{}", quiz.client.intro_title);
    println!("{}\n", quiz.client.intro_subtitle);

    let snapshot = service.create_session(&client)?;
    let session_id = snapshot.session_id.clone();
    service.start(&session_id)?;

    for (index, question) in quiz.questions.iter().enumerate() {
        let choice = choices.choice_at(index);
        let option = question.option(choice);
        println!(
            "  {}/{} {} -> {} ({})",
            index + 1,
            quiz.questions.len(),
            question.category,
            option.label,
            choice.label()
        );
        service.choose(&session_id, choice)?;
    }

    let contact = if skip_contact {
        ContactInfo::default()
    } else {
        ContactInfo {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
        }
    };

    let results = service.submit(&session_id, contact)?;

    println!("\nStyle DNA: {}", results.top_traits.join(", "));

    println!("\nDimension balance");
    for balance in &results.dimensions {
        println!(
            "  {:<24} {:>5.1}% {} / {}",
            balance.label, balance.left_percent, balance.left_trait, balance.right_trait
        );
    }

    println!("\nRecommended templates");
    for (index, entry) in results.templates.iter().enumerate() {
        let marker = if index == 0 { "*" } else { " " };
        println!(
            "  {} {:>3}%  {}",
            marker, entry.match_percent, entry.template.name
        );
    }

    let records = store.records();
    println!("\nRecords handed to the store: {}", records.len());
    if let Some(record) = records.first() {
        println!("  Session: {}", record.session_id);
        println!("  Top traits: {}", record.top_traits);
        println!("  Recommended: {}", record.recommended_template);
    }

    Ok(())
}

fn render_scores(scores: &ScoreState) {
    println!("\nRaw trait scores");
    for (name, value) in scores.iter() {
        println!("  {:<12} {:>5.1}", name, value);
    }
    println!("Top traits: {}", top_traits(scores).join(", "));

    println!("\nDimension balance");
    for balance in dimension_balances(scores) {
        println!(
            "  {:<24} {:>5.1}% {} / {}",
            balance.label, balance.left_percent, balance.left_trait, balance.right_trait
        );
    }
}

fn render_ranking(scores: &ScoreState, templates: &[Template]) {
    let profile = scoring::normalize(scores);
    println!("\nTemplate ranking");
    for (index, entry) in matching::rank_templates(&profile, templates).iter().enumerate() {
        let marker = if index == 0 { "*" } else { " " };
        println!(
            "  {} {:>3}%  {}",
            marker, entry.match_percent, entry.template.name
        );
    }
}

struct FixedContentSource {
    quiz: QuizContent,
}

impl ContentSource for FixedContentSource {
    fn load(&self, slug: &str) -> Result<QuizContent, ContentError> {
        if slug == self.quiz.client.slug {
            Ok(self.quiz.clone())
        } else {
            Err(ContentError::ClientNotFound {
                slug: slug.to_string(),
            })
        }
    }
}
