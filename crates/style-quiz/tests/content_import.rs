//! Decoding a raw record-store export into playable quiz content.

use style_quiz::quiz::content::{decode_export, RawQuizExport};
use style_quiz::quiz::{ContentError, TraitLevel};

fn export_json() -> serde_json::Value {
    serde_json::json!({
        "clients": [
            {
                "id": "rec-client-1",
                "fields": {
                    "Name": "Story to Story",
                    "Slug": "story",
                    "Active": true,
                    "Intro Title": "Find Your Brand Style"
                }
            },
            {
                "id": "rec-client-2",
                "fields": { "Name": "Dormant", "Slug": "dormant", "Active": false }
            }
        ],
        "questions": [
            {
                "id": "rec-q2",
                "fields": {
                    "Client": ["rec-client-1"],
                    "Order": 2,
                    "Question Text": "Typography",
                    "Option A Description": "Bold display",
                    "Option A Traits": "{\"bold\": 2}",
                    "Option B Description": "Refined serif",
                    "Option B Traits": "{\"refined\": 2}",
                    "Active": true
                }
            },
            {
                "id": "rec-q1",
                "fields": {
                    "Client": ["rec-client-1"],
                    "Order": 1,
                    "Question Text": "Layout",
                    "Option A Image": [
                        { "url": "https://cdn.example/minimal.png" }
                    ],
                    "Option A Description": "Minimal grid",
                    "Option A Traits": "{\"minimal\": 1, \"geometric\": 1}",
                    "Option B Description": "Layered collage",
                    "Option B Traits": "not valid json",
                    "Active": true
                }
            },
            {
                "id": "rec-q3",
                "fields": {
                    "Client": ["rec-client-1"],
                    "Order": 3,
                    "Question Text": "Retired",
                    "Active": false
                }
            }
        ],
        "templates": [
            {
                "id": "rec-t2",
                "fields": {
                    "Client": ["rec-client-1"],
                    "Name": "Rich Collage",
                    "Match Profile": "{\"rich\": \"high\"}",
                    "Order": 2
                }
            },
            {
                "id": "rec-t1",
                "fields": {
                    "Client": ["rec-client-1"],
                    "Name": "Minimal Editorial",
                    "Description": "Whitespace and grids",
                    "Match Profile": "{\"minimal\": \"high\", \"geometric\": \"medium\"}",
                    "Order": 1
                }
            }
        ]
    })
}

fn export() -> RawQuizExport {
    serde_json::from_value(export_json()).expect("export decodes")
}

#[test]
fn export_resolves_to_ordered_content() {
    let content = decode_export("story", export()).expect("content resolves");

    assert_eq!(content.client.id, "rec-client-1");
    assert_eq!(content.client.intro_title, "Find Your Brand Style");
    // Subtitle was absent in the record and falls back to the default copy.
    assert!(!content.client.intro_subtitle.is_empty());

    let question_ids: Vec<&str> = content
        .questions
        .iter()
        .map(|question| question.id.as_str())
        .collect();
    assert_eq!(question_ids, vec!["rec-q1", "rec-q2"]);

    let first = &content.questions[0];
    assert_eq!(
        first.option_a.image.as_deref(),
        Some("https://cdn.example/minimal.png")
    );
    assert_eq!(first.option_a.traits.get("minimal"), Some(&1.0));
    // Malformed trait JSON degrades to an empty mapping instead of failing
    // the whole quiz.
    assert!(first.option_b.traits.is_empty());

    let template_ids: Vec<&str> = content
        .templates
        .iter()
        .map(|template| template.id.as_str())
        .collect();
    assert_eq!(template_ids, vec!["rec-t1", "rec-t2"]);
    assert_eq!(
        content.templates[0].match_profile.get("minimal"),
        Some(&TraitLevel::High)
    );
}

#[test]
fn inactive_clients_are_not_resolvable() {
    let err = decode_export("dormant", export()).expect_err("inactive client rejected");
    assert!(matches!(err, ContentError::ClientNotFound { .. }));
}

#[test]
fn unknown_slug_is_not_resolvable() {
    let err = decode_export("missing", export()).expect_err("unknown slug rejected");
    assert!(matches!(err, ContentError::ClientNotFound { .. }));
}

#[test]
fn client_without_active_questions_is_unusable() {
    let mut export = export();
    export
        .questions
        .retain(|record| !record.fields.active || record.fields.order == 3);

    let err = decode_export("story", export).expect_err("no questions rejected");
    assert!(matches!(err, ContentError::NoQuestions));
}
