use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Categorical strength of a trait within a respondent profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitLevel {
    Low,
    Medium,
    High,
}

impl TraitLevel {
    pub const fn ordered() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Position on the low/medium/high ladder, used for adjacency scoring.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

/// The fixed bipolar vocabulary backing the dimension-balance view.
///
/// Scoring and matching accept any trait string; only this view is limited
/// to the known pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleDimension {
    Minimal,
    Geometric,
    Bold,
    Warm,
    Playful,
}

impl StyleDimension {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Minimal,
            Self::Geometric,
            Self::Bold,
            Self::Warm,
            Self::Playful,
        ]
    }

    pub const fn trait_name(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Geometric => "geometric",
            Self::Bold => "bold",
            Self::Warm => "warm",
            Self::Playful => "playful",
        }
    }

    pub const fn opposite(self) -> &'static str {
        match self {
            Self::Minimal => "rich",
            Self::Geometric => "organic",
            Self::Bold => "refined",
            Self::Warm => "cool",
            Self::Playful => "serious",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "Minimal ↔ Rich",
            Self::Geometric => "Geometric ↔ Organic",
            Self::Bold => "Bold ↔ Refined",
            Self::Warm => "Warm ↔ Cool",
            Self::Playful => "Playful ↔ Serious",
        }
    }
}

/// Which of the two options a respondent picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
}

impl Choice {
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

/// String-keyed map that remembers insertion order.
///
/// Trait keys are open-ended (question and template content is external),
/// and insertion order is load-bearing: it is the documented tie-break when
/// raw scores are ranked. Entries are few, so lookups scan the vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> TraitMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Insert or replace, keeping the key's original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for TraitMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(String, V)> for TraitMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl TraitMap<f64> {
    /// Add `weight` to the running total for `name`, starting from zero.
    pub fn add(&mut self, name: &str, weight: f64) {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, total)) => *total += weight,
            None => self.entries.push((name.to_string(), weight)),
        }
    }
}

impl<V: Serialize> Serialize for TraitMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for TraitMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TraitMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for TraitMapVisitor<V> {
            type Value = TraitMap<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of trait names to values")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut map = TraitMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(TraitMapVisitor(PhantomData))
    }
}

/// Weight contributed to each trait when an option is chosen.
pub type TraitWeights = TraitMap<f64>;

/// Accumulated raw weights per trait for one session.
pub type ScoreState = TraitMap<f64>;

/// Per-trait categorical level derived from a [`ScoreState`].
pub type NormalizedProfile = TraitMap<TraitLevel>;

/// One side of a binary question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizOption {
    pub image: Option<String>,
    pub label: String,
    pub traits: TraitWeights,
}

/// A binary-choice question, presented in ascending `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub order: i64,
    pub category: String,
    pub option_a: QuizOption,
    pub option_b: QuizOption,
}

impl Question {
    pub fn option(&self, choice: Choice) -> &QuizOption {
        match choice {
            Choice::A => &self.option_a,
            Choice::B => &self.option_b,
        }
    }
}

/// A recorded answer, immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub category: String,
    pub choice: Choice,
    pub choice_label: String,
}

/// A candidate template with its expected trait-level profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub preview_image: Option<String>,
    pub match_profile: TraitMap<TraitLevel>,
    pub order: i64,
}

/// A template plus its fit to the respondent profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTemplate {
    pub template: Template,
    pub match_percent: u8,
}

/// The client a quiz belongs to, with intro-screen copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    pub intro_title: String,
    pub intro_subtitle: String,
}
