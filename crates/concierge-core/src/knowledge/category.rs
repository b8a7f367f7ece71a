//! Knowledge categories and their entries.

use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// JSON keys of the categories, in [`CategoryKind::all`] order.
const JSON_KEYS: [&str; 7] = [
    "sizeInfo",
    "covering",
    "biz",
    "history",
    "goodsInfo",
    "homePage",
    "deliveryInfo",
];

/// Human-readable labels for the categories.
pub const CATEGORY_LABELS: [&str; 7] = [
    "Size info",
    "Covering",
    "Biz tiers",
    "Brand history",
    "Goods info",
    "Home page",
    "Delivery info",
];

/// Category type enum for type-safe category references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Dimensions per product type.
    SizeInfo,
    /// Cover fitting how-tos, usually with a video.
    Covering,
    /// Bead filling tiers.
    Biz,
    /// Brand story.
    History,
    /// Product details.
    GoodsInfo,
    /// Site and account questions.
    HomePage,
    /// Shipping questions.
    DeliveryInfo,
}

impl CategoryKind {
    #[inline]
    fn index(&self) -> usize {
        *self as usize
    }

    /// Top-level key of this category in the knowledge-base file.
    #[inline]
    pub fn json_key(&self) -> &'static str {
        JSON_KEYS[self.index()]
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        CATEGORY_LABELS[self.index()]
    }

    pub fn from_json_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|k| k.json_key() == key)
    }

    /// Returns all categories in file order.
    pub fn all() -> [Self; 7] {
        [
            Self::SizeInfo,
            Self::Covering,
            Self::Biz,
            Self::History,
            Self::GoodsInfo,
            Self::HomePage,
            Self::DeliveryInfo,
        ]
    }
}

/// One answer as stored in the knowledge-base file.
///
/// Covering entries carry their text in `answer`; every other category uses `description`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl KnowledgeEntry {
    /// Short answer text, falling back to the description.
    pub fn answer_text(&self) -> &str {
        self.answer
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or_default()
    }

    /// Long description, falling back to the short answer.
    pub fn description_text(&self) -> &str {
        self.description
            .as_deref()
            .or(self.answer.as_deref())
            .unwrap_or_default()
    }

    /// Video URL, treating an empty string as absent.
    pub fn video(&self) -> Option<&str> {
        self.video_url.as_deref().filter(|s| !s.is_empty())
    }

    /// Image URL, treating an empty string as absent.
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|s| !s.is_empty())
    }
}

/// A stored question with its precomputed canonical form.
#[derive(Debug, Clone)]
pub struct Question {
    pub raw: String,
    pub normalized: String,
    pub entry: KnowledgeEntry,
}

/// Insertion-ordered questions of one category with an exact-lookup index.
#[derive(Debug, Clone)]
pub struct Category {
    kind: CategoryKind,
    questions: Vec<Question>,
    /// normalized key -> position in `questions`; later duplicates shadow earlier ones.
    index: HashMap<String, usize>,
}

impl Category {
    pub fn new(kind: CategoryKind) -> Self {
        Self {
            kind,
            questions: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    /// Appends a question; its key is normalized once here.
    pub fn push(&mut self, raw: impl Into<String>, entry: KnowledgeEntry) {
        let raw = raw.into();
        let normalized = normalize(&raw);
        self.index.insert(normalized.clone(), self.questions.len());
        self.questions.push(Question {
            raw,
            normalized,
            entry,
        });
    }

    /// Exact lookup; `key` is normalized before comparison.
    pub fn get(&self, key: &str) -> Option<&KnowledgeEntry> {
        self.index
            .get(&normalize(key))
            .map(|&i| &self.questions[i].entry)
    }

    /// Questions in insertion order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> + '_ {
        self.questions.iter()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
