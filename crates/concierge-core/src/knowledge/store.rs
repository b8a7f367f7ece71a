//! In-memory knowledge base loaded once from the company JSON file.
//!
//! ## Layout
//!
//! ```json
//! {
//!   "sizeInfo":     { "맥스 사이즈 또는 크기.": { "description": "...", "imageUrl": "..." } },
//!   "covering":     { "맥스 커버링 방법을 알고 싶어": { "answer": "...", "videoUrl": "..." } },
//!   "biz":          { "스탠다드 비즈 에 대해 알고 싶어": { "description": "..." } },
//!   "history":      { "요기보 에 대해 알고 싶어": { "description": "..." } },
//!   "goodsInfo":    { ... },
//!   "homePage":     { ... },
//!   "deliveryInfo": { ... }
//! }
//! ```
//!
//! A missing or malformed category loads as empty; the stages that read it never match.

use super::category::{Category, CategoryKind, KnowledgeEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Error opening or parsing the knowledge-base file.
#[derive(Debug)]
pub enum KnowledgeLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The document root is not a JSON object.
    NotAnObject,
}

impl fmt::Display for KnowledgeLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnowledgeLoadError::Io(e) => write!(f, "knowledge base unreadable: {}", e),
            KnowledgeLoadError::Json(e) => write!(f, "knowledge base is not valid JSON: {}", e),
            KnowledgeLoadError::NotAnObject => write!(f, "knowledge base root must be an object"),
        }
    }
}

impl std::error::Error for KnowledgeLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KnowledgeLoadError::Io(e) => Some(e),
            KnowledgeLoadError::Json(e) => Some(e),
            KnowledgeLoadError::NotAnObject => None,
        }
    }
}

impl From<std::io::Error> for KnowledgeLoadError {
    fn from(e: std::io::Error) -> Self {
        KnowledgeLoadError::Io(e)
    }
}

impl From<serde_json::Error> for KnowledgeLoadError {
    fn from(e: serde_json::Error) -> Self {
        KnowledgeLoadError::Json(e)
    }
}

/// Status information for a single category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStatus {
    pub category: CategoryKind,
    pub name: String,
    pub json_key: String,
    pub entry_count: usize,
}

/// Read-only categorized knowledge base.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    categories: Vec<Category>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            categories: CategoryKind::all().into_iter().map(Category::new).collect(),
        }
    }
}

impl KnowledgeBase {
    /// Reads and parses the knowledge-base file at `path`.
    pub fn load_json_path<P: AsRef<Path>>(path: P) -> Result<Self, KnowledgeLoadError> {
        let bytes = std::fs::read(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        let kb = Self::from_json(&value)?;
        tracing::info!(
            target: "concierge::knowledge",
            path = %path.as_ref().display(),
            entries = kb.total_entries(),
            "Knowledge base loaded"
        );
        Ok(kb)
    }

    /// Builds the knowledge base from an already parsed document, keeping key order.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, KnowledgeLoadError> {
        let root = value.as_object().ok_or(KnowledgeLoadError::NotAnObject)?;
        let mut kb = Self::default();
        for kind in CategoryKind::all() {
            let Some(raw) = root.get(kind.json_key()) else {
                tracing::warn!(target: "concierge::knowledge", category = kind.json_key(), "Category missing; treated as empty");
                continue;
            };
            let Some(questions) = raw.as_object() else {
                tracing::warn!(target: "concierge::knowledge", category = kind.json_key(), "Category is not an object; treated as empty");
                continue;
            };
            let category = kb.category_mut(kind);
            for (question, entry) in questions {
                match serde_json::from_value::<KnowledgeEntry>(entry.clone()) {
                    Ok(entry) => category.push(question.as_str(), entry),
                    Err(e) => tracing::warn!(
                        target: "concierge::knowledge",
                        category = kind.json_key(),
                        question = %question,
                        error = %e,
                        "Skipping malformed entry"
                    ),
                }
            }
        }
        Ok(kb)
    }

    /// Appends an entry; used when assembling a knowledge base in code.
    pub fn insert(&mut self, kind: CategoryKind, question: impl Into<String>, entry: KnowledgeEntry) {
        self.category_mut(kind).push(question, entry);
    }

    fn category_mut(&mut self, kind: CategoryKind) -> &mut Category {
        let pos = match self.categories.iter().position(|c| c.kind() == kind) {
            Some(pos) => pos,
            None => {
                self.categories.push(Category::new(kind));
                self.categories.len() - 1
            }
        };
        &mut self.categories[pos]
    }

    pub fn category(&self, kind: CategoryKind) -> Option<&Category> {
        self.categories.iter().find(|c| c.kind() == kind)
    }

    /// Exact lookup of `question` in `kind` (normalized on both sides).
    pub fn get(&self, kind: CategoryKind, question: &str) -> Option<&KnowledgeEntry> {
        self.category(kind).and_then(|c| c.get(question))
    }

    pub fn count(&self, kind: CategoryKind) -> usize {
        self.category(kind).map(Category::len).unwrap_or(0)
    }

    pub fn total_entries(&self) -> usize {
        self.categories.iter().map(Category::len).sum()
    }

    /// Per-category entry counts.
    pub fn status(&self) -> Vec<CategoryStatus> {
        CategoryKind::all()
            .into_iter()
            .map(|kind| CategoryStatus {
                category: kind,
                name: kind.label().to_string(),
                json_key: kind.json_key().to_string(),
                entry_count: self.count(kind),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_json_keeps_question_order() {
        let doc = serde_json::json!({
            "goodsInfo": {
                "z 질문": { "description": "z" },
                "a 질문": { "description": "a" },
                "m 질문": { "description": "m" }
            }
        });
        let kb = KnowledgeBase::from_json(&doc).unwrap();
        let order: Vec<&str> = kb
            .category(CategoryKind::GoodsInfo)
            .unwrap()
            .questions()
            .map(|q| q.raw.as_str())
            .collect();
        assert_eq!(order, vec!["z 질문", "a 질문", "m 질문"]);
    }

    #[test]
    fn malformed_categories_and_entries_load_as_empty() {
        let doc = serde_json::json!({
            "covering": "not an object",
            "biz": {
                "스탠다드 비즈 에 대해 알고 싶어": { "description": "ok" },
                "broken": { "description": 42 }
            }
        });
        let kb = KnowledgeBase::from_json(&doc).unwrap();
        assert_eq!(kb.count(CategoryKind::Covering), 0);
        assert_eq!(kb.count(CategoryKind::Biz), 1);
        assert_eq!(kb.count(CategoryKind::DeliveryInfo), 0);
        assert!(kb.get(CategoryKind::Biz, "스탠다드 비즈 에 대해 알고 싶어").is_some());
    }

    #[test]
    fn non_object_root_is_an_error() {
        let err = KnowledgeBase::from_json(&serde_json::json!([1, 2])).unwrap_err();
        assert!(matches!(err, KnowledgeLoadError::NotAnObject));
    }

    #[test]
    fn load_json_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"history": {{"요기보 에 대해 알고 싶어": {{"description": "since 2009"}}}}}}"#
        )
        .unwrap();
        let kb = KnowledgeBase::load_json_path(file.path()).unwrap();
        assert_eq!(kb.total_entries(), 1);
        let status = kb.status();
        assert_eq!(status.len(), 7);
        let history = status
            .iter()
            .find(|s| s.category == CategoryKind::History)
            .unwrap();
        assert_eq!(history.entry_count, 1);
        assert_eq!(history.json_key, "history");
    }

    #[test]
    fn load_json_path_reports_missing_file() {
        let err = KnowledgeBase::load_json_path("./does/not/exist.json").unwrap_err();
        assert!(matches!(err, KnowledgeLoadError::Io(_)));
    }
}
