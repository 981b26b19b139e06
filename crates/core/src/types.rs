//! Searchable entity types
//!
//! This module defines the documents the engine ranks:
//! - ContentClass: post | answer | approach
//! - DocumentId: opaque identifier, unique within a class
//! - ClassFields: per-class text fields (the lexical field selector)
//! - SearchableDocument: one indexed document plus its projection metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ContentClass
// ============================================================================

/// Category of searchable entity, each with its own text fields and index
///
/// Declaration order is the deterministic fallback order for cross-class
/// ties: post < answer < approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentClass {
    /// Top-level post (problem, question, idea)
    Post,
    /// Answer to a question post
    Answer,
    /// Approach recorded against a problem post
    Approach,
}

impl ContentClass {
    /// All classes in enum order
    pub const fn all() -> [ContentClass; 3] {
        [
            ContentClass::Post,
            ContentClass::Answer,
            ContentClass::Approach,
        ]
    }

    /// Canonical lowercase name
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContentClass::Post => "post",
            ContentClass::Answer => "answer",
            ContentClass::Approach => "approach",
        }
    }
}

impl fmt::Display for ContentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentClass {
    type Err = String;

    /// Accepts singular and plural names, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" | "posts" => Ok(ContentClass::Post),
            "answer" | "answers" => Ok(ContentClass::Answer),
            "approach" | "approaches" => Ok(ContentClass::Approach),
            other => Err(format!(
                "unknown content class '{}' (expected post, answer or approach)",
                other
            )),
        }
    }
}

// ============================================================================
// DocumentId
// ============================================================================

/// Opaque document identifier, unique within its class
///
/// Ordering on the raw string is the fixed secondary key used for every
/// tie-break in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        DocumentId(s)
    }
}

// ============================================================================
// Author
// ============================================================================

/// Kind of account that authored a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorType {
    /// A person
    #[default]
    Human,
    /// An automated agent
    Agent,
}

impl FromStr for AuthorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(AuthorType::Human),
            "agent" => Ok(AuthorType::Agent),
            other => Err(format!("unknown author type '{}'", other)),
        }
    }
}

/// Author of a document, as shown in results
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    /// Author identifier
    pub id: String,
    /// Human or agent
    #[serde(rename = "type", default)]
    pub kind: AuthorType,
    /// Display name (falls back to the id when unknown)
    #[serde(default)]
    pub display_name: String,
}

// ============================================================================
// ClassFields
// ============================================================================

/// Class-specific text fields
///
/// This is the field selector for lexical indexing: each variant knows which
/// of its fields make up the indexed text.
///
/// | Class | Indexed text |
/// |-------|--------------|
/// | post | title + description |
/// | answer | content |
/// | approach | angle + method + outcome + solution |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "lowercase")]
pub enum ClassFields {
    /// Post fields
    Post {
        /// Post title
        title: String,
        /// Post body
        description: String,
        /// Post type (problem, question, idea)
        #[serde(default)]
        post_type: String,
    },
    /// Answer fields
    Answer {
        /// Answer body
        content: String,
        /// Question the answer belongs to
        #[serde(default)]
        question_id: Option<String>,
    },
    /// Approach fields
    Approach {
        /// Angle taken
        #[serde(default)]
        angle: String,
        /// Method used
        #[serde(default)]
        method: String,
        /// Outcome observed
        #[serde(default)]
        outcome: String,
        /// Solution found
        #[serde(default)]
        solution: String,
        /// Problem the approach belongs to
        #[serde(default)]
        problem_id: Option<String>,
    },
}

impl ClassFields {
    /// Class these fields belong to
    pub fn class(&self) -> ContentClass {
        match self {
            ClassFields::Post { .. } => ContentClass::Post,
            ClassFields::Answer { .. } => ContentClass::Answer,
            ClassFields::Approach { .. } => ContentClass::Approach,
        }
    }

    /// Text fed to the lexical index
    pub fn lexical_text(&self) -> String {
        match self {
            ClassFields::Post {
                title, description, ..
            } => join_nonempty(&[title, description]),
            ClassFields::Answer { content, .. } => content.clone(),
            ClassFields::Approach {
                angle,
                method,
                outcome,
                solution,
                ..
            } => join_nonempty(&[angle, method, outcome, solution]),
        }
    }

    /// Text shown as the result title
    ///
    /// Answers have no title of their own; the content stands in and is
    /// shortened by the hydration layer.
    pub fn title_text(&self) -> String {
        match self {
            ClassFields::Post { title, .. } => title.clone(),
            ClassFields::Answer { content, .. } => content.clone(),
            ClassFields::Approach { angle, method, .. } => join_nonempty(&[angle, method]),
        }
    }

    /// Result `type` column: the post type for posts, the class name otherwise
    pub fn kind(&self) -> String {
        match self {
            ClassFields::Post { post_type, .. } if !post_type.is_empty() => post_type.clone(),
            other => other.class().as_str().to_string(),
        }
    }
}

fn join_nonempty(parts: &[&String]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// SearchableDocument
// ============================================================================

/// Metadata carried for filtering and result projection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Tags (answers and approaches inherit their parent post's tags)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Status (open, solved, accepted, ...)
    #[serde(default)]
    pub status: String,
    /// Author
    #[serde(default)]
    pub author: Author,
    /// Upvotes minus downvotes
    #[serde(default)]
    pub vote_score: i64,
    /// Number of answers (posts only)
    #[serde(default)]
    pub answers_count: u32,
    /// Creation time
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// When the document was resolved, if ever
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// One document of one content class
///
/// # Invariant
///
/// A document with `deleted = true` never appears in either retrieval
/// branch. Indexes enforce this; the engine never sees deleted ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchableDocument {
    /// Identifier, unique within the class
    pub id: DocumentId,
    /// Class-specific text fields (also fixes the class)
    #[serde(flatten)]
    pub fields: ClassFields,
    /// Fixed-dimension embedding, absent until computed
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// Soft-delete flag
    #[serde(default)]
    pub deleted: bool,
    /// Projection and filter metadata
    #[serde(flatten)]
    pub meta: DocumentMeta,
}

impl SearchableDocument {
    /// Create a live document with default metadata and no embedding
    pub fn new(id: impl Into<DocumentId>, fields: ClassFields) -> Self {
        SearchableDocument {
            id: id.into(),
            fields,
            embedding: None,
            deleted: false,
            meta: DocumentMeta::default(),
        }
    }

    /// Convenience constructor for a post
    pub fn post(id: impl Into<DocumentId>, title: &str, description: &str) -> Self {
        Self::new(
            id,
            ClassFields::Post {
                title: title.to_string(),
                description: description.to_string(),
                post_type: String::new(),
            },
        )
    }

    /// Convenience constructor for an answer
    pub fn answer(id: impl Into<DocumentId>, content: &str) -> Self {
        Self::new(
            id,
            ClassFields::Answer {
                content: content.to_string(),
                question_id: None,
            },
        )
    }

    /// Convenience constructor for an approach
    pub fn approach(
        id: impl Into<DocumentId>,
        angle: &str,
        method: &str,
        outcome: &str,
        solution: &str,
    ) -> Self {
        Self::new(
            id,
            ClassFields::Approach {
                angle: angle.to_string(),
                method: method.to_string(),
                outcome: outcome.to_string(),
                solution: solution.to_string(),
                problem_id: None,
            },
        )
    }

    /// Class of this document
    pub fn class(&self) -> ContentClass {
        self.fields.class()
    }

    /// Builder: set embedding
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Builder: set metadata
    pub fn with_meta(mut self, meta: DocumentMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Builder: set tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.meta.tags = tags;
        self
    }

    /// Builder: mark soft-deleted
    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }
}
