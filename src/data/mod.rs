//! Core data models for the quiz and flashcard content
//!
//! This module contains the inventory manifest types, the two content shapes
//! (quizzes and flashcard decks), and the helpers that validate and normalize
//! what comes back from the remote JSON host.

pub mod content;
pub mod gist;
pub mod validate;

pub use content::{Content, ContentError};
pub use gist::{is_gist_url, to_raw_gist_url};
pub use validate::{is_valid_inventory, is_valid_inventory_item, is_valid_inventory_items};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The kind of content an inventory item points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// A flashcard deck: `{"flashcards": [...]}`
    Flash,
    /// A quiz: a bare list of questions
    Quizz,
}

impl ContentType {
    /// Parses the wire representation of a content type
    ///
    /// Only the exact strings `"Flash"` and `"Quizz"` are recognized.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "Flash" => Some(ContentType::Flash),
            "Quizz" => Some(ContentType::Quizz),
            _ => None,
        }
    }

    /// Returns the wire representation of this content type
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Flash => "Flash",
            ContentType::Quizz => "Quizz",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the inventory manifest
///
/// Published inventories use the keys `titre` and `jeux`; both those and the
/// English `title`/`game` keys are accepted when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Display title, unique within its game
    #[serde(alias = "titre")]
    pub title: String,
    /// Which content shape the URL serves
    #[serde(rename = "type")]
    pub kind: ContentType,
    /// Name of the game this item belongs to
    #[serde(alias = "jeux")]
    pub game: String,
    /// Location of the content document (may be a Gist page URL)
    pub url: String,
}

/// A single answer choice of a quiz question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
    #[serde(default)]
    pub rationale: String,
}

/// A quiz question with its ordered answer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Prompt text
    pub question: String,
    #[serde(default)]
    pub hint: String,
    pub answer_options: Vec<AnswerOption>,
}

impl Question {
    /// Returns the first option flagged as correct, if any
    pub fn correct_answer(&self) -> Option<&AnswerOption> {
        self.answer_options.iter().find(|o| o.is_correct)
    }
}

/// A two-sided flashcard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(rename = "f", alias = "front")]
    pub front: String,
    #[serde(rename = "b", alias = "back")]
    pub back: String,
}

/// Inventory items grouped by game
///
/// Keys iterate in lexicographic order; each group keeps the relative order
/// in which its items appeared in the inventory.
pub type GroupedInventory = BTreeMap<String, Vec<InventoryItem>>;

/// Groups inventory items by their `game` field
pub fn group_by_game(items: &[InventoryItem]) -> GroupedInventory {
    let mut grouped = GroupedInventory::new();
    for item in items {
        grouped
            .entry(item.game.clone())
            .or_default()
            .push(item.clone());
    }
    grouped
}
