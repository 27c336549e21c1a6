//! Shape dispatch for content documents
//!
//! A content document is only meaningful relative to the inventory item that
//! points at it: a `Flash` item must serve `{"flashcards": [...]}` and a
//! `Quizz` item must serve a bare array of questions.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::{ContentType, Flashcard, Question};

/// Errors raised when a document does not match its item's declared type
#[derive(Debug, Error)]
pub enum ContentError {
    /// A `Flash` item returned something without a `flashcards` field
    #[error("expected an object with a `flashcards` field")]
    MissingFlashcards,

    /// A `Quizz` item returned something other than an array
    #[error("expected an array of questions")]
    NotAQuestionList,

    /// The outer shape was right but the entries failed to decode
    #[error("malformed content: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decoded content ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Quiz(Vec<Question>),
    Flashcards(Vec<Flashcard>),
}

#[derive(Deserialize)]
struct FlashcardDeck {
    flashcards: Vec<Flashcard>,
}

impl Content {
    /// Decodes a raw document according to the declared content type
    ///
    /// # Arguments
    /// * `kind` - The type declared by the owning inventory item
    /// * `doc` - The raw JSON document, as fetched or cached
    ///
    /// # Returns
    /// * `Ok(Content)` if the document has the shape `kind` calls for
    /// * `Err(ContentError)` otherwise
    pub fn from_document(kind: ContentType, doc: &Value) -> Result<Self, ContentError> {
        match kind {
            ContentType::Flash => {
                let has_field = doc
                    .as_object()
                    .is_some_and(|obj| obj.contains_key("flashcards"));
                if !has_field {
                    return Err(ContentError::MissingFlashcards);
                }
                let deck = FlashcardDeck::deserialize(doc)?;
                Ok(Content::Flashcards(deck.flashcards))
            }
            ContentType::Quizz => {
                if !doc.is_array() {
                    return Err(ContentError::NotAQuestionList);
                }
                let questions = Vec::<Question>::deserialize(doc)?;
                Ok(Content::Quiz(questions))
            }
        }
    }

    /// Number of questions or cards
    pub fn len(&self) -> usize {
        match self {
            Content::Quiz(questions) => questions.len(),
            Content::Flashcards(cards) => cards.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
