//! Bookmark tags attached to a task row.
//!
//! Bookmarks live only on the client. A
//! task always carries at least one.

use std::sync::LazyLock;

use serde::Deserialize;
use thiserror::Error;

const BOOKMARK_PALETTE_TOML: &str =
  include_str!("bookmarks.toml");

const FALLBACK_LABEL: &str =
  "Important ASAP";

static PALETTE: LazyLock<
  BookmarkPalette
> = LazyLock::new(load_palette);

#[derive(
  Debug,
  Clone,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Bookmark {
  pub label: String,
  pub color: String
}

#[derive(
  Debug,
  Clone,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct BookmarkPalette {
  #[serde(default)]
  pub version:   u32,
  pub default:   String,
  #[serde(rename = "bookmark")]
  pub bookmarks: Vec<Bookmark>
}

impl Default for BookmarkPalette {
  fn default() -> Self {
    Self {
      version:   0,
      default:   FALLBACK_LABEL
        .to_string(),
      bookmarks: vec![Bookmark {
        label: FALLBACK_LABEL
          .to_string(),
        color: "#E9F3FF".to_string()
      }]
    }
  }
}

impl BookmarkPalette {
  /// The embedded palette, parsed once.
  pub fn builtin() -> &'static Self {
    &PALETTE
  }

  pub fn find(
    &self,
    label: &str
  ) -> Option<&Bookmark> {
    self
      .bookmarks
      .iter()
      .find(|mark| mark.label == label)
  }

  pub fn labels(
    &self
  ) -> impl Iterator<Item = &str> {
    self
      .bookmarks
      .iter()
      .map(|mark| mark.label.as_str())
  }

  fn is_valid(&self) -> bool {
    !self.bookmarks.is_empty()
      && self.find(&self.default).is_some()
  }
}

fn load_palette() -> BookmarkPalette {
  match toml::from_str::<BookmarkPalette>(
    BOOKMARK_PALETTE_TOML
  ) {
    | Ok(palette) if palette.is_valid() => {
      tracing::info!(
        version = palette.version,
        count = palette.bookmarks.len(),
        "loaded bookmark palette"
      );
      palette
    }
    | Ok(_) => {
      tracing::warn!(
        "bookmark palette was empty or \
         missing its default; using \
         fallback palette"
      );
      BookmarkPalette::default()
    }
    | Err(error) => {
      tracing::error!(%error, "failed to parse bookmark palette; using fallback palette");
      BookmarkPalette::default()
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookmarkError {
  #[error("unknown bookmark: {0}")]
  Unknown(String),
  #[error(
    "cannot remove {0}: a task keeps \
     at least one bookmark"
  )]
  LastBookmark(String)
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
)]
pub enum BookmarkChange {
  Added,
  Removed
}

/// Selected labels in the order they
/// were added.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
)]
pub struct BookmarkSet {
  labels: Vec<String>
}

impl BookmarkSet {
  pub fn new(
    palette: &BookmarkPalette
  ) -> Self {
    Self {
      labels: vec![
        palette.default.clone(),
      ]
    }
  }

  pub fn labels(&self) -> &[String] {
    &self.labels
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn contains(
    &self,
    label: &str
  ) -> bool {
    self
      .labels
      .iter()
      .any(|held| held == label)
  }

  /// Adds `label` if absent, removes it
  /// if present. Removing the only
  /// remaining label fails and leaves
  /// the set as it was.
  pub fn toggle(
    &mut self,
    palette: &BookmarkPalette,
    label: &str
  ) -> Result<BookmarkChange, BookmarkError>
  {
    if palette.find(label).is_none() {
      return Err(BookmarkError::Unknown(
        label.to_string()
      ));
    }

    if self.contains(label) {
      if self.labels.len() == 1 {
        return Err(
          BookmarkError::LastBookmark(
            label.to_string()
          )
        );
      }
      self
        .labels
        .retain(|held| held != label);
      Ok(BookmarkChange::Removed)
    } else {
      self.labels.push(label.to_string());
      Ok(BookmarkChange::Added)
    }
  }
}
