use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inline style overrides keyed by CSS property name.
pub type StyleMap = BTreeMap<String, String>;

/// Content shown by a single stripe while a flap is up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlapContent {
    /// Markup placed in the inner container of the face.
    pub html: String,
    /// Style overrides applied to the face. `None` clears previous overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleMap>,
}

impl FlapContent {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            styles: None,
        }
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles
            .get_or_insert_with(StyleMap::new)
            .insert(property.into(), value.into());
        self
    }
}

/// One entry per stripe, in stripe order. A `None` entry, or a missing tail,
/// leaves the stripe's face as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flap {
    contents: Vec<Option<FlapContent>>,
}

impl Flap {
    pub fn new(contents: Vec<Option<FlapContent>>) -> Self {
        Self { contents }
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Content for the given stripe, if the flap carries any.
    pub fn content(&self, stripe: usize) -> Option<&FlapContent> {
        self.contents.get(stripe).and_then(Option::as_ref)
    }
}

impl From<Vec<FlapContent>> for Flap {
    fn from(contents: Vec<FlapContent>) -> Self {
        Self::new(contents.into_iter().map(Some).collect())
    }
}

impl FromIterator<FlapContent> for Flap {
    fn from_iter<I: IntoIterator<Item = FlapContent>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Some).collect())
    }
}

/// Append-only sequence of registered flaps.
#[derive(Debug, Clone, Default)]
pub struct FlapQueue {
    flaps: Vec<Flap>,
}

impl FlapQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, flap: Flap) {
        self.flaps.push(flap);
    }

    pub fn len(&self) -> usize {
        self.flaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flaps.is_empty()
    }

    pub fn clear(&mut self) {
        self.flaps.clear();
    }

    /// Maps an unbounded flap position onto the registered flaps.
    ///
    /// Returns `None` while the queue is empty.
    pub fn resolve(&self, relative_index: u64) -> Option<usize> {
        if self.flaps.is_empty() {
            return None;
        }
        Some((relative_index % self.flaps.len() as u64) as usize)
    }

    /// Content for `stripe` at the flap `relative_index` wraps onto.
    pub fn content(&self, relative_index: u64, stripe: usize) -> Option<&FlapContent> {
        let index = self.resolve(relative_index)?;
        self.flaps[index].content(stripe)
    }
}
