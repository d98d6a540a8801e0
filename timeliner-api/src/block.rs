//! Block representation - the atomic styled text unit of a timeline.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Deepest indentation a block may carry.
pub const MAX_INDENT: u8 = 10;

/// Color given to preview blocks and to blocks that arrive without one.
pub const DEFAULT_COLOR: &str = "#ffcc88";

/// Unique identifier for a block.
///
/// Identity is stable once assigned. Preview blocks that have not yet been
/// placed in the grid carry no id at all (`Option<BlockId>::None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color: {0:?} (expected #rgb or #rrggbb)")]
pub struct InvalidColor(pub String);

/// A hex color value (`#rgb` or `#rrggbb`).
///
/// Deserialization is transparent and does not validate, so documents
/// written by older clients load unchanged. Use [`Color::parse`] for input
/// coming from the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn parse(input: &str) -> Result<Self, InvalidColor> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| InvalidColor(input.to_string()))?;

        let valid_len = digits.len() == 3 || digits.len() == 6;
        if !valid_len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidColor(input.to_string()));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(DEFAULT_COLOR.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A styled text block: optional title, optional body, a color and an
/// indentation level.
///
/// At least one of `show_title` / `show_body` stays true in normal
/// operation; the command layer refuses to hide the last visible part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub id: Option<BlockId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_shown")]
    pub show_title: bool,
    #[serde(default = "default_shown")]
    pub show_body: bool,
    #[serde(default)]
    pub color: Color,
    #[serde(default, deserialize_with = "deserialize_indent")]
    pub indent: u8,
}

impl Block {
    pub fn new(id: BlockId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: title.into(),
            body: body.into(),
            ..Self::preview()
        }
    }

    /// The placeholder shown in empty columns and dragged in from the
    /// "new block" slot. It has no identity until it is placed.
    pub fn preview() -> Self {
        Self {
            id: None,
            title: " ".to_string(),
            body: " ".to_string(),
            show_title: true,
            show_body: true,
            color: Color::default(),
            indent: 0,
        }
    }

    /// A new empty block that shares this block's styling.
    pub fn sibling(&self, id: BlockId) -> Self {
        Self {
            id: Some(id),
            title: String::new(),
            body: String::new(),
            ..self.clone()
        }
    }

    pub fn set_indent(&mut self, indent: i64) {
        self.indent = clamp_indent(indent);
    }

    pub fn indent_by(&mut self, delta: i64) {
        self.set_indent(i64::from(self.indent) + delta);
    }

    /// Whether `other` is the same logical block.
    ///
    /// Blocks with ids match on id alone; id-less blocks only match an
    /// identical id-less value.
    pub fn is_same(&self, other: &Block) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self == other,
            _ => false,
        }
    }
}

/// A single-field edit of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockField {
    Title(String),
    Body(String),
    ShowTitle(bool),
    ShowBody(bool),
    Color(Color),
    /// Absolute indentation, clamped to `0..=MAX_INDENT` on apply.
    Indent(i64),
}

impl Block {
    /// Replace one field. Text is taken verbatim, indentation is clamped.
    pub fn apply(&mut self, field: BlockField) {
        match field {
            BlockField::Title(title) => self.title = title,
            BlockField::Body(body) => self.body = body,
            BlockField::ShowTitle(show) => self.show_title = show,
            BlockField::ShowBody(show) => self.show_body = show,
            BlockField::Color(color) => self.color = color,
            BlockField::Indent(indent) => self.set_indent(indent),
        }
    }
}

pub fn clamp_indent(indent: i64) -> u8 {
    indent.clamp(0, i64::from(MAX_INDENT)) as u8
}

fn default_shown() -> bool {
    true
}

fn deserialize_indent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_indent(raw.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parse_accepts_short_and_long_hex() {
        assert_eq!(Color::parse("#ABC").unwrap().as_str(), "#abc");
        assert_eq!(Color::parse(" #ffcc88 ").unwrap().as_str(), "#ffcc88");
    }

    #[test]
    fn color_parse_rejects_malformed_values() {
        assert!(Color::parse("ffcc88").is_err());
        assert!(Color::parse("#ffcc8").is_err());
        assert!(Color::parse("#gggggg").is_err());
    }

    #[test]
    fn indent_is_clamped_on_every_change() {
        let mut block = Block::new(BlockId(1), "a", "b");
        block.indent_by(-3);
        assert_eq!(block.indent, 0);
        block.set_indent(42);
        assert_eq!(block.indent, MAX_INDENT);
        block.indent_by(1);
        assert_eq!(block.indent, MAX_INDENT);
    }

    #[test]
    fn apply_replaces_text_verbatim() {
        let mut block = Block::new(BlockId(1), "a", "b");
        block.apply(BlockField::Title("  spaced\n".into()));
        block.apply(BlockField::Indent(-4));
        assert_eq!(block.title, "  spaced\n");
        assert_eq!(block.indent, 0);
    }

    #[test]
    fn sibling_copies_style_but_not_text() {
        let mut block = Block::new(BlockId(1), "title", "body");
        block.indent = 3;
        block.show_body = false;
        block.color = Color::parse("#123456").unwrap();

        let sibling = block.sibling(BlockId(2));
        assert_eq!(sibling.id, Some(BlockId(2)));
        assert!(sibling.title.is_empty());
        assert!(sibling.body.is_empty());
        assert_eq!(sibling.indent, 3);
        assert!(!sibling.show_body);
        assert_eq!(sibling.color, block.color);
    }

    #[test]
    fn deserialize_fills_defaults_and_clamps_indent() {
        let block: Block = serde_json::from_str(r#"{"id": 7, "title": "x", "indent": 14}"#).unwrap();
        assert_eq!(block.id, Some(BlockId(7)));
        assert_eq!(block.indent, MAX_INDENT);
        assert!(block.show_title && block.show_body);
        assert_eq!(block.color.as_str(), DEFAULT_COLOR);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(Block::preview()).unwrap();
        assert_eq!(json["id"], serde_json::Value::Null);
        assert_eq!(json["showTitle"], true);
        assert_eq!(json["showBody"], true);
        assert_eq!(json["color"], DEFAULT_COLOR);
    }

    #[test]
    fn identity_matches_on_id_or_value() {
        let a = Block::new(BlockId(1), "a", "");
        let mut renamed = a.clone();
        renamed.title = "changed".into();
        assert!(a.is_same(&renamed));
        assert!(!a.is_same(&Block::new(BlockId(2), "a", "")));
        assert!(Block::preview().is_same(&Block::preview()));
        assert!(!Block::preview().is_same(&a));
    }
}
