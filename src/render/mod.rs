//! Inline markup for result messages and the renderers that translate it.
//!
//! Check bodies can decorate messages with tags such as `<<b>>x<</b>>`; the
//! checker renders every message once, right before surfacing the result.

use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleCheckError};

/// Translates marked-up text into plain or styled text.
pub trait Renderer: Send + Sync {
    fn render(&self, text: &str) -> String;
}

/// Inline markup tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupTag {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Data,
    Pass,
    Fail,
    Skip,
    Warn,
    Expected,
    Actual,
    Red,
    Blue,
    Green,
    Purple,
    Orange,
    Yellow,
    Black,
    White,
}

impl MarkupTag {
    pub const ALL: [Self; 20] = [
        Self::Bold,
        Self::Italic,
        Self::Underline,
        Self::Strikethrough,
        Self::Code,
        Self::Data,
        Self::Pass,
        Self::Fail,
        Self::Skip,
        Self::Warn,
        Self::Expected,
        Self::Actual,
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Purple,
        Self::Orange,
        Self::Yellow,
        Self::Black,
        Self::White,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bold => "b",
            Self::Italic => "i",
            Self::Underline => "u",
            Self::Strikethrough => "s",
            Self::Code => "code",
            Self::Data => "data",
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Warn => "warn",
            Self::Expected => "expected",
            Self::Actual => "actual",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Black => "black",
            Self::White => "white",
        }
    }

    const fn color(self) -> Option<&'static str> {
        match self {
            Self::Pass | Self::Expected | Self::Green => Some("green"),
            Self::Fail | Self::Actual | Self::Red => Some("red"),
            Self::Skip | Self::Purple => Some("purple"),
            Self::Warn | Self::Orange => Some("orange"),
            Self::Blue => Some("blue"),
            Self::Yellow => Some("yellow"),
            Self::Black => Some("black"),
            Self::White => Some("white"),
            _ => None,
        }
    }
}

/// Builds marked-up text. Delimiters default to `<<` and `>>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    open: Cow<'static, str>,
    close: Cow<'static, str>,
}

/// Process-wide default markup.
pub static MARKUP: Markup = Markup::DEFAULT;

impl Default for Markup {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Markup {
    pub const DEFAULT: Self = Self {
        open: Cow::Borrowed("<<"),
        close: Cow::Borrowed(">>"),
    };

    /// Markup with custom delimiters.
    ///
    /// # Errors
    /// Returns `Config` if either delimiter is empty or both are equal.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self> {
        let (open, close) = (open.into(), close.into());
        if open.is_empty() || close.is_empty() || open == close {
            return Err(RuleCheckError::Config(format!(
                "Markup delimiters must be distinct and non-empty: '{open}' '{close}'"
            )));
        }
        Ok(Self {
            open: Cow::Owned(open),
            close: Cow::Owned(close),
        })
    }

    #[must_use]
    pub fn open_tag(&self, tag: MarkupTag) -> String {
        format!("{}{}{}", self.open, tag.name(), self.close)
    }

    #[must_use]
    pub fn close_tag(&self, tag: MarkupTag) -> String {
        format!("{}/{}{}", self.open, tag.name(), self.close)
    }

    #[must_use]
    pub fn wrap(&self, tag: MarkupTag, text: &str) -> String {
        format!("{}{text}{}", self.open_tag(tag), self.close_tag(tag))
    }

    #[must_use]
    pub fn bold(&self, text: &str) -> String {
        self.wrap(MarkupTag::Bold, text)
    }

    #[must_use]
    pub fn italic(&self, text: &str) -> String {
        self.wrap(MarkupTag::Italic, text)
    }

    #[must_use]
    pub fn code(&self, text: &str) -> String {
        self.wrap(MarkupTag::Code, text)
    }

    #[must_use]
    pub fn pass(&self, text: &str) -> String {
        self.wrap(MarkupTag::Pass, text)
    }

    #[must_use]
    pub fn fail(&self, text: &str) -> String {
        self.wrap(MarkupTag::Fail, text)
    }

    #[must_use]
    pub fn warn(&self, text: &str) -> String {
        self.wrap(MarkupTag::Warn, text)
    }

    #[must_use]
    pub fn expected(&self, text: &str) -> String {
        self.wrap(MarkupTag::Expected, text)
    }

    #[must_use]
    pub fn actual(&self, text: &str) -> String {
        self.wrap(MarkupTag::Actual, text)
    }
}

/// Output flavour for [`MarkupRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RenderStyle {
    #[default]
    Text,
    Markdown,
    Html,
}

impl RenderStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }

    fn replacement(self, tag: MarkupTag) -> (String, String) {
        let pair = |o: &str, c: &str| (o.to_string(), c.to_string());
        match self {
            Self::Text => pair("", ""),
            Self::Markdown => match tag {
                MarkupTag::Bold => pair("**", "**"),
                MarkupTag::Italic => pair("*", "*"),
                MarkupTag::Strikethrough => pair("~~", "~~"),
                MarkupTag::Code
                | MarkupTag::Data
                | MarkupTag::Pass
                | MarkupTag::Fail
                | MarkupTag::Skip
                | MarkupTag::Warn
                | MarkupTag::Expected
                | MarkupTag::Actual => pair("`", "`"),
                _ => pair("", ""),
            },
            Self::Html => match tag {
                MarkupTag::Bold => pair("<b>", "</b>"),
                MarkupTag::Italic => pair("<i>", "</i>"),
                MarkupTag::Underline => pair("<u>", "</u>"),
                MarkupTag::Strikethrough => pair("<s>", "</s>"),
                MarkupTag::Code | MarkupTag::Data => pair("<code>", "</code>"),
                other => other.color().map_or_else(
                    || pair("", ""),
                    |color| (format!(r#"<span style="color:{color}">"#), "</span>".to_string()),
                ),
            },
        }
    }
}

impl FromStr for RenderStyle {
    type Err = RuleCheckError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            _ => Err(RuleCheckError::UnknownRenderer(s.to_string())),
        }
    }
}

impl TryFrom<String> for RenderStyle {
    type Error = RuleCheckError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RenderStyle> for String {
    fn from(style: RenderStyle) -> Self {
        style.as_str().to_string()
    }
}

/// Renderer translating [`Markup`] tags for one [`RenderStyle`].
#[derive(Debug, Clone)]
pub struct MarkupRenderer {
    style: RenderStyle,
    markup: Markup,
}

impl MarkupRenderer {
    #[must_use]
    pub const fn new(style: RenderStyle) -> Self {
        Self {
            style,
            markup: Markup::DEFAULT,
        }
    }

    #[must_use]
    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }

    #[must_use]
    pub const fn style(&self) -> RenderStyle {
        self.style
    }
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::new(RenderStyle::Text)
    }
}

impl MarkupRenderer {
    /// Message text in the target format; only HTML needs escaping.
    fn escape(&self, text: &str) -> String {
        if self.style == RenderStyle::Html {
            html_escape(text)
        } else {
            text.to_string()
        }
    }
}

impl Renderer for MarkupRenderer {
    fn render(&self, text: &str) -> String {
        let escaped = self.escape(text);
        if !text.contains(self.markup.open.as_ref()) {
            return escaped;
        }
        // Tags are matched in escaped form.
        MarkupTag::ALL.iter().fold(escaped, |acc, &tag| {
            let (open, close) = self.style.replacement(tag);
            acc.replace(&self.escape(&self.markup.open_tag(tag)), &open)
                .replace(&self.escape(&self.markup.close_tag(tag)), &close)
        })
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Resolves a renderer by name (`text`, `markdown`/`md`, `html`).
///
/// # Errors
/// Returns `UnknownRenderer` for other names.
pub fn renderer_factory(name: &str) -> Result<MarkupRenderer> {
    Ok(MarkupRenderer::new(name.parse()?))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
