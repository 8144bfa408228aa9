//! Element locators

use std::fmt;

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum By {
    Css(String),
    LinkText(String),
    XPath(String),
}

impl By {
    pub fn css(selector: impl Into<String>) -> Self {
        By::Css(selector.into())
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        By::LinkText(text.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        By::XPath(expr.into())
    }

    /// W3C location strategy name
    pub fn strategy(&self) -> &'static str {
        match self {
            By::Css(_) => "css selector",
            By::LinkText(_) => "link text",
            By::XPath(_) => "xpath",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            By::Css(v) | By::LinkText(v) | By::XPath(v) => v,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Css(v) => write!(f, "css={}", v),
            By::LinkText(v) => write!(f, "link={}", v),
            By::XPath(v) => write!(f, "xpath={}", v),
        }
    }
}

/// Quote a string as an XPath 1.0 literal.
///
/// XPath has no escape sequences, so a value holding both quote kinds is
/// assembled with `concat()`.
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{}'", s);
    }
    if !s.contains('"') {
        return format!("\"{}\"", s);
    }

    let parts: Vec<String> = s
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// `<tag>` whose text contains `text`
pub fn tag_containing(tag: &str, text: &str) -> By {
    By::xpath(format!("//{}[contains(text(), {})]", tag, xpath_literal(text)))
}

pub fn button_containing(text: &str) -> By {
    tag_containing("button", text)
}

pub fn span_containing(text: &str) -> By {
    tag_containing("span", text)
}

/// `<button>` with exactly `class` whose whole text is `text`, ignoring
/// surrounding whitespace
pub fn button_with_class_and_text(class: &str, text: &str) -> By {
    By::xpath(format!(
        "//button[@class={} and normalize-space(text())={}]",
        xpath_literal(class),
        xpath_literal(text.trim())
    ))
}
