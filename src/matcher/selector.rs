use serde::{Deserialize, Serialize};

/// Which attribute a selector addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Id,
    Name,
    Class,
    Xpath,
}

impl SelectorKind {
    /// Fallback and tie-break order: ids are the most stable anchors.
    pub const PRIORITY: [SelectorKind; 4] = [
        SelectorKind::Id,
        SelectorKind::Name,
        SelectorKind::Class,
        SelectorKind::Xpath,
    ];

    /// Higher wins ties.
    pub fn priority(self) -> u8 {
        match self {
            SelectorKind::Id => 3,
            SelectorKind::Name => 2,
            SelectorKind::Class => 1,
            SelectorKind::Xpath => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SelectorKind::Id => "id",
            SelectorKind::Name => "name",
            SelectorKind::Class => "class",
            SelectorKind::Xpath => "xpath",
        }
    }
}

impl std::fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    pub kind: SelectorKind,
    /// Selector with its prefix grammar stripped
    pub value: String,
}

/// `#id`, `[name="..."]`, `.class`, anything else is an XPath.
pub fn parse_selector(selector: &str) -> ParsedSelector {
    let selector = selector.trim();

    if let Some(id) = selector.strip_prefix('#') {
        return ParsedSelector {
            kind: SelectorKind::Id,
            value: id.to_string(),
        };
    }

    if let Some(rest) = selector.strip_prefix("[name=") {
        let value = rest
            .strip_suffix(']')
            .unwrap_or(rest)
            .trim()
            .trim_matches(|c| c == '"' || c == '\'');
        return ParsedSelector {
            kind: SelectorKind::Name,
            value: value.to_string(),
        };
    }

    if let Some(class) = selector.strip_prefix('.') {
        return ParsedSelector {
            kind: SelectorKind::Class,
            value: class.to_string(),
        };
    }

    ParsedSelector {
        kind: SelectorKind::Xpath,
        value: selector.to_string(),
    }
}

/// Render an attribute value as a selector of the given kind.
pub fn format_selector(kind: SelectorKind, value: &str) -> String {
    match kind {
        SelectorKind::Id => format!("#{value}"),
        SelectorKind::Name => format!("[name=\"{value}\"]"),
        SelectorKind::Class => format!(".{}", value.split_whitespace().next().unwrap_or(value)),
        SelectorKind::Xpath => value.to_string(),
    }
}
