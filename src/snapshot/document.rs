use std::collections::HashMap;

use thiserror::Error;

use crate::snapshot::element::ElementRecord;

/// Something an XPath can be resolved against.
///
/// The healing core only ever asks "which nodes does this path select";
/// a live browser page could implement this as well as a captured snapshot.
pub trait XPathDocument {
    /// Indices of the selected elements, in document order.
    fn select(&self, xpath: &str) -> Result<Vec<usize>, XPathError>;

    fn resolves(&self, xpath: &str) -> bool {
        self.select(xpath).map(|hits| !hits.is_empty()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum XPathError {
    #[error("unsupported xpath syntax at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
}

// ============================================================================
// Query model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Position(usize),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Attr(String),
    Text,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Contains(Operand, String),
    StartsWith(Operand, String),
    Equals(Operand, String),
    Exists(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    /// `None` is the `*` wildcard
    name: Option<String>,
    predicates: Vec<Predicate>,
}

/// A parsed location path. Supports the subset test suites actually write:
/// `/` and `//` steps, name tests and `*`, positional predicates, and
/// `contains` / `starts-with` / `=` / `not` / `and` / `or` over `@attr` and
/// `text()`.
#[derive(Debug, Clone, PartialEq)]
pub struct XPathQuery {
    steps: Vec<Step>,
}

impl XPathQuery {
    pub fn parse(xpath: &str) -> Result<Self, XPathError> {
        Parser::new(xpath).parse_path()
    }

    /// `true` when the path starts with `//`.
    pub fn is_relative(&self) -> bool {
        self.steps.first().is_some_and(|s| s.axis == Axis::Descendant)
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src: src.trim(), pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn error(&self, message: &str) -> XPathError {
        XPathError::Syntax {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), XPathError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{token}`")))
        }
    }

    fn ident(&mut self) -> Result<String, XPathError> {
        self.skip_ws();
        let len = self
            .rest()
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || matches!(c, '-' | '_' | ':')))
            .map(|(i, _)| i)
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.error("expected a name"));
        }
        let name = self.rest()[..len].to_string();
        self.pos += len;
        Ok(name)
    }

    fn literal(&mut self) -> Result<String, XPathError> {
        self.skip_ws();
        let quote = match self.rest().chars().next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected a string literal")),
        };
        self.pos += 1;
        let end = self
            .rest()
            .find(quote)
            .ok_or_else(|| self.error("unterminated string literal"))?;
        let value = self.rest()[..end].to_string();
        self.pos += end + 1;
        Ok(value)
    }

    fn parse_path(&mut self) -> Result<XPathQuery, XPathError> {
        let mut steps = Vec::new();

        while !self.rest().is_empty() {
            let axis = if self.eat("//") {
                Axis::Descendant
            } else if self.eat("/") {
                Axis::Child
            } else {
                return Err(self.error("expected `/` or `//`"));
            };

            let name = if self.eat("*") {
                None
            } else {
                Some(self.ident()?.to_lowercase())
            };

            let mut predicates = Vec::new();
            while self.eat("[") {
                predicates.push(self.parse_predicate()?);
                self.expect("]")?;
            }

            steps.push(Step {
                axis,
                name,
                predicates,
            });
            self.skip_ws();
        }

        if steps.is_empty() {
            return Err(self.error("empty path"));
        }
        Ok(XPathQuery { steps })
    }

    fn parse_predicate(&mut self) -> Result<Predicate, XPathError> {
        self.skip_ws();
        let digits = self
            .rest()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if digits > 0 {
            let n = self.rest()[..digits]
                .parse()
                .map_err(|_| self.error("bad position"))?;
            self.pos += digits;
            return Ok(Predicate::Position(n));
        }
        Ok(Predicate::Expr(self.parse_or()?))
    }

    fn parse_or(&mut self) -> Result<Expr, XPathError> {
        let mut lhs = self.parse_and()?;
        while self.eat_keyword("or") {
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, XPathError> {
        let mut lhs = self.parse_primary()?;
        while self.eat_keyword("and") {
            let rhs = self.parse_primary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let Some(after) = self.rest().strip_prefix(keyword) else {
            return false;
        };
        let boundary = after
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || c == '(' || c == '@');
        if boundary {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, XPathError> {
        if self.eat("(") {
            let inner = self.parse_or()?;
            self.expect(")")?;
            return Ok(inner);
        }
        if self.eat_keyword("not") {
            self.expect("(")?;
            let inner = self.parse_or()?;
            self.expect(")")?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        for (keyword, build) in [
            ("contains", Expr::Contains as fn(Operand, String) -> Expr),
            ("starts-with", Expr::StartsWith as fn(Operand, String) -> Expr),
        ] {
            if self.eat_keyword(keyword) {
                self.expect("(")?;
                let operand = self.parse_operand()?;
                self.expect(",")?;
                let value = self.literal()?;
                self.expect(")")?;
                return Ok(build(operand, value));
            }
        }

        let operand = self.parse_operand()?;
        if self.eat("=") {
            let value = self.literal()?;
            return Ok(Expr::Equals(operand, value));
        }
        match operand {
            Operand::Attr(name) => Ok(Expr::Exists(name)),
            Operand::Text => Err(self.error("bare text() is not a predicate")),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, XPathError> {
        if self.eat("@") {
            return Ok(Operand::Attr(self.ident()?));
        }
        if self.eat("text()") || self.eat("normalize-space()") || self.eat(".") {
            return Ok(Operand::Text);
        }
        Err(self.error("expected `@attr` or `text()`"))
    }
}

// ============================================================================
// Snapshot-backed document
// ============================================================================

/// One `name[index]` segment of an absolute element path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Segment {
    name: String,
    index: usize,
}

fn segments(xpath: &str) -> Vec<Segment> {
    xpath
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|raw| match raw.split_once('[') {
            Some((name, rest)) => Segment {
                name: name.to_lowercase(),
                index: rest.trim_end_matches(']').parse().unwrap_or(1),
            },
            None => Segment {
                name: raw.to_lowercase(),
                index: 1,
            },
        })
        .collect()
}

/// Resolves XPath queries against the absolute paths recorded in a snapshot.
///
/// Ancestors that were not captured (typically `html` and `body`) still match
/// name and position tests, but have no attributes.
pub struct SnapshotDocument<'a> {
    elements: &'a [ElementRecord],
    paths: Vec<Vec<Segment>>,
    by_path: HashMap<Vec<Segment>, usize>,
}

impl<'a> SnapshotDocument<'a> {
    pub fn new(elements: &'a [ElementRecord]) -> Self {
        let paths: Vec<Vec<Segment>> = elements.iter().map(|e| segments(&e.xpath)).collect();
        let by_path = paths
            .iter()
            .enumerate()
            .map(|(idx, path)| (path.clone(), idx))
            .collect();

        Self {
            elements,
            paths,
            by_path,
        }
    }

    pub fn elements(&self) -> &'a [ElementRecord] {
        self.elements
    }

    pub fn select_query(&self, query: &XPathQuery) -> Vec<usize> {
        (0..self.elements.len())
            .filter(|&idx| self.matches_from(&query.steps, &self.paths[idx], 0))
            .collect()
    }

    fn matches_from(&self, steps: &[Step], path: &[Segment], depth: usize) -> bool {
        let Some((step, remaining)) = steps.split_first() else {
            return depth == path.len();
        };

        let positions = match step.axis {
            Axis::Child => depth..(depth + 1).min(path.len()),
            Axis::Descendant => depth..path.len(),
        };

        positions
            .into_iter()
            .any(|pos| self.step_matches(step, &path[..=pos]) && self.matches_from(remaining, path, pos + 1))
    }

    fn step_matches(&self, step: &Step, prefix: &[Segment]) -> bool {
        let Some(segment) = prefix.last() else {
            return false;
        };
        if step.name.as_ref().is_some_and(|n| *n != segment.name) {
            return false;
        }

        let element = self.by_path.get(prefix).map(|&idx| &self.elements[idx]);
        step.predicates.iter().all(|p| match p {
            Predicate::Position(n) => segment.index == *n,
            Predicate::Expr(expr) => eval(expr, element),
        })
    }
}

impl XPathDocument for SnapshotDocument<'_> {
    fn select(&self, xpath: &str) -> Result<Vec<usize>, XPathError> {
        let query = XPathQuery::parse(xpath)?;
        Ok(self.select_query(&query))
    }
}

fn operand_value<'e>(operand: &Operand, element: &'e ElementRecord) -> Option<&'e str> {
    match operand {
        Operand::Attr(name) => element.attribute(&name.replace('-', "_")),
        Operand::Text => element.text.as_deref(),
    }
}

fn eval(expr: &Expr, element: Option<&ElementRecord>) -> bool {
    match expr {
        Expr::Or(a, b) => eval(a, element) || eval(b, element),
        Expr::And(a, b) => eval(a, element) && eval(b, element),
        Expr::Not(inner) => !eval(inner, element),
        Expr::Contains(op, lit) => element
            .and_then(|e| operand_value(op, e))
            .is_some_and(|v| v.contains(lit.as_str())),
        Expr::StartsWith(op, lit) => element
            .and_then(|e| operand_value(op, e))
            .is_some_and(|v| v.starts_with(lit.as_str())),
        Expr::Equals(op, lit) => element
            .and_then(|e| operand_value(op, e))
            .is_some_and(|v| v.trim() == lit),
        Expr::Exists(name) => element.and_then(|e| e.present(&name.replace('-', "_"))).is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Vec<ElementRecord> {
        vec![
            ElementRecord::new("div", "/html/body/div[1]").with_class("container main"),
            ElementRecord::new("button", "/html/body/div[1]/button[1]")
                .with_id("btnSend")
                .with_class("btn btn-primary"),
            ElementRecord::new("button", "/html/body/div[1]/button[2]")
                .with_class("btn")
                .with_text("Cancel"),
            ElementRecord::new("input", "/html/body/form[1]/input[1]").with_name("email"),
        ]
    }

    #[test]
    fn absolute_path_selects_exact_node() {
        let els = page();
        let doc = SnapshotDocument::new(&els);
        assert_eq!(doc.select("/html/body/div[1]/button[2]").unwrap(), vec![2]);
        assert_eq!(doc.select("/html[1]/body[1]/div/button[1]").unwrap(), vec![1]);
    }

    #[test]
    fn descendant_with_contains_predicate() {
        let els = page();
        let doc = SnapshotDocument::new(&els);
        assert_eq!(doc.select("//button[contains(@class, 'btn')]").unwrap(), vec![1, 2]);
        assert_eq!(doc.select("//*[contains(@class,'btn-primary')]").unwrap(), vec![1]);
        assert_eq!(
            doc.select("//div[contains(@class,'main')]//button[text()='Cancel']").unwrap(),
            vec![2]
        );
    }

    #[test]
    fn boolean_predicates() {
        let els = page();
        let doc = SnapshotDocument::new(&els);
        assert_eq!(
            doc.select("//button[contains(@class,'btn') and not(@id)]").unwrap(),
            vec![2]
        );
        assert_eq!(
            doc.select("//*[@name='email' or @id='btnSend']").unwrap(),
            vec![1, 3]
        );
    }

    #[test]
    fn hyphenated_attribute_presence() {
        let mut labelled = ElementRecord::new("button", "/html/body/button[1]").with_data("data_qa", "enviar");
        labelled.aria_label = Some("Enviar".into());
        let els = vec![labelled, ElementRecord::new("button", "/html/body/button[2]")];
        let doc = SnapshotDocument::new(&els);
        assert_eq!(doc.select("//*[@aria-label]").unwrap(), vec![0]);
        assert_eq!(doc.select("//button[@data-qa]").unwrap(), vec![0]);
        assert_eq!(doc.select("//button[not(@aria-label)]").unwrap(), vec![1]);
    }

    #[test]
    fn uncaptured_ancestors_have_no_attributes() {
        let els = page();
        let doc = SnapshotDocument::new(&els);
        assert!(doc.select("//body[contains(@class,'x')]//button").unwrap().is_empty());
        assert!(!doc.resolves("//section"));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(XPathQuery::parse("button").is_err());
        assert!(XPathQuery::parse("//button[last()]").is_err());
        assert!(XPathQuery::parse("//button[contains(@class,'x']").is_err());
        assert!(XPathQuery::parse("//a").unwrap().is_relative());
        assert!(!XPathQuery::parse("/html/body").unwrap().is_relative());
    }
}
