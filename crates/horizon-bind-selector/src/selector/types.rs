//! Selector type definitions.

use std::fmt;
use std::str::FromStr;

use crate::error::SelectorError;

/// A comma-separated group of selectors (e.g., "h1, .title > span").
///
/// A node matches the list if it matches any of its selectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorList {
    /// The alternatives, in source order.
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    /// Parse a selector list.
    pub fn parse(input: &str) -> crate::Result<Self> {
        crate::parser::parse_selector_list(input)
    }

    /// A list containing a single selector.
    pub fn single(selector: Selector) -> Self {
        Self {
            selectors: vec![selector],
        }
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}

/// A complex selector (e.g., "svg g.circles > circle:first-child").
///
/// A selector consists of one or more compound parts connected by combinators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Compound parts from left to right.
    pub parts: Vec<SelectorPart>,
    /// Combinators between parts (length = parts.len() - 1).
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// Create a simple type selector.
    pub fn type_selector(tag: impl Into<String>) -> Self {
        Self {
            parts: vec![SelectorPart::type_only(tag)],
            combinators: vec![],
        }
    }

    /// Create a universal selector (*).
    pub fn universal() -> Self {
        Self {
            parts: vec![SelectorPart::universal()],
            combinators: vec![],
        }
    }

    /// Create a class selector.
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            parts: vec![SelectorPart::class_only(class_name)],
            combinators: vec![],
        }
    }

    /// Create an ID selector.
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            parts: vec![SelectorPart::id_only(id)],
            combinators: vec![],
        }
    }

    /// Add a descendant selector part.
    pub fn descendant(self, part: SelectorPart) -> Self {
        self.combine(Combinator::Descendant, part)
    }

    /// Add a child selector part.
    pub fn child(self, part: SelectorPart) -> Self {
        self.combine(Combinator::Child, part)
    }

    /// Add a part with an explicit combinator.
    pub fn combine(mut self, combinator: Combinator, part: SelectorPart) -> Self {
        if !self.parts.is_empty() {
            self.combinators.push(combinator);
        }
        self.parts.push(part);
        self
    }

    /// Get the rightmost (subject) selector part.
    pub fn subject(&self) -> Option<&SelectorPart> {
        self.parts.last()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                match &self.combinators[i - 1] {
                    Combinator::Descendant => write!(f, " ")?,
                    Combinator::Child => write!(f, " > ")?,
                    Combinator::AdjacentSibling => write!(f, " + ")?,
                    Combinator::GeneralSibling => write!(f, " ~ ")?,
                }
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// A compound selector (e.g., "circle.dot[r]:first-child").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorPart {
    /// Type selector (tag name or universal).
    pub type_selector: Option<TypeSelector>,
    /// ID selector (#id), matched against the `id` attribute.
    pub id: Option<String>,
    /// Class selectors (.class).
    pub classes: Vec<String>,
    /// Attribute selectors ([name], [name=value], ...).
    pub attributes: Vec<AttributeSelector>,
    /// Structural pseudo-classes (:first-child, :not(..), ...).
    pub pseudo_classes: Vec<PseudoClass>,
}

impl SelectorPart {
    /// Create a new empty selector part.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a type-only selector.
    pub fn type_only(tag: impl Into<String>) -> Self {
        Self {
            type_selector: Some(TypeSelector::Type(tag.into())),
            ..Default::default()
        }
    }

    /// Create a universal selector part.
    pub fn universal() -> Self {
        Self {
            type_selector: Some(TypeSelector::Universal),
            ..Default::default()
        }
    }

    /// Create a class-only selector.
    pub fn class_only(class_name: impl Into<String>) -> Self {
        Self {
            classes: vec![class_name.into()],
            ..Default::default()
        }
    }

    /// Create an ID-only selector.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Add a type selector.
    pub fn with_type(mut self, tag: impl Into<String>) -> Self {
        self.type_selector = Some(TypeSelector::Type(tag.into()));
        self
    }

    /// Add an ID selector.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class selector.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add an attribute selector.
    pub fn with_attribute(mut self, attribute: AttributeSelector) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a pseudo-class selector.
    pub fn with_pseudo(mut self, pseudo: PseudoClass) -> Self {
        self.pseudo_classes.push(pseudo);
        self
    }

    /// Whether this part has no constraints at all.
    pub fn is_empty(&self) -> bool {
        self.type_selector.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_selector {
            Some(TypeSelector::Universal) => write!(f, "*")?,
            Some(TypeSelector::Type(t)) => write!(f, "{}", t)?,
            None => {}
        }

        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }

        for class in &self.classes {
            write!(f, ".{}", class)?;
        }

        for attribute in &self.attributes {
            write!(f, "{}", attribute)?;
        }

        for pseudo in &self.pseudo_classes {
            write!(f, ":{}", pseudo)?;
        }

        Ok(())
    }
}

/// Type selector - matches the element's local tag name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSelector {
    /// Universal selector (*) - matches any element.
    Universal,
    /// Named type (e.g., "div", "circle").
    Type(String),
}

/// Combinator between selector parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator (space): matches any descendant.
    Descendant,
    /// Child combinator (>): matches direct child only.
    Child,
    /// Adjacent sibling (+): matches immediately following sibling.
    AdjacentSibling,
    /// General sibling (~): matches any following sibling.
    GeneralSibling,
}

/// An attribute selector such as `[href^="http"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    /// Attribute name.
    pub name: String,
    /// How the value is compared.
    pub operator: AttributeOperator,
}

impl AttributeSelector {
    /// `[name]`
    pub fn exists(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator: AttributeOperator::Exists,
        }
    }

    /// `[name="value"]`
    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator: AttributeOperator::Equals(value.into()),
        }
    }

    /// Check an attribute value (None when the attribute is absent).
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.operator {
            AttributeOperator::Exists => true,
            AttributeOperator::Equals(v) => value == v,
            AttributeOperator::Includes(v) => value.split_whitespace().any(|w| w == v),
            AttributeOperator::DashMatch(v) => {
                value == v || value.strip_prefix(v.as_str()).is_some_and(|r| r.starts_with('-'))
            }
            AttributeOperator::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
            AttributeOperator::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
            AttributeOperator::Substring(v) => !v.is_empty() && value.contains(v.as_str()),
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (op, value) = match &self.operator {
            AttributeOperator::Exists => return write!(f, "[{}]", self.name),
            AttributeOperator::Equals(v) => ("=", v),
            AttributeOperator::Includes(v) => ("~=", v),
            AttributeOperator::DashMatch(v) => ("|=", v),
            AttributeOperator::Prefix(v) => ("^=", v),
            AttributeOperator::Suffix(v) => ("$=", v),
            AttributeOperator::Substring(v) => ("*=", v),
        };
        write!(f, "[{}{}{:?}]", self.name, op, value)
    }
}

/// Attribute comparison operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeOperator {
    /// `[a]`
    Exists,
    /// `[a=v]`
    Equals(String),
    /// `[a~=v]` - whitespace-separated word.
    Includes(String),
    /// `[a|=v]` - exact or followed by `-`.
    DashMatch(String),
    /// `[a^=v]`
    Prefix(String),
    /// `[a$=v]`
    Suffix(String),
    /// `[a*=v]`
    Substring(String),
}

/// Structural pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    /// :root - the document root element.
    Root,
    /// :first-child - first among element siblings.
    FirstChild,
    /// :last-child - last among element siblings.
    LastChild,
    /// :only-child - only element child of its parent.
    OnlyChild,
    /// :nth-child(An+B)
    NthChild(NthExpr),
    /// :nth-last-child(An+B) - counted from the end.
    NthLastChild(NthExpr),
    /// :empty - has no children, not even text.
    Empty,
    /// :not(selector) - negation.
    Not(Box<SelectorPart>),
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoClass::Root => write!(f, "root"),
            PseudoClass::FirstChild => write!(f, "first-child"),
            PseudoClass::LastChild => write!(f, "last-child"),
            PseudoClass::OnlyChild => write!(f, "only-child"),
            PseudoClass::NthChild(expr) => write!(f, "nth-child({})", expr),
            PseudoClass::NthLastChild(expr) => write!(f, "nth-last-child({})", expr),
            PseudoClass::Empty => write!(f, "empty"),
            PseudoClass::Not(inner) => write!(f, "not({})", inner),
        }
    }
}

impl PseudoClass {
    /// Parse an argument-less pseudo-class name.
    pub fn from_css(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "root" => Some(Self::Root),
            "first-child" => Some(Self::FirstChild),
            "last-child" => Some(Self::LastChild),
            "only-child" => Some(Self::OnlyChild),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }
}

/// Expression for :nth-child (An+B).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NthExpr {
    /// Coefficient (A in An+B).
    pub a: i32,
    /// Offset (B in An+B).
    pub b: i32,
}

impl NthExpr {
    /// Create a new nth expression.
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Check if a 0-indexed position matches this expression.
    pub fn matches(&self, index: usize) -> bool {
        let n = index as i32 + 1;
        if self.a == 0 {
            n == self.b
        } else {
            let diff = n - self.b;
            if self.a > 0 {
                diff >= 0 && diff % self.a == 0
            } else {
                diff <= 0 && diff % self.a == 0
            }
        }
    }

    /// :nth-child(odd) = 2n+1.
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// :nth-child(even) = 2n.
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// :nth-child(n) - matches all.
    pub fn all() -> Self {
        Self { a: 1, b: 0 }
    }
}

impl fmt::Display for NthExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (2, 1) => write!(f, "odd"),
            (2, 0) => write!(f, "even"),
            (0, b) => write!(f, "{}", b),
            (1, 0) => write!(f, "n"),
            (a, 0) => write!(f, "{}n", a),
            (1, b) if b > 0 => write!(f, "n+{}", b),
            (1, b) => write!(f, "n{}", b),
            (a, b) if b > 0 => write!(f, "{}n+{}", a, b),
            (a, b) => write!(f, "{}n{}", a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_display() {
        let sel = Selector::type_selector("svg")
            .descendant(SelectorPart::class_only("dot").with_pseudo(PseudoClass::FirstChild));
        assert_eq!(sel.to_string(), "svg .dot:first-child");

        let sel = Selector::type_selector("g").child(SelectorPart::type_only("circle"));
        assert_eq!(sel.to_string(), "g > circle");
    }

    #[test]
    fn test_selector_part_display() {
        let part = SelectorPart::type_only("rect")
            .with_class("bar")
            .with_attribute(AttributeSelector::equals("fill", "red"))
            .with_pseudo(PseudoClass::NthChild(NthExpr::odd()));
        assert_eq!(part.to_string(), "rect.bar[fill=\"red\"]:nth-child(odd)");
    }

    #[test]
    fn test_attribute_operators() {
        let sel = AttributeSelector {
            name: "class".into(),
            operator: AttributeOperator::Includes("b".into()),
        };
        assert!(sel.matches(Some("a b c")));
        assert!(!sel.matches(Some("abc")));
        assert!(!sel.matches(None));

        let sel = AttributeSelector {
            name: "lang".into(),
            operator: AttributeOperator::DashMatch("en".into()),
        };
        assert!(sel.matches(Some("en")));
        assert!(sel.matches(Some("en-US")));
        assert!(!sel.matches(Some("english")));

        let sel = AttributeSelector {
            name: "href".into(),
            operator: AttributeOperator::Prefix(String::new()),
        };
        assert!(!sel.matches(Some("anything")));
    }

    #[test]
    fn test_nth_expr_matches() {
        // :nth-child(3)
        let expr = NthExpr::new(0, 3);
        assert!(!expr.matches(0));
        assert!(!expr.matches(1));
        assert!(expr.matches(2));
        assert!(!expr.matches(3));

        let expr = NthExpr::odd();
        assert!(expr.matches(0));
        assert!(!expr.matches(1));
        assert!(expr.matches(2));

        let expr = NthExpr::even();
        assert!(!expr.matches(0));
        assert!(expr.matches(1));

        // -n+2: first two
        let expr = NthExpr::new(-1, 2);
        assert!(expr.matches(0));
        assert!(expr.matches(1));
        assert!(!expr.matches(2));
    }
}
