//! Selector syntax parser using the `cssparser` crate.
//!
//! Parses selector lists such as `"g.circles > circle, #legend text"` into a
//! [`SelectorList`]. Whitespace is significant (descendant combinator), so the
//! complex-selector loop reads tokens with `next_including_whitespace`.

use cssparser::{
    BasicParseErrorKind, ParseError as CssParseError, ParseErrorKind, Parser, ParserInput, Token,
};
use horizon_bind_core::logging::targets;

use crate::error::{Result, SelectorError};
use crate::selector::{
    AttributeOperator, AttributeSelector, Combinator, NthExpr, PseudoClass, Selector,
    SelectorList, SelectorPart, TypeSelector,
};

type ParseResult<'i, T> = std::result::Result<T, CssParseError<'i, String>>;

/// Parse a comma-separated selector list.
///
/// # Example
///
/// ```
/// use horizon_bind_selector::parse_selector_list;
///
/// let list = parse_selector_list("h1, ul > li.item").unwrap();
/// assert_eq!(list.selectors.len(), 2);
/// assert_eq!(list.to_string(), "h1, ul > li.item");
/// ```
pub fn parse_selector_list(input: &str) -> Result<SelectorList> {
    if input.trim().is_empty() {
        return Err(SelectorError::invalid_selector(input, "Empty selector"));
    }

    let mut parser_input = ParserInput::new(input);
    let mut parser = Parser::new(&mut parser_input);
    parser
        .parse_comma_separated(|p| parse_selector(p))
        .map(|selectors| SelectorList { selectors })
        .map_err(convert_error)
}

/// Parse a selector list, logging and discarding malformed input.
///
/// Malformed selectors match nothing, so callers treat `None` as an empty
/// match set.
pub fn parse_or_warn(input: &str) -> Option<SelectorList> {
    match parse_selector_list(input) {
        Ok(list) => Some(list),
        Err(e) => {
            tracing::warn!(target: targets::SELECTOR, selector = input, error = %e, "ignoring malformed selector");
            None
        }
    }
}

fn convert_error(error: CssParseError<'_, String>) -> SelectorError {
    let message = match error.kind {
        ParseErrorKind::Custom(message) => message,
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("Unexpected token {:?}", token)
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => "Unexpected end of input".into(),
        ParseErrorKind::Basic(other) => format!("{:?}", other),
    };
    SelectorError::parse(message, error.location.line + 1, error.location.column)
}

/// Parse one complex selector, up to the next comma.
fn parse_selector<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Selector> {
    let mut parts = vec![];
    let mut combinators = vec![];
    let mut current_part = SelectorPart::default();
    let mut pending: Option<Combinator> = None;

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {
                if !current_part.is_empty() {
                    parts.push(std::mem::take(&mut current_part));
                    pending = Some(Combinator::Descendant);
                }
            }

            Token::Delim(c @ ('>' | '+' | '~')) => {
                if !current_part.is_empty() {
                    parts.push(std::mem::take(&mut current_part));
                }
                if parts.is_empty() || pending.is_some_and(|p| p != Combinator::Descendant) {
                    return Err(parser.new_custom_error(format!("Unexpected combinator '{}'", c)));
                }
                pending = Some(match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::AdjacentSibling,
                    _ => Combinator::GeneralSibling,
                });
            }

            token => {
                if current_part.is_empty() && !parts.is_empty() {
                    combinators.push(pending.take().unwrap_or(Combinator::Descendant));
                }
                parse_simple(parser, token, &mut current_part)?;
            }
        }
    }

    if !current_part.is_empty() {
        parts.push(current_part);
    } else if pending.is_some_and(|p| p != Combinator::Descendant) {
        return Err(parser.new_custom_error("Selector ends with a combinator".to_string()));
    }

    if parts.is_empty() {
        return Err(parser.new_custom_error("Empty selector".to_string()));
    }

    Ok(Selector { parts, combinators })
}

/// Apply one simple-selector token to a compound part.
fn parse_simple<'i>(
    parser: &mut Parser<'i, '_>,
    token: Token<'i>,
    part: &mut SelectorPart,
) -> ParseResult<'i, ()> {
    match token {
        Token::Ident(name) => {
            if !part.is_empty() {
                return Err(parser.new_custom_error(format!(
                    "Type selector '{}' must come first in a compound selector",
                    name
                )));
            }
            part.type_selector = Some(TypeSelector::Type(name.to_string()));
        }

        Token::Delim('*') => {
            if !part.is_empty() {
                return Err(parser.new_custom_error("'*' must come first".to_string()));
            }
            part.type_selector = Some(TypeSelector::Universal);
        }

        Token::Delim('.') => match parser.next_including_whitespace()?.clone() {
            Token::Ident(class) => part.classes.push(class.to_string()),
            other => return Err(parser.new_unexpected_token_error(other)),
        },

        Token::IDHash(id) | Token::Hash(id) => {
            if part.id.is_some() {
                return Err(parser.new_custom_error("Duplicate id selector".to_string()));
            }
            part.id = Some(id.to_string());
        }

        Token::SquareBracketBlock => {
            let attribute = parser.parse_nested_block(|p| parse_attribute(p))?;
            part.attributes.push(attribute);
        }

        Token::Colon => {
            let pseudo = parse_pseudo(parser)?;
            part.pseudo_classes.push(pseudo);
        }

        other => return Err(parser.new_unexpected_token_error(other)),
    }
    Ok(())
}

/// Parse the pseudo-class following a ':'.
fn parse_pseudo<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, PseudoClass> {
    match parser.next_including_whitespace()?.clone() {
        Token::Ident(name) => PseudoClass::from_css(&name)
            .ok_or_else(|| parser.new_custom_error(format!("Unknown pseudo-class ':{}'", name))),

        Token::Function(name) => match name.to_ascii_lowercase().as_str() {
            "nth-child" => Ok(PseudoClass::NthChild(
                parser.parse_nested_block(|p| parse_nth_expr(p))?,
            )),
            "nth-last-child" => Ok(PseudoClass::NthLastChild(
                parser.parse_nested_block(|p| parse_nth_expr(p))?,
            )),
            "not" => Ok(PseudoClass::Not(Box::new(
                parser.parse_nested_block(|p| parse_compound(p))?,
            ))),
            _ => Err(parser.new_custom_error(format!("Unknown pseudo-class ':{}()'", name))),
        },

        other => Err(parser.new_unexpected_token_error(other)),
    }
}

/// Parse a single compound selector (the argument of `:not()`).
fn parse_compound<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, SelectorPart> {
    let mut part = SelectorPart::default();
    parser.skip_whitespace();

    while let Ok(token) = parser.next_including_whitespace() {
        let token = token.clone();
        if matches!(token, Token::WhiteSpace(_)) {
            parser.skip_whitespace();
            if parser.is_exhausted() {
                break;
            }
            return Err(parser.new_custom_error(":not() takes a single compound selector".to_string()));
        }
        parse_simple(parser, token, &mut part)?;
    }

    if part.is_empty() {
        return Err(parser.new_custom_error("Empty :not() argument".to_string()));
    }
    Ok(part)
}

/// Parse the inside of `[...]`.
fn parse_attribute<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, AttributeSelector> {
    let name = parser.expect_ident()?.to_string();
    if parser.is_exhausted() {
        return Ok(AttributeSelector::exists(name));
    }

    let operator_token = parser.next()?.clone();
    let value = match parser.next()?.clone() {
        Token::Ident(v) | Token::QuotedString(v) => v.to_string(),
        other => return Err(parser.new_unexpected_token_error(other)),
    };

    let operator = match operator_token {
        Token::Delim('=') => AttributeOperator::Equals(value),
        Token::IncludeMatch => AttributeOperator::Includes(value),
        Token::DashMatch => AttributeOperator::DashMatch(value),
        Token::PrefixMatch => AttributeOperator::Prefix(value),
        Token::SuffixMatch => AttributeOperator::Suffix(value),
        Token::SubstringMatch => AttributeOperator::Substring(value),
        other => return Err(parser.new_unexpected_token_error(other)),
    };

    Ok(AttributeSelector { name, operator })
}

/// Parse nth-child expression (e.g., "odd", "even", "3", "2n+1", "-n+3").
fn parse_nth_expr<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, NthExpr> {
    let token = parser.next()?.clone();
    let parsed = match &token {
        Token::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "odd" => return Ok(NthExpr::odd()),
            "even" => return Ok(NthExpr::even()),
            other => split_an(other, 1),
        },
        Token::Number {
            int_value: Some(n), ..
        } => return Ok(NthExpr::new(0, *n)),
        Token::Dimension {
            int_value: Some(a),
            unit,
            ..
        } => split_an(&unit.to_ascii_lowercase(), *a),
        _ => None,
    };

    let Some((a, inline_b)) = parsed else {
        return Err(parser.new_unexpected_token_error(token));
    };

    let b = match inline_b {
        Some(b) => b,
        None => parser.try_parse(parse_nth_offset).unwrap_or(0),
    };
    Ok(NthExpr::new(a, b))
}

/// Split an `n`-unit such as `n`, `-n` or `n-2` into (A, inline B).
fn split_an(unit: &str, coefficient: i32) -> Option<(i32, Option<i32>)> {
    let (sign, rest) = match unit.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, unit),
    };
    let a = sign * coefficient;
    if rest == "n" {
        return Some((a, None));
    }
    let offset = rest.strip_prefix("n-")?;
    offset.parse::<i32>().ok().map(|b| (a, Some(-b)))
}

/// Parse the `+ B` / `- B` tail of an nth expression.
fn parse_nth_offset<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, i32> {
    match parser.next()?.clone() {
        Token::Number {
            has_sign: true,
            int_value: Some(b),
            ..
        } => Ok(b),
        Token::Delim('+') => Ok(parser.expect_integer()?),
        Token::Delim('-') => Ok(-parser.expect_integer()?),
        other => Err(parser.new_unexpected_token_error(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Selector {
        let mut list = parse_selector_list(input).unwrap();
        assert_eq!(list.selectors.len(), 1);
        list.selectors.remove(0)
    }

    #[test]
    fn test_parse_type_class_id() {
        let sel = parse_one("g.circles-group#main");
        assert_eq!(sel.parts.len(), 1);
        let part = &sel.parts[0];
        assert_eq!(part.type_selector, Some(TypeSelector::Type("g".into())));
        assert_eq!(part.classes, vec!["circles-group".to_string()]);
        assert_eq!(part.id.as_deref(), Some("main"));
    }

    #[test]
    fn test_parse_descendant_and_child() {
        let sel = parse_one("body  div > .a p");
        assert_eq!(sel.parts.len(), 4);
        assert_eq!(
            sel.combinators,
            vec![Combinator::Descendant, Combinator::Child, Combinator::Descendant]
        );
        assert_eq!(sel.to_string(), "body div > .a p");
    }

    #[test]
    fn test_parse_class_after_space_is_new_part() {
        let sel = parse_one("div .note");
        assert_eq!(sel.parts.len(), 2);
        assert_eq!(sel.parts[1].classes, vec!["note".to_string()]);
    }

    #[test]
    fn test_parse_siblings_without_spaces() {
        let sel = parse_one("li+li~p");
        assert_eq!(
            sel.combinators,
            vec![Combinator::AdjacentSibling, Combinator::GeneralSibling]
        );
    }

    #[test]
    fn test_parse_list() {
        let list = parse_selector_list("#one, #three").unwrap();
        assert_eq!(list.selectors.len(), 2);
        assert_eq!(list.selectors[1].parts[0].id.as_deref(), Some("three"));
    }

    #[test]
    fn test_parse_attributes() {
        let sel = parse_one(r#"a[href^="http"][target]"#);
        let attrs = &sel.parts[0].attributes;
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].operator, AttributeOperator::Prefix("http".into()));
        assert_eq!(attrs[1].operator, AttributeOperator::Exists);
    }

    #[test]
    fn test_parse_pseudo_classes() {
        let sel = parse_one("li:nth-child(2n+1):not(.skip)");
        let pseudos = &sel.parts[0].pseudo_classes;
        assert_eq!(pseudos[0], PseudoClass::NthChild(NthExpr::new(2, 1)));
        assert_eq!(
            pseudos[1],
            PseudoClass::Not(Box::new(SelectorPart::class_only("skip")))
        );
    }

    #[test]
    fn test_parse_nth_forms() {
        let nth = |s: &str| match &parse_one(&format!("li:nth-child({s})")).parts[0].pseudo_classes[0] {
            PseudoClass::NthChild(e) => e.clone(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(nth("odd"), NthExpr::odd());
        assert_eq!(nth("even"), NthExpr::even());
        assert_eq!(nth("3"), NthExpr::new(0, 3));
        assert_eq!(nth("n"), NthExpr::new(1, 0));
        assert_eq!(nth("-n+3"), NthExpr::new(-1, 3));
        assert_eq!(nth("2n-1"), NthExpr::new(2, -1));
        assert_eq!(nth("3n + 2"), NthExpr::new(3, 2));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_selector_list(""),
            Err(SelectorError::InvalidSelector { .. })
        ));
        assert!(matches!(
            parse_selector_list("div >"),
            Err(SelectorError::Parse { .. })
        ));
        assert!(parse_selector_list("> div").is_err());
        assert!(parse_selector_list("div:hover").is_err());
        assert!(parse_selector_list("a,").is_err());
        assert!(parse_selector_list(".").is_err());
        assert!(parse_selector_list("div[").is_err());
    }

    #[test]
    fn test_parse_or_warn_discards() {
        assert!(parse_or_warn("[[").is_none());
        assert!(parse_or_warn("p").is_some());
    }
}
