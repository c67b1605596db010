//! Stylesheet selector parsing and matching on top of Servo's `selectors`.

use crate::element::PageElement;
use cssparser::{CssStringWriter, Parser as CssParser, ParserInput, ToCss, serialize_identifier};
use selectors::NthIndexCache;
use selectors::context::QuirksMode;
use selectors::matching::{
    IgnoreNthChildForInvalidation, MatchingContext, MatchingMode, NeedsSelectorFlags,
    matches_selector_list,
};
use selectors::parser::{
    ParseRelative, Parser as SelParser, SelectorImpl, SelectorList, SelectorParseErrorKind,
};

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CssIdent(pub String);

impl AsRef<str> for CssIdent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl std::borrow::Borrow<str> for CssIdent {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl<'a> From<&'a str> for CssIdent {
    fn from(s: &'a str) -> Self {
        Self(s.to_owned())
    }
}
impl ToCss for CssIdent {
    fn to_css<W>(&self, dest: &mut W) -> std::fmt::Result
    where
        W: std::fmt::Write,
    {
        serialize_identifier(&self.0, dest)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CssAttrValue(pub String);

impl AsRef<str> for CssAttrValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl<'a> From<&'a str> for CssAttrValue {
    fn from(s: &'a str) -> Self {
        Self(s.to_owned())
    }
}
impl ToCss for CssAttrValue {
    fn to_css<W>(&self, dest: &mut W) -> std::fmt::Result
    where
        W: std::fmt::Write,
    {
        use std::fmt::Write;
        write!(CssStringWriter::new(dest), "{}", &self.0)
    }
}

/// Selector implementation without dynamic pseudo-classes or pseudo-elements.
/// Rules using `:hover`, `::before` and friends fail to parse and are dropped.
#[derive(Clone, Debug)]
pub enum SimpleImpl {}

impl SelectorImpl for SimpleImpl {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssAttrValue;
    type Identifier = CssIdent;
    type LocalName = CssIdent;
    type NamespaceUrl = CssIdent;
    type NamespacePrefix = CssIdent;
    type BorrowedNamespaceUrl = str;
    type BorrowedLocalName = str;
    type NonTSPseudoClass = Never;
    type PseudoElement = Never;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Never {}

impl ToCss for Never {
    fn to_css<W>(&self, _dest: &mut W) -> std::fmt::Result
    where
        W: std::fmt::Write,
    {
        Ok(())
    }
}

impl selectors::parser::NonTSPseudoClass for Never {
    type Impl = SimpleImpl;
    fn is_active_or_hover(&self) -> bool {
        false
    }
    fn is_user_action_state(&self) -> bool {
        false
    }
}

impl selectors::parser::PseudoElement for Never {
    type Impl = SimpleImpl;
    fn accepts_state_pseudo_classes(&self) -> bool {
        false
    }
    fn valid_after_slotted(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
pub struct RuleSelector(SelectorList<SimpleImpl>);

#[derive(Default)]
struct RuleSelectorParser;

impl<'i> SelParser<'i> for RuleSelectorParser {
    type Impl = SimpleImpl;
    type Error = SelectorParseErrorKind<'i>;
}

impl RuleSelector {
    pub fn parse(input: &str) -> Option<Self> {
        let mut input = ParserInput::new(input);
        let mut parser = CssParser::new(&mut input);
        SelectorList::parse(&RuleSelectorParser, &mut parser, ParseRelative::No)
            .ok()
            .map(RuleSelector)
    }

    pub fn matches(&self, el: &PageElement) -> bool {
        let mut cache = NthIndexCache::default();
        let mut ctx = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut cache,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            IgnoreNthChildForInvalidation::No,
        );
        matches_selector_list(&self.0, el, &mut ctx)
    }

    /// Highest specificity in the list.
    pub fn specificity(&self) -> u32 {
        self.0.0.iter().map(|sel| sel.specificity()).max().unwrap_or(0)
    }
}

/// Split a selector group on top-level commas so one unsupported member
/// (e.g. `a:hover` in `a, a:hover`) does not discard the whole rule.
pub fn split_selector_group(group: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in group.chars() {
        match ch {
            '(' | '[' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                if !current.trim().is_empty() {
                    out.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specificity_orders_id_over_class() {
        let id = RuleSelector::parse("#x .a").unwrap();
        let class = RuleSelector::parse(".a").unwrap();
        assert!(id.specificity() > class.specificity());
    }

    #[test]
    fn dynamic_pseudo_classes_are_rejected() {
        assert!(RuleSelector::parse("a:hover").is_none());
        assert!(RuleSelector::parse(":root").is_some());
    }

    #[test]
    fn group_split_respects_brackets() {
        let parts = split_selector_group("a, a:hover, [data-x=\"1,2\"], :is(b, c)");
        assert_eq!(parts, vec!["a", "a:hover", "[data-x=\"1,2\"]", ":is(b, c)"]);
    }
}
