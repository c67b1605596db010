use std::collections::{BTreeMap, HashMap, HashSet};
use std::iter::Peekable;
use std::str::Chars;

use scraper::ElementRef;
use tracing::warn;

use crate::diagnostics::diagnostics_enabled;
use crate::element::PageElement;
use crate::properties::longhands;
use crate::selector::{RuleSelector, split_selector_group};
use crate::types::{MediaEnvironment, budgets_from_env};

#[derive(Debug, Clone)]
struct Declaration {
    name: String,
    value: String,
    important: bool,
}

#[derive(Debug, Clone)]
struct Rule {
    selector: RuleSelector,
    declarations: Vec<Declaration>,
    specificity: u32,
    order: usize,
}

/// (important, specificity, source order, position within the block)
type Priority = (bool, u32, usize, usize);

#[derive(Default)]
struct RuleIndex {
    by_id: HashMap<String, Vec<usize>>,
    by_class: HashMap<String, Vec<usize>>,
    by_tag: HashMap<String, Vec<usize>>,
    universal: Vec<usize>,
}

impl RuleIndex {
    fn add_keys(&mut self, idx: usize, keys: RightmostKeys) {
        let mut keyed = false;
        if let Some(id) = keys.id {
            self.by_id.entry(id).or_default().push(idx);
            keyed = true;
        }
        for c in keys.classes {
            self.by_class.entry(c).or_default().push(idx);
            keyed = true;
        }
        if let Some(t) = keys.tag {
            self.by_tag.entry(t).or_default().push(idx);
            keyed = true;
        }
        if !keyed {
            self.universal.push(idx);
        }
    }

    fn candidates_for(&self, el: &ElementRef) -> Vec<usize> {
        let mut set: HashSet<usize> = HashSet::new();
        if let Some(v) = el.value().attr("id").and_then(|id| self.by_id.get(id)) {
            set.extend(v);
        }
        for class in el.value().classes() {
            if let Some(v) = self.by_class.get(&class.to_ascii_lowercase()) {
                set.extend(v);
            }
        }
        if let Some(v) = self.by_tag.get(&el.value().name().to_ascii_lowercase()) {
            set.extend(v);
        }
        set.extend(self.universal.iter().copied());
        let mut out: Vec<usize> = set.into_iter().collect();
        out.sort_unstable();
        out
    }
}

/// Parsed author stylesheets for one page.
pub struct StyleSheet {
    rules: Vec<Rule>,
    index: RuleIndex,
    root_vars: HashMap<String, String>,
}

impl StyleSheet {
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            index: RuleIndex::default(),
            root_vars: HashMap::new(),
        }
    }

    pub fn from_sources(sources: &[String], media: MediaEnvironment) -> Self {
        let mut sheet = StyleSheet::empty();
        let budgets = budgets_from_env();
        let mut order = 0usize;
        let mut dropped = 0usize;
        'sources: for css in sources {
            for (group, body) in split_rules(css, media) {
                let decls = parse_declarations(&body);
                if decls.is_empty() {
                    continue;
                }
                order += 1;
                for selector_text in split_selector_group(&group) {
                    if sheet.rules.len() >= budgets.max_rules {
                        warn!(
                            max_rules = budgets.max_rules,
                            "stylesheet rule limit reached; remaining rules ignored"
                        );
                        break 'sources;
                    }
                    let Some(selector) = RuleSelector::parse(&selector_text) else {
                        dropped += 1;
                        continue;
                    };
                    if is_root_selector(&selector_text) {
                        for d in decls.iter().filter(|d| d.name.starts_with("--")) {
                            sheet.root_vars.insert(d.name.clone(), d.value.clone());
                        }
                    }
                    let idx = sheet.rules.len();
                    sheet.index.add_keys(idx, rightmost_keys(&selector_text));
                    sheet.rules.push(Rule {
                        specificity: selector.specificity(),
                        selector,
                        declarations: decls.clone(),
                        order,
                    });
                }
            }
        }
        if diagnostics_enabled("css") {
            tracing::debug!(
                rules = sheet.rules.len(),
                dropped,
                root_vars = sheet.root_vars.len(),
                "diagnostics: stylesheet built"
            );
        }
        sheet
    }

    /// Custom property declared on `:root`/`html`, with `var()` references resolved.
    pub fn root_var(&self, name: &str) -> Option<String> {
        self.root_vars
            .get(name)
            .map(|v| resolve_vars(v, &self.root_vars))
    }

    /// Declared property winners for an element: selector cascade ordered by
    /// importance, specificity and source order, then the inline style.
    /// `var()` references are resolved from root custom properties and
    /// shorthands are expanded, so the keys are longhands.
    pub fn declared_for(&self, el: &ElementRef, inline: Option<&str>) -> BTreeMap<String, String> {
        let mut winners: HashMap<String, (Priority, String)> = HashMap::new();
        let page_el = PageElement::new(el.clone());

        for idx in self.index.candidates_for(el) {
            let rule = &self.rules[idx];
            if !rule.selector.matches(&page_el) {
                continue;
            }
            for (pos, decl) in rule.declarations.iter().enumerate() {
                let prio = (decl.important, rule.specificity, rule.order, pos);
                self.apply(&mut winners, decl, prio);
            }
        }

        if let Some(inline_raw) = inline {
            for (pos, decl) in parse_declarations(inline_raw).iter().enumerate() {
                let prio = (decl.important, u32::MAX, usize::MAX, pos);
                self.apply(&mut winners, decl, prio);
            }
        }

        winners
            .into_iter()
            .map(|(name, (_, value))| (name, value))
            .collect()
    }

    fn apply(
        &self,
        winners: &mut HashMap<String, (Priority, String)>,
        decl: &Declaration,
        prio: Priority,
    ) {
        let value = resolve_vars(&decl.value, &self.root_vars);
        for (name, value) in longhands(&decl.name, &value) {
            let should_set = winners
                .get(&name)
                .is_none_or(|(existing, _)| prio > *existing);
            if should_set {
                winners.insert(name, (prio, value));
            }
        }
    }
}

fn is_root_selector(selector: &str) -> bool {
    let s = selector.trim();
    s == ":root" || s.eq_ignore_ascii_case("html")
}

// Block splitter yielding (selector group, body) pairs.
fn split_rules(css: &str, media: MediaEnvironment) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let commented = strip_css_comments(css);
    let source = flatten_at_rules(&commented, media);
    for raw in source.split('}') {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some((sel, body)) = trimmed.split_once('{') {
            let sel = sel.trim();
            let body = body.trim();
            if !sel.is_empty() && !body.is_empty() {
                out.push((sel.to_string(), body.to_string()));
            }
        }
    }
    out
}

fn strip_css_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_comment = false;
    while let Some(ch) = chars.next() {
        if in_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_comment = false;
            }
        } else if ch == '/' && chars.peek() == Some(&'*') {
            chars.next();
            in_comment = true;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Remove at-rules. `@media` blocks conditioned on `prefers-color-scheme`
/// are inlined when they match `media`; every other block at-rule is dropped
/// along with statement at-rules such as `@import` and `@charset`.
fn flatten_at_rules(source: &str, media: MediaEnvironment) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let ident_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(after.len());
        let ident = after[..ident_len].to_ascii_lowercase();
        let Some(end) = after.find(['{', ';']) else {
            rest = "";
            break;
        };
        if after.as_bytes()[end] == b';' {
            rest = &after[end + 1..];
            continue;
        }
        let prelude = &after[ident_len..end];
        let block_start = end + 1;
        let mut depth = 1i32;
        let mut close = after.len();
        for (i, ch) in after[block_start..].char_indices() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = block_start + i;
                        break;
                    }
                }
                _ => {}
            }
        }
        if ident == "media" && media.matches_prelude(prelude) {
            let inner = &after[block_start..close.min(after.len())];
            out.push_str(&flatten_at_rules(inner, media));
            out.push('\n');
        }
        rest = after.get(close + 1..).unwrap_or("");
    }
    out.push_str(rest);
    out
}

fn parse_declarations(source: &str) -> Vec<Declaration> {
    split_declarations(source)
        .into_iter()
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let name = if name.starts_with("--") {
                name.to_string()
            } else {
                name.to_ascii_lowercase()
            };
            let mut value = value.trim();
            let mut important = false;
            if let Some(pos) = value.to_ascii_lowercase().rfind("!important") {
                important = true;
                value = value[..pos].trim();
            }
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some(Declaration {
                name,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

// Split on ';' outside of parentheses and quotes (data URIs carry semicolons).
fn split_declarations(source: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            (None, ';') if depth <= 0 => {
                out.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&source[start..]);
    out
}

struct RightmostKeys {
    id: Option<String>,
    classes: Vec<String>,
    tag: Option<String>,
}

fn take_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut buf = String::new();
    while let Some(n) = chars.peek().copied() {
        if n == '\\' {
            // `\:` is a literal colon
            chars.next();
            buf.extend(chars.next());
        } else if n.is_alphanumeric() || n == '-' || n == '_' {
            buf.push(n);
            chars.next();
        } else {
            break;
        }
    }
    buf
}

/// Hex escapes (which may end in a space) and escaped combinator
/// characters both look like combinators to the rightmost-segment split.
fn escape_breaks_split(selector_text: &str) -> bool {
    selector_text.split('\\').skip(1).any(|rest| {
        rest.starts_with(|c: char| {
            c.is_ascii_hexdigit() || c.is_whitespace() || matches!(c, '>' | '+' | '~')
        })
    })
}

fn rightmost_keys(selector_text: &str) -> RightmostKeys {
    let mut keys = RightmostKeys {
        id: None,
        classes: Vec::new(),
        tag: None,
    };
    // Quoted attribute values, functional pseudo-classes and some escapes
    // defeat the split below; index those rules as universal.
    if selector_text.contains(['"', '\'', '(']) || escape_breaks_split(selector_text) {
        return keys;
    }
    let segment = selector_text
        .rsplit(|c: char| c.is_whitespace() || c == '>' || c == '+' || c == '~')
        .next()
        .unwrap_or(selector_text)
        .trim();
    let mut chars = segment.chars().peekable();
    while let Some(ch) = chars.peek().copied() {
        match ch {
            '.' => {
                chars.next();
                let ident = take_ident(&mut chars);
                if !ident.is_empty() {
                    keys.classes.push(ident.to_ascii_lowercase());
                }
            }
            '#' => {
                chars.next();
                let ident = take_ident(&mut chars);
                if !ident.is_empty() {
                    keys.id = Some(ident);
                }
            }
            ':' => {
                return RightmostKeys {
                    id: None,
                    classes: Vec::new(),
                    tag: None,
                };
            }
            '[' => {
                for n in chars.by_ref() {
                    if n == ']' {
                        break;
                    }
                }
            }
            _ if keys.tag.is_none() && (ch.is_alphabetic() || ch == '_') => {
                let ident = take_ident(&mut chars);
                keys.tag = Some(ident.to_ascii_lowercase());
            }
            _ => {
                chars.next();
            }
        }
    }
    keys
}

fn resolve_vars(raw: &str, vars: &HashMap<String, String>) -> String {
    resolve_vars_depth(raw, vars, 0)
}

fn resolve_vars_depth(raw: &str, vars: &HashMap<String, String>, depth: usize) -> String {
    if depth > 8 || !raw.contains("var(") {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("var(") {
        out.push_str(&rest[..pos]);
        let inner_start = pos + 4;
        let mut level = 1i32;
        let mut close = None;
        for (i, ch) in rest[inner_start..].char_indices() {
            match ch {
                '(' => level += 1,
                ')' => {
                    level -= 1;
                    if level == 0 {
                        close = Some(inner_start + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(close) = close else {
            out.push_str(&rest[pos..]);
            return out;
        };
        let inner = rest[inner_start..close].trim();
        let (name, fallback) = match inner.split_once(',') {
            Some((n, fb)) => (n.trim(), Some(fb.trim())),
            None => (inner, None),
        };
        let value = match (vars.get(name), fallback) {
            (Some(v), _) => resolve_vars_depth(v, vars, depth + 1),
            (None, Some(fb)) => resolve_vars_depth(fb, vars, depth + 1),
            (None, None) => String::new(),
        };
        out.push_str(&value);
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}
