use crate::selector::SimpleImpl;
use scraper::ElementRef;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::parser::SelectorImpl;
use selectors::{Element as ServoElement, OpaqueElement};

type Ident = <SimpleImpl as SelectorImpl>::Identifier;

/// Adapter exposing a `scraper` element to Servo's selector matcher.
///
/// Tag, id, class, attribute, ancestry and sibling relations are supported;
/// dynamic pseudo-classes never match.
#[derive(Clone, Debug)]
pub struct PageElement<'a> {
    inner: ElementRef<'a>,
}

impl<'a> PageElement<'a> {
    pub fn new(inner: ElementRef<'a>) -> Self {
        Self { inner }
    }
}

impl<'a> ServoElement for PageElement<'a> {
    type Impl = SimpleImpl;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(&self.inner)
    }

    fn parent_element(&self) -> Option<Self> {
        self.inner.parent().and_then(ElementRef::wrap).map(PageElement::new)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.inner
            .prev_siblings()
            .find(|sib| sib.value().is_element())
            .and_then(ElementRef::wrap)
            .map(PageElement::new)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.inner
            .next_siblings()
            .find(|sib| sib.value().is_element())
            .and_then(ElementRef::wrap)
            .map(PageElement::new)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.inner
            .children()
            .find(|child| child.value().is_element())
            .and_then(ElementRef::wrap)
            .map(PageElement::new)
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &<SimpleImpl as SelectorImpl>::BorrowedLocalName) -> bool {
        self.inner.value().name().eq_ignore_ascii_case(name)
    }

    fn has_namespace(&self, _ns: &<SimpleImpl as SelectorImpl>::BorrowedNamespaceUrl) -> bool {
        true
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.inner
            .value()
            .name()
            .eq_ignore_ascii_case(other.inner.value().name())
    }

    fn attr_matches(
        &self,
        _ns: &NamespaceConstraint<&<SimpleImpl as SelectorImpl>::NamespaceUrl>,
        local_name: &<SimpleImpl as SelectorImpl>::LocalName,
        operation: &AttrSelectorOperation<&<SimpleImpl as SelectorImpl>::AttrValue>,
    ) -> bool {
        self.inner
            .value()
            .attr(local_name.as_ref())
            .is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        _pc: &<SimpleImpl as SelectorImpl>::NonTSPseudoClass,
        _context: &mut selectors::matching::MatchingContext<SimpleImpl>,
    ) -> bool {
        false
    }

    fn match_pseudo_element(
        &self,
        _pe: &<SimpleImpl as SelectorImpl>::PseudoElement,
        _context: &mut selectors::matching::MatchingContext<SimpleImpl>,
    ) -> bool {
        false
    }

    fn apply_selector_flags(&self, _flags: selectors::matching::ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        self.inner.value().name().eq_ignore_ascii_case("a")
            && self.inner.value().attr("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn imported_part(&self, _name: &Ident) -> Option<Ident> {
        None
    }

    fn is_part(&self, _name: &Ident) -> bool {
        false
    }

    fn has_id(&self, id: &Ident, case: CaseSensitivity) -> bool {
        self.inner
            .value()
            .attr("id")
            .is_some_and(|v| case.eq(v.as_bytes(), id.as_ref().as_bytes()))
    }

    fn has_class(&self, name: &Ident, case: CaseSensitivity) -> bool {
        let needle = name.as_ref().as_bytes();
        self.inner
            .value()
            .classes()
            .any(|c| case.eq(c.as_bytes(), needle))
    }

    fn is_empty(&self) -> bool {
        self.inner.children().next().is_none()
    }

    fn is_root(&self) -> bool {
        self.parent_element().is_none()
    }
}
