//! Matching compiled selectors against an element and its open ancestors.

use crate::syntax::{AttributeOperator, AttributeSelector, Combinator, ComplexSelector, Compound, SelectorList, SimpleSelector};

/// What the matcher needs to know about an element.
pub trait MatchElement {
    /// ASCII-lowercase tag name.
    fn local_name(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl SelectorList {
    /// Whether any selector in the list matches `element`, whose open
    /// ancestors are given outermost-first.
    pub fn matches<E, A>(&self, element: &E, ancestors: &[A]) -> bool
    where
        E: MatchElement + ?Sized,
        A: MatchElement,
    {
        self.selectors.iter().any(|complex| complex.matches(element, ancestors))
    }
}

impl ComplexSelector {
    pub fn matches<E, A>(&self, element: &E, ancestors: &[A]) -> bool
    where
        E: MatchElement + ?Sized,
        A: MatchElement,
    {
        let Some(((combinator, subject), rest)) = self.parts.split_last() else {
            return false;
        };
        subject.matches(element) && match_leftward(rest, *combinator, ancestors) == Outcome::Matched
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Matched,
    /// Ran out of ancestors. Trying a candidate further out cannot help.
    Exhausted,
    /// Failed for this candidate; an outer descendant combinator may retry.
    Retry,
}

/// Match the compounds left of an already-matched one. `combinator` links the
/// last of `parts` to that matched compound.
///
/// A descendant combinator tries candidates innermost first and stops at the
/// first `Exhausted`, so one match visits each ancestor a bounded number of
/// times instead of backtracking over every split of the stack.
fn match_leftward<A: MatchElement>(parts: &[(Combinator, Compound)], combinator: Combinator, ancestors: &[A]) -> Outcome {
    let Some(((next_combinator, compound), rest)) = parts.split_last() else {
        return Outcome::Matched;
    };
    let mut remaining = ancestors;
    while let Some((candidate, above)) = remaining.split_last() {
        remaining = above;
        let outcome = if compound.matches(candidate) {
            match_leftward(rest, *next_combinator, above)
        } else {
            Outcome::Retry
        };
        match (outcome, combinator) {
            (Outcome::Matched | Outcome::Exhausted, _) => return outcome,
            (Outcome::Retry, Combinator::Child) => return Outcome::Retry,
            (Outcome::Retry, Combinator::Descendant) => {}
        }
    }
    Outcome::Exhausted
}

impl Compound {
    pub fn matches<E: MatchElement + ?Sized>(&self, element: &E) -> bool {
        self.simple.iter().all(|simple| simple.matches(element))
    }
}

impl SimpleSelector {
    fn matches<E: MatchElement + ?Sized>(&self, element: &E) -> bool {
        match self {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(name) => element.local_name().eq_ignore_ascii_case(name),
            SimpleSelector::Id(id) => element.attribute("id") == Some(id.as_str()),
            SimpleSelector::Class(class) => element
                .attribute("class")
                .is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class)),
            SimpleSelector::Attribute(attr) => attr.matches(element),
            SimpleSelector::Not(compounds) => !compounds.iter().any(|compound| compound.matches(element)),
        }
    }
}

impl AttributeSelector {
    fn matches<E: MatchElement + ?Sized>(&self, element: &E) -> bool {
        let Some(actual) = element.attribute(&self.name) else {
            return false;
        };
        let Some((operator, expected)) = &self.operator else {
            return true;
        };
        let (actual, expected) = if self.case_insensitive {
            (actual.to_ascii_lowercase(), expected.to_ascii_lowercase())
        } else {
            (actual.to_string(), expected.clone())
        };
        match operator {
            AttributeOperator::Equals => actual == expected,
            AttributeOperator::Includes => {
                !expected.is_empty() && actual.split_ascii_whitespace().any(|word| word == expected)
            }
            AttributeOperator::DashMatch => {
                actual == expected || actual.strip_prefix(expected.as_str()).is_some_and(|rest| rest.starts_with('-'))
            }
            AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(expected.as_str()),
            AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(expected.as_str()),
            AttributeOperator::Substring => !expected.is_empty() && actual.contains(expected.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct El {
        name: &'static str,
        attrs: Vec<(&'static str, &'static str)>,
    }

    impl MatchElement for El {
        fn local_name(&self) -> &str {
            self.name
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
        }
    }

    fn el(name: &'static str, attrs: &[(&'static str, &'static str)]) -> El {
        El {
            name,
            attrs: attrs.to_vec(),
        }
    }

    fn matches(selector: &str, element: &El, ancestors: &[El]) -> bool {
        SelectorList::parse(selector).expect("valid selector").matches(element, ancestors)
    }

    #[test]
    fn type_class_id_and_universal() {
        let a = el("a", &[("class", "x  anchor"), ("id", "top")]);
        assert!(matches("a", &a, &[]));
        assert!(matches("A", &a, &[]));
        assert!(matches("*", &a, &[]));
        assert!(matches(".anchor", &a, &[]));
        assert!(matches("a#top.x", &a, &[]));
        assert!(!matches("a.missing", &a, &[]));
        assert!(!matches("#TOP", &a, &[]));
    }

    #[test]
    fn attribute_operators() {
        let a = el("a", &[("href", "https://example.com/x.png"), ("lang", "en-US"), ("rel", "nofollow noopener")]);
        assert!(matches("[href]", &a, &[]));
        assert!(matches("[href^='https:']", &a, &[]));
        assert!(matches("[href^='HTTPS:' i]", &a, &[]));
        assert!(!matches("[href^='HTTPS:']", &a, &[]));
        assert!(matches("[href$='.png']", &a, &[]));
        assert!(matches("[href*=example]", &a, &[]));
        assert!(matches("[lang|=en]", &a, &[]));
        assert!(matches("[rel~=noopener]", &a, &[]));
        assert!(!matches("[rel~=noop]", &a, &[]));
        assert!(!matches("[href^='']", &a, &[]));
    }

    #[test]
    fn negation() {
        let plain = el("a", &[]);
        let anchor = el("a", &[("class", "anchor")]);
        assert!(matches("a:not([class=\"anchor\"])", &plain, &[]));
        assert!(!matches("a:not([class=\"anchor\"])", &anchor, &[]));
        assert!(!matches(":not(a, b)", &plain, &[]));
    }

    #[test]
    fn descendant_and_child_combinators() {
        let stack = [el("div", &[("class", "outer")]), el("p", &[]), el("span", &[])];
        let a = el("a", &[]);
        assert!(matches("div a", &a, &stack));
        assert!(matches("span > a", &a, &stack));
        assert!(!matches("p > a", &a, &stack));
        assert!(matches("div.outer p > span > a", &a, &stack));
        assert!(matches("div > p a", &a, &stack));
        assert!(!matches("p > div a", &a, &stack));
        assert!(!matches("div a", &a, &[]));
    }

    #[test]
    fn descendant_matching_backtracks() {
        // `div > p span`: the innermost `p` has no `div` parent, the outer one does.
        let stack = [el("div", &[]), el("p", &[]), el("section", &[]), el("p", &[])];
        let span = el("span", &[]);
        assert!(matches("div > p span", &span, &stack));
    }

    #[test]
    fn child_failure_retries_an_outer_descendant() {
        // `section > p` fails for the innermost `p` but holds further out.
        let stack = [el("section", &[]), el("p", &[]), el("div", &[]), el("p", &[])];
        let b = el("b", &[]);
        assert!(matches("section > p b", &b, &stack));
        assert!(!matches("article > p b", &b, &stack));
    }

    struct Counted<'c> {
        name: &'static str,
        lookups: &'c std::cell::Cell<usize>,
    }

    impl MatchElement for Counted<'_> {
        fn local_name(&self) -> &str {
            self.lookups.set(self.lookups.get() + 1);
            self.name
        }

        fn attribute(&self, _name: &str) -> Option<&str> {
            None
        }
    }

    #[test]
    fn failing_descendant_chain_visits_each_ancestor_once() {
        let lookups = std::cell::Cell::new(0);
        let depth = 2_000;
        let stack: Vec<Counted<'_>> = (0..depth)
            .map(|_| Counted {
                name: "div",
                lookups: &lookups,
            })
            .collect();
        let subject = el("div", &[]);
        let list = SelectorList::parse("p div div").expect("valid selector");
        assert!(!list.matches(&subject, &stack));
        assert!(lookups.get() <= depth + 2, "{} lookups for {depth} ancestors", lookups.get());
    }
}
