//! User handlers and how they are bound to the dispatcher.

use css::{Selector, SelectorError};

use crate::comment::Comment;
use crate::element::Element;
use crate::error::{HandlerContractError, HandlerResult};
use crate::text::TextChunk;

/// A content transformation driven by a [`Selector`].
///
/// Callbacks default to no-ops, so a handler only implements what its
/// selector targets. Element callbacks fire once per matching start tag;
/// text and comment callbacks fire for every run inside an element matching
/// the selector's text target. Any error aborts the rewrite.
pub trait Handler {
    /// Returning `None` makes the handler impossible to dispatch; the
    /// rewriter rejects it at construction.
    fn selector(&self) -> Option<&Selector>;

    fn handle_element(&mut self, _element: &mut Element<'_>) -> HandlerResult {
        Ok(())
    }

    fn handle_text(&mut self, _text: &mut TextChunk<'_, '_>) -> HandlerResult {
        Ok(())
    }

    fn handle_comment(&mut self, _comment: &mut Comment<'_, '_>) -> HandlerResult {
        Ok(())
    }
}

/// Which callbacks a handler's selector can trigger; checked once at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Element,
    Text,
    Both,
}

impl Capability {
    pub fn of(selector: &Selector) -> Self {
        match (selector.match_element().is_some(), selector.match_text_within().is_some()) {
            (true, true) => Capability::Both,
            (true, false) => Capability::Element,
            _ => Capability::Text,
        }
    }

    pub fn handles_elements(self) -> bool {
        matches!(self, Capability::Element | Capability::Both)
    }

    pub fn handles_text(self) -> bool {
        matches!(self, Capability::Text | Capability::Both)
    }
}

pub(crate) struct Binding {
    pub(crate) index: usize,
    pub(crate) selector: Selector,
    pub(crate) capability: Capability,
    pub(crate) handler: Box<dyn Handler + Send>,
}

impl Binding {
    pub(crate) fn register(handlers: Vec<Box<dyn Handler + Send>>) -> Result<Vec<Binding>, HandlerContractError> {
        handlers
            .into_iter()
            .enumerate()
            .map(|(index, handler)| {
                let selector = handler
                    .selector()
                    .cloned()
                    .ok_or(HandlerContractError::MissingSelector { handler: index })?;
                let capability = Capability::of(&selector);
                log::trace!(target: "rewriter.dispatch", "handler #{index} registered as {capability:?}");
                Ok(Binding {
                    index,
                    selector,
                    capability,
                    handler,
                })
            })
            .collect()
    }
}

/// Handler built from a selector and an element callback.
pub struct ElementHandlerFn<F> {
    selector: Selector,
    callback: F,
}

impl<F> ElementHandlerFn<F>
where
    F: FnMut(&mut Element<'_>) -> HandlerResult,
{
    pub fn new(selector: Selector, callback: F) -> Self {
        Self { selector, callback }
    }
}

impl<F> Handler for ElementHandlerFn<F>
where
    F: FnMut(&mut Element<'_>) -> HandlerResult,
{
    fn selector(&self) -> Option<&Selector> {
        Some(&self.selector)
    }

    fn handle_element(&mut self, element: &mut Element<'_>) -> HandlerResult {
        (self.callback)(element)
    }
}

/// Handler built from a selector and a text callback.
pub struct TextHandlerFn<F> {
    selector: Selector,
    callback: F,
}

impl<F> TextHandlerFn<F>
where
    F: FnMut(&mut TextChunk<'_, '_>) -> HandlerResult,
{
    pub fn new(selector: Selector, callback: F) -> Self {
        Self { selector, callback }
    }
}

impl<F> Handler for TextHandlerFn<F>
where
    F: FnMut(&mut TextChunk<'_, '_>) -> HandlerResult,
{
    fn selector(&self) -> Option<&Selector> {
        Some(&self.selector)
    }

    fn handle_text(&mut self, text: &mut TextChunk<'_, '_>) -> HandlerResult {
        (self.callback)(text)
    }
}

/// Boxed element handler for `css`.
pub fn element_handler<F>(css: &str, callback: F) -> Result<Box<dyn Handler + Send>, SelectorError>
where
    F: FnMut(&mut Element<'_>) -> HandlerResult + Send + 'static,
{
    Ok(Box::new(ElementHandlerFn::new(Selector::element(css)?, callback)))
}

/// Boxed text handler for text inside elements matching `css`.
pub fn text_handler<F>(css: &str, callback: F) -> Result<Box<dyn Handler + Send>, SelectorError>
where
    F: FnMut(&mut TextChunk<'_, '_>) -> HandlerResult + Send + 'static,
{
    Ok(Box::new(TextHandlerFn::new(Selector::text_within(css)?, callback)))
}
