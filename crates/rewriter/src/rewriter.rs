use sanitizer::Sanitizer;

use crate::dispatch::Dispatcher;
use crate::error::{ConfigurationError, RewriteError};
use crate::handler::{Binding, Handler};
use crate::memory::{LimitedString, MemoryGovernor};
use crate::options::{DocumentMode, ResourceBudget, RewriterOptions};
use crate::stream::Pass;

/// Bytes handed to a pass at a time.
const CHUNK_SIZE: usize = 64 * 1024;

/// Parse buffer capacity when no budget says otherwise.
const DEFAULT_PARSE_BUFFER: usize = 16 * 1024;

/// Runs the sanitizer and handlers over whole documents.
///
/// Each call to [`Rewriter::rewrite`] runs to completion in one pass: the
/// sanitizer sees every token first, then handlers in registration order.
/// Markup that handlers insert is trusted, except that with a sanitizer whose
/// `escape_tagfilter` is on, a second pass removes escape-worthy tags
/// (`script`, `iframe`, `textarea`, ...) the policy does not allow.
pub struct Rewriter {
    sanitizer: Option<Sanitizer>,
    handlers: Vec<Binding>,
    budget: Option<ResourceBudget>,
    mode: DocumentMode,
    peak_memory: usize,
}

impl Rewriter {
    pub fn new(
        sanitizer: Option<Sanitizer>,
        handlers: Vec<Box<dyn Handler + Send>>,
        options: RewriterOptions,
    ) -> Result<Self, RewriteError> {
        if sanitizer.is_none() && handlers.is_empty() {
            return Err(ConfigurationError::NothingToDo.into());
        }
        let budget = ResourceBudget::from_settings(options.memory.as_ref())?;
        let handlers = Binding::register(handlers)?;
        log::debug!(
            target: "rewriter.dispatch",
            "rewriter with sanitizer={} handlers={} budget={budget:?} mode={:?}",
            sanitizer.is_some(),
            handlers.len(),
            options.document_mode
        );
        Ok(Self {
            sanitizer,
            handlers,
            budget,
            mode: options.document_mode,
            peak_memory: 0,
        })
    }

    /// Pure sanitization with default options.
    pub fn sanitize_only(sanitizer: Sanitizer) -> Self {
        Self {
            sanitizer: Some(sanitizer),
            handlers: Vec::new(),
            budget: None,
            mode: DocumentMode::default(),
            peak_memory: 0,
        }
    }

    /// Most buffered bytes the previous rewrite held at once.
    pub fn peak_memory(&self) -> usize {
        self.peak_memory
    }

    /// Rewrite `input`, decoding it as UTF-8 (invalid sequences become U+FFFD).
    pub fn rewrite(&mut self, input: &[u8]) -> Result<Vec<u8>, RewriteError> {
        self.rewrite_chunks(input.chunks(CHUNK_SIZE)).map(String::into_bytes)
    }

    pub fn rewrite_str(&mut self, input: &str) -> Result<String, RewriteError> {
        self.rewrite_chunks(input.as_bytes().chunks(CHUNK_SIZE))
    }

    /// Rewrite a document that arrives in pieces. The result does not depend
    /// on where the pieces are split.
    pub fn rewrite_chunks<'c, I>(&mut self, chunks: I) -> Result<String, RewriteError>
    where
        I: IntoIterator<Item = &'c [u8]>,
    {
        let governor = MemoryGovernor::new(self.budget.as_ref());
        let result = self.run(chunks, &governor);
        self.peak_memory = governor.peak();
        result
    }

    fn run<'c, I>(&mut self, chunks: I, governor: &MemoryGovernor) -> Result<String, RewriteError>
    where
        I: IntoIterator<Item = &'c [u8]>,
    {
        let budget = self.budget.as_ref();
        let sanitizer = self.sanitizer.as_ref();
        let dispatcher = Dispatcher::new(sanitizer, &mut self.handlers, self.mode, LimitedString::new(governor));
        let mut current = run_pass(dispatcher, budget, chunks, governor)?;

        if let Some(sanitizer) = sanitizer
            && sanitizer.escape_tagfilter()
            && !self.handlers.is_empty()
        {
            let input = current.as_str().as_bytes().chunks(CHUNK_SIZE);
            let dispatcher = Dispatcher::tag_filter(sanitizer, self.mode, LimitedString::new(governor));
            current = run_pass(dispatcher, budget, input, governor)?;
        }
        log::debug!(
            target: "rewriter.dispatch",
            "rewrite done, peak memory {} bytes",
            governor.peak()
        );
        Ok(current.into_string())
    }
}

fn run_pass<'c, I>(
    dispatcher: Dispatcher<'_>,
    budget: Option<&ResourceBudget>,
    chunks: I,
    governor: &MemoryGovernor,
) -> Result<LimitedString, RewriteError>
where
    I: IntoIterator<Item = &'c [u8]>,
{
    let capacity = budget.map_or(DEFAULT_PARSE_BUFFER, |b| b.preallocated_parsing_buffer_size);
    let mut pass = Pass::new(dispatcher, governor, capacity)?;
    for chunk in chunks {
        pass.write(chunk)?;
    }
    pass.end()
}
