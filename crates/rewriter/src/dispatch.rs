//! Per-token dispatch: sanitizer first, then handlers in registration order,
//! then serialization into the output buffer.

use std::collections::HashMap;

use html::{
    Comment as CommentToken, Doctype, EndTag, StartTag, Text, TextType, Token, Tokenizer, is_foreign_root,
    is_void_element,
};
use sanitizer::Sanitizer;

use crate::comment::{Comment, CommentState};
use crate::element::{Element, ElementState, RemovalKind};
use crate::error::RewriteError;
use crate::handler::Binding;
use crate::memory::LimitedString;
use crate::options::DocumentMode;
use crate::sanitize::{filter_element, sanitize_element};
use crate::stack::{Frame, ScopeChange, TextScope};
use crate::text::{TextChunk, TextState};

pub(crate) struct Dispatcher<'r> {
    sanitizer: Option<&'r Sanitizer>,
    /// Only escape-worthy tags the policy denies are checked; everything else
    /// passes through as written.
    tag_filter: Option<&'r Sanitizer>,
    handlers: &'r mut [Binding],
    mode: DocumentMode,
    stack: Vec<Frame>,
    /// Open frames per source tag name, so an end tag with no open element
    /// is recognized without scanning the stack.
    open_names: HashMap<String, usize>,
    scopes: Vec<TextScope>,
    /// Index of the frame whose contents are being dropped.
    skip_from: Option<usize>,
    foreign_depth: usize,
    scratch: String,
    out: LimitedString,
}

impl<'r> Dispatcher<'r> {
    pub(crate) fn new(
        sanitizer: Option<&'r Sanitizer>,
        handlers: &'r mut [Binding],
        mode: DocumentMode,
        out: LimitedString,
    ) -> Self {
        let scopes = vec![TextScope::default(); handlers.len()];
        Self {
            sanitizer,
            tag_filter: None,
            handlers,
            mode,
            stack: Vec::new(),
            open_names: HashMap::new(),
            scopes,
            skip_from: None,
            foreign_depth: 0,
            scratch: String::new(),
            out,
        }
    }

    /// A pass that re-checks handler output for escape-worthy tags.
    pub(crate) fn tag_filter(sanitizer: &'r Sanitizer, mode: DocumentMode, out: LimitedString) -> Self {
        let mut dispatcher = Self::new(None, &mut [], mode, out);
        dispatcher.tag_filter = Some(sanitizer);
        dispatcher
    }

    pub(crate) fn dispatch(&mut self, token: Token<'_>, tokenizer: &mut Tokenizer) -> Result<(), RewriteError> {
        match token {
            Token::StartTag(tag) => self.start_tag(&tag, tokenizer),
            Token::EndTag(tag) => self.end_tag(&tag, tokenizer),
            Token::Text(text) => self.text(&text),
            Token::Comment(comment) => self.comment(&comment),
            Token::Doctype(doctype) => self.doctype(&doctype),
            Token::Incomplete(raw) => self.incomplete(raw),
            Token::Eof => self.finish(tokenizer),
        }
    }

    /// Close whatever is still open and hand back the output.
    pub(crate) fn finish(&mut self, tokenizer: &mut Tokenizer) -> Result<(), RewriteError> {
        while !self.stack.is_empty() {
            self.close_top(None, tokenizer)?;
        }
        Ok(())
    }

    pub(crate) fn into_output(self) -> LimitedString {
        self.out
    }

    fn skipping(&self) -> bool {
        self.skip_from.is_some()
    }

    fn emit_scratch(&mut self) -> Result<(), RewriteError> {
        self.out.push_str(&self.scratch)?;
        self.scratch.clear();
        Ok(())
    }

    /// A single space standing in for a removed block boundary, unless the
    /// output already ends in whitespace.
    fn wrap_space(&mut self) -> Result<(), RewriteError> {
        if !self.out.last_byte().is_some_and(|b| b.is_ascii_whitespace()) {
            self.out.push(' ')?;
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: &StartTag<'_>, tokenizer: &mut Tokenizer) -> Result<(), RewriteError> {
        let in_foreign = self.foreign_depth > 0;
        let void = is_void_element(&tag.name) || (in_foreign && tag.self_closing);

        if self.skipping() {
            if !void {
                let mut frame = Frame::skipped(&tag.name);
                self.enter_foreign(&mut frame, tokenizer);
                self.push_frame(frame);
            }
            return Ok(());
        }

        let mut state = ElementState::from_token(tag, !void);
        if let Some(sanitizer) = self.sanitizer {
            sanitize_element(sanitizer, tag, &mut state);
        } else if let Some(filter) = self.tag_filter {
            filter_element(filter, &tag.name, &mut state);
        }
        if !state.sanitized_out {
            for binding in self.handlers.iter_mut() {
                if !binding.capability.handles_elements() || !binding.selector.matches_element(&state, &self.stack) {
                    continue;
                }
                let mut element = Element::new(&mut state, &self.stack);
                binding
                    .handler
                    .handle_element(&mut element)
                    .map_err(|source| RewriteError::HandlerRuntime {
                        handler: binding.index,
                        source,
                    })?;
            }
        }

        log::trace!(
            target: "rewriter.dispatch",
            "<{}> depth={} removal={:?}",
            state.tag_name,
            self.stack.len(),
            state.removal
        );

        if state.wrap_whitespace && !void {
            self.wrap_space()?;
        }
        self.scratch.push_str(&state.before);
        if !state.is_removed() {
            if state.modified {
                state.serialize_start_tag(&mut self.scratch);
            } else {
                self.scratch.push_str(tag.raw);
            }
            match &state.inner {
                Some(inner) => self.scratch.push_str(inner),
                None => self.scratch.push_str(&state.prepend),
            }
        }
        self.emit_scratch()?;

        if void {
            self.out.push_str(&state.after)?;
            if state.wrap_whitespace {
                self.wrap_space()?;
            }
            return Ok(());
        }

        let changes: Vec<ScopeChange> = self
            .handlers
            .iter()
            .filter(|binding| binding.capability.handles_text())
            .filter_map(|binding| {
                let opens = binding.selector.opens_text_scope(&state, &self.stack);
                let ignores = binding.selector.ignores_text_within(&state.tag_name);
                (opens || ignores).then_some(ScopeChange {
                    handler: binding.index,
                    opens,
                    ignores,
                })
            })
            .collect();
        for change in &changes {
            self.scopes[change.handler].enter(*change);
        }

        let skip_contents = state.skips_contents();
        let unwrap_raw_text = state.removal == Some(RemovalKind::Tags) && tokenizer.text_type() != TextType::Data;
        let mut frame = Frame::open(state);
        frame.scope_changes = changes;
        frame.unwrap_raw_text = unwrap_raw_text;
        self.enter_foreign(&mut frame, tokenizer);
        if skip_contents {
            self.skip_from = Some(self.stack.len());
        }
        self.push_frame(frame);
        Ok(())
    }

    fn push_frame(&mut self, frame: Frame) {
        match self.open_names.get_mut(&frame.source_name) {
            Some(count) => *count += 1,
            None => {
                self.open_names.insert(frame.source_name.clone(), 1);
            }
        }
        self.stack.push(frame);
    }

    fn pop_frame(&mut self) -> Option<Frame> {
        let frame = self.stack.pop()?;
        if let Some(count) = self.open_names.get_mut(&frame.source_name) {
            *count -= 1;
            if *count == 0 {
                self.open_names.remove(&frame.source_name);
            }
        }
        Some(frame)
    }

    fn enter_foreign(&mut self, frame: &mut Frame, tokenizer: &mut Tokenizer) {
        if self.foreign_depth == 0 && is_foreign_root(&frame.source_name) {
            frame.foreign_root = true;
            self.foreign_depth = 1;
            tokenizer.set_foreign_content(true);
        } else if self.foreign_depth > 0 {
            self.foreign_depth += 1;
        }
    }

    fn end_tag(&mut self, tag: &EndTag<'_>, tokenizer: &mut Tokenizer) -> Result<(), RewriteError> {
        if !self.open_names.contains_key(tag.name.as_str()) {
            return self.stray_end_tag(tag);
        }
        // Every frame above the match gets closed, so the scan stays linear overall.
        let Some(index) = self.stack.iter().rposition(|frame| frame.source_name == tag.name) else {
            return self.stray_end_tag(tag);
        };
        while self.stack.len() > index + 1 {
            self.close_top(None, tokenizer)?;
        }
        self.close_top(Some(tag), tokenizer)
    }

    fn stray_end_tag(&mut self, tag: &EndTag<'_>) -> Result<(), RewriteError> {
        if self.skipping() {
            return Ok(());
        }
        match self.sanitizer {
            Some(sanitizer) if !sanitizer.allows_element(&tag.name) => Ok(()),
            Some(_) => {
                self.out.push_str("</")?;
                self.out.push_str(&tag.name)?;
                self.out.push_str(">")?;
                Ok(())
            }
            None => Ok(self.out.push_str(tag.raw)?),
        }
    }

    /// Pop the innermost frame. `end_tag` is `None` when the element is
    /// closed implicitly; no end tag is synthesized then.
    fn close_top(&mut self, end_tag: Option<&EndTag<'_>>, tokenizer: &mut Tokenizer) -> Result<(), RewriteError> {
        let Some(frame) = self.pop_frame() else {
            return Ok(());
        };
        let index = self.stack.len();
        for change in &frame.scope_changes {
            self.scopes[change.handler].leave(*change);
        }
        if self.foreign_depth > 0 {
            self.foreign_depth -= 1;
            if frame.foreign_root {
                self.foreign_depth = 0;
                tokenizer.set_foreign_content(false);
            }
        }

        match self.skip_from {
            Some(from) if from < index => return Ok(()),
            Some(from) if from == index => self.skip_from = None,
            _ => {}
        }

        if frame.removal.is_none() {
            self.scratch.push_str(&frame.append);
            if let Some(end_tag) = end_tag {
                if frame.rewrite_end_tag {
                    self.scratch.push_str("</");
                    self.scratch.push_str(&frame.tag_name);
                    self.scratch.push('>');
                } else {
                    self.scratch.push_str(end_tag.raw);
                }
            }
        }
        self.scratch.push_str(&frame.after);
        self.emit_scratch()?;
        if frame.wrap_whitespace {
            self.wrap_space()?;
        }
        Ok(())
    }

    fn text(&mut self, text: &Text<'_>) -> Result<(), RewriteError> {
        if self.skipping() {
            return Ok(());
        }
        let unwrap = text.text_type != TextType::Data && self.stack.last().is_some_and(|f| f.unwrap_raw_text);
        // Removing neighbouring markup can turn a bare `<` into a tag opener.
        let escape_lt = self.sanitizer.is_some() && text.text_type == TextType::Data;
        let mut state = TextState::new(text.raw, text.text_type, unwrap);
        state.escape_lt = escape_lt;
        for binding in self.handlers.iter_mut() {
            if !binding.capability.handles_text() || !self.scopes[binding.index].is_active() {
                continue;
            }
            let mut chunk = TextChunk::new(&mut state);
            binding
                .handler
                .handle_text(&mut chunk)
                .map_err(|source| RewriteError::HandlerRuntime {
                    handler: binding.index,
                    source,
                })?;
        }
        state.serialize(&mut self.scratch);
        self.emit_scratch()
    }

    fn comment(&mut self, comment: &CommentToken<'_>) -> Result<(), RewriteError> {
        if self.skipping() {
            return Ok(());
        }
        if let Some(sanitizer) = self.sanitizer
            && (!sanitizer.allow_comments() || !comment.terminated)
        {
            return Ok(());
        }
        let mut state = CommentState::new(comment.raw, comment.text);
        for binding in self.handlers.iter_mut() {
            if !binding.capability.handles_text() || !self.scopes[binding.index].is_active() {
                continue;
            }
            let mut view = Comment::new(&mut state);
            binding
                .handler
                .handle_comment(&mut view)
                .map_err(|source| RewriteError::HandlerRuntime {
                    handler: binding.index,
                    source,
                })?;
        }
        state.serialize(&mut self.scratch);
        self.emit_scratch()
    }

    fn doctype(&mut self, doctype: &Doctype<'_>) -> Result<(), RewriteError> {
        let dropped = self.skipping()
            || self.mode == DocumentMode::Fragment
            || self.sanitizer.is_some_and(|s| !s.allow_doctype());
        if dropped {
            return Ok(());
        }
        Ok(self.out.push_str(doctype.raw)?)
    }

    /// Markup cut off by the end of input.
    fn incomplete(&mut self, raw: &str) -> Result<(), RewriteError> {
        if self.skipping() || self.sanitizer.is_some() {
            return Ok(());
        }
        Ok(self.out.push_str(raw)?)
    }
}
