//! One streaming pass: bytes in, decoded into a bounded parse buffer,
//! tokenized and dispatched as soon as whole tokens are available.

use html::{Step, Token, Tokenizer};
use tools::Utf8Decoder;

use crate::dispatch::Dispatcher;
use crate::error::RewriteError;
use crate::memory::{LimitedString, MemoryGovernor};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum State {
    Idle,
    Streaming,
    Finalizing,
    Aborted,
    Done,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::Streaming => "streaming",
            State::Finalizing => "finalizing",
            State::Aborted => "aborted",
            State::Done => "done",
        }
    }
}

pub(crate) struct Pass<'r> {
    state: State,
    decoder: Utf8Decoder,
    decoded: String,
    buffer: LimitedString,
    tokenizer: Tokenizer,
    dispatcher: Dispatcher<'r>,
    /// Buffer length at which tokenizing is retried after a `NeedMoreInput`.
    /// Doubling keeps rescans of one long token linear overall.
    retry_at: usize,
}

impl<'r> Pass<'r> {
    pub(crate) fn new(
        dispatcher: Dispatcher<'r>,
        governor: &MemoryGovernor,
        parse_buffer_capacity: usize,
    ) -> Result<Self, RewriteError> {
        Ok(Self {
            state: State::Idle,
            decoder: Utf8Decoder::new(),
            decoded: String::new(),
            buffer: LimitedString::with_capacity(governor, parse_buffer_capacity)?,
            tokenizer: Tokenizer::new(),
            dispatcher,
            retry_at: 0,
        })
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> State {
        self.state
    }

    fn transition(&mut self, next: State) {
        log::trace!(target: "rewriter.dispatch", "{} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    fn ensure_accepting(&self) -> Result<(), RewriteError> {
        match self.state {
            State::Aborted | State::Done => Err(RewriteError::Finished(self.state.name())),
            _ => Ok(()),
        }
    }

    /// Run `step`, moving to `Aborted` if it fails.
    fn guarded(&mut self, step: impl FnOnce(&mut Self) -> Result<(), RewriteError>) -> Result<(), RewriteError> {
        let result = step(self);
        if let Err(err) = &result {
            log::debug!(target: "rewriter.dispatch", "rewrite aborted: {err}");
            self.transition(State::Aborted);
        }
        result
    }

    pub(crate) fn write(&mut self, chunk: &[u8]) -> Result<(), RewriteError> {
        self.ensure_accepting()?;
        if self.state == State::Idle {
            self.transition(State::Streaming);
        }
        self.guarded(|pass| {
            pass.decoded.clear();
            pass.decoder.push(chunk, &mut pass.decoded);
            pass.buffer.push_str(&pass.decoded)?;
            if pass.buffer.len() >= pass.retry_at {
                pass.pump(false)?;
            }
            Ok(())
        })
    }

    pub(crate) fn end(mut self) -> Result<LimitedString, RewriteError> {
        self.ensure_accepting()?;
        self.transition(State::Finalizing);
        self.guarded(|pass| {
            pass.decoded.clear();
            pass.decoder.finish(&mut pass.decoded);
            pass.buffer.push_str(&pass.decoded)?;
            pass.pump(true)
        })?;
        self.transition(State::Done);
        Ok(self.dispatcher.into_output())
    }

    fn pump(&mut self, at_eof: bool) -> Result<(), RewriteError> {
        let mut consumed = 0;
        loop {
            match self.tokenizer.next_token(&self.buffer.as_str()[consumed..], at_eof) {
                Step::Token(Token::Eof) => {
                    self.dispatcher.dispatch(Token::Eof, &mut self.tokenizer)?;
                    break;
                }
                Step::Token(token) => {
                    consumed += token.raw().len();
                    self.dispatcher.dispatch(token, &mut self.tokenizer)?;
                }
                Step::NeedMoreInput => break,
            }
        }
        self.buffer.consume(consumed);
        self.retry_at = self.buffer.len().saturating_mul(2);
        Ok(())
    }
}
