//! Incremental UTF-8 decoding for byte streams that arrive in arbitrary chunks.
//!
//! A multi-byte sequence split across two chunks is held back until its tail
//! arrives. Invalid sequences become U+FFFD and decoding keeps going, so the
//! decoder always makes forward progress on hostile input.

/// Longest possible incomplete UTF-8 prefix.
const MAX_PENDING: usize = 3;

#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: [u8; MAX_PENDING],
    pending_len: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes held back waiting for the rest of a sequence.
    pub fn pending_len(&self) -> usize {
        self.pending_len
    }

    /// Decode `bytes` and append the result to `out`.
    pub fn push(&mut self, bytes: &[u8], out: &mut String) {
        let mut rest = bytes;
        while self.pending_len > 0 && !rest.is_empty() {
            let need = sequence_len(self.pending[0]);
            if need == 0 {
                // Not a lead byte.
                out.push(char::REPLACEMENT_CHARACTER);
                self.pending_len = 0;
                break;
            }
            let missing = need - self.pending_len;
            let take = missing.min(rest.len());
            let mut scratch = [0u8; 4];
            scratch[..self.pending_len].copy_from_slice(&self.pending[..self.pending_len]);
            scratch[self.pending_len..self.pending_len + take].copy_from_slice(&rest[..take]);
            let filled = self.pending_len + take;
            match std::str::from_utf8(&scratch[..filled]) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending_len = 0;
                    rest = &rest[take..];
                }
                Err(err) if err.error_len().is_none() => {
                    // Still incomplete; `rest` was exhausted by `take`.
                    self.pending[..filled].copy_from_slice(&scratch[..filled]);
                    self.pending_len = filled;
                    rest = &rest[take..];
                }
                Err(err) => {
                    // The carried prefix is invalid. Emit one replacement for it and
                    // re-decode the borrowed bytes from the fresh chunk.
                    let bad = err.error_len().unwrap_or(1).max(1);
                    out.push(char::REPLACEMENT_CHARACTER);
                    let consumed_from_rest = bad.saturating_sub(self.pending_len);
                    self.pending_len = 0;
                    rest = &rest[consumed_from_rest.min(rest.len())..];
                }
            }
        }
        self.decode_run(rest, out);
    }

    /// Flush a dangling incomplete sequence as U+FFFD.
    pub fn finish(&mut self, out: &mut String) {
        if self.pending_len > 0 {
            out.push(char::REPLACEMENT_CHARACTER);
            self.pending_len = 0;
        }
    }

    fn decode_run(&mut self, mut bytes: &[u8], out: &mut String) {
        loop {
            match std::str::from_utf8(bytes) {
                Ok(s) => {
                    out.push_str(s);
                    return;
                }
                Err(err) => {
                    let (valid, tail) = bytes.split_at(err.valid_up_to());
                    if let Ok(s) = std::str::from_utf8(valid) {
                        out.push_str(s);
                    }
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            bytes = &tail[len..];
                        }
                        None => {
                            debug_assert!(tail.len() <= MAX_PENDING);
                            self.pending[..tail.len()].copy_from_slice(tail);
                            self.pending_len = tail.len();
                            return;
                        }
                    }
                }
            }
        }
    }
}

fn sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}
