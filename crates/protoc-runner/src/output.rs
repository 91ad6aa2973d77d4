//! Captured protoc output.
//!
//! Protoc writes UTF-8 regardless of the platform locale. Output is kept as
//! raw bytes and decoded as UTF-8 when read, so multi-byte characters are
//! never mangled by an intermediate locale decoding.

/// An append-only capture buffer for one output stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    bytes: Vec<u8>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes from the stream.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Returns the raw captured bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the capture as text.
    pub fn text(&self) -> String {
        normalize_output(&self.bytes)
    }
}

/// Decodes process output as UTF-8, replacing invalid sequences.
pub fn normalize_output(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
