/// Rebuilds answer text from chunks that may be cumulative or incremental.
///
/// A chunk that starts with the previous raw chunk contributes only its
/// suffix; any other chunk is appended whole. An incremental chunk that happens
/// to repeat the previous chunk as its prefix is indistinguishable from a
/// cumulative one and gets trimmed.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    full: String,
    prev: String,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw chunk and returns the text reconstructed so far.
    pub fn push(&mut self, chunk: &str) -> &str {
        let add = chunk.strip_prefix(self.prev.as_str()).unwrap_or(chunk);
        self.full.push_str(add);
        self.prev.clear();
        self.prev.push_str(chunk);
        &self.full
    }

    pub fn text(&self) -> &str {
        &self.full
    }

    pub fn into_text(self) -> String {
        self.full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(chunks: &[&str]) -> String {
        let mut a = StreamAssembler::new();
        for c in chunks {
            a.push(c);
        }
        a.into_text()
    }

    #[test]
    fn cumulative_chunks() {
        assert_eq!(assemble(&["Hello", "Hello world"]), "Hello world");
        assert_eq!(assemble(&["He", "Hello", "Hello, ", "Hello, there."]), "Hello, there.");
    }

    #[test]
    fn incremental_chunks() {
        assert_eq!(assemble(&["Hello", " world"]), "Hello world");
        assert_eq!(assemble(&["The ", "status ", "is ", "Active."]), "The status is Active.");
    }

    #[test]
    fn repeated_cumulative_chunk_adds_nothing() {
        assert_eq!(assemble(&["Hello", "Hello", "Hello!"]), "Hello!");
    }

    #[test]
    fn coincidental_prefix_is_trimmed() {
        // "ha" then incremental "haha" reads as cumulative.
        assert_eq!(assemble(&["ha", "haha"]), "haha");
    }

    #[test]
    fn empty_stream_is_empty_text() {
        assert_eq!(assemble(&[]), "");
        let mut a = StreamAssembler::new();
        assert_eq!(a.push(""), "");
        assert_eq!(a.push("Hi"), "Hi");
    }
}
