/// Decode UTF-8, dropping malformed byte sequences instead of failing or
/// substituting replacement characters.
pub fn decode_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Accumulates raw bytes from one channel and cuts them into lines.
///
/// Pipes deliver arbitrary chunks, so a line (or a multi-byte character) may
/// be split across reads; nothing is decoded until its terminator arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            lines.push(decode_utf8(&self.pending[start..end]));
            start = end + 1;
        }
        self.pending.drain(..start);
        lines
    }

    /// Flush an unterminated remainder once the channel has closed.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let tail = decode_utf8(&self.pending);
        self.pending.clear();
        Some(tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_lines() {
        let mut buf = LineBuffer::default();
        assert_eq!(buf.push(b"one\ntwo\n"), ["one", "two"]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn holds_partial_line_until_terminator() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"hel").is_empty());
        assert_eq!(buf.push(b"lo\nwor"), ["hello"]);
        assert_eq!(buf.finish().as_deref(), Some("wor"));
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn keeps_empty_lines() {
        let mut buf = LineBuffer::default();
        assert_eq!(buf.push(b"\n\nx\n"), ["", "", "x"]);
    }

    #[test]
    fn multibyte_char_split_across_chunks() {
        let bytes = "größe\n".as_bytes();
        let mut buf = LineBuffer::default();
        assert!(buf.push(&bytes[..3]).is_empty());
        assert_eq!(buf.push(&bytes[3..]), ["größe"]);
    }

    #[test]
    fn malformed_bytes_are_dropped() {
        assert_eq!(decode_utf8(b"ok\xff\xfeok"), "okok");
        let mut buf = LineBuffer::default();
        assert_eq!(buf.push(b"a\xc3b\n"), ["ab"]);
    }
}
