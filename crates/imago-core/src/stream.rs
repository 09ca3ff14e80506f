use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// A pull source of bytes. File, stdin and in-memory backends implement
/// this; the reader and the stream built-ins only ever see the trait.
pub trait ByteSource {
    fn next_byte(&mut self) -> Option<u8>;
}

pub struct FileSource(BufReader<File>);

impl ByteSource for FileSource {
    fn next_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.0.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }
}

pub struct StdinSource;

impl ByteSource for StdinSource {
    fn next_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match std::io::stdin().read(&mut buf) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }
}

pub struct MemSource {
    data: Vec<u8>,
    pos: usize,
}

impl ByteSource for MemSource {
    fn next_byte(&mut self) -> Option<u8> {
        let b = self.data.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }
}

/// A readable byte stream with one byte of lookahead and a line counter.
/// The line counter is what `*stream-line*` is kept in sync with.
pub struct InputStream {
    src: Box<dyn ByteSource>,
    peeked: Option<u8>,
    pub line: u64,
}

impl InputStream {
    pub fn new(src: Box<dyn ByteSource>) -> Self {
        InputStream {
            src,
            peeked: None,
            line: 1,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(InputStream::new(Box::new(FileSource(BufReader::new(file)))))
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        InputStream::new(Box::new(MemSource {
            data: data.into(),
            pos: 0,
        }))
    }

    pub fn stdin() -> Self {
        InputStream::new(Box::new(StdinSource))
    }

    pub fn peek(&mut self) -> Option<u8> {
        if self.peeked.is_none() {
            self.peeked = self.src.next_byte();
        }
        self.peeked
    }

    pub fn next(&mut self) -> Option<u8> {
        let b = match self.peeked.take() {
            Some(b) => Some(b),
            None => self.src.next_byte(),
        };
        if b == Some(b'\n') {
            self.line += 1;
        }
        b
    }

    /// Read up to and including the next newline; the newline itself is
    /// consumed but not returned. `None` only at end of input with no
    /// bytes read.
    pub fn read_line(&mut self) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            match self.next() {
                Some(b'\n') => return Some(out),
                Some(b) => out.push(b),
                None => {
                    if out.is_empty() {
                        return None;
                    }
                    return Some(out);
                }
            }
        }
    }
}

impl fmt::Debug for InputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<istream line {}>", self.line)
    }
}

/// Where an output stream delivers its bytes.
pub enum OutSink {
    Memory(Vec<u8>),
    Stdout,
}

/// A writable byte sink. The in-memory form backs `string-stream`; its
/// accumulated contents are extracted by the `str` built-in.
pub struct OutputStream {
    sink: OutSink,
}

impl OutputStream {
    pub fn memory(initial: impl Into<Vec<u8>>) -> Self {
        OutputStream {
            sink: OutSink::Memory(initial.into()),
        }
    }

    pub fn stdout() -> Self {
        OutputStream {
            sink: OutSink::Stdout,
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        match &mut self.sink {
            OutSink::Memory(buf) => buf.extend_from_slice(bytes),
            OutSink::Stdout => {
                let _ = std::io::stdout().write_all(bytes);
            }
        }
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.write(&[byte]);
    }

    /// Accumulated contents of a memory sink; `None` for pass-through
    /// sinks.
    pub fn contents(&self) -> Option<&[u8]> {
        match &self.sink {
            OutSink::Memory(buf) => Some(buf),
            OutSink::Stdout => None,
        }
    }
}

impl fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sink {
            OutSink::Memory(_) => write!(f, "<ostream memory>"),
            OutSink::Stdout => write!(f, "<ostream stdout>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut s = InputStream::from_bytes("ab");
        assert_eq!(s.peek(), Some(b'a'));
        assert_eq!(s.peek(), Some(b'a'));
        assert_eq!(s.next(), Some(b'a'));
        assert_eq!(s.next(), Some(b'b'));
        assert_eq!(s.next(), None);
    }

    #[test]
    fn line_counting() {
        let mut s = InputStream::from_bytes("a\nb\nc");
        assert_eq!(s.line, 1);
        while s.next().is_some() {}
        assert_eq!(s.line, 3);
    }

    #[test]
    fn read_line_strips_newline() {
        let mut s = InputStream::from_bytes("one\ntwo");
        assert_eq!(s.read_line(), Some(b"one".to_vec()));
        assert_eq!(s.read_line(), Some(b"two".to_vec()));
        assert_eq!(s.read_line(), None);
    }

    #[test]
    fn memory_sink_accumulates() {
        let mut out = OutputStream::memory("");
        out.write(b"hello ");
        out.write_byte(b'x');
        assert_eq!(out.contents(), Some(&b"hello x"[..]));
    }
}
