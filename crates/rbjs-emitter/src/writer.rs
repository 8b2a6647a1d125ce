//! Output buffer for the code generator.
//!
//! Besides appending, the writer supports inserting text at an earlier
//! position (declarations of pending names go in front of a body after it
//! has been emitted) and capturing a span of output so a handler can decide
//! how to wrap it.

#[derive(Debug, Default)]
pub(crate) struct Writer {
    buf: String,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Writer::default()
    }

    #[inline]
    pub(crate) fn put(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    /// Insert `text` at byte offset `mark`. Marks taken after `mark` shift.
    pub(crate) fn insert(&mut self, mark: usize, text: &str) {
        if mark >= self.buf.len() {
            self.buf.push_str(text);
        } else {
            self.buf.insert_str(mark, text);
        }
    }

    /// Remove and return everything written since `mark`.
    pub(crate) fn split_off(&mut self, mark: usize) -> String {
        if mark >= self.buf.len() {
            String::new()
        } else {
            self.buf.split_off(mark)
        }
    }

    pub(crate) fn truncate(&mut self, mark: usize) {
        self.buf.truncate(mark);
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}
