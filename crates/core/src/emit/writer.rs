const INDENT: &str = "    ";

/// Line-oriented source builder with four-space indentation
#[derive(Debug, Default)]
pub struct SourceWriter {
    buffer: String,
    depth: usize,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current depth. Empty lines carry no indentation.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buffer.push_str(INDENT);
            }
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Write every line of `text` at the current depth
    pub fn lines(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            self.line(line.trim_end());
        }
        self
    }

    /// `header {`, the body one level deeper, then `}`
    pub fn block(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.line(format!("{} {{", header.as_ref()));
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self.line("}")
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks() {
        let mut writer = SourceWriter::new();
        writer.block("impl Foo", |w| {
            w.block("fn bar(&self)", |w| {
                w.line("todo!()");
            });
            w.blank();
            w.lines("fn baz() {}\n  \nfn qux() {}");
        });

        assert_eq!(
            writer.finish(),
            "impl Foo {\n    fn bar(&self) {\n        todo!()\n    }\n\n    fn baz() {}\n\n    fn qux() {}\n}\n"
        );
    }
}
