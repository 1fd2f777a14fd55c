/// Generated source, kept line by line. A line gets its indentation when the first text is
/// written on it, so blank lines between members carry no trailing spaces.
pub(crate) struct Buf {
    lines: Vec<String>,
    current: Option<String>,
}

/// Spaces per nesting level of generated classes.
pub(crate) const INDENT: u16 = 4;

impl Buf {
    pub fn new() -> Buf {
        Buf {
            lines: Vec::new(),
            current: None,
        }
    }

    pub fn write(&mut self, indent: u16, text: &str) {
        debug_assert!(!text.contains('\n'));
        let line = self
            .current
            .get_or_insert_with(|| " ".repeat(usize::from(indent)));
        line.push_str(text);
    }

    pub fn end_line(&mut self) {
        let line = self.current.take().unwrap_or_default();
        self.lines.push(line);
    }

    /// Ends the current line, then leaves one empty line between two members.
    pub fn separate(&mut self) {
        if self.current.is_some() {
            self.end_line();
        }
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
        }
    }

    pub fn into_string(self) -> String {
        let mut text = String::new();
        for line in self.lines {
            text.push_str(&line);
            text.push('\n');
        }
        if let Some(unfinished) = self.current {
            text.push_str(&unfinished);
        }
        text
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn members_are_separated_by_one_empty_line() {
        let mut buf = Buf::new();
        buf.write(0, "final class Colors {");
        buf.end_line();
        buf.write(INDENT, "private static volatile Color red;");
        buf.separate();
        buf.separate();
        buf.write(INDENT, "public static Color red() {");
        buf.end_line();
        buf.write(0, "}");

        assert_eq!(
            buf.into_string(),
            "final class Colors {\n    private static volatile Color red;\n\n    public static Color red() {\n}"
        );
    }

    #[test]
    fn nothing_written_means_no_separator() {
        let mut buf = Buf::new();
        buf.separate();
        buf.end_line();

        assert_eq!(buf.into_string(), "\n");
    }
}
