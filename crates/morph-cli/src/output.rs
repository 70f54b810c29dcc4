//! Output formatting and writing utilities
//!
//! Documents and explanations are written in JSON, pretty JSON, YAML or a
//! human-readable form. Status messages only appear in human mode so that
//! machine formats stay parseable.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

impl OutputFormat {
    /// Render a serializable value in this format
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // For human format, use pretty JSON as fallback
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether human-readable decorations should be written
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write a labelled value in human mode
    pub fn field(&mut self, label: &str, value: &str) -> Result<()> {
        if self.use_color {
            self.writeln(&format!("{}: {}", label.bold(), value))
        } else {
            self.writeln(&format!("{}: {}", label, value))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.render(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        // YAML output already ends with a newline
        if formatted.ends_with('\n') {
            write!(self.writer, "{}", formatted)?;
            self.writer.flush()?;
            Ok(())
        } else {
            self.writeln(&formatted)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Writer whose contents stay readable after the `OutputWriter` owns it
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub(crate) fn writer(format: OutputFormat) -> (OutputWriter, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let output = OutputWriter::with_writer(format, false, false, Box::new(buffer.clone()));
        (output, buffer)
    }

    #[test]
    fn test_render_formats() {
        let value = json!({"name": "bob"});
        assert_eq!(OutputFormat::Json.render(&value).unwrap(), r#"{"name":"bob"}"#);
        assert_eq!(
            OutputFormat::JsonPretty.render(&value).unwrap(),
            "{\n  \"name\": \"bob\"\n}"
        );
        assert_eq!(OutputFormat::Yaml.render(&value).unwrap(), "name: bob\n");
    }

    #[test]
    fn test_messages_only_in_human_mode() {
        let (mut output, buffer) = writer(OutputFormat::Json);
        output.info("hidden").unwrap();
        output.success("hidden").unwrap();
        output.section("hidden").unwrap();
        output.data(&json!([1, 2])).unwrap();
        assert_eq!(buffer.contents(), "[1,2]\n");

        let (mut output, buffer) = writer(OutputFormat::Human);
        output.info("shown").unwrap();
        output.section("Chain").unwrap();
        assert_eq!(buffer.contents(), "INFO: shown\n=== Chain ===\n");
    }

    #[test]
    fn test_quiet_suppresses_messages_but_not_data() {
        let buffer = SharedBuffer::default();
        let mut output =
            OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(buffer.clone()));
        output.info("hidden").unwrap();
        output.data(&json!("kept")).unwrap();
        assert_eq!(buffer.contents(), "\"kept\"\n");
    }

    #[test]
    fn test_yaml_data_has_single_trailing_newline() {
        let (mut output, buffer) = writer(OutputFormat::Yaml);
        output.data(&json!({"a": 1})).unwrap();
        assert_eq!(buffer.contents(), "a: 1\n");
    }
}
