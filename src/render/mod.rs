//! Module containing the `Renderer` interface the walk writes through.

pub mod style;
pub mod text_renderer;

use std::io;

use self::style::Style;

/// A type which is a backend for rendering the article to text.
///
/// The walk decides what to emit and with which decoration; the backend
/// decides how a decoration is expressed (escape codes, nothing at all, or
/// something else entirely).
pub trait Renderer {
    /// Add some text with the given decoration.
    fn add_text(&mut self, text: &str, style: &Style) -> io::Result<()>;

    /// Add structural text (indentation, list markers, table delimiters)
    /// which is never decorated.
    fn add_raw(&mut self, text: &str) -> io::Result<()>;

    /// End the current line.
    fn new_line(&mut self) -> io::Result<()> {
        self.add_raw("\n")
    }

    /// Add `count` line breaks.
    fn new_lines(&mut self, count: usize) -> io::Result<()> {
        for _ in 0..count {
            self.new_line()?;
        }
        Ok(())
    }

    /// Start a hyperlink to `target`.
    fn start_link(&mut self, target: &str) -> io::Result<()>;

    /// Finish a hyperlink started earlier.
    fn end_link(&mut self) -> io::Result<()>;
}
