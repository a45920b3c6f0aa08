//! Implementations of the `Renderer` trait.
//!
//! `TextRenderer` writes straight to any `io::Write`; how a `Style` turns
//! into bytes is left to a `TextDecorator`.

use std::io::{self, Write};

use termion::color::{self, Bg, Fg};

use super::style::{Colour, Style};
use super::Renderer;

/// Opening sequence of an OSC 8 hyperlink; the URL and `LINK_TERMINATOR`
/// follow.
const LINK_OPEN: &str = "\x1b]8;;";
/// String terminator for OSC sequences.
const LINK_TERMINATOR: &str = "\x1b\\";

/// Allow decorating/styling text.
pub trait TextDecorator {
    /// Return `text` decorated with `style`.
    fn decorate(&mut self, text: &str, style: &Style) -> String;
}

/// A decorator which ignores all styling.
#[derive(Clone, Debug, Default)]
pub struct PlainDecorator;

impl PlainDecorator {
    /// Create a new `PlainDecorator`.
    pub fn new() -> PlainDecorator {
        PlainDecorator
    }
}

impl TextDecorator for PlainDecorator {
    fn decorate(&mut self, text: &str, _style: &Style) -> String {
        text.to_string()
    }
}

/// A decorator producing ANSI terminal escape codes.
#[derive(Clone, Debug, Default)]
pub struct AnsiDecorator;

impl AnsiDecorator {
    /// Create a new `AnsiDecorator`.
    pub fn new() -> AnsiDecorator {
        AnsiDecorator
    }
}

fn fg_code(colour: Colour) -> String {
    match colour {
        Colour::Red => Fg(color::Red).to_string(),
        Colour::Green => Fg(color::Green).to_string(),
        Colour::Yellow => Fg(color::Yellow).to_string(),
        Colour::Blue => Fg(color::Blue).to_string(),
        Colour::Magenta => Fg(color::Magenta).to_string(),
        Colour::Cyan => Fg(color::Cyan).to_string(),
        Colour::Gray => Fg(color::LightBlack).to_string(),
        Colour::White => Fg(color::White).to_string(),
    }
}

fn bg_code(colour: Colour) -> String {
    match colour {
        Colour::Red => Bg(color::Red).to_string(),
        Colour::Green => Bg(color::Green).to_string(),
        Colour::Yellow => Bg(color::Yellow).to_string(),
        Colour::Blue => Bg(color::Blue).to_string(),
        Colour::Magenta => Bg(color::Magenta).to_string(),
        Colour::Cyan => Bg(color::Cyan).to_string(),
        Colour::Gray => Bg(color::LightBlack).to_string(),
        Colour::White => Bg(color::White).to_string(),
    }
}

impl TextDecorator for AnsiDecorator {
    fn decorate(&mut self, text: &str, style: &Style) -> String {
        if text.is_empty() || style.is_plain() {
            return text.to_string();
        }
        let mut result = String::new();
        if style.bold {
            result.push_str(&termion::style::Bold.to_string());
        }
        if style.italic {
            result.push_str(&termion::style::Italic.to_string());
        }
        if style.underline {
            result.push_str(&termion::style::Underline.to_string());
        }
        if style.inverse {
            result.push_str(&termion::style::Invert.to_string());
        }
        if let Some(fg) = style.fg {
            result.push_str(&fg_code(fg));
        }
        if let Some(bg) = style.bg {
            result.push_str(&bg_code(bg));
        }
        result.push_str(text);
        result.push_str(&termion::style::Reset.to_string());
        result
    }
}

/// A renderer writing decorated text to an output stream as it goes.
pub struct TextRenderer<W: Write, D: TextDecorator> {
    out: W,
    decorator: D,
}

impl<W: Write, D: TextDecorator> TextRenderer<W, D> {
    /// Create a renderer writing to `out`.
    pub fn new(out: W, decorator: D) -> TextRenderer<W, D> {
        TextRenderer { out, decorator }
    }

    /// Flush and return the output stream.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write, D: TextDecorator> Renderer for TextRenderer<W, D> {
    fn add_text(&mut self, text: &str, style: &Style) -> io::Result<()> {
        let decorated = self.decorator.decorate(text, style);
        self.out.write_all(decorated.as_bytes())
    }

    fn add_raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn start_link(&mut self, target: &str) -> io::Result<()> {
        write!(self.out, "{}{}{}", LINK_OPEN, target, LINK_TERMINATOR)
    }

    fn end_link(&mut self) -> io::Result<()> {
        write!(self.out, "{}{}", LINK_OPEN, LINK_TERMINATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_drops_style() {
        let mut dec = PlainDecorator::new();
        assert_eq!(dec.decorate("x", &Style::RESET.bold().fg(Colour::Red)), "x");
    }

    #[test]
    fn test_ansi_codes() {
        let mut dec = AnsiDecorator::new();
        assert_eq!(dec.decorate("plain", &Style::RESET), "plain");
        assert_eq!(
            dec.decorate("x", &Style::RESET.bold().fg(Colour::Blue)),
            format!(
                "{}{}x{}",
                termion::style::Bold,
                Fg(color::Blue),
                termion::style::Reset
            )
        );
        assert_eq!(dec.decorate("", &Style::RESET.bold()), "");
    }

    #[test]
    fn test_link_escapes() {
        let mut r = TextRenderer::new(Vec::new(), PlainDecorator::new());
        r.start_link("https://example.com/").unwrap();
        r.add_text("here", &Style::RESET).unwrap();
        r.end_link().unwrap();
        let out = String::from_utf8(r.into_inner().unwrap()).unwrap();
        assert_eq!(out, "\x1b]8;;https://example.com/\x1b\\here\x1b]8;;\x1b\\");
    }
}
