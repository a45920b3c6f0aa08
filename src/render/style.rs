//! Text decorations and the per-call style context.
//!
//! A `Style` is a set of terminal text attributes.  Styles compose by
//! overlaying: boolean attributes accumulate, while a colour set by the
//! overlay replaces the one underneath.  The walk threads a `Context`
//! (style, indent and preformatted flag) down by value, so a child can
//! derive a new context but never change its parent's.

/// The colours a decoration can use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Colour {
    /// Red
    Red,
    /// Green
    Green,
    /// Yellow
    Yellow,
    /// Blue
    Blue,
    /// Magenta
    Magenta,
    /// Cyan
    Cyan,
    /// Gray (bright black)
    Gray,
    /// White
    White,
}

impl Colour {
    /// Lower-case name of the colour.
    pub fn name(self) -> &'static str {
        match self {
            Colour::Red => "red",
            Colour::Green => "green",
            Colour::Yellow => "yellow",
            Colour::Blue => "blue",
            Colour::Magenta => "magenta",
            Colour::Cyan => "cyan",
            Colour::Gray => "gray",
            Colour::White => "white",
        }
    }
}

/// A composable text decoration.  `Style::RESET` is the plain style.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    /// Foreground colour
    pub fg: Option<Colour>,
    /// Background colour
    pub bg: Option<Colour>,
    /// Bold
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Underlined
    pub underline: bool,
    /// Inverse video
    pub inverse: bool,
}

impl Style {
    /// No decoration at all.
    pub const RESET: Style = Style {
        fg: None,
        bg: None,
        bold: false,
        italic: false,
        underline: false,
        inverse: false,
    };

    /// Add bold.
    pub const fn bold(self) -> Style {
        Style { bold: true, ..self }
    }

    /// Add italic.
    pub const fn italic(self) -> Style {
        Style {
            italic: true,
            ..self
        }
    }

    /// Add underline.
    pub const fn underline(self) -> Style {
        Style {
            underline: true,
            ..self
        }
    }

    /// Add inverse video.
    pub const fn inverse(self) -> Style {
        Style {
            inverse: true,
            ..self
        }
    }

    /// Set the foreground colour.
    pub const fn fg(self, colour: Colour) -> Style {
        Style {
            fg: Some(colour),
            ..self
        }
    }

    /// Set the background colour.
    pub const fn bg(self, colour: Colour) -> Style {
        Style {
            bg: Some(colour),
            ..self
        }
    }

    /// Apply `top` over this style.
    pub fn overlay(self, top: Style) -> Style {
        Style {
            fg: top.fg.or(self.fg),
            bg: top.bg.or(self.bg),
            bold: self.bold || top.bold,
            italic: self.italic || top.italic,
            underline: self.underline || top.underline,
            inverse: self.inverse || top.inverse,
        }
    }

    /// True if this style adds nothing to plain text.
    pub fn is_plain(&self) -> bool {
        *self == Style::RESET
    }
}

/// Inherited formatting state for one level of the walk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    /// Decoration for text at this level.
    pub style: Style,
    /// Number of spaces to put at the start of indented lines.
    pub indent: usize,
    /// Inside a `<pre>`: whitespace is kept as is.
    pub pre: bool,
}

/// Amount added to the indent by each nested list or definition.
pub const INDENT_STEP: usize = 2;

impl Context {
    /// A context with `overlay` applied over the current style.
    pub fn styled(self, overlay: Style) -> Context {
        Context {
            style: self.style.overlay(overlay),
            ..self
        }
    }

    /// A context indented one more step.
    pub fn indented(self) -> Context {
        Context {
            indent: self.indent + INDENT_STEP,
            ..self
        }
    }

    /// A context for preformatted content.
    pub fn preformatted(self) -> Context {
        Context { pre: true, ..self }
    }

    /// The indent as a string of spaces.
    pub fn indent_str(&self) -> String {
        " ".repeat(self.indent)
    }
}
