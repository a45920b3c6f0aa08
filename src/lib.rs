//! Look up documentation pages and render them in a terminal.
//!
//! The page's main article is located, then walked in document order.  Each
//! element type has a fixed rule deciding what is written before and after
//! its children and how the inherited style, indent and preformatted state
//! change for them.  Output goes straight to an `io::Write`.
//!
//! # Examples
//!
//! ```rust
//! # use mdnterm::from_read;
//! let html = b"<article><h2>Syntax</h2><p>Some <code>code</code>.</p></article>";
//! assert_eq!(from_read(&html[..]).unwrap(), "\nSyntax\n\nSome code.\n\n");
//! ```
//!
//! The `mdn` binary puts the pieces together: it follows the search
//! service's redirects with [`redirect::Resolver`] and renders the page it
//! lands on, with colours and hyperlinks when the terminal supports them.

#![deny(missing_docs)]

#[macro_use]
mod macros;

pub mod article;
pub mod markup;
pub mod redirect;
pub mod render;
pub mod terminal;

use std::io;

use unicode_width::UnicodeWidthStr;

use article::Article;
use config::{Config, DdStyle};
use markup::{Handle, Markup, NodeData};
use render::style::{Colour, Context, Style};
use render::Renderer;

/// Errors from looking up and rendering a page.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The server answered with a failure status.
    #[error("fetch failed for {url}: HTTP status {status}")]
    Fetch {
        /// The URL requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
    /// The request could not be made or its body could not be read.
    #[error("request for {url} failed: {source}")]
    Http {
        /// The URL requested.
        url: String,
        /// The underlying error.
        source: ureq::Error,
    },
    /// A fetched page did not have the structure needed to continue.
    #[error("unexpected page structure at {url}: expected {expected}")]
    UnexpectedPage {
        /// The URL of the page.
        url: String,
        /// What was looked for.
        expected: &'static str,
    },
    /// Reading input or writing output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// How an element's children are rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Rule {
    /// `a`: optionally wrapped in a hyperlink.
    Anchor,
    /// `br`
    Break,
    /// Children rendered with a style overlay and nothing else.
    Styled(Style),
    /// `dd`
    DefinitionValue,
    /// `div`
    Div,
    /// `dt`
    DefinitionTerm,
    /// `h1`: text children as an underlined title.
    Title,
    /// `h2`..`h4`
    Heading(Style),
    /// `li`
    ListItem,
    /// `ol` and `ul`
    List,
    /// `p`
    Paragraph,
    /// `pre`
    Pre,
    /// `span`
    Span,
    /// `td`
    Cell,
    /// `th`
    HeaderCell,
    /// `tr`
    Row,
    /// Anything else: just the children.
    PassThrough,
}

fn rule_for(tag: &str) -> Rule {
    match tag {
        "a" => Rule::Anchor,
        "br" => Rule::Break,
        "code" => Rule::Styled(Style::RESET.fg(Colour::Blue)),
        "dd" => Rule::DefinitionValue,
        "div" => Rule::Div,
        "dt" => Rule::DefinitionTerm,
        "em" => Rule::Styled(Style::RESET.italic()),
        "h1" => Rule::Title,
        "h2" => Rule::Heading(Style::RESET.fg(Colour::Red).bold()),
        "h3" => Rule::Heading(Style::RESET.fg(Colour::Yellow).bold()),
        "h4" => Rule::Heading(Style::RESET.fg(Colour::Green).bold()),
        "li" => Rule::ListItem,
        "ol" | "ul" => Rule::List,
        "p" => Rule::Paragraph,
        "pre" => Rule::Pre,
        "span" => Rule::Span,
        "strong" => Rule::Styled(Style::RESET.bold()),
        "td" => Rule::Cell,
        "th" => Rule::HeaderCell,
        "tr" => Rule::Row,
        "var" => Rule::Styled(Style::RESET.underline()),
        _ => Rule::PassThrough,
    }
}

/// Syntax highlighting token classes, as found alongside `token`.  The
/// first class of a span found here decides its style.
const TOKEN_STYLES: &[(&str, Style)] = &[
    ("keyword", Style::RESET.fg(Colour::Magenta)),
    ("function", Style::RESET.fg(Colour::Red)),
    ("number", Style::RESET.fg(Colour::Yellow)),
    ("string", Style::RESET.fg(Colour::Green)),
    ("property", Style::RESET.fg(Colour::Cyan)),
    ("comment", Style::RESET.fg(Colour::Gray).italic()),
    ("punctuation", Style::RESET.fg(Colour::White)),
    ("attr-name", Style::RESET.fg(Colour::Cyan)),
    ("attr-value", Style::RESET.fg(Colour::Green)),
    ("class-name", Style::RESET.fg(Colour::Magenta)),
    ("tag", Style::RESET.fg(Colour::Magenta)),
    ("operator", Style::RESET.fg(Colour::White)),
    ("parameter", Style::RESET.fg(Colour::Cyan)),
];

const BADGE_STYLE: Style = Style::RESET.fg(Colour::Gray);
const TITLE_ATTR_STYLE: Style = Style::RESET.inverse();

/// `div` classes which mark warnings about the documented feature.
const ALERT_CLASSES: &[&str] = &["deprecated", "nonstandard", "warning"];
const ALERT_STYLE: Style = Style::RESET.bg(Colour::Red);
const NOTE_STYLE: Style = Style::RESET.underline();
/// `div` classes holding page chrome rather than content.
const CHROME_CLASSES: &[&str] = &["metadata-content-container"];

/// `h2` ids of the interactive example, which is useless in a terminal.
const TRY_IT_IDS: &[&str] = &["try_it", "try-it"];

/// Minimum width of the line numbers of a numbered `pre`.
const LINE_NUMBER_WIDTH: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SpanRole {
    Token(Style),
    Badge,
    Plain,
}

fn span_role(classes: &[String]) -> SpanRole {
    let has = |name: &str| classes.iter().any(|c| c == name);
    if has("visually-hidden") || (has("badge") && has("optional")) {
        return SpanRole::Badge;
    }
    if has("token") {
        for class in classes {
            if let Some(&(_, style)) = TOKEN_STYLES.iter().find(|(name, _)| *name == class.as_str()) {
                return SpanRole::Token(style);
            }
        }
    }
    SpanRole::Plain
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DivRole {
    Alert,
    Note,
    Chrome,
    Plain,
}

fn div_role(classes: &[String]) -> DivRole {
    let has = |name: &str| classes.iter().any(|c| c == name);
    if CHROME_CLASSES.iter().any(|c| has(c)) {
        DivRole::Chrome
    } else if has("notecard") && ALERT_CLASSES.iter().any(|c| has(c)) {
        DivRole::Alert
    } else if has("notecard") && has("note") {
        DivRole::Note
    } else {
        DivRole::Plain
    }
}

fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0c' | '\r')
}

/// Replace every run of HTML whitespace with a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if is_html_whitespace(c) {
            if !in_space {
                result.push(' ');
            }
            in_space = true;
        } else {
            result.push(c);
            in_space = false;
        }
    }
    result
}

/// Remove one line terminator from each end of `text`.
fn strip_outer_line_breaks(text: &str) -> &str {
    let text = text
        .strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text);
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// What is still to be written once a node's children have been rendered.
#[derive(Debug)]
enum Finish {
    Nothing,
    Raw(&'static str),
    NewLines(usize),
    /// Close a table row.
    Row,
    EndLink,
    /// A span's `title` attribute, shown after its contents.
    Title { text: String, style: Style },
}

/// The result of entering one node.
enum Step {
    /// The node has been written completely.
    Done,
    /// Render the children with `ctx`, then `finish`.
    Descend { ctx: Context, finish: Finish },
}

impl Step {
    fn descend(ctx: Context, finish: Finish) -> Step {
        Step::Descend { ctx, finish }
    }
}

/// A node whose children are being rendered.
struct Frame {
    /// Children not yet rendered.
    to_process: std::vec::IntoIter<Handle>,
    /// Context the children are rendered with.
    ctx: Context,
    finish: Finish,
}

struct Walker<'a, R: Renderer> {
    renderer: &'a mut R,
    config: &'a Config,
}

impl<R: Renderer> Walker<'_, R> {
    /// Render `nodes` in document order.  Pending nodes are kept on a heap
    /// stack, so the depth of the markup is not limited by the call stack.
    fn walk(&mut self, nodes: Vec<Handle>, ctx: Context) -> io::Result<()> {
        let mut stack = vec![Frame {
            to_process: nodes.into_iter(),
            ctx,
            finish: Finish::Nothing,
        }];
        while let Some(frame) = stack.last_mut() {
            let parent_ctx = frame.ctx;
            let next = frame.to_process.next();
            match next {
                Some(node) => {
                    if let Step::Descend { ctx, finish } = self.enter(&node, parent_ctx)? {
                        let children = node.children().clone();
                        stack.push(Frame {
                            to_process: children.into_iter(),
                            ctx,
                            finish,
                        });
                    }
                }
                None => {
                    if let Some(done) = stack.pop() {
                        self.finish(done.finish)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn enter(&mut self, handle: &Handle, ctx: Context) -> io::Result<Step> {
        render_trace!("enter {:?} {:?}", handle, ctx);
        match handle.data {
            NodeData::Element { ref name, .. } => self.element(handle, &name.local, ctx),
            NodeData::Text { ref contents } => {
                let text = contents.borrow();
                self.text(handle, &text, ctx)?;
                Ok(Step::Done)
            }
            _ => Ok(Step::descend(ctx, Finish::Nothing)),
        }
    }

    fn finish(&mut self, finish: Finish) -> io::Result<()> {
        match finish {
            Finish::Nothing => Ok(()),
            Finish::Raw(text) => self.renderer.add_raw(text),
            Finish::NewLines(count) => self.renderer.new_lines(count),
            Finish::Row => {
                self.renderer.add_raw("|")?;
                self.renderer.new_lines(2)
            }
            Finish::EndLink => self.renderer.end_link(),
            Finish::Title { text, style } => {
                self.renderer.add_raw(" ")?;
                self.renderer.add_text(&text, &style)
            }
        }
    }

    fn element(&mut self, handle: &Handle, tag: &str, ctx: Context) -> io::Result<Step> {
        let step = match rule_for(tag) {
            Rule::Anchor => self.anchor(handle, ctx)?,
            Rule::Break => {
                self.renderer.new_line()?;
                Step::Done
            }
            Rule::Styled(style) => Step::descend(ctx.styled(style), Finish::Nothing),
            Rule::DefinitionValue => match self.config.dd_style {
                DdStyle::Indent => Step::descend(ctx.indented(), Finish::NewLines(1)),
                DdStyle::Prefix => {
                    self.renderer.add_raw("  ")?;
                    Step::descend(ctx, Finish::NewLines(2))
                }
            },
            Rule::Div => self.div(handle, ctx)?,
            Rule::DefinitionTerm => {
                self.renderer.add_raw(&ctx.indent_str())?;
                Step::descend(ctx, Finish::NewLines(1))
            }
            Rule::Title => {
                self.title(handle, ctx)?;
                Step::Done
            }
            Rule::Heading(style) => {
                let is_try_it = handle
                    .attr("id")
                    .is_some_and(|id| TRY_IT_IDS.contains(&id.as_str()));
                if tag == "h2" && is_try_it {
                    return Ok(Step::Done);
                }
                self.renderer.new_line()?;
                Step::descend(ctx.styled(style), Finish::NewLines(2))
            }
            Rule::ListItem => {
                self.renderer.add_raw(&format!("{}- ", ctx.indent_str()))?;
                // A nested list supplies its own spacing.
                let nested = handle.has_child_element(&["ol", "ul"]);
                Step::descend(ctx, Finish::NewLines(if nested { 0 } else { 2 }))
            }
            Rule::List => {
                if handle.parent_tag().as_deref() == Some("li") {
                    self.renderer.new_lines(2)?;
                }
                let trailing = tag == "ul" && self.config.ul_trailing_blank;
                Step::descend(ctx.indented(), Finish::NewLines(usize::from(trailing)))
            }
            Rule::Paragraph => {
                if handle.children().is_empty() {
                    return Ok(Step::Done);
                }
                self.renderer.add_raw(&ctx.indent_str())?;
                Step::descend(ctx, Finish::NewLines(2))
            }
            Rule::Pre => {
                if self.config.numbered_pre {
                    self.numbered_lines(&handle.text_content(), ctx)?;
                    self.renderer.new_line()?;
                    Step::Done
                } else {
                    Step::descend(ctx.preformatted(), Finish::NewLines(1))
                }
            }
            Rule::Span => self.span(handle, ctx)?,
            Rule::Cell => {
                self.renderer.add_raw("| ")?;
                Step::descend(ctx, Finish::Raw("\t"))
            }
            Rule::HeaderCell => {
                let style = if self.config.th_bold {
                    Style::RESET.bold().underline()
                } else {
                    Style::RESET.underline()
                };
                self.renderer.add_raw("| ")?;
                Step::descend(ctx.styled(style), Finish::Raw("\t"))
            }
            Rule::Row => Step::descend(ctx, Finish::Row),
            Rule::PassThrough => Step::descend(ctx, Finish::Nothing),
        };
        Ok(step)
    }

    fn anchor(&mut self, handle: &Handle, ctx: Context) -> io::Result<Step> {
        let href = handle
            .attr("href")
            .filter(|href| self.config.hyperlinks && !href.starts_with('#'));
        let Some(href) = href else {
            return Ok(Step::descend(ctx, Finish::Nothing));
        };

        let target = if href.contains("://") {
            href
        } else {
            format!("{}{}", self.config.link_base, href)
        };
        self.renderer.start_link(&target)?;
        Ok(Step::descend(ctx, Finish::EndLink))
    }

    fn div(&mut self, handle: &Handle, ctx: Context) -> io::Result<Step> {
        let role = div_role(&handle.classes());
        if role == DivRole::Chrome {
            return Ok(Step::Done);
        }
        if self.config.div_in_li_spacing && handle.parent_tag().as_deref() == Some("li") {
            self.renderer.new_lines(2)?;
        }
        let ctx = match role {
            DivRole::Alert => ctx.styled(ALERT_STYLE),
            DivRole::Note => ctx.styled(NOTE_STYLE),
            DivRole::Chrome | DivRole::Plain => ctx,
        };
        Ok(Step::descend(ctx, Finish::Nothing))
    }

    /// Only the text children of the title are shown, each underlined
    /// with `=` to its display width.
    fn title(&mut self, handle: &Handle, ctx: Context) -> io::Result<()> {
        let style = ctx.style.overlay(Style::RESET.bold());
        for child in handle.children().iter() {
            if let Some(text) = child.text() {
                self.renderer.add_text(&text, &style)?;
                self.renderer.new_line()?;
                let rule = "=".repeat(UnicodeWidthStr::width(text.as_str()));
                self.renderer.add_text(&rule, &style)?;
                self.renderer.new_lines(2)?;
            }
        }
        Ok(())
    }

    fn span(&mut self, handle: &Handle, ctx: Context) -> io::Result<Step> {
        let inner = match span_role(&handle.classes()) {
            SpanRole::Token(style) => ctx.styled(style),
            SpanRole::Badge => {
                self.renderer.add_raw(" ")?;
                ctx.styled(BADGE_STYLE)
            }
            SpanRole::Plain => ctx,
        };
        let finish = match handle.attr("title").filter(|t| !t.is_empty()) {
            Some(text) => Finish::Title {
                text,
                style: ctx.style.overlay(TITLE_ATTR_STYLE),
            },
            None => Finish::Nothing,
        };
        Ok(Step::descend(inner, finish))
    }

    fn numbered_lines(&mut self, text: &str, ctx: Context) -> io::Result<()> {
        let text = strip_outer_line_breaks(text);
        if text.is_empty() {
            return Ok(());
        }
        let lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let width = lines.len().to_string().len().max(LINE_NUMBER_WIDTH);
        for (i, line) in lines.iter().enumerate() {
            self.renderer
                .add_raw(&format!("{:>width$}\t", i + 1, width = width))?;
            self.renderer.add_text(line, &ctx.style)?;
            self.renderer.new_line()?;
        }
        Ok(())
    }

    fn text(&mut self, handle: &Handle, text: &str, ctx: Context) -> io::Result<()> {
        if ctx.pre {
            return self.renderer.add_text(text, &ctx.style);
        }
        let collapsed = collapse_whitespace(text);
        let has_content = !collapsed.trim_matches(is_html_whitespace).is_empty();
        // Whitespace after a <strong> separates it from what follows.
        let after_strong = || {
            handle
                .previous_sibling()
                .is_some_and(|prev| prev.is_element("strong"))
        };
        if has_content || after_strong() {
            self.renderer.add_text(&collapsed, &ctx.style)?;
        }
        Ok(())
    }
}

/// Render a located article through `renderer`.
pub fn render_article<R: Renderer>(
    article: &Article,
    config: &Config,
    renderer: &mut R,
) -> io::Result<()> {
    let mut walker = Walker { renderer, config };
    let ctx = Context::default();
    if let Some(heading) = &article.heading {
        walker.title(heading, ctx)?;
    }
    walker.walk(article.body.clone(), ctx)
}

pub mod config {
    //! Configure the rendering using the `Config` type, which can be
    //! constructed using one of the functions in this module.
    //!
    //! The page layout, and with it the best way to render it, changed over
    //! time; `current()` matches today's pages and `legacy()` turns on all
    //! the older behaviour.

    use std::io::{Read, Write};

    use log::{debug, warn};

    use super::{parse, render_article, Result};
    use crate::article::{Locator, Marker};
    use crate::markup::Markup;
    use crate::render::text_renderer::{AnsiDecorator, PlainDecorator, TextDecorator, TextRenderer};
    use crate::render::Renderer;

    /// The origin prefixed to links which have no scheme.
    pub const DEFAULT_LINK_BASE: &str = "https://developer.mozilla.org";

    /// How definition values (`dd`) are set off from their term.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum DdStyle {
        /// Increase the indent for the contents.
        Indent,
        /// Write two spaces before the contents.
        Prefix,
    }

    /// Configure the rendering.
    #[derive(Clone, Debug)]
    pub struct Config {
        pub(crate) locator: Locator,
        pub(crate) numbered_pre: bool,
        pub(crate) dd_style: DdStyle,
        pub(crate) th_bold: bool,
        pub(crate) ul_trailing_blank: bool,
        pub(crate) div_in_li_spacing: bool,
        pub(crate) hyperlinks: bool,
        pub(crate) colour: bool,
        pub(crate) link_base: String,
    }

    impl Default for Config {
        fn default() -> Config {
            current()
        }
    }

    impl Config {
        /// Set how the article is found.
        pub fn locator(mut self, locator: Locator) -> Self {
            self.locator = locator;
            self
        }

        /// Show `pre` blocks as numbered lines of plain text.
        pub fn numbered_pre(mut self, numbered: bool) -> Self {
            self.numbered_pre = numbered;
            self
        }

        /// Set how definition values are indented.
        pub fn dd_style(mut self, style: DdStyle) -> Self {
            self.dd_style = style;
            self
        }

        /// Make table header cells bold as well as underlined.
        pub fn th_bold(mut self, bold: bool) -> Self {
            self.th_bold = bold;
            self
        }

        /// Add a blank line after every unordered list.
        pub fn ul_trailing_blank(mut self, blank: bool) -> Self {
            self.ul_trailing_blank = blank;
            self
        }

        /// Separate a `div` from the start of its list item.
        pub fn div_in_li_spacing(mut self, spacing: bool) -> Self {
            self.div_in_li_spacing = spacing;
            self
        }

        /// Wrap links in terminal hyperlink escapes.
        pub fn hyperlinks(mut self, hyperlinks: bool) -> Self {
            self.hyperlinks = hyperlinks;
            self
        }

        /// Use terminal colours and text attributes.
        pub fn colour(mut self, colour: bool) -> Self {
            self.colour = colour;
            self
        }

        /// Set the origin prefixed to links without a scheme.
        pub fn link_base(mut self, base: impl Into<String>) -> Self {
            self.link_base = base.into();
            self
        }

        /// Locate the article in a parsed page and render it.
        pub fn render_markup<R: Renderer>(&self, markup: &Markup, renderer: &mut R) -> Result<()> {
            for error in markup.errors.borrow().iter() {
                debug!("parse error: {}", error);
            }
            let article = self.locator.locate(&markup.document);
            if article.is_empty() {
                warn!("no article found on the page");
            }
            render_article(&article, self, renderer)?;
            Ok(())
        }

        /// Read HTML from `input` and write its article to `out` using
        /// `decorator`.  Returns the output stream.
        pub fn render_with_decorator<R, W, D>(&self, input: R, out: W, decorator: D) -> Result<W>
        where
            R: Read,
            W: Write,
            D: TextDecorator,
        {
            let markup = parse(input)?;
            let mut renderer = TextRenderer::new(out, decorator);
            self.render_markup(&markup, &mut renderer)?;
            Ok(renderer.into_inner()?)
        }

        /// Read HTML from `input` and write its article to `out`, with
        /// escape codes if colour is enabled.
        pub fn render_page<R: Read, W: Write>(&self, input: R, out: W) -> Result<W> {
            if self.colour {
                self.render_with_decorator(input, out, AnsiDecorator::new())
            } else {
                self.render_with_decorator(input, out, PlainDecorator::new())
            }
        }

        /// Read HTML from `input` and return the rendered article.
        pub fn string_from_read<R: Read>(&self, input: R) -> Result<String> {
            let bytes = self.render_page(input, Vec::new())?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }

    /// The rules for current pages: no colour and no hyperlinks until
    /// switched on.
    pub fn current() -> Config {
        Config {
            locator: Locator::default(),
            numbered_pre: false,
            dd_style: DdStyle::Indent,
            th_bold: true,
            ul_trailing_blank: false,
            div_in_li_spacing: true,
            hyperlinks: false,
            colour: false,
            link_base: DEFAULT_LINK_BASE.to_string(),
        }
    }

    /// The rules for older pages, which keep the title outside the
    /// `wikiArticle` body.
    pub fn legacy() -> Config {
        current()
            .locator(Locator::Split {
                heading: Marker::tag("h1"),
                body: Marker::Id("wikiArticle".to_string()),
            })
            .numbered_pre(true)
            .dd_style(DdStyle::Prefix)
            .th_bold(false)
            .ul_trailing_blank(true)
            .div_in_li_spacing(false)
    }
}

/// Reads and parses HTML from `input`.
pub fn parse(input: impl io::Read) -> Result<Markup> {
    Ok(markup::parse_html(input)?)
}

/// Reads HTML from `input` and returns its article as plain text using
/// the current rules.
pub fn from_read<R: io::Read>(input: R) -> Result<String> {
    config::current().string_from_read(input)
}
