//! Destinations for user-facing messages.
//!
//! The inspector only talks to [`OutputSink`]. The binary picks the sink:
//! coloured terminal lines, or styled paragraphs in an HTML container.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Red,
    BoldRed,
    Green,
    Blue,
}

impl Style {
    pub fn css(self) -> &'static str {
        match self {
            Style::Plain => "",
            Style::Red => "color: red;",
            Style::BoldRed => "color: red; font-weight: bold;",
            Style::Green => "color: green;",
            Style::Blue => "color: blue;",
        }
    }
}

pub fn paint(message: &str, style: Style) -> String {
    match style {
        Style::Plain => message.to_string(),
        Style::Red => message.red().to_string(),
        Style::BoldRed => message.red().bold().to_string(),
        Style::Green => message.green().to_string(),
        Style::Blue => message.blue().to_string(),
    }
}

pub trait OutputSink {
    fn record(&mut self, message: &str, style: Style);
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn record(&mut self, message: &str, style: Style) {
        (**self).record(message, style);
    }
}

/// Prints every message as a line on stdout, coloured when stdout is a terminal.
#[derive(Debug)]
pub struct TerminalSink {
    color: bool,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::with_color(std::io::stdout().is_terminal())
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn render(&self, message: &str, style: Style) -> String {
        if self.color {
            paint(message, style)
        } else {
            message.to_string()
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for TerminalSink {
    fn record(&mut self, message: &str, style: Style) {
        println!("{}", self.render(message, style));
    }
}

/// Renders messages as styled `<p>` elements inside a container element.
/// Without a container every message goes to `fallback`.
#[derive(Debug)]
pub struct HtmlSink<F: OutputSink> {
    container: Option<String>,
    paragraphs: Vec<String>,
    fallback: F,
}

impl<F: OutputSink> HtmlSink<F> {
    pub fn new(container: Option<String>, fallback: F) -> Self {
        Self {
            container,
            paragraphs: Vec::new(),
            fallback,
        }
    }

    /// The container element with every paragraph recorded so far.
    pub fn render(&self) -> Option<String> {
        let id = self.container.as_ref()?;
        let mut html = format!("<div id=\"{}\">\n", escape_html(id));
        for paragraph in &self.paragraphs {
            html.push_str("  ");
            html.push_str(paragraph);
            html.push('\n');
        }
        html.push_str("</div>\n");
        Some(html)
    }
}

impl<F: OutputSink> OutputSink for HtmlSink<F> {
    fn record(&mut self, message: &str, style: Style) {
        if self.container.is_none() {
            self.fallback.record(message, style);
            return;
        }

        let paragraph = match style.css() {
            "" => format!("<p>{}</p>", escape_html(message)),
            css => format!("<p style=\"{}\">{}</p>", css, escape_html(message)),
        };
        self.paragraphs.push(paragraph);
    }
}

/// Keeps messages in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub messages: Vec<(String, Style)>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<&str> {
        self.messages.iter().map(|(m, _)| m.as_str()).collect()
    }
}

impl OutputSink for BufferSink {
    fn record(&mut self, message: &str, style: Style) {
        self.messages.push((message.to_string(), style));
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
