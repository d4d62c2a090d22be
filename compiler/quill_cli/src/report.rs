//! Terminal diagnostics.

use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};
use quill_eval::EvalError;
use quill_parse::{ParseError, ParseErrorKind};

/// Render a parse error against its source with `ariadne`.
pub fn parse_error(name: &str, source: &str, err: &ParseError) {
    let span = clamp(&err.span, source.len());
    let rendered = Report::build(ReportKind::Error, name, span.start)
        .with_message(&err.message)
        .with_label(
            Label::new((name, span))
                .with_message(label(err.kind))
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name, Source::from(source)));
    if rendered.is_err() {
        eprintln!("error: {err}");
    }
}

/// Print a host fault followed by its cause chain.
pub fn fault(err: &EvalError) {
    eprintln!("error: {err}");
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

fn label(kind: ParseErrorKind) -> &'static str {
    match kind {
        ParseErrorKind::UnexpectedToken => "unexpected token",
        ParseErrorKind::UnexpectedEof => "input ends here",
        ParseErrorKind::InvalidToken => "not a valid token",
    }
}

/// Keep a span inside the source; end-of-input errors point one past it.
fn clamp(span: &Range<usize>, len: usize) -> Range<usize> {
    let start = span.start.min(len);
    start..span.end.clamp(start, len)
}
