//! Classify the head of a path and reject legacy path forms.

use hbsx_cst as cst;

use crate::ast::{PathExpression, PathHead};
use crate::error::SyntaxError;
use crate::source::Source;
use crate::span::Span;

const THIS_LEN: usize = "this".len();

pub(crate) fn resolve_path(
    path: &cst::PathExpression,
    source: &Source,
) -> Result<PathExpression, SyntaxError> {
    let span = source.span_for(&path.loc);
    let original = path.original.as_str();
    let error = |message: &str| SyntaxError::new(message, span, source);

    if original == "...attributes" {
        return Err(error("Illegal use of ...attributes"));
    }

    let mut parts = if original.contains('/') {
        if original.starts_with("./") {
            return Err(error(r#"Using "./" is not supported and unnecessary"#));
        }
        if original.starts_with("../") {
            return Err(error(r#"Changing context using "../" is not supported"#));
        }
        if original.contains('.') {
            return Err(error(
                "Mixing '.' and '/' in paths is not supported; use only '.' to separate property paths",
            ));
        }
        vec![path.parts.join("/")]
    } else if original == "." {
        return Err(error(
            "'.' is not a supported path; check for a path with a trailing '.'",
        ));
    } else {
        path.parts.clone()
    };

    let head = if is_this_path(original) {
        PathHead::This {
            span: head_span(span, THIS_LEN),
        }
    } else if path.data {
        if parts.is_empty() {
            return Err(error(
                "Attempted to parse a path expression, but it was not valid. Paths beginning with @ must start with a-z.",
            ));
        }
        let name = parts.remove(0);
        PathHead::Arg {
            span: head_span(span, name.len() + 1),
            name,
        }
    } else {
        if parts.is_empty() {
            return Err(error(
                "Attempted to parse a path expression, but it was not valid. Paths must start with a-z or A-Z.",
            ));
        }
        let name = parts.remove(0);
        PathHead::Local {
            span: head_span(span, name.len()),
            name,
        }
    };

    Ok(PathExpression {
        original: original.to_string(),
        head,
        tail: parts,
        span,
    })
}

/// `this` or `this.<something>`.
fn is_this_path(original: &str) -> bool {
    original == "this"
        || original
            .strip_prefix("this.")
            .is_some_and(|rest| !rest.is_empty())
}

fn head_span(path: Span, len: usize) -> Span {
    Span::new(path.start, (path.start + len).min(path.end))
}
