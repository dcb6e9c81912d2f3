//! Source segmentation: literal text vs `{{ … }}` actions.
//!
//! `{{-` and `-}}` markers trim the whitespace adjacent to an action. The
//! marker only counts when separated from the expression by whitespace, so
//! `{{-3}}` stays a (future) literal rather than a trim.

/// One lexed span of a template source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Text(String),
    Action { body: String, line: usize },
}

#[derive(Debug)]
enum Piece {
    Text(String),
    Action {
        body: String,
        line: usize,
        trim_left: bool,
        trim_right: bool,
    },
}

/// Split a source into text and action segments.
pub(crate) fn segments(source: &str) -> Result<Vec<Segment>, String> {
    let mut pieces = Vec::new();
    let mut rest = source;
    let mut line = 1usize;

    while let Some(open) = rest.find("{{") {
        let (text, tail) = rest.split_at(open);
        if !text.is_empty() {
            pieces.push(Piece::Text(text.to_string()));
        }
        line += text.matches('\n').count();
        let action_line = line;

        let tail = &tail[2..];
        let (tail, trim_left) = match tail.strip_prefix('-') {
            Some(stripped) if stripped.starts_with(|c: char| c.is_whitespace()) => (stripped, true),
            _ => (tail, false),
        };

        let close = find_close(tail).ok_or_else(|| format!("unclosed action on line {action_line}"))?;
        let mut body = &tail[..close];
        line += body.matches('\n').count();

        let mut trim_right = false;
        if let Some(head) = body.strip_suffix('-') {
            if head.is_empty() || head.ends_with(|c: char| c.is_whitespace()) {
                trim_right = true;
                body = head;
            }
        }

        pieces.push(Piece::Action {
            body: body.trim().to_string(),
            line: action_line,
            trim_left,
            trim_right,
        });
        rest = &tail[close + 2..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest.to_string()));
    }

    apply_trims(&mut pieces);

    Ok(pieces
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Text(t) if t.is_empty() => None,
            Piece::Text(t) => Some(Segment::Text(t)),
            Piece::Action { body, line, .. } => Some(Segment::Action { body, line }),
        })
        .collect())
}

/// Locate the closing `}}`, skipping over string literals so that
/// `{{ printf "}}" }}` lexes correctly.
fn find_close(tail: &str) -> Option<usize> {
    let bytes = tail.as_bytes();
    let mut i = 0;
    let mut in_string = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_string => i += 1,
            b'"' => in_string = !in_string,
            b'}' if !in_string && bytes.get(i + 1) == Some(&b'}') => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn apply_trims(pieces: &mut [Piece]) {
    for i in 0..pieces.len() {
        let (trim_left, trim_right) = match &pieces[i] {
            Piece::Action {
                trim_left,
                trim_right,
                ..
            } => (*trim_left, *trim_right),
            Piece::Text(_) => continue,
        };
        if trim_left && i > 0 {
            if let Piece::Text(prev) = &mut pieces[i - 1] {
                prev.truncate(prev.trim_end().len());
            }
        }
        if trim_right && i + 1 < pieces.len() {
            if let Piece::Text(next) = &mut pieces[i + 1] {
                *next = next.trim_start().to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(body: &str, line: usize) -> Segment {
        Segment::Action {
            body: body.to_string(),
            line,
        }
    }

    #[test]
    fn plain_text_is_one_segment() {
        let segs = segments("hello world").unwrap();
        assert_eq!(segs, vec![Segment::Text("hello world".into())]);
    }

    #[test]
    fn text_and_actions_interleave() {
        let segs = segments("a {{ .X }} b {{ .Y }}").unwrap();
        assert_eq!(
            segs,
            vec![
                Segment::Text("a ".into()),
                action(".X", 1),
                Segment::Text(" b ".into()),
                action(".Y", 1),
            ]
        );
    }

    #[test]
    fn line_numbers_track_newlines() {
        let segs = segments("one\ntwo\n{{ .X }}").unwrap();
        assert_eq!(segs[1], action(".X", 3));
    }

    #[test]
    fn left_trim_eats_preceding_whitespace() {
        let segs = segments("key:   \n  {{- .X }}").unwrap();
        assert_eq!(segs[0], Segment::Text("key:".into()));
        assert_eq!(segs[1], action(".X", 2));
    }

    #[test]
    fn right_trim_eats_following_whitespace() {
        let segs = segments("{{ .X -}}   \n next").unwrap();
        assert_eq!(segs[0], action(".X", 1));
        assert_eq!(segs[1], Segment::Text("next".into()));
    }

    #[test]
    fn trim_marker_requires_whitespace() {
        // `-}}` glued to the expression is part of the body, not a marker.
        let segs = segments("{{ .X-}} y").unwrap();
        assert_eq!(segs[0], action(".X-", 1));
        assert_eq!(segs[1], Segment::Text(" y".into()));
    }

    #[test]
    fn close_braces_inside_strings_are_skipped() {
        let segs = segments(r#"{{ printf "}}" }}"#).unwrap();
        assert_eq!(segs, vec![action(r#"printf "}}""#, 1)]);
    }

    #[test]
    fn unclosed_action_reports_line() {
        let err = segments("ok\n{{ .X ").unwrap_err();
        assert_eq!(err, "unclosed action on line 2");
    }
}
