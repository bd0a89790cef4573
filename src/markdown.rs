//! Minimal markup handling for assistant replies: `**bold**` spans and
//! literal newlines. Everything else is plain text.

use once_cell::sync::Lazy;
use regex::Regex;

static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*.*?\*\*").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Strong(String),
    LineBreak,
}

pub fn render(text: &str) -> Vec<Fragment> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for m in STRONG.find_iter(text) {
        push_plain(&mut out, &text[cursor..m.start()]);
        let inner = &m.as_str()[2..m.as_str().len() - 2];
        out.push(Fragment::Strong(inner.to_string()));
        cursor = m.end();
    }
    push_plain(&mut out, &text[cursor..]);
    out
}

fn push_plain(out: &mut Vec<Fragment>, span: &str) {
    for (i, line) in span.split('\n').enumerate() {
        if i > 0 {
            out.push(Fragment::LineBreak);
        }
        if !line.is_empty() {
            out.push(Fragment::Text(line.to_string()));
        }
    }
}

/// Plain-text form of a message for the clipboard.
pub fn strip_markup(text: &str) -> String {
    let without_tags = TAG.replace_all(text, "");
    without_tags
        .replace("**", "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::Fragment::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Fragment {
        Text(s.to_string())
    }

    fn strong(s: &str) -> Fragment {
        Strong(s.to_string())
    }

    #[test]
    fn bold_span() {
        assert_eq!(render("**bold**"), vec![strong("bold")]);
    }

    #[test]
    fn newline_becomes_break() {
        assert_eq!(render("a\nb"), vec![text("a"), LineBreak, text("b")]);
    }

    #[test]
    fn unmatched_marker_is_literal() {
        assert_eq!(render("unmatched**"), vec![text("unmatched**")]);
        assert_eq!(render("**open only"), vec![text("**open only")]);
    }

    #[test]
    fn mixed_spans() {
        assert_eq!(
            render("There are **5** datanodes."),
            vec![text("There are "), strong("5"), text(" datanodes.")]
        );
        assert_eq!(
            render("**a** and **b**\n**c**"),
            vec![
                strong("a"),
                text(" and "),
                strong("b"),
                LineBreak,
                strong("c"),
            ]
        );
    }

    #[test]
    fn emphasis_never_spans_lines() {
        assert_eq!(
            render("**a\nb**"),
            vec![text("**a"), LineBreak, text("b**")]
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(render(""), Vec::<Fragment>::new());
        assert_eq!(render("\n\n"), vec![LineBreak, LineBreak]);
    }

    #[test]
    fn deterministic() {
        let input = "x **y** z\n**";
        assert_eq!(render(input), render(input));
    }

    #[test]
    fn strip_removes_markers_tags_and_entities() {
        assert_eq!(strip_markup("There are **5** datanodes."), "There are 5 datanodes.");
        assert_eq!(
            strip_markup("<p>Used: <b>80%</b> &amp; rising &lt;fast&gt;</p>"),
            "Used: 80% & rising <fast>"
        );
        assert_eq!(strip_markup("plain"), "plain");
    }
}
