// Display-math normalization

const DISPLAY: &str = "$$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// Ordinary text, copied through
    Prose(&'a str),
    /// Body of a display block, without delimiters
    Math(&'a str),
    /// `$$` with no closing delimiter; runs to the end of the text
    OpenMath(&'a str),
}

/// Rewrite bracketed formulas as `$$…$$` display blocks on their own lines.
///
/// - `\[ … \]` becomes `$$…$$` with the body trimmed.
/// - `[ … ]` becomes `$$…$$` when the body holds no nested bracket and at least one
///   math symbol, so citation markers like `[1]` stay as they are.
/// - Every display block, new or already present, is separated from surrounding text
///   by a newline; horizontal whitespace next to an inserted newline is dropped.
///
/// Existing `$$` blocks are never rewritten inside, and an unclosed `$$` is treated as
/// a block running to the end, so text that is still streaming normalizes stably.
/// `normalize(normalize(s)) == normalize(s)` for every input.
///
/// ```
/// use paperqa_markup::normalize;
///
/// assert_eq!(
///     normalize("The result is \\[x^2 + y^2 = z^2\\]"),
///     "The result is\n$$x^2 + y^2 = z^2$$"
/// );
/// assert_eq!(normalize("See [1]."), "See [1].");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut after_block = false;

    for segment in scan(text) {
        match segment {
            Segment::Prose(prose) => {
                let prose = if after_block {
                    let rest = prose.trim_start_matches(is_inline_space);
                    if !rest.is_empty() && !rest.starts_with('\n') {
                        out.push('\n');
                    }
                    rest
                } else {
                    prose
                };
                out.push_str(prose);
                after_block = false;
            }
            Segment::Math(formula) => {
                open_block(&mut out);
                out.push_str(DISPLAY);
                out.push_str(formula);
                out.push_str(DISPLAY);
                after_block = true;
            }
            Segment::OpenMath(rest) => {
                open_block(&mut out);
                out.push_str(DISPLAY);
                out.push_str(rest);
                after_block = true;
            }
        }
    }

    out
}

fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut prose_start = 0;
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        let found = if let Some(inner) = rest.strip_prefix(DISPLAY) {
            match inner.find(DISPLAY) {
                Some(end) => Some((Segment::Math(&inner[..end]), end + 4)),
                None => Some((Segment::OpenMath(inner), rest.len())),
            }
        } else if let Some(inner) = rest.strip_prefix("\\[") {
            inner
                .find("\\]")
                .map(|end| (inner[..end].trim(), end))
                .filter(|(body, _)| !body.contains('$'))
                .map(|(body, end)| (Segment::Math(body), end + 4))
        } else if let Some(inner) = rest.strip_prefix('[') {
            inner
                .find(['[', ']'])
                .filter(|&end| inner[end..].starts_with(']'))
                .map(|end| (&inner[..end], end))
                .filter(|(body, _)| !body.contains('$') && body.chars().any(is_math_symbol))
                .map(|(body, end)| (Segment::Math(body.trim()), end + 2))
        } else {
            None
        };

        match found {
            Some((segment, consumed)) => {
                if prose_start < i {
                    segments.push(Segment::Prose(&text[prose_start..i]));
                }
                segments.push(segment);
                i += consumed;
                prose_start = i;
            }
            None => {
                i += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if prose_start < text.len() {
        segments.push(Segment::Prose(&text[prose_start..]));
    }

    segments
}

/// Drop trailing horizontal whitespace and start a new line unless already at one
fn open_block(out: &mut String) {
    let kept = out.trim_end_matches(is_inline_space).len();
    out.truncate(kept);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn is_inline_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_math_symbol(c: char) -> bool {
    matches!(
        c,
        '\\' | '=' | '+' | '-' | '*' | '/' | '^' | '_' | '{' | '}' | '(' | ')'
            | '∑' | '∫' | '∏' | '∂' | '∇'
            | 'α'..='ω'
            | 'Α'..='Ω'
    )
}
