//! Best-effort syntax highlighting for code blocks
//!
//! Anything the highlighter cannot handle (unknown language, missing theme,
//! a line that fails to parse) is shown as plain code text.

use lugia_core::CodeBlock;
use once_cell::sync::Lazy;
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::theme::Theme;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Highlighted code: the detected language and one span list per line
pub struct HighlightedCode {
    pub language: Option<String>,
    pub lines: Vec<Vec<Span<'static>>>,
}

pub fn highlight_code(block: &CodeBlock, theme: Theme, plain: Style) -> HighlightedCode {
    let syntax_set = &*SYNTAX_SET;

    // The body is shown verbatim; a language tag only picks the syntax
    let code = display_body(&block.source);
    let syntax = block
        .language_hint()
        .and_then(|hint| find_syntax(hint, syntax_set))
        .or_else(|| {
            code.lines()
                .find(|line| !line.trim().is_empty())
                .and_then(|line| syntax_set.find_syntax_by_first_line(line))
        });

    let language = syntax.map(|s| s.name.clone());
    let lines = match (syntax, THEME_SET.themes.get(theme.syntax_theme())) {
        (Some(syntax), Some(syntect_theme)) => {
            let mut highlighter = HighlightLines::new(syntax, syntect_theme);
            LinesWithEndings::from(code)
                .map(|line| match highlighter.highlight_line(line, syntax_set) {
                    Ok(ranges) => ranges
                        .into_iter()
                        .filter_map(|(style, piece)| {
                            let piece = piece.trim_end_matches(|c: char| c == '\n' || c == '\r');
                            if piece.is_empty() {
                                None
                            } else {
                                Some(Span::styled(piece.to_string(), style_to_tui(style)))
                            }
                        })
                        .collect(),
                    Err(err) => {
                        tracing::debug!(error = %err, "highlighting failed, showing plain line");
                        plain_line(line, plain)
                    }
                })
                .collect()
        }
        _ => code.lines().map(|line| plain_line(line, plain)).collect(),
    };

    HighlightedCode { language, lines }
}

/// Drop the newline that ends the opening fence line and the one before the
/// closing fence; the rest is shown verbatim
fn display_body(source: &str) -> &str {
    let source = source.strip_prefix('\n').unwrap_or(source);
    source.strip_suffix('\n').unwrap_or(source)
}

fn plain_line(line: &str, style: Style) -> Vec<Span<'static>> {
    let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
    if line.is_empty() {
        Vec::new()
    } else {
        vec![Span::styled(line.to_string(), style)]
    }
}

fn find_syntax<'a>(token: &str, syntax_set: &'a SyntaxSet) -> Option<&'a SyntaxReference> {
    let token = token.to_lowercase();
    let token = match token.as_str() {
        "py" | "python3" => "python",
        "js" | "node" => "javascript",
        "sh" | "shell" | "zsh" => "bash",
        "rs" => "rust",
        other => other,
    };

    syntax_set
        .find_syntax_by_token(token)
        .or_else(|| syntax_set.find_syntax_by_extension(token))
        .filter(|syntax| syntax.name != "Plain Text")
}

fn style_to_tui(style: SyntectStyle) -> Style {
    let mut out = Style::default().fg(Color::Rgb(
        style.foreground.r,
        style.foreground.g,
        style.foreground.b,
    ));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &[Span<'static>]) -> String {
        line.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_tagged_block_keeps_tag_line() {
        let block = CodeBlock {
            source: "python\ndef f():\n    return 1\n".to_string(),
        };
        let highlighted = highlight_code(&block, Theme::Dark, Style::default());

        assert_eq!(highlighted.language.as_deref(), Some("Python"));
        let lines: Vec<String> = highlighted.lines.iter().map(|l| text_of(l)).collect();
        assert_eq!(lines, vec!["python", "def f():", "    return 1"]);
    }

    #[test]
    fn test_unknown_content_falls_back_to_plain() {
        let block = CodeBlock {
            source: "x=1".to_string(),
        };
        let plain = Style::default().fg(Color::Gray);
        let highlighted = highlight_code(&block, Theme::Light, plain);

        assert_eq!(highlighted.language, None);
        assert_eq!(highlighted.lines.len(), 1);
        assert_eq!(text_of(&highlighted.lines[0]), "x=1");
        assert_eq!(highlighted.lines[0][0].style, plain);
    }

    #[test]
    fn test_unrecognised_tag_is_kept_as_code() {
        let block = CodeBlock {
            source: "notalanguage\nsome text\n".to_string(),
        };
        let highlighted = highlight_code(&block, Theme::Dark, Style::default());

        let lines: Vec<String> = highlighted.lines.iter().map(|l| text_of(l)).collect();
        assert_eq!(lines, vec!["notalanguage", "some text"]);
    }

    #[test]
    fn test_display_body_trims_fence_newlines_only() {
        assert_eq!(display_body("\n    indented\n"), "    indented");
        assert_eq!(display_body("\n\nblank first\n"), "\nblank first");
        assert_eq!(display_body(""), "");
    }
}
