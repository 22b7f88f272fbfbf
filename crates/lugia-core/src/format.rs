//! Message text segmentation
//!
//! Chat replies mix prose with fenced code. Splitting the text on the
//! triple-backtick fence gives segments that alternate prose (even positions)
//! and code (odd positions). An unmatched fence leaves the tail as code.

const FENCE: &str = "```";

/// Leading whitespace characters per indentation level
const INDENT_WIDTH: usize = 4;

/// A unit of formatted message output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderBlock {
    Text(TextBlock),
    Code(CodeBlock),
}

impl RenderBlock {
    pub fn is_code(&self) -> bool {
        matches!(self, RenderBlock::Code(_))
    }
}

/// Prose lines with their indentation, separated by explicit breaks
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBlock {
    pub segments: Vec<TextSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSegment {
    Line(TextLine),
    Break,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    /// Indentation level in units of four leading whitespace characters
    pub indent: usize,
    pub content: String,
}

impl TextBlock {
    fn from_segment(segment: &str) -> Self {
        let mut segments = Vec::new();

        for (i, raw) in segment.split('\n').enumerate() {
            if i > 0 {
                segments.push(TextSegment::Break);
            }
            segments.push(TextSegment::Line(TextLine::from_raw(raw)));
        }

        Self { segments }
    }

    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.segments.iter().filter_map(|segment| match segment {
            TextSegment::Line(line) => Some(line),
            TextSegment::Break => None,
        })
    }

    /// Line contents joined with newlines, indentation dropped
    pub fn plain_text(&self) -> String {
        self.lines()
            .map(|line| line.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TextLine {
    fn from_raw(raw: &str) -> Self {
        let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
        Self {
            indent: leading / INDENT_WIDTH,
            content: raw.trim().to_string(),
        }
    }
}

/// Verbatim code, displayed as-is and optionally highlighted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub source: String,
}

impl CodeBlock {
    /// The conventional language tag on the first line of a fence
    /// (```` ```python ````), if the first line looks like one.
    ///
    /// Only a candidate: the highlighter decides whether it names a syntax.
    pub fn language_hint(&self) -> Option<&str> {
        let (first, rest) = self.source.split_once('\n')?;
        let tag = first.trim();
        let looks_like_tag = !tag.is_empty()
            && tag.len() <= 24
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '-' | '_' | '.'));

        if looks_like_tag && !rest.is_empty() {
            Some(tag)
        } else {
            None
        }
    }
}

/// Split message text into renderable blocks.
///
/// Never fails: unmatched fences and empty input are fine. Whitespace-only
/// prose segments are the only segments dropped.
pub fn format(text: &str) -> Vec<RenderBlock> {
    text.split(FENCE)
        .enumerate()
        .filter_map(|(index, segment)| {
            if index % 2 == 0 {
                if segment.trim().is_empty() {
                    None
                } else {
                    Some(RenderBlock::Text(TextBlock::from_segment(segment)))
                }
            } else {
                Some(RenderBlock::Code(CodeBlock {
                    source: segment.to_string(),
                }))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(block: &RenderBlock) -> &TextBlock {
        match block {
            RenderBlock::Text(t) => t,
            RenderBlock::Code(c) => panic!("expected text block, got code {:?}", c.source),
        }
    }

    fn code(block: &RenderBlock) -> &str {
        match block {
            RenderBlock::Code(c) => &c.source,
            RenderBlock::Text(t) => panic!("expected code block, got text {:?}", t.plain_text()),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(format("").is_empty());
    }

    #[test]
    fn test_plain_text_single_line() {
        let blocks = format("plain text");
        assert_eq!(blocks.len(), 1);
        let lines: Vec<_> = text(&blocks[0]).lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].indent, 0);
        assert_eq!(lines[0].content, "plain text");
    }

    #[test]
    fn test_text_code_text() {
        let blocks = format("a```code```b");
        assert_eq!(blocks.len(), 3);
        assert_eq!(text(&blocks[0]).plain_text(), "a");
        assert_eq!(code(&blocks[1]), "code");
        assert_eq!(text(&blocks[2]).plain_text(), "b");
    }

    #[test]
    fn test_leading_empty_text_suppressed() {
        let blocks = format("```only code```");
        assert_eq!(blocks, vec![RenderBlock::Code(CodeBlock { source: "only code".into() })]);
    }

    #[test]
    fn test_code_is_not_trimmed() {
        let blocks = format("```\n    indented\n```");
        assert_eq!(code(&blocks[0]), "\n    indented\n");
    }

    #[test]
    fn test_empty_code_segment_kept() {
        let blocks = format("before``````after");
        assert_eq!(blocks.len(), 3);
        assert_eq!(code(&blocks[1]), "");
    }

    #[test]
    fn test_unmatched_fence_leaves_trailing_code() {
        let blocks = format("intro```let x = 1;");
        assert_eq!(blocks.len(), 2);
        assert_eq!(code(&blocks[1]), "let x = 1;");
    }

    #[test]
    fn test_code_count_follows_fence_count() {
        let inputs = [
            "",
            "no fences",
            "```",
            "a```b",
            "a```b```c",
            "```x``````y```",
            "  ```  ```  ```  ",
            "1```2```3```4```5```6",
        ];
        for input in inputs {
            let fences = input.matches(FENCE).count();
            let blocks = format(input);
            let code_blocks = blocks.iter().filter(|b| b.is_code()).count();
            // Balanced fences give fences / 2; an unmatched one adds the trailing code
            assert_eq!(code_blocks, (fences + 1) / 2, "input {:?}", input);
            if fences % 2 == 0 {
                assert_eq!(code_blocks, fences / 2);
            }
        }
    }

    #[test]
    fn test_blocks_alternate_starting_with_text() {
        // Whitespace-only prose is dropped, so check positions on input
        // where every prose segment has content.
        let blocks = format("a```1```b```2```c");
        let kinds: Vec<bool> = blocks.iter().map(|b| b.is_code()).collect();
        assert_eq!(kinds, vec![false, true, false, true, false]);
    }

    #[test]
    fn test_indentation_levels() {
        let blocks = format("top\n        eight\n   three\n\tone tab");
        let lines: Vec<_> = text(&blocks[0]).lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!((lines[0].indent, lines[0].content.as_str()), (0, "top"));
        assert_eq!((lines[1].indent, lines[1].content.as_str()), (2, "eight"));
        assert_eq!((lines[2].indent, lines[2].content.as_str()), (0, "three"));
        assert_eq!(lines[3].indent, 0);
    }

    #[test]
    fn test_lines_separated_by_breaks() {
        let blocks = format("one\ntwo");
        let segments = &text(&blocks[0]).segments;
        assert_eq!(segments.len(), 3);
        assert!(matches!(segments[0], TextSegment::Line(_)));
        assert_eq!(segments[1], TextSegment::Break);
        assert!(matches!(segments[2], TextSegment::Line(_)));
    }

    #[test]
    fn test_language_hint() {
        let block = CodeBlock { source: "python\nprint('hi')\n".into() };
        assert_eq!(block.language_hint(), Some("python"));

        let inline = CodeBlock { source: "x=1".into() };
        assert_eq!(inline.language_hint(), None);

        let untagged = CodeBlock { source: "\nfn main() {}\n".into() };
        assert_eq!(untagged.language_hint(), None);

        let statement = CodeBlock { source: "let x = 1;\nlet y = 2;".into() };
        assert_eq!(statement.language_hint(), None);
    }
}
