//! Section detection for generated notes.
//!
//! Every parse starts from the complete buffer and rebuilds the
//! [`StructuredContent`] from scratch, so re-parsing the same text always
//! yields the same record and a longer buffer simply moves section
//! boundaries. Sections are located by their heading text; the order in which
//! headings actually appear decides where each section ends.

use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::error::{Result, WriterError};
use crate::models::StructuredContent;
use crate::streaming::tags::extract_tags;

/// The seven sections of a generated note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Title,
    Body,
    Tags,
    ImagePrompt,
    SelfComment,
    Strategy,
    Playbook,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Title,
        SectionKind::Body,
        SectionKind::Tags,
        SectionKind::ImagePrompt,
        SectionKind::SelfComment,
        SectionKind::Strategy,
        SectionKind::Playbook,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            SectionKind::Title => "title",
            SectionKind::Body => "body",
            SectionKind::Tags => "tags",
            SectionKind::ImagePrompt => "imagePrompt",
            SectionKind::SelfComment => "selfComment",
            SectionKind::Strategy => "strategy",
            SectionKind::Playbook => "playbook",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Declarative description of one section heading
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub kind: SectionKind,
    /// Number expected right after `##`
    pub ordinal: u8,
    /// Accepted heading texts; longer phrasings first so the whole heading is consumed
    pub phrasings: &'static [&'static str],
}

/// Built-in heading table. New phrasings go here.
pub const SECTION_TABLE: &[SectionSpec] = &[
    SectionSpec {
        kind: SectionKind::Title,
        ordinal: 1,
        phrasings: &["爆款标题创作", "生成标题", "标题"],
    },
    SectionSpec {
        kind: SectionKind::Body,
        ordinal: 2,
        phrasings: &["正文内容", "笔记正文", "文案内容", "正文", "内容"],
    },
    SectionSpec {
        kind: SectionKind::Tags,
        ordinal: 3,
        phrasings: &["关键词标签", "标签", "关键词"],
    },
    SectionSpec {
        kind: SectionKind::ImagePrompt,
        ordinal: 4,
        phrasings: &["AI绘画提示词", "绘画提示词", "AI绘画", "绘画提示"],
    },
    SectionSpec {
        kind: SectionKind::SelfComment,
        ordinal: 5,
        phrasings: &["首评关键词引导", "首评"],
    },
    SectionSpec {
        kind: SectionKind::Strategy,
        ordinal: 6,
        phrasings: &["发布策略建议", "发布策略"],
    },
    SectionSpec {
        kind: SectionKind::Playbook,
        ordinal: 7,
        phrasings: &["小红书增长 Playbook", "增长 Playbook"],
    },
];

/// A compiled heading pattern for one section
#[derive(Debug, Clone)]
pub struct SectionMarker {
    kind: SectionKind,
    pattern: Regex,
}

/// Where a heading was found in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionMatch {
    pub kind: SectionKind,
    /// Byte offset of the heading
    pub position: usize,
    /// Byte length of the matched heading
    pub length: usize,
}

impl SectionMatch {
    /// Offset where the section's content starts
    pub fn content_start(&self) -> usize {
        self.position + self.length
    }
}

impl SectionMarker {
    /// Compile a level-2 heading pattern: `## <ordinal>[.、] <phrasing> [(count hint)]`.
    pub fn new(kind: SectionKind, ordinal: u8, phrasings: &[&str]) -> Result<Self> {
        if phrasings.is_empty() {
            return Err(WriterError::ConfigError(format!(
                "section {} has no heading phrasings",
                kind
            )));
        }

        let alternatives = phrasings
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = format!(
            r"(?i)##\s*{}[.、]?\s*(?:{})(?:\s*[（(][0-9]+(?:-[0-9]+)?个[）)])?",
            ordinal, alternatives
        );

        let pattern = Regex::new(&pattern).map_err(|e| {
            WriterError::ConfigError(format!("Invalid heading pattern for {}: {}", kind, e))
        })?;

        Ok(Self { kind, pattern })
    }

    pub fn from_spec(spec: &SectionSpec) -> Result<Self> {
        Self::new(spec.kind, spec.ordinal, spec.phrasings)
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// First occurrence of the heading; later duplicates are not considered
    pub fn find(&self, text: &str) -> Option<SectionMatch> {
        self.pattern.find(text).map(|m| SectionMatch {
            kind: self.kind,
            position: m.start(),
            length: m.len(),
        })
    }
}

lazy_static::lazy_static! {
    static ref DEFAULT_PARSER: SectionParser =
        SectionParser::from_table(SECTION_TABLE).expect("built-in section table compiles");
}

/// Rebuilds a [`StructuredContent`] from the full accumulated text
#[derive(Debug, Clone)]
pub struct SectionParser {
    markers: Vec<SectionMarker>,
}

impl SectionParser {
    /// Parser for the built-in heading table
    pub fn new() -> Self {
        DEFAULT_PARSER.clone()
    }

    pub fn from_table(table: &[SectionSpec]) -> Result<Self> {
        let markers = table
            .iter()
            .map(SectionMarker::from_spec)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_markers(markers))
    }

    pub fn with_markers(markers: Vec<SectionMarker>) -> Self {
        Self { markers }
    }

    /// All headings present in `text`, ordered by where they appear
    pub fn locate(&self, text: &str) -> Vec<SectionMatch> {
        let mut matches: Vec<SectionMatch> =
            self.markers.iter().filter_map(|m| m.find(text)).collect();
        matches.sort_by_key(|m| m.position);
        matches
    }

    pub fn parse(&self, text: &str) -> StructuredContent {
        let matches = self.locate(text);
        let mut content = StructuredContent::default();

        let Some(first) = matches.first() else {
            // No heading yet (early stream or plain-text document)
            content.titles = text.trim().to_string();
            return content;
        };

        if first.position > 0 {
            content.titles = text[..first.position].trim().to_string();
        }

        for (i, current) in matches.iter().enumerate() {
            let end = matches.get(i + 1).map_or(text.len(), |next| next.position);
            let section = text.get(current.content_start()..end).unwrap_or("").trim();

            match current.kind {
                SectionKind::Title => content.titles = section.to_string(),
                SectionKind::Body => content.body = section.to_string(),
                SectionKind::Tags => content.tags = extract_tags(section),
                SectionKind::ImagePrompt => content.image_prompt = section.to_string(),
                SectionKind::SelfComment => content.self_comment = section.to_string(),
                SectionKind::Strategy => content.strategy = section.to_string(),
                SectionKind::Playbook => content.playbook = section.to_string(),
            }
        }

        content
    }
}

impl Default for SectionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse with the built-in heading table
pub fn parse_sections(text: &str) -> StructuredContent {
    DEFAULT_PARSER.parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_NOTE: &str = "## 1. 爆款标题创作（3个）
1. 打工人早八救星
2. 五分钟出门妆

## 2. 正文内容
早上起不来？这套流程帮你省下二十分钟。

## 3. 关键词标签（5-8个）
#早八妆容 #通勤 #打工人
- 快速出门

## 4. AI绘画提示词
bright vanity desk, morning light

minimal flat lay, pastel tones

## 5. 首评关键词引导
你们早上化妆要多久？

## 6. 发布策略建议
工作日早上7点发布

## 7. 小红书增长 Playbook
评论区多回复";

    #[test]
    fn test_full_note() {
        let content = parse_sections(FULL_NOTE);

        assert_eq!(content.titles, "1. 打工人早八救星\n2. 五分钟出门妆");
        assert_eq!(content.body, "早上起不来？这套流程帮你省下二十分钟。");
        assert_eq!(content.tags, vec!["早八妆容", "通勤", "打工人", "快速出门"]);
        assert_eq!(
            content.image_prompts(),
            vec![
                "bright vanity desk, morning light",
                "minimal flat lay, pastel tones"
            ]
        );
        assert_eq!(content.self_comment, "你们早上化妆要多久？");
        assert_eq!(content.strategy, "工作日早上7点发布");
        assert_eq!(content.playbook, "评论区多回复");
    }

    #[test]
    fn test_title_and_tags_only() {
        let content = parse_sections("## 1. 标题\nMy Title\n## 3. 标签\n#foo #bar");

        assert_eq!(content.titles, "My Title");
        assert_eq!(content.tags, vec!["foo", "bar"]);
        assert!(content.body.is_empty());
        assert!(content.image_prompt.is_empty());
        assert!(content.self_comment.is_empty());
        assert!(content.strategy.is_empty());
        assert!(content.playbook.is_empty());
    }

    #[test]
    fn test_no_headings_is_all_titles() {
        let text = "  still thinking about a catchy title...\n";
        let content = parse_sections(text);

        assert_eq!(content.titles, text.trim());
        assert_eq!(
            content,
            StructuredContent {
                titles: text.trim().to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(parse_sections(""), StructuredContent::default());
    }

    #[test]
    fn test_leading_text_becomes_titles() {
        let content = parse_sections("好的，以下是文案：\n## 2. 正文\n正文部分");
        assert_eq!(content.titles, "好的，以下是文案：");
        assert_eq!(content.body, "正文部分");
    }

    #[test]
    fn test_title_heading_overrides_leading_text() {
        let content = parse_sections("preamble\n## 1. 标题\nReal title");
        assert_eq!(content.titles, "Real title");
    }

    #[test]
    fn test_out_of_order_headings_assigned_by_position() {
        let content = parse_sections("## 3. 标签\n#late\n## 2. 正文\nbody text\n## 1. 标题\nthe title");

        assert_eq!(content.tags, vec!["late"]);
        assert_eq!(content.body, "body text");
        assert_eq!(content.titles, "the title");
    }

    #[test]
    fn test_duplicate_heading_merges_into_preceding_section() {
        let content =
            parse_sections("## 2. 正文\nfirst\n## 6. 发布策略\nplan\n## 2. 正文\nsecond");

        assert_eq!(content.body, "first");
        assert_eq!(content.strategy, "plan\n## 2. 正文\nsecond");
    }

    #[test]
    fn test_heading_variants() {
        let locate = |text: &str| SectionParser::new().locate(text);

        assert_eq!(locate("##1标题")[0].kind, SectionKind::Title);
        assert_eq!(locate("## 4、绘画提示\nx")[0].kind, SectionKind::ImagePrompt);
        assert_eq!(locate("## 7. 增长 playbook\nx")[0].kind, SectionKind::Playbook);
        assert_eq!(locate("##   5.  首评")[0].kind, SectionKind::SelfComment);
        assert!(locate("# 1. 标题").is_empty());
        assert!(locate("## 2. 标题").is_empty());
    }

    #[test]
    fn test_count_hint_is_part_of_heading() {
        let text = "## 1. 标题（5个）\nA";
        let found = SectionParser::new().locate(text);

        assert_eq!(found[0].position, 0);
        assert_eq!(&text[..found[0].content_start()], "## 1. 标题（5个）");
        assert_eq!(parse_sections(text).titles, "A");
    }

    #[test]
    fn test_longest_phrasing_consumed() {
        let content = parse_sections("## 3. 关键词标签\n#a");
        assert_eq!(content.tags, vec!["a"]);

        let content = parse_sections("## 2. 正文内容\nbody");
        assert_eq!(content.body, "body");
    }

    #[test]
    fn test_idempotent() {
        let parser = SectionParser::new();
        assert_eq!(parser.parse(FULL_NOTE), parser.parse(FULL_NOTE));
    }

    #[test]
    fn test_growing_buffer_truncates_open_section() {
        let partial = "## 2. 正文\n第一段\n## 3. 标";
        let content = parse_sections(partial);
        // The half-written heading still belongs to the body
        assert_eq!(content.body, "第一段\n## 3. 标");

        let grown = "## 2. 正文\n第一段\n## 3. 标签\n#结束";
        let content = parse_sections(grown);
        assert_eq!(content.body, "第一段");
        assert_eq!(content.tags, vec!["结束"]);
    }

    #[test]
    fn test_custom_table() {
        const TABLE: &[SectionSpec] = &[SectionSpec {
            kind: SectionKind::Body,
            ordinal: 2,
            phrasings: &["Body"],
        }];
        let parser = SectionParser::from_table(TABLE).unwrap();

        let content = parser.parse("intro\n## 2. body\ntext");
        assert_eq!(content.titles, "intro");
        assert_eq!(content.body, "text");
    }

    #[test]
    fn test_marker_requires_phrasings() {
        assert!(SectionMarker::new(SectionKind::Body, 2, &[]).is_err());
    }
}
