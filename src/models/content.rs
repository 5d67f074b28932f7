use serde::{Deserialize, Serialize};

/// Structured note derived from the accumulated generation text.
///
/// Always rebuilt from the full buffer; it carries no state between parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContent {
    /// Candidate headline(s)
    pub titles: String,
    /// Main note text
    pub body: String,
    /// Unique keyword labels in first-seen order
    pub tags: Vec<String>,
    /// Image-generation prompts separated by blank lines
    pub image_prompt: String,
    /// Suggested first comment
    pub self_comment: String,
    /// Posting strategy
    pub strategy: String,
    /// Growth advice
    pub playbook: String,
}

impl StructuredContent {
    /// True when any section carries non-blank text or at least one tag
    pub fn has_content(&self) -> bool {
        !self.tags.is_empty()
            || [
                &self.titles,
                &self.body,
                &self.image_prompt,
                &self.self_comment,
                &self.strategy,
                &self.playbook,
            ]
            .iter()
            .any(|field| !field.trim().is_empty())
    }

    /// Individual image prompts, split on blank lines
    pub fn image_prompts(&self) -> Vec<&str> {
        self.image_prompt
            .split("\n\n")
            .filter(|prompt| !prompt.is_empty())
            .collect()
    }

    /// Render every non-empty section under its label, ready to paste.
    ///
    /// Falls back to the trimmed raw text when nothing was recognised.
    pub fn to_copy_text(&self, raw_fallback: &str) -> String {
        let mut sections = Vec::new();

        let mut push = |label: &str, text: &str| {
            let text = text.trim();
            if !text.is_empty() {
                sections.push(format!("【{}】\n{}", label, text));
            }
        };

        push("爆款标题", &self.titles);
        push("正文内容", &self.body);
        push(
            "关键词标签",
            &self
                .tags
                .iter()
                .map(|tag| format!("#{}", tag))
                .collect::<Vec<_>>()
                .join(" "),
        );
        push("绘画提示词", &self.image_prompt);
        push("首评建议", &self.self_comment);
        push("发布策略", &self.strategy);
        push("增长 Playbook", &self.playbook);

        if sections.is_empty() {
            raw_fallback.trim().to_string()
        } else {
            sections.join("\n\n")
        }
    }
}
