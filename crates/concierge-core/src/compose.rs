//! Output contract and the fixed texts, markup and remarks used to build it.

use crate::knowledge::KnowledgeEntry;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Text of the no-match answer; also what callers saw before [`Resolution`] existed.
pub const NO_MATCH_TEXT: &str = "질문을 이해하지 못했어요. 좀더 자세히 입력 해주시겠어요";
/// Answer for a cascade outcome that should be impossible.
pub const INTERNAL_ERROR_TEXT: &str = "알 수 없는 오류가 발생했습니다.";
/// Answer when the request could not be served at all (e.g. fallback failure).
pub const SERVICE_UNAVAILABLE_TEXT: &str =
    "죄송하지만, 현재 요청을 처리할 수 없습니다. 나중에 다시 시도해 주세요.";

pub const SIZE_PROMPT: &str =
    "어떤 빈백 사이즈가 궁금하신가요? 예를 들어, 맥스, 더블, 프라임, 피라미드 등 상품명을 입력해주세요.";
pub const COVERING_PROMPT: &str =
    "어떤 커버링인가요? 예를 들어, '맥스', '프라임', '더블', '피라미드' 등을 입력해주세요.";
pub const BIZ_PROMPT: &str = "어떤 비즈에 대해 궁금하신가요? 예를 들어, '스탠다드 비즈', '프리미엄 비즈', '프리미엄 플러스 비즈' 등을 입력해주세요.";
pub const COVER_REPLACEMENT_ANSWER: &str = "해당 제품 전용 커버라면 모두 사용 가능해요. 요기보, 럭스, 믹스, 줄라 등 다양한 커버를 사용해보세요. 예를 들어, 맥스 제품을 사용 중이시라면 요기보 맥스 커버, 럭스 맥스 커버, 믹스 맥스 커버, 줄라 맥스 커버로 교체하여 사용 가능합니다.";

/// Closing remarks appended to biz answers.
pub const BIZ_CLOSING_REMARKS: [&str; 4] = [
    "추가로 궁금하신 사항이 있으시면 언제든 말씀해주세요.",
    "이 정보가 도움이 되길 바랍니다.",
    "더 자세한 정보가 필요하시면 문의해 주세요.",
    "고객님의 선택에 도움이 되었으면 좋겠습니다.",
];

/// Longest history summary before truncation.
pub const HISTORY_SUMMARY_CHARS: usize = 300;

/// Which iframe template wraps a covering video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoEmbed {
    /// Reply to the "which product?" follow-up.
    FollowUp,
    /// Winner of the final pooled comparison.
    Pooled,
}

impl VideoEmbed {
    pub fn render(self, url: &str) -> String {
        match self {
            VideoEmbed::FollowUp => format!(
                r#"<iframe width="560" height="315" src="{}" frameborder="0" allowfullscreen></iframe>"#,
                url
            ),
            VideoEmbed::Pooled => format!(
                r#"<iframe width="100%" height="315" src="{}" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe>"#,
                url
            ),
        }
    }
}

/// Picks one of the closing remarks.
pub trait RemarkChooser: Send + Sync {
    fn choose<'a>(&self, remarks: &[&'a str]) -> &'a str;
}

/// Uniform random choice (production).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRemark;

impl RemarkChooser for RandomRemark {
    fn choose<'a>(&self, remarks: &[&'a str]) -> &'a str {
        if remarks.is_empty() {
            return "";
        }
        remarks[rand::thread_rng().gen_range(0..remarks.len())]
    }
}

/// Always the remark at a fixed position (wraps around); for deterministic callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedRemark(pub usize);

impl RemarkChooser for FixedRemark {
    fn choose<'a>(&self, remarks: &[&'a str]) -> &'a str {
        if remarks.is_empty() {
            return "";
        }
        remarks[self.0 % remarks.len()]
    }
}

/// The answer returned to the client. Every field is always present; unset ones are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAnswer {
    pub text: String,
    pub video_html: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl ResolvedAnswer {
    /// Text only, every other field null.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            video_html: None,
            description: None,
            image_url: None,
        }
    }

    /// The no-match answer.
    pub fn no_match() -> Self {
        Self::text_only(NO_MATCH_TEXT)
    }

    pub fn internal_error() -> Self {
        Self::text_only(INTERNAL_ERROR_TEXT)
    }

    pub fn service_unavailable() -> Self {
        Self::text_only(SERVICE_UNAVAILABLE_TEXT)
    }

    /// Description as both text and description, plus the image (size, goods, home, delivery).
    pub fn described(entry: &KnowledgeEntry) -> Self {
        let description = entry.description_text().to_string();
        Self {
            text: description.clone(),
            video_html: None,
            description: Some(description),
            image_url: entry.image().map(str::to_string),
        }
    }

    /// Covering answer with its video wrapped in the given template.
    pub fn covering(entry: &KnowledgeEntry, embed: VideoEmbed) -> Self {
        Self {
            text: entry.answer_text().to_string(),
            video_html: entry.video().map(|url| embed.render(url)),
            description: None,
            image_url: None,
        }
    }

    /// Biz answer: description followed by one closing remark.
    pub fn biz(entry: &KnowledgeEntry, chooser: &dyn RemarkChooser) -> Self {
        let description = entry.description_text();
        Self {
            text: format!("{} {}", description, chooser.choose(&BIZ_CLOSING_REMARKS)),
            video_html: None,
            description: Some(description.to_string()),
            image_url: None,
        }
    }

    /// Brand history: shortened text, full description.
    pub fn history(entry: &KnowledgeEntry) -> Self {
        let full = entry.description_text();
        Self {
            text: summarize(full, HISTORY_SUMMARY_CHARS),
            video_html: None,
            description: Some(full.to_string()),
            image_url: None,
        }
    }
}

/// Outcome of one pass through the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(ResolvedAnswer),
    /// No stage resolved the input; callers may escalate to a fallback responder.
    Unmatched,
}

impl Resolution {
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Resolution::Unmatched)
    }

    /// The answer to send, substituting the no-match answer for `Unmatched`.
    pub fn into_answer(self) -> ResolvedAnswer {
        match self {
            Resolution::Matched(answer) => answer,
            Resolution::Unmatched => ResolvedAnswer::no_match(),
        }
    }
}

/// First `max_chars` characters followed by `...`, or `text` unchanged if it already fits.
pub fn summarize(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_truncates_on_characters() {
        let long = "가".repeat(400);
        let s = summarize(&long, 300);
        assert_eq!(s.chars().count(), 303);
        assert!(s.ends_with("..."));
        assert!(s.starts_with(&"가".repeat(300)));

        let exact = "나".repeat(300);
        assert_eq!(summarize(&exact, 300), exact);
        assert_eq!(summarize("", 300), "");
    }

    #[test]
    fn iframe_templates_are_verbatim() {
        assert_eq!(
            VideoEmbed::FollowUp.render("https://v/x"),
            r#"<iframe width="560" height="315" src="https://v/x" frameborder="0" allowfullscreen></iframe>"#
        );
        assert_eq!(
            VideoEmbed::Pooled.render("https://v/x"),
            r#"<iframe width="100%" height="315" src="https://v/x" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe>"#
        );
    }

    #[test]
    fn covering_without_video_has_null_markup() {
        let entry = KnowledgeEntry {
            answer: Some("커버를 씌우세요".into()),
            ..Default::default()
        };
        let a = ResolvedAnswer::covering(&entry, VideoEmbed::Pooled);
        assert_eq!(a.text, "커버를 씌우세요");
        assert_eq!(a.video_html, None);
        assert_eq!(a.description, None);
    }

    #[test]
    fn biz_appends_chosen_remark() {
        let entry = KnowledgeEntry {
            description: Some("스탠다드 비즈 설명".into()),
            ..Default::default()
        };
        let a = ResolvedAnswer::biz(&entry, &FixedRemark(1));
        assert_eq!(a.text, format!("스탠다드 비즈 설명 {}", BIZ_CLOSING_REMARKS[1]));
        assert_eq!(a.description.as_deref(), Some("스탠다드 비즈 설명"));
    }

    #[test]
    fn random_remark_is_one_of_the_remarks() {
        for _ in 0..20 {
            let r = RandomRemark.choose(&BIZ_CLOSING_REMARKS);
            assert!(BIZ_CLOSING_REMARKS.contains(&r));
        }
    }

    #[test]
    fn answer_serializes_nulls_explicitly() {
        let json = serde_json::to_value(ResolvedAnswer::no_match()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": NO_MATCH_TEXT,
                "videoHtml": null,
                "description": null,
                "imageUrl": null
            })
        );
    }

    #[test]
    fn unmatched_becomes_no_match_answer() {
        assert!(Resolution::Unmatched.is_unmatched());
        assert_eq!(Resolution::Unmatched.into_answer(), ResolvedAnswer::no_match());
    }
}
