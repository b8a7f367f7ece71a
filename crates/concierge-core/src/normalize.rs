//! Canonical form for user input and stored questions.

/// Punctuation dropped anywhere in the sentence (ASCII and full-width).
const STRIPPED: [char; 4] = ['?', '!', '！', '？'];

/// Negative-question endings folded into one canonical ending.
const VARIANT_FOLDS: [(&str, &str); 1] = [("없나요", "없어요")];

/// Strips question/exclamation marks, folds known lexical variants and trims.
///
/// Both user input and knowledge-base keys go through this before any comparison.
/// The result is a fixed point: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(input: &str) -> String {
    let mut out: String = input.chars().filter(|c| !STRIPPED.contains(c)).collect();
    for (from, to) in VARIANT_FOLDS {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ascii_and_full_width_marks() {
        assert_eq!(normalize("배송은 언제 오나요?"), "배송은 언제 오나요");
        assert_eq!(normalize("정말요！？"), "정말요");
        assert_eq!(normalize("a?b!c"), "abc");
    }

    #[test]
    fn folds_negative_question_variant() {
        assert_eq!(normalize("재고 없나요?"), "재고 없어요");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize("  맥스 ?  "), "맥스");
    }

    #[test]
    fn keeps_periods_and_inner_spacing() {
        assert_eq!(normalize("맥스 사이즈 또는 크기."), "맥스 사이즈 또는 크기.");
    }

    #[test]
    fn is_idempotent() {
        for s in [
            "",
            "   ",
            "?!",
            " 없나요 ? ",
            "커버링 방법 알려줘!",
            "없없나요나요",
            "프리미엄 플러스 비즈？",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input {:?}", s);
        }
    }
}
