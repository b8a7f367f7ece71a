//! Fixed vocabularies and canonical keys the keyword stages test against.

/// Product types, in the order the size lookup tries them.
pub const PRODUCT_TYPES: [&str; 10] = [
    "더블", "맥스", "프라임", "슬림", "미디", "미니", "팟", "드롭", "라운저", "피라미드",
];

pub const SIZE_PROMPT_PHRASES: [&str; 3] = ["소파 사이즈", "빈백 사이즈", "상품 사이즈"];

pub const COVER: &str = "커버";
pub const REPLACE: &str = "교체";
pub const REPLACE_USE_CUES: [&str; 2] = ["사용", "교체해서 사용"];

pub const COVERING: &str = "커버링";
pub const METHOD: &str = "방법";
/// Asks for the covering method without naming a product.
pub const COVERING_REQUEST: &str = "커버링 방법 알려줘";

pub const BIZ: &str = "비즈";
/// Tiers, longest first so "프리미엄 플러스" wins over "프리미엄".
pub const BIZ_TIERS: [&str; 3] = ["프리미엄 플러스", "프리미엄", "스탠다드"];
pub const BIZ_GENERIC_REQUESTS: [&str; 2] = ["비즈 알려줘", "비즈 방법 알려줘"];

pub const BRAND: &str = "요기보";
pub const HISTORY_CUES: [&str; 5] = ["역사", "알려줘", "란", "탄생", "에 대해"];
pub const HISTORY_KEY: &str = "요기보 에 대해 알고 싶어";

pub const MEMBERSHIP_CUES: [&str; 3] = ["회원가입", "회원 등록", "가입 방법"];
pub const MEMBERSHIP_KEY: &str = "회원 가입 방법";

pub fn covering_key(product: &str) -> String {
    format!("{} 커버링 방법을 알고 싶어", product)
}

pub fn size_key(product: &str) -> String {
    format!("{} 사이즈 또는 크기.", product)
}

pub fn biz_key(tier: &str) -> String {
    format!("{} 비즈 에 대해 알고 싶어", tier)
}

/// True if `input` contains any of `needles`.
#[inline]
pub fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| input.contains(n))
}

/// First product type mentioned in `input`, in [`PRODUCT_TYPES`] order.
pub fn mentioned_product(input: &str) -> Option<&'static str> {
    PRODUCT_TYPES.iter().copied().find(|t| input.contains(t))
}
