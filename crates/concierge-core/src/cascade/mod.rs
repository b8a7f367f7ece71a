//! Intent resolution: an ordered cascade of keyword and edit-distance stages.
//!
//! ```text
//! raw input ──► normalize
//!                  │
//!   0 pending covering follow-up ──(no hit: reset, fall through)
//!   1 size prompt            5 biz tier            9 delivery  ≈ (≤ 8)
//!   2 size lookup            6 brand history      10 home page ≈ (≤ 6, minus membership)
//!   3 cover replacement      7 goods ≈ (≤ 8)      11 covering + biz pooled ≈ (≤ 7)
//!   4 covering prompt        8 membership              └─► Unmatched
//! ```
//!
//! The first stage that yields a result ends the pass.

pub mod vocab;


use crate::compose::{RandomRemark, RemarkChooser, Resolution, ResolvedAnswer, VideoEmbed};
use crate::context::{ConversationContext, PendingTopic};
use crate::knowledge::{CategoryKind, KnowledgeBase};
use crate::matcher::{best_match, candidates, BestMatch, Candidate};
use crate::normalize::normalize;
use crate::shared::MatchThresholds;
use std::sync::Arc;
use vocab::*;

/// Cascade stages in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PendingFollowUp,
    SizePrompt,
    SizeLookup,
    CoverReplacement,
    CoveringPrompt,
    BizTier,
    BrandHistory,
    GoodsApproximate,
    Membership,
    DeliveryApproximate,
    HomePageApproximate,
    PooledApproximate,
}

impl Stage {
    pub const ORDER: [Stage; 12] = [
        Stage::PendingFollowUp,
        Stage::SizePrompt,
        Stage::SizeLookup,
        Stage::CoverReplacement,
        Stage::CoveringPrompt,
        Stage::BizTier,
        Stage::BrandHistory,
        Stage::GoodsApproximate,
        Stage::Membership,
        Stage::DeliveryApproximate,
        Stage::HomePageApproximate,
        Stage::PooledApproximate,
    ];
}

/// Resolves one utterance against the knowledge base, reading and updating a conversation's context.
pub struct IntentEngine {
    knowledge: Arc<KnowledgeBase>,
    chooser: Arc<dyn RemarkChooser>,
    thresholds: MatchThresholds,
}

impl IntentEngine {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            knowledge,
            chooser: Arc::new(RandomRemark),
            thresholds: MatchThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replaces the random closing-remark choice (tests pass a fixed one).
    pub fn with_remark_chooser(mut self, chooser: Arc<dyn RemarkChooser>) -> Self {
        self.chooser = chooser;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    /// Runs the cascade for `raw`.
    pub fn resolve(&self, ctx: &mut ConversationContext, raw: &str) -> Resolution {
        let input = normalize(raw);
        for stage in Stage::ORDER {
            if let Some(resolution) = self.run(stage, ctx, &input) {
                tracing::debug!(
                    target: "concierge::cascade",
                    ?stage,
                    unmatched = resolution.is_unmatched(),
                    pending = ?ctx.pending(),
                    "Input resolved"
                );
                return resolution;
            }
        }
        tracing::error!(target: "concierge::cascade", input = %input, "No stage produced a result");
        Resolution::Matched(ResolvedAnswer::internal_error())
    }

    fn run(&self, stage: Stage, ctx: &mut ConversationContext, input: &str) -> Option<Resolution> {
        match stage {
            Stage::PendingFollowUp => self.pending_follow_up(ctx, input),
            Stage::SizePrompt => size_prompt(input),
            Stage::SizeLookup => self.size_lookup(input),
            Stage::CoverReplacement => cover_replacement(input),
            Stage::CoveringPrompt => covering_prompt(ctx, input),
            Stage::BizTier => self.biz_tier(input),
            Stage::BrandHistory => self.brand_history(input),
            Stage::GoodsApproximate => self.approximate(
                input,
                CategoryKind::GoodsInfo,
                self.thresholds.goods,
            ),
            Stage::Membership => self.membership(input),
            Stage::DeliveryApproximate => self.approximate(
                input,
                CategoryKind::DeliveryInfo,
                self.thresholds.delivery,
            ),
            Stage::HomePageApproximate => self.home_page(input),
            Stage::PooledApproximate => self.pooled(input),
        }
    }

    /// Answers the "which product?" covering question. The slot is cleared whatever happens;
    /// anything other than a known product with a covering entry falls through.
    fn pending_follow_up(&self, ctx: &mut ConversationContext, input: &str) -> Option<Resolution> {
        if ctx.take_pending() != PendingTopic::AwaitingCoveringType {
            return None;
        }
        let product = PRODUCT_TYPES.iter().find(|t| **t == input)?;
        match self.knowledge.get(CategoryKind::Covering, &covering_key(product)) {
            Some(entry) => Some(Resolution::Matched(ResolvedAnswer::covering(
                entry,
                VideoEmbed::FollowUp,
            ))),
            None => {
                tracing::debug!(target: "concierge::cascade", product, "No covering entry for follow-up");
                None
            }
        }
    }

    fn size_lookup(&self, input: &str) -> Option<Resolution> {
        PRODUCT_TYPES
            .iter()
            .filter(|t| input.contains(*t))
            .find_map(|t| self.knowledge.get(CategoryKind::SizeInfo, &size_key(t)))
            .map(|entry| Resolution::Matched(ResolvedAnswer::described(entry)))
    }

    fn biz_tier(&self, input: &str) -> Option<Resolution> {
        let names_tier = contains_any(input, &BIZ_TIERS);
        if (input.contains(BIZ) && !names_tier) || BIZ_GENERIC_REQUESTS.contains(&input) {
            return Some(prompt(crate::compose::BIZ_PROMPT));
        }
        let exact = BIZ_TIERS.iter().filter(|t| **t == input);
        let contained = BIZ_TIERS.iter().filter(|t| input.contains(*t));
        exact
            .chain(contained)
            .find_map(|t| self.knowledge.get(CategoryKind::Biz, &biz_key(t)))
            .map(|entry| Resolution::Matched(ResolvedAnswer::biz(entry, self.chooser.as_ref())))
    }

    fn brand_history(&self, input: &str) -> Option<Resolution> {
        if !(input.contains(BRAND) && contains_any(input, &HISTORY_CUES)) {
            return None;
        }
        self.knowledge
            .get(CategoryKind::History, HISTORY_KEY)
            .map(|entry| Resolution::Matched(ResolvedAnswer::history(entry)))
    }

    fn membership(&self, input: &str) -> Option<Resolution> {
        if !contains_any(input, &MEMBERSHIP_CUES) {
            return None;
        }
        self.knowledge
            .get(CategoryKind::HomePage, MEMBERSHIP_KEY)
            .map(|entry| Resolution::Matched(ResolvedAnswer::described(entry)))
    }

    fn approximate(&self, input: &str, kind: CategoryKind, threshold: usize) -> Option<Resolution> {
        let found = best_match(input, candidates(&self.knowledge, kind));
        log_candidate(kind, found.as_ref(), threshold);
        found
            .and_then(|m| m.within(threshold))
            .map(|m| Resolution::Matched(ResolvedAnswer::described(m.entry)))
    }

    /// Home-page questions other than membership, which has its own keyword stage.
    /// The exclusion looks at the key as written in the knowledge file.
    fn home_page(&self, input: &str) -> Option<Resolution> {
        let threshold = self.thresholds.home;
        let pool = self
            .knowledge
            .category(CategoryKind::HomePage)
            .into_iter()
            .flat_map(|c| c.questions())
            .filter(|q| !q.raw.contains(MEMBERSHIP_KEY))
            .map(|q| Candidate::from_question(q, CategoryKind::HomePage));
        let found = best_match(input, pool);
        log_candidate(CategoryKind::HomePage, found.as_ref(), threshold);
        found
            .and_then(|m| m.within(threshold))
            .map(|m| Resolution::Matched(ResolvedAnswer::described(m.entry)))
    }

    /// Last stage: covering and biz questions compared together, covering scanned first.
    fn pooled(&self, input: &str) -> Option<Resolution> {
        let threshold = self.thresholds.pooled;
        let pool = candidates(&self.knowledge, CategoryKind::Covering)
            .chain(candidates(&self.knowledge, CategoryKind::Biz));
        let found = best_match(input, pool);
        log_candidate(CategoryKind::Covering, found.as_ref(), threshold);
        let Some(winner) = found.and_then(|m| m.within(threshold)) else {
            return Some(Resolution::Unmatched);
        };
        match winner.category {
            CategoryKind::Covering => Some(Resolution::Matched(ResolvedAnswer::covering(
                winner.entry,
                VideoEmbed::Pooled,
            ))),
            CategoryKind::Biz => Some(Resolution::Matched(ResolvedAnswer::biz(
                winner.entry,
                self.chooser.as_ref(),
            ))),
            _ => None,
        }
    }
}

fn prompt(text: &str) -> Resolution {
    Resolution::Matched(ResolvedAnswer::text_only(text))
}

fn size_prompt(input: &str) -> Option<Resolution> {
    contains_any(input, &SIZE_PROMPT_PHRASES).then(|| prompt(crate::compose::SIZE_PROMPT))
}

fn cover_replacement(input: &str) -> Option<Resolution> {
    let hit = input.contains(COVER) && input.contains(REPLACE) && contains_any(input, &REPLACE_USE_CUES);
    hit.then(|| prompt(crate::compose::COVER_REPLACEMENT_ANSWER))
}

/// Asks which product the covering question is about, unless the input already names one.
fn covering_prompt(ctx: &mut ConversationContext, input: &str) -> Option<Resolution> {
    let generic = input.contains(COVERING) && input.contains(METHOD) && mentioned_product(input).is_none();
    if !(generic || input == COVERING_REQUEST) {
        return None;
    }
    ctx.set_pending(PendingTopic::AwaitingCoveringType);
    Some(prompt(crate::compose::COVERING_PROMPT))
}

fn log_candidate(kind: CategoryKind, found: Option<&BestMatch<'_>>, threshold: usize) {
    if let Some(m) = found {
        tracing::trace!(
            target: "concierge::matcher",
            category = kind.json_key(),
            winner = m.category.json_key(),
            key = m.key,
            distance = m.distance,
            threshold,
            "Closest question"
        );
    }
}
