//! Reciprocal Rank Fusion for one content class
//!
//! This module provides:
//! - Fuser trait for pluggable per-class fusion
//! - RankFuser: weighted RRF over the union of the lexical and semantic lists
//! - compare_candidates: the single ordering used everywhere candidates are sorted

use rankfuse_core::{ContentClass, DocumentId, FusionParams, RankedCandidate};
use std::cmp::Ordering;
use std::collections::HashMap;

// ============================================================================
// Fuser Trait
// ============================================================================

/// Pluggable fusion interface
///
/// A fuser combines the two ranked id lists of one class into scored
/// candidates, sorted by [`compare_candidates`] and truncated to
/// `params.match_count`.
pub trait Fuser: Send + Sync {
    /// Fuse one class's lexical and semantic lists
    fn fuse(
        &self,
        class: ContentClass,
        lexical: &[DocumentId],
        semantic: &[DocumentId],
        params: &FusionParams,
    ) -> Vec<RankedCandidate>;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

// ============================================================================
// Ordering
// ============================================================================

/// Present ranks sort before absent ones; smaller ranks first
fn cmp_rank(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Total order on candidates
///
/// 1. fused score descending
/// 2. lexical rank ascending, present before absent
/// 3. document id ascending
/// 4. class in enum order (post < answer < approach)
pub fn compare_candidates(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.fused_score
        .total_cmp(&a.fused_score)
        .then_with(|| cmp_rank(a.lexical_rank, b.lexical_rank))
        .then_with(|| a.document_id.cmp(&b.document_id))
        .then_with(|| a.class.cmp(&b.class))
}

/// One RRF term: `weight / (k + rank)`
pub fn rrf_term(weight: f64, rrf_k: u32, rank: u32) -> f64 {
    weight / (f64::from(rrf_k) + f64::from(rank))
}

// ============================================================================
// RankFuser
// ============================================================================

/// Weighted Reciprocal Rank Fusion
///
/// ```text
/// fused(d) = fts_weight / (rrf_k + lexical_rank(d))    if d is in the lexical list
///          + vec_weight / (rrf_k + semantic_rank(d))   if d is in the semantic list
/// ```
///
/// The candidate set is the union of both lists, so a document found by
/// only one branch still competes on that branch's term alone. Ranks are
/// 1-based list positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankFuser;

impl RankFuser {
    /// Create a new fuser
    pub fn new() -> Self {
        RankFuser
    }
}

impl Fuser for RankFuser {
    fn fuse(
        &self,
        class: ContentClass,
        lexical: &[DocumentId],
        semantic: &[DocumentId],
        params: &FusionParams,
    ) -> Vec<RankedCandidate> {
        // id -> (lexical_rank, semantic_rank); first occurrence wins
        let mut ranks: HashMap<&DocumentId, (Option<u32>, Option<u32>)> =
            HashMap::with_capacity(lexical.len() + semantic.len());

        for (i, id) in lexical.iter().enumerate() {
            ranks.entry(id).or_default().0.get_or_insert(i as u32 + 1);
        }
        for (i, id) in semantic.iter().enumerate() {
            ranks.entry(id).or_default().1.get_or_insert(i as u32 + 1);
        }

        let weights = params.weights;
        let mut candidates: Vec<RankedCandidate> = ranks
            .into_iter()
            .map(|(id, (lexical_rank, semantic_rank))| {
                let lex = lexical_rank
                    .map(|r| rrf_term(weights.fts_weight, params.rrf_k, r))
                    .unwrap_or(0.0);
                let sem = semantic_rank
                    .map(|r| rrf_term(weights.vec_weight, params.rrf_k, r))
                    .unwrap_or(0.0);
                RankedCandidate {
                    document_id: id.clone(),
                    class,
                    lexical_rank,
                    semantic_rank,
                    fused_score: lex + sem,
                }
            })
            .collect();

        candidates.sort_by(compare_candidates);
        candidates.truncate(params.match_count);
        candidates
    }

    fn name(&self) -> &str {
        "rrf"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rankfuse_core::FusionWeights;
    use std::collections::HashSet;

    fn ids(v: &[&str]) -> Vec<DocumentId> {
        v.iter().map(|s| DocumentId::from(*s)).collect()
    }

    fn params(rrf_k: u32, fts: f64, vec: f64, match_count: usize) -> FusionParams {
        FusionParams {
            weights: FusionWeights::new(fts, vec),
            rrf_k,
            match_count,
        }
    }

    fn find<'a>(out: &'a [RankedCandidate], id: &str) -> &'a RankedCandidate {
        out.iter()
            .find(|c| c.document_id.as_str() == id)
            .unwrap_or_else(|| panic!("{} missing from fused output", id))
    }

    // ========================================
    // Formula
    // ========================================

    #[test]
    fn test_two_branch_score() {
        let out = RankFuser.fuse(
            ContentClass::Post,
            &ids(&["a", "b"]),
            &ids(&["x", "y", "a"]),
            &params(60, 1.0, 1.0, 20),
        );
        let a = find(&out, "a");
        assert_eq!(a.lexical_rank, Some(1));
        assert_eq!(a.semantic_rank, Some(3));
        assert!((a.fused_score - (1.0 / 61.0 + 1.0 / 63.0)).abs() < 1e-12);
        assert!((a.fused_score - 0.032259).abs() < 1e-6);

        let b = find(&out, "b");
        assert_eq!(b.semantic_rank, None);
        assert!((b.fused_score - 1.0 / 62.0).abs() < 1e-12);

        assert_eq!(out[0].document_id.as_str(), "a");
    }

    #[test]
    fn test_weights_scale_terms() {
        let out = RankFuser.fuse(
            ContentClass::Answer,
            &ids(&["a"]),
            &ids(&["a"]),
            &params(10, 2.0, 0.5, 20),
        );
        assert!((out[0].fused_score - (2.0 / 11.0 + 0.5 / 11.0)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_semantic_degrades_to_lexical() {
        let out = RankFuser.fuse(
            ContentClass::Approach,
            &ids(&["c", "a", "b"]),
            &[],
            &params(60, 1.0, 1.0, 20),
        );
        let order: Vec<&str> = out.iter().map(|c| c.document_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        for (i, c) in out.iter().enumerate() {
            assert!((c.fused_score - 1.0 / (60.0 + (i as f64 + 1.0))).abs() < 1e-12);
        }
    }

    #[test]
    fn test_both_empty() {
        let out = RankFuser.fuse(ContentClass::Post, &[], &[], &FusionParams::default());
        assert!(out.is_empty());
    }

    // ========================================
    // Tie-breaks
    // ========================================

    #[test]
    fn test_tie_prefers_present_lexical_rank() {
        // b: lexical 2 only; y: semantic 2 only. Same score.
        let out = RankFuser.fuse(
            ContentClass::Post,
            &ids(&["a", "b"]),
            &ids(&["x", "y"]),
            &params(60, 1.0, 1.0, 20),
        );
        let order: Vec<&str> = out.iter().map(|c| c.document_id.as_str()).collect();
        assert_eq!(order, vec!["a", "x", "b", "y"]);
    }

    #[test]
    fn test_tie_falls_back_to_id() {
        let out = RankFuser.fuse(
            ContentClass::Post,
            &[],
            &ids(&["m"]),
            &params(60, 1.0, 1.0, 20),
        );
        let other = RankFuser.fuse(
            ContentClass::Post,
            &[],
            &ids(&["k"]),
            &params(60, 1.0, 1.0, 20),
        );
        let mut merged = vec![out[0].clone(), other[0].clone()];
        merged.sort_by(compare_candidates);
        assert_eq!(merged[0].document_id.as_str(), "k");
    }

    #[test]
    fn test_truncates_to_match_count() {
        let out = RankFuser.fuse(
            ContentClass::Post,
            &ids(&["a", "b", "c"]),
            &ids(&["d", "e"]),
            &params(60, 1.0, 1.0, 2),
        );
        assert_eq!(out.len(), 2);
        let order: Vec<&str> = out.iter().map(|c| c.document_id.as_str()).collect();
        assert_eq!(order, vec!["a", "d"]);
    }

    #[test]
    fn test_fuser_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RankFuser>();
        assert_eq!(RankFuser.name(), "rrf");
    }

    // ========================================
    // Properties
    // ========================================

    fn ranked_list() -> impl Strategy<Value = Vec<DocumentId>> {
        proptest::collection::btree_set(0u8..40, 0..25)
            .prop_map(|set| set.into_iter().collect::<Vec<u8>>())
            .prop_shuffle()
            .prop_map(|nums| {
                nums.into_iter()
                    .map(|n| DocumentId::new(format!("d{:02}", n)))
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn prop_scores_follow_formula(
            lexical in ranked_list(),
            semantic in ranked_list(),
            rrf_k in 1u32..200,
            fts in 0.1f64..5.0,
            vec in 0.1f64..5.0,
        ) {
            let p = params(rrf_k, fts, vec, 100);
            let out = RankFuser.fuse(ContentClass::Post, &lexical, &semantic, &p);
            for c in &out {
                prop_assert!(c.lexical_rank.is_some() || c.semantic_rank.is_some());
                let k = rrf_k as f64;
                let expected = c.lexical_rank.map(|r| fts / (k + r as f64)).unwrap_or(0.0)
                    + c.semantic_rank.map(|r| vec / (k + r as f64)).unwrap_or(0.0);
                prop_assert!((c.fused_score - expected).abs() < 1e-12);
                prop_assert!(c.fused_score > 0.0);
            }
        }

        #[test]
        fn prop_output_is_union_without_duplicates(
            lexical in ranked_list(),
            semantic in ranked_list(),
        ) {
            let p = params(60, 1.0, 1.0, 100);
            let out = RankFuser.fuse(ContentClass::Answer, &lexical, &semantic, &p);
            let union: HashSet<&DocumentId> = lexical.iter().chain(semantic.iter()).collect();
            let seen: HashSet<&DocumentId> = out.iter().map(|c| &c.document_id).collect();
            prop_assert_eq!(seen.len(), out.len());
            prop_assert_eq!(seen, union);
        }

        #[test]
        fn prop_sorted_and_truncated(
            lexical in ranked_list(),
            semantic in ranked_list(),
            match_count in 1usize..30,
        ) {
            let p = params(60, 1.0, 1.0, match_count);
            let out = RankFuser.fuse(ContentClass::Approach, &lexical, &semantic, &p);
            prop_assert!(out.len() <= match_count);
            for pair in out.windows(2) {
                prop_assert_eq!(compare_candidates(&pair[0], &pair[1]), Ordering::Less);
            }
        }

        #[test]
        fn prop_deterministic(lexical in ranked_list(), semantic in ranked_list()) {
            let p = FusionParams::default();
            let a = RankFuser.fuse(ContentClass::Post, &lexical, &semantic, &p);
            let b = RankFuser.fuse(ContentClass::Post, &lexical, &semantic, &p);
            prop_assert_eq!(a, b);
        }
    }
}
