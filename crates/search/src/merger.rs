//! Cross-class merge and pagination
//!
//! Unions the per-class candidate sets, orders them with the same total
//! order the fuser uses, and cuts out one page. Also decides the reported
//! retrieval method.

use crate::aggregator::ClassOutcome;
use crate::fuser::compare_candidates;
use rankfuse_core::{ContentClass, DocumentId, RankedCandidate, SearchMethod};
use std::collections::HashSet;

/// One page of the global ranking
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPage {
    /// Candidates on this page, in rank order
    pub items: Vec<RankedCandidate>,
    /// Candidates entering the merge, summed over classes
    pub total: usize,
    /// Page served (1-based)
    pub page: u32,
    /// Page size
    pub per_page: u32,
    /// Whether candidates remain after this page
    pub has_more: bool,
    /// Retrieval mode that contributed
    pub method: SearchMethod,
}

/// Stateless merger of per-class results
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossClassMerger;

impl CrossClassMerger {
    /// Merge class outcomes and select `page` (1-based) of size `per_page`
    pub fn merge(&self, outcomes: Vec<ClassOutcome>, page: u32, per_page: u32) -> MergedPage {
        let method = Self::method(&outcomes);
        let candidates = outcomes.into_iter().flat_map(|o| o.candidates).collect();
        let (items, total, has_more) = self.paginate(candidates, page, per_page);
        MergedPage {
            items,
            total,
            page,
            per_page,
            has_more,
            method,
        }
    }

    /// `hybrid` iff at least one class ran its semantic branch
    pub fn method(outcomes: &[ClassOutcome]) -> SearchMethod {
        if outcomes.iter().any(|o| o.semantic.was_invoked()) {
            SearchMethod::Hybrid
        } else {
            SearchMethod::Fulltext
        }
    }

    /// Sort globally, drop repeated (id, class) pairs and window
    ///
    /// Returns (page items, total, has_more).
    pub fn paginate(
        &self,
        mut candidates: Vec<RankedCandidate>,
        page: u32,
        per_page: u32,
    ) -> (Vec<RankedCandidate>, usize, bool) {
        candidates.sort_by(compare_candidates);
        let mut seen: HashSet<(ContentClass, DocumentId)> = HashSet::new();
        candidates.retain(|c| seen.insert((c.class, c.document_id.clone())));

        let total = candidates.len();
        let page = u64::from(page.max(1));
        let per_page = u64::from(per_page);
        let offset = ((page - 1) * per_page).min(total as u64) as usize;
        let items: Vec<RankedCandidate> = candidates
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect();
        let has_more = page * per_page < total as u64;
        (items, total, has_more)
    }
}
