//! Citation-count ranking of fetched papers.

use crate::semanticscholar::Paper;
use std::cmp::Reverse;
use tracing::debug;

/// Keep the `top_n` most cited papers.
///
/// The sort is stable, so papers with equal counts stay in fetch order.
/// A missing citation count ranks as zero.
pub fn rank_top(mut papers: Vec<Paper>, top_n: usize) -> Vec<Paper> {
    let missing = papers.iter().filter(|p| p.citation_count.is_none()).count();
    if missing > 0 {
        debug!(missing = missing, "Papers without citation count ranked as zero");
    }

    papers.sort_by_key(|p| Reverse(p.citations()));
    papers.truncate(top_n);
    papers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str, citations: Option<u64>) -> Paper {
        Paper {
            title: Some(title.to_string()),
            citation_count: citations,
            ..Default::default()
        }
    }

    fn titles(papers: &[Paper]) -> Vec<&str> {
        papers.iter().map(Paper::title).collect()
    }

    #[test]
    fn test_top_two_of_three() {
        let papers = vec![paper("a", Some(5)), paper("b", Some(50)), paper("c", Some(20))];
        let ranked = rank_top(papers, 2);
        assert_eq!(titles(&ranked), vec!["b", "c"]);
        assert_eq!(ranked.iter().map(Paper::citations).collect::<Vec<_>>(), vec![50, 20]);
    }

    #[test]
    fn test_ties_keep_fetch_order() {
        let papers = vec![
            paper("first", Some(10)),
            paper("top", Some(99)),
            paper("second", Some(10)),
            paper("third", Some(10)),
        ];
        let ranked = rank_top(papers, 10);
        assert_eq!(titles(&ranked), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_fewer_than_top_n() {
        let ranked = rank_top(vec![paper("only", Some(1))], 20);
        assert_eq!(ranked.len(), 1);
        assert!(rank_top(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_missing_count_ranks_last() {
        let papers = vec![paper("unknown", None), paper("zero", Some(0)), paper("one", Some(1))];
        let ranked = rank_top(papers, 3);
        assert_eq!(titles(&ranked), vec!["one", "unknown", "zero"]);
    }

    #[test]
    fn test_top_zero() {
        assert!(rank_top(vec![paper("a", Some(1))], 0).is_empty());
    }
}
