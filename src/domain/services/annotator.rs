// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::comment::CommentRecord;
use crate::domain::models::rating::{RatingResult, RatingSummary};
use crate::engines::traits::CommentDocument;
use crate::infrastructure::metrics as m;
use crate::utils::errors::AnalysisError;
use metrics::counter;
use tracing::debug;

/// 标注结果
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// 本次新写入的徽章数
    pub annotated: usize,
    /// 写入汇总区域的汇总
    pub summary: Option<RatingSummary>,
}

/// 把评分写回页面
///
/// 对每个尚未标注的 (记录, 结果) 先设置评分标记再追加徽章；已标注的记录
/// 跳过，因此重复调用不会产生重复徽章。汇总按本次结果集计算并整体替换
/// 页面上的汇总区域。
///
/// 长度不一致时视为契约错误，页面不做任何修改。
pub async fn annotate(
    document: &dyn CommentDocument,
    records: &mut [CommentRecord],
    results: &[RatingResult],
) -> Result<Annotation, AnalysisError> {
    if records.len() != results.len() {
        return Err(AnalysisError::ContractViolation(format!(
            "{} records but {} ratings",
            records.len(),
            results.len()
        )));
    }

    let mut annotated = 0;
    for (record, rating) in records.iter_mut().zip(results) {
        if record.rated {
            continue;
        }
        // The page marker is authoritative: the record may be a stale snapshot.
        if document.is_rated(record.handle).await? {
            record.rated = true;
            continue;
        }

        // Marker first: a failed marker write leaves no badge behind.
        document.mark_rated(record.handle).await?;
        document.append_badge(record.handle, rating).await?;
        record.rated = true;
        annotated += 1;
    }

    let summary = RatingSummary::from_results(results);
    if let Some(summary) = &summary {
        document.write_summary(summary).await?;
    }

    counter!(m::BADGES_TOTAL).increment(annotated as u64);
    debug!("Annotated {} of {} comments", annotated, records.len());

    Ok(Annotation { annotated, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::extractor::extract_comments;
    use crate::engines::memory_document::MemoryDocument;

    #[tokio::test]
    async fn test_badges_and_summary() {
        let doc = MemoryDocument::with_comments(["great video", "too fast"]);
        let mut records = extract_comments(&doc).await.unwrap();
        let results = vec![RatingResult::new(5.0, 2.0), RatingResult::new(3.0, 4.0)];

        let annotation = annotate(&doc, &mut records, &results).await.unwrap();

        assert_eq!(annotation.annotated, 2);
        assert_eq!(doc.badges(0), vec![RatingResult::new(5.0, 2.0)]);
        assert_eq!(doc.badges(1), vec![RatingResult::new(3.0, 4.0)]);

        let summary = doc.summary().unwrap();
        assert_eq!(summary.mean_quality, 4.0);
        assert_eq!(summary.mean_difficulty, 3.0);
        assert!(records.iter().all(|r| r.rated));
    }

    #[tokio::test]
    async fn test_second_call_is_a_noop() {
        let doc = MemoryDocument::with_comments(["great video", "too fast"]);
        let results = vec![RatingResult::new(5.0, 2.0), RatingResult::new(3.0, 4.0)];

        let mut records = extract_comments(&doc).await.unwrap();
        annotate(&doc, &mut records, &results).await.unwrap();
        let first_summary = doc.summary();

        // Same records again, and a fresh snapshot that only the page marker can guard.
        let again = annotate(&doc, &mut records, &results).await.unwrap();
        let mut fresh = extract_comments(&doc).await.unwrap();
        let fresh_again = annotate(&doc, &mut fresh, &results).await.unwrap();

        assert_eq!(again.annotated, 0);
        assert_eq!(fresh_again.annotated, 0);
        assert_eq!(doc.total_badges(), 2);
        assert_eq!(doc.summary(), first_summary);
    }

    #[tokio::test]
    async fn test_stale_record_is_guarded_by_page_marker() {
        let doc = MemoryDocument::with_comments(["a"]);
        let mut stale = vec![CommentRecord::new(crate::engines::traits::NodeHandle(0), "a")];
        doc.mark_rated(stale[0].handle).await.unwrap();

        let annotation = annotate(&doc, &mut stale, &[RatingResult::new(1.0, 1.0)])
            .await
            .unwrap();

        assert_eq!(annotation.annotated, 0);
        assert!(stale[0].rated);
        assert_eq!(doc.total_badges(), 0);
    }

    #[tokio::test]
    async fn test_length_mismatch_writes_nothing() {
        let doc = MemoryDocument::with_comments(["a", "b"]);
        let mut records = extract_comments(&doc).await.unwrap();

        let err = annotate(&doc, &mut records, &[RatingResult::new(5.0, 5.0)])
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::ContractViolation(_)));
        assert_eq!(doc.total_badges(), 0);
        assert!(doc.summary().is_none());
    }

    #[tokio::test]
    async fn test_summary_is_replaced_not_accumulated() {
        let doc = MemoryDocument::with_comments(["a"]);
        let mut first = extract_comments(&doc).await.unwrap();
        annotate(&doc, &mut first, &[RatingResult::new(1.0, 5.0)])
            .await
            .unwrap();

        doc.push_comments(["b"]);
        let mut second = vec![extract_comments(&doc).await.unwrap().remove(1)];
        annotate(&doc, &mut second, &[RatingResult::new(5.0, 1.0)])
            .await
            .unwrap();

        let summary = doc.summary().unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean_quality, 5.0);
        assert_eq!(doc.summary_writes(), 2);
    }

    #[tokio::test]
    async fn test_failed_marker_writes_no_badge() {
        let doc = MemoryDocument::with_comments(["a", "b"]);
        let mut records = extract_comments(&doc).await.unwrap();
        let results = vec![RatingResult::new(4.0, 2.0), RatingResult::new(3.0, 1.0)];

        doc.fail_next_mark();
        let err = annotate(&doc, &mut records, &results).await.unwrap_err();

        assert_eq!(err.kind(), "document");
        assert_eq!(doc.total_badges(), 0);
        assert!(!records[0].rated);
    }

    #[tokio::test]
    async fn test_reply_inserted_after_extraction_keeps_badges_aligned() {
        let doc = MemoryDocument::with_comments(["first", "second"]);
        let mut records = extract_comments(&doc).await.unwrap();
        doc.insert_comment(1, "reply");

        let results = vec![RatingResult::new(5.0, 1.0), RatingResult::new(2.0, 4.0)];
        let annotation = annotate(&doc, &mut records, &results).await.unwrap();

        assert_eq!(annotation.annotated, 2);
        assert_eq!(doc.badges(0), vec![RatingResult::new(5.0, 1.0)]);
        assert!(doc.badges(1).is_empty());
        assert_eq!(doc.badges(2), vec![RatingResult::new(2.0, 4.0)]);
    }
}
