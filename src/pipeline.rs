use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::conversation::Message;
use crate::scoring::{Analyzer, ScoreBreakdown};
use crate::store::{StoreError, StoredAnalysis};

/// Provides transcripts in conversation order.
pub trait TranscriptSource {
    fn conversation_ids(&self) -> Vec<u64>;
    fn transcript(&self, id: u64) -> Result<Vec<Message>, StoreError>;
}

/// Persists analyses. `upsert` replaces any earlier analysis of the same
/// conversation as a whole.
pub trait AnalysisSink {
    fn upsert(&mut self, analysis: StoredAnalysis) -> Result<()>;
}

/// Analyze one conversation and persist the result.
///
/// Fails with `StoreError::NotFound` before any scoring if the conversation
/// doesn't exist.
pub fn analyze_conversation<S>(
    store: &mut S,
    analyzer: &Analyzer,
    id: u64,
    now: DateTime<Utc>,
) -> Result<StoredAnalysis>
where
    S: TranscriptSource + AnalysisSink,
{
    analyze_conversation_detailed(store, analyzer, id, now).map(|(analysis, _)| analysis)
}

/// Same as [`analyze_conversation`], also returning the score breakdown.
/// Only the analysis is persisted.
pub fn analyze_conversation_detailed<S>(
    store: &mut S,
    analyzer: &Analyzer,
    id: u64,
    now: DateTime<Utc>,
) -> Result<(StoredAnalysis, ScoreBreakdown)>
where
    S: TranscriptSource + AnalysisSink,
{
    let messages = store.transcript(id)?;
    let detailed = analyzer.analyze_detailed(&messages);
    let analysis = StoredAnalysis {
        conversation_id: id,
        created_at: now,
        result: detailed.result,
    };
    store.upsert(analysis.clone())?;
    Ok((analysis, detailed.breakdown))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: Vec<(u64, String)>,
}

/// Analyze every known conversation. Individual failures are logged and
/// collected; the batch always runs to the end.
pub fn run_batch<S>(store: &mut S, analyzer: &Analyzer, now: DateTime<Utc>) -> BatchSummary
where
    S: TranscriptSource + AnalysisSink,
{
    let mut ids = store.conversation_ids();
    ids.sort_unstable();

    let mut summary = BatchSummary::default();
    for id in ids {
        match analyze_conversation(store, analyzer, id, now) {
            Ok(_) => summary.processed += 1,
            Err(e) => {
                warn!(id, error = %e, "analysis failed");
                summary.failed.push((id, e.to_string()));
            }
        }
    }

    info!(
        processed = summary.processed,
        failed = summary.failed.len(),
        "batch analysis finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{AnalysisConfig, FixedSentiment};
    use std::collections::{BTreeMap, HashSet};

    /// In-memory store whose sink can be told to reject certain ids.
    #[derive(Default)]
    struct MemoryStore {
        transcripts: BTreeMap<u64, Vec<Message>>,
        analyses: BTreeMap<u64, StoredAnalysis>,
        reject: HashSet<u64>,
    }

    impl TranscriptSource for MemoryStore {
        fn conversation_ids(&self) -> Vec<u64> {
            // Deliberately unordered
            self.transcripts.keys().rev().copied().collect()
        }

        fn transcript(&self, id: u64) -> Result<Vec<Message>, StoreError> {
            self.transcripts
                .get(&id)
                .cloned()
                .ok_or(StoreError::NotFound(id))
        }
    }

    impl AnalysisSink for MemoryStore {
        fn upsert(&mut self, analysis: StoredAnalysis) -> Result<()> {
            if self.reject.contains(&analysis.conversation_id) {
                anyhow::bail!("disk full");
            }
            self.analyses.insert(analysis.conversation_id, analysis);
            Ok(())
        }
    }

    fn analyzer() -> Analyzer {
        Analyzer::new(AnalysisConfig::default(), Box::new(FixedSentiment(0.0))).unwrap()
    }

    fn store_with(ids: &[u64]) -> MemoryStore {
        let mut store = MemoryStore::default();
        for &id in ids {
            store
                .transcripts
                .insert(id, vec![Message::user("hi"), Message::ai("hello, done")]);
        }
        store
    }

    #[test]
    fn test_analyze_conversation_persists() {
        let mut store = store_with(&[1]);
        let now = Utc::now();
        let analysis = analyze_conversation(&mut store, &analyzer(), 1, now).unwrap();
        assert_eq!(analysis.conversation_id, 1);
        assert_eq!(analysis.created_at, now);
        assert!(analysis.result.resolution);
        assert_eq!(store.analyses[&1], analysis);
    }

    #[test]
    fn test_analyze_conversation_not_found() {
        let mut store = store_with(&[]);
        let err = analyze_conversation(&mut store, &analyzer(), 9, Utc::now()).unwrap_err();
        assert_eq!(err.downcast_ref::<StoreError>(), Some(&StoreError::NotFound(9)));
        assert!(store.analyses.is_empty());
    }

    #[test]
    fn test_analyze_conversation_detailed_returns_breakdown() {
        let mut store = store_with(&[1]);
        let (analysis, breakdown) =
            analyze_conversation_detailed(&mut store, &analyzer(), 1, Utc::now()).unwrap();
        assert_eq!(store.analyses[&1], analysis);
        assert_eq!(breakdown.factors.len(), 6);
        let total: f64 = breakdown.factors.iter().map(|f| f.contribution).sum();
        assert_eq!(
            crate::scoring::text::round_to(total, 3),
            analysis.result.overall_score
        );
    }

    #[test]
    fn test_recompute_replaces_result() {
        let mut store = store_with(&[1]);
        let analyzer = analyzer();
        analyze_conversation(&mut store, &analyzer, 1, Utc::now()).unwrap();
        store.transcripts.insert(1, vec![Message::ai("I have no idea")]);
        let second = analyze_conversation(&mut store, &analyzer, 1, Utc::now()).unwrap();
        assert_eq!(store.analyses.len(), 1);
        assert_eq!(store.analyses[&1].result.fallback_count, 1);
        assert_eq!(store.analyses[&1], second);
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let mut store = store_with(&[1, 2, 3]);
        store.reject.insert(2);
        let summary = run_batch(&mut store, &analyzer(), Utc::now());
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, vec![(2, "disk full".to_string())]);
        let stored: Vec<u64> = store.analyses.keys().copied().collect();
        assert_eq!(stored, vec![1, 3]);
    }

    #[test]
    fn test_batch_empty_store() {
        let mut store = store_with(&[]);
        assert_eq!(run_batch(&mut store, &analyzer(), Utc::now()), BatchSummary::default());
    }
}
