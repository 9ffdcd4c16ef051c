// Copyright 2019 Zhizhesihai (Beijing) Technology Limited.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::core::search::collector::Collector;
use crate::core::search::scorer::Scorer;
use crate::core::search::{SortVector, NO_MORE_DOCS};
use crate::core::util::DocId;
use crate::error::Result;

/// Drives a `Scorer` into a `Collector`, a window of doc ids at a time.
///
/// Before each `collect` the current doc's `SortVector` is copied into a
/// snapshot owned by the bulk scorer, so collectors never hold on to the
/// scorer's own vector across an advance.
pub struct BulkScorer<'a, S: Scorer + ?Sized + 'a> {
    scorer: &'a mut S,
    sorts: SortVector,
}

impl<'a, S: Scorer + ?Sized + 'a> BulkScorer<'a, S> {
    pub fn new(scorer: &'a mut S) -> BulkScorer<'a, S> {
        let sorts = scorer.sort_vector().clone();
        BulkScorer { scorer, sorts }
    }

    /// Scores and collects all matching documents.
    pub fn score_all<C: Collector + ?Sized>(&mut self, collector: &mut C) -> Result<()> {
        self.score_range(collector, NO_MORE_DOCS)?;
        Ok(())
    }

    /// Collects matching documents up to, but not including, `max`.
    ///
    /// Starts from the scorer's current position, advancing it first if it
    /// was never positioned. On return the scorer rests on the first doc
    /// that is `>= max`, which a later call with a higher bound picks up.
    ///
    /// Returns `true` if more matching documents may remain.
    pub fn score_range<C: Collector + ?Sized>(
        &mut self,
        collector: &mut C,
        max: DocId,
    ) -> Result<bool> {
        let mut doc = self.scorer.doc_id();
        if doc < 0 {
            doc = self.scorer.next()?;
        }

        while doc < max {
            self.sorts.copy_from(self.scorer.sort_vector());
            collector.collect(doc, &self.sorts, &mut *self.scorer)?;
            doc = self.scorer.next()?;
        }
        Ok(doc != NO_MORE_DOCS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::LeafReaderContext;

    use crate::core::search::tests::*;
    use crate::core::search::DocIterator;

    #[derive(Default)]
    struct RecordingCollector {
        hits: Vec<(DocId, Vec<i32>, f32)>,
    }

    impl Collector for RecordingCollector {
        fn needs_scores(&self) -> bool {
            true
        }

        fn set_next_reader(&mut self, _reader: &LeafReaderContext<'_>) -> Result<()> {
            Ok(())
        }

        fn collect<T: Scorer + ?Sized>(
            &mut self,
            doc: DocId,
            sorts: &SortVector,
            scorer: &mut T,
        ) -> Result<()> {
            assert_eq!(scorer.doc_id(), doc);
            let score = scorer.score()?;
            self.hits.push((doc, sorts.as_slice().to_vec(), score));
            Ok(())
        }
    }

    fn scorer() -> MockSortScorer<MockDocIterator> {
        create_mock_scorer(
            vec![1, 4, 6, 9],
            vec![vec![3, -1], vec![8, 2], vec![1, 1], vec![5, 7]],
        )
    }

    #[test]
    fn test_score_all() {
        let mut scorer = scorer();
        let mut collector = RecordingCollector::default();
        BulkScorer::new(&mut scorer)
            .score_all(&mut collector)
            .unwrap();

        assert_eq!(
            collector.hits,
            vec![
                (1, vec![3, -1], 1.0),
                (4, vec![8, 2], 4.0),
                (6, vec![1, 1], 6.0),
                (9, vec![5, 7], 9.0),
            ]
        );
    }

    #[test]
    fn test_score_range_pagination() {
        let mut paged_scorer = scorer();
        let mut collector = RecordingCollector::default();
        {
            let mut bulk = BulkScorer::new(&mut paged_scorer);
            assert!(bulk.score_range(&mut collector, 5).unwrap());
            let docs: Vec<DocId> = collector.hits.iter().map(|h| h.0).collect();
            assert_eq!(docs, vec![1, 4]);

            // an exhausted window neither collects nor loses the pending doc
            assert!(bulk.score_range(&mut collector, 5).unwrap());
            assert_eq!(collector.hits.len(), 2);

            assert!(!bulk.score_range(&mut collector, NO_MORE_DOCS).unwrap());
        }

        let mut paged = RecordingCollector::default();
        let mut whole = scorer();
        BulkScorer::new(&mut whole).score_all(&mut paged).unwrap();
        assert_eq!(collector.hits, paged.hits);
    }

    #[test]
    fn test_score_range_stops_at_bound() {
        let mut bounded = scorer();
        let mut collector = RecordingCollector::default();
        // a bound equal to a matching doc excludes it
        assert!(BulkScorer::new(&mut bounded)
            .score_range(&mut collector, 6)
            .unwrap());
        assert_eq!(collector.hits.len(), 2);
        assert_eq!(bounded.doc_id(), 6);
    }
}
