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

mod top_field;

pub use self::top_field::*;

use crate::core::index::LeafReaderContext;
use crate::core::search::scorer::Scorer;
use crate::core::search::SortVector;
use crate::core::util::DocId;
use crate::error::Result;

error_chain! {
    types {
        Error, ErrorKind, ResultExt;
    }
    errors {
        LeafCollectionTerminated {
            description("Leaf collection terminated")
        }
        CollectionTerminated {
            description("Collection terminated")
        }
    }
}

/// Expert: Collectors are primarily meant to be used to
/// gather raw results from a search, and implement sorting
/// or custom result filtering, collation, etc.
///
/// Every admitted document is handed over together with a snapshot of its
/// `SortVector`; the snapshot is owned by the caller and stays valid for
/// the duration of `collect`, so a collector that wants to keep keys must
/// copy them out. The scorer is positioned on `doc`, which allows lazy
/// score computation and embedded key lookups.
///
/// *NOTE:* The doc that is passed to the collect method is relative to
/// the current reader. If your collector needs to resolve this to the
/// docID space of the whole index, you must re-base it by recording the
/// doc_base from the most recent `set_next_reader` call.
pub trait Collector {
    /// Indicates if document scores are needed by this collector.
    /// return `true` if scores are needed.
    fn needs_scores(&self) -> bool;

    /// This method is called before collecting on a new leaf.
    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()>;

    /// Called once for every document matching a query, with the unbased
    /// document number, in increasing doc id order.
    ///
    /// Note: The collection of the current segment can be terminated by
    /// returning `ErrorKind::LeafCollectionTerminated`; the searcher then
    /// continues with the next leaf. `ErrorKind::CollectionTerminated`
    /// stops the whole pass.
    fn collect<S: Scorer + ?Sized>(
        &mut self,
        doc: DocId,
        sorts: &SortVector,
        scorer: &mut S,
    ) -> Result<()>;
}

impl<'a, T: Collector + 'a> Collector for &'a mut T {
    fn needs_scores(&self) -> bool {
        (**self).needs_scores()
    }

    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()> {
        (**self).set_next_reader(reader)
    }

    fn collect<S: Scorer + ?Sized>(
        &mut self,
        doc: DocId,
        sorts: &SortVector,
        scorer: &mut S,
    ) -> Result<()> {
        (**self).collect(doc, sorts, scorer)
    }
}

/// Single-score collection callback, the form used before collectors
/// received sort vectors.
pub trait HitCollector {
    fn collect(&mut self, doc: DocId, score: f32) -> Result<()>;
}

impl<F: FnMut(DocId, f32) -> Result<()>> HitCollector for F {
    fn collect(&mut self, doc: DocId, score: f32) -> Result<()> {
        self(doc, score)
    }
}

/// Adapts a `HitCollector` to the `Collector` protocol, rebasing doc ids
/// and discarding the sort vector.
pub struct HitCollectorWrapper<H: HitCollector> {
    collector: H,
    doc_base: DocId,
}

impl<H: HitCollector> HitCollectorWrapper<H> {
    pub fn new(collector: H) -> Self {
        HitCollectorWrapper {
            collector,
            doc_base: 0,
        }
    }

    pub fn into_inner(self) -> H {
        self.collector
    }
}

impl<H: HitCollector> Collector for HitCollectorWrapper<H> {
    fn needs_scores(&self) -> bool {
        true
    }

    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()> {
        self.doc_base = reader.doc_base;
        Ok(())
    }

    fn collect<S: Scorer + ?Sized>(
        &mut self,
        doc: DocId,
        _sorts: &SortVector,
        scorer: &mut S,
    ) -> Result<()> {
        let score = scorer.score()?;
        self.collector.collect(doc + self.doc_base, score)
    }
}

/// Just counts the total number of hits.
#[derive(Default)]
pub struct TotalHitCountCollector {
    total_hits: usize,
}

impl TotalHitCountCollector {
    pub fn total_hits(&self) -> usize {
        self.total_hits
    }
}

impl Collector for TotalHitCountCollector {
    fn needs_scores(&self) -> bool {
        false
    }

    fn set_next_reader(&mut self, _reader: &LeafReaderContext<'_>) -> Result<()> {
        Ok(())
    }

    fn collect<S: Scorer + ?Sized>(
        &mut self,
        _doc: DocId,
        _sorts: &SortVector,
        _scorer: &mut S,
    ) -> Result<()> {
        self.total_hits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::MemoryFieldCache;
    use crate::core::search::scorer::BulkScorer;
    use crate::core::search::tests::*;

    #[test]
    fn test_hit_collector_wrapper() {
        let cache = MemoryFieldCache::new(10);
        let ctx = LeafReaderContext::new(1, 100, 10, &cache);

        let mut hits = Vec::new();
        {
            let mut wrapper = HitCollectorWrapper::new(|doc: DocId, score: f32| -> Result<()> {
                hits.push((doc, score));
                Ok(())
            });
            wrapper.set_next_reader(&ctx).unwrap();

            let mut scorer = create_mock_scorer(vec![1, 3], vec![vec![9], vec![8]]);
            BulkScorer::new(&mut scorer).score_all(&mut wrapper).unwrap();
        }

        assert_eq!(hits, vec![(101, 1.0), (103, 3.0)]);
    }

    #[test]
    fn test_total_hit_count() {
        let mut collector = TotalHitCountCollector::default();
        let mut scorer = create_mock_scorer(vec![0, 2, 4], vec![vec![1], vec![2], vec![3]]);
        BulkScorer::new(&mut scorer)
            .score_all(&mut collector)
            .unwrap();
        assert_eq!(collector.total_hits(), 3);
    }
}
