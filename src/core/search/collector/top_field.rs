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

use std::cmp::Ordering;
use std::f32;

use crate::core::index::LeafReaderContext;
use crate::core::search::collector::Collector;
use crate::core::search::scorer::{ScoreCache, Scorer};
use crate::core::search::sort_field::{FieldComparator, FieldComparatorEnum, Sort, SortField};
use crate::core::search::{FieldDoc, SortVector, TopFieldDocs};
use crate::core::util::DocId;
use crate::error::ErrorKind::IllegalArgument;
use crate::error::Result;

/// A retained hit: the comparator slot holding its sort values, and its
/// global doc id.
#[derive(Debug, Clone, Copy)]
pub struct FieldValueHit {
    pub slot: usize,
    pub doc: DocId,
    pub score: f32,
}

/// Bounded priority queue of hits ordered by a list of `FieldComparator`s.
///
/// The top of the queue is the weakest retained hit. Hits tied on every
/// comparator are ordered by doc id, the larger id being weaker.
pub struct FieldValueHitQueue {
    comparators: Vec<FieldComparatorEnum>,
    reverse: Vec<bool>,
    heap: Vec<FieldValueHit>,
    max_size: usize,
}

impl FieldValueHitQueue {
    pub fn new(fields: &[SortField], size: usize) -> Result<FieldValueHitQueue> {
        if fields.is_empty() {
            bail!(IllegalArgument(
                "Sort must contain at least one field".into()
            ));
        }
        let mut comparators = Vec::with_capacity(fields.len());
        for field in fields {
            comparators.push(field.get_comparator(size)?);
        }
        Ok(FieldValueHitQueue {
            comparators,
            reverse: fields.iter().map(SortField::is_reverse).collect(),
            heap: Vec::with_capacity(size),
            max_size: size,
        })
    }

    pub fn comparators(&self) -> &[FieldComparatorEnum] {
        &self.comparators
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.max_size
    }

    pub fn top(&self) -> Option<&FieldValueHit> {
        self.heap.first()
    }

    fn compare_slots(&self, i: usize, slot1: usize, slot2: usize) -> Ordering {
        let c = self.comparators[i].compare(slot1, slot2);
        if self.reverse[i] {
            c.reverse()
        } else {
            c
        }
    }

    /// Returns `true` if `a` ranks below `b`.
    pub fn less_than(&self, a: &FieldValueHit, b: &FieldValueHit) -> bool {
        debug_assert_ne!(a.slot, b.slot);
        for i in 0..self.comparators.len() {
            match self.compare_slots(i, a.slot, b.slot) {
                Ordering::Equal => {}
                c => return c == Ordering::Greater,
            }
        }
        // avoid random sort order that could lead to duplicates
        a.doc > b.doc
    }

    pub fn push(&mut self, hit: FieldValueHit) {
        debug_assert!(!self.is_full());
        self.heap.push(hit);
        let last = self.heap.len() - 1;
        self.up_heap(last);
    }

    pub fn pop(&mut self) -> Option<FieldValueHit> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.down_heap(0);
        }
        Some(top)
    }

    /// Replaces the top hit with a new doc stored in the same slot and
    /// restores the heap order. Returns the new weakest hit's slot.
    pub fn update_top(&mut self, doc: DocId, score: f32) -> Option<usize> {
        if self.heap.is_empty() {
            return None;
        }
        self.heap[0].doc = doc;
        self.heap[0].score = score;
        self.down_heap(0);
        self.top().map(|h| h.slot)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    fn up_heap(&mut self, mut i: usize) {
        let node = self.heap[i];
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.less_than(&node, &self.heap[parent]) {
                self.heap[i] = self.heap[parent];
                i = parent;
            } else {
                break;
            }
        }
        self.heap[i] = node;
    }

    fn down_heap(&mut self, mut i: usize) {
        let node = self.heap[i];
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less_than(&self.heap[right], &self.heap[left]) {
                right
            } else {
                left
            };
            if self.less_than(&self.heap[child], &node) {
                self.heap[i] = self.heap[child];
                i = child;
            } else {
                break;
            }
        }
        self.heap[i] = node;
    }
}

/// A `Collector` that sorts by `SortField`s and keeps the best `num_hits`.
///
/// Docs must be collected in increasing global doc id order: a hit tied
/// with the bottom on every sort field is rejected because the retained
/// one came first.
pub struct TopFieldCollector {
    fields: Vec<SortField>,
    queue: FieldValueHitQueue,
    num_hits: usize,
    total_hits: usize,
    doc_base: DocId,
    needs_scores: bool,
    track_doc_scores: bool,
    track_max_score: bool,
    max_score: f32,
    score_cache: ScoreCache,
}

impl TopFieldCollector {
    pub fn new(
        sort: &Sort,
        num_hits: usize,
        track_doc_scores: bool,
        track_max_score: bool,
    ) -> Result<TopFieldCollector> {
        if num_hits == 0 {
            bail!(IllegalArgument(
                "num_hits must be > 0; please use TotalHitCountCollector if you just need the \
                 total hit count"
                    .into()
            ));
        }
        Ok(TopFieldCollector {
            fields: sort.get_sort().to_vec(),
            queue: FieldValueHitQueue::new(sort.get_sort(), num_hits)?,
            num_hits,
            total_hits: 0,
            doc_base: 0,
            needs_scores: sort.needs_scores() || track_doc_scores || track_max_score,
            track_doc_scores,
            track_max_score,
            max_score: f32::NEG_INFINITY,
            score_cache: ScoreCache::default(),
        })
    }

    pub fn total_hits(&self) -> usize {
        self.total_hits
    }

    pub fn num_hits(&self) -> usize {
        self.num_hits
    }

    /// Returns all retained hits, best first. Drains the queue, so call it
    /// once, after collection.
    pub fn top_docs(&mut self) -> TopFieldDocs {
        let len = self.queue.len();
        self.top_docs_range(0, len)
    }

    /// Returns `how_many` hits of the ranking starting at `start`, best
    /// first. Drains the queue.
    pub fn top_docs_range(&mut self, start: usize, how_many: usize) -> TopFieldDocs {
        let size = self.queue.len();
        let how_many = if start < size {
            how_many.min(size - start)
        } else {
            0
        };

        // the weakest hits come out first
        for _ in 0..size.saturating_sub(start + how_many) {
            self.queue.pop();
        }
        let mut field_docs = Vec::with_capacity(how_many);
        for _ in 0..how_many {
            if let Some(hit) = self.queue.pop() {
                field_docs.push(self.field_doc(&hit));
            }
        }
        field_docs.reverse();
        self.queue.clear();

        let max_score = if self.track_max_score && self.total_hits > 0 {
            self.max_score
        } else {
            f32::NAN
        };
        TopFieldDocs::new(self.total_hits, field_docs, max_score, self.fields.clone())
    }

    fn field_doc(&self, hit: &FieldValueHit) -> FieldDoc {
        let fields = self
            .queue
            .comparators()
            .iter()
            .map(|c| c.value(hit.slot))
            .collect();
        let score = if self.track_doc_scores {
            hit.score
        } else {
            f32::NAN
        };
        FieldDoc::new(hit.doc, score, fields)
    }

    fn set_bottom(&mut self) -> Result<()> {
        if let Some(slot) = self.queue.top().map(|h| h.slot) {
            for c in &mut self.queue.comparators {
                c.set_bottom(slot)?;
            }
        }
        Ok(())
    }

    /// Returns `true` if `doc` beats the weakest retained hit.
    fn competes<S: Scorer + ?Sized>(&mut self, doc: DocId, scorer: &mut S) -> Result<bool> {
        let n = self.queue.comparators.len();
        for i in 0..n {
            let mut c = self.queue.comparators[i].compare_bottom(doc, scorer)?;
            if self.queue.reverse[i] {
                c = c.reverse();
            }
            match c {
                Ordering::Less => return Ok(false),
                Ordering::Greater => return Ok(true),
                Ordering::Equal => {}
            }
        }
        // tied on every field: the retained doc was collected first
        Ok(false)
    }
}

impl Collector for TopFieldCollector {
    fn needs_scores(&self) -> bool {
        self.needs_scores
    }

    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()> {
        debug!(
            "collecting segment {} from doc base {}",
            reader.ord, reader.doc_base
        );
        self.doc_base = reader.doc_base;
        self.score_cache.clear();
        for c in &mut self.queue.comparators {
            c.set_next_reader(reader)?;
        }
        Ok(())
    }

    fn collect<S: Scorer + ?Sized>(
        &mut self,
        doc: DocId,
        _sorts: &SortVector,
        scorer: &mut S,
    ) -> Result<()> {
        self.total_hits += 1;

        let score = if self.track_doc_scores || self.track_max_score {
            let score = self.score_cache.score(scorer)?;
            if score > self.max_score {
                self.max_score = score;
            }
            score
        } else {
            f32::NAN
        };

        if self.queue.is_full() {
            if !self.competes(doc, scorer)? {
                return Ok(());
            }
            // this hit is competitive - replace bottom element in queue
            let slot = match self.queue.top() {
                Some(hit) => hit.slot,
                None => return Ok(()),
            };
            for c in &mut self.queue.comparators {
                c.copy(slot, doc, scorer)?;
            }
            self.queue.update_top(self.doc_base + doc, score);
            self.set_bottom()
        } else {
            // startup transient: queue hasn't gathered num_hits yet
            let slot = self.queue.len();
            for c in &mut self.queue.comparators {
                c.copy(slot, doc, scorer)?;
            }
            self.queue.push(FieldValueHit {
                slot,
                doc: self.doc_base + doc,
                score,
            });
            if self.queue.is_full() {
                self.set_bottom()?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::MemoryFieldCache;
    use crate::core::search::scorer::BulkScorer;
    use crate::core::search::sort_field::SortFieldType;
    use crate::core::search::tests::*;
    use crate::core::util::VariantValue;

    fn collect_all(
        collector: &mut TopFieldCollector,
        docs: Vec<DocId>,
        sorts: Vec<Vec<i32>>,
    ) {
        let cache = MemoryFieldCache::new(100);
        let ctx = LeafReaderContext::new(0, 0, 100, &cache);
        collector.set_next_reader(&ctx).unwrap();
        let mut scorer = create_mock_scorer(docs, sorts);
        BulkScorer::new(&mut scorer).score_all(collector).unwrap();
    }

    fn embedded(field_number: usize, reverse: bool) -> SortField {
        SortField::new_embedded(format!("f{}", field_number), field_number, reverse)
    }

    #[test]
    fn test_embedded_ascending_with_ties() {
        let sort = Sort::new(vec![embedded(1, false)]);
        let mut collector = TopFieldCollector::new(&sort, 10, false, false).unwrap();
        collect_all(
            &mut collector,
            vec![0, 1, 2, 4],
            vec![vec![10, -1, 3], vec![5, -1, 7], vec![10, -1, 1], vec![7, -1, 9]],
        );

        let top_docs = collector.top_docs();
        assert_eq!(top_docs.total_hits(), 4);
        assert_eq!(top_docs.doc_ids(), vec![1, 4, 0, 2]);
        assert_eq!(top_docs.field_docs()[0].fields, vec![VariantValue::Int(5)]);
        assert!(top_docs.field_docs()[0].score.is_nan());
        assert!(top_docs.max_score().is_nan());
    }

    #[test]
    fn test_bounded_queue_replaces_bottom() {
        let sort = Sort::new(vec![embedded(1, false)]);
        let mut collector = TopFieldCollector::new(&sort, 2, false, false).unwrap();
        collect_all(
            &mut collector,
            vec![0, 1, 2, 3, 4, 5],
            vec![vec![9], vec![3], vec![8], vec![3], vec![1], vec![2]],
        );

        let top_docs = collector.top_docs();
        assert_eq!(top_docs.total_hits(), 6);
        assert_eq!(top_docs.doc_ids(), vec![4, 5]);
    }

    #[test]
    fn test_tie_keeps_earlier_doc() {
        let sort = Sort::new(vec![embedded(1, false)]);
        let mut collector = TopFieldCollector::new(&sort, 2, false, false).unwrap();
        collect_all(
            &mut collector,
            vec![0, 1, 2],
            vec![vec![4], vec![4], vec![4]],
        );
        assert_eq!(collector.top_docs().doc_ids(), vec![0, 1]);
    }

    #[test]
    fn test_reverse_and_secondary_key() {
        let sort = Sort::new(vec![embedded(1, true), embedded(2, false)]);
        let mut collector = TopFieldCollector::new(&sort, 3, false, false).unwrap();
        collect_all(
            &mut collector,
            vec![0, 1, 2, 3],
            vec![vec![1, 0], vec![7, 5], vec![7, 2], vec![3, 3]],
        );
        assert_eq!(collector.top_docs().doc_ids(), vec![2, 1, 3]);
    }

    #[test]
    fn test_relevance_with_scores() {
        let mut collector = TopFieldCollector::new(&Sort::relevance(), 2, true, true).unwrap();
        assert!(collector.needs_scores());
        collect_all(
            &mut collector,
            vec![3, 9, 5],
            vec![vec![0], vec![0], vec![0]],
        );

        let top_docs = collector.top_docs();
        assert_eq!(top_docs.doc_ids(), vec![9, 5]);
        assert_eq!(top_docs.max_score(), 9.0);
        assert_eq!(top_docs.field_docs()[0].score, 9.0);
        assert_eq!(
            top_docs.field_docs()[1].fields,
            vec![VariantValue::Float(5.0), VariantValue::Int(5)]
        );
    }

    #[test]
    fn test_across_segments() {
        let mut first = MemoryFieldCache::new(3);
        first.add_ints("price", vec![30, 10, 20]).unwrap();
        let mut second = MemoryFieldCache::new(2);
        second.add_ints("price", vec![15, 10]).unwrap();

        let sort = Sort::new(vec![SortField::new("price".into(), SortFieldType::Int, false)]);
        let mut collector = TopFieldCollector::new(&sort, 3, false, false).unwrap();

        collector
            .set_next_reader(&LeafReaderContext::new(0, 0, 3, &first))
            .unwrap();
        let mut scorer = create_mock_scorer(vec![0, 1, 2], vec![vec![0], vec![0], vec![0]]);
        BulkScorer::new(&mut scorer)
            .score_all(&mut collector)
            .unwrap();

        collector
            .set_next_reader(&LeafReaderContext::new(1, 3, 2, &second))
            .unwrap();
        let mut scorer = create_mock_scorer(vec![0, 1], vec![vec![0], vec![0]]);
        BulkScorer::new(&mut scorer)
            .score_all(&mut collector)
            .unwrap();

        let top_docs = collector.top_docs();
        assert_eq!(top_docs.total_hits(), 5);
        // the tie on 10 keeps the earlier segment's doc first
        assert_eq!(top_docs.doc_ids(), vec![1, 4, 3]);
    }

    #[test]
    fn test_reverse_string_sort_across_segments() {
        let strings = |values: &[&str]| -> Vec<Option<String>> {
            values.iter().map(|v| Some(v.to_string())).collect()
        };
        let mut first = MemoryFieldCache::new(3);
        first.add_strings("title", strings(&["m", "c", "x"])).unwrap();
        let mut second = MemoryFieldCache::new(3);
        second.add_strings("title", strings(&["a", "n", "z"])).unwrap();

        let sort = Sort::new(vec![SortField::new(
            "title".into(),
            SortFieldType::String,
            true,
        )]);
        let mut collector = TopFieldCollector::new(&sort, 2, false, false).unwrap();
        for (ord, doc_base, cache) in vec![(0, 0, &first), (1, 3, &second)] {
            collector
                .set_next_reader(&LeafReaderContext::new(ord, doc_base, 3, cache))
                .unwrap();
            let mut scorer = create_mock_scorer(vec![0, 1, 2], vec![vec![0], vec![0], vec![0]]);
            BulkScorer::new(&mut scorer)
                .score_all(&mut collector)
                .unwrap();
        }

        let top_docs = collector.top_docs();
        assert_eq!(top_docs.doc_ids(), vec![5, 2]);
        assert_eq!(
            top_docs.field_docs()[1].fields,
            vec![VariantValue::VString("x".into())]
        );
    }

    #[test]
    fn test_top_docs_range() {
        let sort = Sort::new(vec![embedded(1, false)]);
        let mut collector = TopFieldCollector::new(&sort, 5, false, false).unwrap();
        collect_all(
            &mut collector,
            vec![0, 1, 2, 3, 4],
            vec![vec![50], vec![10], vec![40], vec![20], vec![30]],
        );
        assert_eq!(collector.top_docs_range(1, 2).doc_ids(), vec![3, 4]);

        let mut collector = TopFieldCollector::new(&sort, 5, false, false).unwrap();
        collect_all(&mut collector, vec![0, 1], vec![vec![2], vec![1]]);
        assert!(collector.top_docs_range(2, 3).field_docs().is_empty());
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(TopFieldCollector::new(&Sort::relevance(), 0, false, false).is_err());
        assert!(TopFieldCollector::new(&Sort::new(vec![]), 1, false, false).is_err());
    }
}
