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

use crate::core::index::LeafReaderContext;
use crate::core::search::collector::{self, Collector, TopFieldCollector};
use crate::core::search::filter::EmbeddedFieldFilter;
use crate::core::search::scorer::{BulkScorer, FilteredScorer, Scorer};
use crate::core::search::sort_field::Sort;
use crate::core::search::{EmbeddedSortConfig, TopFieldDocs};
use crate::error::ErrorKind::IllegalArgument;
use crate::error::{Error, ErrorKind, Result};

/// Runs collection passes over the segments of an index whose documents
/// carry embedded sort vectors.
///
/// A pass visits the segments in order. For each one the collector is
/// told about the segment with `Collector::set_next_reader`, then every
/// document of the segment's scorer admitted by the optional filter is
/// collected in increasing doc id order.
///
/// The searcher holds no per-pass state and may be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedSortSearcher {
    config: EmbeddedSortConfig,
}

impl EmbeddedSortSearcher {
    pub fn new(config: EmbeddedSortConfig) -> EmbeddedSortSearcher {
        EmbeddedSortSearcher { config }
    }

    pub fn config(&self) -> &EmbeddedSortConfig {
        &self.config
    }

    /// Lower-level search API.
    ///
    /// `Collector::collect` is called for every admitted document. An empty
    /// filter is skipped entirely.
    pub fn search<'a, S, I, C>(
        &self,
        segments: I,
        filter: Option<&dyn EmbeddedFieldFilter>,
        collector: &mut C,
    ) -> Result<()>
    where
        S: Scorer,
        I: IntoIterator<Item = (LeafReaderContext<'a>, S)>,
        C: Collector + ?Sized,
    {
        let filter = filter.filter(|f| !f.is_empty_filter());

        for (reader, mut scorer) in segments {
            let num_sort = scorer.sort_vector().len();
            if num_sort != self.config.num_sort {
                bail!(IllegalArgument(format!(
                    "segment {} carries {} sort keys per doc, expected {}",
                    reader.ord, num_sort, self.config.num_sort
                )));
            }

            collector.set_next_reader(&reader)?;

            let result = match filter {
                Some(f) => {
                    let mut filtered = FilteredScorer::new(scorer, f)?;
                    BulkScorer::new(&mut filtered).score_all(collector)
                }
                None => BulkScorer::new(&mut scorer).score_all(collector),
            };
            match result {
                Err(Error(ErrorKind::Collector(collector::ErrorKind::CollectionTerminated), _)) => {
                    // Collection was terminated prematurely
                    debug!("collection terminated in segment {}", reader.ord);
                    break;
                }
                Err(Error(
                    ErrorKind::Collector(collector::ErrorKind::LeafCollectionTerminated),
                    _,
                ))
                | Ok(_) => {
                    // Leaf collection was terminated prematurely,
                    // continue with the following leaf
                }
                Err(e) => {
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Collects the `num_hits` best documents under `sort`.
    pub fn search_top<'a, S, I>(
        &self,
        segments: I,
        filter: Option<&dyn EmbeddedFieldFilter>,
        sort: &Sort,
        num_hits: usize,
        track_scores: bool,
    ) -> Result<TopFieldDocs>
    where
        S: Scorer,
        I: IntoIterator<Item = (LeafReaderContext<'a>, S)>,
    {
        sort.check_field_numbers(&self.config)?;
        let mut collector = TopFieldCollector::new(sort, num_hits, track_scores, track_scores)?;
        self.search(segments, filter, &mut collector)?;
        Ok(collector.top_docs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::{leaves, FieldCache, MemoryFieldCache};
    use crate::core::search::filter::{MultiFieldsFilter, RangeFieldFilter, TermFieldFilter};
    use crate::core::search::scorer::{EmbeddedDoc, VectorScorer};
    use crate::core::search::sort_field::SortField;
    use crate::core::search::SortVector;
    use crate::core::util::{DocId, VariantValue};

    fn config() -> EmbeddedSortConfig {
        EmbeddedSortConfig::with_num_sort(3)
    }

    fn five_docs() -> Vec<EmbeddedDoc> {
        vec![
            EmbeddedDoc::new(0, 1.0, vec![10, -1, 3]),
            EmbeddedDoc::new(1, 1.0, vec![5, -1, 7]),
            EmbeddedDoc::new(2, 1.0, vec![10, -1, 1]),
            EmbeddedDoc::new(3, 1.0, vec![-1, -1, -1]),
            EmbeddedDoc::new(4, 1.0, vec![7, -1, 9]),
        ]
    }

    #[derive(Default)]
    struct DocsCollector {
        docs: Vec<DocId>,
        doc_base: DocId,
        limit_per_leaf: Option<usize>,
        limit: Option<usize>,
        in_leaf: usize,
    }

    impl Collector for DocsCollector {
        fn needs_scores(&self) -> bool {
            false
        }

        fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()> {
            self.doc_base = reader.doc_base;
            self.in_leaf = 0;
            Ok(())
        }

        fn collect<T: Scorer + ?Sized>(
            &mut self,
            doc: DocId,
            _sorts: &SortVector,
            _scorer: &mut T,
        ) -> Result<()> {
            if self.limit.map_or(false, |l| self.docs.len() >= l) {
                bail!(ErrorKind::Collector(
                    collector::ErrorKind::CollectionTerminated
                ));
            }
            if self.limit_per_leaf.map_or(false, |l| self.in_leaf >= l) {
                bail!(ErrorKind::Collector(
                    collector::ErrorKind::LeafCollectionTerminated
                ));
            }
            self.in_leaf += 1;
            self.docs.push(self.doc_base + doc);
            Ok(())
        }
    }

    #[test]
    fn test_range_filtered_ranking() {
        let cache = MemoryFieldCache::new(5);
        let reader = LeafReaderContext::new(0, 0, 5, &cache);
        let searcher = EmbeddedSortSearcher::new(config());
        let scorer = VectorScorer::new(searcher.config(), five_docs()).unwrap();
        let filter = RangeFieldFilter::new(5, 10, 1).unwrap();

        let mut admitted = DocsCollector::default();
        let scorer_for_admission = VectorScorer::new(searcher.config(), five_docs()).unwrap();
        searcher
            .search(
                vec![(reader, scorer_for_admission)],
                Some(&filter),
                &mut admitted,
            )
            .unwrap();
        assert_eq!(admitted.docs, vec![0, 1, 2, 4]);

        let sort = Sort::new(vec![
            SortField::new_embedded("rank".into(), 1, false),
            SortField::new_doc(),
        ]);
        let top_docs = searcher
            .search_top(vec![(reader, scorer)], Some(&filter), &sort, 10, false)
            .unwrap();

        assert_eq!(top_docs.total_hits(), 4);
        assert_eq!(top_docs.doc_ids(), vec![1, 4, 0, 2]);
        let keys: Vec<VariantValue> = top_docs
            .field_docs()
            .iter()
            .map(|d| d.fields[0].clone())
            .collect();
        assert_eq!(
            keys,
            vec![
                VariantValue::Int(5),
                VariantValue::Int(7),
                VariantValue::Int(10),
                VariantValue::Int(10)
            ]
        );
    }

    #[test]
    fn test_multiple_segments() {
        let first = MemoryFieldCache::new(3);
        let second = MemoryFieldCache::new(3);
        let segments: Vec<(DocId, &dyn FieldCache)> = vec![(3, &first), (3, &second)];
        let readers = leaves(&segments);

        let searcher = EmbeddedSortSearcher::new(config());
        let scorers = vec![
            VectorScorer::new(
                searcher.config(),
                vec![
                    EmbeddedDoc::new(0, 0.5, vec![4, 1, 0]),
                    EmbeddedDoc::new(2, 2.5, vec![2, 2, 0]),
                ],
            )
            .unwrap(),
            VectorScorer::new(
                searcher.config(),
                vec![
                    EmbeddedDoc::new(1, 1.5, vec![3, 1, 0]),
                    EmbeddedDoc::new(2, 0.1, vec![1, 3, 0]),
                ],
            )
            .unwrap(),
        ];

        let mut filter = MultiFieldsFilter::default();
        filter.add_filter(TermFieldFilter::new(1, 2).unwrap());
        let top_docs = searcher
            .search_top(
                readers.into_iter().zip(scorers),
                Some(&filter),
                &Sort::relevance(),
                5,
                true,
            )
            .unwrap();

        assert_eq!(top_docs.doc_ids(), vec![4, 0]);
        assert_eq!(top_docs.max_score(), 1.5);
    }

    #[test]
    fn test_termination() {
        let cache = MemoryFieldCache::new(5);
        let segments: Vec<(DocId, &dyn FieldCache)> = vec![(5, &cache), (5, &cache)];
        let searcher = EmbeddedSortSearcher::new(config());
        let pass = |collector: &mut DocsCollector| {
            let scorers = vec![
                VectorScorer::new(searcher.config(), five_docs()).unwrap(),
                VectorScorer::new(searcher.config(), five_docs()).unwrap(),
            ];
            searcher
                .search(leaves(&segments).into_iter().zip(scorers), None, collector)
                .unwrap();
        };

        let mut per_leaf = DocsCollector {
            limit_per_leaf: Some(2),
            ..Default::default()
        };
        pass(&mut per_leaf);
        assert_eq!(per_leaf.docs, vec![0, 1, 5, 6]);

        let mut overall = DocsCollector {
            limit: Some(3),
            ..Default::default()
        };
        pass(&mut overall);
        assert_eq!(overall.docs, vec![0, 1, 2]);
    }

    #[test]
    fn test_rejects_mismatched_config() {
        let cache = MemoryFieldCache::new(5);
        let reader = LeafReaderContext::new(0, 0, 5, &cache);
        let scorer = VectorScorer::new(&config(), five_docs()).unwrap();
        let searcher = EmbeddedSortSearcher::new(EmbeddedSortConfig::with_num_sort(4));

        let mut collector = DocsCollector::default();
        assert!(searcher
            .search(vec![(reader, scorer)], None, &mut collector)
            .is_err());

        let sort = Sort::new(vec![SortField::new_embedded("rank".into(), 4, false)]);
        let scorer = VectorScorer::new(&config(), five_docs()).unwrap();
        assert!(EmbeddedSortSearcher::new(config())
            .search_top(vec![(reader, scorer)], None, &sort, 1, false)
            .is_err());
    }

    #[test]
    fn test_empty_filter_is_skipped() {
        let cache = MemoryFieldCache::new(5);
        let reader = LeafReaderContext::new(0, 0, 5, &cache);
        let searcher = EmbeddedSortSearcher::new(config());
        let scorer = VectorScorer::new(searcher.config(), five_docs()).unwrap();
        let filter = MultiFieldsFilter::default();

        let mut collector = DocsCollector::default();
        searcher
            .search(vec![(reader, scorer)], Some(&filter), &mut collector)
            .unwrap();
        assert_eq!(collector.docs, vec![0, 1, 2, 3, 4]);
    }
}
