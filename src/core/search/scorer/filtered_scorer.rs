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

use crate::core::search::filter::EmbeddedFieldFilter;
use crate::core::search::scorer::Scorer;
use crate::core::search::{DocIterator, Explanation, SortVector, NO_MORE_DOCS};
use crate::core::util::DocId;
use crate::error::ErrorKind::IllegalArgument;
use crate::error::Result;

/// A `Scorer` that only stops on documents whose sort vector is admitted
/// by an `EmbeddedFieldFilter`, so rejected documents are never scored.
pub struct FilteredScorer<'a, S: Scorer> {
    scorer: S,
    filter: &'a dyn EmbeddedFieldFilter,
}

impl<'a, S: Scorer> FilteredScorer<'a, S> {
    pub fn new(scorer: S, filter: &'a dyn EmbeddedFieldFilter) -> Result<Self> {
        let num_sort = scorer.sort_vector().len();
        if filter.max_field_number() > num_sort {
            bail!(IllegalArgument(format!(
                "filter reads field {} but documents carry {} sort keys",
                filter.max_field_number(),
                num_sort
            )));
        }
        Ok(FilteredScorer { scorer, filter })
    }

    pub fn into_inner(self) -> S {
        self.scorer
    }

    fn skip_rejected(&mut self, mut doc: DocId) -> Result<DocId> {
        while doc != NO_MORE_DOCS && !self.filter.filter(self.scorer.sort_vector()) {
            doc = self.scorer.next()?;
        }
        Ok(doc)
    }
}

impl<'a, S: Scorer> Scorer for FilteredScorer<'a, S> {
    fn score(&mut self) -> Result<f32> {
        self.scorer.score()
    }

    fn sort_vector(&self) -> &SortVector {
        self.scorer.sort_vector()
    }

    fn sort_key(&self, slot: usize) -> Result<i32> {
        self.scorer.sort_key(slot)
    }

    fn explain(&self, doc: DocId) -> Result<Explanation> {
        self.scorer.explain(doc)
    }
}

impl<'a, S: Scorer> DocIterator for FilteredScorer<'a, S> {
    fn doc_id(&self) -> DocId {
        self.scorer.doc_id()
    }

    fn next(&mut self) -> Result<DocId> {
        let doc = self.scorer.next()?;
        self.skip_rejected(doc)
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let doc = self.scorer.advance(target)?;
        self.skip_rejected(doc)
    }

    fn cost(&self) -> usize {
        self.scorer.cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::filter::{MultiFieldsFilter, RangeFieldFilter, TermFieldFilter};
    use crate::core::search::tests::*;

    fn scorer() -> MockSortScorer<MockDocIterator> {
        create_mock_scorer(
            vec![0, 1, 2, 3, 4],
            vec![
                vec![10, -1, 3],
                vec![5, -1, 7],
                vec![10, -1, 1],
                vec![-1, -1, -1],
                vec![7, -1, 9],
            ],
        )
    }

    fn drain<S: Scorer>(scorer: &mut S) -> Vec<DocId> {
        let mut docs = vec![];
        loop {
            let doc = scorer.next().unwrap();
            if doc == NO_MORE_DOCS {
                return docs;
            }
            docs.push(doc);
        }
    }

    #[test]
    fn test_range_filter() {
        let filter = RangeFieldFilter::new(5, 10, 1).unwrap();
        let mut filtered = FilteredScorer::new(scorer(), &filter).unwrap();
        assert_eq!(drain(&mut filtered), vec![0, 1, 2, 4]);
        assert_eq!(filtered.next().unwrap(), NO_MORE_DOCS);
    }

    #[test]
    fn test_advance_skips_rejected() {
        let filter = TermFieldFilter::new(9, 3).unwrap();
        let mut filtered = FilteredScorer::new(scorer(), &filter).unwrap();
        // doc 3 has no key in slot 3 and is admitted as don't-care
        assert_eq!(filtered.advance(1).unwrap(), 3);
        assert_eq!(filtered.next().unwrap(), 4);
        assert_eq!(filtered.sort_key(2).unwrap(), 9);
        assert_eq!(filtered.score().unwrap(), 4.0);
    }

    #[test]
    fn test_filter_wider_than_vector() {
        let filter = RangeFieldFilter::new(0, 1, 4).unwrap();
        assert!(FilteredScorer::new(scorer(), &filter).is_err());

        let empty = MultiFieldsFilter::default();
        let mut filtered = FilteredScorer::new(scorer(), &empty).unwrap();
        assert_eq!(drain(&mut filtered).len(), 5);
    }
}
