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

pub mod collector;
pub mod filter;
pub mod scorer;
pub mod sort_field;

mod config;

pub use self::config::*;

mod explanation;

pub use self::explanation::*;

mod searcher;

pub use self::searcher::*;

mod sort_vector;

pub use self::sort_vector::*;

mod top_docs;

pub use self::top_docs::*;

use std::i32;

use crate::core::util::DocId;

use crate::error::Result;

/// When returned by `next()`, `advance(DocId)` and
/// `doc_id()` it means there are no more docs in the iterator.
pub const NO_MORE_DOCS: DocId = i32::MAX;

/// This trait defines methods to iterate over a set of strictly increasing
/// doc ids. `NO_MORE_DOCS` is used as the terminal sentinel, so
/// implementations must consider `i32::MAX` an invalid doc id.
pub trait DocIterator: Send {
    /// Returns the following:
    ///
    /// * `-1` if `next()` or `advance(DocId)` were not called yet.
    /// * `NO_MORE_DOCS` if the iterator has exhausted.
    /// * Otherwise it should return the doc ID it is currently on.
    fn doc_id(&self) -> DocId;

    /// Advances to the next document in the set and returns the doc it is
    /// currently on, or `NO_MORE_DOCS` if there are no more docs in the
    /// set.
    ///
    /// Once exhausted, further calls keep returning `NO_MORE_DOCS`.
    fn next(&mut self) -> Result<DocId>;

    /// Advances to the first beyond the current whose document number is greater
    /// than or equal to _target_, and returns the document number itself.
    /// Exhausts the iterator and returns `NO_MORE_DOCS` if _target_
    /// is greater than the highest document number in the set.
    ///
    /// The behavior of this method is *undefined* when called with
    /// `target <= current`.
    fn advance(&mut self, target: DocId) -> Result<DocId>;

    /// Slow (linear) implementation of `advance` relying on
    /// `next()` to advance beyond the target position.
    fn slow_advance(&mut self, target: DocId) -> Result<DocId> {
        debug_assert!(self.doc_id() < target);
        let mut doc = self.doc_id();
        while doc < target {
            doc = self.next()?;
        }
        Ok(doc)
    }

    /// Returns the estimated cost of this `DocIterator`.
    ///
    /// This is generally an upper bound of the number of documents this iterator
    /// might match.
    fn cost(&self) -> usize;
}

/// a `DocIterator` that means no matching doc is available
#[derive(Clone)]
pub struct EmptyDocIterator {
    doc_id: DocId,
}

impl Default for EmptyDocIterator {
    fn default() -> Self {
        EmptyDocIterator { doc_id: -1 }
    }
}

impl DocIterator for EmptyDocIterator {
    fn doc_id(&self) -> DocId {
        self.doc_id
    }

    fn next(&mut self) -> Result<DocId> {
        self.doc_id = NO_MORE_DOCS;
        Ok(NO_MORE_DOCS)
    }

    fn advance(&mut self, _target: DocId) -> Result<DocId> {
        self.doc_id = NO_MORE_DOCS;
        Ok(NO_MORE_DOCS)
    }

    fn cost(&self) -> usize {
        0usize
    }
}

#[cfg(test)]
pub mod tests {
    use super::scorer::Scorer;
    use super::*;

    pub struct MockDocIterator {
        doc_ids: Vec<DocId>,
        current_doc_id: DocId,
        offset: i32,
    }

    impl MockDocIterator {
        pub fn new(ids: Vec<DocId>) -> MockDocIterator {
            MockDocIterator {
                doc_ids: ids,
                current_doc_id: -1,
                offset: -1,
            }
        }
    }

    impl DocIterator for MockDocIterator {
        fn doc_id(&self) -> DocId {
            self.current_doc_id
        }

        fn next(&mut self) -> Result<DocId> {
            if self.current_doc_id == NO_MORE_DOCS {
                return Ok(NO_MORE_DOCS);
            }
            self.offset += 1;

            if (self.offset as usize) >= self.doc_ids.len() {
                self.current_doc_id = NO_MORE_DOCS;
            } else {
                self.current_doc_id = self.doc_ids[self.offset as usize];
            }

            Ok(self.doc_id())
        }

        fn advance(&mut self, target: DocId) -> Result<DocId> {
            loop {
                let doc_id = self.next()?;
                if doc_id >= target {
                    return Ok(doc_id);
                }
            }
        }

        fn cost(&self) -> usize {
            self.doc_ids.len()
        }
    }

    /// Scores every doc with its own id and exposes a fixed sort vector per
    /// doc, given in the same order as the doc ids.
    pub struct MockSortScorer<T: DocIterator> {
        iterator: T,
        docs: Vec<DocId>,
        sorts: Vec<Vec<i32>>,
        current: SortVector,
    }

    impl<T: DocIterator> MockSortScorer<T> {
        pub fn new(iterator: T, docs: Vec<DocId>, sorts: Vec<Vec<i32>>) -> Self {
            let num_sort = sorts.first().map(Vec::len).unwrap_or(0);
            MockSortScorer {
                iterator,
                docs,
                sorts,
                current: SortVector::new(num_sort),
            }
        }

        fn refresh(&mut self, doc: DocId) {
            if let Some(pos) = self.docs.iter().position(|d| *d == doc) {
                self.current.copy_from_slice(&self.sorts[pos]);
            } else {
                self.current.reset();
            }
        }
    }

    impl<T: DocIterator> Scorer for MockSortScorer<T> {
        fn score(&mut self) -> Result<f32> {
            Ok(self.doc_id() as f32)
        }

        fn sort_vector(&self) -> &SortVector {
            &self.current
        }
    }

    impl<T: DocIterator> DocIterator for MockSortScorer<T> {
        fn doc_id(&self) -> DocId {
            self.iterator.doc_id()
        }

        fn next(&mut self) -> Result<DocId> {
            let doc = self.iterator.next()?;
            self.refresh(doc);
            Ok(doc)
        }

        fn advance(&mut self, target: DocId) -> Result<DocId> {
            let doc = self.iterator.advance(target)?;
            self.refresh(doc);
            Ok(doc)
        }

        fn cost(&self) -> usize {
            self.iterator.cost()
        }
    }

    pub fn create_mock_scorer(
        docs: Vec<DocId>,
        sorts: Vec<Vec<i32>>,
    ) -> MockSortScorer<MockDocIterator> {
        MockSortScorer::new(MockDocIterator::new(docs.clone()), docs, sorts)
    }

    pub fn create_mock_doc_iterator(docs: Vec<DocId>) -> MockDocIterator {
        MockDocIterator::new(docs)
    }

    #[test]
    fn test_doc_ids_strictly_increase() {
        let mut iterator = create_mock_doc_iterator(vec![1, 4, 9]);
        assert_eq!(iterator.doc_id(), -1);

        let mut last = -1;
        loop {
            let doc = iterator.next().unwrap();
            if doc == NO_MORE_DOCS {
                break;
            }
            assert!(doc > last);
            last = doc;
        }
        assert_eq!(last, 9);
        // exhausted iterators never produce a real id again
        assert_eq!(iterator.next().unwrap(), NO_MORE_DOCS);
        assert_eq!(iterator.doc_id(), NO_MORE_DOCS);
    }

    #[test]
    fn test_slow_advance() {
        let mut iterator = create_mock_doc_iterator(vec![2, 5, 8]);
        iterator.next().unwrap();
        assert_eq!(iterator.slow_advance(6).unwrap(), 8);
        assert_eq!(iterator.slow_advance(9).unwrap(), NO_MORE_DOCS);
    }

    #[test]
    fn test_empty_doc_iterator() {
        let mut iterator = EmptyDocIterator::default();
        assert_eq!(iterator.doc_id(), -1);
        assert_eq!(iterator.next().unwrap(), NO_MORE_DOCS);
        assert_eq!(iterator.cost(), 0);
    }
}
