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

mod bulk_scorer;

pub use self::bulk_scorer::*;

mod filtered_scorer;

pub use self::filtered_scorer::*;

mod vector_scorer;

pub use self::vector_scorer::*;

use std::borrow::Cow;

use crate::core::search::{DocIterator, Explanation, SortVector, NO_MORE_DOCS};
use crate::core::util::DocId;
use crate::error::ErrorKind::{IllegalArgument, IllegalState, UnsupportedOperation};
use crate::error::Result;

/// Expert: Common scoring functionality for different types of queries.
///
/// A `Scorer` iterates over documents matching a query in increasing order
/// of doc id. For the doc it is positioned on it exposes a relevance score
/// and the doc's `SortVector`.
///
/// **NOTE**: The values `f32::NAN`, `f32::NEG_INFINITY` and `f32::INFINITY` are
/// not valid scores. Collectors are not required to handle them.
///
/// The vector returned by `sort_vector` is only valid until the next call
/// to `next()` or `advance()`; callers that need a key afterwards must copy
/// it out.
pub trait Scorer: DocIterator {
    /// Returns the score of the current document matching the query.
    /// Initially invalid, until `DocIterator::next()` or
    /// `DocIterator::advance()` is called the first time, or when called
    /// from within `Collector::collect`.
    fn score(&mut self) -> Result<f32>;

    /// The sort keys of the current document.
    fn sort_vector(&self) -> &SortVector;

    /// Returns the current document's sort key at the 0-based `slot`.
    fn sort_key(&self, slot: usize) -> Result<i32> {
        let doc = self.doc_id();
        if doc < 0 || doc == NO_MORE_DOCS {
            bail!(IllegalState(format!(
                "sort key {} read while the scorer is not on a doc (doc_id: {})",
                slot, doc
            )));
        }
        match self.sort_vector().get(slot) {
            Some(key) => Ok(key),
            None => bail!(IllegalArgument(format!(
                "sort slot {} is out of bounds: [0-{})",
                slot,
                self.sort_vector().len()
            ))),
        }
    }

    /// Returns an explanation of the score for `doc`.
    fn explain(&self, _doc: DocId) -> Result<Explanation> {
        bail!(UnsupportedOperation(Cow::Borrowed(
            "this scorer can not explain its scores"
        )))
    }
}

impl Scorer for Box<dyn Scorer> {
    fn score(&mut self) -> Result<f32> {
        (**self).score()
    }

    fn sort_vector(&self) -> &SortVector {
        (**self).sort_vector()
    }

    fn sort_key(&self, slot: usize) -> Result<i32> {
        (**self).sort_key(slot)
    }

    fn explain(&self, doc: DocId) -> Result<Explanation> {
        (**self).explain(doc)
    }
}

impl DocIterator for Box<dyn Scorer> {
    fn doc_id(&self) -> DocId {
        (**self).doc_id()
    }

    fn next(&mut self) -> Result<DocId> {
        (**self).next()
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        (**self).advance(target)
    }

    fn slow_advance(&mut self, target: DocId) -> Result<DocId> {
        (**self).slow_advance(target)
    }

    fn cost(&self) -> usize {
        (**self).cost()
    }
}

/// Remembers the score of the last scored doc so that repeated requests
/// for the same doc compute it once.
#[derive(Debug, Clone)]
pub struct ScoreCache {
    cur_doc: DocId,
    cur_score: f32,
}

impl Default for ScoreCache {
    fn default() -> Self {
        ScoreCache {
            cur_doc: -1,
            cur_score: 0f32,
        }
    }
}

impl ScoreCache {
    pub fn score<S: Scorer + ?Sized>(&mut self, scorer: &mut S) -> Result<f32> {
        let doc = scorer.doc_id();
        if doc != self.cur_doc {
            self.cur_score = scorer.score()?;
            self.cur_doc = doc;
        }
        Ok(self.cur_score)
    }

    /// Forgets the cached score; doc ids are only unique within a segment.
    pub fn clear(&mut self) {
        self.cur_doc = -1;
    }
}

/// A `Scorer` which wraps another scorer and caches the score of the
/// current document.
pub struct ScoreCachingWrappingScorer<S: Scorer> {
    scorer: S,
    cache: ScoreCache,
}

impl<S: Scorer> ScoreCachingWrappingScorer<S> {
    pub fn new(scorer: S) -> Self {
        ScoreCachingWrappingScorer {
            scorer,
            cache: ScoreCache::default(),
        }
    }

    pub fn into_inner(self) -> S {
        self.scorer
    }
}

impl<S: Scorer> Scorer for ScoreCachingWrappingScorer<S> {
    fn score(&mut self) -> Result<f32> {
        self.cache.score(&mut self.scorer)
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

impl<S: Scorer> DocIterator for ScoreCachingWrappingScorer<S> {
    fn doc_id(&self) -> DocId {
        self.scorer.doc_id()
    }

    fn next(&mut self) -> Result<DocId> {
        self.scorer.next()
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        self.scorer.advance(target)
    }

    fn cost(&self) -> usize {
        self.scorer.cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::tests::*;
    use crate::error::{Error, ErrorKind};

    struct CountingScorer {
        inner: MockSortScorer<MockDocIterator>,
        calls: usize,
    }

    impl Scorer for CountingScorer {
        fn score(&mut self) -> Result<f32> {
            self.calls += 1;
            self.inner.score()
        }

        fn sort_vector(&self) -> &SortVector {
            self.inner.sort_vector()
        }
    }

    impl DocIterator for CountingScorer {
        fn doc_id(&self) -> DocId {
            self.inner.doc_id()
        }

        fn next(&mut self) -> Result<DocId> {
            self.inner.next()
        }

        fn advance(&mut self, target: DocId) -> Result<DocId> {
            self.inner.advance(target)
        }

        fn cost(&self) -> usize {
            self.inner.cost()
        }
    }

    #[test]
    fn test_sort_key_requires_position() {
        let mut scorer = create_mock_scorer(vec![3], vec![vec![7, -1]]);
        match scorer.sort_key(0) {
            Err(Error(ErrorKind::IllegalState(_), _)) => {}
            other => panic!("expected illegal state, got {:?}", other.map(|_| ())),
        }

        assert_eq!(scorer.next().unwrap(), 3);
        assert_eq!(scorer.sort_key(0).unwrap(), 7);
        assert_eq!(scorer.sort_key(1).unwrap(), -1);
        match scorer.sort_key(2) {
            Err(Error(ErrorKind::IllegalArgument(_), _)) => {}
            other => panic!("expected illegal argument, got {:?}", other.map(|_| ())),
        }

        assert_eq!(scorer.next().unwrap(), NO_MORE_DOCS);
        assert!(scorer.sort_key(0).is_err());
    }

    #[test]
    fn test_explain_is_unsupported_by_default() {
        let scorer = create_mock_scorer(vec![1], vec![vec![1]]);
        match scorer.explain(1) {
            Err(Error(ErrorKind::UnsupportedOperation(_), _)) => {}
            other => panic!("expected unsupported operation, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_score_caching() {
        let inner = create_mock_scorer(vec![1, 2], vec![vec![0], vec![0]]);
        let mut scorer = ScoreCachingWrappingScorer::new(CountingScorer { inner, calls: 0 });

        scorer.next().unwrap();
        assert_eq!(scorer.score().unwrap(), 1.0);
        assert_eq!(scorer.score().unwrap(), 1.0);
        scorer.next().unwrap();
        assert_eq!(scorer.score().unwrap(), 2.0);

        assert_eq!(scorer.into_inner().calls, 2);
    }
}
