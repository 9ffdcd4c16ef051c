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

use std::fmt;

use crate::core::search::scorer::Scorer;
use crate::core::search::{DocIterator, EmbeddedSortConfig, Explanation, SortVector, NO_MORE_DOCS};
use crate::core::util::DocId;
use crate::error::ErrorKind::IllegalArgument;
use crate::error::Result;

/// A matching document with its score and embedded sort keys.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedDoc {
    pub doc: DocId,
    pub score: f32,
    pub keys: Vec<i32>,
}

impl EmbeddedDoc {
    pub fn new(doc: DocId, score: f32, keys: Vec<i32>) -> EmbeddedDoc {
        EmbeddedDoc { doc, score, keys }
    }
}

/// `Scorer` over a precomputed, doc id ordered list of `EmbeddedDoc`s.
///
/// The scorer owns a single `SortVector` of `num_sort` slots which is
/// refreshed in place whenever it moves to another document.
pub struct VectorScorer {
    docs: Vec<EmbeddedDoc>,
    // index into `docs` of the current document, `docs.len()` once exhausted
    pos: usize,
    doc_id: DocId,
    sorts: SortVector,
}

impl VectorScorer {
    pub fn new(config: &EmbeddedSortConfig, docs: Vec<EmbeddedDoc>) -> Result<VectorScorer> {
        let mut last = -1;
        for d in &docs {
            if d.doc <= last || d.doc == NO_MORE_DOCS {
                bail!(IllegalArgument(format!(
                    "doc ids must strictly increase and stay below {}, got {} after {}",
                    NO_MORE_DOCS, d.doc, last
                )));
            }
            if !d.score.is_finite() {
                bail!(IllegalArgument(format!(
                    "doc {} has a non-finite score {}",
                    d.doc, d.score
                )));
            }
            if d.keys.len() != config.num_sort {
                bail!(IllegalArgument(format!(
                    "doc {} has {} sort keys, expected {}",
                    d.doc,
                    d.keys.len(),
                    config.num_sort
                )));
            }
            last = d.doc;
        }

        Ok(VectorScorer {
            pos: docs.len(),
            docs,
            doc_id: -1,
            sorts: SortVector::new(config.num_sort),
        })
    }

    fn position(&mut self, pos: usize) -> DocId {
        self.pos = pos;
        if let Some(d) = self.docs.get(pos) {
            self.doc_id = d.doc;
            self.sorts.copy_from_slice(&d.keys);
        } else {
            self.doc_id = NO_MORE_DOCS;
            self.sorts.reset();
        }
        self.doc_id
    }

    fn current(&self) -> Option<&EmbeddedDoc> {
        if self.doc_id < 0 {
            None
        } else {
            self.docs.get(self.pos)
        }
    }
}

impl Scorer for VectorScorer {
    fn score(&mut self) -> Result<f32> {
        Ok(self.current().map_or(0f32, |d| d.score))
    }

    fn sort_vector(&self) -> &SortVector {
        &self.sorts
    }

    fn explain(&self, doc: DocId) -> Result<Explanation> {
        let explanation = match self.docs.binary_search_by_key(&doc, |d| d.doc) {
            Ok(i) => {
                let d = &self.docs[i];
                let mut explanation = Explanation::matched(
                    d.score,
                    format!("embedded score, sort keys {:?}", d.keys),
                );
                for (slot, key) in d.keys.iter().enumerate() {
                    if *key != SortVector::UNSET {
                        explanation.add_detail(Explanation::matched(
                            *key as f32,
                            format!("sort key #{}", slot + 1),
                        ));
                    }
                }
                explanation
            }
            Err(_) => Explanation::no_match(format!("doc {} does not match", doc)),
        };
        Ok(explanation)
    }
}

impl DocIterator for VectorScorer {
    fn doc_id(&self) -> DocId {
        self.doc_id
    }

    fn next(&mut self) -> Result<DocId> {
        let pos = if self.doc_id < 0 {
            0
        } else if self.doc_id == NO_MORE_DOCS {
            return Ok(NO_MORE_DOCS);
        } else {
            self.pos + 1
        };
        Ok(self.position(pos))
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let start = if self.doc_id < 0 { 0 } else { self.pos };
        let offset = match self.docs[start.min(self.docs.len())..]
            .binary_search_by_key(&target, |d| d.doc)
        {
            Ok(i) | Err(i) => i,
        };
        Ok(self.position(start + offset))
    }

    fn cost(&self) -> usize {
        self.docs.len()
    }
}

impl fmt::Debug for VectorScorer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "VectorScorer(doc: {}, sorts: {:?}, cost: {})",
            self.doc_id,
            self.sorts,
            self.docs.len()
        )
    }
}
