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

use crate::core::index::FieldCache;
use crate::core::util::DocId;

/// A segment of the index as seen by one collection pass.
///
/// `doc_base` rebases segment-local document ids into the id space of the
/// whole pass; `field_cache` is the segment-scoped key loader consulted by
/// cache-backed comparators in `FieldComparator::set_next_reader`.
#[derive(Clone, Copy)]
pub struct LeafReaderContext<'a> {
    /// ord of this segment in the parent reader
    pub ord: usize,
    /// the doc base for this segment in the parent reader
    pub doc_base: DocId,
    pub max_doc: DocId,
    pub field_cache: &'a dyn FieldCache,
}

impl<'a> LeafReaderContext<'a> {
    pub fn new(
        ord: usize,
        doc_base: DocId,
        max_doc: DocId,
        field_cache: &'a dyn FieldCache,
    ) -> LeafReaderContext<'a> {
        LeafReaderContext {
            ord,
            doc_base,
            max_doc,
            field_cache,
        }
    }
}

impl<'a> fmt::Debug for LeafReaderContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LeafReaderContext")
            .field("ord", &self.ord)
            .field("doc_base", &self.doc_base)
            .field("max_doc", &self.max_doc)
            .finish()
    }
}

/// Lays out consecutive segments of the given sizes, assigning each its
/// `ord` and `doc_base`.
pub fn leaves<'a>(segments: &[(DocId, &'a dyn FieldCache)]) -> Vec<LeafReaderContext<'a>> {
    let mut doc_base = 0;
    let mut leaves = Vec::with_capacity(segments.len());
    for (ord, &(max_doc, cache)) in segments.iter().enumerate() {
        leaves.push(LeafReaderContext::new(ord, doc_base, max_doc, cache));
        doc_base += max_doc;
    }
    leaves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::MemoryFieldCache;

    #[test]
    fn test_leaves_doc_base() {
        let first = MemoryFieldCache::new(3);
        let second = MemoryFieldCache::new(4);
        let contexts = leaves(&[(3, &first), (4, &second)]);

        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0].ord, 0);
        assert_eq!(contexts[0].doc_base, 0);
        assert_eq!(contexts[1].ord, 1);
        assert_eq!(contexts[1].doc_base, 3);
        assert_eq!(contexts[1].max_doc, 4);
    }
}
