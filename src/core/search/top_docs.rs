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

use crate::core::search::sort_field::SortField;
use crate::core::util::{DocId, VariantValue};

/// Expert: A hit which also contains information about how to sort the
/// referenced document. In addition to the document number and score,
/// this object contains an array of values for the document from the
/// field(s) used to sort. For example, if the sort criteria was to sort by
/// fields "a", "b" then "c", the `fields` array will have three elements,
/// corresponding respectively to the values for the document in fields
/// "a", "b" and "c".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDoc {
    pub doc: DocId,
    /// `NAN` when scores were not tracked
    pub score: f32,
    /// Expert: The values which are used to sort the referenced document.
    /// The order of these will match the original sort criteria given by a
    /// `Sort` object. Each value will have been returned from the `value`
    /// method of the corresponding `FieldComparator` used to sort this field.
    pub fields: Vec<VariantValue>,
}

impl FieldDoc {
    pub fn new(doc: DocId, score: f32, fields: Vec<VariantValue>) -> FieldDoc {
        FieldDoc { doc, score, fields }
    }
}

/// Represents hits returned by `TopFieldCollector::top_docs`.
#[derive(Debug, Clone)]
pub struct TopFieldDocs {
    /// The total number of hits for the query.
    pub total_hits: usize,
    /// The top hits for the query, best first.
    pub field_docs: Vec<FieldDoc>,
    /// The maximum score encountered, `NAN` when scores were not tracked.
    pub max_score: f32,
    /// The fields which were used to sort results by.
    pub fields: Vec<SortField>,
}

impl TopFieldDocs {
    pub fn new(
        total_hits: usize,
        field_docs: Vec<FieldDoc>,
        max_score: f32,
        fields: Vec<SortField>,
    ) -> TopFieldDocs {
        TopFieldDocs {
            total_hits,
            field_docs,
            max_score,
            fields,
        }
    }

    pub fn total_hits(&self) -> usize {
        self.total_hits
    }

    pub fn field_docs(&self) -> &[FieldDoc] {
        &self.field_docs
    }

    pub fn max_score(&self) -> f32 {
        self.max_score
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.field_docs.iter().map(|d| d.doc).collect()
    }
}
