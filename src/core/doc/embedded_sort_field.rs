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

use crate::error::ErrorKind::IllegalArgument;
use crate::error::Result;

/// Whether and how a field value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Store {
    Yes,
    /// stored in compressed form
    Compress,
    No,
}

/// Whether and how a field value is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Index {
    No,
    Analyzed,
    NotAnalyzed,
    NotAnalyzedNoNorms,
    AnalyzedNoNorms,
}

impl Index {
    pub fn is_indexed(self) -> bool {
        self != Index::No
    }

    pub fn is_analyzed(self) -> bool {
        match self {
            Index::Analyzed | Index::AnalyzedNoNorms => true,
            _ => false,
        }
    }

    pub fn omit_norms(self) -> bool {
        match self {
            Index::No | Index::NotAnalyzedNoNorms | Index::AnalyzedNoNorms => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermVector {
    No,
    Yes,
    WithPositions,
    WithOffsets,
    WithPositionsOffsets,
}

impl TermVector {
    pub fn is_stored(self) -> bool {
        self != TermVector::No
    }

    pub fn with_positions(self) -> bool {
        match self {
            TermVector::WithPositions | TermVector::WithPositionsOffsets => true,
            _ => false,
        }
    }

    pub fn with_offsets(self) -> bool {
        match self {
            TermVector::WithOffsets | TermVector::WithPositionsOffsets => true,
            _ => false,
        }
    }
}

/// A field of a document that also feeds one slot of the document's
/// embedded sort vector.
///
/// `sort_slot` is the 1-based field number of the slot; `0` means the
/// field has no slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedSortField {
    name: String,
    value: String,
    store: Store,
    index: Index,
    term_vector: TermVector,
    sort_slot: usize,
}

impl EmbeddedSortField {
    pub fn new(
        name: String,
        value: String,
        store: Store,
        index: Index,
        sort_slot: usize,
    ) -> Result<EmbeddedSortField> {
        let mut field = EmbeddedSortField::with_term_vector(name, value, store, index, TermVector::No)?;
        field.sort_slot = sort_slot;
        Ok(field)
    }

    pub fn with_term_vector(
        name: String,
        value: String,
        store: Store,
        index: Index,
        term_vector: TermVector,
    ) -> Result<EmbeddedSortField> {
        if name.is_empty() && value.is_empty() {
            bail!(IllegalArgument(
                "name and value cannot both be empty".into()
            ));
        }
        if index == Index::No && store == Store::No {
            bail!(IllegalArgument(
                "it doesn't make sense to have a field that is neither indexed nor stored".into()
            ));
        }
        if index == Index::No && term_vector != TermVector::No {
            bail!(IllegalArgument(
                "cannot store term vector information for a field that is not indexed".into()
            ));
        }
        Ok(EmbeddedSortField {
            name,
            value,
            store,
            index,
            term_vector,
            sort_slot: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn string_value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: String) {
        self.value = value;
    }

    pub fn sort_slot(&self) -> usize {
        self.sort_slot
    }

    pub fn store(&self) -> Store {
        self.store
    }

    pub fn index(&self) -> Index {
        self.index
    }

    pub fn term_vector(&self) -> TermVector {
        self.term_vector
    }

    pub fn is_stored(&self) -> bool {
        self.store != Store::No
    }

    pub fn is_compressed(&self) -> bool {
        self.store == Store::Compress
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_indexed()
    }

    pub fn is_tokenized(&self) -> bool {
        self.index.is_analyzed()
    }

    pub fn omit_norms(&self) -> bool {
        self.index.omit_norms()
    }
}

impl fmt::Display for EmbeddedSortField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut flags = vec![];
        if self.is_stored() {
            flags.push(if self.is_compressed() {
                "stored/compressed"
            } else {
                "stored/uncompressed"
            });
        }
        if self.is_indexed() {
            flags.push("indexed");
        }
        if self.is_tokenized() {
            flags.push("tokenized");
        }
        if self.term_vector.is_stored() {
            flags.push("termVector");
        }
        if self.omit_norms() {
            flags.push("omitNorms");
        }
        write!(
            f,
            "{}<{}:{}>#{}",
            flags.join(","),
            self.name,
            self.value,
            self.sort_slot
        )
    }
}
