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

mod field_comparator;

pub use self::field_comparator::*;

mod numeric_comparator;

pub use self::numeric_comparator::*;

mod string_comparator;

pub use self::string_comparator::*;

mod embedded_comparator;

pub use self::embedded_comparator::*;

mod sort_field;

pub use self::sort_field::*;

use crate::core::search::EmbeddedSortConfig;
use crate::error::Result;

/// Encapsulates sort criteria for returned hits.
///
/// Fields are applied in order: a later field only breaks ties left by
/// the fields before it, and hits tied on every field keep increasing
/// doc id order.
///
/// ### Valid Types of Values
///
/// Cache-backed fields (`Byte` to `Double`, `String`, `StringVal`) read one
/// value per document from the segment's `FieldCache`. Documents which
/// should appear first in the sort should have low values, later documents
/// high values. Float values must not be `NaN`.
///
/// `EmbeddedInt` fields read no cache: the key travels with the document in
/// its `SortVector`, at the field's 1-based field number.
///
/// ### Object Reuse
///
/// One of these objects can be used multiple times; every collector builds
/// its own comparators from it.
#[derive(Clone, Debug)]
pub struct Sort {
    fields: Vec<SortField>,
}

impl Sort {
    pub fn new(fields: Vec<SortField>) -> Sort {
        Sort { fields }
    }

    /// Sorts by relevance, then by index order.
    pub fn relevance() -> Sort {
        Sort::new(vec![SortField::new_score(), SortField::new_doc()])
    }

    pub fn get_sort(&self) -> &[SortField] {
        &self.fields
    }

    pub fn needs_scores(&self) -> bool {
        self.fields.iter().any(|f| f.needs_scores())
    }

    /// Fails if an embedded field reads a slot `config` doesn't have.
    pub fn check_field_numbers(&self, config: &EmbeddedSortConfig) -> Result<()> {
        for field in &self.fields {
            field.check_field_number(config)?;
        }
        Ok(())
    }
}
