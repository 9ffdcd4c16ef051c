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
use std::fmt;

use crate::core::index::LeafReaderContext;
use crate::core::search::scorer::Scorer;
use crate::core::search::sort_field::{bottom_value, check_slot, FieldComparator, SortFieldType};
use crate::core::util::{DocId, VariantValue};
use crate::error::ErrorKind::IllegalArgument;
use crate::error::Result;

/// Sorts by ascending value of an integer key embedded in the documents'
/// `SortVector`.
///
/// The key of a candidate is read from the scorer positioned on it, at
/// `field_number - 1`; there is no per-segment state.
pub struct EmbeddedIntComparator {
    field: String,
    field_number: usize,
    values: Vec<i32>,
    bottom: Option<i32>,
}

impl EmbeddedIntComparator {
    pub fn new(num_hits: usize, field: String, field_number: usize) -> Result<Self> {
        if field_number == 0 {
            bail!(IllegalArgument(format!(
                "field number of '{}' is 1-based, got 0",
                field
            )));
        }
        Ok(EmbeddedIntComparator {
            field,
            field_number,
            values: vec![0; num_hits],
            bottom: None,
        })
    }

    pub fn field_number(&self) -> usize {
        self.field_number
    }
}

impl FieldComparator for EmbeddedIntComparator {
    fn compare(&self, slot1: usize, slot2: usize) -> Ordering {
        self.values[slot1].cmp(&self.values[slot2])
    }

    fn compare_bottom<S: Scorer + ?Sized>(
        &mut self,
        _doc: DocId,
        scorer: &mut S,
    ) -> Result<Ordering> {
        let bottom = bottom_value(&self.bottom)?;
        let key = scorer.sort_key(self.field_number - 1)?;
        Ok(bottom.cmp(&key))
    }

    fn copy<S: Scorer + ?Sized>(&mut self, slot: usize, _doc: DocId, scorer: &mut S) -> Result<()> {
        check_slot(slot, self.values.len())?;
        self.values[slot] = scorer.sort_key(self.field_number - 1)?;
        Ok(())
    }

    fn set_bottom(&mut self, slot: usize) -> Result<()> {
        check_slot(slot, self.values.len())?;
        self.bottom = Some(self.values[slot]);
        Ok(())
    }

    fn set_next_reader(&mut self, _reader: &LeafReaderContext<'_>) -> Result<()> {
        Ok(())
    }

    fn value(&self, slot: usize) -> VariantValue {
        VariantValue::Int(self.values[slot])
    }

    fn get_type(&self) -> SortFieldType {
        SortFieldType::EmbeddedInt
    }
}

impl fmt::Display for EmbeddedIntComparator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "field: {}\tfield_number: {}\tbottom: {:?}\tvalues: {:?}",
            self.field, self.field_number, self.bottom, self.values
        )
    }
}
