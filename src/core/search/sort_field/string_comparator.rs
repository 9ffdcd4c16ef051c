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
use std::sync::Arc;

use crate::core::index::{LeafReaderContext, StringIndex};
use crate::core::search::scorer::Scorer;
use crate::core::search::sort_field::{
    check_slot, compare_nullable, doc_value, FieldComparator, SortFieldType,
};
use crate::core::util::{DocId, VariantValue};
use crate::error::ErrorKind::IllegalState;
use crate::error::Result;

/// Locale-sensitive string ordering.
pub trait Collator: Send + Sync + fmt::Debug {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Orders strings ignoring case, then by their raw value so that the
/// order stays total.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaseInsensitiveCollator;

impl Collator for CaseInsensitiveCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        let folded_a = a.chars().flat_map(char::to_lowercase);
        let folded_b = b.chars().flat_map(char::to_lowercase);
        folded_a.cmp(folded_b).then_with(|| a.cmp(b))
    }
}

/// Sorts by a string field's value, comparing raw strings every time.
///
/// Without a collator the order is the natural order of `str`; with one,
/// it's the collator's. Missing values sort first.
pub struct StringValComparator {
    field: String,
    values: Vec<Option<String>>,
    current_reader_values: Option<Arc<Vec<Option<String>>>>,
    bottom: Option<Option<String>>,
    collator: Option<Arc<dyn Collator>>,
}

impl StringValComparator {
    pub fn new(num_hits: usize, field: String) -> StringValComparator {
        StringValComparator {
            field,
            values: vec![None; num_hits],
            current_reader_values: None,
            bottom: None,
            collator: None,
        }
    }

    pub fn with_collator(
        num_hits: usize,
        field: String,
        collator: Arc<dyn Collator>,
    ) -> StringValComparator {
        let mut comparator = StringValComparator::new(num_hits, field);
        comparator.collator = Some(collator);
        comparator
    }

    fn compare_strings(&self, a: Option<&String>, b: Option<&String>) -> Ordering {
        compare_nullable(a, b, |a, b| match self.collator {
            Some(ref collator) => collator.compare(a, b),
            None => a.cmp(b),
        })
    }
}

impl FieldComparator for StringValComparator {
    fn compare(&self, slot1: usize, slot2: usize) -> Ordering {
        self.compare_strings(self.values[slot1].as_ref(), self.values[slot2].as_ref())
    }

    fn compare_bottom<S: Scorer + ?Sized>(
        &mut self,
        doc: DocId,
        _scorer: &mut S,
    ) -> Result<Ordering> {
        let value: Option<String> = doc_value(
            self.current_reader_values.as_ref().map(|v| v.as_slice()),
            doc,
        )?;
        match self.bottom {
            Some(ref bottom) => Ok(self.compare_strings(bottom.as_ref(), value.as_ref())),
            None => bail!(IllegalState(
                "compare_bottom called before set_bottom".into()
            )),
        }
    }

    fn copy<S: Scorer + ?Sized>(&mut self, slot: usize, doc: DocId, _scorer: &mut S) -> Result<()> {
        check_slot(slot, self.values.len())?;
        self.values[slot] = doc_value(
            self.current_reader_values.as_ref().map(|v| v.as_slice()),
            doc,
        )?;
        Ok(())
    }

    fn set_bottom(&mut self, slot: usize) -> Result<()> {
        check_slot(slot, self.values.len())?;
        self.bottom = Some(self.values[slot].clone());
        Ok(())
    }

    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()> {
        self.current_reader_values = Some(reader.field_cache.get_strings(&self.field)?);
        Ok(())
    }

    fn value(&self, slot: usize) -> VariantValue {
        VariantValue::from(self.values[slot].clone())
    }

    fn get_type(&self) -> SortFieldType {
        if self.collator.is_some() {
            SortFieldType::String
        } else {
            SortFieldType::StringVal
        }
    }
}

impl fmt::Display for StringValComparator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "field: {}\tcollator: {:?}\tbottom: {:?}\tvalues: {:?}",
            self.field, self.collator, self.bottom, self.values
        )
    }
}

/// Sorts by a string field using the ordinals of the segment's
/// `StringIndex`, falling back to string comparison only across segments.
///
/// Every slot remembers the generation of the segment its ordinal belongs
/// to. When the collection moves to another segment the bottom slot is
/// re-resolved against the new lookup table; other slots keep their old
/// generation and compare by value.
pub struct StringOrdValComparator {
    field: String,
    ords: Vec<i32>,
    values: Vec<Option<String>>,
    reader_gen: Vec<i32>,

    current_reader_gen: i32,
    current: Option<Arc<StringIndex>>,

    bottom_slot: Option<usize>,
    bottom_ord: i32,
    bottom_value: Option<String>,
}

impl StringOrdValComparator {
    pub fn new(num_hits: usize, field: String) -> Self {
        StringOrdValComparator {
            field,
            ords: vec![0; num_hits],
            values: vec![None; num_hits],
            reader_gen: vec![-1; num_hits],
            current_reader_gen: -1,
            current: None,
            bottom_slot: None,
            bottom_ord: 0,
            bottom_value: None,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    fn index(&self) -> Result<&StringIndex> {
        match self.current {
            Some(ref index) => Ok(index),
            None => bail!(IllegalState(
                "no string index, set_next_reader was not called".into()
            )),
        }
    }

    /// Re-resolves the ord of `slot` against the current lookup table.
    fn convert(&mut self, slot: usize) -> Result<()> {
        self.reader_gen[slot] = self.current_reader_gen;
        let ord = match self.values[slot] {
            None => 0,
            Some(ref value) => {
                let index = binary_search(&self.index()?.lookup, value);
                // a missing value resolves to the ord of its predecessor
                if index < 0 {
                    -index - 2
                } else {
                    index
                }
            }
        };
        self.ords[slot] = ord;
        Ok(())
    }
}

/// Binary search over `lookup` where the missing value sorts first.
/// Returns the index of `key`, or `-(insertion point) - 1`.
fn binary_search(lookup: &[Option<String>], key: &str) -> i32 {
    let (mut low, mut high) = (0i32, lookup.len() as i32 - 1);
    while low <= high {
        let mid = low + (high - low) / 2;
        let cmp = match lookup[mid as usize] {
            Some(ref v) => v.as_str().cmp(key),
            None => Ordering::Less,
        };
        match cmp {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid - 1,
            Ordering::Equal => return mid,
        }
    }
    -(low + 1)
}

impl FieldComparator for StringOrdValComparator {
    fn compare(&self, slot1: usize, slot2: usize) -> Ordering {
        if self.reader_gen[slot1] == self.reader_gen[slot2] {
            let cmp = self.ords[slot1].cmp(&self.ords[slot2]);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        compare_nullable(
            self.values[slot1].as_ref(),
            self.values[slot2].as_ref(),
            |a, b| a.cmp(b),
        )
    }

    fn compare_bottom<S: Scorer + ?Sized>(
        &mut self,
        doc: DocId,
        _scorer: &mut S,
    ) -> Result<Ordering> {
        if self.bottom_slot.is_none() {
            bail!(IllegalState(
                "compare_bottom called before set_bottom".into()
            ));
        }
        let index = self.index()?;
        let order = doc_value(Some(index.order.as_slice()), doc)?;
        let cmp = self.bottom_ord.cmp(&(order as i32));
        if cmp != Ordering::Equal {
            return Ok(cmp);
        }
        Ok(compare_nullable(
            self.bottom_value.as_ref(),
            index.lookup[order].as_ref(),
            |a, b| a.cmp(b),
        ))
    }

    fn copy<S: Scorer + ?Sized>(&mut self, slot: usize, doc: DocId, _scorer: &mut S) -> Result<()> {
        check_slot(slot, self.ords.len())?;
        let (ord, value) = {
            let index = self.index()?;
            let ord = doc_value(Some(index.order.as_slice()), doc)?;
            (ord, index.lookup[ord].clone())
        };
        self.ords[slot] = ord as i32;
        self.values[slot] = value;
        self.reader_gen[slot] = self.current_reader_gen;
        Ok(())
    }

    fn set_bottom(&mut self, slot: usize) -> Result<()> {
        check_slot(slot, self.ords.len())?;
        self.bottom_slot = Some(slot);
        if self.reader_gen[slot] != self.current_reader_gen {
            self.convert(slot)?;
        }
        self.bottom_ord = self.ords[slot];
        self.bottom_value = self.values[slot].clone();
        Ok(())
    }

    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()> {
        self.current = Some(reader.field_cache.get_string_index(&self.field)?);
        self.current_reader_gen += 1;
        debug!(
            "field '{}' moves to reader generation {}",
            self.field, self.current_reader_gen
        );
        if let Some(bottom) = self.bottom_slot {
            self.convert(bottom)?;
            self.bottom_ord = self.ords[bottom];
        }
        Ok(())
    }

    fn value(&self, slot: usize) -> VariantValue {
        VariantValue::from(self.values[slot].clone())
    }

    fn get_type(&self) -> SortFieldType {
        SortFieldType::String
    }
}

impl fmt::Display for StringOrdValComparator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "field: {}\treader_gen: {}\tbottom: {:?}\tords: {:?}\tvalues: {:?}",
            self.field, self.current_reader_gen, self.bottom_slot, self.ords, self.values
        )
    }
}
