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

use crate::core::index::{FieldCache, LeafReaderContext};
use crate::core::search::scorer::Scorer;
use crate::core::search::sort_field::{
    bottom_value, check_slot, doc_value, FieldComparator, SortFieldType,
};
use crate::core::util::{DocId, VariantValue};
use crate::error::Result;

/// Element type of a cache-backed numeric sort.
pub trait NumericSortValue: Copy + Default + fmt::Debug {
    fn sort_type() -> SortFieldType;

    /// Loads the per-segment values of `field`.
    fn load(cache: &dyn FieldCache, field: &str) -> Result<Arc<Vec<Self>>>;

    /// Ascending order, total over the values a field can hold.
    fn compare_values(a: Self, b: Self) -> Ordering;

    fn to_variant(self) -> VariantValue;
}

macro_rules! integer_sort_value {
    ($ty:ty, $sort_type:ident, $load:ident, $variant:ident) => {
        impl NumericSortValue for $ty {
            fn sort_type() -> SortFieldType {
                SortFieldType::$sort_type
            }

            fn load(cache: &dyn FieldCache, field: &str) -> Result<Arc<Vec<$ty>>> {
                cache.$load(field)
            }

            // never `a - b`, which overflows at the ends of the domain
            fn compare_values(a: $ty, b: $ty) -> Ordering {
                a.cmp(&b)
            }

            fn to_variant(self) -> VariantValue {
                VariantValue::$variant(self)
            }
        }
    };
}

integer_sort_value!(i8, Byte, get_bytes, Byte);
integer_sort_value!(i16, Short, get_shorts, Short);
integer_sort_value!(i32, Int, get_ints, Int);
integer_sort_value!(i64, Long, get_longs, Long);

macro_rules! float_sort_value {
    ($ty:ty, $sort_type:ident, $load:ident, $variant:ident) => {
        impl NumericSortValue for $ty {
            fn sort_type() -> SortFieldType {
                SortFieldType::$sort_type
            }

            fn load(cache: &dyn FieldCache, field: &str) -> Result<Arc<Vec<$ty>>> {
                cache.$load(field)
            }

            fn compare_values(a: $ty, b: $ty) -> Ordering {
                if a > b {
                    Ordering::Greater
                } else if a < b {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            }

            fn to_variant(self) -> VariantValue {
                VariantValue::$variant(self)
            }
        }
    };
}

float_sort_value!(f32, Float, get_floats, Float);
float_sort_value!(f64, Double, get_doubles, Double);

/// Sorts by the ascending value of a numeric field, as loaded from the
/// segment's `FieldCache`.
pub struct NumericComparator<T: NumericSortValue> {
    field: String,
    values: Vec<T>,
    current_reader_values: Option<Arc<Vec<T>>>,
    bottom: Option<T>,
}

impl<T: NumericSortValue> NumericComparator<T> {
    pub fn new(num_hits: usize, field: String) -> NumericComparator<T> {
        NumericComparator {
            field,
            values: vec![T::default(); num_hits],
            current_reader_values: None,
            bottom: None,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    fn current(&self, doc: DocId) -> Result<T> {
        doc_value(self.current_reader_values.as_ref().map(|v| v.as_slice()), doc)
    }
}

impl<T: NumericSortValue> FieldComparator for NumericComparator<T> {
    fn compare(&self, slot1: usize, slot2: usize) -> Ordering {
        T::compare_values(self.values[slot1], self.values[slot2])
    }

    fn compare_bottom<S: Scorer + ?Sized>(
        &mut self,
        doc: DocId,
        _scorer: &mut S,
    ) -> Result<Ordering> {
        let bottom = bottom_value(&self.bottom)?;
        Ok(T::compare_values(bottom, self.current(doc)?))
    }

    fn copy<S: Scorer + ?Sized>(&mut self, slot: usize, doc: DocId, _scorer: &mut S) -> Result<()> {
        check_slot(slot, self.values.len())?;
        self.values[slot] = self.current(doc)?;
        Ok(())
    }

    fn set_bottom(&mut self, slot: usize) -> Result<()> {
        check_slot(slot, self.values.len())?;
        self.bottom = Some(self.values[slot]);
        Ok(())
    }

    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()> {
        self.current_reader_values = Some(T::load(reader.field_cache, &self.field)?);
        Ok(())
    }

    fn value(&self, slot: usize) -> VariantValue {
        self.values[slot].to_variant()
    }

    fn get_type(&self) -> SortFieldType {
        T::sort_type()
    }
}

impl<T: NumericSortValue> fmt::Display for NumericComparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "field: {}\tbottom: {:?}\tvalues: {:?}",
            self.field, self.bottom, self.values
        )
    }
}
