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
use std::sync::Arc;

use crate::core::search::sort_field::{
    Collator, DocComparator, EmbeddedIntComparator, FieldComparatorEnum, NumericComparator,
    RelevanceComparator, StringOrdValComparator, StringValComparator,
};
use crate::core::search::EmbeddedSortConfig;
use crate::error::ErrorKind::IllegalArgument;
use crate::error::Result;

#[derive(PartialEq, Debug, Clone, Copy, Eq)]
pub enum SortFieldType {
    /// Sort by document score (relevance). Sort values are Float and higher
    /// values are at the front.
    Score,
    /// Sort by document number (index order). Sort values are Integer and
    /// lower values are at the front.
    Doc,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Sort using term values as Strings, by ordinal within a segment.
    /// With a collator the strings are compared in the collator's order.
    String,
    /// Sort using term values as Strings, comparing values directly.
    StringVal,
    /// Sort by an integer key embedded in the documents' sort vector.
    EmbeddedInt,
}

/// Stores information about how to sort documents by terms in an
/// individual field.
#[derive(Clone)]
pub struct SortField {
    field: String,
    field_type: SortFieldType,
    is_reverse: bool,
    collator: Option<Arc<dyn Collator>>,
    // 1-based, only for `SortFieldType::EmbeddedInt`
    field_number: usize,
}

impl SortField {
    pub fn new(field: String, field_type: SortFieldType, is_reverse: bool) -> SortField {
        SortField {
            field,
            field_type,
            is_reverse,
            collator: None,
            field_number: 0,
        }
    }

    pub fn new_score() -> SortField {
        SortField::new(String::new(), SortFieldType::Score, false)
    }

    pub fn new_doc() -> SortField {
        SortField::new(String::new(), SortFieldType::Doc, false)
    }

    /// Sorts a string field in the order of `collator`.
    pub fn with_collator(field: String, collator: Arc<dyn Collator>, is_reverse: bool) -> SortField {
        let mut sort_field = SortField::new(field, SortFieldType::String, is_reverse);
        sort_field.collator = Some(collator);
        sort_field
    }

    /// Sorts by the key at the 1-based `field_number` of the sort vector.
    pub fn new_embedded(field: String, field_number: usize, is_reverse: bool) -> SortField {
        let mut sort_field = SortField::new(field, SortFieldType::EmbeddedInt, is_reverse);
        sort_field.field_number = field_number;
        sort_field
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn field_type(&self) -> SortFieldType {
        self.field_type
    }

    pub fn is_reverse(&self) -> bool {
        self.is_reverse
    }

    pub fn collator(&self) -> Option<&Arc<dyn Collator>> {
        self.collator.as_ref()
    }

    pub fn field_number(&self) -> usize {
        self.field_number
    }

    pub fn needs_scores(&self) -> bool {
        self.field_type == SortFieldType::Score
    }

    /// Returns the comparator to use for sorting.
    pub fn get_comparator(&self, num_hits: usize) -> Result<FieldComparatorEnum> {
        let field = self.field.clone();
        let comparator = match self.field_type {
            SortFieldType::Score => FieldComparatorEnum::Score(RelevanceComparator::new(num_hits)),
            SortFieldType::Doc => FieldComparatorEnum::Doc(DocComparator::new(num_hits)),
            SortFieldType::Byte => FieldComparatorEnum::Byte(NumericComparator::new(num_hits, field)),
            SortFieldType::Short => {
                FieldComparatorEnum::Short(NumericComparator::new(num_hits, field))
            }
            SortFieldType::Int => FieldComparatorEnum::Int(NumericComparator::new(num_hits, field)),
            SortFieldType::Long => FieldComparatorEnum::Long(NumericComparator::new(num_hits, field)),
            SortFieldType::Float => {
                FieldComparatorEnum::Float(NumericComparator::new(num_hits, field))
            }
            SortFieldType::Double => {
                FieldComparatorEnum::Double(NumericComparator::new(num_hits, field))
            }
            SortFieldType::String => match self.collator {
                Some(ref collator) => FieldComparatorEnum::StringVal(
                    StringValComparator::with_collator(num_hits, field, Arc::clone(collator)),
                ),
                None => {
                    FieldComparatorEnum::StringOrd(StringOrdValComparator::new(num_hits, field))
                }
            },
            SortFieldType::StringVal => {
                FieldComparatorEnum::StringVal(StringValComparator::new(num_hits, field))
            }
            SortFieldType::EmbeddedInt => FieldComparatorEnum::EmbeddedInt(
                EmbeddedIntComparator::new(num_hits, field, self.field_number)?,
            ),
        };
        Ok(comparator)
    }

    /// Fails if this field reads a sort vector slot `config` doesn't have.
    pub fn check_field_number(&self, config: &EmbeddedSortConfig) -> Result<()> {
        if self.field_type == SortFieldType::EmbeddedInt {
            config.check_field_number(self.field_number)?;
        } else if self.field_number != 0 {
            bail!(IllegalArgument(format!(
                "field '{}' of type {:?} has a field number",
                self.field, self.field_type
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for SortField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SortField")
            .field("field", &self.field)
            .field("field_type", &self.field_type)
            .field("is_reverse", &self.is_reverse)
            .field("collator", &self.collator)
            .field("field_number", &self.field_number)
            .finish()
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.field_type {
            SortFieldType::Score => write!(f, "<score>")?,
            SortFieldType::Doc => write!(f, "<doc>")?,
            SortFieldType::EmbeddedInt => {
                write!(f, "<embedded: \"{}\" #{}>", self.field, self.field_number)?
            }
            t => write!(f, "<{:?}: \"{}\">", t, self.field)?,
        }
        if self.is_reverse {
            write!(f, "!")?;
        }
        Ok(())
    }
}
