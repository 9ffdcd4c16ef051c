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

use crate::core::search::filter::{check_field_number, key_of, EmbeddedFieldFilter};
use crate::core::search::SortVector;
use crate::error::Result;

/// Admits documents whose key lies in `[start, end]`, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFieldFilter {
    field_number: usize,
    start: i32,
    end: i32,
}

impl RangeFieldFilter {
    pub fn new(start: i32, end: i32, field_number: usize) -> Result<RangeFieldFilter> {
        check_field_number(field_number)?;
        Ok(RangeFieldFilter {
            field_number,
            start,
            end,
        })
    }

    pub fn field_number(&self) -> usize {
        self.field_number
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }
}

impl EmbeddedFieldFilter for RangeFieldFilter {
    fn filter(&self, sorts: &SortVector) -> bool {
        let key = key_of(sorts, self.field_number);
        key >= self.start && key <= self.end
    }

    fn max_field_number(&self) -> usize {
        self.field_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::i32;

    fn admits(filter: &RangeFieldFilter, key: i32) -> bool {
        filter.filter(&SortVector::from_slice(&[0, key]))
    }

    #[test]
    fn test_inclusive_bounds() {
        let filter = RangeFieldFilter::new(5, 10, 2).unwrap();
        for key in 0..15 {
            assert_eq!(admits(&filter, key), key >= 5 && key <= 10, "key {}", key);
        }
        assert!(admits(&filter, 5));
        assert!(admits(&filter, 10));
    }

    #[test]
    fn test_extreme_bounds() {
        let filter = RangeFieldFilter::new(i32::MIN, i32::MAX, 2).unwrap();
        assert!(admits(&filter, i32::MIN));
        assert!(admits(&filter, i32::MAX));
        assert!(admits(&filter, -1));

        let inverted = RangeFieldFilter::new(10, 5, 2).unwrap();
        assert!(!admits(&inverted, 7));
    }

    #[test]
    fn test_unset_key_is_compared_as_is() {
        let filter = RangeFieldFilter::new(-1, 3, 1).unwrap();
        assert!(filter.filter(&SortVector::from_slice(&[-1])));

        // a slot past the end reads as unset
        let far = RangeFieldFilter::new(0, 3, 4).unwrap();
        assert!(!far.filter(&SortVector::from_slice(&[1])));
    }

    #[test]
    fn test_zero_field_number() {
        assert!(RangeFieldFilter::new(0, 1, 0).is_err());
    }
}
