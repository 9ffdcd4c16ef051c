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

/// Admits documents whose key equals `term`.
///
/// `SortVector::UNSET` on either side means the field does not apply: a
/// document with no key and a filter with no term both admit everything.
/// Composite filters rely on this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFieldFilter {
    field_number: usize,
    term: i32,
}

impl TermFieldFilter {
    pub fn new(term: i32, field_number: usize) -> Result<TermFieldFilter> {
        check_field_number(field_number)?;
        Ok(TermFieldFilter { field_number, term })
    }

    pub fn field_number(&self) -> usize {
        self.field_number
    }

    pub fn term(&self) -> i32 {
        self.term
    }
}

impl EmbeddedFieldFilter for TermFieldFilter {
    fn filter(&self, sorts: &SortVector) -> bool {
        let key = key_of(sorts, self.field_number);
        if key == SortVector::UNSET || self.term == SortVector::UNSET {
            return true;
        }
        key == self.term
    }

    fn max_field_number(&self) -> usize {
        self.field_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let filter = TermFieldFilter::new(7, 1).unwrap();
        assert!(filter.filter(&SortVector::from_slice(&[7, 3])));
        assert!(!filter.filter(&SortVector::from_slice(&[8, 3])));
        assert!(!filter.filter(&SortVector::from_slice(&[0, 3])));
    }

    // Unset keys admit unconditionally instead of being rejected. This is
    // deliberate: composite filters over partially populated vectors
    // depend on it.
    #[test]
    fn test_unset_is_dont_care() {
        let filter = TermFieldFilter::new(7, 2).unwrap();
        assert!(filter.filter(&SortVector::from_slice(&[7, -1])));
        assert!(filter.filter(&SortVector::from_slice(&[0, -1])));

        let any = TermFieldFilter::new(-1, 2).unwrap();
        for key in &[-5, -1, 0, 7, 1000] {
            assert!(any.filter(&SortVector::from_slice(&[0, *key])));
        }

        // missing slots read as unset as well
        let far = TermFieldFilter::new(3, 5).unwrap();
        assert!(far.filter(&SortVector::from_slice(&[1, 2])));
    }

    #[test]
    fn test_other_negative_keys_compare_normally() {
        let filter = TermFieldFilter::new(-2, 1).unwrap();
        assert!(filter.filter(&SortVector::from_slice(&[-2])));
        assert!(!filter.filter(&SortVector::from_slice(&[2])));
    }
}
