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

use smallvec::SmallVec;
use std::fmt;
use std::ops::Index;

/// Sort keys per document are few; this keeps them inline.
const INLINE_SORT_KEYS: usize = 8;

/// Fixed-length sequence of pre-extracted sort keys attached to the
/// document a `Scorer` is positioned on, one slot per sortable field.
///
/// Slots are 0-based here; filters and embedded comparators are configured
/// with 1-based field numbers and read `vector[field_number - 1]`.
/// `SortVector::UNSET` marks a slot with no value for the document.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SortVector {
    keys: SmallVec<[i32; INLINE_SORT_KEYS]>,
}

impl SortVector {
    pub const UNSET: i32 = -1;

    /// Creates a vector of `num_sort` unset slots.
    pub fn new(num_sort: usize) -> SortVector {
        SortVector {
            keys: SmallVec::from_elem(SortVector::UNSET, num_sort),
        }
    }

    pub fn from_slice(keys: &[i32]) -> SortVector {
        SortVector {
            keys: SmallVec::from_slice(keys),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<i32> {
        self.keys.get(slot).cloned()
    }

    /// Returns `true` if the slot exists and holds a value.
    pub fn is_set(&self, slot: usize) -> bool {
        self.get(slot).map_or(false, |v| v != SortVector::UNSET)
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.keys
    }

    /// Overwrites all slots; `keys` must have the vector's length.
    pub fn copy_from_slice(&mut self, keys: &[i32]) {
        self.keys.copy_from_slice(keys);
    }

    /// Copies `other` into this vector, reusing its storage.
    pub fn copy_from(&mut self, other: &SortVector) {
        if self.keys.len() == other.keys.len() {
            self.keys.copy_from_slice(&other.keys);
        } else {
            self.keys.clear();
            self.keys.extend_from_slice(&other.keys);
        }
    }

    /// Marks every slot unset.
    pub fn reset(&mut self) {
        for key in self.keys.iter_mut() {
            *key = SortVector::UNSET;
        }
    }
}

impl Index<usize> for SortVector {
    type Output = i32;

    fn index(&self, slot: usize) -> &i32 {
        &self.keys[slot]
    }
}

impl<'a> From<&'a [i32]> for SortVector {
    fn from(keys: &'a [i32]) -> SortVector {
        SortVector::from_slice(keys)
    }
}

impl fmt::Debug for SortVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.keys.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vector_is_unset() {
        let vector = SortVector::new(5);
        assert_eq!(vector.len(), 5);
        assert!(vector.as_slice().iter().all(|k| *k == SortVector::UNSET));
        assert!(!vector.is_set(0));
        assert!(!vector.is_set(7));
    }

    #[test]
    fn test_copy_and_reset() {
        let mut vector = SortVector::new(3);
        vector.copy_from_slice(&[10, -1, 3]);
        assert_eq!(vector[0], 10);
        assert!(vector.is_set(2));
        assert!(!vector.is_set(1));

        let mut other = SortVector::new(0);
        other.copy_from(&vector);
        assert_eq!(other, vector);

        vector.reset();
        assert_eq!(vector.as_slice(), &[-1, -1, -1]);
        assert_eq!(other.get(0), Some(10));
        assert_eq!(other.get(3), None);
    }
}
