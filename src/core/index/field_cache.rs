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

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::util::DocId;
use crate::error::ErrorKind::IllegalArgument;
use crate::error::Result;

/// Ordinal view of a string field for one segment.
///
/// `lookup` holds the distinct values in ascending order, with the missing
/// value at ord `0`; `order[doc]` is the ord of the document's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringIndex {
    pub lookup: Vec<Option<String>>,
    pub order: Vec<usize>,
}

impl StringIndex {
    pub fn new(lookup: Vec<Option<String>>, order: Vec<usize>) -> StringIndex {
        debug_assert!(!lookup.is_empty() && lookup[0].is_none());
        StringIndex { lookup, order }
    }

    pub fn from_values(values: &[Option<String>]) -> StringIndex {
        let mut distinct: Vec<&String> = values.iter().filter_map(|v| v.as_ref()).collect();
        distinct.sort();
        distinct.dedup();

        let mut lookup = Vec::with_capacity(distinct.len() + 1);
        lookup.push(None);
        lookup.extend(distinct.into_iter().map(|s| Some(s.clone())));

        let order = values
            .iter()
            .map(|v| match v {
                // lookup[1..] is sorted and holds every present value
                Some(s) => lookup[1..]
                    .binary_search_by(|entry| {
                        entry.as_ref().map(String::as_str).cmp(&Some(s.as_str()))
                    })
                    .map(|i| i + 1)
                    .unwrap_or(0),
                None => 0,
            })
            .collect();

        StringIndex { lookup, order }
    }
}

/// Segment-scoped loader of raw per-document values, used by the
/// cache-backed comparators when they move to a new segment.
///
/// Every returned array is indexed by segment-local doc id.
pub trait FieldCache {
    fn get_bytes(&self, field: &str) -> Result<Arc<Vec<i8>>>;

    fn get_shorts(&self, field: &str) -> Result<Arc<Vec<i16>>>;

    fn get_ints(&self, field: &str) -> Result<Arc<Vec<i32>>>;

    fn get_longs(&self, field: &str) -> Result<Arc<Vec<i64>>>;

    fn get_floats(&self, field: &str) -> Result<Arc<Vec<f32>>>;

    fn get_doubles(&self, field: &str) -> Result<Arc<Vec<f64>>>;

    fn get_strings(&self, field: &str) -> Result<Arc<Vec<Option<String>>>>;

    fn get_string_index(&self, field: &str) -> Result<Arc<StringIndex>>;
}

enum CachedField {
    Bytes(Arc<Vec<i8>>),
    Shorts(Arc<Vec<i16>>),
    Ints(Arc<Vec<i32>>),
    Longs(Arc<Vec<i64>>),
    Floats(Arc<Vec<f32>>),
    Doubles(Arc<Vec<f64>>),
    Strings(Arc<Vec<Option<String>>>, Arc<StringIndex>),
}

impl CachedField {
    fn type_name(&self) -> &'static str {
        match self {
            CachedField::Bytes(_) => "byte",
            CachedField::Shorts(_) => "short",
            CachedField::Ints(_) => "int",
            CachedField::Longs(_) => "long",
            CachedField::Floats(_) => "float",
            CachedField::Doubles(_) => "double",
            CachedField::Strings(_, _) => "string",
        }
    }
}

/// In-memory `FieldCache` for a single segment.
///
/// Fields that were never added read as all-zero (numeric) or all-missing
/// (string) arrays of `max_doc` entries.
pub struct MemoryFieldCache {
    max_doc: DocId,
    fields: HashMap<String, CachedField>,
}

macro_rules! numeric_accessor {
    ($get:ident, $add:ident, $variant:ident, $ty:ty) => {
        pub fn $add(&mut self, field: &str, values: Vec<$ty>) -> Result<()> {
            self.check_len(field, values.len())?;
            self.fields
                .insert(field.to_string(), CachedField::$variant(Arc::new(values)));
            Ok(())
        }

        fn $get(&self, field: &str) -> Result<Arc<Vec<$ty>>> {
            match self.fields.get(field) {
                Some(CachedField::$variant(values)) => Ok(Arc::clone(values)),
                Some(other) => bail!(IllegalArgument(format!(
                    "field '{}' is cached as {} values",
                    field,
                    other.type_name()
                ))),
                None => Ok(Arc::new(vec![<$ty>::default(); self.max_doc as usize])),
            }
        }
    };
}

impl MemoryFieldCache {
    pub fn new(max_doc: DocId) -> MemoryFieldCache {
        MemoryFieldCache {
            max_doc: max_doc.max(0),
            fields: HashMap::new(),
        }
    }

    pub fn max_doc(&self) -> DocId {
        self.max_doc
    }

    fn check_len(&self, field: &str, len: usize) -> Result<()> {
        if len != self.max_doc as usize {
            bail!(IllegalArgument(format!(
                "field '{}' has {} values but the segment holds {} docs",
                field, len, self.max_doc
            )));
        }
        Ok(())
    }

    numeric_accessor!(bytes, add_bytes, Bytes, i8);
    numeric_accessor!(shorts, add_shorts, Shorts, i16);
    numeric_accessor!(ints, add_ints, Ints, i32);
    numeric_accessor!(longs, add_longs, Longs, i64);
    numeric_accessor!(floats, add_floats, Floats, f32);
    numeric_accessor!(doubles, add_doubles, Doubles, f64);

    pub fn add_strings(&mut self, field: &str, values: Vec<Option<String>>) -> Result<()> {
        self.check_len(field, values.len())?;
        let index = StringIndex::from_values(&values);
        self.fields.insert(
            field.to_string(),
            CachedField::Strings(Arc::new(values), Arc::new(index)),
        );
        Ok(())
    }

    fn strings(&self, field: &str) -> Result<(Arc<Vec<Option<String>>>, Arc<StringIndex>)> {
        match self.fields.get(field) {
            Some(CachedField::Strings(values, index)) => {
                Ok((Arc::clone(values), Arc::clone(index)))
            }
            Some(other) => bail!(IllegalArgument(format!(
                "field '{}' is cached as {} values",
                field,
                other.type_name()
            ))),
            None => {
                let values = vec![None; self.max_doc as usize];
                let index = StringIndex::from_values(&values);
                Ok((Arc::new(values), Arc::new(index)))
            }
        }
    }
}

impl FieldCache for MemoryFieldCache {
    fn get_bytes(&self, field: &str) -> Result<Arc<Vec<i8>>> {
        self.bytes(field)
    }

    fn get_shorts(&self, field: &str) -> Result<Arc<Vec<i16>>> {
        self.shorts(field)
    }

    fn get_ints(&self, field: &str) -> Result<Arc<Vec<i32>>> {
        self.ints(field)
    }

    fn get_longs(&self, field: &str) -> Result<Arc<Vec<i64>>> {
        self.longs(field)
    }

    fn get_floats(&self, field: &str) -> Result<Arc<Vec<f32>>> {
        self.floats(field)
    }

    fn get_doubles(&self, field: &str) -> Result<Arc<Vec<f64>>> {
        self.doubles(field)
    }

    fn get_strings(&self, field: &str) -> Result<Arc<Vec<Option<String>>>> {
        self.strings(field).map(|(values, _)| values)
    }

    fn get_string_index(&self, field: &str) -> Result<Arc<StringIndex>> {
        self.strings(field).map(|(_, index)| index)
    }
}

impl fmt::Debug for MemoryFieldCache {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut fields: Vec<_> = self
            .fields
            .iter()
            .map(|(name, v)| format!("{}:{}", name, v.type_name()))
            .collect();
        fields.sort();
        write!(f, "MemoryFieldCache(max_doc: {}, fields: {:?})", self.max_doc, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(String::from)).collect()
    }

    #[test]
    fn test_string_index() {
        let index = StringIndex::from_values(&strings(&[
            Some("pear"),
            None,
            Some("apple"),
            Some("pear"),
        ]));

        assert_eq!(
            index.lookup,
            vec![None, Some("apple".to_string()), Some("pear".to_string())]
        );
        assert_eq!(index.order, vec![2, 0, 1, 2]);
    }

    #[test]
    fn test_missing_field_defaults() {
        let cache = MemoryFieldCache::new(3);
        assert_eq!(*cache.get_ints("price").unwrap(), vec![0, 0, 0]);
        assert_eq!(*cache.get_strings("title").unwrap(), vec![None, None, None]);
        assert_eq!(cache.get_string_index("title").unwrap().lookup, vec![None]);
    }

    #[test]
    fn test_type_and_length_checks() {
        let mut cache = MemoryFieldCache::new(2);
        assert!(cache.add_longs("ts", vec![1]).is_err());
        cache.add_longs("ts", vec![1, 2]).unwrap();
        assert_eq!(*cache.get_longs("ts").unwrap(), vec![1, 2]);
        assert!(cache.get_ints("ts").is_err());
    }
}
