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

use serde;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Sort value exposed by a `FieldComparator` for a retained slot.
///
/// `Null` stands for a missing string value; it orders before every
/// other value of the same field.
#[derive(Debug, Clone, Deserialize)]
pub enum VariantValue {
    Null,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    VString(String),
}

impl VariantValue {
    pub fn is_null(&self) -> bool {
        match self {
            VariantValue::Null => true,
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            VariantValue::Null => 0,
            VariantValue::Byte(_) => 1,
            VariantValue::Short(_) => 2,
            VariantValue::Int(_) => 3,
            VariantValue::Long(_) => 4,
            VariantValue::Float(_) => 5,
            VariantValue::Double(_) => 6,
            VariantValue::VString(_) => 7,
        }
    }

    pub fn get_byte(&self) -> Option<i8> {
        match self {
            VariantValue::Byte(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_short(&self) -> Option<i16> {
        match self {
            VariantValue::Short(s) => Some(*s),
            _ => None,
        }
    }

    pub fn get_int(&self) -> Option<i32> {
        match self {
            VariantValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_long(&self) -> Option<i64> {
        match self {
            VariantValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    pub fn get_float(&self) -> Option<f32> {
        match self {
            VariantValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn get_double(&self) -> Option<f64> {
        match self {
            VariantValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn get_string(&self) -> Option<&str> {
        match self {
            VariantValue::VString(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl Eq for VariantValue {}

impl fmt::Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            VariantValue::Null => write!(f, "null"),
            VariantValue::Byte(b) => write!(f, "{}b", b),
            VariantValue::Short(s) => write!(f, "{}s", s),
            VariantValue::Int(ival) => write!(f, "{}", ival),
            VariantValue::Long(lval) => write!(f, "{}", lval),
            VariantValue::Float(fval) => write!(f, "{:.3}", fval),
            VariantValue::Double(d) => write!(f, "{:.6}", d),
            VariantValue::VString(ref s) => write!(f, "{}", s),
        }
    }
}

impl serde::Serialize for VariantValue {
    fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match *self {
            VariantValue::Null => serializer.serialize_none(),
            VariantValue::Byte(b) => serializer.serialize_i8(b),
            VariantValue::Short(s) => serializer.serialize_i16(s),
            VariantValue::Int(ival) => serializer.serialize_i32(ival),
            VariantValue::Long(lval) => serializer.serialize_i64(lval),
            VariantValue::Float(fval) => serializer.serialize_f32(fval),
            VariantValue::Double(d) => serializer.serialize_f64(d),
            VariantValue::VString(ref s) => serializer.serialize_str(s.as_str()),
        }
    }
}

impl Hash for VariantValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match *self {
            VariantValue::Null => 0u8.hash(state),
            VariantValue::Byte(ref b) => b.hash(state),
            VariantValue::Short(ref s) => s.hash(state),
            VariantValue::Int(ref i) => i.hash(state),
            VariantValue::Long(ref l) => l.hash(state),
            VariantValue::Float(ref f) => f.to_bits().hash(state),
            VariantValue::Double(ref d) => d.to_bits().hash(state),
            VariantValue::VString(ref s) => s.hash(state),
        }
    }
}

impl PartialEq for VariantValue {
    fn eq(&self, other: &VariantValue) -> bool {
        match (self, other) {
            (VariantValue::Null, VariantValue::Null) => true,
            (VariantValue::Byte(v1), VariantValue::Byte(v2)) => v1 == v2,
            (VariantValue::Short(v1), VariantValue::Short(v2)) => v1 == v2,
            (VariantValue::Int(v1), VariantValue::Int(v2)) => v1 == v2,
            (VariantValue::Long(v1), VariantValue::Long(v2)) => v1 == v2,
            (VariantValue::Float(v1), VariantValue::Float(v2)) => v1 == v2,
            (VariantValue::Double(v1), VariantValue::Double(v2)) => v1 == v2,
            (VariantValue::VString(v1), VariantValue::VString(v2)) => v1 == v2,
            (_, _) => false,
        }
    }
}

impl Ord for VariantValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (&VariantValue::Null, &VariantValue::Null) => Ordering::Equal,
            (&VariantValue::Null, _) => Ordering::Less,
            (_, &VariantValue::Null) => Ordering::Greater,
            (&VariantValue::Byte(v1), &VariantValue::Byte(v2)) => v1.cmp(&v2),
            (&VariantValue::Short(v1), &VariantValue::Short(v2)) => v1.cmp(&v2),
            (&VariantValue::Int(v1), &VariantValue::Int(v2)) => v1.cmp(&v2),
            (&VariantValue::Long(v1), &VariantValue::Long(v2)) => v1.cmp(&v2),
            (&VariantValue::Float(v1), &VariantValue::Float(v2)) => {
                v1.partial_cmp(&v2).unwrap_or(Ordering::Equal)
            }
            (&VariantValue::Double(v1), &VariantValue::Double(v2)) => {
                v1.partial_cmp(&v2).unwrap_or(Ordering::Equal)
            }
            (&VariantValue::VString(ref s1), &VariantValue::VString(ref s2)) => s1.cmp(s2),
            // mixed kinds order by variant
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for VariantValue {
    fn partial_cmp(&self, other: &VariantValue) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i8> for VariantValue {
    fn from(val: i8) -> Self {
        VariantValue::Byte(val)
    }
}

impl From<i16> for VariantValue {
    fn from(val: i16) -> Self {
        VariantValue::Short(val)
    }
}

impl From<i32> for VariantValue {
    fn from(val: i32) -> Self {
        VariantValue::Int(val)
    }
}

impl From<i64> for VariantValue {
    fn from(val: i64) -> Self {
        VariantValue::Long(val)
    }
}

impl From<f32> for VariantValue {
    fn from(val: f32) -> Self {
        VariantValue::Float(val)
    }
}

impl From<f64> for VariantValue {
    fn from(val: f64) -> Self {
        VariantValue::Double(val)
    }
}

impl From<String> for VariantValue {
    fn from(val: String) -> Self {
        VariantValue::VString(val)
    }
}

impl From<Option<String>> for VariantValue {
    fn from(val: Option<String>) -> Self {
        match val {
            Some(s) => VariantValue::VString(s),
            None => VariantValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sorts_first() {
        let null = VariantValue::Null;
        let s = VariantValue::VString("a".into());
        assert_eq!(null.cmp(&s), Ordering::Less);
        assert_eq!(s.cmp(&null), Ordering::Greater);
        assert_eq!(null.cmp(&VariantValue::Null), Ordering::Equal);
    }

    #[test]
    fn test_mixed_variants_order_by_kind() {
        let mut values = vec![
            VariantValue::VString("a".into()),
            VariantValue::Int(9),
            VariantValue::Null,
            VariantValue::Double(0.5),
            VariantValue::Int(-2),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                VariantValue::Null,
                VariantValue::Int(-2),
                VariantValue::Int(9),
                VariantValue::Double(0.5),
                VariantValue::VString("a".into()),
            ]
        );
        assert_eq!(
            VariantValue::Long(1).cmp(&VariantValue::Short(5)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(format!("{}", VariantValue::Short(3)), "3s");
        assert_eq!(format!("{}", VariantValue::Int(-7)), "-7");
        assert_eq!(
            serde_json::to_string(&vec![VariantValue::Int(1), VariantValue::Null]).unwrap(),
            "[1,null]"
        );
    }
}
