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
use crate::core::search::scorer::{ScoreCache, Scorer};
use crate::core::search::sort_field::{
    EmbeddedIntComparator, NumericComparator, SortFieldType, StringOrdValComparator,
    StringValComparator,
};
use crate::core::util::{DocId, VariantValue};
use crate::error::ErrorKind::{IllegalArgument, IllegalState};
use crate::error::Result;

/// Expert: a FieldComparator compares hits so as to determine their
/// sort order when collecting the top results with `TopFieldCollector`.
/// The concrete comparators here correspond to the `SortFieldType`s.
///
/// Whenever a hit is competitive, it's enrolled into a virtual slot, which
/// is an int ranging from 0 to num_hits-1. The following functions need to
/// be implemented:
/// * `compare()` Compare a hit at 'slot a' with hit 'slot b'.
/// * `set_bottom()` Called by `FieldValueHitQueue` to notify the comparator
///   of the current weakest ("bottom") slot. Note that this slot may not
///   hold the weakest value according to your comparator, in cases where
///   your comparator is not the primary one (ie, is only used to break
///   ties from the comparators before it).
/// * `compare_bottom()` Compare a new hit (docID) against the "weakest"
///   (bottom) entry in the queue.
/// * `copy()` Installs a new hit into the priority queue.
/// * `set_next_reader()` Invoked when the search is switching to the next
///   segment. You may need to update internal state of the comparator, for
///   example retrieving new values from the `FieldCache`.
/// * `value()` Return the sort value stored in the specified slot. This is
///   only called at the end of the search, in order to populate
///   `FieldDoc::fields` when returning the top results.
///
/// `compare_bottom` and `copy` receive the scorer positioned on `doc`, which
/// lets comparators read the score or the embedded sort keys of the hit.
pub trait FieldComparator: fmt::Display {
    fn compare(&self, slot1: usize, slot2: usize) -> Ordering;

    fn compare_bottom<S: Scorer + ?Sized>(&mut self, doc: DocId, scorer: &mut S)
        -> Result<Ordering>;

    fn copy<S: Scorer + ?Sized>(&mut self, slot: usize, doc: DocId, scorer: &mut S)
        -> Result<()>;

    fn set_bottom(&mut self, slot: usize) -> Result<()>;

    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()>;

    fn value(&self, slot: usize) -> VariantValue;

    fn get_type(&self) -> SortFieldType;
}

pub(crate) fn check_slot(slot: usize, num_hits: usize) -> Result<()> {
    if slot >= num_hits {
        bail!(IllegalArgument(format!(
            "slot {} is out of bounds: [0-{})",
            slot, num_hits
        )));
    }
    Ok(())
}

/// Reads the segment-local value of `doc` from a per-segment array.
pub(crate) fn doc_value<T: Clone>(values: Option<&[T]>, doc: DocId) -> Result<T> {
    match values {
        Some(values) => {
            if doc < 0 || doc as usize >= values.len() {
                bail!(IllegalArgument(format!(
                    "doc {} is out of bounds: [0-{})",
                    doc,
                    values.len()
                )));
            }
            Ok(values[doc as usize].clone())
        }
        None => bail!(IllegalState(
            "no segment values, set_next_reader was not called".into()
        )),
    }
}

pub(crate) fn bottom_value<T: Clone>(bottom: &Option<T>) -> Result<T> {
    match bottom {
        Some(v) => Ok(v.clone()),
        None => bail!(IllegalState(
            "compare_bottom called before set_bottom".into()
        )),
    }
}

/// Null sorts before every value; two nulls are equal.
pub(crate) fn compare_nullable<T, F>(a: Option<&T>, b: Option<&T>, cmp: F) -> Ordering
where
    T: ?Sized,
    F: FnOnce(&T, &T) -> Ordering,
{
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => cmp(a, b),
    }
}

pub enum FieldComparatorEnum {
    Score(RelevanceComparator),
    Doc(DocComparator),
    Byte(NumericComparator<i8>),
    Short(NumericComparator<i16>),
    Int(NumericComparator<i32>),
    Long(NumericComparator<i64>),
    Float(NumericComparator<f32>),
    Double(NumericComparator<f64>),
    StringOrd(StringOrdValComparator),
    StringVal(StringValComparator),
    EmbeddedInt(EmbeddedIntComparator),
}

macro_rules! dispatch {
    ($self:ident, $c:ident => $e:expr) => {
        match $self {
            FieldComparatorEnum::Score($c) => $e,
            FieldComparatorEnum::Doc($c) => $e,
            FieldComparatorEnum::Byte($c) => $e,
            FieldComparatorEnum::Short($c) => $e,
            FieldComparatorEnum::Int($c) => $e,
            FieldComparatorEnum::Long($c) => $e,
            FieldComparatorEnum::Float($c) => $e,
            FieldComparatorEnum::Double($c) => $e,
            FieldComparatorEnum::StringOrd($c) => $e,
            FieldComparatorEnum::StringVal($c) => $e,
            FieldComparatorEnum::EmbeddedInt($c) => $e,
        }
    };
}

impl FieldComparator for FieldComparatorEnum {
    fn compare(&self, slot1: usize, slot2: usize) -> Ordering {
        dispatch!(self, c => c.compare(slot1, slot2))
    }

    fn compare_bottom<S: Scorer + ?Sized>(
        &mut self,
        doc: DocId,
        scorer: &mut S,
    ) -> Result<Ordering> {
        dispatch!(self, c => c.compare_bottom(doc, scorer))
    }

    fn copy<S: Scorer + ?Sized>(&mut self, slot: usize, doc: DocId, scorer: &mut S) -> Result<()> {
        dispatch!(self, c => c.copy(slot, doc, scorer))
    }

    fn set_bottom(&mut self, slot: usize) -> Result<()> {
        dispatch!(self, c => c.set_bottom(slot))
    }

    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()> {
        dispatch!(self, c => c.set_next_reader(reader))
    }

    fn value(&self, slot: usize) -> VariantValue {
        dispatch!(self, c => c.value(slot))
    }

    fn get_type(&self) -> SortFieldType {
        dispatch!(self, c => c.get_type())
    }
}

impl fmt::Display for FieldComparatorEnum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        dispatch!(self, c => write!(f, "FieldComparatorEnum({})", c))
    }
}

/// Sorts by descending relevance.
///
/// Scores are requested from the scorer through a `ScoreCache`, so a hit
/// that is both compared and copied is scored once.
pub struct RelevanceComparator {
    scores: Vec<f32>,
    bottom: Option<f32>,
    cache: ScoreCache,
}

impl RelevanceComparator {
    pub fn new(num_hits: usize) -> RelevanceComparator {
        RelevanceComparator {
            scores: vec![0f32; num_hits],
            bottom: None,
            cache: ScoreCache::default(),
        }
    }
}

impl FieldComparator for RelevanceComparator {
    fn compare(&self, slot1: usize, slot2: usize) -> Ordering {
        self.scores[slot2]
            .partial_cmp(&self.scores[slot1])
            .unwrap_or(Ordering::Equal)
    }

    fn compare_bottom<S: Scorer + ?Sized>(
        &mut self,
        _doc: DocId,
        scorer: &mut S,
    ) -> Result<Ordering> {
        let bottom = bottom_value(&self.bottom)?;
        let score = self.cache.score(scorer)?;
        Ok(score.partial_cmp(&bottom).unwrap_or(Ordering::Equal))
    }

    fn copy<S: Scorer + ?Sized>(&mut self, slot: usize, _doc: DocId, scorer: &mut S) -> Result<()> {
        check_slot(slot, self.scores.len())?;
        self.scores[slot] = self.cache.score(scorer)?;
        Ok(())
    }

    fn set_bottom(&mut self, slot: usize) -> Result<()> {
        check_slot(slot, self.scores.len())?;
        self.bottom = Some(self.scores[slot]);
        Ok(())
    }

    fn set_next_reader(&mut self, _reader: &LeafReaderContext<'_>) -> Result<()> {
        self.cache.clear();
        Ok(())
    }

    fn value(&self, slot: usize) -> VariantValue {
        VariantValue::Float(self.scores[slot])
    }

    fn get_type(&self) -> SortFieldType {
        SortFieldType::Score
    }
}

impl fmt::Display for RelevanceComparator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bottom: {:?}\tscores: {:?}", self.bottom, self.scores)
    }
}

/// Sorts by ascending docID
pub struct DocComparator {
    doc_ids: Vec<DocId>,
    bottom: Option<DocId>,
    doc_base: DocId,
}

impl DocComparator {
    pub fn new(num_hits: usize) -> DocComparator {
        DocComparator {
            doc_ids: vec![0; num_hits],
            bottom: None,
            doc_base: 0,
        }
    }
}

impl FieldComparator for DocComparator {
    fn compare(&self, slot1: usize, slot2: usize) -> Ordering {
        self.doc_ids[slot1].cmp(&self.doc_ids[slot2])
    }

    fn compare_bottom<S: Scorer + ?Sized>(
        &mut self,
        doc: DocId,
        _scorer: &mut S,
    ) -> Result<Ordering> {
        let bottom = bottom_value(&self.bottom)?;
        Ok(bottom.cmp(&(self.doc_base + doc)))
    }

    fn copy<S: Scorer + ?Sized>(&mut self, slot: usize, doc: DocId, _scorer: &mut S) -> Result<()> {
        check_slot(slot, self.doc_ids.len())?;
        self.doc_ids[slot] = self.doc_base + doc;
        Ok(())
    }

    fn set_bottom(&mut self, slot: usize) -> Result<()> {
        check_slot(slot, self.doc_ids.len())?;
        self.bottom = Some(self.doc_ids[slot]);
        Ok(())
    }

    fn set_next_reader(&mut self, reader: &LeafReaderContext<'_>) -> Result<()> {
        self.doc_base = reader.doc_base;
        Ok(())
    }

    fn value(&self, slot: usize) -> VariantValue {
        VariantValue::Int(self.doc_ids[slot])
    }

    fn get_type(&self) -> SortFieldType {
        SortFieldType::Doc
    }
}

impl fmt::Display for DocComparator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "bottom: {:?}\tdoc_base: {:?}\tdoc_ids: {:?}",
            self.bottom, self.doc_base, self.doc_ids
        )
    }
}
