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

mod range;

pub use self::range::*;

mod term;

pub use self::term::*;

mod multi;

pub use self::multi::*;

use std::fmt;

use crate::core::search::SortVector;
use crate::error::ErrorKind::IllegalArgument;
use crate::error::Result;

/// Predicate over the embedded sort keys of a document.
///
/// Filters are configured with 1-based field numbers and read
/// `sorts[field_number - 1]`. A slot beyond the end of the vector reads as
/// `SortVector::UNSET`. Filters hold no per-document state and may be
/// shared across scorers and queries.
pub trait EmbeddedFieldFilter: Send + Sync + fmt::Debug {
    /// Returns `true` if the document carrying `sorts` is admitted.
    fn filter(&self, sorts: &SortVector) -> bool;

    /// Highest 1-based field number this filter reads, `0` if none.
    fn max_field_number(&self) -> usize;

    /// `true` if the filter admits everything without looking at keys.
    fn is_empty_filter(&self) -> bool {
        false
    }
}

impl EmbeddedFieldFilter for Box<dyn EmbeddedFieldFilter> {
    fn filter(&self, sorts: &SortVector) -> bool {
        (**self).filter(sorts)
    }

    fn max_field_number(&self) -> usize {
        (**self).max_field_number()
    }

    fn is_empty_filter(&self) -> bool {
        (**self).is_empty_filter()
    }
}

pub(crate) fn check_field_number(field_number: usize) -> Result<()> {
    if field_number == 0 {
        bail!(IllegalArgument(
            "field numbers are 1-based, got 0".to_string()
        ));
    }
    Ok(())
}

pub(crate) fn key_of(sorts: &SortVector, field_number: usize) -> i32 {
    sorts
        .get(field_number - 1)
        .unwrap_or(SortVector::UNSET)
}
