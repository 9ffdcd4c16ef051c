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

use crate::core::search::filter::EmbeddedFieldFilter;
use crate::core::search::SortVector;

/// Conjunction of filters; admits a document only if every child does.
#[derive(Debug, Default)]
pub struct MultiFieldsFilter {
    filters: Vec<Box<dyn EmbeddedFieldFilter>>,
}

impl MultiFieldsFilter {
    pub fn new(filters: Vec<Box<dyn EmbeddedFieldFilter>>) -> MultiFieldsFilter {
        MultiFieldsFilter { filters }
    }

    pub fn add_filter<F: EmbeddedFieldFilter + 'static>(&mut self, filter: F) {
        self.filters.push(Box::new(filter));
    }
}

impl EmbeddedFieldFilter for MultiFieldsFilter {
    fn filter(&self, sorts: &SortVector) -> bool {
        self.filters.iter().all(|f| f.filter(sorts))
    }

    fn max_field_number(&self) -> usize {
        self.filters
            .iter()
            .map(|f| f.max_field_number())
            .max()
            .unwrap_or(0)
    }

    fn is_empty_filter(&self) -> bool {
        self.filters.is_empty()
    }
}
