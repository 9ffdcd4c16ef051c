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

/// Describes how the score of a document was computed.
///
/// Rendered with `Display` as an indented tree, one `value = description`
/// line per node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    is_match: bool,
    value: f32,
    description: String,
    details: Vec<Explanation>,
}

impl Explanation {
    /// A non-matching explanation always carries the value `0`.
    pub fn new(
        is_match: bool,
        value: f32,
        description: String,
        details: Vec<Explanation>,
    ) -> Explanation {
        Explanation {
            is_match,
            value: if is_match { value } else { 0f32 },
            description,
            details,
        }
    }

    pub fn matched(value: f32, description: String) -> Explanation {
        Explanation::new(true, value, description, vec![])
    }

    pub fn no_match(description: String) -> Explanation {
        Explanation::new(false, 0f32, description, vec![])
    }

    pub fn add_detail(&mut self, detail: Explanation) {
        self.details.push(detail);
    }

    pub fn is_match(&self) -> bool {
        self.is_match
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &[Explanation] {
        &self.details
    }

    fn write_tree(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{} = {}",
            "",
            self.value,
            self.description,
            indent = depth * 2
        )?;
        for detail in &self.details {
            detail.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_tree(f, 0)
    }
}
