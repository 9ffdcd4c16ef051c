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

use std::env;
use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;

use crate::error::ErrorKind::IllegalArgument;
use crate::error::Result;

pub const NUM_SORT_KEY: &str = "sortablefield.num";
pub const EPOCH_TIME_KEY: &str = "solbaseEpochTime";
pub const TIMELINESS_BOOSTING_KEY: &str = "timelinessBoosting";
pub const TIMELINESS_FIELD_KEY: &str = "timelinessBoosting.field.position";
pub const BOOST_KEY: &str = "timelinessBoosting.boost";
pub const BOOSTING_FACTOR_KEY: &str = "timelinessBoosting.boostingFactor";

/// Environment variable overriding the number of sortable fields; wins
/// over `sortablefield.num` from any loaded source.
pub const NUM_SORT_ENV: &str = "LUCENE_SORTABLEFIELD_NUM";

pub const DEFAULT_NUM_SORT: usize = 5;
/// 2005/1/1 in minutes.
pub const DEFAULT_EPOCH_TIME: i64 = 18_408_960;
pub const DEFAULT_BOOST: f32 = 5.0;
/// Seven days in minutes.
pub const DEFAULT_BOOSTING_FACTOR: i32 = 10_080;

/// Process-wide settings of the embedded sort pipeline.
///
/// Built once at startup and handed to the scorers and collectors that
/// need it. Every loader is lenient: a missing source or key keeps the
/// default, a malformed value keeps the default and logs a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddedSortConfig {
    /// number of slots in every `SortVector`
    pub num_sort: usize,
    /// epoch, in minutes, that time-valued sort keys are relative to
    pub epoch_time: i64,
    pub timeliness_boosting: bool,
    /// 1-based field number of the timestamp used for boosting
    pub timeliness_field_number: Option<usize>,
    pub boost: f32,
    /// boost decay window, in minutes
    pub boosting_factor: i32,
}

impl Default for EmbeddedSortConfig {
    fn default() -> Self {
        EmbeddedSortConfig {
            num_sort: DEFAULT_NUM_SORT,
            epoch_time: DEFAULT_EPOCH_TIME,
            timeliness_boosting: false,
            timeliness_field_number: None,
            boost: DEFAULT_BOOST,
            boosting_factor: DEFAULT_BOOSTING_FACTOR,
        }
    }
}

impl EmbeddedSortConfig {
    pub fn with_num_sort(num_sort: usize) -> Self {
        let mut config = EmbeddedSortConfig::default();
        if num_sort > 0 {
            config.num_sort = num_sort;
        } else {
            warn!("num_sort must be positive, using default {}", DEFAULT_NUM_SORT);
        }
        config
    }

    /// Loads `key=value` properties text.
    ///
    /// Lines starting with `#` or `!` are comments; `:` is accepted as a
    /// separator too.
    pub fn from_properties(text: &str) -> Self {
        let props = parse_properties(text);
        Self::resolve(|key| {
            props
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    /// Loads a flat JSON object. Values may be numbers, booleans or strings.
    ///
    /// Text that is not a JSON object is a malformed source and yields the
    /// defaults.
    pub fn from_json(text: &str) -> Self {
        let map = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!("sort config is not a JSON object: {}", other);
                return EmbeddedSortConfig::default();
            }
            Err(e) => {
                warn!("malformed sort config JSON, using defaults: {}", e);
                return EmbeddedSortConfig::default();
            }
        };
        Self::resolve(|key| match map.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(v) => Some(v.to_string()),
        })
    }

    /// Loads a properties file (or a JSON file when the extension is
    /// `json`). A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("sort config {:?} not found, using defaults", path);
                return Ok(EmbeddedSortConfig::default());
            }
            Err(e) => return Err(e.into()),
        };
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        Ok(if is_json {
            Self::from_json(&text)
        } else {
            Self::from_properties(&text)
        })
    }

    /// Applies the `LUCENE_SORTABLEFIELD_NUM` environment override, if
    /// present.
    pub fn with_env_override(self) -> Self {
        match env::var(NUM_SORT_ENV) {
            Ok(raw) => self.with_num_sort_override(&raw),
            Err(_) => self,
        }
    }

    /// Replaces `num_sort` with `raw` unless it is malformed. A timeliness
    /// field that no longer fits disables boosting.
    pub fn with_num_sort_override(mut self, raw: &str) -> Self {
        if let Some(num_sort) = parse_num_sort(NUM_SORT_ENV, raw) {
            self.num_sort = num_sort;
            self.validate_timeliness_field();
        }
        self
    }

    /// 0-based slot of the timestamp used for boosting, when boosting is on.
    pub fn timeliness_slot(&self) -> Option<usize> {
        if self.timeliness_boosting {
            self.timeliness_field_number.map(|n| n - 1)
        } else {
            None
        }
    }

    /// Fails if `field_number` is not a 1-based slot of this configuration.
    pub fn check_field_number(&self, field_number: usize) -> Result<()> {
        if field_number == 0 || field_number > self.num_sort {
            bail!(IllegalArgument(format!(
                "field number {} is outside of 1..={}",
                field_number, self.num_sort
            )));
        }
        Ok(())
    }

    fn resolve<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut config = EmbeddedSortConfig::default();

        if let Some(raw) = lookup(NUM_SORT_KEY) {
            if let Some(num_sort) = parse_num_sort(NUM_SORT_KEY, &raw) {
                config.num_sort = num_sort;
            }
        }
        if let Some(raw) = lookup(EPOCH_TIME_KEY) {
            config.epoch_time = parse_or(EPOCH_TIME_KEY, &raw, config.epoch_time);
        }

        // boost settings only matter when boosting is requested
        if lookup(TIMELINESS_BOOSTING_KEY).map_or(false, |v| v.trim() == "true") {
            match lookup(TIMELINESS_FIELD_KEY) {
                Some(raw) => match raw.trim().parse::<usize>() {
                    Ok(n) => {
                        config.timeliness_field_number = Some(n);
                        config.timeliness_boosting = true;
                    }
                    Err(e) => warn!(
                        "malformed {} '{}' ({}), timeliness boosting disabled",
                        TIMELINESS_FIELD_KEY, raw, e
                    ),
                },
                None => debug!(
                    "{} missing, timeliness boosting disabled",
                    TIMELINESS_FIELD_KEY
                ),
            }
            if let Some(raw) = lookup(BOOST_KEY) {
                config.boost = parse_or(BOOST_KEY, &raw, config.boost);
                if !config.boost.is_finite() {
                    warn!("{} must be finite, using default {}", BOOST_KEY, DEFAULT_BOOST);
                    config.boost = DEFAULT_BOOST;
                }
            }
            if let Some(raw) = lookup(BOOSTING_FACTOR_KEY) {
                config.boosting_factor =
                    parse_or(BOOSTING_FACTOR_KEY, &raw, config.boosting_factor);
            }
            config.validate_timeliness_field();
        }
        config
    }

    fn validate_timeliness_field(&mut self) {
        if let Some(n) = self.timeliness_field_number {
            if n == 0 || n > self.num_sort {
                warn!(
                    "timeliness field position {} is outside of 1..={}, boosting disabled",
                    n, self.num_sort
                );
                self.timeliness_field_number = None;
                self.timeliness_boosting = false;
            }
        }
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: ::std::str::FromStr + ::std::fmt::Display,
    T::Err: ::std::fmt::Display,
{
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(e) => {
            warn!("malformed {} '{}' ({}), using default {}", key, raw, e, default);
            default
        }
    }
}

fn parse_num_sort(key: &str, raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        Ok(_) => {
            warn!("{} must be positive, keeping {}", key, DEFAULT_NUM_SORT);
            None
        }
        Err(e) => {
            warn!("malformed {} '{}' ({}), keeping default", key, raw, e);
            None
        }
    }
}

fn parse_properties(text: &str) -> Vec<(String, String)> {
    let mut props = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        match line.find(|c| c == '=' || c == ':') {
            Some(pos) => {
                let key = line[..pos].trim();
                let value = line[pos + 1..].trim();
                props.push((key.to_string(), value.to_string()));
            }
            None => props.push((line.to_string(), String::new())),
        }
    }
    props
}
