use std::fmt;
use std::mem::size_of;

use ahash::AHashSet;

use crate::engine::core::block::block_result::BlockResult;
use crate::engine::core::column::render::{append_float, try_parse_float64};
use crate::engine::core::pipe::group_key::marshal_bytes;
use crate::engine::errors::QueryError;

/// A named aggregation from the stats pipe: `count`, `uniq`, `sum`, `max`,
/// `min` or `avg`.
#[derive(Clone, Debug, PartialEq)]
pub enum StatsFunc {
    Count { fields: Vec<String> },
    Uniq { fields: Vec<String> },
    Sum { field: String },
    Max { field: String },
    Min { field: String },
    Avg { field: String },
}

impl StatsFunc {
    /// Builds a stats func from its name and argument fields, rejecting
    /// unknown names and wrong arities.
    pub fn parse(name: &str, fields: &[&str]) -> Result<Self, QueryError> {
        let owned = |fields: &[&str]| fields.iter().map(|f| f.to_string()).collect::<Vec<_>>();
        let single = |fields: &[&str]| -> Result<String, QueryError> {
            if fields.len() != 1 {
                return Err(QueryError::StatsFuncArity {
                    func: name.to_string(),
                    got: fields.len(),
                });
            }
            Ok(fields[0].to_string())
        };
        match name {
            "count" => Ok(Self::Count {
                fields: owned(fields),
            }),
            "uniq" => {
                if fields.is_empty() {
                    return Err(QueryError::StatsFuncArity {
                        func: name.to_string(),
                        got: 0,
                    });
                }
                Ok(Self::Uniq {
                    fields: owned(fields),
                })
            }
            "sum" => Ok(Self::Sum {
                field: single(fields)?,
            }),
            "max" => Ok(Self::Max {
                field: single(fields)?,
            }),
            "min" => Ok(Self::Min {
                field: single(fields)?,
            }),
            "avg" => Ok(Self::Avg {
                field: single(fields)?,
            }),
            other => Err(QueryError::UnknownStatsFunc(other.to_string())),
        }
    }

    /// Fields this func reads, so the planner can narrow column fetching.
    pub fn needed_fields(&self) -> &[String] {
        match self {
            StatsFunc::Count { fields } | StatsFunc::Uniq { fields } => fields,
            StatsFunc::Sum { field }
            | StatsFunc::Max { field }
            | StatsFunc::Min { field }
            | StatsFunc::Avg { field } => std::slice::from_ref(field),
        }
    }

    /// Creates the per-group processor plus its initial state size in bytes.
    pub fn new_processor(&self) -> (StatsProcessor, i64) {
        let p = match self {
            StatsFunc::Count { fields } => StatsProcessor::Count(CountProcessor {
                fields: fields.clone(),
                count: 0,
            }),
            StatsFunc::Uniq { fields } => StatsProcessor::Uniq(UniqProcessor {
                fields: fields.clone(),
                seen: AHashSet::new(),
            }),
            StatsFunc::Sum { field } => StatsProcessor::Sum(SumProcessor {
                field: field.clone(),
                sum: 0.0,
                count: 0,
            }),
            StatsFunc::Max { field } => StatsProcessor::Max(MaxProcessor {
                field: field.clone(),
                max_num: None,
                max_str: None,
            }),
            StatsFunc::Min { field } => StatsProcessor::Min(MinProcessor {
                field: field.clone(),
                min_num: None,
                min_str: None,
            }),
            StatsFunc::Avg { field } => StatsProcessor::Avg(AvgProcessor {
                field: field.clone(),
                sum: 0.0,
                count: 0,
            }),
        };
        let state_size = size_of::<StatsProcessor>() as i64
            + self
                .needed_fields()
                .iter()
                .map(|f| f.len() as i64)
                .sum::<i64>();
        (p, state_size)
    }
}

impl fmt::Display for StatsFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, fields): (&str, &[String]) = match self {
            StatsFunc::Count { fields } => ("count", fields),
            StatsFunc::Uniq { fields } => ("uniq", fields),
            StatsFunc::Sum { field } => ("sum", std::slice::from_ref(field)),
            StatsFunc::Max { field } => ("max", std::slice::from_ref(field)),
            StatsFunc::Min { field } => ("min", std::slice::from_ref(field)),
            StatsFunc::Avg { field } => ("avg", std::slice::from_ref(field)),
        };
        write!(f, "{name}({})", fields.join(", "))
    }
}

/// Per-group mutable aggregate state. All methods are called from a single
/// worker at a time; merge is associative and commutative.
#[derive(Clone, Debug, PartialEq)]
pub enum StatsProcessor {
    Count(CountProcessor),
    Uniq(UniqProcessor),
    Sum(SumProcessor),
    Max(MaxProcessor),
    Min(MinProcessor),
    Avg(AvgProcessor),
}

impl StatsProcessor {
    /// Updates against every row of `br`, returning the state size delta.
    pub fn update_for_all_rows(&mut self, br: &BlockResult) -> i64 {
        let mut delta = 0;
        for row in 0..br.row_count() {
            delta += self.update_for_row(br, row);
        }
        delta
    }

    /// Updates against one row of `br`, returning the state size delta.
    pub fn update_for_row(&mut self, br: &BlockResult, row: usize) -> i64 {
        match self {
            StatsProcessor::Count(p) => p.update(br, row),
            StatsProcessor::Uniq(p) => p.update(br, row),
            StatsProcessor::Sum(p) => p.update(br, row),
            StatsProcessor::Max(p) => p.update(br, row),
            StatsProcessor::Min(p) => p.update(br, row),
            StatsProcessor::Avg(p) => p.update(br, row),
        }
    }

    /// Merges another processor of the same variant into this one.
    pub fn merge_state(&mut self, other: &StatsProcessor) {
        match (self, other) {
            (StatsProcessor::Count(a), StatsProcessor::Count(b)) => a.merge(b),
            (StatsProcessor::Uniq(a), StatsProcessor::Uniq(b)) => a.merge(b),
            (StatsProcessor::Sum(a), StatsProcessor::Sum(b)) => a.merge(b),
            (StatsProcessor::Max(a), StatsProcessor::Max(b)) => a.merge(b),
            (StatsProcessor::Min(a), StatsProcessor::Min(b)) => a.merge(b),
            (StatsProcessor::Avg(a), StatsProcessor::Avg(b)) => a.merge(b),
            _ => {}
        }
    }

    /// Final textual cell for the output block.
    pub fn finalize(&self) -> String {
        match self {
            StatsProcessor::Count(p) => p.count.to_string(),
            StatsProcessor::Uniq(p) => p.seen.len().to_string(),
            StatsProcessor::Sum(p) => {
                let mut out = String::new();
                append_float(&mut out, p.sum);
                out
            }
            StatsProcessor::Max(p) => p.finalize(),
            StatsProcessor::Min(p) => p.finalize(),
            StatsProcessor::Avg(p) => {
                let mut out = String::new();
                if p.count == 0 {
                    out.push('0');
                } else {
                    append_float(&mut out, p.sum / p.count as f64);
                }
                out
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountProcessor {
    fields: Vec<String>,
    count: u64,
}

impl CountProcessor {
    fn update(&mut self, br: &BlockResult, row: usize) -> i64 {
        if self.fields.is_empty() {
            self.count += 1;
            return 0;
        }
        if self
            .fields
            .iter()
            .any(|f| !br.column_value_at(f, row).is_empty())
        {
            self.count += 1;
        }
        0
    }

    fn merge(&mut self, other: &CountProcessor) {
        self.count += other.count;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UniqProcessor {
    fields: Vec<String>,
    seen: AHashSet<Vec<u8>>,
}

impl UniqProcessor {
    fn update(&mut self, br: &BlockResult, row: usize) -> i64 {
        let mut all_empty = true;
        let mut key = Vec::new();
        for field in &self.fields {
            let v = br.column_value_at(field, row);
            if !v.is_empty() {
                all_empty = false;
            }
            marshal_bytes(&mut key, v.as_bytes());
        }
        if all_empty {
            return 0;
        }
        let key_len = key.len() as i64;
        if self.seen.insert(key) {
            return key_len + size_of::<Vec<u8>>() as i64;
        }
        0
    }

    fn merge(&mut self, other: &UniqProcessor) {
        for key in &other.seen {
            self.seen.insert(key.clone());
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SumProcessor {
    field: String,
    sum: f64,
    count: u64,
}

impl SumProcessor {
    fn update(&mut self, br: &BlockResult, row: usize) -> i64 {
        if let Some(v) = try_parse_float64(br.column_value_at(&self.field, row)) {
            self.sum += v;
            self.count += 1;
        }
        0
    }

    fn merge(&mut self, other: &SumProcessor) {
        self.sum += other.sum;
        self.count += other.count;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaxProcessor {
    field: String,
    max_num: Option<f64>,
    max_str: Option<String>,
}

impl MaxProcessor {
    fn update(&mut self, br: &BlockResult, row: usize) -> i64 {
        let v = br.column_value_at(&self.field, row);
        if v.is_empty() {
            return 0;
        }
        if let Some(n) = try_parse_float64(v) {
            match self.max_num {
                Some(cur) if n <= cur => {}
                _ => self.max_num = Some(n),
            }
            return 0;
        }
        match &self.max_str {
            Some(cur) if v <= cur.as_str() => 0,
            _ => {
                let delta = v.len() as i64 - self.max_str.as_ref().map_or(0, |s| s.len() as i64);
                self.max_str = Some(v.to_string());
                delta
            }
        }
    }

    fn merge(&mut self, other: &MaxProcessor) {
        if let Some(n) = other.max_num {
            match self.max_num {
                Some(cur) if n <= cur => {}
                _ => self.max_num = Some(n),
            }
        }
        if let Some(s) = &other.max_str {
            match &self.max_str {
                Some(cur) if s.as_str() <= cur.as_str() => {}
                _ => self.max_str = Some(s.clone()),
            }
        }
    }

    fn finalize(&self) -> String {
        if let Some(n) = self.max_num {
            let mut out = String::new();
            append_float(&mut out, n);
            return out;
        }
        self.max_str.clone().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MinProcessor {
    field: String,
    min_num: Option<f64>,
    min_str: Option<String>,
}

impl MinProcessor {
    fn update(&mut self, br: &BlockResult, row: usize) -> i64 {
        let v = br.column_value_at(&self.field, row);
        if v.is_empty() {
            return 0;
        }
        if let Some(n) = try_parse_float64(v) {
            match self.min_num {
                Some(cur) if n >= cur => {}
                _ => self.min_num = Some(n),
            }
            return 0;
        }
        match &self.min_str {
            Some(cur) if v >= cur.as_str() => 0,
            _ => {
                let delta = v.len() as i64 - self.min_str.as_ref().map_or(0, |s| s.len() as i64);
                self.min_str = Some(v.to_string());
                delta
            }
        }
    }

    fn merge(&mut self, other: &MinProcessor) {
        if let Some(n) = other.min_num {
            match self.min_num {
                Some(cur) if n >= cur => {}
                _ => self.min_num = Some(n),
            }
        }
        if let Some(s) = &other.min_str {
            match &self.min_str {
                Some(cur) if s.as_str() >= cur.as_str() => {}
                _ => self.min_str = Some(s.clone()),
            }
        }
    }

    fn finalize(&self) -> String {
        if let Some(n) = self.min_num {
            let mut out = String::new();
            append_float(&mut out, n);
            return out;
        }
        self.min_str.clone().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AvgProcessor {
    field: String,
    sum: f64,
    count: u64,
}

impl AvgProcessor {
    fn update(&mut self, br: &BlockResult, row: usize) -> i64 {
        if let Some(v) = try_parse_float64(br.column_value_at(&self.field, row)) {
            self.sum += v;
            self.count += 1;
        }
        0
    }

    fn merge(&mut self, other: &AvgProcessor) {
        self.sum += other.sum;
        self.count += other.count;
    }
}
