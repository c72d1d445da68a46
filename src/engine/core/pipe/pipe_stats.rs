use std::collections::hash_map::Entry;
use std::fmt;
use std::mem::size_of;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use tracing::debug;

use crate::engine::core::block::block_result::BlockResult;
use crate::engine::core::pipe::by_field::ByField;
use crate::engine::core::pipe::group_key::{marshal_bytes, unmarshal_bytes};
use crate::engine::core::pipe::pipe::PipeProcessor;
use crate::engine::core::pipe::stats_funcs::{StatsFunc, StatsProcessor};
use crate::engine::core::utils::memory::allowed_memory;
use crate::engine::errors::{QueryError, StatsError};
use crate::engine::query::context::QueryContext;

/// Budget is stolen from the global counter in 1 MiB chunks.
const STATE_SIZE_BUDGET_CHUNK: i64 = 1 << 20;

/// Rows per output block emitted on flush.
const OUTPUT_BLOCK_ROWS: usize = 1_000;

/// The `stats by (...) f1() as r1, ...` pipe configuration.
#[derive(Clone, Debug)]
pub struct StatsPipe {
    pub by_fields: Vec<ByField>,
    pub funcs: Vec<StatsFunc>,
    pub result_names: Vec<String>,
}

impl StatsPipe {
    pub fn new(
        by_fields: Vec<ByField>,
        funcs_with_names: Vec<(StatsFunc, String)>,
    ) -> Result<Self, QueryError> {
        if funcs_with_names.is_empty() {
            return Err(QueryError::EmptyStatsPipe);
        }
        let mut funcs = Vec::with_capacity(funcs_with_names.len());
        let mut result_names = Vec::with_capacity(funcs_with_names.len());
        for (func, name) in funcs_with_names {
            funcs.push(func);
            result_names.push(name);
        }
        Ok(Self {
            by_fields,
            funcs,
            result_names,
        })
    }

    /// Union of by-fields and per-func fields, first-seen order.
    pub fn needed_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        let mut push = |name: &str| {
            if !fields.iter().any(|f| f == name) {
                fields.push(name.to_string());
            }
        };
        for bf in &self.by_fields {
            push(&bf.name);
        }
        for func in &self.funcs {
            for field in func.needed_fields() {
                push(field);
            }
        }
        fields
    }
}

impl fmt::Display for StatsPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stats ")?;
        if !self.by_fields.is_empty() {
            let parts: Vec<String> = self.by_fields.iter().map(|bf| bf.to_string()).collect();
            write!(f, "by ({}) ", parts.join(", "))?;
        }
        let parts: Vec<String> = self
            .funcs
            .iter()
            .zip(&self.result_names)
            .map(|(func, name)| format!("{func} as {name}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

struct StatsGroup {
    procs: Vec<StatsProcessor>,
}

/// One worker's partition of the stats state. Mutated only by its worker;
/// the padding keeps neighbouring shards off the same cache line.
#[repr(align(128))]
pub struct StatsShard {
    ps: Arc<StatsPipe>,
    ctx: Arc<QueryContext>,
    global_budget: Arc<AtomicI64>,

    m: AHashMap<Vec<u8>, StatsGroup>,
    key_buf: Vec<u8>,

    state_size_budget: i64,
}

const _: () = assert!(size_of::<StatsShard>() % 128 == 0);

impl StatsShard {
    /// Feeds one block of rows into this shard's groups.
    pub fn write_block(&mut self, br: &BlockResult) {
        while self.state_size_budget < 0 {
            // Steal some budget for the state size from the global budget.
            let remaining =
                self.global_budget.fetch_sub(STATE_SIZE_BUDGET_CHUNK, Ordering::Relaxed)
                    - STATE_SIZE_BUDGET_CHUNK;
            if remaining < 0 {
                // The state size is too big. Stop processing data in order
                // to avoid an OOM crash.
                if remaining + STATE_SIZE_BUDGET_CHUNK >= 0 {
                    // First crossing: notify upstream workers to stop
                    // feeding blocks.
                    self.ctx.cancel();
                }
                return;
            }
            self.state_size_budget += STATE_SIZE_BUDGET_CHUNK;
        }

        let ps = Arc::clone(&self.ps);
        let by_fields = &ps.by_fields;
        if by_fields.is_empty() {
            // Fast path - all the rows go to a single group with empty key.
            let mut budget = 0;
            for proc in self.group_procs(&[]) {
                budget += proc.update_for_all_rows(br);
            }
            self.state_size_budget -= budget;
            return;
        }
        if by_fields.len() == 1 {
            // Special case for grouping by a single column.
            let bf = &by_fields[0];
            let values = br.get_bucketed_column_values(&bf.name, bf.bucket_size, bf.bucket_offset);
            if are_const_values(&values) {
                // Fast path for a column with constant values.
                let mut key_buf = std::mem::take(&mut self.key_buf);
                key_buf.clear();
                marshal_bytes(&mut key_buf, values[0].as_bytes());
                let mut budget = 0;
                for proc in self.group_procs(&key_buf) {
                    budget += proc.update_for_all_rows(br);
                }
                self.state_size_budget -= budget;
                self.key_buf = key_buf;
                return;
            }

            // Slower generic path for a column with different values.
            let mut key_buf = std::mem::take(&mut self.key_buf);
            let mut budget = 0;
            let mut have_group = false;
            for row in 0..br.row_count() {
                if !have_group || values[row - 1] != values[row] {
                    key_buf.clear();
                    marshal_bytes(&mut key_buf, values[row].as_bytes());
                    self.ensure_group(&key_buf);
                    have_group = true;
                }
                let group = self
                    .m
                    .get_mut(key_buf.as_slice())
                    .expect("group resolved above");
                for proc in &mut group.procs {
                    budget += proc.update_for_row(br, row);
                }
            }
            self.state_size_budget -= budget;
            self.key_buf = key_buf;
            return;
        }

        // Obtain bucketed values for all the `by (...)` fields.
        let column_values: Vec<Vec<String>> = by_fields
            .iter()
            .map(|bf| br.get_bucketed_column_values(&bf.name, bf.bucket_size, bf.bucket_offset))
            .collect();

        if column_values.iter().all(|values| are_const_values(values)) {
            // Fast path for constant `by (...)` columns.
            let mut key_buf = std::mem::take(&mut self.key_buf);
            key_buf.clear();
            for values in &column_values {
                marshal_bytes(&mut key_buf, values[0].as_bytes());
            }
            let mut budget = 0;
            for proc in self.group_procs(&key_buf) {
                budget += proc.update_for_all_rows(br);
            }
            self.state_size_budget -= budget;
            self.key_buf = key_buf;
            return;
        }

        // The slowest path - multiple columns with varying values.
        let mut key_buf = std::mem::take(&mut self.key_buf);
        let mut budget = 0;
        let mut have_group = false;
        for row in 0..br.row_count() {
            let same_key = have_group
                && column_values
                    .iter()
                    .all(|values| values[row - 1] == values[row]);
            if !same_key {
                key_buf.clear();
                for values in &column_values {
                    marshal_bytes(&mut key_buf, values[row].as_bytes());
                }
                self.ensure_group(&key_buf);
                have_group = true;
            }
            let group = self
                .m
                .get_mut(key_buf.as_slice())
                .expect("group resolved above");
            for proc in &mut group.procs {
                budget += proc.update_for_row(br, row);
            }
        }
        self.state_size_budget -= budget;
        self.key_buf = key_buf;
    }

    /// Creates the group for `key` when absent, charging its state size.
    fn ensure_group(&mut self, key: &[u8]) {
        if self.m.contains_key(key) {
            return;
        }
        let mut procs = Vec::with_capacity(self.ps.funcs.len());
        for func in &self.ps.funcs {
            let (proc, state_size) = func.new_processor();
            self.state_size_budget -= state_size;
            procs.push(proc);
        }
        self.state_size_budget -=
            key.len() as i64 + size_of::<StatsGroup>() as i64 + size_of::<Vec<u8>>() as i64;
        self.m.insert(key.to_vec(), StatsGroup { procs });
    }

    fn group_procs(&mut self, key: &[u8]) -> &mut [StatsProcessor] {
        self.ensure_group(key);
        self.m
            .get_mut(key)
            .map(|g| g.procs.as_mut_slice())
            .expect("group resolved above")
    }
}

/// Coordinates the shards of one stats pipe execution: hands a shard to each
/// worker, then folds and finalizes them on flush.
pub struct StatsPipeProcessor {
    ps: Arc<StatsPipe>,
    ctx: Arc<QueryContext>,

    max_state_size: i64,
    state_size_budget: Arc<AtomicI64>,
}

impl StatsPipeProcessor {
    /// Budgets `0.3 x allowed memory` across all shards.
    pub fn new(
        ps: Arc<StatsPipe>,
        workers: usize,
        ctx: Arc<QueryContext>,
    ) -> (Self, Vec<StatsShard>) {
        let max_state_size = (allowed_memory() as f64 * 0.3) as i64;
        Self::with_max_state_size(ps, workers, ctx, max_state_size)
    }

    /// As `new`, with an explicit global budget.
    pub fn with_max_state_size(
        ps: Arc<StatsPipe>,
        workers: usize,
        ctx: Arc<QueryContext>,
        mut max_state_size: i64,
    ) -> (Self, Vec<StatsShard>) {
        let state_size_budget = Arc::new(AtomicI64::new(0));
        let mut shards = Vec::with_capacity(workers);
        for _ in 0..workers {
            shards.push(StatsShard {
                ps: Arc::clone(&ps),
                ctx: Arc::clone(&ctx),
                global_budget: Arc::clone(&state_size_budget),
                m: AHashMap::new(),
                key_buf: Vec::new(),
                state_size_budget: STATE_SIZE_BUDGET_CHUNK,
            });
            max_state_size -= STATE_SIZE_BUDGET_CHUNK;
        }
        state_size_budget.store(max_state_size, Ordering::Relaxed);
        debug!(
            target: "vlotlog::stats",
            workers,
            max_state_size,
            "Created stats pipe processor"
        );
        let psp = Self {
            ps,
            ctx,
            max_state_size,
            state_size_budget,
        };
        (psp, shards)
    }

    /// Folds the shards together, finalizes every group and writes result
    /// blocks of up to 1,000 rows to `dest`.
    pub fn flush(
        &self,
        shards: Vec<StatsShard>,
        dest: &mut dyn PipeProcessor,
    ) -> Result<(), StatsError> {
        if self.state_size_budget.load(Ordering::Relaxed) <= 0 {
            return Err(StatsError::MemoryLimitExceeded {
                stats: self.ps.to_string(),
                limit_mib: self.max_state_size / (1 << 20),
            });
        }

        // Merge states across shards.
        let mut shards = shards;
        let mut m = match shards.first_mut() {
            Some(first) => std::mem::take(&mut first.m),
            None => AHashMap::new(),
        };
        for shard in shards.iter_mut().skip(1) {
            for (key, group) in shard.m.drain() {
                // A shard map may be big; stop early once the query is gone.
                if self.ctx.is_stopped() {
                    return Ok(());
                }
                match m.entry(key) {
                    Entry::Vacant(entry) => {
                        entry.insert(group);
                    }
                    Entry::Occupied(mut entry) => {
                        for (proc, other) in
                            entry.get_mut().procs.iter_mut().zip(&group.procs)
                        {
                            proc.merge_state(other);
                        }
                    }
                }
            }
        }

        if self.ps.by_fields.is_empty() && m.is_empty() {
            // Special case - zero matching rows still produce exactly one
            // row of zero-valued aggregates.
            let procs = self
                .ps
                .funcs
                .iter()
                .map(|func| func.new_processor().0)
                .collect();
            m.insert(Vec::new(), StatsGroup { procs });
        }

        let mut br = BlockResult::new();
        for bf in &self.ps.by_fields {
            br.add_empty_string_column(bf.name.clone());
        }
        for result_name in &self.ps.result_names {
            br.add_empty_string_column(result_name.clone());
        }

        let mut values: Vec<String> = Vec::new();
        for (key, group) in &m {
            if self.ctx.is_stopped() {
                return Ok(());
            }

            // Recover the by-field values from the group key.
            values.clear();
            let mut key_tail = key.as_slice();
            while !key_tail.is_empty() {
                let Some((value, tail)) = unmarshal_bytes(key_tail) else {
                    panic!("BUG: cannot unmarshal value from group key {key:?}");
                };
                values.push(String::from_utf8_lossy(value).into_owned());
                key_tail = tail;
            }
            if values.len() != self.ps.by_fields.len() {
                panic!(
                    "BUG: unexpected number of values decoded from group key; got {}; want {}",
                    values.len(),
                    self.ps.by_fields.len()
                );
            }

            for proc in &group.procs {
                values.push(proc.finalize());
            }

            br.add_row(0, &values);
            if br.row_count() >= OUTPUT_BLOCK_ROWS {
                dest.write_block(0, &br);
                br.reset_rows();
            }
        }
        if br.row_count() > 0 {
            dest.write_block(0, &br);
        }

        Ok(())
    }
}

fn are_const_values(values: &[String]) -> bool {
    let Some(first) = values.first() else {
        return false;
    };
    values[1..].iter().all(|v| v == first)
}
