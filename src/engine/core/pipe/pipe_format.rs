use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::engine::core::block::block_result::BlockResult;
use crate::engine::core::filter::filter::{quote_token_if_needed, Filter};
use crate::engine::core::pipe::pattern::PatternStep;
use crate::engine::core::pipe::pipe::PipeProcessor;
use crate::shared::pool::with_scratch;

/// The `format "pattern" as field` pipe: renders a pattern per row into the
/// result field. An optional `if (...)` filter gates formatting per row;
/// rows that fail it keep their original value.
#[derive(Debug)]
pub struct FormatPipe {
    pub steps: Vec<PatternStep>,
    pub result_field: String,
    pub keep_original_fields: bool,
    pub skip_empty_results: bool,
    pub if_filter: Option<Filter>,
}

impl FormatPipe {
    pub fn new(steps: Vec<PatternStep>, result_field: impl Into<String>) -> Self {
        Self {
            steps,
            result_field: result_field.into(),
            keep_original_fields: false,
            skip_empty_results: false,
            if_filter: None,
        }
    }

    fn format_row(&self, br: &BlockResult, row: usize, out: &mut String) {
        out.clear();
        for step in &self.steps {
            out.push_str(&step.prefix);
            if step.field.is_empty() {
                continue;
            }
            let v = br.column_value_at(&step.field, row);
            if step.field_opt == "q" {
                let _ = write!(out, "{v:?}");
            } else {
                out.push_str(v);
            }
        }
    }
}

impl fmt::Display for FormatPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format")?;
        if let Some(iff) = &self.if_filter {
            write!(f, " if ({iff})")?;
        }
        let mut pattern = String::new();
        for step in &self.steps {
            pattern.push_str(&step.prefix);
            if !step.field.is_empty() {
                if step.field_opt.is_empty() {
                    let _ = write!(pattern, "<{}>", step.field);
                } else {
                    let _ = write!(pattern, "<{}:{}>", step.field_opt, step.field);
                }
            }
        }
        write!(f, " {}", quote_token_if_needed(&pattern))?;
        if self.result_field != "_msg" {
            write!(f, " as {}", quote_token_if_needed(&self.result_field))?;
        }
        Ok(())
    }
}

/// Streams blocks through the format pipe into `dest`.
pub struct FormatPipeProcessor<D: PipeProcessor> {
    pf: Arc<FormatPipe>,
    dest: D,
}

impl<D: PipeProcessor> FormatPipeProcessor<D> {
    pub fn new(pf: Arc<FormatPipe>, dest: D) -> Self {
        Self { pf, dest }
    }

    pub fn into_dest(self) -> D {
        self.dest
    }
}

impl<D: PipeProcessor> PipeProcessor for FormatPipeProcessor<D> {
    fn write_block(&mut self, worker_id: usize, br: &BlockResult) {
        if br.row_count() == 0 {
            return;
        }
        let pf = &self.pf;
        let values = with_scratch(|buf| {
            let mut values = Vec::with_capacity(br.row_count());
            for row in 0..br.row_count() {
                let original = br.column_value_at(&pf.result_field, row);
                let passes = pf
                    .if_filter
                    .as_ref()
                    .map(|f| f.matches_result_row(br, row))
                    .unwrap_or(true);
                if !passes {
                    values.push(original.to_string());
                    continue;
                }
                pf.format_row(br, row, buf);
                if pf.skip_empty_results && buf.is_empty() && !original.is_empty() {
                    values.push(original.to_string());
                    continue;
                }
                if pf.keep_original_fields && !original.is_empty() {
                    values.push(original.to_string());
                    continue;
                }
                values.push(buf.clone());
            }
            values
        });

        let mut out = BlockResult::new();
        out.timestamps = br.timestamps.clone();
        for column in br.columns() {
            if column.name == pf.result_field {
                continue;
            }
            out.add_column(
                column.name.clone(),
                (0..br.row_count())
                    .map(|row| column.value_at_row(row).to_string())
                    .collect(),
            );
        }
        out.add_column(pf.result_field.clone(), values);
        self.dest.write_block(worker_id, &out);
    }
}
