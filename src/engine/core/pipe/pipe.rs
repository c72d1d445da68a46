use crate::engine::core::block::block_result::BlockResult;

/// Downstream consumer of result blocks produced by a pipe.
pub trait PipeProcessor: Send {
    fn write_block(&mut self, worker_id: usize, br: &BlockResult);
}

/// Collects every written block; the terminal sink of a pipe chain.
#[derive(Debug, Default)]
pub struct CollectorPipe {
    pub blocks: Vec<BlockResult>,
}

impl CollectorPipe {
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected rows as `(column name, value)` tuples, one Vec per row.
    pub fn rows(&self) -> Vec<Vec<(String, String)>> {
        let mut rows = Vec::new();
        for br in &self.blocks {
            for row in 0..br.row_count() {
                rows.push(
                    br.columns()
                        .iter()
                        .map(|c| (c.name.clone(), c.value_at_row(row).to_string()))
                        .collect(),
                );
            }
        }
        rows
    }
}

impl PipeProcessor for CollectorPipe {
    fn write_block(&mut self, _worker_id: usize, br: &BlockResult) {
        self.blocks.push(br.clone());
    }
}
