use crate::engine::core::block::block_result::BlockResult;

/// Factory for constructing rendered `BlockResult` blocks for tests.
pub struct ResultBlockFactory {
    block: BlockResult,
    rows: usize,
}

impl ResultBlockFactory {
    pub fn new() -> Self {
        Self {
            block: BlockResult::new(),
            rows: 0,
        }
    }

    pub fn with_column(mut self, name: &str, values: &[&str]) -> Self {
        self.rows = self.rows.max(values.len());
        self.block
            .add_column(name, values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn with_const_column(mut self, name: &str, value: &str) -> Self {
        self.block.add_const_column(name, value);
        self
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn create(mut self) -> BlockResult {
        self.block.timestamps = (0..self.rows as i64).collect();
        self.block
    }
}

impl Default for ResultBlockFactory {
    fn default() -> Self {
        Self::new()
    }
}
