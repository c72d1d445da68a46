/// Physical encoding of a column inside a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnValueType {
    String,
    Dict,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float64,
    Ipv4,
    TimestampIso8601,
}

impl ColumnValueType {
    /// Fixed cell width in bytes, or None for variable-width strings.
    pub fn cell_width(&self) -> Option<usize> {
        match self {
            ColumnValueType::String => None,
            ColumnValueType::Dict => Some(1),
            ColumnValueType::Uint8 => Some(1),
            ColumnValueType::Uint16 => Some(2),
            ColumnValueType::Uint32 => Some(4),
            ColumnValueType::Uint64 => Some(8),
            ColumnValueType::Float64 => Some(8),
            ColumnValueType::Ipv4 => Some(4),
            ColumnValueType::TimestampIso8601 => Some(8),
        }
    }
}

/// Per-block dictionary for `Dict` columns. Cells are 1-byte indices into
/// `values`; a block never carries more than 256 distinct values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValuesDict {
    pub values: Vec<String>,
}

impl ValuesDict {
    pub fn new(values: Vec<String>) -> Self {
        assert!(values.len() <= 256, "values dict overflow: {}", values.len());
        Self { values }
    }
}

/// Summary of one column within a block.
#[derive(Clone, Debug)]
pub struct ColumnHeader {
    pub name: String,
    pub value_type: ColumnValueType,
    pub values_dict: ValuesDict,
    pub min_value: u64,
    pub max_value: u64,
}

impl ColumnHeader {
    pub fn new(name: impl Into<String>, value_type: ColumnValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            values_dict: ValuesDict::default(),
            min_value: 0,
            max_value: 0,
        }
    }
}
