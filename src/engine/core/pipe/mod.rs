pub mod by_field;
pub mod group_key;
pub mod pattern;
pub mod pipe;
pub mod pipe_format;
pub mod pipe_stats;
pub mod stats_funcs;
