pub mod bitmap;
pub mod block_result;
pub mod block_search;

#[cfg(test)]
mod bitmap_test;
#[cfg(test)]
mod block_search_test;
