pub mod block_search_factory;
pub mod result_block_factory;

pub use block_search_factory::BlockSearchFactory;
pub use result_block_factory::ResultBlockFactory;
