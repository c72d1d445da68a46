use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::block::block_result::BlockResult;
use crate::engine::core::block::block_search::BlockSearch;
use crate::engine::core::filter::filter::Filter;
use crate::engine::core::pipe::pipe::CollectorPipe;
use crate::engine::core::pipe::pipe_stats::{StatsPipe, StatsPipeProcessor, StatsShard};
use crate::engine::errors::StatsError;
use crate::engine::query::context::QueryContext;

const LOG_TARGET: &str = "vlotlog::executor";

/// Runs a filtered stats query over a set of blocks: one worker task per
/// shard, blocks fanned out round-robin, shards folded on flush.
///
/// Each worker narrows the block's bitmap through the filter tree, renders
/// the surviving rows into a result block and feeds its own shard. Shard
/// state is owned by its worker for the whole run; the workers hand their
/// shards back for the final merge.
pub async fn run_stats_query(
    blocks: Vec<Arc<BlockSearch>>,
    filter: Arc<Filter>,
    pipe: Arc<StatsPipe>,
    ctx: Arc<QueryContext>,
    workers: usize,
) -> Result<Vec<BlockResult>, StatsError> {
    let workers = workers.max(1);
    let needed_fields = Arc::new(pipe.needed_fields());
    let (psp, shards) = StatsPipeProcessor::new(Arc::clone(&pipe), workers, Arc::clone(&ctx));

    run_query(blocks, filter, ctx, needed_fields, psp, shards).await
}

/// As `run_stats_query`, with an explicit stats memory budget.
pub async fn run_stats_query_with_budget(
    blocks: Vec<Arc<BlockSearch>>,
    filter: Arc<Filter>,
    pipe: Arc<StatsPipe>,
    ctx: Arc<QueryContext>,
    workers: usize,
    max_state_size: i64,
) -> Result<Vec<BlockResult>, StatsError> {
    let workers = workers.max(1);
    let needed_fields = Arc::new(pipe.needed_fields());
    let (psp, shards) = StatsPipeProcessor::with_max_state_size(
        Arc::clone(&pipe),
        workers,
        Arc::clone(&ctx),
        max_state_size,
    );

    run_query(blocks, filter, ctx, needed_fields, psp, shards).await
}

async fn run_query(
    blocks: Vec<Arc<BlockSearch>>,
    filter: Arc<Filter>,
    ctx: Arc<QueryContext>,
    needed_fields: Arc<Vec<String>>,
    psp: StatsPipeProcessor,
    shards: Vec<StatsShard>,
) -> Result<Vec<BlockResult>, StatsError> {
    let workers = shards.len();
    debug!(target: LOG_TARGET, workers, blocks = blocks.len(), "Starting stats query");

    let mut senders = Vec::with_capacity(workers);
    let mut handles = Vec::with_capacity(workers);
    for (worker_id, mut shard) in shards.into_iter().enumerate() {
        let (tx, mut rx) = mpsc::channel::<Arc<BlockSearch>>(4);
        let filter = Arc::clone(&filter);
        let ctx = Arc::clone(&ctx);
        let needed_fields = Arc::clone(&needed_fields);
        senders.push(tx);
        handles.push(tokio::spawn(async move {
            while let Some(bs) = rx.recv().await {
                if ctx.is_stopped() || ctx.is_canceled() {
                    continue;
                }
                let mut bm = Bitmap::new(bs.row_count());
                filter.apply(&bs, &mut bm);
                if bm.is_zero() {
                    continue;
                }
                let br = BlockResult::from_block_search(&bs, &bm, &needed_fields);
                shard.write_block(&br);
            }
            debug!(target: LOG_TARGET, worker_id, "Worker finished");
            shard
        }));
    }

    for (i, bs) in blocks.into_iter().enumerate() {
        if ctx.is_stopped() || ctx.is_canceled() {
            break;
        }
        if senders[i % workers].send(bs).await.is_err() {
            warn!(target: LOG_TARGET, "Worker channel closed early");
            break;
        }
    }
    drop(senders);

    let mut shards = Vec::with_capacity(workers);
    for handle in handles {
        match handle.await {
            Ok(shard) => shards.push(shard),
            Err(e) if e.is_panic() => {
                // A worker only panics on broken-block invariants; those are
                // fatal for the whole query.
                std::panic::resume_unwind(e.into_panic());
            }
            Err(e) => {
                warn!(target: LOG_TARGET, error = %e, "Worker task cancelled");
            }
        }
    }

    let mut collector = CollectorPipe::new();
    psp.flush(shards, &mut collector)?;
    Ok(collector.blocks)
}
