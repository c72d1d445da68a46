use crate::engine::query::context::QueryContext;

#[test]
fn flags_start_low_and_latch() {
    let ctx = QueryContext::new();
    assert!(!ctx.is_stopped());
    assert!(!ctx.is_canceled());

    ctx.stop();
    assert!(ctx.is_stopped());
    assert!(!ctx.is_canceled());

    ctx.cancel();
    assert!(ctx.is_canceled());
}
