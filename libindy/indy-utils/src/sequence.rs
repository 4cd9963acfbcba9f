use std::sync::atomic::{AtomicI32, Ordering};

lazy_static::lazy_static! {
    static ref IDS_COUNTER: AtomicI32 = AtomicI32::new(1);
}

pub fn get_next_id() -> i32 {
    IDS_COUNTER.fetch_add(1, Ordering::SeqCst)
}
