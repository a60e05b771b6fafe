use crate::{emission::FrameRelay, store::StateStore};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: StateStore,
    pub(crate) relay: FrameRelay,
    pub(crate) outbox_capacity: usize,
    pub(crate) max_frame_bytes: usize,
}
