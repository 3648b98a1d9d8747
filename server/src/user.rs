use std::collections::VecDeque;

/// Per-connection packet buffers. Inbound packets wait here until the
/// read phase of the next tick; outbound packets accumulate until the
/// transport drains them with `Server::take_outgoing`.
pub(crate) struct User {
    pub(crate) inbound: VecDeque<Vec<u8>>,
    pub(crate) outbound: Vec<Vec<u8>>,
}

impl User {
    pub(crate) fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            outbound: Vec::new(),
        }
    }
}
