pub trait ProgressBar<M>: Sync + Send {
    fn set_message(&self, message: M);

    fn set_length(&self, length: u64);

    fn inc(&self, amount: u64);

    fn finish(&self);
}

/// Progress sink for callers that don't display anything.
pub struct NoProgressBar;

impl<M> ProgressBar<M> for NoProgressBar {
    fn set_message(&self, _: M) {}

    fn set_length(&self, _: u64) {}

    fn inc(&self, _: u64) {}

    fn finish(&self) {}
}
