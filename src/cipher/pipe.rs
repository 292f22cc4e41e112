use crate::backend::BoxedTransform;

/// Drives a backend transform one message per `update`.
pub struct Pipe {
    transform: BoxedTransform,
}

impl Pipe {
    pub fn new(transform: BoxedTransform) -> Self {
        Self { transform }
    }

    pub fn update(&mut self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        self.transform.process_msg(data)
    }
}
