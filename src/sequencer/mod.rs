mod run_queue;
mod scheduler;
mod timing;
mod transport;
mod visual_queue;

pub use run_queue::RunQueue;
pub use timing::{Timing, clamp_bpm};
pub use transport::{Connect, Task, Transport};
