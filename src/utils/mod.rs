pub mod clock;
pub mod task_supervisor;

pub use clock::{Clock, ManualClock, SystemClock};
pub use task_supervisor::TaskSupervisor;
