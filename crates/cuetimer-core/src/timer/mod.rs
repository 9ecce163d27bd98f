mod clock;
mod engine;
mod machine;
mod sampler;
mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Countdown, Snapshot};
pub use machine::{transition, Input, MachineState, TimerConfig, TimerState};
pub use sampler::ElapsedSampler;
pub use session::{Session, SubscriptionId};
