mod sleep;
pub use sleep::{SleepMetric, SleepObservation};

mod bath;
pub use bath::ColdBathObservation;

mod workout;
pub use workout::WorkoutSession;
