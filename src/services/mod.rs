pub mod availability;
pub mod clock;
pub mod dispatch;
pub mod intent;
pub mod normalize;
pub mod scheduling;
pub mod service_area;
pub mod tools;
