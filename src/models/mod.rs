pub mod action;
pub mod booking;
pub mod business_hours;
pub mod card;
pub mod customer;
pub mod time_window;

pub use action::{ActionContext, ActionResult, DispatchRequest};
pub use booking::{Booking, BookingStatus};
pub use business_hours::BusinessHours;
pub use card::{CardBody, CardIntent};
pub use customer::{Customer, Lead};
pub use time_window::{Preference, TimeWindow, WindowSelection};
