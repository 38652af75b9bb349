pub mod event;
pub mod booking;

pub use event::{Event, NewEvent};
pub use booking::{Booking, BookingStatus, NewBooking};
