pub mod admission;
pub mod inventory;

pub use admission::BookingController;
pub use inventory::InventoryStore;
