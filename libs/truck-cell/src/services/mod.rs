pub mod truck;

pub use truck::TruckService;
