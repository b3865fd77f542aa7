pub mod fitting;

pub use fitting::FittingService;
