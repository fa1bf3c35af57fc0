pub mod advanced;
pub mod category;
pub mod error;
pub mod simple;
pub mod spec;
pub mod timestep;
