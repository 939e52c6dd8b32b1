pub mod data_source;
pub mod row;

pub use data_source::*;
pub use row::*;
