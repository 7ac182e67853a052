pub mod batch_service;
pub mod result_writer;

pub use batch_service::*;
pub use result_writer::*;
