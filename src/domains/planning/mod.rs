pub mod loader;
pub mod parse;
pub mod path_file;
pub mod ports;
pub mod types;

pub use loader::*;
pub use parse::*;
pub use path_file::*;
pub use ports::*;
pub use types::*;
