pub mod reader;

pub use reader::{read, read_all};
