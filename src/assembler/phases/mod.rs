pub mod types;

pub mod generate;
pub mod resolve;
pub mod tokenize;

pub use generate::generate;
pub use resolve::resolve;
pub use tokenize::tokenize;
