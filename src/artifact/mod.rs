pub mod frame;
pub mod hex;
