pub mod inst;
