//! Audio file discovery

pub mod scanner;

pub use scanner::scan;
