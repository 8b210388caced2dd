pub mod catalog;
pub mod config;
pub mod rate;
pub mod summation;
pub mod validate;
