pub mod config;
pub mod keywords;
pub mod scorer;
pub mod similarity;
