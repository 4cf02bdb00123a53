pub mod matcher;
pub mod selector;
pub mod xpath_heal;
