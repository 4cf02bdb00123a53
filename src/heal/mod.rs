pub mod healer;
pub mod mapping;
pub mod rewriter;
pub mod session;
