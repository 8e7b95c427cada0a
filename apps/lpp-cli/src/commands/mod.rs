pub mod consolidate;
pub mod generalize;
pub mod patterns;
