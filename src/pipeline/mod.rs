pub mod extraction;
pub mod import;
pub mod merge;
pub mod overrides;
pub mod validate;
