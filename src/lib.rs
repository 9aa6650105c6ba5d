pub mod annotation;
pub mod error;
pub mod io;
pub mod labels;
pub mod merge;
pub mod pipelines;
pub mod represent;
pub mod sanitize;
