pub mod course;

pub use course::{Course, Section, NOT_AVAILABLE};
