pub mod resume;
pub mod workshop;
