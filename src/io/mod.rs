pub mod paths;

pub use paths::ForgePaths;
