pub mod instance;
pub mod preview;
