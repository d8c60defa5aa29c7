pub mod logging;
pub mod remote;
