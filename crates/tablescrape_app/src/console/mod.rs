//! Console front end: drives the controller state machine from the command line.
pub mod app;
pub mod effects;
pub mod logging;
pub mod render;
