//! Build a directed link graph from encyclopedia dump files and rank the
//! articles with a damped random-walk power iteration.

// COMPONENTS
pub mod error;
pub mod graph_state;
