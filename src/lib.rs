//! The freshness engine of a minimal build tool: decides from modification
//! times whether a rule's outputs are stale, and explains why.

pub mod check;
mod explain;
pub mod fs;
pub mod load;
pub mod node;
pub mod rule;
pub mod run;
pub mod scanner;
pub mod sdl;
pub mod trace;
