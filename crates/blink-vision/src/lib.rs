mod blink;
mod ear;
mod landmarks;

pub use blink::*;
pub use ear::*;
pub use landmarks::*;
