mod rgb565;
pub use rgb565::*;
