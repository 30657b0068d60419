//! Color types shared by surfaces and scenes.

mod color;

pub use color::Color;
