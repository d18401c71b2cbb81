//! Bouncing sound dots: agents that ring a note and leave a fading pulse
//! every time they hit the edge of a square canvas.

pub mod audio;
pub mod config;
pub mod core;
pub mod life;
pub mod render;
pub mod sketch;
pub mod synth;
