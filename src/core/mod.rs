//! Pure music and colour model: note names, harmonies and palettes.

pub mod color;
pub mod harmony;
pub mod palette;
pub mod pitch;
