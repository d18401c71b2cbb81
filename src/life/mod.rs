pub mod agent;
pub mod border_effect;
pub mod population;
pub mod presets;
pub mod tier;
pub mod voice_pool;
