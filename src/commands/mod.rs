pub mod publish;
pub mod render;
