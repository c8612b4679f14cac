pub mod authorization;
pub mod engine;
pub mod torch;
