pub mod simulation;
pub mod text;
