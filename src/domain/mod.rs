pub mod carrot;
pub mod entity;
pub mod physics;
pub mod rules;
