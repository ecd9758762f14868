//! World collaborator for the Rover actor simulation.
//!
//! Actors never own the world they live in; they reach it through the
//! [`World`] trait. This crate defines that trait and [`GridWorld`], an
//! in-memory implementation with dimensions, loaded regions, a world
//! border, sparse blocks and fluids, and free entities.
//!
//! # Modules
//!
//! - [`error`] -- Error types for world construction ([`WorldError`])
//! - [`world`] -- The [`World`] trait, [`BlockState`], [`NeighborUpdate`]
//! - [`grid`] -- [`GridWorld`] and [`WorldBounds`]

pub mod error;
pub mod grid;
pub mod world;

pub use error::WorldError;
pub use grid::{GridWorld, REGION_SIZE, WorldBounds, region_of};
pub use world::{BlockState, BlockType, NeighborUpdate, World};
