//! Tick clock, configuration and orchestration for the Rover simulation.
//!
//! This crate owns the per-tick cycle that drives the actors: scripts
//! resume and submit instructions, neighbor changes are delivered, every
//! actor runs its update, and changed descriptions are collected for
//! observers.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter with overflow checking.
//! - [`config`] -- Configuration loading from `rover-config.yaml` into
//!   strongly-typed structs.
//! - [`runner`] -- The async, bounded simulation loop.
//! - [`script`] -- [`ProgramDriver`], instruction programs that suspend on
//!   command completions.
//! - [`tick`] -- The per-tick engine loop.
//!
//! [`ProgramDriver`]: script::ProgramDriver

pub mod clock;
pub mod config;
pub mod runner;
pub mod script;
pub mod tick;
