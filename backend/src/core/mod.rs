//! Core helpers shared by the actor and orchestrator layers

pub mod allocation;
