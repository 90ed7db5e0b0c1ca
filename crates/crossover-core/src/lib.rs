// Shared configuration for the crossover workspace crates.

pub mod config;
