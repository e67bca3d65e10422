//! Teleop control core for the Tank-Leg Bot on no-std platforms.
//!
//! For a runnable host simulation, see the `tlb-app/mock-rio` crate.
#![no_std]

pub mod utils;
