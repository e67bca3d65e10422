//! Math utilities for the Tank-Leg Bot.
//!
//! This module provides the deadband and slew-rate filters applied to stick input.

pub mod filters;
