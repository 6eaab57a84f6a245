//! Kart Racing Simulation Library
//!
//! Deterministic kart physics and race progression that a game host drives
//! tick by tick. A headless console runner ships as the `kart_sim` binary.

pub mod simulation;
