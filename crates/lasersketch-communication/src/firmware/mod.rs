//! Firmware protocol support
//!
//! Supported controllers:
//! - Marlin-style G-code firmware (laser and pen plotters)

pub mod marlin;
