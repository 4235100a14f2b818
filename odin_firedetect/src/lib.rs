/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! active fire detection and fire radiative power (FRP) estimation for geostationary satellite imagery,
//! using the contextual algorithm of Roberts & Wooster (2008):
//!
//!  1. stage 1 flags potential fire pixels by SZA adjusted MIR/BTD thresholds and high pass kernel tests
//!  2. background statistics are collected for each potential fire pixel from a growing window of
//!     clear land neighbors
//!  3. a confidence is computed from the pixel values, their background z-scores and window contamination
//!  4. confirmed fires get an FRP estimate with the MIR radiance method
//!
//! A separate histogram based detector finds large night time fires in a 2.2µm channel.
//!
//! The crate does not read satellite data - callers provide a [`BandSet`] of co-registered, calibrated grids
//! (see [`radiometry`] for how these are derived from channel data).

mod errors;
pub use errors::{Result, OdinFireDetectError};

pub mod config;
pub use config::FireDetectConfig;

pub mod grid;
pub use grid::{BandRole, BandSet, FloatGrid, MaskGrid};

pub mod kernel;
pub mod window_stats;
pub mod stage1;
pub mod confidence;
pub mod frp;
pub mod night;
pub mod radiometry;

mod pipeline;
pub use pipeline::{DetectionResult, FireDetector, FirePixel, detect_fires};
