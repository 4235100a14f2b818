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

//! the configuration of a detection run. All thresholds follow Roberts & Wooster (2008) unless noted.
//! Configs are normally loaded from RON files such as
//! ```ron
//! FireDetectConfig(
//!     stage1: ( kernel_sizes: [5, 7, 9] ),
//!     frp: ( platform_constants: { "Himawari-9": 3.0e-9 } ),
//! )
//! ```
//! Fields that are not specified get their defaults.

use std::{collections::HashMap, path::Path};
use serde::{Serialize,Deserialize};
use crate::errors::Result;

/// land-sea mask value of land pixels (2 = land, 1 = coast, 0 = sea)
pub const LSM_LAND_VAL: u8 = 2;

/// solar zenith angle above which the confidence interpolation uses night bounds
pub const NIGHT_SZA: f32 = 60.0;

#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct FireDetectConfig {
    pub lsm_land_val: u8,
    pub stage1: Stage1Config,
    pub window: WindowConfig,
    pub confidence: ConfidenceConfig,
    pub night: NightConfig,
    pub frp: FrpConfig,
}

impl Default for FireDetectConfig {
    fn default()->Self {
        FireDetectConfig {
            lsm_land_val: LSM_LAND_VAL,
            stage1: Stage1Config::default(),
            window: WindowConfig::default(),
            confidence: ConfidenceConfig::default(),
            night: NightConfig::default(),
            frp: FrpConfig::default(),
        }
    }
}

impl FireDetectConfig {
    pub fn from_ron_str (s: &str)->Result<Self> {
        Ok( ron::from_str(s)? )
    }

    pub fn load_config_path<P: AsRef<Path>> (path: P)->Result<Self> {
        let s = std::fs::read_to_string( path.as_ref())?;
        Self::from_ron_str( &s)
    }
}

/// stage 1a/1b thresholds for potential fire pixels
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct Stage1Config {
    pub mir_thresh_bt: f32,       // K
    pub mir_thresh_sza_adj: f32,  // K/deg
    pub mir_thresh_limit: f32,    // K
    pub btd_thresh_bt: f32,       // K
    pub btd_thresh_sza_adj: f32,  // K/deg
    pub btd_thresh_limit: f32,    // K
    pub kern_thresh_btd: f32,
    pub kern_thresh_sza_adj: f32, // 1/deg
    pub kernel_sizes: Vec<usize>,
    pub do_lsm_mask: bool,

    /// number of tests (kernel votes plus the gated MIR and BTD tests) a pixel has to pass
    pub stage1_pass_thresh: u8,
}

impl Default for Stage1Config {
    fn default()->Self {
        Stage1Config {
            mir_thresh_bt: 310.5,
            mir_thresh_sza_adj: -0.3,
            mir_thresh_limit: 280.0,
            btd_thresh_bt: 1.75,
            btd_thresh_sza_adj: -0.0049,
            btd_thresh_limit: 1.0,
            kern_thresh_btd: 1.5,
            kern_thresh_sza_adj: -0.012,
            kernel_sizes: vec![3, 5, 7],
            do_lsm_mask: true,
            stage1_pass_thresh: 3,
        }
    }
}

/// parameters of the growing background window
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// minimum number of background pixels required for valid statistics
    pub min_valid: usize,
    /// maximum window half-size (the largest window is `2*max_window+1` wide)
    pub max_window: usize,
}

impl Default for WindowConfig {
    fn default()->Self {
        WindowConfig { min_valid: 8, max_window: 7 }
    }
}

/// bounds of the stage 5 confidence ramps, linearly interpolated between day and night by SZA
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub night_sza: f32,
    pub min_c1_day: f32,
    pub min_c1_night: f32,
    pub max_c1_day: f32,
    pub max_c1_night: f32,
    pub min_c2: f32,
    pub max_c2: f32,
    pub min_c3_day: f32,
    pub min_c3_night: f32,
    pub max_c3_day: f32,
    pub max_c3_night: f32,

    /// minimum confidence of a confirmed fire pixel
    pub min_confidence: f32,
}

impl Default for ConfidenceConfig {
    fn default()->Self {
        ConfidenceConfig {
            night_sza: NIGHT_SZA,
            min_c1_day: 287.0,
            min_c1_night: 280.0,
            max_c1_day: 327.0,
            max_c1_night: 310.0,
            min_c2: 0.9,
            max_c2: 6.0,
            min_c3_day: 2.0,
            min_c3_night: 1.5,
            max_c3_day: 6.0,
            max_c3_night: 5.0,
            min_confidence: 0.5,
        }
    }
}

/// options of the histogram based night time detector (2.2µm channel)
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct NightConfig {
    pub enabled: bool,
    /// pixels with a larger SZA have no solar contribution
    pub sza_thresh: f32,
    pub vid_thresh: f32,
    /// vis radiance and vis-diff that are flagged as fire even without PFP (both have to pass)
    pub def_fire_rad_vis: f32,
    pub def_fire_rad_vid: f32,
    pub rad_sum_thr: f32,
    pub hist_range: (f32,f32),
    pub hist_bins: usize,
}

impl Default for NightConfig {
    fn default()->Self {
        NightConfig {
            enabled: true,
            sza_thresh: 97.0,
            vid_thresh: 0.02,
            def_fire_rad_vis: 0.5,
            def_fire_rad_vid: 0.5,
            rad_sum_thr: 0.99,
            hist_range: (0.0, 2.0),
            hist_bins: 800,
        }
    }
}

/// per-platform MIR calibration constants 'a' of the FRP estimate (W m-2 sr-1 µm-1 K-4)
#[derive(Debug,Clone,Default,Serialize,Deserialize)]
#[serde(default)]
pub struct FrpConfig {
    pub platform_constants: HashMap<String,f32>,
}

impl FrpConfig {
    pub fn with_constant<S: ToString> (mut self, platform: S, a: f32)->Self {
        self.platform_constants.insert( platform.to_string(), a);
        self
    }
}
