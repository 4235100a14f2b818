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

//! fire radiative power of confirmed fire pixels (MIR method, Wooster et al. 2003)

use ndarray::{ArrayView2, Zip};
use crate::{
    config::FrpConfig,
    errors::{Result, OdinFireDetectError},
    grid::{FloatGrid, check_shape}
};

/// Stefan-Boltzmann constant (W m-2 K-4)
pub const STEFAN_BOLTZMANN: f32 = 5.670373e-8;

/// the calibration constant `a` of the given platform
pub fn sensor_constant (cfg: &FrpConfig, platform: &str)->Result<f32> {
    cfg.platform_constants.get( platform)
        .copied()
        .ok_or_else( || OdinFireDetectError::UnsupportedPlatform( platform.to_string()))
}

/// FRP in MW for a pixel area given in km². Zero where there is no fire or no valid (positive) background
#[inline]
pub fn pixel_frp (pixel_area: f32, mean_mir: f32, mir_bt: f32, is_fire: bool, sensor_constant: f32)->f32 {
    if !is_fire || !(mean_mir > 0.0) { return 0.0 }
    pixel_area * STEFAN_BOLTZMANN / sensor_constant * (mir_bt - mean_mir)
}

pub fn estimate (pixel_area: &ArrayView2<f32>, mean_mir: &ArrayView2<f32>, mir_bt: &ArrayView2<f32>,
                 fire_mask: &ArrayView2<u8>, sensor_constant: f32)->Result<FloatGrid> {
    let shape = fire_mask.dim();
    check_shape( "pixel_area", pixel_area, shape)?;
    check_shape( "mean_mir", mean_mir, shape)?;
    check_shape( "mir_bt", mir_bt, shape)?;

    let frp = Zip::from( pixel_area).and( mean_mir).and( mir_bt).and( fire_mask).map_collect( |&a, &mm, &mir, &m| {
        pixel_frp( a, mm, mir, m != 0, sensor_constant)
    });

    Ok(frp)
}

/// look up the platform constant and estimate FRP. Fails with `UnsupportedPlatform` if there is no constant
pub fn estimate_for_platform (pixel_area: &ArrayView2<f32>, mean_mir: &ArrayView2<f32>, mir_bt: &ArrayView2<f32>,
                              fire_mask: &ArrayView2<u8>, cfg: &FrpConfig, platform: &str)->Result<FloatGrid> {
    let a = sensor_constant( cfg, platform)?;
    estimate( pixel_area, mean_mir, mir_bt, fire_mask, a)
}
