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

//! stage 5 confidence of candidate pixels (eqn 8 of Roberts & Wooster)

use ndarray::{ArrayView2, Zip};
use crate::{
    config::ConfidenceConfig,
    errors::Result,
    grid::{FloatGrid, MaskGrid, check_shape},
    window_stats::{WindowStats, WindowStatsGrid}
};

/// clipped linear ramp between `a` (0) and `b` (1). NaN values map to 0
#[inline]
pub fn comp_stat (x: f32, a: f32, b: f32)->f32 {
    if x.is_nan() { return 0.0 }
    if x < a { 0.0 } else if x > b { 1.0 } else { (x - a) / (b - a) }
}

#[inline]
fn interpolate (day: f32, night: f32, sza: f32, night_sza: f32)->f32 {
    day + (night - day) / night_sza * sza
}

/// confidence of a single pixel from its channel values and background statistics
pub fn pixel_confidence (btd: f32, mir_bt: f32, sza: f32, stats: &WindowStats, cfg: &ConfidenceConfig)->f32 {
    if !stats.is_available() { return 0.0 }

    // SZA is only clamped for the purpose of interpolation
    let sza = if sza > cfg.night_sza { cfg.night_sza } else { sza };

    let z_mir = (mir_bt - stats.mean_mir) / stats.std_mir;
    let z_btd = (btd - stats.mean_btd) / stats.std_btd;

    let min_c1 = interpolate( cfg.min_c1_day, cfg.min_c1_night, sza, cfg.night_sza);
    let max_c1 = interpolate( cfg.max_c1_day, cfg.max_c1_night, sza, cfg.night_sza);
    let min_c3 = interpolate( cfg.min_c3_day, cfg.min_c3_night, sza, cfg.night_sza);
    let max_c3 = interpolate( cfg.max_c3_day, cfg.max_c3_night, sza, cfg.night_sza);

    let half_window = stats.n_window as f32 / 2.0;

    let c1 = comp_stat( mir_bt, min_c1, max_c1);
    let c2 = comp_stat( z_mir, cfg.min_c2, cfg.max_c2);
    let c3 = comp_stat( z_btd, min_c3, max_c3);
    let c4 = 1.0 - comp_stat( stats.n_cloud as f32 / half_window, 0.0, 1.0);
    let c5 = 1.0 - comp_stat( stats.n_water as f32 / half_window, 0.0, 1.0);

    (c1 * c2 * c3 * c4 * c5).powf( 1.0 / 5.0)
}

/// per pixel confidence in [0,1]. Pixels without background statistics (including all non-candidates) get 0
pub fn score (btd: &ArrayView2<f32>, mir_bt: &ArrayView2<f32>, window_stats: &WindowStatsGrid, sza: &ArrayView2<f32>,
              cfg: &ConfidenceConfig)->Result<FloatGrid> {
    let shape = window_stats.shape();
    check_shape( "btd", btd, shape)?;
    check_shape( "mir_bt", mir_bt, shape)?;
    check_shape( "sza", sza, shape)?;

    let conf = FloatGrid::from_shape_fn( shape, |(r,c)| {
        pixel_confidence( btd[[r,c]], mir_bt[[r,c]], sza[[r,c]], &window_stats.get(r,c), cfg)
    });

    Ok(conf)
}

/// the detection mask of pixels with at least `min_confidence`
pub fn confirm_fires (confidence: &ArrayView2<f32>, min_confidence: f32)->MaskGrid {
    confidence.mapv( |c| if c > 0.0 && c >= min_confidence { 1 } else { 0 })
}

/// pixels with nonzero confidence that did not make it into the detection mask
pub fn rejected_candidates (confidence: &ArrayView2<f32>, fire_mask: &ArrayView2<u8>)->MaskGrid {
    Zip::from( confidence).and( fire_mask).map_collect( |&c, &m| if c > 0.0 && m == 0 { 1 } else { 0 })
}
