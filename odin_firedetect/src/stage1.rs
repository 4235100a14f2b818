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

//! stage 1a/1b tests that flag potential fire pixels (PFP)

use ndarray::{ArrayView2, Zip};
use tracing::debug;
use crate::{
    config::Stage1Config,
    errors::Result,
    grid::{FloatGrid, MaskGrid, check_shape, count_set},
    kernel::{check_kernel_size, convolve}
};

/// the SZA adjusted MIR and BTD thresholds of a single pixel, never below their configured limits
#[inline]
pub fn pixel_thresholds (sza: f32, cfg: &Stage1Config)->(f32,f32) {
    let mir_thresh = (cfg.mir_thresh_bt + cfg.mir_thresh_sza_adj * sza).max( cfg.mir_thresh_limit);
    let btd_thresh = (cfg.btd_thresh_bt + cfg.btd_thresh_sza_adj * sza).max( cfg.btd_thresh_limit);
    (mir_thresh, btd_thresh)
}

/// per pixel MIR and BTD thresholds
pub fn initial_thresholds (sza: &ArrayView2<f32>, cfg: &Stage1Config)->(FloatGrid,FloatGrid) {
    let mir_thresh = sza.map( |&s| pixel_thresholds( s, cfg).0);
    let btd_thresh = sza.map( |&s| pixel_thresholds( s, cfg).1);
    (mir_thresh, btd_thresh)
}

/// run the stage 1 tests and return the mask of potential fire pixels.
///
/// Each kernel size contributes one vote where the high pass filtered BTD exceeds the SZA adjusted multiple
/// of its global standard deviation. The MIR and BTD threshold tests then each add a vote if passed, but
/// reset the counter to zero if failed - a pixel failing either of them is rejected regardless of its kernel
/// votes. Pixels that are not land (if `do_lsm_mask` is set) or have a negative `vis_diff` are rejected.
pub fn classify (mir_bt: &ArrayView2<f32>, btd: &ArrayView2<f32>, vis_diff: &ArrayView2<f32>, sza: &ArrayView2<f32>,
                 lsm: &ArrayView2<u8>, lsm_land_val: u8, cfg: &Stage1Config)->Result<MaskGrid> {
    let shape = mir_bt.dim();
    check_shape( "btd", btd, shape)?;
    check_shape( "vis_diff", vis_diff, shape)?;
    check_shape( "sza", sza, shape)?;
    check_shape( "lsm", lsm, shape)?;
    for ksize in &cfg.kernel_sizes { check_kernel_size( *ksize)? }

    let mut votes = MaskGrid::zeros( shape);

    // stage 1b, applied before 1a
    for ksize in &cfg.kernel_sizes {
        let (filtered, std) = convolve( btd, *ksize)?;
        debug!("stage 1b kernel {}x{}: global std {}", ksize, ksize, std);

        Zip::from( &mut votes).and( &filtered).and( sza).for_each( |v, &f, &s| {
            if f >= std * (cfg.kern_thresh_btd + cfg.kern_thresh_sza_adj * s) { *v += 1 }
        });
    }

    // stage 1a - these are hard gates, not votes
    Zip::from( &mut votes).and( mir_bt).and( btd).and( sza).for_each( |v, &mir, &bt, &s| {
        let (mir_thresh, btd_thresh) = pixel_thresholds( s, cfg);
        *v = if mir >= mir_thresh { *v + 1 } else { 0 };
        *v = if bt >= btd_thresh { *v + 1 } else { 0 };
    });

    if cfg.do_lsm_mask {
        Zip::from( &mut votes).and( lsm).for_each( |v, &l| if l != lsm_land_val { *v = 0 });
    }

    // only pixels with positive MIR radiance after VIS and IR subtraction (NaN is no valid radiance)
    Zip::from( &mut votes).and( vis_diff).for_each( |v, &vd| if !(vd >= 0.0) { *v = 0 });

    let pfp = votes.mapv( |v| if v >= cfg.stage1_pass_thresh { 1u8 } else { 0 });
    debug!("stage 1 flagged {} potential fire pixels", count_set( &pfp.view()));

    Ok(pfp)
}
