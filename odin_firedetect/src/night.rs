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

//! detection of large night time fires from a short wave (2.2µm or 1.6µm) channel.
//!
//! At night this channel has no solar contribution, so bright pixels are either fires or artificial
//! lights. The background radiance threshold is derived from the histogram of all night pixels.
//! The `sza_thresh` has to be chosen so that only pixels without solar contribution are included -
//! the default assumes the 2.2µm channel, the 1.6µm channel works with lower sensitivity.

use ndarray::{ArrayView2, Zip};
use tracing::{debug, info};
use crate::{
    config::NightConfig,
    errors::{Result, invalid_parameter},
    grid::{MaskGrid, check_shape, count_set},
    kernel::{focal_max_3x3, focal_sum_3x3}
};

#[derive(Debug,Clone)]
pub struct NightDetections {
    /// final night detections (candidates and definite detections, night pixels only)
    pub fire_mask: MaskGrid,
    /// detections that pass the absolute radiance thresholds, regardless of stage 1
    pub definite_mask: MaskGrid,
    /// the background radiance threshold, None if it could not be computed
    pub threshold: Option<f32>,
}

impl NightDetections {
    fn empty (shape: (usize,usize))->Self {
        NightDetections { fire_mask: MaskGrid::zeros( shape), definite_mask: MaskGrid::zeros( shape), threshold: None }
    }

    pub fn n_fires (&self)->usize { count_set( &self.fire_mask.view()) }
}

/// the background radiance threshold of the visible channel at night. This is the (lower edge) radiance of the first
/// histogram bin at which the cumulative frequency of night pixels with positive radiance exceeds `rad_sum_thr`.
/// Returns None if there are no such pixels within the histogram range
pub fn background_radiance_threshold (vis: &ArrayView2<f32>, sza: &ArrayView2<f32>, opts: &NightConfig)->Option<f32> {
    let n_bins = opts.hist_bins;
    let (lo,hi) = (opts.hist_range.0 as f64, opts.hist_range.1 as f64);
    if n_bins == 0 || !(hi > lo) { return None }

    let bin_width = (hi - lo) / n_bins as f64;
    let mut hist = vec![0u64; n_bins];

    Zip::from( vis).and( sza).for_each( |&v, &s| {
        if s > opts.sza_thresh && v > 0.0 {
            let v = v as f64;
            if v >= lo && v <= hi {
                // the last bin is closed on both sides
                let i = (((v - lo) / bin_width) as usize).min( n_bins - 1);
                hist[i] += 1;
            }
        }
    });

    let total: u64 = hist.iter().sum();
    if total == 0 { return None }

    let mut cum_sum = 0.0f64;
    let mut i = 0;
    while i < n_bins {
        cum_sum += hist[i] as f64 / total as f64;
        if cum_sum > opts.rad_sum_thr as f64 { break }
        i += 1;
    }
    let i = i.min( n_bins - 1);

    Some( (lo + i as f64 * bin_width) as f32 )
}

/// detect night time fires. `pfp` is the stage 1 potential fire pixel mask.
/// Returns all-zero masks if there are no night pixels or the background threshold can't be computed
pub fn detect_night_fires (vis2_rad: &ArrayView2<f32>, sza: &ArrayView2<f32>, vis_diff: &ArrayView2<f32>, pfp: &ArrayView2<u8>,
                           opts: &NightConfig)->Result<NightDetections> {
    let shape = vis2_rad.dim();
    check_shape( "sza", sza, shape)?;
    check_shape( "vis_diff", vis_diff, shape)?;
    check_shape( "pfp", pfp, shape)?;
    if opts.hist_bins == 0 {
        return Err( invalid_parameter!("night histogram needs at least one bin"))
    }

    let is_night = |s: f32| s > opts.sza_thresh;

    if !sza.iter().any( |&s| is_night(s)) {
        debug!("no night pixels, skipping night detection");
        return Ok( NightDetections::empty( shape))
    }

    let thr_vis = match background_radiance_threshold( vis2_rad, sza, opts) {
        Some(thr) => thr,
        None => {
            info!("degenerate night radiance histogram, no night detections");
            return Ok( NightDetections::empty( shape))
        }
    };
    debug!("night background radiance threshold: {}", thr_vis);

    let definite_mask: MaskGrid = Zip::from( vis2_rad).and( vis_diff).and( sza).map_collect( |&v, &vd, &s| {
        if v > opts.def_fire_rad_vis && vd > opts.def_fire_rad_vid && is_night(s) { 1 } else { 0 }
    });

    let candidates: MaskGrid = Zip::from( vis2_rad).and( vis_diff).and( pfp).map_collect( |&v, &vd, &p| {
        if v > thr_vis * 2.0 && vd > opts.vid_thresh && p == 1 { 1 } else { 0 }
    });

    // bright surfaces can be mistaken for fires - an isolated candidate has to have the largest
    // vis_diff of its 3x3 neighborhood (ties pass since we compare for equality). Border candidates
    // are mirrored into their own neighborhood and hence never isolated
    let det_sum = focal_sum_3x3( &candidates.view());
    let det_max = focal_max_3x3( vis_diff);

    let mut fire_mask = candidates;
    Zip::from( &mut fire_mask).and( &det_sum).and( &det_max).and( vis_diff).for_each( |m, &n, &vmax, &vd| {
        if *m != 0 && n == 1 && vd != vmax { *m = 0 }
    });

    Zip::from( &mut fire_mask).and( &definite_mask).and( sza).for_each( |m, &d, &s| {
        if d != 0 { *m = 1 }
        if !is_night(s) { *m = 0 }
    });

    let night = NightDetections { fire_mask, definite_mask, threshold: Some(thr_vis) };
    debug!("night detection found {} fire pixels", night.n_fires());

    Ok(night)
}
