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

//! contextual background statistics of candidate fire pixels.
//!
//! For each candidate we grow a square window around the pixel (starting with 3x3) until it contains
//! at least `min_valid` background pixels, i.e. pixels that are valid, not candidates themselves and not
//! excluded as cloud or water. Mean and standard deviation of the BTD and MIR channels are then computed
//! over this background set. Since the background composition differs for every pixel this cannot be
//! expressed as a global convolution.
//!
//! Growing the window only visits the new outer ring of cells (the two border rows plus the two border
//! columns in between), hence the total work per pixel is proportional to the final window area. Growth
//! stops as soon as the clipped window covers the whole grid.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use tracing::debug;
use crate::{
    config::WindowConfig,
    errors::{Result, invalid_parameter},
    grid::{FloatGrid, RunningStats, check_shape}
};

/// which neighbors are not eligible as background, and how they are counted
#[derive(Debug,Clone)]
pub enum ExclusionPolicy<'a> {
    /// only candidates and invalid cells are excluded
    Unmasked,
    /// cells that are not of the `land_val` class count as water
    LandSea { lsm: ArrayView2<'a,u8>, land_val: u8 },
    /// non-zero cloud mask cells count as cloud
    Cloud { cloud: ArrayView2<'a,u8> },
    LandSeaAndCloud { lsm: ArrayView2<'a,u8>, land_val: u8, cloud: ArrayView2<'a,u8> },
}

impl<'a> ExclusionPolicy<'a> {
    pub fn from_masks (lsm: Option<ArrayView2<'a,u8>>, cloud: Option<ArrayView2<'a,u8>>, land_val: u8)->Self {
        match (lsm, cloud) {
            (Some(lsm), Some(cloud)) => ExclusionPolicy::LandSeaAndCloud { lsm, land_val, cloud },
            (Some(lsm), None) => ExclusionPolicy::LandSea { lsm, land_val },
            (None, Some(cloud)) => ExclusionPolicy::Cloud { cloud },
            (None, None) => ExclusionPolicy::Unmasked
        }
    }

    fn check_shape (&self, shape: (usize,usize))->Result<()> {
        match self {
            ExclusionPolicy::Unmasked => Ok(()),
            ExclusionPolicy::LandSea { lsm, .. } => check_shape( "lsm", lsm, shape),
            ExclusionPolicy::Cloud { cloud } => check_shape( "cloud_mask", cloud, shape),
            ExclusionPolicy::LandSeaAndCloud { lsm, cloud, .. } => {
                check_shape( "lsm", lsm, shape)?;
                check_shape( "cloud_mask", cloud, shape)
            }
        }
    }

    #[inline]
    fn is_cloud (&self, idx: [usize;2])->bool {
        match self {
            ExclusionPolicy::Cloud { cloud } | ExclusionPolicy::LandSeaAndCloud { cloud, .. } => cloud[idx] != 0,
            _ => false
        }
    }

    #[inline]
    fn is_water (&self, idx: [usize;2])->bool {
        match self {
            ExclusionPolicy::LandSea { lsm, land_val } | ExclusionPolicy::LandSeaAndCloud { lsm, land_val, .. } => lsm[idx] != *land_val,
            _ => false
        }
    }
}

/// background statistics of a single pixel. `n_window == 0` means there were not enough
/// background pixels within the maximum window (or the pixel is no candidate)
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct WindowStats {
    pub mean_btd: f32,
    pub std_btd: f32,
    pub mean_mir: f32,
    pub std_mir: f32,
    pub n_window: u32,
    pub n_cloud: u32,
    pub n_water: u32,
}

impl WindowStats {
    pub const UNAVAILABLE: WindowStats = WindowStats {
        mean_btd: f32::NAN, std_btd: f32::NAN, mean_mir: f32::NAN, std_mir: f32::NAN,
        n_window: 0, n_cloud: 0, n_water: 0
    };

    #[inline]
    pub fn is_available (&self)->bool { self.n_window > 0 }
}

/// co-registered grids of per pixel [`WindowStats`]
#[derive(Debug,Clone)]
pub struct WindowStatsGrid {
    pub mean_btd: FloatGrid,
    pub std_btd: FloatGrid,
    pub mean_mir: FloatGrid,
    pub std_mir: FloatGrid,
    pub n_window: Array2<u32>,
    pub n_cloud: Array2<u32>,
    pub n_water: Array2<u32>,
}

impl WindowStatsGrid {
    fn from_rows (shape: (usize,usize), rows: Vec<Vec<WindowStats>>)->Self {
        let cell = |r: usize, c: usize| &rows[r][c];

        WindowStatsGrid {
            mean_btd: Array2::from_shape_fn( shape, |(r,c)| cell(r,c).mean_btd),
            std_btd: Array2::from_shape_fn( shape, |(r,c)| cell(r,c).std_btd),
            mean_mir: Array2::from_shape_fn( shape, |(r,c)| cell(r,c).mean_mir),
            std_mir: Array2::from_shape_fn( shape, |(r,c)| cell(r,c).std_mir),
            n_window: Array2::from_shape_fn( shape, |(r,c)| cell(r,c).n_window),
            n_cloud: Array2::from_shape_fn( shape, |(r,c)| cell(r,c).n_cloud),
            n_water: Array2::from_shape_fn( shape, |(r,c)| cell(r,c).n_water),
        }
    }

    pub fn shape (&self)->(usize,usize) { self.n_window.dim() }

    pub fn get (&self, row: usize, col: usize)->WindowStats {
        let idx = [row,col];
        WindowStats {
            mean_btd: self.mean_btd[idx],
            std_btd: self.std_btd[idx],
            mean_mir: self.mean_mir[idx],
            std_mir: self.std_mir[idx],
            n_window: self.n_window[idx],
            n_cloud: self.n_cloud[idx],
            n_water: self.n_water[idx],
        }
    }

    pub fn n_available (&self)->usize {
        self.n_window.iter().filter( |&&n| n > 0).count()
    }
}

/// the window statistics computation for a given (validated) window configuration
#[derive(Debug,Clone,Copy)]
pub struct WindowStatsEngine {
    min_valid: usize,
    max_window: usize,
}

impl WindowStatsEngine {
    pub fn new (min_valid: usize, max_window: usize)->Result<Self> {
        if min_valid == 0 {
            return Err( invalid_parameter!("min_valid has to be at least 1"))
        }
        if max_window == 0 {
            return Err( invalid_parameter!("max_window has to be at least 1"))
        }
        let max_population = max_window.checked_mul(2)
            .and_then( |d| d.checked_add(1))
            .and_then( |d| d.checked_pow(2))
            .map( |n| n - 1)
            .ok_or_else( || invalid_parameter!("max_window {} is too large", max_window))?;
        if min_valid > max_population {
            return Err( invalid_parameter!("min_valid {} exceeds the {} neighbors of a window with half-size {}", min_valid, max_population, max_window))
        }

        Ok( WindowStatsEngine { min_valid, max_window } )
    }

    pub fn from_config (config: &WindowConfig)->Result<Self> {
        Self::new( config.min_valid, config.max_window)
    }

    pub fn compute (&self, btd: &ArrayView2<f32>, mir_bt: &ArrayView2<f32>, candidates: &ArrayView2<u8>,
                    policy: &ExclusionPolicy)->Result<WindowStatsGrid> {
        let shape = candidates.dim();
        check_shape( "btd", btd, shape)?;
        check_shape( "mir_bt", mir_bt, shape)?;
        policy.check_shape( shape)?;

        let (rows,cols) = shape;
        let stats_rows: Vec<Vec<WindowStats>> = (0..rows).into_par_iter().map( |r| {
            (0..cols).map( |c| {
                if candidates[[r,c]] != 0 {
                    self.pixel_stats( r, c, btd, mir_bt, candidates, policy)
                } else {
                    WindowStats::UNAVAILABLE
                }
            }).collect()
        }).collect();

        let grid = WindowStatsGrid::from_rows( shape, stats_rows);

        let n_candidates = candidates.iter().filter( |&&m| m != 0).count();
        let n_available = grid.n_available();
        if n_available < n_candidates {
            debug!("insufficient background for {} of {} candidate pixels", n_candidates - n_available, n_candidates);
        }

        Ok(grid)
    }

    fn pixel_stats (&self, r: usize, c: usize, btd: &ArrayView2<f32>, mir_bt: &ArrayView2<f32>,
                    candidates: &ArrayView2<u8>, policy: &ExclusionPolicy)->WindowStats {
        let (rows,cols) = candidates.dim();
        let mut acc = WindowAccumulator::default();

        acc.n_window = 1; // the pixel itself

        for w in 1..=self.max_window {
            let r0 = r.saturating_sub(w);
            let r1 = (r + w).min( rows - 1);
            let c0 = c.saturating_sub(w);
            let c1 = (c + w).min( cols - 1);

            // only the ring at Chebyshev distance w is new
            if r >= w {
                for cc in c0..=c1 { acc.add( [r - w, cc], btd, mir_bt, candidates, policy) }
            }
            if r + w < rows {
                for cc in c0..=c1 { acc.add( [r + w, cc], btd, mir_bt, candidates, policy) }
            }
            let has_left = c >= w;
            let has_right = c + w < cols;
            if has_left || has_right {
                for rr in r.saturating_sub(w - 1)..=(r + w - 1).min( rows - 1) {
                    if has_left { acc.add( [rr, c - w], btd, mir_bt, candidates, policy) }
                    if has_right { acc.add( [rr, c + w], btd, mir_bt, candidates, policy) }
                }
            }

            if acc.btd.n >= self.min_valid {
                return acc.to_window_stats()
            }
            if r0 == 0 && c0 == 0 && r1 == rows - 1 && c1 == cols - 1 {
                break // window covers the grid, no more cells to add
            }
        }

        WindowStats::UNAVAILABLE
    }
}

#[derive(Default)]
struct WindowAccumulator {
    btd: RunningStats,
    mir: RunningStats,
    n_window: u32,
    n_cloud: u32,
    n_water: u32,
}

impl WindowAccumulator {
    #[inline]
    fn add (&mut self, idx: [usize;2], btd: &ArrayView2<f32>, mir_bt: &ArrayView2<f32>, candidates: &ArrayView2<u8>, policy: &ExclusionPolicy) {
        self.n_window += 1;

        if candidates[idx] != 0 { return }
        if policy.is_cloud( idx) { self.n_cloud += 1; return }
        if policy.is_water( idx) { self.n_water += 1; return }

        let vb = btd[idx];
        let vm = mir_bt[idx];
        if vb.is_nan() || vm.is_nan() { return }

        self.btd.add( vb as f64);
        self.mir.add( vm as f64);
    }

    fn to_window_stats (&self)->WindowStats {
        WindowStats {
            mean_btd: self.btd.mean_or_nan() as f32,
            std_btd: self.btd.std_dev() as f32,
            mean_mir: self.mir.mean_or_nan() as f32,
            std_mir: self.mir.std_dev() as f32,
            n_window: self.n_window,
            n_cloud: self.n_cloud,
            n_water: self.n_water,
        }
    }
}

/// compute the background statistics for all pixels flagged in `candidates`
pub fn compute_window_stats (btd: &ArrayView2<f32>, mir_bt: &ArrayView2<f32>, candidates: &ArrayView2<u8>,
                             policy: &ExclusionPolicy, min_valid: usize, max_window: usize)->Result<WindowStatsGrid> {
    WindowStatsEngine::new( min_valid, max_window)?.compute( btd, mir_bt, candidates, policy)
}
