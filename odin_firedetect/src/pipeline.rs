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

use std::time::Instant;
use ndarray::{ArrayView2, Zip};
use serde::Serialize;
use tracing::{debug, info, warn};
use uom::si::f32::{Area, Power};
use uom::si::{area::square_kilometer, power::megawatt};
use crate::{
    config::FireDetectConfig,
    confidence::{confirm_fires, rejected_candidates, score},
    errors::{Result, missing_band},
    frp::estimate_for_platform,
    grid::{BandRole, BandSet, FloatGrid, MaskGrid, check_shape, count_set},
    kernel::check_kernel_size,
    night::{NightDetections, detect_night_fires},
    stage1::classify,
    window_stats::{ExclusionPolicy, WindowStatsEngine, WindowStatsGrid}
};

/// the terminal output of a detection run. All grids are co-registered with the input bands
#[derive(Debug,Clone)]
pub struct DetectionResult {
    pub fire_mask: MaskGrid,
    pub confidence: FloatGrid,
    /// FRP in MW. None if it could not be computed (e.g. unknown platform), which does not invalidate the detections
    pub frp: Option<FloatGrid>,

    pub pfp_mask: MaskGrid,
    pub window_stats: WindowStatsGrid,
    pub night: Option<NightDetections>,
}

/// a single detected fire pixel
#[derive(Debug,Clone,Serialize)]
pub struct FirePixel {
    pub row: usize,
    pub col: usize,
    pub confidence: f32,
    #[serde(serialize_with = "ser_power_as_mw")]
    pub frp: Option<Power>,
    #[serde(serialize_with = "ser_area_as_km2")]
    pub area: Option<Area>,
}

fn ser_power_as_mw<S: serde::Serializer> (v: &Option<Power>, s: S)->std::result::Result<S::Ok,S::Error> {
    v.as_ref().map( |p| p.get::<megawatt>()).serialize(s)
}

fn ser_area_as_km2<S: serde::Serializer> (v: &Option<Area>, s: S)->std::result::Result<S::Ok,S::Error> {
    v.as_ref().map( |a| a.get::<square_kilometer>()).serialize(s)
}

impl DetectionResult {
    pub fn n_fires (&self)->usize { count_set( &self.fire_mask.view()) }

    /// the detected fire pixels in row major order. `pixel_area` is in km²
    pub fn fire_pixels (&self, pixel_area: Option<&ArrayView2<f32>>)->Vec<FirePixel> {
        self.fire_mask.indexed_iter()
            .filter( |(_,m)| **m != 0)
            .map( |((row,col),_)| {
                let idx = [row,col];
                FirePixel {
                    row,
                    col,
                    confidence: self.confidence[idx],
                    frp: self.frp.as_ref().map( |frp| Power::new::<megawatt>( frp[idx])),
                    area: pixel_area.map( |a| Area::new::<square_kilometer>( a[idx])),
                }
            })
            .collect()
    }
}

/// the contextual fire detection pipeline:
/// stage 1 → window statistics → confidence → (night detection merge) → FRP
pub struct FireDetector<'a> {
    config: &'a FireDetectConfig,
    window_engine: WindowStatsEngine,
}

impl<'a> FireDetector<'a> {
    /// validates the configuration before any grid is processed
    pub fn new (config: &'a FireDetectConfig)->Result<Self> {
        for ksize in &config.stage1.kernel_sizes { check_kernel_size( *ksize)? }
        let window_engine = WindowStatsEngine::from_config( &config.window)?;

        Ok( FireDetector { config, window_engine } )
    }

    /// run detection on `bands`. The optional cloud mask (non-zero = cloud) excludes pixels from the background
    /// windows. `platform` selects the FRP calibration constant
    pub fn detect (&self, bands: &BandSet, cloud_mask: Option<&ArrayView2<u8>>, platform: &str)->Result<DetectionResult> {
        let cfg = self.config;
        let shape = bands.shape();
        let t0 = Instant::now();

        bands.require( &[BandRole::MirBt, BandRole::Btd, BandRole::VisDiff, BandRole::Sza])?;
        if let Some(cloud) = cloud_mask { check_shape( "cloud_mask", cloud, shape)? }

        let mir_bt = bands.get( BandRole::MirBt)?;
        let btd = bands.get( BandRole::Btd)?;
        let vis_diff = bands.get( BandRole::VisDiff)?;
        let sza = bands.get( BandRole::Sza)?;

        let lsm_opt = bands.lsm().ok();
        if lsm_opt.is_none() && cfg.stage1.do_lsm_mask {
            return Err( missing_band( "lsm"))
        }
        let all_land: MaskGrid;
        let lsm = match lsm_opt.clone() {
            Some(lsm) => lsm,
            None => {
                all_land = MaskGrid::from_elem( shape, cfg.lsm_land_val);
                all_land.view()
            }
        };

        //--- stage 1
        let pfp_mask = classify( &mir_bt, &btd, &vis_diff, &sza, &lsm, cfg.lsm_land_val, &cfg.stage1)?;
        let n_pfp = count_set( &pfp_mask.view());

        //--- contextual background statistics
        let policy = ExclusionPolicy::from_masks( lsm_opt, cloud_mask.cloned(), cfg.lsm_land_val);
        let window_stats = self.window_engine.compute( &btd, &mir_bt, &pfp_mask.view(), &policy)?;

        //--- stage 5 confidence
        let confidence = score( &btd, &mir_bt, &window_stats, &sza, &cfg.confidence)?;
        let mut fire_mask = confirm_fires( &confidence.view(), cfg.confidence.min_confidence);
        debug!("{} candidates rejected by confidence", count_set( &rejected_candidates( &confidence.view(), &fire_mask.view()).view()));

        //--- night time detection
        let night = match bands.get_opt( BandRole::Vis2Rad) {
            Some(vis2) if cfg.night.enabled => {
                let vid = bands.get_opt( BandRole::VisDiffAdj).unwrap_or( vis_diff.view());
                let night = detect_night_fires( &vis2, &sza, &vid, &pfp_mask.view(), &cfg.night)?;
                Zip::from( &mut fire_mask).and( &night.fire_mask).for_each( |m, &n| if n != 0 { *m = 1 });
                Some(night)
            }
            _ => None
        };

        //--- FRP (failures here do not invalidate the detection)
        let frp = match bands.get( BandRole::PixelArea) {
            Ok(pixel_area) => {
                match estimate_for_platform( &pixel_area, &window_stats.mean_mir.view(), &mir_bt, &fire_mask.view(), &cfg.frp, platform) {
                    Ok(frp) => Some(frp),
                    Err(e) => { warn!("no FRP estimate: {}", e); None }
                }
            }
            Err(e) => { warn!("no FRP estimate: {}", e); None }
        };

        let result = DetectionResult { fire_mask, confidence, frp, pfp_mask, window_stats, night };
        info!("detected {} fire pixels ({} potential) in {}x{} grid in {:?}", result.n_fires(), n_pfp, shape.0, shape.1, t0.elapsed());

        Ok(result)
    }
}

/// convenience function to run a single detection
pub fn detect_fires (bands: &BandSet, config: &FireDetectConfig, cloud_mask: Option<&ArrayView2<u8>>, platform: &str)->Result<DetectionResult> {
    FireDetector::new( config)?.detect( bands, cloud_mask, platform)
}
