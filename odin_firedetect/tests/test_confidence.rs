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
#![allow(unused)]

use ndarray::array;
use odin_firedetect::{OdinFireDetectError, FloatGrid, MaskGrid};
use odin_firedetect::config::ConfidenceConfig;
use odin_firedetect::confidence::{comp_stat, confirm_fires, pixel_confidence, rejected_candidates, score};
use odin_firedetect::window_stats::{ExclusionPolicy, WindowStats, compute_window_stats};

/// run with "cargo test --test test_confidence -- --nocapture"

fn background (n_window: u32, n_cloud: u32, n_water: u32)->WindowStats {
    WindowStats { mean_btd: 2.0, std_btd: 0.5, mean_mir: 300.0, std_mir: 1.0, n_window, n_cloud, n_water }
}

#[test]
fn test_comp_stat () {
    assert_eq!( comp_stat( 1.0, 2.0, 4.0), 0.0);
    assert_eq!( comp_stat( 5.0, 2.0, 4.0), 1.0);
    assert_eq!( comp_stat( 3.0, 2.0, 4.0), 0.5);
    assert_eq!( comp_stat( 2.0, 2.0, 4.0), 0.0);
    assert_eq!( comp_stat( 4.0, 2.0, 4.0), 1.0);
    assert_eq!( comp_stat( f32::NAN, 2.0, 4.0), 0.0);
    assert_eq!( comp_stat( f32::INFINITY, 2.0, 4.0), 1.0);
}

#[test]
fn test_pixel_confidence () {
    let cfg = ConfidenceConfig::default();

    // clear fire
    let c = pixel_confidence( 40.0, 340.0, 10.0, &background( 9, 0, 0), &cfg);
    println!("confidence of clear fire: {}", c);
    assert!( (c - 1.0).abs() < 1e-6);

    // no statistics
    assert_eq!( pixel_confidence( 40.0, 340.0, 10.0, &WindowStats::UNAVAILABLE, &cfg), 0.0);

    // window is half cloud
    assert_eq!( pixel_confidence( 40.0, 340.0, 10.0, &background( 9, 5, 0), &cfg), 0.0);

    // window is half water
    assert_eq!( pixel_confidence( 40.0, 340.0, 10.0, &background( 9, 0, 5), &cfg), 0.0);

    // a pixel that is not warmer than its background
    assert_eq!( pixel_confidence( 2.0, 300.0, 10.0, &background( 9, 0, 0), &cfg), 0.0);

    // partial contamination reduces confidence
    let c_cloud = pixel_confidence( 40.0, 340.0, 10.0, &background( 25, 3, 0), &cfg);
    println!("confidence with 3 of 25 cloud pixels: {}", c_cloud);
    assert!( c_cloud > 0.0 && c_cloud < 1.0);
}

#[test]
fn test_night_clamp () {
    let cfg = ConfidenceConfig::default();
    let stats = background( 9, 1, 0);

    let c60 = pixel_confidence( 6.0, 303.0, 60.0, &stats, &cfg);
    let c120 = pixel_confidence( 6.0, 303.0, 120.0, &stats, &cfg);
    println!("confidence at 60°: {}, at 120°: {}", c60, c120);
    assert_eq!( c60, c120);

    // night bounds are lower, so the same pixel is more confident at night
    let c0 = pixel_confidence( 6.0, 303.0, 0.0, &stats, &cfg);
    assert!( c60 > 0.0 && c0 < c60);
}

#[test]
fn test_bounds () {
    let cfg = ConfidenceConfig::default();
    for mir in [250.0, 285.0, 300.0, 310.0, 330.0, 400.0] {
        for btd in [-5.0, 0.0, 2.5, 4.0, 10.0] {
            for sza in [0.0, 30.0, 60.0, 90.0, 150.0] {
                for n_cloud in [0, 2, 9] {
                    let c = pixel_confidence( btd, mir, sza, &background( 25, n_cloud, 1), &cfg);
                    assert!( (0.0..=1.0).contains( &c), "confidence {} out of range", c);
                }
            }
        }
    }
}

#[test]
fn test_score_and_confirm () {
    let shape = (5,5);
    let mut mir = FloatGrid::from_elem( shape, 300.0);
    let mut btd = FloatGrid::from_elem( shape, 2.0);
    mir[[2,2]] = 340.0;
    btd[[2,2]] = 40.0;
    // a weak candidate in the corner with a textured background
    mir[[0,4]] = 302.5;
    btd[[0,4]] = 3.0;
    mir[[0,3]] = 302.0;
    btd[[0,3]] = 1.5;
    mir[[1,4]] = 301.0;
    btd[[1,4]] = 2.5;
    let sza = FloatGrid::from_elem( shape, 10.0);

    let mut candidates = MaskGrid::zeros( shape);
    candidates[[2,2]] = 1;
    candidates[[0,4]] = 1;

    let ws = compute_window_stats( &btd.view(), &mir.view(), &candidates.view(), &ExclusionPolicy::Unmasked, 3, 2).unwrap();
    let conf = score( &btd.view(), &mir.view(), &ws, &sza.view(), &ConfidenceConfig::default()).unwrap();
    println!("confidence:\n{:?}", conf);

    assert!( conf[[2,2]] > 0.99);
    assert!( conf[[0,4]] > 0.0 && conf[[0,4]] < 0.5);
    assert_eq!( conf[[1,1]], 0.0);

    let fires = confirm_fires( &conf.view(), 0.5);
    assert_eq!( fires[[2,2]], 1);
    assert_eq!( fires.iter().filter( |&&m| m != 0).count(), 1);

    let rejected = rejected_candidates( &conf.view(), &fires.view());
    assert_eq!( rejected[[2,2]], 0);
    assert_eq!( rejected[[0,4]], 1);
    assert_eq!( rejected[[1,1]], 0);

    let bad_sza = FloatGrid::from_elem( (5,6), 10.0);
    assert!( matches!( score( &btd.view(), &mir.view(), &ws, &bad_sza.view(), &ConfidenceConfig::default()),
                       Err(OdinFireDetectError::ShapeMismatch{..})));
}

#[test]
fn test_confirm_threshold () {
    let conf: FloatGrid = array![[0.0, 0.3, 0.5, 0.9]];

    let fires = confirm_fires( &conf.view(), 0.5);
    assert_eq!( fires, array![[0u8, 0, 1, 1]]);

    // zero confidence never is a fire
    let fires = confirm_fires( &conf.view(), 0.0);
    assert_eq!( fires, array![[0u8, 1, 1, 1]]);

    let rejected = rejected_candidates( &conf.view(), &confirm_fires( &conf.view(), 0.5).view());
    assert_eq!( rejected, array![[0u8, 1, 0, 0]]);
}
