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

use odin_firedetect::{BandRole, BandSet, FireDetectConfig, FireDetector, FloatGrid, MaskGrid, OdinFireDetectError, detect_fires};
use odin_firedetect::config::{LSM_LAND_VAL, Stage1Config, WindowConfig};
use odin_firedetect::grid::{count_set, print_mask};

/// run with "cargo test --test test_pipeline -- --nocapture"

const PLATFORM: &str = "test-sat";

fn config ()->FireDetectConfig {
    let mut cfg = FireDetectConfig::default();
    cfg.frp = cfg.frp.with_constant( PLATFORM, 3.0e-9);
    cfg
}

/// 5x5 daytime scene with a single 340K pixel on a uniform 300K background
fn hot_pixel_bands ()->BandSet {
    let shape = (5,5);
    let mut mir_bt = FloatGrid::from_elem( shape, 300.0);
    mir_bt[[2,2]] = 340.0;
    let mut btd = FloatGrid::from_elem( shape, 0.5);
    btd[[2,2]] = 10.0;

    BandSet::new( shape)
        .with_band( BandRole::MirBt, mir_bt).unwrap()
        .with_band( BandRole::Btd, btd).unwrap()
        .with_band( BandRole::VisDiff, FloatGrid::from_elem( shape, 0.1)).unwrap()
        .with_band( BandRole::Sza, FloatGrid::from_elem( shape, 10.0)).unwrap()
        .with_band( BandRole::PixelArea, FloatGrid::from_elem( shape, 4.0)).unwrap()
        .with_lsm( MaskGrid::from_elem( shape, LSM_LAND_VAL)).unwrap()
}

#[test]
fn test_single_hot_pixel () {
    let bands = hot_pixel_bands();
    let res = detect_fires( &bands, &config(), None, PLATFORM).unwrap();
    print_mask( &res.fire_mask.view());

    assert_eq!( count_set( &res.pfp_mask.view()), 1);
    assert_eq!( res.pfp_mask[[2,2]], 1);

    let s = res.window_stats.get( 2, 2);
    println!("background: {:?}", s);
    assert!( (s.mean_mir - 300.0).abs() < 1e-3);
    assert!( s.std_mir.abs() < 1e-3);
    assert_eq!( s.n_window, 9);

    assert!( res.confidence[[2,2]] > 0.99);
    assert_eq!( res.confidence.iter().filter( |&&c| c > 0.0).count(), 1);
    assert_eq!( res.n_fires(), 1);
    assert_eq!( res.fire_mask[[2,2]], 1);

    let frp = res.frp.as_ref().unwrap();
    println!("FRP:\n{:?}", frp);
    assert!( frp[[2,2]] > 0.0);
    assert_eq!( frp.iter().filter( |&&v| v > 0.0).count(), 1);

    assert!( res.night.is_none());
}

#[test]
fn test_fire_pixels () {
    let bands = hot_pixel_bands();
    let res = detect_fires( &bands, &config(), None, PLATFORM).unwrap();

    let area = bands.get( BandRole::PixelArea).unwrap();
    let pixels = res.fire_pixels( Some(&area));
    assert_eq!( pixels.len(), 1);

    let fp = &pixels[0];
    assert_eq!( (fp.row, fp.col), (2,2));
    assert!( fp.frp.is_some() && fp.area.is_some());

    let json = serde_json::to_string( fp).unwrap();
    println!("{}", json);
    assert!( json.contains("\"row\":2"));
    assert!( json.contains("\"col\":2"));
}

#[test]
fn test_partial_result () {
    let bands = hot_pixel_bands();

    // no calibration constant for this platform - detections are still valid
    let res = detect_fires( &bands, &config(), None, "unknown-sat").unwrap();
    assert!( res.frp.is_none());
    assert_eq!( res.n_fires(), 1);
    assert!( res.fire_pixels( None)[0].frp.is_none());
}

#[test]
fn test_cloud_mask () {
    let bands = hot_pixel_bands();

    // clouds everywhere except the fire pixel leave no background
    let mut cloud = MaskGrid::from_elem( (5,5), 1);
    cloud[[2,2]] = 0;
    let res = detect_fires( &bands, &config(), Some(&cloud.view()), PLATFORM).unwrap();
    assert_eq!( count_set( &res.pfp_mask.view()), 1);
    assert_eq!( res.n_fires(), 0);
    assert!( !res.window_stats.get( 2, 2).is_available());

    let bad_cloud = MaskGrid::zeros( (4,5));
    match detect_fires( &bands, &config(), Some(&bad_cloud.view()), PLATFORM) {
        Err(OdinFireDetectError::ShapeMismatch{band,..}) => assert_eq!( band, "cloud_mask"),
        other => panic!("expected shape mismatch, got {:?}", other.map(|r| r.n_fires()))
    }
}

#[test]
fn test_missing_bands () {
    let shape = (5,5);
    let bands = BandSet::new( shape)
        .with_band( BandRole::MirBt, FloatGrid::from_elem( shape, 300.0)).unwrap()
        .with_band( BandRole::Btd, FloatGrid::from_elem( shape, 1.0)).unwrap()
        .with_band( BandRole::Sza, FloatGrid::from_elem( shape, 10.0)).unwrap();

    match detect_fires( &bands, &config(), None, PLATFORM) {
        Err(OdinFireDetectError::MissingBand(band)) => assert_eq!( band, "vis_diff"),
        other => panic!("expected missing band, got {:?}", other.map(|r| r.n_fires()))
    }

    // the land-sea mask is only required if stage 1 uses it
    let bands = hot_pixel_bands();
    let mut no_lsm = BandSet::new( (5,5));
    for role in [BandRole::MirBt, BandRole::Btd, BandRole::VisDiff, BandRole::Sza] {
        no_lsm.insert( role, bands.get( role).unwrap().to_owned()).unwrap();
    }
    match detect_fires( &no_lsm, &config(), None, PLATFORM) {
        Err(OdinFireDetectError::MissingBand(band)) => assert_eq!( band, "lsm"),
        other => panic!("expected missing lsm, got {:?}", other.map(|r| r.n_fires()))
    }

    let mut cfg = config();
    cfg.stage1.do_lsm_mask = false;
    let res = detect_fires( &no_lsm, &cfg, None, PLATFORM).unwrap();
    assert_eq!( res.n_fires(), 1);
    assert!( res.frp.is_none()); // no pixel area

    // bands have to match the shape of the set
    let err = BandSet::new( (5,5)).with_band( BandRole::Sza, FloatGrid::zeros( (5,6))).unwrap_err();
    assert!( matches!( err, OdinFireDetectError::ShapeMismatch{..}));
}

#[test]
fn test_invalid_config () {
    let cfg = FireDetectConfig { stage1: Stage1Config { kernel_sizes: vec![3, 6], ..Stage1Config::default() }, ..config() };
    assert!( matches!( FireDetector::new( &cfg), Err(OdinFireDetectError::InvalidParameter(_))));

    let cfg = FireDetectConfig { window: WindowConfig { min_valid: 0, max_window: 7 }, ..config() };
    assert!( matches!( FireDetector::new( &cfg), Err(OdinFireDetectError::InvalidParameter(_))));

    let cfg = FireDetectConfig { window: WindowConfig { min_valid: 25, max_window: 2 }, ..config() };
    assert!( matches!( FireDetector::new( &cfg), Err(OdinFireDetectError::InvalidParameter(_))));
}

#[test]
fn test_night_merge () {
    // a large night fire that is not flagged by stage 1 (its BTD is below threshold)
    let shape = (30,30);
    let mut vis2 = FloatGrid::from_elem( shape, 0.011);
    let mut vid = FloatGrid::zeros( shape);
    vis2[[10,10]] = 0.8;
    vid[[10,10]] = 0.7;

    let bands = BandSet::new( shape)
        .with_band( BandRole::MirBt, FloatGrid::from_elem( shape, 300.0)).unwrap()
        .with_band( BandRole::Btd, FloatGrid::from_elem( shape, 0.5)).unwrap()
        .with_band( BandRole::VisDiff, vid).unwrap()
        .with_band( BandRole::Vis2Rad, vis2).unwrap()
        .with_band( BandRole::Sza, FloatGrid::from_elem( shape, 120.0)).unwrap()
        .with_band( BandRole::PixelArea, FloatGrid::from_elem( shape, 4.0)).unwrap()
        .with_lsm( MaskGrid::from_elem( shape, LSM_LAND_VAL)).unwrap();

    let res = detect_fires( &bands, &config(), None, PLATFORM).unwrap();
    print_mask( &res.fire_mask.view());

    assert_eq!( count_set( &res.pfp_mask.view()), 0);
    let night = res.night.as_ref().unwrap();
    assert!( night.threshold.is_some());
    assert_eq!( night.definite_mask[[10,10]], 1);

    assert_eq!( res.n_fires(), 1);
    assert_eq!( res.fire_mask[[10,10]], 1);
    assert_eq!( res.confidence[[10,10]], 0.0);

    // no background for night-only detections
    assert_eq!( res.frp.as_ref().unwrap()[[10,10]], 0.0);

    // disabled night detection
    let mut cfg = config();
    cfg.night.enabled = false;
    let res = detect_fires( &bands, &cfg, None, PLATFORM).unwrap();
    assert!( res.night.is_none());
    assert_eq!( res.n_fires(), 0);
}

#[test]
fn test_config () {
    let cfg = FireDetectConfig::from_ron_str( r#"(
        stage1: ( kernel_sizes: [5, 7], do_lsm_mask: false ),
        window: ( min_valid: 10 ),
        frp: ( platform_constants: { "GOES-18": 3.1e-9 } ),
    )"#).unwrap();
    println!("{:#?}", cfg);

    assert_eq!( cfg.stage1.kernel_sizes, vec![5, 7]);
    assert!( !cfg.stage1.do_lsm_mask);
    assert_eq!( cfg.stage1.mir_thresh_bt, 310.5);
    assert_eq!( cfg.window.min_valid, 10);
    assert_eq!( cfg.window.max_window, 7);
    let a = cfg.frp.platform_constants.get("GOES-18").copied().unwrap();
    assert!( (a - 3.1e-9).abs() < 1e-15);
    assert_eq!( cfg.lsm_land_val, LSM_LAND_VAL);
    assert_eq!( cfg.night.hist_bins, 800);

    assert!( matches!( FireDetectConfig::from_ron_str( "( window: ( min_valid: \"many\" ) )"), Err(OdinFireDetectError::ConfigError(_))));

    let path = concat!( env!("CARGO_MANIFEST_DIR"), "/configs/firedetect.ron");
    let cfg = FireDetectConfig::load_config_path( path).unwrap();
    assert_eq!( cfg.stage1.kernel_sizes, vec![5, 7, 9]);
    assert!( (cfg.confidence.min_confidence - 0.4).abs() < 1e-6);
    assert!( cfg.frp.platform_constants.contains_key( "Himawari-9"));
    assert!( FireDetector::new( &cfg).is_ok());

    assert!( matches!( FireDetectConfig::load_config_path( "no/such/config.ron"), Err(OdinFireDetectError::IOError(_))));
}
