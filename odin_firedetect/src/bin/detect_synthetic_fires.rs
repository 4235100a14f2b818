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

use anyhow::{Result, anyhow};
use clap::Parser;
use ndarray::Array2;
use tracing_subscriber::EnvFilter;
use odin_firedetect::{BandRole, BandSet, FireDetectConfig, FloatGrid, MaskGrid, detect_fires, grid::print_mask};

/// run the fire detection on a synthetic scene with a textured background and a list of hot pixels
#[derive(Parser, Debug)]
#[command(version, about, long_about = "run fire detection on a synthetic scene")]
pub struct Args {
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    #[arg(long, default_value_t = 20)]
    pub cols: usize,

    /// background MIR brightness temperature (K)
    #[arg(long, default_value_t = 300.0)]
    pub background: f32,

    /// solar zenith angle (deg)
    #[arg(long, default_value_t = 30.0)]
    pub sza: f32,

    /// FRP calibration constant used if the config has none for the platform
    #[arg(long, default_value_t = 3.0e-9)]
    pub frp_constant: f32,

    #[arg(long, default_value = "synthetic")]
    pub platform: String,

    /// optional RON detection config
    #[arg(long)]
    pub config: Option<String>,

    /// hot pixels as "row,col,mir_bt"
    #[arg(num_args=1..)]
    pub fires: Vec<String>,
}

fn parse_fire (arg: &str)->Result<(usize,usize,f32)> {
    let parts: Vec<&str> = arg.split(',').map( |s| s.trim()).collect();
    if parts.len() != 3 { return Err( anyhow!("hot pixel has to be given as 'row,col,mir_bt': {}", arg)) }
    Ok( (parts[0].parse()?, parts[1].parse()?, parts[2].parse()?) )
}

fn synthetic_bands (args: &Args, fires: &[(usize,usize,f32)])->Result<BandSet> {
    let shape = (args.rows, args.cols);

    // small deterministic texture so that background windows have a nonzero spread
    let texture = |r: usize, c: usize| ((r * 7 + c * 13) % 5) as f32 * 0.2;

    let mut mir_bt: FloatGrid = Array2::from_shape_fn( shape, |(r,c)| args.background + texture(r,c));
    let lwir_bt: FloatGrid = Array2::from_shape_fn( shape, |(r,c)| args.background - 2.0 + texture(c,r));
    for (r,c,bt) in fires {
        if *r >= args.rows || *c >= args.cols { return Err( anyhow!("fire outside of grid: {},{}", r, c)) }
        mir_bt[[*r,*c]] = *bt;
    }
    let btd = &mir_bt - &lwir_bt;

    let bands = BandSet::new( shape)
        .with_band( BandRole::MirBt, mir_bt)?
        .with_band( BandRole::LwirBt, lwir_bt)?
        .with_band( BandRole::Btd, btd)?
        .with_band( BandRole::VisDiff, FloatGrid::from_elem( shape, 0.1))?
        .with_band( BandRole::Sza, FloatGrid::from_elem( shape, args.sza))?
        .with_band( BandRole::PixelArea, FloatGrid::from_elem( shape, 4.0))?
        .with_lsm( MaskGrid::from_elem( shape, odin_firedetect::config::LSM_LAND_VAL))?;

    Ok(bands)
}

fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FireDetectConfig::load_config_path( path)?,
        None => FireDetectConfig::default()
    };
    if !config.frp.platform_constants.contains_key( &args.platform) {
        config.frp = config.frp.with_constant( &args.platform, args.frp_constant);
    }

    let fires: Vec<(usize,usize,f32)> = args.fires.iter().map( |s| parse_fire(s)).collect::<Result<_>>()?;
    let bands = synthetic_bands( &args, &fires)?;

    let res = detect_fires( &bands, &config, None, &args.platform)?;

    println!("potential fire pixels:");
    print_mask( &res.pfp_mask.view());
    println!("confirmed fire pixels:");
    print_mask( &res.fire_mask.view());

    let pixel_area = bands.get( BandRole::PixelArea)?;
    for fp in res.fire_pixels( Some(&pixel_area)) {
        println!("{}", serde_json::to_string( &fp)?);
    }

    Ok(())
}
