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

//! derivation of the detection bands from calibrated channel data.
//! Radiances are in W m-2 sr-1 µm-1, wavelengths in µm, temperatures in K

use ndarray::{ArrayView2, Zip};
use serde::{Serialize,Deserialize};
use crate::{
    errors::Result,
    grid::{BandRole, BandSet, FloatGrid, MaskGrid, check_shape, zip_map}
};

const C1: f32 = 1.1910429e8;  // 2hc² (W m-2 sr-1 µm4)
const C2: f32 = 1.4387752e4;  // hc/k (µm K)

/// spectral radiance of a black body at temperature `bt` and central wavelength `cwl` (eqn 2 of Wooster et al.)
#[inline]
pub fn planck_radiance (bt: f32, cwl: f32)->f32 {
    C1 / (cwl.powi(5) * ((C2 / (cwl * bt)).exp() - 1.0))
}

/// inverse of [`planck_radiance`]
#[inline]
pub fn brightness_temperature (rad: f32, cwl: f32)->f32 {
    C2 / (cwl * (C1 / (rad * cwl.powi(5)) + 1.0).ln())
}

/// logistic adjustment of the visible difference that reduces the daytime reflected component
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct VidAdjustment {
    pub sza_adj: f32, // deg at which the adjustment begins
    pub min_v: f32,   // used during day
    pub max_v: f32,   // used at night
    pub slope_strength: f32,
    pub slope_rise: f32,
}

impl Default for VidAdjustment {
    fn default()->Self {
        VidAdjustment { sza_adj: 82.0, min_v: 0.04, max_v: 0.115, slope_strength: 1.8, slope_rise: 0.2 }
    }
}

impl VidAdjustment {
    #[inline]
    pub fn adjust (&self, vid: f32, sza: f32)->f32 {
        let logistic = 1.0 / (1.0 + (-self.slope_strength * (sza - self.sza_adj)).exp());
        vid - (self.min_v + (self.max_v - self.min_v) * logistic.powf( self.slope_rise))
    }
}

/// pixel area in km² of a pixel with nominal (nadir) area `nadir_km2` seen under viewing zenith angle `vza` (deg)
#[inline]
pub fn pixel_area_from_vza (nadir_km2: f32, vza: f32)->f32 {
    nadir_km2 / vza.to_radians().cos()
}

/// calibrated channel data as delivered by the sensor specific reader
pub struct ChannelData<'a> {
    pub mir_bt: ArrayView2<'a,f32>,
    pub lwir_bt: ArrayView2<'a,f32>,
    pub mir_rad: ArrayView2<'a,f32>,
    pub vis_rad: ArrayView2<'a,f32>,
    pub vis2_rad: Option<ArrayView2<'a,f32>>,
    pub sza: ArrayView2<'a,f32>,
    pub vza: ArrayView2<'a,f32>,
    pub lsm: Option<ArrayView2<'a,u8>>,

    /// central wavelength of the MIR channel (µm)
    pub mir_cwl: f32,
    /// in-band solar irradiance of the MIR and visible channel, used to scale the visible radiance
    pub mir_irradiance: f32,
    pub vis_irradiance: f32,
    /// nadir pixel area (km²)
    pub nadir_pixel_area: f32,
}

/// compute the [`BandSet`] used for detection: BTD, the normalized difference fire index, the visible difference (MIR radiance minus the expected
/// thermal radiance of the LWIR temperature minus the scaled visible radiance), its SZA adjusted version and pixel areas.
/// Without a land-sea mask all pixels are considered to be land
pub fn derive_fire_bands (ch: &ChannelData, vid_adj: &VidAdjustment, lsm_land_val: u8)->Result<BandSet> {
    let shape = ch.mir_bt.dim();
    check_shape( "lwir_bt", &ch.lwir_bt, shape)?;
    check_shape( "mir_rad", &ch.mir_rad, shape)?;
    check_shape( "vis_rad", &ch.vis_rad, shape)?;
    check_shape( "sza", &ch.sza, shape)?;
    check_shape( "vza", &ch.vza, shape)?;

    let btd = zip_map( &ch.mir_bt, &ch.lwir_bt, |mir,lw| mir - lw);
    let mi_ndfi = zip_map( &ch.mir_bt, &ch.lwir_bt, |mir,lw| {
        let ndfi = (mir - lw) / (mir + lw);
        if ndfi.is_finite() { ndfi } else { f32::NAN }
    });

    // MIR radiance without the thermal component of the background, invalid values set to 0
    let mir_no_ir: FloatGrid = Zip::from( &ch.mir_rad).and( &ch.lwir_bt).map_collect( |&rad, &lw| {
        let d = rad - planck_radiance( lw, ch.mir_cwl);
        if d.is_finite() { d } else { 0.0 }
    });

    let vis_scale = ch.mir_irradiance / ch.vis_irradiance;
    let vis_diff: FloatGrid = Zip::from( &mir_no_ir).and( &ch.vis_rad).map_collect( |&m, &v| {
        let vid = m - v * vis_scale;
        if vid.is_finite() { vid } else { f32::NAN }
    });

    let vis_diff_adj: FloatGrid = Zip::from( &vis_diff).and( &ch.sza).map_collect( |&vid, &s| {
        let adj = vid_adj.adjust( vid, s);
        if adj.is_finite() { adj } else { 0.0 }
    });

    let pixel_area = ch.vza.mapv( |vza| pixel_area_from_vza( ch.nadir_pixel_area, vza));

    let lsm = match &ch.lsm {
        Some(lsm) => lsm.to_owned(),
        None => MaskGrid::from_elem( shape, lsm_land_val)
    };

    let mut bands = BandSet::new( shape)
        .with_band( BandRole::MirBt, ch.mir_bt.to_owned())?
        .with_band( BandRole::LwirBt, ch.lwir_bt.to_owned())?
        .with_band( BandRole::Btd, btd)?
        .with_band( BandRole::MiNdfi, mi_ndfi)?
        .with_band( BandRole::VisDiff, vis_diff)?
        .with_band( BandRole::VisDiffAdj, vis_diff_adj)?
        .with_band( BandRole::Sza, ch.sza.to_owned())?
        .with_band( BandRole::Vza, ch.vza.to_owned())?
        .with_band( BandRole::PixelArea, pixel_area)?
        .with_lsm( lsm)?;

    if let Some(vis2) = &ch.vis2_rad {
        bands.insert( BandRole::Vis2Rad, vis2.to_owned())?;
    }

    Ok(bands)
}
