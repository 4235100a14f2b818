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

//! the grid substrate of the detection algorithms. Grids are plain `ndarray` arrays indexed by (row,col).
//! Float grids use NaN to mark invalid cells, mask grids only contain 0 or 1

use std::{collections::HashMap, fmt};
use ndarray::{Array2, ArrayView2, Zip};
use num::Float;
use rayon::prelude::*;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use crate::errors::{Result, missing_band, shape_mismatch};

pub type Grid<T> = Array2<T>;
pub type FloatGrid = Grid<f32>;
pub type MaskGrid = Grid<u8>;

pub type Shape = (usize,usize);

pub fn check_shape<T,S: ToString> (band: S, grid: &ArrayView2<T>, expected: Shape)->Result<()> {
    let found = grid.dim();
    if found == expected { Ok(()) } else { Err( shape_mismatch( band, expected, found)) }
}

/// NaN propagating binary cell operation. Note this does not broadcast - shapes have to be checked by the caller
pub fn zip_map<F> (a: &ArrayView2<f32>, b: &ArrayView2<f32>, f: F)->FloatGrid where F: Fn(f32,f32)->f32 {
    Zip::from(a).and(b).map_collect( |&x,&y| {
        if x.is_nan() || y.is_nan() { f32::NAN } else { f(x,y) }
    })
}

pub fn count_set (mask: &ArrayView2<u8>)->usize {
    mask.iter().filter( |&&m| m != 0).count()
}

/* #region running statistics ***************************************************************************************/

/// incremental population mean/variance (Welford), accumulated in f64.
/// Partial accumulators can be merged (Chan et al.) which we use for deterministic parallel reductions
#[derive(Debug,Clone,Copy,Default,PartialEq)]
pub struct RunningStats {
    pub n: usize,
    pub mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new()->Self { RunningStats::default() }

    #[inline]
    pub fn add (&mut self, v: f64) {
        self.n += 1;
        let delta = v - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (v - self.mean);
    }

    pub fn merge (&self, other: &RunningStats)->RunningStats {
        if other.n == 0 { return *self }
        if self.n == 0 { return *other }

        let n = self.n + other.n;
        let delta = other.mean - self.mean;
        let mean = self.mean + delta * (other.n as f64 / n as f64);
        let m2 = self.m2 + other.m2 + delta * delta * (self.n as f64 * other.n as f64 / n as f64);
        RunningStats { n, mean, m2 }
    }

    pub fn variance (&self)->f64 {
        if self.n == 0 { f64::NAN } else { (self.m2 / self.n as f64).max(0.0) }
    }

    pub fn std_dev (&self)->f64 {
        self.variance().sqrt()
    }

    pub fn mean_or_nan (&self)->f64 {
        if self.n == 0 { f64::NAN } else { self.mean }
    }
}

/// population standard deviation of all finite grid values (NaN if there are none).
/// Rows are reduced in parallel and merged in row order so that the result does not depend on scheduling
pub fn nan_std (grid: &ArrayView2<f32>)->f32 {
    let (rows,_) = grid.dim();
    let partials: Vec<RunningStats> = (0..rows).into_par_iter().map( |r| {
        let mut rs = RunningStats::new();
        for &v in grid.row(r).iter() {
            if v.is_finite() { rs.add( v as f64) }
        }
        rs
    }).collect();

    let total = partials.iter().fold( RunningStats::new(), |acc,p| acc.merge(p));
    total.std_dev() as f32
}

/// max of all non-NaN values, None if there are none
pub fn nan_max<T: Float> (values: impl Iterator<Item=T>)->Option<T> {
    values.filter( |v| !v.is_nan()).fold( None, |acc,v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v)
    })
}

/* #endregion running statistics */

/* #region band set *************************************************************************************************/

/// the roles of the pre-processed input grids
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Display,EnumString,EnumIter,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BandRole {
    MirBt,     // mid-infrared (~3.9µm) brightness temperature (K)
    LwirBt,    // long-wave infrared (~10.4µm) brightness temperature (K)
    Btd,       // MIR - LWIR (K)
    MiNdfi,    // normalized difference fire index (MIR - LWIR) / (MIR + LWIR)
    VisDiff,   // MIR radiance without thermal and reflected components
    VisDiffAdj,// VisDiff with reduced daytime visible component
    Vis2Rad,   // 2.2µm (or 1.6µm) radiance, used for night detection
    Sza,       // solar zenith angle (deg)
    Vza,       // viewing zenith angle (deg)
    PixelArea, // km²
}

/// a set of co-registered input grids keyed by role, plus the land-sea classification.
/// The shape is fixed when the set is created, grids of other shapes are rejected
pub struct BandSet {
    shape: Shape,
    bands: HashMap<BandRole,FloatGrid>,
    lsm: Option<MaskGrid>,
}

impl BandSet {
    pub fn new (shape: Shape)->Self {
        BandSet { shape, bands: HashMap::new(), lsm: None }
    }

    pub fn shape (&self)->Shape { self.shape }

    pub fn insert (&mut self, role: BandRole, grid: FloatGrid)->Result<()> {
        check_shape( role, &grid.view(), self.shape)?;
        self.bands.insert( role, grid);
        Ok(())
    }

    pub fn with_band (mut self, role: BandRole, grid: FloatGrid)->Result<Self> {
        self.insert( role, grid)?;
        Ok(self)
    }

    pub fn set_lsm (&mut self, lsm: MaskGrid)->Result<()> {
        check_shape( "lsm", &lsm.view(), self.shape)?;
        self.lsm = Some(lsm);
        Ok(())
    }

    pub fn with_lsm (mut self, lsm: MaskGrid)->Result<Self> {
        self.set_lsm( lsm)?;
        Ok(self)
    }

    pub fn contains (&self, role: BandRole)->bool {
        self.bands.contains_key( &role)
    }

    pub fn get (&self, role: BandRole)->Result<ArrayView2<'_,f32>> {
        self.bands.get( &role).map( |g| g.view()).ok_or_else( || missing_band( role))
    }

    pub fn get_opt (&self, role: BandRole)->Option<ArrayView2<'_,f32>> {
        self.bands.get( &role).map( |g| g.view())
    }

    pub fn lsm (&self)->Result<ArrayView2<'_,u8>> {
        self.lsm.as_ref().map( |g| g.view()).ok_or_else( || missing_band( "lsm"))
    }

    /// check that all given roles are present, reporting the first one that is not
    pub fn require (&self, roles: &[BandRole])->Result<()> {
        for role in roles {
            if !self.contains( *role) { return Err( missing_band( role)) }
        }
        Ok(())
    }
}

impl fmt::Debug for BandSet {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        let mut roles: Vec<&'static str> = self.bands.keys().map( |r| (*r).into()).collect();
        roles.sort();
        f.debug_struct("BandSet")
            .field( "shape", &self.shape)
            .field( "bands", &roles)
            .field( "lsm", &self.lsm.is_some())
            .finish()
    }
}

/* #endregion band set */

/// print a mask grid to stdout (for debugging and the demo binary)
pub fn print_mask (mask: &ArrayView2<u8>) {
    let (h,w) = mask.dim();

    print!( "     ");
    for x in 0..w { print!( "{:3}", x); }
    println!();
    print!("    ┌");
    for _ in 0..w { print!( "───"); }
    println!("─┐");

    for y in 0..h {
        print!( "{:3} │", y);
        for x in 0..w {
            if mask[[y,x]] != 0 { print!( "  ◼︎") } else { print!("   ") }
        }
        println!(" │ {:3}", y);
    }

    print!("    └");
    for _ in 0..w { print!( "───"); }
    println!("─┘");
}
