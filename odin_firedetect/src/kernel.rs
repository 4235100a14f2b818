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

//! fixed size convolution kernels of the stage 1b tests, and the small focal filters used by the night detector

use ndarray::{s, Array2, ArrayView2, Axis};
use rayon::prelude::*;
use crate::{errors::{Result, invalid_parameter}, grid::{FloatGrid, nan_std, nan_max}};

pub const SUPPORTED_KERNEL_SIZES: [usize;5] = [3, 5, 7, 9, 11];

pub fn check_kernel_size (ksize: usize)->Result<()> {
    if SUPPORTED_KERNEL_SIZES.contains( &ksize) {
        Ok(())
    } else {
        Err( invalid_parameter!("unsupported kernel size {}, expected one of {:?}", ksize, SUPPORTED_KERNEL_SIZES))
    }
}

/// the high pass kernel of the given size: all cells are -1 except of the center, which has the
/// footprint area as its weight. The array is divided by the sum of its unnormalized elements
pub fn high_pass_kernel (ksize: usize)->Result<Array2<f32>> {
    check_kernel_size( ksize)?;

    let mut kern = Array2::<f32>::from_elem( (ksize,ksize), -1.0);
    let c = ksize / 2;
    kern[[c,c]] = (ksize * ksize) as f32;

    let sum = kern.sum();
    Ok( kern / sum )
}

/// convolve `grid` with the high pass kernel of size `ksize`.
/// Returns the filtered grid and the standard deviation over all its finite values. Border cells
/// for which the kernel footprint does not fit into the grid are NaN, as is every cell whose
/// footprint contains a NaN
pub fn convolve (grid: &ArrayView2<f32>, ksize: usize)->Result<(FloatGrid,f32)> {
    let kern = high_pass_kernel( ksize)?;
    let filtered = convolve_with( grid, &kern.view());
    let std = nan_std( &filtered.view());

    Ok( (filtered, std) )
}

/// 'valid' mode convolution with a square, odd sized (and here always symmetric) kernel
fn convolve_with (grid: &ArrayView2<f32>, kern: &ArrayView2<f32>)->FloatGrid {
    let (rows,cols) = grid.dim();
    let k = kern.nrows();
    let h = k / 2;

    let mut out = FloatGrid::from_elem( (rows,cols), f32::NAN);
    if rows < k || cols < k { return out }

    out.axis_iter_mut( Axis(0)).into_par_iter().enumerate().for_each( |(r, mut out_row)| {
        if r < h || r + h >= rows { return }

        for c in h..(cols - h) {
            let footprint = grid.slice( s![r-h..=r+h, c-h..=c+h]);
            let mut acc = 0.0f64;
            let mut valid = true;

            for (v,w) in footprint.iter().zip( kern.iter()) {
                if v.is_nan() { valid = false; break }
                acc += (*v as f64) * (*w as f64);
            }
            if valid { out_row[c] = acc as f32 }
        }
    });

    out
}

/// number of set cells in the 3x3 neighborhood of each cell. Out-of-grid neighbors are mirrored at
/// the border (edge cells included), hence a set border cell is counted twice and a set corner cell
/// four times
pub fn focal_sum_3x3 (mask: &ArrayView2<u8>)->Array2<u32> {
    let (rows,cols) = mask.dim();
    Array2::from_shape_fn( (rows,cols), |(r,c)| {
        reflected_3x3( r, c, rows, cols).map( |idx| if mask[idx] != 0 { 1u32 } else { 0 }).sum()
    })
}

/// max value in the 3x3 neighborhood of each cell (mirrored at the grid border, NaNs ignored)
pub fn focal_max_3x3 (grid: &ArrayView2<f32>)->FloatGrid {
    let (rows,cols) = grid.dim();
    Array2::from_shape_fn( (rows,cols), |(r,c)| {
        nan_max( reflected_3x3( r, c, rows, cols).map( |idx| grid[idx])).unwrap_or( f32::NAN)
    })
}

/// indices of the 3x3 neighborhood of (r,c), with out-of-grid indices mirrored back onto the border cell
fn reflected_3x3 (r: usize, c: usize, rows: usize, cols: usize)->impl Iterator<Item=[usize;2]> {
    let reflect = |i: usize, d: isize, n: usize| -> usize {
        let j = i as isize + d;
        if j < 0 { 0 } else if j as usize >= n { n - 1 } else { j as usize }
    };
    (-1isize..=1).flat_map( move |dr| (-1isize..=1).map( move |dc| [reflect( r, dr, rows), reflect( c, dc, cols)]))
}
