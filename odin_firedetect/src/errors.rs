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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinFireDetectError>;

#[derive(Error,Debug)]
pub enum OdinFireDetectError {

    // unsupported kernel sizes, window parameters that can never be satisfied etc.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("shape mismatch for band '{band}': expected {expected:?}, found {found:?}")]
    ShapeMismatch { band: String, expected: (usize,usize), found: (usize,usize) },

    #[error("missing band: {0}")]
    MissingBand(String),

    // no FRP calibration constant for this platform
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("config error: {0}")]
    ConfigError( #[from] ron::error::SpannedError),

    #[error("IO error: {0}")]
    IOError( #[from] std::io::Error),
}

macro_rules! invalid_parameter {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::OdinFireDetectError::InvalidParameter( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use invalid_parameter;

pub fn missing_band<S: ToString> (band: S)->OdinFireDetectError {
    OdinFireDetectError::MissingBand(band.to_string())
}

pub fn shape_mismatch<S: ToString> (band: S, expected: (usize,usize), found: (usize,usize))->OdinFireDetectError {
    OdinFireDetectError::ShapeMismatch { band: band.to_string(), expected, found }
}
