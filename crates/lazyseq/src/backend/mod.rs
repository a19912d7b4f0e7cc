//! # Numeric Backend
//!
//! The packed buffers inside a [`Batch`](crate::batch::Batch) are opaque to the
//! core: it only ever concatenates them, slices them and asks for their length.
//! This module names that contract ([`Vector`] and [`Creator`]) and provides
//! implementations for a few tensor libraries.
//!
//! ## Feature Flags
//!
//! - `candle`: Enables support for the Candle tensor library
//! - `burn`: Enables support for the Burn tensor library
//!
//! The `Vec<f32>` backend in [`cpu`] is always compiled.

mod core_trait;

pub mod cpu;

#[cfg_attr(docsrs, doc(cfg(feature = "candle")))]
#[cfg(feature = "candle")]
/// Candle tensor backend implementation.
///
/// This module is only available when the `candle` feature flag is enabled.
/// Tensors of any rank are flattened before being packed.
pub mod candle;

#[cfg_attr(docsrs, doc(cfg(feature = "burn")))]
#[cfg(feature = "burn")]
/// Burn tensor backend implementation.
///
/// This module is only available when the `burn` feature flag is enabled.
/// Only rank-1 float tensors are supported, since packed buffers are flat.
pub mod burn;

pub use core_trait::*;
pub use cpu::CpuCreator;
