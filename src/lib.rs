//! Sparse deform-group weights and the algebra weight painting runs on:
//! lock-aware normalization, lock-relative display weights, multi-group
//! painting, and whole-mesh weight operations.
//!
//! Each point owns a [`DeformWeights`] vector of (group, weight) pairs;
//! group metadata (names, lock flags, active index) lives in a
//! [`DeformGroupSet`]. Everything above that is pure per-point math, which
//! is what lets the brush stroke layer fan dabs out across threads.

pub mod buffer;
pub mod groups;
pub mod lock_relative;
pub mod multipaint;
pub mod normalize;
pub mod ops;
pub mod paint;
pub mod weights;

pub use groups::{DeformGroup, DeformGroupSet, GroupError};
pub use normalize::LOCK_EPSILON;
pub use weights::{DeformWeights, WeightEntry};
