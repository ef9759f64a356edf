//! Oxiups: the UPS binary patch format in Rust.
//!
//! The crate provides:
//! - The UPS1 codec (`ups`): varint pointers, CRC-32 protocol, patch
//!   model, diff builder and applier
//! - High-level buffer APIs (`engine`)
//! - Whole-file helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! A UPS patch is bidirectional: applying it to the original file
//! produces the modified one, and applying the identical patch to the
//! modified file restores the original. Direction is detected from the
//! input's CRC-32, never guessed.
//!
//! # Quick Start
//!
//! ```
//! use oxiups::engine;
//! use oxiups::ups::Direction;
//!
//! let source = b"ABCD";
//! let target = b"ABXD";
//!
//! let patch = engine::build(source, target).unwrap();
//!
//! let (modified, dir) = engine::apply(&patch, source).unwrap();
//! assert_eq!(modified, target);
//! assert_eq!(dir, Direction::Forward);
//!
//! let (restored, dir) = engine::apply(&patch, &modified).unwrap();
//! assert_eq!(restored, source);
//! assert_eq!(dir, Direction::Reverse);
//! ```

pub mod engine;
pub mod io;
pub mod ups;

#[cfg(feature = "cli")]
pub mod cli;
