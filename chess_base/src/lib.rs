//! # Base types for kingside
//!
//! This is an auxiliary crate for `kingside`, which contains the value types shared by the rules
//! engine and the search: squares, colors, pieces, cells, castling rights, square sets and
//! board geometry. It holds no game logic.
//!
//! Normally you don't want to use this crate directly. Use `kingside` instead, which
//! re-exports everything declared here.

pub mod bitboard;
pub mod geometry;
pub mod types;
