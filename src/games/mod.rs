//! Game implementations.

pub mod mahjong;
