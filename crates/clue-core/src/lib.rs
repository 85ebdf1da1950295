#![deny(warnings)]
//! Card model, per-agent deduction state and the turn engine for a
//! three-category murder-mystery deduction game.

pub mod game;
pub mod knowledge;
pub mod model;
