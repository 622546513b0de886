//! An SNTP measurement client.
//!
//! Each server gets its own [`session::Session`], which sends minimal
//! client requests and turns every reply into a [`session::PollResult`]
//! carrying clock offset, one-way delay and a rolling jitter estimate.
//! Nothing here adjusts the local clock.

#[macro_use]
extern crate log;

#[macro_use]
extern crate serde_derive;

#[macro_use]
mod macros;

pub mod args;
pub mod config;
pub mod net;
pub mod ntp;
pub mod session;
