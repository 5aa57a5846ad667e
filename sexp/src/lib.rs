#![no_std]
extern crate alloc;

pub mod decode;
pub mod encode;
pub mod transport;

#[cfg(test)]
mod decode_tests;
