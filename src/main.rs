//! blobsaver - Application Entry Point
//!
//! Binary shim that hands control to the library crate where the Tauri
//! setup and window lifecycle live.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    blobsaver_lib::run()
}
