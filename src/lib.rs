// Library root
// -----------
// This crate exposes a small library surface for the smart-home CLI. The
// binary (`main.rs`) wires these modules together into the interactive
// client.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the smart-home server and the
//   classification of its replies (JSON, text, binary, HTTP error).
// - `model`: payloads exchanged with the server (devices, routines,
//   alerts, rooms).
// - `error`: the error taxonomy raised by `api`.
// - `config`: command-line and environment configuration.
// - `console`: terminal input/output used by the shell.
// - `ui`: the numbered menu loop and one handler per action.
//
// The shell only talks to the server through the `SmartHomeApi` trait, so
// it can be driven against a fake in tests.
pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod model;
pub mod ui;
