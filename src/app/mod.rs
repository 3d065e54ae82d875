// Application layer: text rendering of server payloads for the CLI.

pub mod views;
