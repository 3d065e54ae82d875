// Domain layer: typed server payloads and the ports the client is written against.

pub mod model;
pub mod ports;
