// Domain layer: log/run/stats models and the ports the pipeline is generic over.

pub mod model;
pub mod ports;
