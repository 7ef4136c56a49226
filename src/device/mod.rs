mod simulator;

pub use simulator::DeviceSimulator;
