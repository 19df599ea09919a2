//! Cross-system tick scenarios run against the headless backends

mod attractor_scenarios;
mod hierarchy_scenarios;
