use crate::initial_condition::{Block, Disk, InitialCondition};
use crate::math::*;
use crate::particles::ParticleSet;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A struct containing all of the high-level parameters for the PIC simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// The number of grid cells in each direction
    pub cells: UV,
    /// The width of the domain. Cells are square, so the height follows from `cells`.
    pub lx: T,
    /// The amount of simulated time between two written frames
    pub frame_time: T,
    /// Upper bound on the number of CFL substeps taken per frame
    pub max_substeps: usize,
    /// Body force applied to the grid velocities every substep
    pub gravity: TV,
    /// The particles the simulation starts with
    pub scene: Scene,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            cells: UV::new(64, 64),
            lx: 1.,
            frame_time: 0.01,
            max_substeps: 100,
            gravity: TV::new(0., -9.81),
            scene: Scene::default(),
        }
    }
}

impl SimulationParameters {
    /// Reads parameters from a JSON file. Fields missing from the file keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        std::fs::read(path)
            .wrap_err_with(|| format!("Failed to read JSON settings file: {:?}", path))
            .and_then(|json| {
                serde_json::from_slice(&json).wrap_err("Serde failed to deserialize JSON.")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scene {
    Block(Block),
    Disk(Disk),
}

impl Default for Scene {
    fn default() -> Self {
        Scene::Block(Block::default())
    }
}

impl InitialCondition for Scene {
    fn validate(&self) -> eyre::Result<()> {
        match self {
            Scene::Block(block) => block.validate(),
            Scene::Disk(disk) => disk.validate(),
        }
    }

    fn add_particles(&self, particles: &mut ParticleSet) {
        match self {
            Scene::Block(block) => block.add_particles(particles),
            Scene::Disk(disk) => disk.add_particles(particles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let params: SimulationParameters =
            serde_json::from_str(r#"{ "cells": [32, 16], "frame_time": 0.02 }"#).unwrap();

        assert_eq!(params.cells, UV::new(32, 16));
        assert_eq!(params.frame_time, 0.02);
        assert_eq!(params.lx, SimulationParameters::default().lx);
        assert_eq!(params.scene, Scene::default());
    }

    #[test]
    fn json_round_trip() {
        let params = SimulationParameters {
            scene: Scene::Disk(Disk {
                num_particles: 10,
                ..Disk::default()
            }),
            ..SimulationParameters::default()
        };

        let json = serde_json::to_string(&params).unwrap();
        let read: SimulationParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(read, params);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut path = std::env::temp_dir();
        path.push("pic_core_no_such_settings.json");
        assert!(SimulationParameters::from_json_file(&path).is_err());
    }
}
