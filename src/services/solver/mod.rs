//! Subsistema de planificación VRP
//!
//! Constructor del modelo, motor de búsqueda y ensamblador del plan.

pub mod assembler;
pub mod data_model;
pub mod engine;
pub mod insertion;
