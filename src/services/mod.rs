//! Servicios
//!
//! Este módulo contiene los servicios de la aplicación: geodistancias,
//! tracker termodinámico, solver VRP y pool de workers.

pub mod geo_service;
pub mod solver;
pub mod temperature;
pub mod worker;
