//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y los parámetros
//! del solver. Todos los valores tienen defaults razonables para
//! desarrollo; en producción se sobreescriben via variables de entorno.

use std::env;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,

    // Pool de workers
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub progress_update_interval_secs: u64,

    // Estimación de tiempos de viaje
    pub average_speed_kmh: u32,

    // Defaults termodinámicos cuando el request los omite
    pub default_ambient_temperature: f64,
    pub default_initial_vehicle_temp: f64,

    // Depósito por defecto
    pub default_depot_latitude: f64,
    pub default_depot_longitude: f64,
    pub default_depot_address: String,

    // Pesos de costos del solver
    pub vehicle_fixed_cost: i64,
    pub temp_violation_penalty: i64,
    pub late_delivery_penalty: i64,
    pub infeasible_cost: i64,

    // Límites de tiempo del solver
    pub solver_time_limit_default: u32,
    pub solver_time_limit_max: u32,
    pub solver_plateau_iterations: u32,

    // Dimensión laboral opcional
    pub enable_labor_dimension: bool,
    pub driver_daily_limit_minutes: i64,
    pub driver_weekly_limit_minutes: i64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env_or("ENVIRONMENT", "development"),
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse_or("PORT", 3000),
            cors_origins: env_or("CORS_ORIGINS", "http://localhost:8080")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            worker_count: env_parse_or("WORKER_COUNT", 2),
            queue_capacity: env_parse_or("QUEUE_CAPACITY", 32),
            progress_update_interval_secs: env_parse_or("PROGRESS_UPDATE_INTERVAL_SECS", 3),

            average_speed_kmh: env_parse_or("AVERAGE_SPEED_KMH", 30),

            default_ambient_temperature: env_parse_or("DEFAULT_AMBIENT_TEMPERATURE", 30.0),
            default_initial_vehicle_temp: env_parse_or("DEFAULT_INITIAL_VEHICLE_TEMP", -5.0),

            default_depot_latitude: env_parse_or("DEFAULT_DEPOT_LATITUDE", 25.0330),
            default_depot_longitude: env_parse_or("DEFAULT_DEPOT_LONGITUDE", 121.5654),
            default_depot_address: env_or("DEFAULT_DEPOT_ADDRESS", "台北市信義區物流中心"),

            vehicle_fixed_cost: env_parse_or("VEHICLE_FIXED_COST", 50_000),
            temp_violation_penalty: env_parse_or("TEMP_VIOLATION_PENALTY", 100_000),
            late_delivery_penalty: env_parse_or("LATE_DELIVERY_PENALTY", 1_000),
            infeasible_cost: env_parse_or("INFEASIBLE_COST", 10_000_000),

            solver_time_limit_default: env_parse_or("SOLVER_TIME_LIMIT_DEFAULT", 300),
            solver_time_limit_max: env_parse_or("SOLVER_TIME_LIMIT_MAX", 900),
            solver_plateau_iterations: env_parse_or("SOLVER_PLATEAU_ITERATIONS", 300),

            enable_labor_dimension: env_parse_or("ENABLE_LABOR_DIMENSION", false),
            driver_daily_limit_minutes: env_parse_or("DRIVER_DAILY_LIMIT_MINUTES", 600),
            driver_weekly_limit_minutes: env_parse_or("DRIVER_WEEKLY_LIMIT_MINUTES", 2880),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
