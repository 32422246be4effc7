//! Servicio de distancias geográficas
//!
//! Calcula distancias de círculo máximo con la fórmula de haversine y
//! construye las matrices N×N de distancia (metros) y tiempo (minutos)
//! que consume el solver. Las salidas son enteros para el modelo de
//! costos del solver.

/// Radio de la Tierra en kilómetros
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distancia de círculo máximo entre dos puntos, en kilómetros
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Matriz de distancias entre todas las coordenadas, en METROS.
///
/// Simétrica, con diagonal cero.
pub fn build_distance_matrix(coordinates: &[(f64, f64)]) -> Vec<Vec<i64>> {
    let n = coordinates.len();
    let mut matrix = vec![vec![0i64; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let (lat1, lon1) = coordinates[i];
            let (lat2, lon2) = coordinates[j];
            let meters = (haversine_distance_km(lat1, lon1, lat2, lon2) * 1000.0).round() as i64;
            matrix[i][j] = meters;
            matrix[j][i] = meters;
        }
    }

    matrix
}

/// Matriz de tiempos de viaje en MINUTOS, derivada de la matriz de
/// distancias y la velocidad promedio configurada.
pub fn build_time_matrix(distance_matrix: &[Vec<i64>], average_speed_kmh: u32) -> Vec<Vec<i64>> {
    let n = distance_matrix.len();
    let mut matrix = vec![vec![0i64; n]; n];

    // Velocidad en metros por minuto
    let speed_m_per_min = (average_speed_kmh as f64 * 1000.0) / 60.0;

    for i in 0..n {
        for j in 0..n {
            if i != j {
                let minutes = distance_matrix[i][j] as f64 / speed_m_per_min;
                matrix[i][j] = minutes.round() as i64;
            }
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPOT: (f64, f64) = (25.0330, 121.5654);
    const STOP: (f64, f64) = (25.0500, 121.5800);

    #[test]
    fn test_haversine_known_distance() {
        // Taipei 101 a la estación central de Taipei, ~2.4 km aprox
        let km = haversine_distance_km(DEPOT.0, DEPOT.1, STOP.0, STOP.1);
        assert!(km > 2.0 && km < 3.0, "distancia fuera de rango: {}", km);
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let km = haversine_distance_km(DEPOT.0, DEPOT.1, DEPOT.0, DEPOT.1);
        assert!(km.abs() < 1e-9);
    }

    #[test]
    fn test_distance_matrix_symmetric_with_zero_diagonal() {
        let coords = vec![DEPOT, STOP, (25.06, 121.55)];
        let matrix = build_distance_matrix(&coords);

        for i in 0..coords.len() {
            assert_eq!(matrix[i][i], 0);
            for j in 0..coords.len() {
                assert_eq!(matrix[i][j], matrix[j][i]);
            }
        }
        assert!(matrix[0][1] > 0);
    }

    #[test]
    fn test_time_matrix_uses_average_speed() {
        let coords = vec![DEPOT, STOP];
        let distance = build_distance_matrix(&coords);
        let time = build_time_matrix(&distance, 30);

        // 30 km/h = 500 m/min
        let expected = (distance[0][1] as f64 / 500.0).round() as i64;
        assert_eq!(time[0][1], expected);
        assert_eq!(time[0][0], 0);
        assert_eq!(time[0][1], time[1][0]);
    }

    #[test]
    fn test_time_matrix_faster_speed_shorter_times() {
        let coords = vec![DEPOT, (25.3, 121.8)];
        let distance = build_distance_matrix(&coords);
        let slow = build_time_matrix(&distance, 30);
        let fast = build_time_matrix(&distance, 60);
        assert!(fast[0][1] < slow[0][1]);
    }
}
