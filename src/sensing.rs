//! Sensor sampling of the trail field.
//!
//! A sensor sits `sensor_distance` cells ahead of the agent along
//! `heading + angle_offset` and sums a square window of cells around its
//! rounded center. Samples that fall outside the field are skipped, so the
//! effective window shrinks near the edges.

use glam::{Vec2, Vec3};

use crate::config::{SensingMode, SimConfig};
use crate::field::TrailField;

/// The three readings steering compares.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorReadings {
    /// Straight ahead.
    pub forward: f32,
    /// At `heading + sensor_angle`.
    pub left: f32,
    /// At `heading - sensor_angle`.
    pub right: f32,
}

/// Sensor geometry and scoring, copied out of the config once per phase.
#[derive(Clone, Copy, Debug)]
pub struct Sensor {
    pub angle: f32,
    pub distance: f32,
    pub half_width: i64,
    pub mode: SensingMode,
}

impl Sensor {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            angle: config.sensor_angle,
            distance: config.sensor_distance,
            half_width: config.sensor_half_width as i64,
            mode: config.sensing,
        }
    }

    /// Desirability of the field at one sensor.
    pub fn read(
        &self,
        field: &TrailField,
        position: Vec2,
        heading: f32,
        color: Vec3,
        angle_offset: f32,
    ) -> f32 {
        let sensor_angle = heading + angle_offset;
        let center = position + Vec2::from_angle(sensor_angle) * self.distance;
        let cx = center.x.round() as i64;
        let cy = center.y.round() as i64;

        // Remap the agent's own color once; only the weighted mode uses it.
        let weight = color * 2.0 - Vec3::ONE;

        let mut sum = 0.0;
        for dx in -self.half_width..=self.half_width {
            for dy in -self.half_width..=self.half_width {
                let Some(value) = field.sample(cx + dx, cy + dy) else {
                    continue;
                };
                sum += match self.mode {
                    SensingMode::Scalar => value.element_sum() / 3.0,
                    SensingMode::SpeciesWeighted => (value * 2.0 - Vec3::ONE).dot(weight),
                };
            }
        }
        sum
    }

    /// Forward, left and right readings for one agent.
    pub fn read_all(
        &self,
        field: &TrailField,
        position: Vec2,
        heading: f32,
        color: Vec3,
    ) -> SensorReadings {
        SensorReadings {
            forward: self.read(field, position, heading, color, 0.0),
            left: self.read(field, position, heading, color, self.angle),
            right: self.read(field, position, heading, color, -self.angle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(mode: SensingMode, half_width: i64) -> Sensor {
        Sensor {
            angle: std::f32::consts::FRAC_PI_4,
            distance: 3.0,
            half_width,
            mode,
        }
    }

    #[test]
    fn test_zero_field_scalar_reads_zero() {
        let field = TrailField::new(20, 20);
        let s = sensor(SensingMode::Scalar, 2);
        for heading in [0.0, 1.0, 2.5, -4.0] {
            for pos in [Vec2::new(0.5, 0.5), Vec2::new(10.0, 10.0), Vec2::new(19.9, 0.1)] {
                assert_eq!(s.read(&field, pos, heading, Vec3::ONE, 0.3), 0.0);
            }
        }
    }

    #[test]
    fn test_samples_rounded_center() {
        let mut field = TrailField::new(10, 10);
        field.set(8, 5, Vec3::ONE);
        let s = sensor(SensingMode::Scalar, 0);
        // 5.4 + 3.0 = 8.4 rounds to 8.
        let reading = s.read(&field, Vec2::new(5.4, 5.2), 0.0, Vec3::ONE, 0.0);
        assert!((reading - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_window_skips_out_of_bounds() {
        let mut field = TrailField::new(4, 4);
        field.fill(Vec3::ONE);
        let s = sensor(SensingMode::Scalar, 1);
        // Sensor center lands on the corner (3, 0): only a 2x2 block is inside.
        let reading = s.read(&field, Vec2::new(0.0, 0.0), 0.0, Vec3::ONE, 0.0);
        assert!((reading - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_species_weighting_prefers_own_color() {
        let mut field = TrailField::new(10, 10);
        let red = Vec3::X;
        let green = Vec3::Y;
        field.set(6, 5, red);
        let s = sensor(SensingMode::SpeciesWeighted, 0);
        let pos = Vec2::new(3.0, 5.0);

        let as_red = s.read(&field, pos, 0.0, red, 0.0);
        let as_green = s.read(&field, pos, 0.0, green, 0.0);
        // (1,-1,-1).(1,-1,-1) = 3 ; (1,-1,-1).(-1,1,-1) = -1
        assert!((as_red - 3.0).abs() < 1e-6);
        assert!((as_green + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_read_all_uses_side_offsets() {
        let mut field = TrailField::new(20, 20);
        let s = sensor(SensingMode::Scalar, 0);
        let pos = Vec2::new(10.0, 10.0);
        let left = pos + Vec2::from_angle(s.angle) * s.distance;
        field.set(left.x.round() as u32, left.y.round() as u32, Vec3::ONE);

        let readings = s.read_all(&field, pos, 0.0, Vec3::ONE);
        assert_eq!(readings.forward, 0.0);
        assert_eq!(readings.right, 0.0);
        assert!((readings.left - 1.0).abs() < 1e-6);
    }
}
