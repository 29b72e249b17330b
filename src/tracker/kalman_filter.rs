//! Constant-velocity Kalman filter over `[cx, cy, area, aspect, vcx, vcy, varea]`.
//!
//! The aspect ratio is modelled as constant; the measurement is the first four
//! components.

use nalgebra::{SMatrix, SVector};

pub type StateVector = SVector<f64, 7>;
pub type StateCovariance = SMatrix<f64, 7, 7>;
pub type Measurement = SVector<f64, 4>;

type MeasurementMatrix = SMatrix<f64, 4, 7>;
type MeasurementCovariance = SMatrix<f64, 4, 4>;

/// Filter state for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanState {
    pub mean: StateVector,
    pub covariance: StateCovariance,
}

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: StateCovariance,
    update_mat: MeasurementMatrix,
    process_noise: StateCovariance,
    measurement_noise: MeasurementCovariance,
    initial_covariance: StateCovariance,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let mut motion_mat = StateCovariance::identity();
        for i in 0..3 {
            motion_mat[(i, i + 4)] = 1.0;
        }

        let mut update_mat = MeasurementMatrix::zeros();
        for i in 0..4 {
            update_mat[(i, i)] = 1.0;
        }

        // Velocities are unobserved at birth, so start them very uncertain.
        let initial_covariance = StateCovariance::from_diagonal(&SVector::from([
            10.0, 10.0, 10.0, 10.0, 1e4, 1e4, 1e4,
        ]));
        let process_noise = StateCovariance::from_diagonal(&SVector::from([
            1.0, 1.0, 1.0, 1.0, 1e-2, 1e-2, 1e-4,
        ]));
        let measurement_noise =
            MeasurementCovariance::from_diagonal(&SVector::from([1.0, 1.0, 10.0, 10.0]));

        Self {
            motion_mat,
            update_mat,
            process_noise,
            measurement_noise,
            initial_covariance,
        }
    }

    /// Start a track at `measurement` with zero velocity.
    pub fn initiate(&self, measurement: [f64; 4]) -> KalmanState {
        let mut mean = StateVector::zeros();
        mean.fixed_rows_mut::<4>(0).copy_from(&Measurement::from(measurement));
        KalmanState {
            mean,
            covariance: self.initial_covariance,
        }
    }

    /// Advance the state by one frame.
    pub fn predict(&self, state: &mut KalmanState) {
        // Never let the predicted area go negative.
        if state.mean[6] + state.mean[2] <= 0.0 {
            state.mean[6] = 0.0;
        }
        state.mean = self.motion_mat * state.mean;
        state.covariance =
            self.motion_mat * state.covariance * self.motion_mat.transpose() + self.process_noise;
    }

    /// Correct the state with a new measurement.
    ///
    /// Returns false and leaves the state untouched when the innovation
    /// covariance cannot be inverted.
    pub fn update(&self, state: &mut KalmanState, measurement: [f64; 4]) -> bool {
        let projected = self.update_mat * state.mean;
        let innovation = Measurement::from(measurement) - projected;
        let innovation_cov = self.update_mat * state.covariance * self.update_mat.transpose()
            + self.measurement_noise;

        let Some(innovation_inv) = innovation_cov.try_inverse() else {
            return false;
        };

        let kalman_gain = state.covariance * self.update_mat.transpose() * innovation_inv;
        state.mean += kalman_gain * innovation;
        state.covariance =
            (StateCovariance::identity() - kalman_gain * self.update_mat) * state.covariance;
        true
    }
}
