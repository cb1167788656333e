//! Tail probabilities of the reference distributions used by the tests.

use statrs::distribution::{ChiSquared, ContinuousCDF as _, FisherSnedecor, Normal, StudentsT};

use crate::StatsError;

/// Two-tailed p-value of a Student's t statistic.
pub(crate) fn students_t_two_tailed(t: f64, dof: f64) -> Result<f64, StatsError> {
    let dist = StudentsT::new(0.0, 1.0, dof).map_err(|_| StatsError::Distribution {
        name: "Student's t",
    })?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

/// Upper-tail probability of an F statistic.
pub(crate) fn fisher_snedecor_sf(f: f64, dof1: f64, dof2: f64) -> Result<f64, StatsError> {
    let dist =
        FisherSnedecor::new(dof1, dof2).map_err(|_| StatsError::Distribution { name: "F" })?;
    Ok(dist.sf(f))
}

/// Upper-tail probability of a chi-square statistic.
pub(crate) fn chi_squared_sf(x: f64, dof: f64) -> Result<f64, StatsError> {
    let dist = ChiSquared::new(dof).map_err(|_| StatsError::Distribution { name: "chi-square" })?;
    Ok(dist.sf(x))
}

fn standard_normal() -> Result<Normal, StatsError> {
    Normal::new(0.0, 1.0).map_err(|_| StatsError::Distribution { name: "normal" })
}

/// Quantile function of the standard normal distribution.
pub(crate) fn normal_quantile(p: f64) -> Result<f64, StatsError> {
    Ok(standard_normal()?.inverse_cdf(p))
}

/// Upper-tail probability of the standard normal distribution.
pub(crate) fn normal_sf(z: f64) -> Result<f64, StatsError> {
    Ok(standard_normal()?.sf(z))
}
