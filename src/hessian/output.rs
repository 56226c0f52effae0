use std::fmt;
use std::str::FromStr;

use nalgebra::Vector2;

use crate::errors::{Error, ErrorKind};
use crate::hessian::{EigenPolicy, HessianSample};

/// A per-pixel quantity derived from the Hessian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HessianOutput {
    Lambda1,
    Lambda2,
    Lambda1Plus,
    Lambda2Plus,
    Lambda1Minus,
    Lambda2Minus,
    Vx1,
    Vy1,
    Vx2,
    Vy2,
    GradientV1ScalarProduct,
    GradientV2ScalarProduct,
}

impl HessianOutput {
    pub const ALL: [HessianOutput; 12] = [HessianOutput::Lambda1,
                                          HessianOutput::Lambda2,
                                          HessianOutput::Lambda1Plus,
                                          HessianOutput::Lambda2Plus,
                                          HessianOutput::Lambda1Minus,
                                          HessianOutput::Lambda2Minus,
                                          HessianOutput::Vx1,
                                          HessianOutput::Vy1,
                                          HessianOutput::Vx2,
                                          HessianOutput::Vy2,
                                          HessianOutput::GradientV1ScalarProduct,
                                          HessianOutput::GradientV2ScalarProduct];

    pub fn name(self) -> &'static str {
        match self {
            HessianOutput::Lambda1 => "lambda1",
            HessianOutput::Lambda2 => "lambda2",
            HessianOutput::Lambda1Plus => "lambda1_plus",
            HessianOutput::Lambda2Plus => "lambda2_plus",
            HessianOutput::Lambda1Minus => "lambda1_minus",
            HessianOutput::Lambda2Minus => "lambda2_minus",
            HessianOutput::Vx1 => "vx1",
            HessianOutput::Vy1 => "vy1",
            HessianOutput::Vx2 => "vx2",
            HessianOutput::Vy2 => "vy2",
            HessianOutput::GradientV1ScalarProduct => "gradient_v1_scalar_product",
            HessianOutput::GradientV2ScalarProduct => "gradient_v2_scalar_product",
        }
    }

    #[inline]
    pub fn requires_gradient(self) -> bool {
        match self {
            HessianOutput::GradientV1ScalarProduct |
            HessianOutput::GradientV2ScalarProduct => true,
            _ => false,
        }
    }

    /// Value of this output at one pixel. `gradient` is ignored by outputs
    /// that do not need it and read as zero when missing.
    #[inline]
    pub fn evaluate(self,
                    sample: &HessianSample,
                    gradient: Option<&Vector2<f64>>,
                    policy: &EigenPolicy)
                    -> f64 {
        match self {
            HessianOutput::Lambda1 => sample.ordered_eigenvalues(policy).0,
            HessianOutput::Lambda2 => sample.ordered_eigenvalues(policy).1,
            HessianOutput::Lambda1Plus => sample.clamped_eigenvalues(policy).plus.0,
            HessianOutput::Lambda2Plus => sample.clamped_eigenvalues(policy).plus.1,
            HessianOutput::Lambda1Minus => sample.clamped_eigenvalues(policy).minus.0,
            HessianOutput::Lambda2Minus => sample.clamped_eigenvalues(policy).minus.1,
            HessianOutput::Vx1 => sample.eigenvector(true, policy).x,
            HessianOutput::Vy1 => sample.eigenvector(true, policy).y,
            HessianOutput::Vx2 => sample.eigenvector(false, policy).x,
            HessianOutput::Vy2 => sample.eigenvector(false, policy).y,
            HessianOutput::GradientV1ScalarProduct => {
                gradient.map_or(0.0, |gradient| sample.scalar_product(true, policy, gradient))
            }
            HessianOutput::GradientV2ScalarProduct => {
                gradient.map_or(0.0, |gradient| sample.scalar_product(false, policy, gradient))
            }
        }
    }
}

impl fmt::Display for HessianOutput {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for HessianOutput {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        HessianOutput::ALL
            .iter()
            .cloned()
            .find(|output| output.name() == name)
            .ok_or_else(|| ErrorKind::UnknownOutput(name.to_owned()).into())
    }
}
