use std::f64::consts::FRAC_1_SQRT_2;

use crate::filtering::Kernel;

static DX_PAIR: Kernel = Kernel::from_static(0, 0, 1, 0, &[1.0, -1.0]);
static DY_PAIR: Kernel = Kernel::from_static(0, 0, 0, 1, &[1.0, -1.0]);
static DX: Kernel = Kernel::from_static(-1, 0, 1, 0, &[0.5, 0.0, -0.5]);
static DY: Kernel = Kernel::from_static(0, -1, 0, 1, &[0.5, 0.0, -0.5]);

#[rustfmt::skip]
static SOBEL_X: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    1.0, 0.0, -1.0,
    2.0, 0.0, -2.0,
    1.0, 0.0, -1.0,
]);
#[rustfmt::skip]
static SOBEL_Y: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    1.0, 2.0, 1.0,
    0.0, 0.0, 0.0,
    -1.0, -2.0, -1.0,
]);
#[rustfmt::skip]
static SCALED_SOBEL_X: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    1.0 / 8.0, 0.0, -1.0 / 8.0,
    2.0 / 8.0, 0.0, -2.0 / 8.0,
    1.0 / 8.0, 0.0, -1.0 / 8.0,
]);
#[rustfmt::skip]
static SCALED_SOBEL_Y: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    1.0 / 8.0, 2.0 / 8.0, 1.0 / 8.0,
    0.0, 0.0, 0.0,
    -1.0 / 8.0, -2.0 / 8.0, -1.0 / 8.0,
]);
#[rustfmt::skip]
static SCHARR_X: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    3.0, 0.0, -3.0,
    10.0, 0.0, -10.0,
    3.0, 0.0, -3.0,
]);
#[rustfmt::skip]
static SCHARR_Y: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    3.0, 10.0, 3.0,
    0.0, 0.0, 0.0,
    -3.0, -10.0, -3.0,
]);
#[rustfmt::skip]
static SCALED_SCHARR_X: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    3.0 / 32.0, 0.0, -3.0 / 32.0,
    10.0 / 32.0, 0.0, -10.0 / 32.0,
    3.0 / 32.0, 0.0, -3.0 / 32.0,
]);
#[rustfmt::skip]
static SCALED_SCHARR_Y: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    3.0 / 32.0, 10.0 / 32.0, 3.0 / 32.0,
    0.0, 0.0, 0.0,
    -3.0 / 32.0, -10.0 / 32.0, -3.0 / 32.0,
]);
static ROBERTS_CROSS_QUADRANT_1: Kernel = Kernel::from_static(0, 0, 1, 1, &[1.0, 0.0, 0.0, -1.0]);
static ROBERTS_CROSS_QUADRANT_2: Kernel = Kernel::from_static(0, 0, 1, 1, &[0.0, 1.0, -1.0, 0.0]);
static SCALED_ROBERTS_CROSS_QUADRANT_1: Kernel =
    Kernel::from_static(0, 0, 1, 1, &[FRAC_1_SQRT_2, 0.0, 0.0, -FRAC_1_SQRT_2]);
static SCALED_ROBERTS_CROSS_QUADRANT_2: Kernel =
    Kernel::from_static(0, 0, 1, 1, &[0.0, FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0]);

// For m(x, y) = x^2: (x+1)^2 + (x-1)^2 - 2x^2 = 2.
static D2_DX2: Kernel = Kernel::from_static(-1, 0, 1, 0, &[1.0, -2.0, 1.0]);
static D2_DY2: Kernel = Kernel::from_static(0, -1, 0, 1, &[1.0, -2.0, 1.0]);

// Central difference of central differences; for m(x, y) = (x+y)^2:
// ((x+y+2)^2 + (x+y-2)^2 - 2(x+y)^2) / 4 = 2.
#[rustfmt::skip]
static D2_DXDY: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    0.25, 0.0, -0.25,
    0.0, 0.0, 0.0,
    -0.25, 0.0, 0.25,
]);
#[rustfmt::skip]
static LAPLACIAN: Kernel = Kernel::from_static(-1, -1, 1, 1, &[
    0.0, 1.0, 0.0,
    1.0, -4.0, 1.0,
    0.0, 1.0, 0.0,
]);

/// A named finite-difference stencil.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DerivativeOperator {
    /// One-sided difference `m(x) - m(x-1)`.
    DxPair,
    /// One-sided difference `m(y) - m(y-1)`.
    DyPair,
    Dx,
    Dy,
    SobelX,
    SobelY,
    ScaledSobelX,
    ScaledSobelY,
    ScharrX,
    ScharrY,
    ScaledScharrX,
    ScaledScharrY,
    RobertsCrossQuadrant1,
    RobertsCrossQuadrant2,
    ScaledRobertsCrossQuadrant1,
    ScaledRobertsCrossQuadrant2,
    D2Dx2,
    D2Dy2,
    D2Dxdy,
    Laplacian,
}

impl DerivativeOperator {
    pub const ALL: [DerivativeOperator; 20] = [DerivativeOperator::DxPair,
                                               DerivativeOperator::DyPair,
                                               DerivativeOperator::Dx,
                                               DerivativeOperator::Dy,
                                               DerivativeOperator::SobelX,
                                               DerivativeOperator::SobelY,
                                               DerivativeOperator::ScaledSobelX,
                                               DerivativeOperator::ScaledSobelY,
                                               DerivativeOperator::ScharrX,
                                               DerivativeOperator::ScharrY,
                                               DerivativeOperator::ScaledScharrX,
                                               DerivativeOperator::ScaledScharrY,
                                               DerivativeOperator::RobertsCrossQuadrant1,
                                               DerivativeOperator::RobertsCrossQuadrant2,
                                               DerivativeOperator::ScaledRobertsCrossQuadrant1,
                                               DerivativeOperator::ScaledRobertsCrossQuadrant2,
                                               DerivativeOperator::D2Dx2,
                                               DerivativeOperator::D2Dy2,
                                               DerivativeOperator::D2Dxdy,
                                               DerivativeOperator::Laplacian];

    pub fn kernel(self) -> &'static Kernel {
        match self {
            DerivativeOperator::DxPair => &DX_PAIR,
            DerivativeOperator::DyPair => &DY_PAIR,
            DerivativeOperator::Dx => &DX,
            DerivativeOperator::Dy => &DY,
            DerivativeOperator::SobelX => &SOBEL_X,
            DerivativeOperator::SobelY => &SOBEL_Y,
            DerivativeOperator::ScaledSobelX => &SCALED_SOBEL_X,
            DerivativeOperator::ScaledSobelY => &SCALED_SOBEL_Y,
            DerivativeOperator::ScharrX => &SCHARR_X,
            DerivativeOperator::ScharrY => &SCHARR_Y,
            DerivativeOperator::ScaledScharrX => &SCALED_SCHARR_X,
            DerivativeOperator::ScaledScharrY => &SCALED_SCHARR_Y,
            DerivativeOperator::RobertsCrossQuadrant1 => &ROBERTS_CROSS_QUADRANT_1,
            DerivativeOperator::RobertsCrossQuadrant2 => &ROBERTS_CROSS_QUADRANT_2,
            DerivativeOperator::ScaledRobertsCrossQuadrant1 => &SCALED_ROBERTS_CROSS_QUADRANT_1,
            DerivativeOperator::ScaledRobertsCrossQuadrant2 => &SCALED_ROBERTS_CROSS_QUADRANT_2,
            DerivativeOperator::D2Dx2 => &D2_DX2,
            DerivativeOperator::D2Dy2 => &D2_DY2,
            DerivativeOperator::D2Dxdy => &D2_DXDY,
            DerivativeOperator::Laplacian => &LAPLACIAN,
        }
    }
}

/// A family of first-derivative stencils; the first two approximate d/dx and
/// d/dy at the same scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GradientOperator {
    SimplePair,
    Simple,
    /// One-sided pair augmented with both scaled Roberts diagonals.
    Roberts,
    Sobel,
    ScaledSobel,
    Scharr,
    ScaledScharr,
}

impl Default for GradientOperator {
    fn default() -> Self {
        GradientOperator::SimplePair
    }
}

impl GradientOperator {
    pub fn derivatives(self) -> &'static [DerivativeOperator] {
        use self::DerivativeOperator::*;
        match self {
            GradientOperator::SimplePair => &[DxPair, DyPair],
            GradientOperator::Simple => &[Dx, Dy],
            GradientOperator::Roberts => {
                &[DxPair, DyPair, ScaledRobertsCrossQuadrant1, ScaledRobertsCrossQuadrant2]
            }
            GradientOperator::Sobel => &[SobelX, SobelY],
            GradientOperator::ScaledSobel => &[ScaledSobelX, ScaledSobelY],
            GradientOperator::Scharr => &[ScharrX, ScharrY],
            GradientOperator::ScaledScharr => &[ScaledScharrX, ScaledScharrY],
        }
    }

    #[inline]
    pub fn dx_operator(self) -> DerivativeOperator {
        self.derivatives()[0]
    }

    #[inline]
    pub fn dy_operator(self) -> DerivativeOperator {
        self.derivatives()[1]
    }
}
