//! Strongly-typed dimension primitives (zero-cost newtypes).
//!
//! Design goals:
//! - No raw integers for lengths in domain logic
//! - Integer-exact addition and subtraction; the operators saturate at the
//!   bounds, guest arithmetic goes through the `checked_*` forms
//! - Conversions only via [`Unit`]

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::errors::{BindError, DimensionError};

/// Number of scaled points in one point.
pub const FACTOR: i64 = 65536;

/// 2^63: the first float magnitude an `i64` can not hold.
const RAW_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Fixed-point length: 1/65536 of a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ScaledPoint(pub i64);

impl ScaledPoint {
    pub const ZERO: ScaledPoint = ScaledPoint(0);

    /// Create a ScaledPoint from raw scaled points.
    #[inline]
    pub const fn sp(val: i64) -> ScaledPoint {
        ScaledPoint(val)
    }

    /// Create a ScaledPoint from whole points (const-friendly, saturating).
    #[inline]
    pub const fn pt(val: i64) -> ScaledPoint {
        ScaledPoint(val.saturating_mul(FACTOR))
    }

    /// Whole points, `None` if the result does not fit.
    #[inline]
    pub fn checked_pt(val: i64) -> Option<ScaledPoint> {
        val.checked_mul(FACTOR).map(ScaledPoint)
    }

    /// Create a ScaledPoint from fractional points, rounding to the nearest
    /// scaled point.
    #[inline]
    pub fn from_pt(val: f64) -> ScaledPoint {
        ScaledPoint((val * FACTOR as f64).round() as i64)
    }

    /// Fractional points, `None` if the value is not finite or does not fit.
    pub fn checked_from_pt(val: f64) -> Option<ScaledPoint> {
        Self::from_raw_f64((val * FACTOR as f64).round())
    }

    /// Amount of `unit` expressed in scaled points, rounded to nearest.
    pub fn from_unit(val: f64, unit: Unit) -> ScaledPoint {
        let (num, den) = unit.ratio();
        ScaledPoint((val * num as f64 * FACTOR as f64 / den as f64).round() as i64)
    }

    /// Like [`ScaledPoint::from_unit`], `None` if the result does not fit.
    pub fn checked_from_unit(val: f64, unit: Unit) -> Option<ScaledPoint> {
        let (num, den) = unit.ratio();
        Self::from_raw_f64((val * num as f64 * FACTOR as f64 / den as f64).round())
    }

    /// Whole scaled points held in a float.
    fn from_raw_f64(raw: f64) -> Option<ScaledPoint> {
        (raw.is_finite() && (-RAW_LIMIT..RAW_LIMIT).contains(&raw)).then_some(ScaledPoint(raw as i64))
    }

    /// Get the raw value (use sparingly, prefer typed operations)
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Value in points.
    #[inline]
    pub fn to_pt(self) -> f64 {
        self.0 as f64 / FACTOR as f64
    }

    /// Value in the given unit.
    pub fn to_unit(self, unit: Unit) -> f64 {
        let (num, den) = unit.ratio();
        self.0 as f64 * den as f64 / (num as f64 * FACTOR as f64)
    }

    /// Value in the unit named by `unit` (`"mm"`, `"in"`, ...).
    pub fn to_unit_named(self, unit: &str) -> Result<f64, DimensionError> {
        let unit = Unit::from_name(unit).ok_or_else(|| DimensionError::unknown_unit(unit))?;
        Ok(self.to_unit(unit))
    }

    /// Get the absolute value
    #[inline]
    pub fn abs(self) -> ScaledPoint {
        ScaledPoint(self.0.abs())
    }

    /// Checked division by a ratio, `None` if the divisor is zero.
    /// The result is truncated toward zero.
    #[inline]
    pub fn checked_div(self, rhs: f64) -> Option<ScaledPoint> {
        if rhs == 0.0 {
            None
        } else {
            Some(ScaledPoint((self.0 as f64 / rhs) as i64))
        }
    }

    /// Checked ratio of two lengths, `None` if the divisor is zero.
    #[inline]
    pub fn checked_ratio(self, rhs: ScaledPoint) -> Option<f64> {
        if rhs.0 == 0 {
            None
        } else {
            Some(self.0 as f64 / rhs.0 as f64)
        }
    }

    pub fn checked_add(self, rhs: ScaledPoint) -> Option<ScaledPoint> {
        self.0.checked_add(rhs.0).map(ScaledPoint)
    }

    pub fn checked_sub(self, rhs: ScaledPoint) -> Option<ScaledPoint> {
        self.0.checked_sub(rhs.0).map(ScaledPoint)
    }

    pub fn checked_neg(self) -> Option<ScaledPoint> {
        self.0.checked_neg().map(ScaledPoint)
    }

    /// Scaling by a ratio, truncated toward zero; `None` if it does not fit.
    pub fn checked_mul(self, rhs: f64) -> Option<ScaledPoint> {
        Self::from_raw_f64((self.0 as f64 * rhs).trunc())
    }

    /// Division by a ratio that reports [`BindError::DivideByZero`], and
    /// [`DimensionError::OutOfRange`] when the quotient does not fit.
    pub fn try_div(self, rhs: f64) -> Result<ScaledPoint, BindError> {
        if rhs == 0.0 {
            return Err(BindError::DivideByZero);
        }
        Self::from_raw_f64((self.0 as f64 / rhs).trunc())
            .ok_or_else(|| DimensionError::out_of_range(format!("{self} / {rhs}")).into())
    }

    /// Ratio of two lengths that reports [`BindError::DivideByZero`].
    pub fn try_ratio(self, rhs: ScaledPoint) -> Result<f64, BindError> {
        self.checked_ratio(rhs).ok_or(BindError::DivideByZero)
    }
}

impl Add for ScaledPoint {
    type Output = ScaledPoint;
    fn add(self, rhs: ScaledPoint) -> ScaledPoint { ScaledPoint(self.0.saturating_add(rhs.0)) }
}
impl Sub for ScaledPoint {
    type Output = ScaledPoint;
    fn sub(self, rhs: ScaledPoint) -> ScaledPoint { ScaledPoint(self.0.saturating_sub(rhs.0)) }
}
/// Scaling by a ratio truncates toward zero.
impl Mul<f64> for ScaledPoint {
    type Output = ScaledPoint;
    fn mul(self, rhs: f64) -> ScaledPoint { ScaledPoint((self.0 as f64 * rhs) as i64) }
}
impl Mul<ScaledPoint> for f64 {
    type Output = ScaledPoint;
    fn mul(self, rhs: ScaledPoint) -> ScaledPoint { rhs * self }
}

// NOTE: Div is intentionally NOT implemented as a trait.
// Use checked_div()/checked_ratio() which handle a zero divisor.

impl Neg for ScaledPoint {
    type Output = ScaledPoint;
    fn neg(self) -> ScaledPoint { ScaledPoint(self.0.saturating_neg()) }
}

impl AddAssign for ScaledPoint {
    fn add_assign(&mut self, rhs: ScaledPoint) {
        *self = *self + rhs;
    }
}

impl SubAssign for ScaledPoint {
    fn sub_assign(&mut self, rhs: ScaledPoint) {
        *self = *self - rhs;
    }
}

impl std::iter::Sum for ScaledPoint {
    fn sum<I: Iterator<Item = ScaledPoint>>(iter: I) -> ScaledPoint {
        iter.fold(ScaledPoint::ZERO, |a, b| a + b)
    }
}

/// Renders as `<integer-or-decimal>pt`; the decimal part is exact, so the
/// output parses back to the same value.
impl fmt::Display for ScaledPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}pt", self.to_pt())
    }
}

impl FromStr for ScaledPoint {
    type Err = DimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_dimension(s)
    }
}

/// Physical units accepted in dimension strings.
///
/// `pt` is the desktop-publishing point (1/72 in), the same as `bp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Pt,
    Bp,
    In,
    Cm,
    Mm,
    Pc,
    Px,
    Dd,
    Cc,
    Sp,
}

impl Unit {
    pub const ALL: [Unit; 10] = [
        Unit::Pt,
        Unit::Bp,
        Unit::In,
        Unit::Cm,
        Unit::Mm,
        Unit::Pc,
        Unit::Px,
        Unit::Dd,
        Unit::Cc,
        Unit::Sp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Unit::Pt => "pt",
            Unit::Bp => "bp",
            Unit::In => "in",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::Pc => "pc",
            Unit::Px => "px",
            Unit::Dd => "dd",
            Unit::Cc => "cc",
            Unit::Sp => "sp",
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Unit> {
        Unit::ALL
            .into_iter()
            .find(|u| u.name().eq_ignore_ascii_case(name))
    }

    /// One unit expressed in points, as `(numerator, denominator)`.
    pub const fn ratio(self) -> (i64, i64) {
        match self {
            Unit::Pt | Unit::Bp => (1, 1),
            Unit::In => (72, 1),
            Unit::Cm => (3600, 127),
            Unit::Mm => (360, 127),
            Unit::Pc => (12, 1),
            Unit::Px => (3, 4),
            // 1238/1157 TeX points, 7200/7227 points per TeX point
            Unit::Dd => (8_913_600, 8_361_639),
            Unit::Cc => (106_963_200, 8_361_639),
            Unit::Sp => (1, FACTOR),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
