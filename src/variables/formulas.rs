//! Derived-variable computations.
//!
//! Each formula reads its raw inputs as full-resolution profiles (time
//! averaged over the case window, not yet height cropped), combines them
//! elementwise, and crops the result on the height grid of its first input.
//! Inputs on different grids are an absence error, not a panic.

use ndarray::{Array1, Zip};

use super::descriptor::Computation;
use crate::io::{DataReaderError, DatasetAccessor};
use crate::math::physics::{
    cloud_water_coefficient, kinematic_flux, number_per_kg, skewness, theta_l_with_ice, Constants,
};
use crate::series::Series;
use crate::windowing::{time_average, DatasetWindow};

/// Reads raw fields for a computation against one dataset and window
pub struct FieldReader<'a> {
    dataset: &'a dyn DatasetAccessor,
    window: &'a DatasetWindow,
}

impl<'a> FieldReader<'a> {
    pub fn new(dataset: &'a dyn DatasetAccessor, window: &'a DatasetWindow) -> Self {
        Self { dataset, window }
    }

    pub fn has(&self, name: &str) -> bool {
        self.dataset.has_variable(name)
    }

    /// First of `names` present in the dataset
    pub fn first_present<'n>(&self, names: &[&'n str]) -> Option<&'n str> {
        names.iter().copied().find(|name| self.has(name))
    }

    /// Time-averaged profile over the window's averaging interval
    pub fn profile(&self, name: &str) -> Result<Array1<f64>, DataReaderError> {
        let window = self.window.for_variable(self.dataset, name)?;
        let values = self.dataset.read_variable(name, window.profile)?;
        if values.nrows() == 0 {
            return Err(DataReaderError::Shape(format!(
                "{} has no records in the averaging window",
                name
            )));
        }
        Ok(time_average(&values))
    }

    /// Profile of the first present name; returns the name used with it
    pub fn profile_any<'n>(
        &self,
        names: &[&'n str],
    ) -> Result<(&'n str, Array1<f64>), DataReaderError> {
        let name = self
            .first_present(names)
            .ok_or_else(|| DataReaderError::MissingVariable(names.join("|")))?;
        Ok((name, self.profile(name)?))
    }

    /// Profile with NaN replaced by zero; a missing field reads as zeros on
    /// the dataset's height grid
    pub fn profile_zero_filled(&self, name: &str) -> Result<Array1<f64>, DataReaderError> {
        if !self.has(name) {
            let height = self.dataset.height_for(name)?;
            return Ok(Array1::zeros(height.len()));
        }
        Ok(self.profile(name)?.mapv(|v| if v.is_nan() { 0.0 } else { v }))
    }

    /// Pair computed values with the height grid of `grid_of` and crop
    ///
    /// # Returns
    /// * `Ok(None)` when nothing lies inside the height window
    pub fn finish(
        &self,
        values: Array1<f64>,
        grid_of: &str,
    ) -> Result<Option<Series>, DataReaderError> {
        let height = self.dataset.height_for(grid_of)?;
        aligned(&[&values, &height])?;

        let (z, v) = self.window.crop(&height.to_vec(), &values.to_vec());
        if v.is_empty() {
            return Ok(None);
        }
        Series::new(v, z).map(Some)
    }
}

/// Check that every field has the same length
pub fn aligned(fields: &[&Array1<f64>]) -> Result<(), DataReaderError> {
    if let Some(first) = fields.first() {
        if let Some(other) = fields.iter().find(|f| f.len() != first.len()) {
            return Err(DataReaderError::Shape(format!(
                "fields on different grids: {} vs {} levels",
                first.len(),
                other.len()
            )));
        }
    }
    Ok(())
}

/// `field * factor`
#[derive(Debug, Clone, Copy)]
pub struct ScaledField {
    pub field: &'static str,
    pub factor: f64,
}

impl ScaledField {
    pub fn new(field: &'static str, factor: f64) -> Self {
        Self { field, factor }
    }
}

impl Computation for ScaledField {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let reader = FieldReader::new(dataset, window);
        let values = reader.profile(self.field)?.mapv(|v| v * self.factor);
        reader.finish(values, self.field)
    }
}

/// Energy flux to kinematic flux: `flux / (density * heat)`
#[derive(Debug, Clone, Copy)]
pub struct KinematicFlux {
    pub flux: &'static str,
    pub density: &'static str,
    pub heat: f64,
}

impl KinematicFlux {
    /// Sensible or virtual heat flux, divided by `RHO * 1004`
    pub fn heat(flux: &'static str) -> Self {
        Self {
            flux,
            density: "RHO",
            heat: Constants::default().cp_flux,
        }
    }

    /// Moisture flux, divided by `RHO * 2.5104e6`
    pub fn moisture(flux: &'static str) -> Self {
        Self {
            flux,
            density: "RHO",
            heat: Constants::default().lv_flux,
        }
    }
}

impl Computation for KinematicFlux {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let reader = FieldReader::new(dataset, window);
        let flux = reader.profile(self.flux)?;
        let rho = reader.profile(self.density)?;
        aligned(&[&flux, &rho])?;

        let heat = self.heat;
        let values = Zip::from(&flux)
            .and(&rho)
            .map_collect(|&f, &r| kinematic_flux(f, r, heat));
        reader.finish(values, self.flux)
    }
}

/// Per-kg number concentration: `field * 1e6 / RHO`
#[derive(Debug, Clone, Copy)]
pub struct NumberConcentration {
    pub field: &'static str,
    /// Read a missing or NaN source field as zero
    pub zero_fill_field: bool,
}

impl NumberConcentration {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            zero_fill_field: false,
        }
    }

    pub fn zero_filled(field: &'static str) -> Self {
        Self {
            field,
            zero_fill_field: true,
        }
    }
}

impl Computation for NumberConcentration {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let reader = FieldReader::new(dataset, window);
        let field = if self.zero_fill_field {
            reader.profile_zero_filled(self.field)?
        } else {
            reader.profile(self.field)?
        };
        let rho = reader.profile("RHO")?;
        aligned(&[&field, &rho])?;

        let values = Zip::from(&field).and(&rho).map_collect(|&n, &r| number_per_kg(n, r));
        reader.finish(values, "RHO")
    }
}

/// `third / (second + epsilon)^1.5`, each input taken from the first present name
#[derive(Debug, Clone, Copy)]
pub struct Skewness {
    pub third: &'static [&'static str],
    pub second: &'static [&'static str],
    pub epsilon: f64,
}

impl Computation for Skewness {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let reader = FieldReader::new(dataset, window);
        let (third_name, third) = reader.profile_any(self.third)?;
        let (_, second) = reader.profile_any(self.second)?;
        aligned(&[&third, &second])?;

        let epsilon = self.epsilon;
        let values = Zip::from(&third)
            .and(&second)
            .map_collect(|&t, &s| skewness(t, s, epsilon));
        reader.finish(values, third_name)
    }
}

/// Elementwise sum of several fields
#[derive(Debug, Clone, Copy)]
pub struct FieldSum {
    pub fields: &'static [&'static str],
}

impl Computation for FieldSum {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let reader = FieldReader::new(dataset, window);
        let first = match self.fields.first() {
            Some(first) => *first,
            None => return Ok(None),
        };

        let mut total = reader.profile(first)?;
        for name in &self.fields[1..] {
            let field = reader.profile(name)?;
            aligned(&[&total, &field])?;
            total = total + field;
        }
        reader.finish(total, first)
    }
}

/// `left * right`
#[derive(Debug, Clone, Copy)]
pub struct FieldProduct {
    pub left: &'static str,
    pub right: &'static str,
    /// Read missing or NaN inputs as zero
    pub zero_fill: bool,
}

impl FieldProduct {
    pub fn new(left: &'static str, right: &'static str) -> Self {
        Self {
            left,
            right,
            zero_fill: false,
        }
    }

    pub fn zero_filled(left: &'static str, right: &'static str) -> Self {
        Self {
            left,
            right,
            zero_fill: true,
        }
    }
}

impl Computation for FieldProduct {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let reader = FieldReader::new(dataset, window);
        let (left, right) = if self.zero_fill {
            (reader.profile_zero_filled(self.left)?, reader.profile_zero_filled(self.right)?)
        } else {
            (reader.profile(self.left)?, reader.profile(self.right)?)
        };
        aligned(&[&left, &right])?;
        reader.finish(&left * &right, self.left)
    }
}

/// Contribution of a cloud-water flux to a buoyancy flux
///
/// `flux * (2.5e6 / (1004.67 * (PRES/1000)^(287.04/1004.67)) - 1.61 * THETAV)`.
/// With a density field the flux is an energy flux and is first divided by
/// `density * 2.5104e6`.
#[derive(Debug, Clone, Copy)]
pub struct CloudWaterContribution {
    pub flux: &'static str,
    pub density: Option<&'static str>,
    /// Read missing or NaN inputs as zero
    pub zero_fill: bool,
}

impl Computation for CloudWaterContribution {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let constants = Constants::default();
        let reader = FieldReader::new(dataset, window);
        let read = |name: &str| {
            if self.zero_fill {
                reader.profile_zero_filled(name)
            } else {
                reader.profile(name)
            }
        };

        let mut flux = read(self.flux)?;
        if let Some(density) = self.density {
            let rho = read(density)?;
            aligned(&[&flux, &rho])?;
            flux = Zip::from(&flux)
                .and(&rho)
                .map_collect(|&f, &r| kinematic_flux(f, r, constants.lv_flux));
        }
        let pres = read("PRES")?;
        let thetav = read("THETAV")?;
        aligned(&[&flux, &pres, &thetav])?;

        let values = Zip::from(&flux)
            .and(&pres)
            .and(&thetav)
            .map_collect(|&f, &p, &tv| f * cloud_water_coefficient(p, tv, &constants));
        reader.finish(values, self.flux)
    }
}

/// SAM liquid-water potential temperature with ice correction
///
/// `THETAL + 2500.4 * (THETA / TABS) * (QI / 1000)`; `QI` reads as zero when absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SamThetaL;

impl Computation for SamThetaL {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let constants = Constants::default();
        let reader = FieldReader::new(dataset, window);
        let thetal = reader.profile("THETAL")?;
        let theta = reader.profile("THETA")?;
        let tabs = reader.profile("TABS")?;
        let qi = reader.profile_zero_filled("QI")?;
        aligned(&[&thetal, &theta, &tabs, &qi])?;

        let values = Zip::from(&thetal)
            .and(&theta)
            .and(&tabs)
            .and(&qi)
            .map_collect(|&tl, &th, &t, &q| theta_l_with_ice(tl, th, t, q, &constants));
        reader.finish(values, "THETAL")
    }
}

/// SAM total water excluding ice, in kg/kg: `(QT - QI) / 1000`
#[derive(Debug, Clone, Copy, Default)]
pub struct SamTotalWater;

impl Computation for SamTotalWater {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let reader = FieldReader::new(dataset, window);
        let qt = reader.profile("QT")?;
        let qi = reader.profile_zero_filled("QI")?;
        aligned(&[&qt, &qi])?;
        reader.finish((&qt - &qi) / 1000.0, "QT")
    }
}

/// Try computations in order; the first that yields a series wins
///
/// Absence errors move on to the next candidate. When every candidate comes
/// up empty the last absence error is returned.
#[derive(Default)]
pub struct FirstOf(Vec<Box<dyn Computation>>);

impl FirstOf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate, tried after those already added
    pub fn or(mut self, computation: impl Computation + 'static) -> Self {
        self.0.push(Box::new(computation));
        self
    }
}

impl Computation for FirstOf {
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        let mut last_absence = None;
        for candidate in &self.0 {
            match candidate.compute(dataset, window) {
                Ok(Some(series)) => return Ok(Some(series)),
                Ok(None) => continue,
                Err(e) if e.is_absence() => last_absence = Some(e),
                Err(e) => return Err(e),
            }
        }
        match last_absence {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
