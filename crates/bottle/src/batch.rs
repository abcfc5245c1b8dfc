use ndarray::{Array1, Array2, ArrayView1};

use crate::{
    BottleInput, BottleModel, BottleParameters, BottleRates, BottleState, ModelError, Rate,
    Variable,
};

/// Model inputs at a set of collocation nodes, one column per [`Variable`].
///
/// Every column must have one entry per node. Parameters held constant over a
/// phase are simply repeated; see [`NodeBatch::uniform`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBatch {
    pub pressure: Array1<f64>,
    pub liquid_volume: Array1<f64>,
    pub bottle_volume: Array1<f64>,
    pub heat_capacity_ratio: Array1<f64>,
    pub liquid_density: Array1<f64>,
    pub outlet_area: Array1<f64>,
    pub back_pressure: Array1<f64>,
    pub pressure_loss: Array1<f64>,
}

impl NodeBatch {
    /// Builds a batch from node states that all share one set of parameters.
    #[must_use]
    pub fn uniform(states: &[BottleState], parameters: &BottleParameters) -> Self {
        let n = states.len();
        Self {
            pressure: states.iter().map(|s| s.pressure).collect(),
            liquid_volume: states.iter().map(|s| s.liquid_volume).collect(),
            bottle_volume: Array1::from_elem(n, parameters.bottle_volume),
            heat_capacity_ratio: Array1::from_elem(n, parameters.heat_capacity_ratio),
            liquid_density: Array1::from_elem(n, parameters.liquid_density),
            outlet_area: Array1::from_elem(n, parameters.outlet_area),
            back_pressure: Array1::from_elem(n, parameters.back_pressure),
            pressure_loss: Array1::from_elem(n, parameters.pressure_loss),
        }
    }

    /// Builds a batch from individual node inputs.
    #[must_use]
    pub fn from_inputs(inputs: &[BottleInput]) -> Self {
        let column = |variable: Variable| -> Array1<f64> {
            inputs.iter().map(|i| i.value(variable)).collect()
        };
        Self {
            pressure: column(Variable::Pressure),
            liquid_volume: column(Variable::LiquidVolume),
            bottle_volume: column(Variable::BottleVolume),
            heat_capacity_ratio: column(Variable::HeatCapacityRatio),
            liquid_density: column(Variable::LiquidDensity),
            outlet_area: column(Variable::OutletArea),
            back_pressure: column(Variable::BackPressure),
            pressure_loss: column(Variable::PressureLoss),
        }
    }

    /// Number of nodes, taken from the pressure column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    #[must_use]
    pub fn column(&self, variable: Variable) -> &Array1<f64> {
        match variable {
            Variable::Pressure => &self.pressure,
            Variable::LiquidVolume => &self.liquid_volume,
            Variable::BottleVolume => &self.bottle_volume,
            Variable::HeatCapacityRatio => &self.heat_capacity_ratio,
            Variable::LiquidDensity => &self.liquid_density,
            Variable::OutletArea => &self.outlet_area,
            Variable::BackPressure => &self.back_pressure,
            Variable::PressureLoss => &self.pressure_loss,
        }
    }

    /// Checks that every column has one entry per node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] naming the first bad column.
    pub fn check_shape(&self) -> Result<usize, ModelError> {
        let expected = self.len();
        for variable in Variable::ALL {
            let found = self.column(variable).len();
            if found != expected {
                return Err(ModelError::ShapeMismatch {
                    column: variable.name(),
                    expected,
                    found,
                });
            }
        }
        Ok(expected)
    }

    /// Returns the input at node `index`.
    ///
    /// Returns `None` if `index` is out of bounds or the columns are ragged.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<BottleInput> {
        let n = self.check_shape().ok()?;
        (index < n).then(|| self.node_at(index))
    }

    /// Every node in order, once the shape is known to be consistent.
    fn nodes(&self) -> Result<impl Iterator<Item = BottleInput> + '_, ModelError> {
        let n = self.check_shape()?;
        Ok((0..n).map(|i| self.node_at(i)))
    }

    // Callers guarantee `index < self.check_shape()?`.
    fn node_at(&self, index: usize) -> BottleInput {
        BottleInput {
            state: BottleState {
                pressure: self.pressure[index],
                liquid_volume: self.liquid_volume[index],
            },
            parameters: BottleParameters {
                bottle_volume: self.bottle_volume[index],
                heat_capacity_ratio: self.heat_capacity_ratio[index],
                liquid_density: self.liquid_density[index],
                outlet_area: self.outlet_area[index],
                back_pressure: self.back_pressure[index],
                pressure_loss: self.pressure_loss[index],
            },
        }
    }

    /// Evaluates `(p_dot, Vl_dot)` at every node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] for ragged columns, or the first
    /// node's model error.
    pub fn derivatives(&self, model: &BottleModel) -> Result<RateBatch, ModelError> {
        let mut pressure_rate = Vec::with_capacity(self.len());
        let mut liquid_volume_rate = Vec::with_capacity(self.len());

        for input in self.nodes()? {
            let rates = model.rates(&input)?;
            pressure_rate.push(rates.pressure_rate);
            liquid_volume_rate.push(rates.liquid_volume_rate);
        }

        Ok(RateBatch {
            pressure_rate: Array1::from_vec(pressure_rate),
            liquid_volume_rate: Array1::from_vec(liquid_volume_rate),
        })
    }

    /// Evaluates the Jacobian at every node.
    ///
    /// # Errors
    ///
    /// Same as [`NodeBatch::derivatives`].
    pub fn partials(&self, model: &BottleModel) -> Result<JacobianBatch, ModelError> {
        let n = self.check_shape()?;
        let mut pressure_rate = Array2::zeros((n, Variable::ALL.len()));
        let mut liquid_volume_rate = Array2::zeros((n, Variable::ALL.len()));

        for (i, input) in self.nodes()?.enumerate() {
            let jac = model.jacobian(&input)?;
            for variable in Variable::ALL {
                let j = variable.index();
                pressure_rate[[i, j]] = jac.pressure_rate.get(variable);
                liquid_volume_rate[[i, j]] = jac.liquid_volume_rate.get(variable);
            }
        }

        Ok(JacobianBatch {
            pressure_rate,
            liquid_volume_rate,
        })
    }
}

/// State derivatives at every node of a [`NodeBatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct RateBatch {
    pub pressure_rate: Array1<f64>,
    pub liquid_volume_rate: Array1<f64>,
}

impl RateBatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.pressure_rate.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pressure_rate.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<BottleRates> {
        Some(BottleRates {
            pressure_rate: *self.pressure_rate.get(index)?,
            liquid_volume_rate: *self.liquid_volume_rate.get(index)?,
        })
    }

    #[must_use]
    pub fn column(&self, rate: Rate) -> &Array1<f64> {
        match rate {
            Rate::PressureRate => &self.pressure_rate,
            Rate::LiquidVolumeRate => &self.liquid_volume_rate,
        }
    }
}

/// Jacobian blocks over a [`NodeBatch`].
///
/// Each node's rates depend only on that node's inputs, so every block
/// `∂rate/∂variable` across the batch is diagonal. Only the diagonals are
/// stored: row `i` holds node `i`, column `j` holds [`Variable::ALL`]`[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct JacobianBatch {
    pub pressure_rate: Array2<f64>,
    pub liquid_volume_rate: Array2<f64>,
}

impl JacobianBatch {
    /// Returns the diagonal of the `∂rate/∂variable` block, one entry per node.
    #[must_use]
    pub fn block(&self, rate: Rate, variable: Variable) -> ArrayView1<'_, f64> {
        let rows = match rate {
            Rate::PressureRate => &self.pressure_rate,
            Rate::LiquidVolumeRate => &self.liquid_volume_rate,
        };
        rows.column(variable.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::ExpansionLaw;

    fn params() -> BottleParameters {
        BottleParameters {
            bottle_volume: 0.015,
            heat_capacity_ratio: 1.303,
            liquid_density: 786.6,
            outlet_area: 1e-3,
            back_pressure: 1e5,
            pressure_loss: 0.0,
        }
    }

    fn states() -> Vec<BottleState> {
        vec![
            BottleState {
                pressure: 5.06e6,
                liquid_volume: 0.0107,
            },
            BottleState {
                pressure: 3.0e6,
                liquid_volume: 0.008,
            },
            BottleState {
                pressure: 9.0e4,
                liquid_volume: 0.002,
            },
        ]
    }

    #[test]
    fn batch_matches_pointwise_evaluation() {
        let model = BottleModel::default();
        let batch = NodeBatch::uniform(&states(), &params());
        assert_eq!(batch.len(), 3);

        let rates = batch.derivatives(&model).unwrap();
        let jac = batch.partials(&model).unwrap();

        for (i, state) in states().into_iter().enumerate() {
            let input = BottleInput::new(state, params());
            assert_eq!(batch.node(i), Some(input));
            assert_eq!(rates.get(i), Some(model.rates(&input).unwrap()));

            let expected = model.jacobian(&input).unwrap();
            for rate in Rate::ALL {
                for variable in Variable::ALL {
                    assert_eq!(jac.block(rate, variable)[i], expected.get(rate, variable));
                }
            }
        }

        // The third node sits below the back pressure.
        assert_eq!(rates.column(Rate::LiquidVolumeRate)[2], 0.0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let model = BottleModel::new(ExpansionLaw::Damped);
        let batch = NodeBatch::uniform(&states(), &params());

        let first = batch.derivatives(&model).unwrap();
        for _ in 0..5 {
            assert_eq!(batch.derivatives(&model).unwrap(), first);
        }
    }

    #[test]
    fn from_inputs_allows_per_node_parameters() {
        let inputs = [
            BottleInput::new(states()[0], params()),
            BottleInput::new(
                states()[0],
                BottleParameters {
                    outlet_area: 2e-3,
                    ..params()
                },
            ),
        ];
        let batch = NodeBatch::from_inputs(&inputs);
        assert_eq!(batch.outlet_area, array![1e-3, 2e-3]);

        let rates = batch.derivatives(&BottleModel::default()).unwrap();
        assert_relative_eq!(
            rates.liquid_volume_rate[1],
            2.0 * rates.liquid_volume_rate[0],
            max_relative = 1e-12
        );
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let mut batch = NodeBatch::uniform(&states(), &params());
        batch.liquid_density = array![786.6, 786.6];

        let err = batch.derivatives(&BottleModel::default()).unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                column: "liquid_density",
                expected: 3,
                found: 2,
            }
        );
        assert!(batch.partials(&BottleModel::default()).is_err());
    }

    #[test]
    fn short_trailing_column_is_never_skipped() {
        // Every column but the last is complete, so only the shape check can
        // notice the missing node.
        let mut batch = NodeBatch::uniform(&states(), &params());
        batch.pressure_loss = array![0.0, 0.0];

        assert!(matches!(
            batch.derivatives(&BottleModel::default()),
            Err(ModelError::ShapeMismatch {
                column: "pressure_loss",
                expected: 3,
                found: 2,
            })
        ));
        assert!(matches!(
            batch.partials(&BottleModel::default()),
            Err(ModelError::ShapeMismatch { .. })
        ));
        assert_eq!(batch.node(0), None);
    }

    #[test]
    fn shortened_pressure_column_reports_the_others() {
        // The node count comes from pressure, so the longer columns are flagged.
        let mut batch = NodeBatch::uniform(&states(), &params());
        batch.pressure = array![5.06e6];

        let err = batch.derivatives(&BottleModel::default()).unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                column: "liquid_volume",
                expected: 1,
                found: 3,
            }
        );
        assert_eq!(batch.node(5), None);
    }

    #[test]
    fn node_error_stops_the_batch() {
        let mut batch = NodeBatch::uniform(&states(), &params());
        batch.liquid_volume[1] = 0.02;

        assert!(matches!(
            batch.derivatives(&BottleModel::default()),
            Err(ModelError::NonPositiveUllage { .. })
        ));
    }

    #[test]
    fn empty_batch_is_fine() {
        let batch = NodeBatch::uniform(&[], &params());
        assert!(batch.is_empty());

        let rates = batch.derivatives(&BottleModel::default()).unwrap();
        assert!(rates.is_empty());

        let jac = batch.partials(&BottleModel::default()).unwrap();
        assert_eq!(jac.pressure_rate.dim(), (0, 8));
    }
}
