//! Parameter collections with per-array trainable flags.

use ndarray::{Array1, ArrayD};

use crate::error::{SpsaError, SpsaResult};

/// A single parameter array and whether the optimizer may change it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    values: ArrayD<f64>,
    trainable: bool,
}

impl Parameter {
    /// A parameter array that is perturbed and updated.
    pub fn trainable(values: ArrayD<f64>) -> Self {
        Self {
            values,
            trainable: true,
        }
    }

    /// A parameter array that is passed through unchanged.
    pub fn frozen(values: ArrayD<f64>) -> Self {
        Self {
            values,
            trainable: false,
        }
    }

    /// A trainable one-dimensional parameter array.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self::trainable(Array1::from(values).into_dyn())
    }

    /// Get the values.
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// Get the values mutably.
    pub fn values_mut(&mut self) -> &mut ArrayD<f64> {
        &mut self.values
    }

    /// Consume the parameter, returning its values.
    pub fn into_values(self) -> ArrayD<f64> {
        self.values
    }

    /// Whether the optimizer updates this array.
    pub fn is_trainable(&self) -> bool {
        self.trainable
    }

    /// Shape of the array.
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Number of scalar entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the array holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn with_values(&self, values: ArrayD<f64>) -> Self {
        Self {
            values,
            trainable: self.trainable,
        }
    }
}

/// An ordered collection of parameter arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    /// Create a collection from its arrays.
    pub fn new(params: Vec<Parameter>) -> Self {
        Self { params }
    }

    /// Append an array.
    pub fn push(&mut self, param: Parameter) {
        self.params.push(param);
    }

    /// Number of arrays, trainable or not.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the collection holds no arrays.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get an array by position.
    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    /// Iterate over the arrays in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Shapes of all arrays in order.
    pub fn shapes(&self) -> Vec<Vec<usize>> {
        self.params.iter().map(|p| p.shape().to_vec()).collect()
    }

    /// Number of scalar entries the optimizer may change.
    pub fn num_trainable(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.is_trainable())
            .map(Parameter::len)
            .sum()
    }

    /// All entries in order, flattened in logical (row-major) order.
    pub fn to_flat_vec(&self) -> Vec<f64> {
        self.params
            .iter()
            .flat_map(|p| p.values.iter().copied())
            .collect()
    }

    /// Check this collection against previously recorded shapes.
    pub fn check_shapes(&self, expected: &[Vec<usize>]) -> SpsaResult<()> {
        if self.params.len() != expected.len() {
            return Err(SpsaError::LengthMismatch {
                expected: expected.len(),
                found: self.params.len(),
            });
        }

        for (index, (param, shape)) in self.params.iter().zip(expected).enumerate() {
            if param.shape() != shape.as_slice() {
                return Err(SpsaError::ShapeMismatch {
                    index,
                    expected: shape.clone(),
                    found: param.shape().to_vec(),
                });
            }
        }

        Ok(())
    }
}

impl From<Vec<f64>> for ParameterSet {
    fn from(values: Vec<f64>) -> Self {
        Self::new(vec![Parameter::from_vec(values)])
    }
}

impl From<Vec<Parameter>> for ParameterSet {
    fn from(params: Vec<Parameter>) -> Self {
        Self::new(params)
    }
}

impl FromIterator<Parameter> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl std::ops::Index<usize> for ParameterSet {
    type Output = Parameter;

    fn index(&self, index: usize) -> &Self::Output {
        &self.params[index]
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl IntoIterator for ParameterSet {
    type Item = Parameter;
    type IntoIter = std::vec::IntoIter<Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    fn mixed_set() -> ParameterSet {
        ParameterSet::new(vec![
            Parameter::from_vec(vec![1.0, 2.0, 3.0]),
            Parameter::frozen(ArrayD::zeros(IxDyn(&[2, 2]))),
            Parameter::trainable(ArrayD::from_elem(IxDyn(&[2, 3]), 0.5)),
        ])
    }

    #[test]
    fn test_counts() {
        let set = mixed_set();
        assert_eq!(set.len(), 3);
        assert_eq!(set.num_trainable(), 9);
        assert_eq!(set.shapes(), vec![vec![3], vec![2, 2], vec![2, 3]]);
        assert!(!set[1].is_trainable());
    }

    #[test]
    fn test_flat_vec() {
        let set = ParameterSet::from(vec![1.0, -1.0]);
        assert_eq!(set.to_flat_vec(), vec![1.0, -1.0]);
        assert_eq!(mixed_set().to_flat_vec().len(), 13);
    }

    #[test]
    fn test_check_shapes_accepts_same_layout() {
        let set = mixed_set();
        assert!(set.check_shapes(&set.shapes()).is_ok());
    }

    #[test]
    fn test_check_shapes_reports_index() {
        let set = mixed_set();
        let mut shapes = set.shapes();
        shapes[2] = vec![3, 2];

        match set.check_shapes(&shapes) {
            Err(SpsaError::ShapeMismatch {
                index,
                expected,
                found,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(expected, vec![3, 2]);
                assert_eq!(found, vec![2, 3]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_check_shapes_reports_length() {
        let set = mixed_set();
        let err = set.check_shapes(&[vec![3]]).unwrap_err();
        assert!(matches!(
            err,
            SpsaError::LengthMismatch {
                expected: 1,
                found: 3
            }
        ));
        assert!(err.is_shape_mismatch());
    }
}
