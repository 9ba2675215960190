//! Model parameters, shared inputs and per-run rows
//!
//! A parameter set is split in two. [`ModelParameters`] holds the values
//! that may vary from run to run (each a scalar or a sequence of scalars).
//! [`SharedParameters`] holds inputs that are never expanded, such as a
//! mesh or a voxel grid, and is attached to every [`RunRow`] by `Arc`.

use crate::boundary::{BoundaryType, Shape};
use crate::error::{Result, ScatterError};
use crate::geometry::{BodyOutline, KrmOrganism, TriangleMesh};
use crate::model::ModelInfo;
use indexmap::IndexMap;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Flag(_) => "a flag",
            Self::Number(_) => "a number",
            Self::Text(_) => "text",
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<BoundaryType> for Scalar {
    fn from(v: BoundaryType) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

impl From<Shape> for Scalar {
    fn from(v: Shape) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

/// A scalar or a sequence of scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl ParamValue {
    /// The values as a slice (a scalar is a sequence of one)
    pub fn values(&self) -> &[Scalar] {
        match self {
            Self::One(s) => std::slice::from_ref(s),
            Self::Many(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// True when the value was given as a scalar
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::One(_))
    }
}

macro_rules! param_value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(v: $t) -> Self {
                    Self::One(v.into())
                }
            }

            impl From<Vec<$t>> for ParamValue {
                fn from(v: Vec<$t>) -> Self {
                    Self::Many(v.into_iter().map(Into::into).collect())
                }
            }
        )*
    };
}

param_value_from!(f64, bool, &str, String, BoundaryType, Shape);

impl From<Scalar> for ParamValue {
    fn from(v: Scalar) -> Self {
        Self::One(v)
    }
}

impl From<Vec<Scalar>> for ParamValue {
    fn from(v: Vec<Scalar>) -> Self {
        Self::Many(v)
    }
}

/// Expandable parameters, in the caller's declared order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelParameters {
    values: IndexMap<String, ParamValue>,
}

impl ModelParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a parameter; a replaced name keeps its position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ModelParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A non-expandable input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SharedValue {
    /// Numeric vector, e.g. per-material densities
    Vector { values: Vec<f64> },
    /// 3-D grid of material categories (0 is the surrounding medium)
    CategoryGrid { categories: Array3<u8> },
    /// Closed triangulated surface
    Mesh(TriangleMesh),
    /// Centreline discs of an axisymmetric-ish body
    Outline(BodyOutline),
    /// Body and inclusions for the Kirchhoff ray mode model
    Organism(KrmOrganism),
}

impl SharedValue {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Vector { .. } => "vector",
            Self::CategoryGrid { .. } => "category grid",
            Self::Mesh(_) => "mesh",
            Self::Outline(_) => "outline",
            Self::Organism(_) => "organism",
        }
    }
}

impl From<Vec<f64>> for SharedValue {
    fn from(values: Vec<f64>) -> Self {
        Self::Vector { values }
    }
}

impl From<Array3<u8>> for SharedValue {
    fn from(categories: Array3<u8>) -> Self {
        Self::CategoryGrid { categories }
    }
}

impl From<TriangleMesh> for SharedValue {
    fn from(mesh: TriangleMesh) -> Self {
        Self::Mesh(mesh)
    }
}

impl From<BodyOutline> for SharedValue {
    fn from(outline: BodyOutline) -> Self {
        Self::Outline(outline)
    }
}

impl From<KrmOrganism> for SharedValue {
    fn from(organism: KrmOrganism) -> Self {
        Self::Organism(organism)
    }
}

/// Non-expandable inputs shared by every run of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedParameters {
    values: IndexMap<String, SharedValue>,
}

impl SharedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<SharedValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SharedValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&SharedValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, name: &str) -> Result<&SharedValue> {
        self.values
            .get(name)
            .ok_or_else(|| ScatterError::MissingParameter {
                name: name.to_string(),
            })
    }

    fn wrong_kind(name: &str, expected: &str, got: &SharedValue) -> ScatterError {
        ScatterError::invalid(
            name,
            format!("expected a {expected}, got a {}", got.kind_name()),
        )
    }

    pub fn vector(&self, name: &str) -> Result<&[f64]> {
        match self.require(name)? {
            SharedValue::Vector { values } => Ok(values),
            other => Err(Self::wrong_kind(name, "vector", other)),
        }
    }

    pub fn category_grid(&self, name: &str) -> Result<&Array3<u8>> {
        match self.require(name)? {
            SharedValue::CategoryGrid { categories } => Ok(categories),
            other => Err(Self::wrong_kind(name, "category grid", other)),
        }
    }

    pub fn mesh(&self, name: &str) -> Result<&TriangleMesh> {
        match self.require(name)? {
            SharedValue::Mesh(mesh) => Ok(mesh),
            other => Err(Self::wrong_kind(name, "mesh", other)),
        }
    }

    pub fn outline(&self, name: &str) -> Result<&BodyOutline> {
        match self.require(name)? {
            SharedValue::Outline(outline) => Ok(outline),
            other => Err(Self::wrong_kind(name, "outline", other)),
        }
    }

    pub fn organism(&self, name: &str) -> Result<&KrmOrganism> {
        match self.require(name)? {
            SharedValue::Organism(organism) => Ok(organism),
            other => Err(Self::wrong_kind(name, "organism", other)),
        }
    }
}

/// One fully resolved combination of expandable values
#[derive(Debug, Clone, PartialEq)]
pub struct RunRow {
    index: usize,
    values: IndexMap<String, Scalar>,
    shared: Arc<SharedParameters>,
}

impl RunRow {
    pub fn new(
        index: usize,
        values: IndexMap<String, Scalar>,
        shared: Arc<SharedParameters>,
    ) -> Self {
        Self {
            index,
            values,
            shared,
        }
    }

    /// Position of the row in its batch
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn values(&self) -> &IndexMap<String, Scalar> {
        &self.values
    }

    pub fn shared(&self) -> &SharedParameters {
        &self.shared
    }

    /// The shared handle, for attaching to derived rows
    pub fn shared_handle(&self) -> &Arc<SharedParameters> {
        &self.shared
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.values.get(name)
    }

    pub fn number(&self, name: &str) -> Result<f64> {
        self.optional_number(name)?
            .ok_or_else(|| ScatterError::MissingParameter {
                name: name.to_string(),
            })
    }

    pub fn optional_number(&self, name: &str) -> Result<Option<f64>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(Scalar::Number(v)) => Ok(Some(*v)),
            Some(other) => Err(ScatterError::invalid(
                name,
                format!("expected a number, got {}", other.kind_name()),
            )),
        }
    }

    pub fn number_or(&self, name: &str, default: f64) -> Result<f64> {
        Ok(self.optional_number(name)?.unwrap_or(default))
    }

    pub fn text(&self, name: &str) -> Result<&str> {
        match self.values.get(name) {
            None => Err(ScatterError::MissingParameter {
                name: name.to_string(),
            }),
            Some(Scalar::Text(s)) => Ok(s),
            Some(other) => Err(ScatterError::invalid(
                name,
                format!("expected text, got {}", other.kind_name()),
            )),
        }
    }

    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str> {
        if self.values.contains_key(name) {
            self.text(name)
        } else {
            Ok(default)
        }
    }

    pub fn flag_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.values.get(name) {
            None => Ok(default),
            Some(Scalar::Flag(b)) => Ok(*b),
            Some(other) => Err(ScatterError::invalid(
                name,
                format!("expected a flag, got {}", other.kind_name()),
            )),
        }
    }

    /// The `boundary_type` value
    pub fn boundary_type(&self) -> Result<BoundaryType> {
        self.text("boundary_type")?.parse()
    }

    /// The `boundary_type` value, or `default` when absent
    pub fn boundary_type_or(&self, default: BoundaryType) -> Result<BoundaryType> {
        if self.values.contains_key("boundary_type") {
            self.boundary_type()
        } else {
            Ok(default)
        }
    }

    /// The `shape` value
    pub fn shape(&self) -> Result<Shape> {
        self.text("shape")?.parse()
    }
}

/// Kind of value a parameter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Finite number > 0
    Positive,
    /// Any finite number
    Real,
    /// Free text
    Text,
    /// A [`BoundaryType`] tag
    Boundary,
    /// A [`Shape`] tag
    Shape,
    Flag,
    Vector,
    CategoryGrid,
    Mesh,
    Outline,
    Organism,
}

/// Whether a parameter varies per run or is shared by the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRole {
    Expandable,
    Shared,
}

/// When a parameter must be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Always,
    Optional,
    /// Required when any run uses one of these boundary types
    WhenBoundary(&'static [BoundaryType]),
    /// Required when any run uses a boundary type not in this list
    UnlessBoundary(&'static [BoundaryType]),
    /// Required when any run uses one of these shapes
    WhenShape(&'static [Shape]),
}

/// Declaration of one model parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub unit: &'static str,
    pub kind: ValueKind,
    pub role: ParameterRole,
    pub requirement: Requirement,
}

impl ParameterSpec {
    /// A required parameter; shared kinds get the shared role
    pub const fn new(name: &'static str, unit: &'static str, kind: ValueKind) -> Self {
        let role = if kind.is_shared() {
            ParameterRole::Shared
        } else {
            ParameterRole::Expandable
        };
        Self {
            name,
            unit,
            kind,
            role,
            requirement: Requirement::Always,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    pub const fn when_boundary(mut self, boundary_types: &'static [BoundaryType]) -> Self {
        self.requirement = Requirement::WhenBoundary(boundary_types);
        self
    }

    pub const fn unless_boundary(mut self, boundary_types: &'static [BoundaryType]) -> Self {
        self.requirement = Requirement::UnlessBoundary(boundary_types);
        self
    }

    pub const fn when_shape(mut self, shapes: &'static [Shape]) -> Self {
        self.requirement = Requirement::WhenShape(shapes);
        self
    }

    /// Force the shared role for a scalar-kinded parameter
    pub const fn shared(mut self) -> Self {
        self.role = ParameterRole::Shared;
        self
    }
}

impl ValueKind {
    const fn is_shared(&self) -> bool {
        matches!(
            self,
            Self::Vector | Self::CategoryGrid | Self::Mesh | Self::Outline | Self::Organism
        )
    }
}

fn check_scalar(info: &ModelInfo, spec: &ParameterSpec, value: &Scalar) -> Result<()> {
    let name = spec.name;
    match spec.kind {
        ValueKind::Positive => match value.as_number() {
            Some(v) if v.is_finite() && v > 0.0 => Ok(()),
            Some(v) => Err(ScatterError::invalid(name, format!("must be positive, got {v}"))),
            None => Err(ScatterError::invalid(
                name,
                format!("expected a number, got {}", value.kind_name()),
            )),
        },
        ValueKind::Real => match value.as_number() {
            Some(v) if v.is_finite() => Ok(()),
            Some(v) => Err(ScatterError::invalid(name, format!("must be finite, got {v}"))),
            None => Err(ScatterError::invalid(
                name,
                format!("expected a number, got {}", value.kind_name()),
            )),
        },
        ValueKind::Text => value.as_text().map(|_| ()).ok_or_else(|| {
            ScatterError::invalid(name, format!("expected text, got {}", value.kind_name()))
        }),
        ValueKind::Flag => value.as_flag().map(|_| ()).ok_or_else(|| {
            ScatterError::invalid(name, format!("expected a flag, got {}", value.kind_name()))
        }),
        ValueKind::Boundary => {
            let tag = value.as_text().ok_or_else(|| {
                ScatterError::invalid(name, format!("expected text, got {}", value.kind_name()))
            })?;
            let boundary_type: BoundaryType = tag.parse()?;
            if info.boundary_types.contains(&boundary_type) {
                Ok(())
            } else {
                Err(ScatterError::UnsupportedBoundaryType {
                    model: info.name.to_string(),
                    boundary_type: boundary_type.to_string(),
                })
            }
        }
        ValueKind::Shape => {
            let tag = value.as_text().ok_or_else(|| {
                ScatterError::invalid(name, format!("expected text, got {}", value.kind_name()))
            })?;
            let shape: Shape = tag.parse()?;
            if info.shapes.contains(&shape) {
                Ok(())
            } else {
                Err(ScatterError::UnsupportedShape {
                    model: info.name.to_string(),
                    shape: shape.to_string(),
                })
            }
        }
        ValueKind::Vector
        | ValueKind::CategoryGrid
        | ValueKind::Mesh
        | ValueKind::Outline
        | ValueKind::Organism => Err(ScatterError::MisplacedParameter {
            name: name.to_string(),
            expected: "shared",
        }),
    }
}

fn check_shared(spec: &ParameterSpec, value: &SharedValue) -> Result<()> {
    let ok = matches!(
        (spec.kind, value),
        (ValueKind::Vector, SharedValue::Vector { .. })
            | (ValueKind::CategoryGrid, SharedValue::CategoryGrid { .. })
            | (ValueKind::Mesh, SharedValue::Mesh(_))
            | (ValueKind::Outline, SharedValue::Outline(_))
            | (ValueKind::Organism, SharedValue::Organism(_))
    );
    if !ok {
        return Err(ScatterError::invalid(
            spec.name,
            format!("unexpected shared value of kind {}", value.kind_name()),
        ));
    }
    match value {
        SharedValue::Vector { values } if values.is_empty() => {
            Err(ScatterError::invalid(spec.name, "empty vector"))
        }
        SharedValue::Vector { values } if values.iter().any(|v| !v.is_finite()) => {
            Err(ScatterError::invalid(spec.name, "vector holds non-finite values"))
        }
        SharedValue::CategoryGrid { categories } if categories.is_empty() => {
            Err(ScatterError::invalid(spec.name, "empty grid"))
        }
        SharedValue::Mesh(mesh) => mesh
            .validate()
            .map_err(|e| ScatterError::invalid(spec.name, e.to_string())),
        SharedValue::Outline(outline) => outline
            .validate()
            .map_err(|e| ScatterError::invalid(spec.name, e.to_string())),
        SharedValue::Organism(organism) => organism
            .validate()
            .map_err(|e| ScatterError::invalid(spec.name, e.to_string())),
        _ => Ok(()),
    }
}

/// Validate a parameter set against a model's declarations
///
/// Every failure is a configuration error. Conditional requirements are
/// triggered by any value of the expandable `boundary_type` or `shape`
/// sequence, so a batch mixing boundary types must carry the parameters of
/// all of them.
pub fn validate_parameter_set(
    info: &ModelInfo,
    specs: &[ParameterSpec],
    expandable: &ModelParameters,
    shared: &SharedParameters,
) -> Result<()> {
    let find = |name: &str| specs.iter().find(|s| s.name == name);

    for (name, value) in expandable.iter() {
        if shared.contains(name) {
            return Err(ScatterError::ConflictingParameter {
                name: name.to_string(),
            });
        }
        let spec = find(name).ok_or_else(|| ScatterError::UnknownParameter {
            name: name.to_string(),
        })?;
        if spec.role == ParameterRole::Shared {
            return Err(ScatterError::MisplacedParameter {
                name: name.to_string(),
                expected: "shared",
            });
        }
        if value.is_empty() {
            return Err(ScatterError::invalid(name, "empty sequence"));
        }
        for scalar in value.values() {
            check_scalar(info, spec, scalar)?;
        }
    }

    for name in shared.names() {
        let spec = find(name).ok_or_else(|| ScatterError::UnknownParameter {
            name: name.to_string(),
        })?;
        if spec.role == ParameterRole::Expandable {
            return Err(ScatterError::MisplacedParameter {
                name: name.to_string(),
                expected: "expandable",
            });
        }
        if let Some(value) = shared.get(name) {
            check_shared(spec, value)?;
        }
    }

    let boundary_types: HashSet<BoundaryType> = expandable
        .get("boundary_type")
        .map(|v| {
            v.values()
                .iter()
                .filter_map(Scalar::as_text)
                .filter_map(|t| t.parse().ok())
                .collect()
        })
        .unwrap_or_default();
    let shapes: HashSet<Shape> = expandable
        .get("shape")
        .map(|v| {
            v.values()
                .iter()
                .filter_map(Scalar::as_text)
                .filter_map(|t| t.parse().ok())
                .collect()
        })
        .unwrap_or_default();

    for spec in specs {
        let required = match spec.requirement {
            Requirement::Always => true,
            Requirement::Optional => false,
            Requirement::WhenBoundary(list) => boundary_types.iter().any(|bt| list.contains(bt)),
            Requirement::UnlessBoundary(list) => {
                boundary_types.iter().any(|bt| !list.contains(bt))
            }
            Requirement::WhenShape(list) => shapes.iter().any(|s| list.contains(s)),
        };
        let present = match spec.role {
            ParameterRole::Expandable => expandable.contains(spec.name),
            ParameterRole::Shared => shared.contains(spec.name),
        };
        if required && !present {
            return Err(ScatterError::MissingParameter {
                name: spec.name.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalyticalType;

    const BOUNDARIES: &[BoundaryType] = &[BoundaryType::FixedRigid, BoundaryType::FluidFilled];

    const SPECS: &[ParameterSpec] = &[
        ParameterSpec::new("medium_c", "m/s", ValueKind::Positive),
        ParameterSpec::new("a", "m", ValueKind::Positive),
        ParameterSpec::new("theta", "°", ValueKind::Real).optional(),
        ParameterSpec::new("boundary_type", "", ValueKind::Boundary),
        ParameterSpec::new("target_c", "m/s", ValueKind::Positive)
            .when_boundary(&[BoundaryType::FluidFilled]),
        ParameterSpec::new("weights", "", ValueKind::Vector).optional(),
    ];

    fn info() -> ModelInfo {
        ModelInfo {
            name: "test",
            long_name: "test model",
            analytical_type: AnalyticalType::Exact,
            boundary_types: BOUNDARIES,
            shapes: &[],
            max_ka: None,
        }
    }

    fn base() -> ModelParameters {
        ModelParameters::new()
            .with("medium_c", 1500.0)
            .with("a", vec![0.01, 0.02])
            .with("boundary_type", "fixed rigid")
    }

    #[test]
    fn test_valid_set() {
        let shared = SharedParameters::new().with("weights", vec![1.0, 2.0]);
        assert_eq!(
            validate_parameter_set(&info(), SPECS, &base(), &shared),
            Ok(())
        );
    }

    #[test]
    fn test_unknown_and_conflicting() {
        let shared = SharedParameters::new();
        let err = validate_parameter_set(&info(), SPECS, &base().with("b", 1.0), &shared)
            .unwrap_err();
        assert_eq!(
            err,
            ScatterError::UnknownParameter {
                name: "b".to_string()
            }
        );

        let shared = SharedParameters::new().with("a", vec![0.01]);
        let err = validate_parameter_set(&info(), SPECS, &base(), &shared).unwrap_err();
        assert!(matches!(err, ScatterError::ConflictingParameter { .. }));
    }

    #[test]
    fn test_misplaced() {
        let shared = SharedParameters::new();
        let params = base().with("weights", vec![1.0, 2.0]);
        let err = validate_parameter_set(&info(), SPECS, &params, &shared).unwrap_err();
        assert_eq!(
            err,
            ScatterError::MisplacedParameter {
                name: "weights".to_string(),
                expected: "shared"
            }
        );
    }

    #[test]
    fn test_conditional_requirement_triggered_by_any_value() {
        let shared = SharedParameters::new();
        let params = base().with("boundary_type", vec!["fixed rigid", "fluid filled"]);
        let err = validate_parameter_set(&info(), SPECS, &params, &shared).unwrap_err();
        assert_eq!(
            err,
            ScatterError::MissingParameter {
                name: "target_c".to_string()
            }
        );
        let params = params.with("target_c", 1600.0);
        assert!(validate_parameter_set(&info(), SPECS, &params, &shared).is_ok());
    }

    #[test]
    fn test_value_checks() {
        let shared = SharedParameters::new();
        let cases = [
            base().with("a", -1.0),
            base().with("a", "big"),
            base().with("a", Vec::<f64>::new()),
            base().with("theta", f64::NAN),
        ];
        for params in cases {
            let err = validate_parameter_set(&info(), SPECS, &params, &shared).unwrap_err();
            assert!(err.is_configuration_error(), "{err}");
        }

        let err = validate_parameter_set(
            &info(),
            SPECS,
            &base().with("boundary_type", "elastic"),
            &shared,
        )
        .unwrap_err();
        assert!(matches!(err, ScatterError::UnsupportedBoundaryType { .. }));

        let err = validate_parameter_set(
            &info(),
            SPECS,
            &base().with("boundary_type", "gooey"),
            &shared,
        )
        .unwrap_err();
        assert!(matches!(err, ScatterError::UnknownBoundaryType { .. }));
    }

    #[test]
    fn test_run_row_accessors() {
        let mut values = IndexMap::new();
        values.insert("a".to_string(), Scalar::from(0.01));
        values.insert("boundary_type".to_string(), Scalar::from("fluid-filled"));
        values.insert("irregular".to_string(), Scalar::from(true));
        let row = RunRow::new(3, values, Arc::new(SharedParameters::new()));

        assert_eq!(row.index(), 3);
        assert_eq!(row.number("a"), Ok(0.01));
        assert_eq!(row.number_or("theta", 90.0), Ok(90.0));
        assert_eq!(row.boundary_type(), Ok(BoundaryType::FluidFilled));
        assert_eq!(row.flag_or("irregular", false), Ok(true));
        assert!(matches!(
            row.number("f"),
            Err(ScatterError::MissingParameter { .. })
        ));
        assert!(row.number("boundary_type").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let params = base().with("theta", vec![0.0, 45.0]);
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.starts_with("{\"medium_c\":1500.0"));
        let back: ModelParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);

        let shared = SharedParameters::new().with("rho", vec![1026.0, 1030.0]);
        let json = serde_json::to_string(&shared).unwrap();
        assert_eq!(json, r#"{"rho":{"kind":"vector","values":[1026.0,1030.0]}}"#);
        let back: SharedParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shared);
    }
}
