//! Lookup of models by short name

use crate::error::{Result, ScatterError};
use crate::modal::TruncationPolicy;
use crate::model::ScatteringModel;
use crate::models::{
    DeformedCylinder, Dwba, ElasticSphere, HighPass, KirchhoffApproximation, KirchhoffRayMode,
    ModalSeriesSphere, PhaseTrackingDwba, ProlateSpheroidModalSeries,
};

/// Short names of every registered model
pub const MODEL_NAMES: [&str; 9] = [
    "mss", "es", "psms", "dcm", "hp", "ka", "krm", "dwba", "pt-dwba",
];

/// Model registered under `name`, with the default truncation policy
pub fn model_by_name(name: &str) -> Result<Box<dyn ScatteringModel>> {
    model_with_truncation(name, TruncationPolicy::default())
}

/// Model registered under `name`
///
/// `truncation` applies to the modal-series models and is ignored by the
/// approximate ones.
pub fn model_with_truncation(
    name: &str,
    truncation: TruncationPolicy,
) -> Result<Box<dyn ScatteringModel>> {
    let model: Box<dyn ScatteringModel> = match name.trim().to_ascii_lowercase().as_str() {
        "mss" => Box::new(ModalSeriesSphere::with_truncation(truncation)),
        "es" => Box::new(ElasticSphere::with_truncation(truncation)),
        "psms" => Box::new(ProlateSpheroidModalSeries::with_truncation(truncation)),
        "dcm" => Box::new(DeformedCylinder::with_truncation(truncation)),
        "hp" => Box::new(HighPass),
        "ka" => Box::new(KirchhoffApproximation),
        "krm" => Box::new(KirchhoffRayMode),
        "dwba" => Box::new(Dwba),
        "pt-dwba" | "ptdwba" => Box::new(PhaseTrackingDwba),
        _ => {
            return Err(ScatterError::UnknownModel {
                name: name.to_string(),
            });
        }
    };
    Ok(model)
}

/// One instance of every registered model
pub fn all_models() -> Vec<Box<dyn ScatteringModel>> {
    MODEL_NAMES
        .iter()
        .filter_map(|name| model_by_name(name).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for name in MODEL_NAMES {
            let model = model_by_name(name).unwrap();
            assert_eq!(model.info().name, name);
        }
        assert_eq!(all_models().len(), MODEL_NAMES.len());
        assert_eq!(model_by_name(" PT-DWBA ").unwrap().info().name, "pt-dwba");
    }

    #[test]
    fn test_unknown_model() {
        let err = model_by_name("bem").unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(err.to_string(), "unknown model 'bem'");
    }

    #[test]
    fn test_every_model_declares_its_parameters() {
        for model in all_models() {
            let names: Vec<&str> = model.parameters().iter().map(|p| p.name).collect();
            assert!(!names.is_empty());
            let mut unique = names.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), names.len(), "{}", model.info().name);
        }
    }
}
