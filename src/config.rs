use crate::Args;
use anyhow::Context;
use label_preprocess::{CropStrategy, EdgeMode, PreprocessingOptions};
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub inputs: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub options_file: Option<PathBuf>,
    pub crop_strategy: Option<CropStrategy>,
    pub fixed_crop_ratio: Option<f32>,
    pub edge_mode: Option<EdgeMode>,
    pub no_red_hue: bool,
    pub no_contrast: bool,
    pub no_edges: bool,
    pub no_morphology: bool,
    pub no_normalize: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            inputs: args.inputs,
            out_dir: args.out_dir,
            options_file: args.options,
            crop_strategy: args.crop_strategy,
            fixed_crop_ratio: args.fixed_crop_ratio,
            edge_mode: args.edge_mode,
            no_red_hue: args.no_red_hue,
            no_contrast: args.no_contrast,
            no_edges: args.no_edges,
            no_morphology: args.no_morphology,
            no_normalize: args.no_normalize,
        }
    }
}

impl Config {
    /// Options file (if any), then command-line overrides, then validation
    pub fn preprocessing_options(&self) -> anyhow::Result<PreprocessingOptions> {
        let mut options = match &self.options_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read options file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Invalid options file {}", path.display()))?
            }
            None => PreprocessingOptions::default(),
        };

        if let Some(strategy) = self.crop_strategy {
            options.crop_strategy = strategy;
        }
        if let Some(ratio) = self.fixed_crop_ratio {
            options.fixed_crop_ratio = ratio;
        }
        if let Some(mode) = self.edge_mode {
            options.edge_mode = mode;
        }
        options.target_red_hue &= !self.no_red_hue;
        options.enhance_contrast &= !self.no_contrast;
        options.edge_enhancement &= !self.no_edges;
        options.morphology_operations &= !self.no_morphology;
        options.normalize_text &= !self.no_normalize;

        options.validate()?;
        Ok(options)
    }
}
