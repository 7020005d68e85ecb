use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use twophase::{SearchOptions, SolutionFormat};

/// Search settings read from a TOML file. Every field is optional and only
/// overrides the defaults when present.
#[derive(Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub max_depth: Option<usize>,
    pub max_probes: Option<u64>,
    pub min_probes: Option<u64>,
    pub try_inverse: Option<bool>,
    pub try_all_axes: Option<bool>,
    pub separator: Option<bool>,
    pub inverse: Option<bool>,
    pub append_length: Option<bool>,
    /// Where the generated tables are cached.
    pub cache: Option<PathBuf>,
}

impl SolverConfig {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read configuration file {}", path.display()))?;
        toml::from_str(&text)
            .wrap_err_with(|| format!("Failed to parse configuration file {}", path.display()))
    }

    pub fn apply(&self, options: &mut SearchOptions) {
        if let Some(max_depth) = self.max_depth {
            options.max_depth = max_depth;
        }
        if let Some(max_probes) = self.max_probes {
            options.max_probes = max_probes;
        }
        if let Some(min_probes) = self.min_probes {
            options.min_probes = min_probes;
        }
        if let Some(try_inverse) = self.try_inverse {
            options.try_inverse = try_inverse;
        }
        if let Some(try_all_axes) = self.try_all_axes {
            options.try_all_axes = try_all_axes;
        }
        for (flag, value) in [
            (SolutionFormat::SEPARATOR, self.separator),
            (SolutionFormat::INVERSE, self.inverse),
            (SolutionFormat::APPEND_LENGTH, self.append_length),
        ] {
            if let Some(value) = value {
                options.format.set(flag, value);
            }
        }
    }
}
