//! Settings for the model viewer, read from a small JSON file:
//!
//! ```json
//! {
//!     "model": "nanosuit/nanosuit.obj",
//!     "window": [800, 600],
//!     "camera_position": [0, 0, 3],
//!     "model_translation": [0, -1.75, 0],
//!     "model_scale": 0.2
//! }
//! ```
//!
//! Only `model` is required. Relative model paths are resolved against the
//! directory of the config file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::Vec3;
use tinyjson::JsonValue;

use crate::camera::{DEFAULT_PITCH, DEFAULT_YAW};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] tinyjson::JsonParseError),
    #[error("the configuration must be a JSON object")]
    NotAnObject,
    #[error("missing required key \"{0}\"")]
    Missing(&'static str),
    #[error("\"{key}\" must be {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub model: PathBuf,
    pub window_size: (u32, u32),
    pub camera_position: Vec3,
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub model_translation: Vec3,
    pub model_scale: f32,
    pub clear_color: Vec3,
}

impl ViewerConfig {
    /// Defaults for everything but the model path.
    pub fn for_model(model: impl Into<PathBuf>) -> ViewerConfig {
        ViewerConfig {
            model: model.into(),
            window_size: (800, 600),
            camera_position: Vec3::new(0.0, 0.0, 3.0),
            camera_yaw: DEFAULT_YAW,
            camera_pitch: DEFAULT_PITCH,
            model_translation: Vec3::ZERO,
            model_scale: 1.0,
            clear_color: Vec3::splat(0.1),
        }
    }

    /// Treats `.json` files as configuration and anything else as a model.
    pub fn from_argument(argument: &Path) -> Result<ViewerConfig, ConfigError> {
        let is_json = argument
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        if is_json {
            ViewerConfig::load(argument)
        } else {
            Ok(ViewerConfig::for_model(argument))
        }
    }

    pub fn load(path: &Path) -> Result<ViewerConfig, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = ViewerConfig::from_json(&json)?;
        if config.model.is_relative() {
            if let Some(directory) = path.parent() {
                config.model = directory.join(&config.model);
            }
        }
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<ViewerConfig, ConfigError> {
        let json: JsonValue = json.parse()?;
        let object: &HashMap<String, JsonValue> = json.get().ok_or(ConfigError::NotAnObject)?;

        let model = object.get("model").ok_or(ConfigError::Missing("model"))?;
        let model = model.get::<String>().ok_or(ConfigError::WrongType {
            key: "model",
            expected: "a string",
        })?;
        let mut config = ViewerConfig::for_model(model);

        if let Some(window) = object.get("window") {
            let [width, height] = take_numbers::<2>(window, "window")?;
            if width < 1.0 || height < 1.0 {
                return Err(ConfigError::WrongType {
                    key: "window",
                    expected: "two positive numbers",
                });
            }
            config.window_size = (width as u32, height as u32);
        }
        if let Some(value) = object.get("camera_position") {
            config.camera_position = take_vec3(value, "camera_position")?;
        }
        if let Some(value) = object.get("camera_yaw") {
            config.camera_yaw = take_f32(value, "camera_yaw")?;
        }
        if let Some(value) = object.get("camera_pitch") {
            config.camera_pitch = take_f32(value, "camera_pitch")?;
        }
        if let Some(value) = object.get("model_translation") {
            config.model_translation = take_vec3(value, "model_translation")?;
        }
        if let Some(value) = object.get("model_scale") {
            config.model_scale = take_f32(value, "model_scale")?;
        }
        if let Some(value) = object.get("clear_color") {
            config.clear_color = take_vec3(value, "clear_color")?;
        }
        Ok(config)
    }
}

fn take_f32(json_value: &JsonValue, key: &'static str) -> Result<f32, ConfigError> {
    json_value
        .get::<f64>()
        .map(|&value| value as f32)
        .ok_or(ConfigError::WrongType {
            key,
            expected: "a number",
        })
}

fn take_numbers<const N: usize>(
    json_value: &JsonValue,
    key: &'static str,
) -> Result<[f32; N], ConfigError> {
    let wrong_type = ConfigError::WrongType {
        key,
        expected: if N == 2 { "an array of 2 numbers" } else { "an array of 3 numbers" },
    };
    let Some(values) = json_value.get::<Vec<JsonValue>>() else {
        return Err(wrong_type);
    };
    if values.len() != N {
        return Err(wrong_type);
    }
    let mut numbers = [0.0; N];
    for (number, value) in numbers.iter_mut().zip(values) {
        match value.get::<f64>() {
            Some(&value) => *number = value as f32,
            None => return Err(wrong_type),
        }
    }
    Ok(numbers)
}

fn take_vec3(json_value: &JsonValue, key: &'static str) -> Result<Vec3, ConfigError> {
    take_numbers::<3>(json_value, key).map(Vec3::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_model_is_required() {
        let config = ViewerConfig::from_json(r#"{ "model": "suit.obj" }"#).unwrap();
        assert_eq!(config, ViewerConfig::for_model("suit.obj"));
    }

    #[test]
    fn reads_every_key() {
        let config = ViewerConfig::from_json(
            r#"{
                "model": "nanosuit/nanosuit.obj",
                "window": [1280, 720],
                "camera_position": [0, 1, 5],
                "camera_yaw": -45,
                "camera_pitch": 10.5,
                "model_translation": [0, -1.75, 0],
                "model_scale": 0.2,
                "clear_color": [0.2, 0.3, 0.3],
                "comment": "unknown keys are ignored"
            }"#,
        )
        .unwrap();
        assert_eq!(config.model, PathBuf::from("nanosuit/nanosuit.obj"));
        assert_eq!(config.window_size, (1280, 720));
        assert_eq!(config.camera_position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(config.camera_yaw, -45.0);
        assert_eq!(config.camera_pitch, 10.5);
        assert_eq!(config.model_translation, Vec3::new(0.0, -1.75, 0.0));
        assert_eq!(config.model_scale, 0.2);
        assert_eq!(config.clear_color, Vec3::new(0.2, 0.3, 0.3));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            ViewerConfig::from_json("[1, 2]"),
            Err(ConfigError::NotAnObject)
        ));
        assert!(matches!(
            ViewerConfig::from_json("{}"),
            Err(ConfigError::Missing("model"))
        ));
        assert!(matches!(
            ViewerConfig::from_json(r#"{ "model": 3 }"#),
            Err(ConfigError::WrongType { key: "model", .. })
        ));
        assert!(matches!(
            ViewerConfig::from_json(r#"{ "model": "a.obj", "camera_position": [1, 2] }"#),
            Err(ConfigError::WrongType { key: "camera_position", .. })
        ));
        assert!(matches!(
            ViewerConfig::from_json(r#"{ "model": "a.obj", "window": [0, 600] }"#),
            Err(ConfigError::WrongType { key: "window", .. })
        ));
        assert!(matches!(
            ViewerConfig::from_json("{ model"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn relative_models_resolve_against_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(&path, r#"{ "model": "assets/cube.obj" }"#).unwrap();

        let config = ViewerConfig::from_argument(&path).unwrap();
        assert_eq!(config.model, dir.path().join("assets/cube.obj"));

        let config = ViewerConfig::from_argument(Path::new("cube.obj")).unwrap();
        assert_eq!(config.model, PathBuf::from("cube.obj"));
    }
}
