use std;
use ini;
use log;

use alg;
use graphics;
use components::camera;

pub const CONFIG_PATH: &str = "config.ini";

lazy_static! {
    static ref LOADED: Result<Settings, ConfigError> = {
        Settings::load(CONFIG_PATH)
    };

    /// Contents of `config.ini`, or the defaults if it could not be loaded
    pub static ref ENGINE_CONFIG: Settings = {
        (*LOADED).as_ref().ok().cloned().unwrap_or_default()
    };
}

/// Why `ENGINE_CONFIG` fell back to the defaults, if it did. \
/// Nothing is logged at load time, so callers report this once a logger
/// is installed.
pub fn load_error() -> Option<&'static ConfigError> {
    (*LOADED).as_ref().err()
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The file could not be read or is not valid ini
    Io(String),
    Parse {
        section: String,
        setting: String,
        value:   String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ConfigError::Io(ref message) => {
                write!(out, "failed to load config: {}", message)
            },
            ConfigError::Parse { ref section, ref setting, ref value } => write!(
                out,
                "invalid value \"{}\" for setting \"{}\" in section \"{}\"",
                value,
                setting,
                section,
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, PartialEq)]
pub struct WindowSettings {
    pub title:  String,
    pub width:  u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSettings {
    pub fov:      f64, // Horizontal, degrees
    pub near:     f64,
    pub far:      f64,
    pub position: alg::Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    pub color: graphics::Color,
    pub clear: graphics::Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub render: RenderSettings,
    pub log_level: log::LevelFilter,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            window: WindowSettings {
                title: "Project: Mini-Scene 3D".to_string(),
                width: 1280,
                height: 720,
            },
            camera: CameraSettings {
                fov: camera::DEFAULT_FOV,
                near: camera::DEFAULT_NEAR,
                far: camera::DEFAULT_FAR,
                position: alg::Vec3::new(0., 2., 6.),
            },
            render: RenderSettings {
                color: graphics::Color::amber(),
                clear: graphics::Color::slate(),
            },
            log_level: log::LevelFilter::Info,
        }
    }
}

impl Settings {
    pub fn load(filename: &str) -> Result<Settings, ConfigError> {
        let file = ini::Ini::load_from_file(filename)
            .map_err(|err| ConfigError::Io(err.msg))?;

        Settings::from_ini(&file)
    }

    /// Missing sections and settings keep their default values
    pub fn from_ini(file: &ini::Ini) -> Result<Settings, ConfigError> {
        let mut settings = Settings::default();

        {
            let window = &mut settings.window;

            if let Some(title) = lookup(file, "window", "title") {
                window.title = title.trim().to_string();
            }

            load_setting(file, "window", "width", &mut window.width)?;
            load_setting(file, "window", "height", &mut window.height)?;
        }

        {
            let camera = &mut settings.camera;

            load_setting(file, "camera", "fov", &mut camera.fov)?;
            load_setting(file, "camera", "near", &mut camera.near)?;
            load_setting(file, "camera", "far", &mut camera.far)?;

            if let Some(value) = lookup(file, "camera", "position") {
                camera.position = parse_vec3(value)
                    .ok_or_else(|| parse_error("camera", "position", value))?;
            }
        }

        load_setting(file, "render", "color", &mut settings.render.color)?;
        load_setting(file, "render", "clear", &mut settings.render.clear)?;
        load_setting(file, "log", "level", &mut settings.log_level)?;

        Ok(settings)
    }
}

fn lookup<'a>(file: &'a ini::Ini, section: &str, setting: &str) -> Option<&'a str> {
    file.section(Some(section))
        .and_then(|properties| properties.get(setting))
        .map(|value| value.as_str())
}

fn parse_error(section: &str, setting: &str, value: &str) -> ConfigError {
    ConfigError::Parse {
        section: section.to_string(),
        setting: setting.to_string(),
        value:   value.trim().to_string(),
    }
}

// Overwrite `target` only if the setting is present
fn load_setting<T: std::str::FromStr>(
    file:    &ini::Ini,
    section: &str,
    setting: &str,
    target:  &mut T,
) -> Result<(), ConfigError> {
    if let Some(value) = lookup(file, section, setting) {
        *target = value.trim().parse()
            .map_err(|_| parse_error(section, setting, value))?;
    }

    Ok(())
}

fn parse_vec3(text: &str) -> Option<alg::Vec3> {
    let components = text.split_whitespace()
        .map(|part| part.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    if components.len() != 3 {
        return None;
    }

    Some(alg::Vec3::new(components[0], components[1], components[2]))
}

#[cfg(test)]
mod tests {
    use ini;
    use log;
    use alg;
    use graphics;
    use config::*;

    #[test]
    fn full_file() {
        let file = ini::Ini::load_from_str(
"[window]
title = Sandbox
width = 800
height = 600

[camera]
fov = 60
near = 0.5
far = 250
position = 1 -2 3.5

[render]
color = 0 1 0
clear = 0 0 0

[log]
level = debug
"
        ).unwrap();

        let settings = Settings::from_ini(&file).unwrap();

        assert!(settings.window.title == "Sandbox");
        assert!(settings.window.width == 800 && settings.window.height == 600);
        assert!(settings.camera.fov == 60. && settings.camera.far == 250.);
        assert!(settings.camera.position == alg::Vec3::new(1., -2., 3.5));
        assert!(settings.render.color == graphics::Color::green());
        assert!(settings.render.clear == graphics::Color::new(0., 0., 0.));
        assert!(settings.log_level == log::LevelFilter::Debug);
    }

    #[test]
    fn missing_values_use_defaults() {
        let file = ini::Ini::load_from_str("[camera]\nfov = 75\n").unwrap();
        let settings = Settings::from_ini(&file).unwrap();

        let defaults = Settings::default();

        assert!(settings.camera.fov == 75.);
        assert!(settings.camera.near == defaults.camera.near);
        assert!(settings.window == defaults.window);
        assert!(settings.render == defaults.render);
        assert!(settings.log_level == log::LevelFilter::Info);
    }

    #[test]
    fn malformed_values() {
        let file = ini::Ini::load_from_str("[window]\nwidth = wide\n").unwrap();

        match Settings::from_ini(&file) {
            Err(err) => {
                eprintln!("Error: {}", err);
                assert!(err == ConfigError::Parse {
                    section: "window".to_string(),
                    setting: "width".to_string(),
                    value:   "wide".to_string(),
                });
            },
            Ok(_) => panic!("expected a parse error"),
        }

        let file = ini::Ini::load_from_str("[camera]\nposition = 1 2\n").unwrap();
        assert!(Settings::from_ini(&file).is_err());

        let file = ini::Ini::load_from_str("[log]\nlevel = loud\n").unwrap();
        assert!(Settings::from_ini(&file).is_err());
    }

    #[test]
    fn missing_file() {
        let path = "no/such/dir/config.ini";

        match Settings::load(path) {
            Err(ConfigError::Io(message)) => eprintln!("Error: {}", message),
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn engine_config_matches_load() {
        match load_error() {
            None => {
                let loaded = Settings::load(CONFIG_PATH).unwrap();
                assert!(*ENGINE_CONFIG == loaded);
            },
            Some(err) => {
                eprintln!("Error: {}", err);
                assert!(Settings::load(CONFIG_PATH).is_err());
                assert!(*ENGINE_CONFIG == Settings::default());
            },
        }
    }
}
